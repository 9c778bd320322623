use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::aggregator::RecipeAggregator;
use crate::data_models::SearchQuery;

pub const VIDEO_SEARCH_BASE_URL: &str = "https://www.youtube.com/results";
pub const DEFAULT_VIDEO_PHRASE: &str = "easy cooking recipe";

/// Upstream JSON sometimes stringifies missing values into the title.
static STRINGIFIED_NULLS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:undefined|null)\b").expect("Invalid null-token regex"));

/// Video search link for a dish name; needs no provider data.
pub fn video_search_url(text: &str) -> String {
    let cleaned = STRINGIFIED_NULLS.replace_all(text, "");
    let cleaned = cleaned.trim();
    let term = if cleaned.is_empty() {
        DEFAULT_VIDEO_PHRASE
    } else {
        cleaned
    };
    format!(
        "{VIDEO_SEARCH_BASE_URL}?search_query={}",
        urlencoding::encode(&format!("{term} recipe"))
    )
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct MediaLinks {
    pub id: Option<String>,
    pub photo_url: Option<String>,
    pub video_url: String,
}

/// Attaches a photo and a video link to free-text dish names (LLM suggestions).
pub struct MediaEnricher {
    aggregator: Arc<RecipeAggregator>,
}

impl MediaEnricher {
    pub fn new(aggregator: Arc<RecipeAggregator>) -> Self {
        Self { aggregator }
    }

    /// Best-effort: the aggregator never fails, so neither does this.
    pub async fn enrich(&self, query: &str) -> MediaLinks {
        let results = self.aggregator.search(&SearchQuery::new(query)).await;

        match results.into_iter().next() {
            Some(top) => {
                debug!(query, recipe_id = %top.id, "media.enrich.hit");
                MediaLinks {
                    id: Some(top.id),
                    photo_url: Some(top.thumbnail).filter(|url| !url.is_empty()),
                    video_url: top.video_url,
                }
            }
            None => {
                debug!(query, "media.enrich.miss");
                MediaLinks {
                    id: None,
                    photo_url: None,
                    video_url: video_search_url(query),
                }
            }
        }
    }
}
