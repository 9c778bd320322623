use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::analyzer::search_terms;
use crate::data_models::{RecipeDetail, RecipeSummary, SearchQuery};
use crate::providers::{ProviderError, ProviderKind, RecipeProvider, classify, raw_id};

/// Upper bound on every search answer.
pub const MAX_RESULTS: usize = 16;

/// Served when the secondary provider cannot list its areas.
pub const FALLBACK_CUISINES: [&str; 10] = [
    "American", "British", "Chinese", "French", "Greek", "Indian", "Italian", "Japanese",
    "Mexican", "Thai",
];

/// One step of the search fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStage {
    /// Primary provider with every filter applied server-side.
    Primary,
    /// Secondary provider with the raw query text.
    SecondaryFullQuery,
    /// Secondary provider once per extracted term, merged in term order.
    SecondaryTermExpansion,
}

/// Stages run in this order; the first one with results answers the query.
pub const SEARCH_STAGES: [SearchStage; 3] = [
    SearchStage::Primary,
    SearchStage::SecondaryFullQuery,
    SearchStage::SecondaryTermExpansion,
];

impl SearchStage {
    fn provider(&self) -> ProviderKind {
        match self {
            SearchStage::Primary => ProviderKind::Primary,
            SearchStage::SecondaryFullQuery | SearchStage::SecondaryTermExpansion => {
                ProviderKind::Secondary
            }
        }
    }
}

/// Merges the primary and secondary recipe providers into one search/detail surface.
///
/// Never returns an error: every provider failure moves on to the next stage,
/// and an exhausted chain answers with an empty list.
pub struct RecipeAggregator {
    primary: Arc<dyn RecipeProvider>,
    secondary: Arc<dyn RecipeProvider>,
}

impl RecipeAggregator {
    pub fn new(primary: Arc<dyn RecipeProvider>, secondary: Arc<dyn RecipeProvider>) -> Self {
        Self { primary, secondary }
    }

    pub fn primary(&self) -> &Arc<dyn RecipeProvider> {
        &self.primary
    }

    pub fn secondary(&self) -> &Arc<dyn RecipeProvider> {
        &self.secondary
    }

    pub async fn search(&self, query: &SearchQuery) -> Vec<RecipeSummary> {
        for stage in SEARCH_STAGES {
            match self.run_stage(stage, query).await {
                Ok(results) if !results.is_empty() => {
                    let results = Self::finish(stage, query, results);
                    debug!(
                        query = %query.query,
                        stage = ?stage,
                        result_count = results.len(),
                        "aggregator.search"
                    );
                    return results;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(query = %query.query, stage = ?stage, error = %e, "aggregator.stage_failed");
                }
            }
        }

        info!(query = %query.query, "aggregator.search.empty");
        Vec::new()
    }

    async fn run_stage(
        &self,
        stage: SearchStage,
        query: &SearchQuery,
    ) -> Result<Vec<RecipeSummary>, ProviderError> {
        match stage {
            SearchStage::Primary => {
                if !self.primary.is_configured() {
                    debug!("aggregator.primary_unconfigured");
                    return Ok(Vec::new());
                }
                self.primary.search(query, MAX_RESULTS).await
            }
            SearchStage::SecondaryFullQuery => self.secondary.search(query, MAX_RESULTS).await,
            SearchStage::SecondaryTermExpansion => Ok(self.expand_terms(query).await),
        }
    }

    /// Fans out one secondary search per term; failed sub-queries count as empty.
    async fn expand_terms(&self, query: &SearchQuery) -> Vec<RecipeSummary> {
        let terms = search_terms(&query.query);
        let sub_queries = terms.iter().map(|term| {
            let sub_query = SearchQuery::new(term.as_str());
            async move {
                match self.secondary.search(&sub_query, MAX_RESULTS).await {
                    Ok(results) => results,
                    Err(e) => {
                        warn!(term = %sub_query.query, error = %e, "aggregator.term_failed");
                        Vec::new()
                    }
                }
            }
        });

        // join_all keeps input order, so dedup below is by term order, not arrival
        dedup_by_id(join_all(sub_queries).await)
    }

    fn finish(
        stage: SearchStage,
        query: &SearchQuery,
        mut results: Vec<RecipeSummary>,
    ) -> Vec<RecipeSummary> {
        // the primary already applied the cuisine filter server-side
        if stage.provider() == ProviderKind::Secondary {
            if let Some(cuisine) = &query.cuisine {
                results = filter_by_cuisine(results, cuisine);
            }
        }
        results.truncate(MAX_RESULTS);
        results
    }

    /// `None` covers both "no such recipe" and "provider failed".
    pub async fn detail(&self, id: &str) -> Option<RecipeDetail> {
        let kind = classify(id);
        let raw = raw_id(id);

        let provider = match kind {
            ProviderKind::Primary => {
                if raw.parse::<u64>().is_err() {
                    debug!(recipe_id = id, "aggregator.detail.non_numeric_primary_id");
                    return None;
                }
                &self.primary
            }
            ProviderKind::Secondary => &self.secondary,
        };

        match provider.get_by_id(raw).await {
            Ok(detail) => Some(detail),
            Err(ProviderError::NotFound) => {
                debug!(recipe_id = id, provider = ?kind, "aggregator.detail.not_found");
                None
            }
            Err(e) => {
                warn!(recipe_id = id, provider = ?kind, error = %e, "aggregator.detail.failed");
                None
            }
        }
    }

    /// Provider areas, or [`FALLBACK_CUISINES`] when the provider fails or knows none.
    pub async fn list_cuisines(&self) -> Vec<String> {
        match self.secondary.list_cuisines().await {
            Ok(cuisines) if !cuisines.is_empty() => cuisines,
            Ok(_) => fallback_cuisines(),
            Err(e) => {
                warn!(error = %e, fallback_count = FALLBACK_CUISINES.len(), "cuisines.fallback");
                fallback_cuisines()
            }
        }
    }
}

pub fn fallback_cuisines() -> Vec<String> {
    FALLBACK_CUISINES.iter().map(|c| c.to_string()).collect()
}

/// Flattens result batches keeping the first occurrence of every id.
pub fn dedup_by_id(batches: Vec<Vec<RecipeSummary>>) -> Vec<RecipeSummary> {
    let mut seen = HashSet::new();
    batches
        .into_iter()
        .flatten()
        .filter(|recipe| seen.insert(recipe.id.clone()))
        .collect()
}

/// Case-insensitive substring match against the cuisine (area) field.
pub fn filter_by_cuisine(results: Vec<RecipeSummary>, cuisine: &str) -> Vec<RecipeSummary> {
    let target = cuisine.to_lowercase();
    results
        .into_iter()
        .filter(|recipe| recipe.cuisine.to_lowercase().contains(&target))
        .collect()
}
