use serde::{Deserialize, Serialize};

use crate::analyzer;
use crate::media::video_search_url;

pub const MISSING_INSTRUCTIONS: &str = "Instructions currently unavailable.";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// Buckets a ready time: up to 25 minutes is easy, up to 50 intermediate.
    /// Zero counts as unknown.
    pub fn from_ready_time(minutes: Option<u32>) -> Option<Difficulty> {
        match minutes? {
            0 => None,
            1..=25 => Some(Difficulty::Easy),
            26..=50 => Some(Difficulty::Intermediate),
            _ => Some(Difficulty::Advanced),
        }
    }
}

/// One row of a search result, in the shape the web client renders.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSummary {
    #[serde(rename = "idMeal")]
    pub id: String,
    #[serde(rename = "strMeal")]
    pub title: String,
    #[serde(rename = "strArea")]
    pub cuisine: String,
    #[serde(rename = "strMealThumb")]
    pub thumbnail: String,
    #[serde(rename = "strCategory")]
    pub category: String,
    #[serde(rename = "strYoutube")]
    pub video_url: String,
    pub ready_in_minutes: Option<u32>,
    pub difficulty: Option<Difficulty>,
    pub temperature_hint: Option<String>,
    pub source_url: Option<String>,
}

impl RecipeSummary {
    pub fn new(
        id: String,
        title: String,
        cuisine: String,
        category: String,
        thumbnail: String,
        ready_in_minutes: Option<u32>,
        source_url: Option<String>,
    ) -> RecipeSummary {
        RecipeSummary {
            video_url: video_search_url(&title),
            difficulty: Difficulty::from_ready_time(ready_in_minutes),
            temperature_hint: None, // only details carry instructions to scan
            id,
            title,
            cuisine,
            thumbnail,
            category,
            ready_in_minutes,
            source_url,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RecipeDetail {
    #[serde(flatten)]
    pub summary: RecipeSummary,
    #[serde(rename = "strInstructions")]
    pub instructions: String,
    pub ingredients: Vec<String>,
}

impl RecipeDetail {
    /// Attaches the full text to a summary and derives the temperature hint from it.
    pub fn new(mut summary: RecipeSummary, instructions: String, ingredients: Vec<String>) -> Self {
        summary.temperature_hint = analyzer::temperature_hint(&instructions);
        let instructions = if instructions.trim().is_empty() {
            MISSING_INSTRUCTIONS.to_string()
        } else {
            instructions
        };
        RecipeDetail {
            summary,
            instructions,
            ingredients,
        }
    }

    pub fn id(&self) -> &str {
        &self.summary.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    pub cuisine: Option<String>,
    pub diet: Option<String>,
    pub max_time: Option<u32>,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        SearchQuery {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_cuisine(mut self, cuisine: Option<String>) -> Self {
        self.cuisine = cuisine.filter(|c| !c.trim().is_empty());
        self
    }

    pub fn with_diet(mut self, diet: Option<String>) -> Self {
        self.diet = diet.filter(|d| !d.trim().is_empty());
        self
    }

    pub fn with_max_time(mut self, max_time: Option<u32>) -> Self {
        self.max_time = max_time.filter(|m| *m > 0);
        self
    }
}
