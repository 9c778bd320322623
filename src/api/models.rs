use serde::{Deserialize, Serialize};

use crate::data_models::{RecipeDetail, RecipeSummary};
use crate::llm::{AnalyzeFilters, DetectedDish, DetectedIngredient, RecipeSuggestion, ShoppingItem};

/// `?q=&cuisine=&diet=&maxTime=` for both search endpoints. Everything arrives
/// as text; blank or unparsable values count as absent.
#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
    pub q: Option<String>,
    pub cuisine: Option<String>,
    pub diet: Option<String>,
    #[serde(rename = "maxTime")]
    pub max_time: Option<String>,
}

impl SearchParams {
    pub fn query(&self) -> Option<&str> {
        non_blank(self.q.as_deref())
    }

    pub fn cuisine(&self) -> Option<String> {
        non_blank(self.cuisine.as_deref()).map(str::to_string)
    }

    pub fn diet(&self) -> Option<String> {
        non_blank(self.diet.as_deref()).map(str::to_string)
    }

    pub fn max_time(&self) -> Option<u32> {
        non_blank(self.max_time.as_deref()).and_then(|raw| raw.parse::<u32>().ok())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: &'static str,
    pub request_id: String,
}

#[derive(Debug, Serialize)]
pub struct CuisinesResponse {
    pub cuisines: Vec<String>,
    pub request_id: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<RecipeSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub request_id: String,
}

#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    pub recipe: RecipeDetail,
    pub request_id: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(rename = "imageBase64")]
    pub image_base64: Option<String>,
    #[serde(default)]
    pub cuisines: Vec<String>,
    #[serde(default)]
    pub filters: AnalyzeFilters,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzeMode {
    Live,
    Demo,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Groq,
    Demo,
}

/// A suggestion plus the media found for it in the recipe providers.
#[derive(Debug, Serialize)]
pub struct EnrichedRecipe {
    #[serde(flatten)]
    pub suggestion: RecipeSuggestion,
    pub photo_url: Option<String>,
    pub youtube_url: Option<String>,
    pub themealdb_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub detected_dish: Option<DetectedDish>,
    pub detected_ingredients: Vec<DetectedIngredient>,
    pub recipes: Vec<EnrichedRecipe>,
    pub image_url: Option<String>,
    pub mode: AnalyzeMode,
    pub note: Option<String>,
    pub provider: LlmProvider,
    pub request_id: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct ShoppingListRequest {
    #[serde(default, rename = "recipeNames")]
    pub recipe_names: Vec<String>,
    #[serde(default, rename = "userIngredients")]
    pub user_ingredients: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ShoppingListResponse {
    pub shopping_list: Vec<ShoppingItem>,
    pub provider: LlmProvider,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub request_id: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub request_id: String,
}
