//! Spoonacular wire types. Only the fields we read are declared; everything
//! else in the payload is ignored.

use serde::Deserialize;

/// `GET /recipes/complexSearch` with `addRecipeInformation=true`
#[derive(Debug, Clone, Deserialize)]
pub struct ComplexSearchResponse {
    #[serde(default)]
    pub results: Option<Vec<RecipeInfo>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeInfo {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    pub image: Option<String>,
    pub cuisines: Option<Vec<String>>,
    pub dish_types: Option<Vec<String>>,
    pub ready_in_minutes: Option<u32>,
    pub source_url: Option<String>,
}

/// `GET /recipes/{id}/information`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeInformation {
    #[serde(flatten)]
    pub info: RecipeInfo,
    /// Raw HTML, sometimes an ordered list.
    pub instructions: Option<String>,
    pub extended_ingredients: Option<Vec<ExtendedIngredient>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedIngredient {
    pub original: Option<String>,
    pub original_name: Option<String>,
}
