//! Converts Spoonacular DTOs into our recipe records.

use super::dto;
use crate::analyzer::sanitize_html;
use crate::data_models::{RecipeDetail, RecipeSummary};
use crate::providers::primary_id;

const DEFAULT_CUISINE: &str = "Global";
const DEFAULT_CATEGORY: &str = "Recipe";

pub fn to_summary(info: dto::RecipeInfo) -> RecipeSummary {
    RecipeSummary::new(
        primary_id(info.id),
        info.title.unwrap_or_default(),
        first_or(info.cuisines, DEFAULT_CUISINE),
        first_or(info.dish_types, DEFAULT_CATEGORY),
        info.image.unwrap_or_default(),
        info.ready_in_minutes,
        non_empty(info.source_url),
    )
}

pub fn to_detail(information: dto::RecipeInformation) -> RecipeDetail {
    let instructions = sanitize_html(information.instructions.as_deref().unwrap_or_default());
    let ingredients = information
        .extended_ingredients
        .unwrap_or_default()
        .into_iter()
        .filter_map(ingredient_line)
        .collect();

    RecipeDetail::new(to_summary(information.info), instructions, ingredients)
}

fn ingredient_line(ingredient: dto::ExtendedIngredient) -> Option<String> {
    [ingredient.original, ingredient.original_name]
        .into_iter()
        .flatten()
        .map(|line| line.trim().to_string())
        .find(|line| !line.is_empty())
}

fn first_or(values: Option<Vec<String>>, default: &str) -> String {
    values
        .and_then(|v| v.into_iter().find(|s| !s.trim().is_empty()))
        .unwrap_or_else(|| default.to_string())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
