//! Converts TheMealDB DTOs into our recipe records.

use super::dto;
use crate::analyzer::sanitize_html;
use crate::data_models::{RecipeDetail, RecipeSummary};

pub fn to_summary(meal: &dto::Meal) -> RecipeSummary {
    RecipeSummary::new(
        meal.id_meal.clone(),
        meal.name.clone().unwrap_or_default(),
        meal.area.clone().unwrap_or_default(),
        meal.category.clone().unwrap_or_default(),
        meal.thumbnail.clone().unwrap_or_default(),
        None,
        None,
    )
}

pub fn to_detail(meal: dto::Meal) -> RecipeDetail {
    // plain text with CRLF step breaks; only markup gets flattened
    let raw = meal.instructions.as_deref().unwrap_or_default().trim();
    let instructions = if raw.contains('<') {
        sanitize_html(raw)
    } else {
        raw.to_string()
    };
    RecipeDetail::new(to_summary(&meal), instructions, meal.ingredients())
}

/// Trimmed, de-duplicated and alphabetically sorted area names.
pub fn to_cuisines(areas: Vec<dto::Area>) -> Vec<String> {
    let mut names: Vec<String> = areas
        .into_iter()
        .filter_map(|area| area.name)
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    names.sort();
    names.dedup();
    names
}
