//! TheMealDB wire types.
//!
//! Every endpoint wraps its payload in `{"meals": [...]}` and answers
//! `{"meals": null}` when nothing matches.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Highest `strIngredientN` / `strMeasureN` index the API emits.
pub const MAX_INGREDIENT_SLOTS: usize = 20;

#[derive(Debug, Clone, Deserialize)]
pub struct MealsResponse<T> {
    pub meals: Option<Vec<T>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub id_meal: String,
    #[serde(rename = "strMeal")]
    pub name: Option<String>,
    #[serde(rename = "strArea")]
    pub area: Option<String>,
    #[serde(rename = "strCategory")]
    pub category: Option<String>,
    #[serde(rename = "strMealThumb")]
    pub thumbnail: Option<String>,
    #[serde(rename = "strInstructions")]
    pub instructions: Option<String>,
    /// The numbered ingredient/measure columns and everything else we don't name.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl Meal {
    fn slot(&self, field: &str, index: usize) -> Option<&str> {
        self.extra
            .get(&format!("{field}{index}"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// `"<measure> <ingredient>"` for every filled ingredient slot, in slot order.
    pub fn ingredients(&self) -> Vec<String> {
        (1..=MAX_INGREDIENT_SLOTS)
            .filter_map(|i| {
                let ingredient = self.slot("strIngredient", i)?;
                let measure = self.slot("strMeasure", i).unwrap_or_default();
                Some(format!("{measure} {ingredient}").trim().to_string())
            })
            .collect()
    }
}

/// `list.php?a=list`
#[derive(Debug, Clone, Deserialize)]
pub struct Area {
    #[serde(rename = "strArea")]
    pub name: Option<String>,
}
