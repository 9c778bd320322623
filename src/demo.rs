//! Canned answers served when Groq is not configured or fails, so the
//! scan and shopping-list screens stay usable without an LLM key.

use serde_json::Number;

use crate::llm::{DetectedDish, DetectedIngredient, PantryAnalysis, RecipeSuggestion, ShoppingItem};

pub const ANALYZE_NOTE: &str =
    "Demo mode: Groq unavailable. Showing sample scan results instead of live vision.";
pub const SHOPPING_LIST_NOTE: &str = "Demo mode list generated because Groq is unavailable.";

#[allow(clippy::too_many_arguments)]
fn suggestion(
    name: &str,
    cuisine: &str,
    match_percent: u64,
    missing: &[&str],
    minutes: u64,
    difficulty: &str,
    description: &str,
    calories: u64,
    servings: u64,
    query: &str,
) -> RecipeSuggestion {
    RecipeSuggestion {
        name: Some(name.to_string()),
        cuisine: Some(cuisine.to_string()),
        match_percent: Some(Number::from(match_percent)),
        missing_ingredients: missing.iter().map(|m| m.to_string()).collect(),
        cooking_time_minutes: Some(Number::from(minutes)),
        difficulty: Some(difficulty.to_string()),
        description: Some(description.to_string()),
        calories_per_serving: Some(Number::from(calories)),
        servings: Some(Number::from(servings)),
        themealdb_search_query: Some(query.to_string()),
    }
}

fn recipes_for(primary_cuisine: Option<&str>) -> Vec<RecipeSuggestion> {
    let requested = primary_cuisine.map(str::trim).unwrap_or_default();

    if requested.to_lowercase().contains("egypt") {
        return vec![
            suggestion(
                "Egyptian-Spiced Protein Skillet",
                "Egyptian",
                82,
                &["cumin", "coriander", "lemon"],
                40,
                "intermediate",
                "Pan-seared protein with warming Egyptian-style spices and onions.",
                410,
                4,
                "egyptian chicken",
            ),
            suggestion(
                "Baladi Veggie Saute",
                "Egyptian",
                74,
                &["bell pepper", "fresh parsley"],
                25,
                "easy",
                "Quick onion-garlic vegetable saute with classic pantry spices.",
                290,
                3,
                "egyptian vegetables",
            ),
            suggestion(
                "Herbed Tomato Broth",
                "Egyptian",
                69,
                &["vegetable stock", "mint"],
                30,
                "easy",
                "Light tomato-forward broth finished with herbs and citrus.",
                180,
                4,
                "egyptian soup",
            ),
        ];
    }

    let cuisine = primary_cuisine
        .filter(|c| !c.is_empty())
        .unwrap_or("Global");
    vec![
        suggestion(
            "Spiced Pantry Curry",
            cuisine,
            84,
            &["yogurt", "cumin"],
            40,
            "intermediate",
            "Balanced onion-tomato curry base with pantry-friendly spices.",
            400,
            4,
            "pantry curry",
        ),
        suggestion(
            "One-Pan Skillet Bowl",
            cuisine,
            72,
            &["bell pepper", "lime"],
            28,
            "easy",
            "Simple one-pan bowl with protein, aromatics, and sauce.",
            360,
            3,
            "skillet bowl",
        ),
        suggestion(
            "Tomato Garlic Soup",
            cuisine,
            78,
            &["celery", "stock cube"],
            35,
            "easy",
            "Comforting soup built from onion, tomato, and garlic.",
            240,
            4,
            "tomato soup",
        ),
    ]
}

/// Sample scan result, themed on the first preferred cuisine.
pub fn pantry_analysis(primary_cuisine: Option<&str>) -> PantryAnalysis {
    let dish_name = match primary_cuisine.filter(|c| !c.is_empty()) {
        Some(cuisine) => format!("{cuisine} pantry ingredients"),
        None => "Mixed pantry ingredients".to_string(),
    };

    PantryAnalysis {
        detected_dish: Some(DetectedDish {
            name: dish_name,
            confidence: 0.74,
            is_food: true,
        }),
        detected_ingredients: vec![
            DetectedIngredient {
                name: "onion".to_string(),
                quantity: "2 medium".to_string(),
                confidence: 0.9,
            },
            DetectedIngredient {
                name: "tomato".to_string(),
                quantity: "3 medium".to_string(),
                confidence: 0.88,
            },
            DetectedIngredient {
                name: "chicken breast".to_string(),
                quantity: "400g".to_string(),
                confidence: 0.86,
            },
        ],
        recipes: recipes_for(primary_cuisine),
    }
}

/// Staples list minus whatever the user already has (case-insensitive).
pub fn shopping_list(user_ingredients: &[String]) -> Vec<ShoppingItem> {
    let pantry: Vec<String> = user_ingredients.iter().map(|i| i.to_lowercase()).collect();
    [
        ShoppingItem::new("olive oil", "1", "bottle"),
        ShoppingItem::new("garlic", "1", "pack"),
        ShoppingItem::new("cumin powder", "1", "jar"),
        ShoppingItem::new("yogurt", "500", "g"),
    ]
    .into_iter()
    .filter(|item| !pantry.contains(&item.item.to_lowercase()))
    .collect()
}
