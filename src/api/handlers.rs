use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use futures::future::join_all;
use tracing::{info, warn};

use crate::data_models::SearchQuery;
use crate::demo;
use crate::llm::{PantryAnalysis, SearchIntent};

use super::models::{
    AnalyzeMode, AnalyzeRequest, AnalyzeResponse, CuisinesResponse, EnrichedRecipe,
    HealthResponse, LlmProvider, RecipeResponse, SearchParams, SearchResponse,
    ShoppingListRequest, ShoppingListResponse,
};
use super::{ApiError, AppState, RequestId};

pub const SERVICE_NAME: &str = "recipex-api";
const DEFAULT_BROWSE_QUERY: &str = "chicken";

pub async fn health_handler(RequestId(request_id): RequestId) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        service: SERVICE_NAME,
        request_id,
    })
}

pub async fn cuisines_handler(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
) -> Json<CuisinesResponse> {
    let cuisines = state.aggregator.list_cuisines().await;
    info!(request_id = %request_id, count = cuisines.len(), "cuisines.success");
    Json(CuisinesResponse {
        cuisines,
        request_id,
    })
}

/// Free-text search. When Groq is usable the query is first reduced to a
/// keyword plus cuisine/diet hints; explicit filters win over the hints.
pub async fn search_handler(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    let Some(query) = params.query() else {
        info!(request_id = %request_id, "search.empty_query");
        return Json(SearchResponse {
            results: Vec::new(),
            message: None,
            note: None,
            request_id,
        });
    };

    let mut intent = SearchIntent {
        keyword: query.to_string(),
        cuisine: None,
        diet: None,
    };
    let mut note = None;

    if state.llm.is_configured() {
        match state.llm.extract_search_intent(query).await {
            Ok(extracted) => intent = extracted,
            Err(e) => {
                warn!(request_id = %request_id, error = %e, "search.intent_fallback");
                note = Some(format!("Groq intent fallback used: {e}"));
            }
        }
    }

    let keyword = match intent.keyword.trim() {
        "" => query,
        keyword => keyword,
    };
    let search = SearchQuery::new(keyword)
        .with_cuisine(params.cuisine().or(intent.cuisine))
        .with_diet(params.diet().or(intent.diet))
        .with_max_time(params.max_time());

    let results = state.aggregator.search(&search).await;

    if results.is_empty() {
        info!(request_id = %request_id, query, cuisine = ?search.cuisine, diet = ?search.diet, "search.no_results");
        return Json(SearchResponse {
            results,
            message: Some(format!(
                "No results found for \"{query}\". Try broader keywords like chicken, pasta, curry or rice."
            )),
            note,
            request_id,
        });
    }

    info!(request_id = %request_id, query, result_count = results.len(), "search.success");
    Json(SearchResponse {
        results,
        message: None,
        note,
        request_id,
    })
}

/// Browse listing; no intent extraction, defaults to a chicken search.
pub async fn recipes_handler(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    let query = params.query().unwrap_or(DEFAULT_BROWSE_QUERY);
    let search = SearchQuery::new(query)
        .with_cuisine(params.cuisine())
        .with_diet(params.diet())
        .with_max_time(params.max_time());

    let results = state.aggregator.search(&search).await;
    info!(request_id = %request_id, query, result_count = results.len(), "recipes.success");
    Json(SearchResponse {
        results,
        message: None,
        note: None,
        request_id,
    })
}

pub async fn recipe_detail_handler(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    Path(id): Path<String>,
) -> Result<Json<RecipeResponse>, ApiError> {
    match state.aggregator.detail(&id).await {
        Some(recipe) => {
            info!(request_id = %request_id, recipe_id = %id, "recipe.success");
            Ok(Json(RecipeResponse { recipe, request_id }))
        }
        None => {
            warn!(request_id = %request_id, recipe_id = %id, "recipe.not_found");
            Err(ApiError::new(
                StatusCode::NOT_FOUND,
                "Recipe not found",
                request_id,
            ))
        }
    }
}

/// Pantry photo scan: live Groq vision when available, canned demo otherwise.
/// Each suggested dish is then matched against the recipe providers concurrently.
pub async fn analyze_handler(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Some(image_base64) = request.image_base64.as_deref().filter(|i| !i.is_empty()) else {
        warn!(request_id = %request_id, reason = "missing imageBase64", "analyze.invalid_request");
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "imageBase64 is required",
            request_id,
        ));
    };

    let mut analysis: Option<PantryAnalysis> = None;
    let mut note: Option<String> = None;

    if state.llm.is_configured() {
        match state
            .llm
            .analyze_pantry(image_base64, &request.cuisines, &request.filters)
            .await
        {
            Ok(live) => {
                analysis = Some(live);
                note = Some("Live analysis provided by Groq.".to_string());
            }
            Err(e) => {
                warn!(request_id = %request_id, error = %e, "analyze.groq_fallback");
                note = Some(format!("Groq unavailable. Falling back to demo mode. {e}"));
            }
        }
    }

    let (mut analysis, mode, provider) = match analysis {
        Some(live) => (live, AnalyzeMode::Live, LlmProvider::Groq),
        None => {
            note.get_or_insert_with(|| demo::ANALYZE_NOTE.to_string());
            (
                demo::pantry_analysis(request.cuisines.first().map(String::as_str)),
                AnalyzeMode::Demo,
                LlmProvider::Demo,
            )
        }
    };

    if analysis.detected_dish.as_ref().is_some_and(|dish| !dish.is_food) {
        analysis.detected_ingredients.clear();
        analysis.recipes.clear();
        let no_food = "No food ingredients detected in the uploaded image.";
        note = Some(match note {
            Some(existing) => format!("{existing} {no_food}"),
            None => no_food.to_string(),
        });
    }

    let suggestions: Vec<_> = analysis
        .recipes
        .into_iter()
        .filter_map(|recipe| recipe.normalized())
        .collect();

    let recipes = join_all(suggestions.into_iter().map(|suggestion| {
        let media = state.media.clone();
        async move {
            let links = media.enrich(suggestion.search_text()).await;
            EnrichedRecipe {
                suggestion,
                photo_url: links.photo_url,
                youtube_url: Some(links.video_url),
                themealdb_id: links.id,
            }
        }
    }))
    .await;

    info!(request_id = %request_id, mode = ?mode, recipe_count = recipes.len(), "analyze.success");
    Ok(Json(AnalyzeResponse {
        detected_dish: analysis.detected_dish,
        detected_ingredients: analysis.detected_ingredients,
        recipes,
        image_url: None,
        mode,
        note,
        provider,
        request_id,
    }))
}

pub async fn shopping_list_handler(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    Json(request): Json<ShoppingListRequest>,
) -> Json<ShoppingListResponse> {
    let mut groq_error = None;

    if state.llm.is_configured() {
        match state
            .llm
            .generate_shopping_list(&request.recipe_names, &request.user_ingredients)
            .await
        {
            Ok(shopping_list) => {
                info!(request_id = %request_id, item_count = shopping_list.len(), provider = "groq", "shopping_list.success");
                return Json(ShoppingListResponse {
                    shopping_list,
                    provider: LlmProvider::Groq,
                    note: None,
                    request_id,
                });
            }
            Err(e) => {
                warn!(request_id = %request_id, error = %e, "shopping_list.groq_fallback");
                groq_error = Some(e.to_string());
            }
        }
    }

    let note = match groq_error {
        Some(e) => format!("{} Groq error: {e}", demo::SHOPPING_LIST_NOTE),
        None => demo::SHOPPING_LIST_NOTE.to_string(),
    };
    Json(ShoppingListResponse {
        shopping_list: demo::shopping_list(&request.user_ingredients),
        provider: LlmProvider::Demo,
        note: Some(note),
        request_id,
    })
}
