use anyhow::Result;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::util::ServiceExt;

use recipex::aggregator::RecipeAggregator;
use recipex::api::{AppState, create_router};
use recipex::config::Config;
use recipex::demo;
use recipex::llm::GroqClient;

const GROQ_TEST_KEY: &str = "gsk_test_0123456789abcdefghij";

mod test_helpers {
    use super::*;
    use async_trait::async_trait;
    use axum::{Json, extract::State, response::IntoResponse, routing::post};
    use std::collections::HashMap;
    use std::sync::Mutex;

    use recipex::data_models::{RecipeDetail, RecipeSummary, SearchQuery};
    use recipex::providers::{ProviderError, ProviderKind, RecipeProvider};

    /// Secondary-style provider answering from fixed tables.
    #[derive(Default)]
    pub struct FakeProvider {
        pub searches: HashMap<String, Vec<RecipeSummary>>,
        pub details: HashMap<String, RecipeDetail>,
        pub cuisines: Vec<String>,
        pub queries: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl RecipeProvider for FakeProvider {
        fn kind(&self) -> ProviderKind {
            ProviderKind::Secondary
        }

        async fn search(
            &self,
            query: &SearchQuery,
            _limit: usize,
        ) -> Result<Vec<RecipeSummary>, ProviderError> {
            self.queries.lock().unwrap().push(query.query.clone());
            Ok(self.searches.get(&query.query).cloned().unwrap_or_default())
        }

        async fn get_by_id(&self, id: &str) -> Result<RecipeDetail, ProviderError> {
            self.details.get(id).cloned().ok_or(ProviderError::NotFound)
        }

        async fn list_cuisines(&self) -> Result<Vec<String>, ProviderError> {
            if self.cuisines.is_empty() {
                return Err(ProviderError::Unavailable("HTTP 503".to_string()));
            }
            Ok(self.cuisines.clone())
        }
    }

    /// Primary provider without credentials.
    pub struct UnconfiguredPrimary;

    #[async_trait]
    impl RecipeProvider for UnconfiguredPrimary {
        fn kind(&self) -> ProviderKind {
            ProviderKind::Primary
        }

        fn is_configured(&self) -> bool {
            false
        }

        async fn search(
            &self,
            _query: &SearchQuery,
            _limit: usize,
        ) -> Result<Vec<RecipeSummary>, ProviderError> {
            Err(ProviderError::Unavailable("Missing SPOONACULAR_API_KEY".to_string()))
        }

        async fn get_by_id(&self, _id: &str) -> Result<RecipeDetail, ProviderError> {
            Err(ProviderError::Unavailable("Missing SPOONACULAR_API_KEY".to_string()))
        }
    }

    pub fn recipe(id: &str, title: &str, cuisine: &str) -> RecipeSummary {
        RecipeSummary::new(
            id.to_string(),
            title.to_string(),
            cuisine.to_string(),
            "Main Course".to_string(),
            format!("https://img.example/{id}.jpg"),
            None,
            None,
        )
    }

    pub fn provider() -> FakeProvider {
        let mut fake = FakeProvider::default();
        fake.searches.insert(
            "chicken".to_string(),
            vec![
                recipe("52795", "Chicken Handi", "Indian"),
                recipe("52831", "Chicken Karaage", "Japanese"),
            ],
        );
        fake.searches.insert(
            "curry".to_string(),
            vec![
                recipe("52772", "Lamb Curry", "Indian"),
                recipe("52820", "Katsu Chicken Curry", "Japanese"),
            ],
        );
        fake.searches.insert(
            "tomato soup".to_string(),
            vec![recipe("52813", "Tomato Soup", "British")],
        );
        fake.searches.insert(
            "egyptian chicken".to_string(),
            vec![recipe("53065", "Egyptian Fatteh", "Egyptian")],
        );
        fake.details.insert(
            "52772".to_string(),
            RecipeDetail::new(
                recipe("52772", "Lamb Curry", "Indian"),
                "Cook gently.".to_string(),
                vec!["1kg lamb".to_string()],
            ),
        );
        fake
    }

    pub fn app_with(provider: Arc<FakeProvider>, groq: GroqClient, config: Config) -> Router {
        let aggregator = Arc::new(RecipeAggregator::new(Arc::new(UnconfiguredPrimary), provider));
        create_router(AppState::new(config, aggregator, groq))
    }

    pub fn offline_groq() -> GroqClient {
        GroqClient::new(None, "http://127.0.0.1:9", "text", "vision")
    }

    pub fn app(provider: Arc<FakeProvider>) -> Router {
        app_with(provider, offline_groq(), Config::default())
    }

    #[derive(Clone)]
    struct GroqReply {
        status: StatusCode,
        content: String,
    }

    async fn chat_completions(State(reply): State<GroqReply>) -> axum::response::Response {
        if !reply.status.is_success() {
            return (reply.status, "overloaded").into_response();
        }
        Json(json!({
            "choices": [{ "message": { "role": "assistant", "content": reply.content } }]
        }))
        .into_response()
    }

    /// Local stand-in for the Groq chat-completions endpoint.
    pub async fn groq_server(status: StatusCode, content: &str) -> Result<GroqClient> {
        let router = Router::new()
            .route("/chat/completions", post(chat_completions))
            .with_state(GroqReply {
                status,
                content: content.to_string(),
            });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });
        Ok(GroqClient::new(
            Some(GROQ_TEST_KEY.to_string()),
            format!("http://{addr}"),
            "text",
            "vision",
        ))
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    pub fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub async fn extract_json(body: Body) -> Result<Value> {
        let bytes = axum::body::to_bytes(body, usize::MAX).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

use test_helpers::*;

#[tokio::test]
async fn test_health_echoes_request_id() -> Result<()> {
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-123")
        .body(Body::empty())?;

    let response = app(Arc::new(provider())).oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], "req-123");
    let body = extract_json(response.into_body()).await?;
    assert_eq!(body["ok"], true);
    assert_eq!(body["service"], "recipex-api");
    assert_eq!(body["request_id"], "req-123");
    Ok(())
}

#[tokio::test]
async fn test_request_id_is_generated_when_absent() -> Result<()> {
    let response = app(Arc::new(provider())).oneshot(get("/health")).await?;

    let header_id = response.headers()["x-request-id"].to_str()?.to_string();
    let body = extract_json(response.into_body()).await?;
    assert_eq!(header_id.len(), 36);
    assert_eq!(body["request_id"], header_id);
    Ok(())
}

#[tokio::test]
async fn test_cuisines_fall_back_when_provider_fails() -> Result<()> {
    let response = app(Arc::new(provider())).oneshot(get("/api/cuisines")).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await?;
    assert_eq!(body["cuisines"].as_array().map(Vec::len), Some(10));
    assert_eq!(body["cuisines"][0], "American");
    Ok(())
}

#[tokio::test]
async fn test_search_empty_query_returns_no_results() -> Result<()> {
    let fake = Arc::new(provider());
    let response = app(fake.clone()).oneshot(get("/api/search?q=%20%20")).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await?;
    assert_eq!(body["results"], json!([]));
    assert!(body.get("message").is_none());
    assert!(fake.queries.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_search_returns_provider_results() -> Result<()> {
    let response = app(Arc::new(provider()))
        .oneshot(get("/api/search?q=chicken%20curry"))
        .await?;

    let body = extract_json(response.into_body()).await?;
    let ids: Vec<&str> = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r["idMeal"].as_str())
        .collect();
    assert_eq!(ids, vec!["52795", "52831", "52772", "52820"]);
    assert!(body.get("note").is_none());
    assert_eq!(body["results"][0]["strMeal"], "Chicken Handi");
    assert!(
        body["results"][0]["strYoutube"]
            .as_str()
            .unwrap()
            .ends_with("Chicken%20Handi%20recipe")
    );
    Ok(())
}

#[tokio::test]
async fn test_search_without_results_explains() -> Result<()> {
    let response = app(Arc::new(provider()))
        .oneshot(get("/api/search?q=xyzzy"))
        .await?;

    let body = extract_json(response.into_body()).await?;
    assert_eq!(body["results"], json!([]));
    assert!(body["message"].as_str().unwrap().contains("\"xyzzy\""));
    Ok(())
}

#[tokio::test]
async fn test_search_uses_groq_intent_and_explicit_filters_win() -> Result<()> {
    let intent = r#"{"keyword":"curry","cuisine":"Indian","diet":null}"#;

    let groq = groq_server(StatusCode::OK, intent).await?;
    let fake = Arc::new(provider());
    let response = app_with(fake.clone(), groq, Config::default())
        .oneshot(get("/api/search?q=something%20spicy%20from%20delhi"))
        .await?;
    let body = extract_json(response.into_body()).await?;
    assert_eq!(body["results"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["results"][0]["idMeal"], "52772");
    assert_eq!(fake.queries.lock().unwrap()[0], "curry");

    let groq = groq_server(StatusCode::OK, intent).await?;
    let response = app_with(Arc::new(provider()), groq, Config::default())
        .oneshot(get("/api/search?q=curry&cuisine=Japanese"))
        .await?;
    let body = extract_json(response.into_body()).await?;
    assert_eq!(body["results"][0]["idMeal"], "52820");
    Ok(())
}

#[tokio::test]
async fn test_search_notes_groq_intent_failure() -> Result<()> {
    let groq = groq_server(StatusCode::SERVICE_UNAVAILABLE, "").await?;
    let response = app_with(Arc::new(provider()), groq, Config::default())
        .oneshot(get("/api/search?q=chicken"))
        .await?;

    let body = extract_json(response.into_body()).await?;
    assert_eq!(body["results"].as_array().map(Vec::len), Some(2));
    let note = body["note"].as_str().unwrap();
    assert!(note.starts_with("Groq intent fallback used:"));
    assert!(note.contains("503"));
    Ok(())
}

#[tokio::test]
async fn test_recipes_defaults_to_chicken() -> Result<()> {
    let fake = Arc::new(provider());
    let response = app(fake.clone()).oneshot(get("/api/recipes")).await?;

    let body = extract_json(response.into_body()).await?;
    assert_eq!(body["results"].as_array().map(Vec::len), Some(2));
    assert_eq!(fake.queries.lock().unwrap()[0], "chicken");
    Ok(())
}

#[tokio::test]
async fn test_recipe_detail() -> Result<()> {
    let router = app(Arc::new(provider()));

    let response = router.clone().oneshot(get("/api/recipes/52772")).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await?;
    assert_eq!(body["recipe"]["idMeal"], "52772");
    assert_eq!(body["recipe"]["strInstructions"], "Cook gently.");
    assert_eq!(body["recipe"]["ingredients"], json!(["1kg lamb"]));

    let response = router.oneshot(get("/api/recipes/spoon-9999999")).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = extract_json(response.into_body()).await?;
    assert_eq!(body["error"], "Recipe not found");
    assert!(body["request_id"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_analyze_requires_image() -> Result<()> {
    let response = app(Arc::new(provider()))
        .oneshot(post_json("/api/analyze", json!({ "cuisines": ["Thai"] })))
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await?;
    assert_eq!(body["error"], "imageBase64 is required");
    Ok(())
}

#[tokio::test]
async fn test_analyze_demo_mode_enriches_suggestions() -> Result<()> {
    let response = app(Arc::new(provider()))
        .oneshot(post_json(
            "/api/analyze",
            json!({ "imageBase64": "aGVsbG8=", "cuisines": ["Egyptian"] }),
        ))
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await?;
    assert_eq!(body["mode"], "demo");
    assert_eq!(body["provider"], "demo");
    assert_eq!(body["note"], demo::ANALYZE_NOTE);
    assert_eq!(body["image_url"], Value::Null);
    assert_eq!(body["detected_dish"]["name"], "Egyptian pantry ingredients");

    let recipes = body["recipes"].as_array().unwrap();
    assert_eq!(recipes.len(), 3);
    assert_eq!(recipes[0]["themealdb_id"], "53065");
    assert_eq!(recipes[0]["photo_url"], "https://img.example/53065.jpg");
    assert_eq!(recipes[1]["photo_url"], Value::Null);
    assert!(
        recipes[1]["youtube_url"]
            .as_str()
            .unwrap()
            .ends_with("egyptian%20vegetables%20recipe")
    );
    Ok(())
}

#[tokio::test]
async fn test_analyze_live_normalizes_suggestions() -> Result<()> {
    let content = json!({
        "detected_dish": { "name": "Vegetable basket", "confidence": 0.9, "is_food": true },
        "detected_ingredients": [{ "name": "tomato", "quantity": 3, "confidence": 0.8 }],
        "recipes": [
            {
                "name": "  Tomato Soup ",
                "cuisine": "",
                "match_percent": 80,
                "missing_ingredients": ["stock", " "],
                "themealdb_search_query": "tomato soup"
            },
            { "name": "   " }
        ]
    })
    .to_string();
    let groq = groq_server(StatusCode::OK, &format!("```json\n{content}\n```")).await?;

    let response = app_with(Arc::new(provider()), groq, Config::default())
        .oneshot(post_json("/api/analyze", json!({ "imageBase64": "aGVsbG8=" })))
        .await?;

    let body = extract_json(response.into_body()).await?;
    assert_eq!(body["mode"], "live");
    assert_eq!(body["provider"], "groq");
    assert_eq!(body["detected_ingredients"][0]["quantity"], "3");

    let recipes = body["recipes"].as_array().unwrap();
    assert_eq!(recipes.len(), 1);
    assert_eq!(recipes[0]["name"], "Tomato Soup");
    assert_eq!(recipes[0]["cuisine"], "Global");
    assert_eq!(recipes[0]["missing_ingredients"], json!(["stock"]));
    assert_eq!(recipes[0]["themealdb_id"], "52813");
    Ok(())
}

#[tokio::test]
async fn test_analyze_non_food_image_clears_results() -> Result<()> {
    let content = json!({
        "detected_dish": { "name": "Laptop", "confidence": 0.95, "is_food": false },
        "detected_ingredients": [{ "name": "keyboard", "quantity": "1", "confidence": 0.4 }],
        "recipes": [{ "name": "Circuit Stew" }]
    })
    .to_string();
    let groq = groq_server(StatusCode::OK, &content).await?;

    let response = app_with(Arc::new(provider()), groq, Config::default())
        .oneshot(post_json("/api/analyze", json!({ "imageBase64": "aGVsbG8=" })))
        .await?;

    let body = extract_json(response.into_body()).await?;
    assert_eq!(body["detected_dish"]["is_food"], false);
    assert_eq!(body["detected_ingredients"], json!([]));
    assert_eq!(body["recipes"], json!([]));
    assert!(body["note"].as_str().unwrap().contains("No food ingredients detected"));
    Ok(())
}

#[tokio::test]
async fn test_analyze_falls_back_to_demo_when_groq_fails() -> Result<()> {
    let groq = groq_server(StatusCode::INTERNAL_SERVER_ERROR, "").await?;

    let response = app_with(Arc::new(provider()), groq, Config::default())
        .oneshot(post_json("/api/analyze", json!({ "imageBase64": "aGVsbG8=" })))
        .await?;

    let body = extract_json(response.into_body()).await?;
    assert_eq!(body["mode"], "demo");
    assert!(
        body["note"]
            .as_str()
            .unwrap()
            .starts_with("Groq unavailable. Falling back to demo mode.")
    );
    assert_eq!(body["detected_dish"]["name"], "Mixed pantry ingredients");
    Ok(())
}

#[tokio::test]
async fn test_analyze_rejects_oversized_body() -> Result<()> {
    let image = "a".repeat(16 * 1024 * 1024);
    let response = app(Arc::new(provider()))
        .oneshot(post_json("/api/analyze", json!({ "imageBase64": image })))
        .await?;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    Ok(())
}

#[tokio::test]
async fn test_shopping_list_demo() -> Result<()> {
    let response = app(Arc::new(provider()))
        .oneshot(post_json(
            "/api/shopping-list",
            json!({ "recipeNames": ["Lamb Curry"], "userIngredients": ["garlic"] }),
        ))
        .await?;

    let body = extract_json(response.into_body()).await?;
    assert_eq!(body["provider"], "demo");
    assert_eq!(body["note"], demo::SHOPPING_LIST_NOTE);
    let items: Vec<&str> = body["shopping_list"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|i| i["item"].as_str())
        .collect();
    assert_eq!(items, vec!["olive oil", "cumin powder", "yogurt"]);
    Ok(())
}

#[tokio::test]
async fn test_shopping_list_from_groq() -> Result<()> {
    let groq = groq_server(
        StatusCode::OK,
        r#"{"items":[{"item":"rice","quantity":2,"unit":"cups"}]}"#,
    )
    .await?;

    let response = app_with(Arc::new(provider()), groq, Config::default())
        .oneshot(post_json(
            "/api/shopping-list",
            json!({ "recipeNames": ["Lamb Curry"], "userIngredients": [] }),
        ))
        .await?;

    let body = extract_json(response.into_body()).await?;
    assert_eq!(body["provider"], "groq");
    assert!(body.get("note").is_none());
    assert_eq!(
        body["shopping_list"],
        json!([{ "item": "rice", "quantity": "2", "unit": "cups" }])
    );
    Ok(())
}

#[tokio::test]
async fn test_cors_allow_list() -> Result<()> {
    let config = Config {
        allowed_origins: vec!["http://localhost:5173".to_string()],
        ..Config::default()
    };
    let router = app_with(Arc::new(provider()), offline_groq(), config);

    let preflight = Request::builder()
        .method("OPTIONS")
        .uri("/api/search")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .body(Body::empty())?;
    let response = router.oneshot(preflight).await?;

    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:5173"
    );
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS],
        "true"
    );
    Ok(())
}
