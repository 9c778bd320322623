use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, FromRequestParts},
    http::{HeaderName, HeaderValue, Method, StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::convert::Infallible;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::aggregator::RecipeAggregator;
use crate::config::Config;
use crate::llm::GroqClient;
use crate::media::MediaEnricher;
use crate::providers::{SpoonacularClient, TheMealDbClient};

pub mod handlers;
pub mod models;

use models::ErrorResponse;

/// Pantry photos arrive base64-encoded in the JSON body.
pub const MAX_BODY_BYTES: usize = 15 * 1024 * 1024;

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub aggregator: Arc<RecipeAggregator>,
    pub media: Arc<MediaEnricher>,
    pub llm: Arc<GroqClient>,
}

impl AppState {
    pub fn new(config: Config, aggregator: Arc<RecipeAggregator>, llm: GroqClient) -> Self {
        Self {
            config: Arc::new(config),
            media: Arc::new(MediaEnricher::new(aggregator.clone())),
            aggregator,
            llm: Arc::new(llm),
        }
    }

    /// Wires the live Spoonacular/TheMealDB/Groq clients from configuration.
    pub fn from_config(config: Config) -> Self {
        let aggregator = Arc::new(RecipeAggregator::new(
            Arc::new(SpoonacularClient::from_config(&config)),
            Arc::new(TheMealDbClient::from_config(&config)),
        ));
        let llm = GroqClient::from_config(&config);
        Self::new(config, aggregator, llm)
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/api/cuisines", get(handlers::cuisines_handler))
        .route("/api/search", get(handlers::search_handler))
        .route("/api/recipes", get(handlers::recipes_handler))
        .route("/api/recipes/:id", get(handlers::recipe_detail_handler))
        .route("/api/analyze", post(handlers::analyze_handler))
        .route("/api/shopping-list", post(handlers::shopping_list_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}

/// Open CORS when no origins are configured, otherwise an explicit allow-list.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "cors.invalid_origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

/// The id stamped on the request by `SetRequestIdLayer`, echoed in every body.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .unwrap_or("n/a");
        Ok(RequestId(id.to_string()))
    }
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub request_id: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>, request_id: String) -> Self {
        Self {
            status,
            message: message.into(),
            request_id,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.message,
            request_id: self.request_id,
        };
        (self.status, Json(body)).into_response()
    }
}
