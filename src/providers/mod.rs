//! External recipe databases behind one interface.
//!
//! Each provider lives in its own module with the DTOs that match its wire
//! format; only [`RecipeSummary`]/[`RecipeDetail`] leave the module.

use async_trait::async_trait;

use crate::data_models::{RecipeDetail, RecipeSummary, SearchQuery};

pub mod spoonacular;
pub mod themealdb;

pub use spoonacular::SpoonacularClient;
pub use themealdb::TheMealDbClient;

/// Ids minted from the primary provider carry this prefix.
pub const PRIMARY_ID_PREFIX: &str = "spoon-";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// Network failure, non-2xx status or missing credentials.
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    /// The provider confirmed that the id does not exist.
    #[error("Recipe not found")]
    NotFound,

    #[error("Malformed provider payload: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ProviderError::Malformed(e.to_string())
        } else {
            ProviderError::Unavailable(e.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Paid tier with richer metadata (ready time, source url, diet filters).
    Primary,
    /// Free tier, name search only.
    Secondary,
}

/// Routes a unified recipe id to the provider that minted it.
pub fn classify(id: &str) -> ProviderKind {
    if id.starts_with(PRIMARY_ID_PREFIX) {
        ProviderKind::Primary
    } else {
        ProviderKind::Secondary
    }
}

/// The provider-native part of a unified id.
pub fn raw_id(id: &str) -> &str {
    id.strip_prefix(PRIMARY_ID_PREFIX).unwrap_or(id)
}

pub fn primary_id(numeric_id: u64) -> String {
    format!("{PRIMARY_ID_PREFIX}{numeric_id}")
}

#[async_trait]
pub trait RecipeProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Whether the provider has what it needs (credentials) to be called at all.
    fn is_configured(&self) -> bool {
        true
    }

    /// Zero matches is `Ok(vec![])`, never an error.
    async fn search(
        &self,
        query: &SearchQuery,
        limit: usize,
    ) -> Result<Vec<RecipeSummary>, ProviderError>;

    /// Looks up a recipe by its provider-native id (see [`raw_id`]).
    async fn get_by_id(&self, id: &str) -> Result<RecipeDetail, ProviderError>;

    /// Distinct cuisine names the provider knows about.
    async fn list_cuisines(&self) -> Result<Vec<String>, ProviderError> {
        Ok(Vec::new())
    }
}
