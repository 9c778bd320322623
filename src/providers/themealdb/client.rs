//! TheMealDB HTTP client
//!
//! Free tier, no authentication. Name search only: diet and time filters
//! cannot be expressed and cuisine filtering is left to the caller.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{adapter, dto};
use crate::config::Config;
use crate::data_models::{RecipeDetail, RecipeSummary, SearchQuery};
use crate::providers::{ProviderError, ProviderKind, RecipeProvider};

pub struct TheMealDbClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl TheMealDbClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.themealdb_base_url.clone())
    }

    async fn get_meals<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<T>, ProviderError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self.http_client.get(&url).query(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Unavailable(format!(
                "TheMealDB {endpoint} returned HTTP {status}"
            )));
        }

        let body = response.json::<dto::MealsResponse<T>>().await?;
        Ok(body.meals.unwrap_or_default())
    }

    /// `search.php?s=<term>`: partial name match.
    pub async fn search_by_name(&self, term: &str) -> Result<Vec<RecipeSummary>, ProviderError> {
        let meals: Vec<dto::Meal> = self.get_meals("search.php", &[("s", term)]).await?;
        debug!(term, result_count = meals.len(), "themealdb.search");
        Ok(meals.iter().map(adapter::to_summary).collect())
    }

    /// `lookup.php?i=<id>`: `{"meals": null}` means the id does not exist.
    pub async fn lookup(&self, id: &str) -> Result<RecipeDetail, ProviderError> {
        let meals: Vec<dto::Meal> = self.get_meals("lookup.php", &[("i", id)]).await?;
        meals
            .into_iter()
            .next()
            .map(adapter::to_detail)
            .ok_or(ProviderError::NotFound)
    }

    /// `list.php?a=list`
    pub async fn areas(&self) -> Result<Vec<String>, ProviderError> {
        let areas: Vec<dto::Area> = self.get_meals("list.php", &[("a", "list")]).await?;
        Ok(adapter::to_cuisines(areas))
    }
}

#[async_trait]
impl RecipeProvider for TheMealDbClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Secondary
    }

    async fn search(
        &self,
        query: &SearchQuery,
        _limit: usize,
    ) -> Result<Vec<RecipeSummary>, ProviderError> {
        self.search_by_name(&query.query).await
    }

    async fn get_by_id(&self, id: &str) -> Result<RecipeDetail, ProviderError> {
        self.lookup(id).await
    }

    async fn list_cuisines(&self) -> Result<Vec<String>, ProviderError> {
        self.areas().await
    }
}
