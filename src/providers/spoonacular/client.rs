//! Spoonacular HTTP client
//!
//! Query-string authenticated (`apiKey=`). Every call fails fast with
//! `Unavailable` when no usable key is configured, so nothing goes on the wire.

use async_trait::async_trait;
use tracing::debug;

use super::{adapter, dto};
use crate::config::{Config, is_usable_api_key};
use crate::data_models::{RecipeDetail, RecipeSummary, SearchQuery};
use crate::providers::{ProviderError, ProviderKind, RecipeProvider};

pub const DEFAULT_RESULT_COUNT: usize = 12;

pub struct SpoonacularClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl SpoonacularClient {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_key,
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.spoonacular_api_key.clone(),
            config.spoonacular_base_url.clone(),
        )
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        match self.api_key.as_deref() {
            Some(key) if is_usable_api_key(Some(key)) => Ok(key),
            _ => Err(ProviderError::Unavailable(
                "Missing SPOONACULAR_API_KEY".to_string(),
            )),
        }
    }

    /// `GET /recipes/complexSearch`. A `limit` of zero uses the provider default page size.
    pub async fn complex_search(
        &self,
        query: &SearchQuery,
        limit: usize,
    ) -> Result<Vec<RecipeSummary>, ProviderError> {
        let api_key = self.api_key()?;
        let number = if limit == 0 { DEFAULT_RESULT_COUNT } else { limit };

        let mut params: Vec<(&str, String)> = vec![
            ("apiKey", api_key.to_string()),
            ("query", query.query.clone()),
            ("number", number.to_string()),
            ("addRecipeInformation", "true".to_string()),
        ];
        if let Some(cuisine) = &query.cuisine {
            params.push(("cuisine", cuisine.clone()));
        }
        if let Some(diet) = &query.diet {
            params.push(("diet", diet.clone()));
        }
        if let Some(max_time) = query.max_time {
            params.push(("maxReadyTime", max_time.to_string()));
        }

        let url = format!("{}/recipes/complexSearch", self.base_url);
        let response = self.http_client.get(&url).query(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Unavailable(format!(
                "Spoonacular search returned HTTP {status}"
            )));
        }

        let body = response.json::<dto::ComplexSearchResponse>().await?;
        let results: Vec<RecipeSummary> = body
            .results
            .unwrap_or_default()
            .into_iter()
            .map(adapter::to_summary)
            .collect();

        debug!(query = %query.query, result_count = results.len(), "spoonacular.search");
        Ok(results)
    }

    /// `GET /recipes/{id}/information`; HTTP 404 maps to `NotFound`.
    pub async fn recipe_information(&self, id: u64) -> Result<RecipeDetail, ProviderError> {
        let api_key = self.api_key()?;

        let url = format!("{}/recipes/{}/information", self.base_url, id);
        let response = self
            .http_client
            .get(&url)
            .query(&[("apiKey", api_key), ("includeNutrition", "false")])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound);
        }
        if !status.is_success() {
            return Err(ProviderError::Unavailable(format!(
                "Spoonacular recipe {id} returned HTTP {status}"
            )));
        }

        let information = response.json::<dto::RecipeInformation>().await?;
        Ok(adapter::to_detail(information))
    }
}

#[async_trait]
impl RecipeProvider for SpoonacularClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Primary
    }

    fn is_configured(&self) -> bool {
        self.api_key().is_ok()
    }

    async fn search(
        &self,
        query: &SearchQuery,
        limit: usize,
    ) -> Result<Vec<RecipeSummary>, ProviderError> {
        self.complex_search(query, limit).await
    }

    async fn get_by_id(&self, id: &str) -> Result<RecipeDetail, ProviderError> {
        let numeric_id = id.parse::<u64>().map_err(|_| ProviderError::NotFound)?;
        self.recipe_information(numeric_id).await
    }
}
