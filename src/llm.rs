//! Groq chat-completions client (OpenAI-compatible API).
//!
//! Every call asks for a JSON object back; [`parse_llm_json`] tolerates the
//! usual model noise around it (code fences, leading prose).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value, json};
use tracing::debug;

use crate::config::{Config, is_usable_api_key};

const TEMPERATURE: f64 = 0.2;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Missing GROQ_API_KEY")]
    MissingKey,

    #[error("Groq API error: {status} {body}")]
    Http { status: u16, body: String },

    #[error("Groq request failed: {0}")]
    Network(String),

    #[error("Empty Groq response")]
    EmptyResponse,

    #[error("Failed to parse Groq JSON: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        LlmError::Network(e.to_string())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchIntent {
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub diet: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ShoppingItem {
    pub item: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub quantity: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub unit: String,
}

impl ShoppingItem {
    pub fn new(item: &str, quantity: &str, unit: &str) -> Self {
        Self {
            item: item.to_string(),
            quantity: quantity.to_string(),
            unit: unit.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DetectedDish {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default = "default_true")]
    pub is_food: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DetectedIngredient {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub quantity: String,
    #[serde(default)]
    pub confidence: f64,
}

/// A dish the model suggests for the scanned pantry. Every field is optional
/// because model output is only loosely shaped; see [`RecipeSuggestion::normalized`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct RecipeSuggestion {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub match_percent: Option<Number>,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub missing_ingredients: Vec<String>,
    #[serde(default)]
    pub cooking_time_minutes: Option<Number>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub calories_per_serving: Option<Number>,
    #[serde(default)]
    pub servings: Option<Number>,
    #[serde(default)]
    pub themealdb_search_query: Option<String>,
}

impl RecipeSuggestion {
    /// Drops nameless suggestions and fills the fields the client relies on.
    pub fn normalized(mut self) -> Option<Self> {
        let name = self.name.as_deref().map(str::trim).unwrap_or_default().to_string();
        if name.is_empty() {
            return None;
        }

        let cuisine = self
            .cuisine
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or("Global")
            .to_string();
        let query = self
            .themealdb_search_query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .unwrap_or(name.as_str())
            .to_string();
        self.missing_ingredients = self
            .missing_ingredients
            .iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect();

        self.name = Some(name);
        self.cuisine = Some(cuisine);
        self.themealdb_search_query = Some(query);
        Some(self)
    }

    /// The text used to look the dish up in the recipe providers.
    pub fn search_text(&self) -> &str {
        self.themealdb_search_query
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct PantryAnalysis {
    #[serde(default)]
    pub detected_dish: Option<DetectedDish>,
    #[serde(default)]
    pub detected_ingredients: Vec<DetectedIngredient>,
    #[serde(default)]
    pub recipes: Vec<RecipeSuggestion>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct AnalyzeFilters {
    #[serde(default)]
    pub diet: Option<String>,
    #[serde(default, rename = "maxTime")]
    pub max_time: Option<Number>,
    #[serde(default)]
    pub difficulty: Option<String>,
}

#[derive(Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

struct ChatRequest<'a> {
    model: &'a str,
    system_instruction: &'a str,
    user_text: String,
    image_base64: Option<&'a str>,
    max_tokens: u32,
}

pub struct GroqClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    text_model: String,
    vision_model: String,
}

impl GroqClient {
    pub fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
        text_model: impl Into<String>,
        vision_model: impl Into<String>,
    ) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_key,
            base_url: base_url.into(),
            text_model: text_model.into(),
            vision_model: vision_model.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.groq_api_key.clone(),
            config.groq_base_url.clone(),
            config.groq_text_model.clone(),
            config.groq_vision_model.clone(),
        )
    }

    pub fn is_configured(&self) -> bool {
        is_usable_api_key(self.api_key.as_deref())
    }

    async fn complete(&self, request: ChatRequest<'_>) -> Result<String, LlmError> {
        let api_key = match self.api_key.as_deref() {
            Some(key) if is_usable_api_key(Some(key)) => key,
            _ => return Err(LlmError::MissingKey),
        };

        let user_content = match request.image_base64 {
            Some(image) => json!([
                { "type": "text", "text": request.user_text },
                {
                    "type": "image_url",
                    "image_url": { "url": format!("data:image/jpeg;base64,{image}") }
                }
            ]),
            None => Value::String(request.user_text),
        };

        let body = json!({
            "model": request.model,
            "messages": [
                { "role": "system", "content": request.system_instruction },
                { "role": "user", "content": user_content }
            ],
            "temperature": TEMPERATURE,
            "max_tokens": request.max_tokens,
            "response_format": { "type": "json_object" }
        });

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Http {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        let completion = response
            .json::<ChatCompletion>()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let text = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(LlmError::EmptyResponse)?;

        debug!(model = request.model, chars = text.len(), "groq.completion");
        Ok(text)
    }

    pub async fn extract_search_intent(&self, query: &str) -> Result<SearchIntent, LlmError> {
        let text = self
            .complete(ChatRequest {
                model: &self.text_model,
                system_instruction: "Extract recipe search intent from user query. Return JSON only: \
                    {\"keyword\":\"string\",\"cuisine\":\"string|null\",\"diet\":\"string|null\"}",
                user_text: query.to_string(),
                image_base64: None,
                max_tokens: 256,
            })
            .await?;
        parse_llm_json(&text)
    }

    pub async fn generate_shopping_list(
        &self,
        recipe_names: &[String],
        user_ingredients: &[String],
    ) -> Result<Vec<ShoppingItem>, LlmError> {
        let text = self
            .complete(ChatRequest {
                model: &self.text_model,
                system_instruction: "Generate a deduplicated shopping list. Return JSON array only: \
                    [{\"item\":\"string\",\"quantity\":\"string\",\"unit\":\"string\"}]",
                user_text: format!(
                    "Recipes: {}. User has: {}.",
                    recipe_names.join(", "),
                    user_ingredients.join(", ")
                ),
                image_base64: None,
                max_tokens: 512,
            })
            .await?;
        parse_llm_json(&text)
    }

    pub async fn analyze_pantry(
        &self,
        image_base64: &str,
        cuisines: &[String],
        filters: &AnalyzeFilters,
    ) -> Result<PantryAnalysis, LlmError> {
        let preferred = if cuisines.is_empty() {
            "any".to_string()
        } else {
            cuisines.join(", ")
        };
        let user_text = format!(
            "Preferred cuisines: {preferred}; Filters: diet={}, maxTime={}, difficulty={}.",
            filters.diet.as_deref().unwrap_or("none"),
            filters
                .max_time
                .as_ref()
                .map(|n| n.to_string())
                .unwrap_or_else(|| "any".to_string()),
            filters.difficulty.as_deref().unwrap_or("any"),
        );

        let text = self
            .complete(ChatRequest {
                model: &self.vision_model,
                system_instruction: ANALYZE_INSTRUCTION,
                user_text,
                image_base64: Some(image_base64),
                max_tokens: 2048,
            })
            .await?;
        parse_llm_json(&text)
    }
}

const ANALYZE_INSTRUCTION: &str = "You are a culinary assistant. \
Analyze pantry ingredient images and return strict JSON only. \
If the image is not food/ingredients, set detected_dish.is_food=false and return empty detected_ingredients and recipes. \
Return shape: {\"detected_dish\":{\"name\":\"string\",\"confidence\":0.0,\"is_food\":true},\
\"detected_ingredients\":[{\"name\":\"string\",\"quantity\":\"string\",\"confidence\":0.0}],\
\"recipes\":[{\"name\":\"string\",\"cuisine\":\"string\",\"match_percent\":0,\"missing_ingredients\":[\"string\"],\
\"cooking_time_minutes\":0,\"difficulty\":\"easy|intermediate|advanced\",\"description\":\"string\",\
\"calories_per_serving\":0,\"servings\":0,\"themealdb_search_query\":\"string\"}]}";

/// Parses model output that should be JSON: strips code fences, then falls back
/// to the outermost object, then the outermost array.
pub fn parse_llm_json<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    let cleaned = strip_code_fences(text);
    let first_error = match serde_json::from_str::<T>(cleaned) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    for (open, close) in [('{', '}'), ('[', ']')] {
        if let (Some(start), Some(end)) = (cleaned.find(open), cleaned.rfind(close)) {
            if end > start {
                if let Ok(value) = serde_json::from_str::<T>(&cleaned[start..=end]) {
                    return Ok(value);
                }
            }
        }
    }

    Err(LlmError::Parse(first_error.to_string()))
}

fn strip_code_fences(text: &str) -> &str {
    let mut cleaned = text.trim();
    if cleaned
        .get(..7)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("```json"))
    {
        cleaned = &cleaned[7..];
    } else if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest;
    }
    cleaned = cleaned.strip_suffix("```").unwrap_or(cleaned);
    cleaned.trim()
}

fn default_true() -> bool {
    true
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        _ => Vec::new(),
    })
}
