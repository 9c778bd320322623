use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_SPOONACULAR_BASE_URL: &str = "https://api.spoonacular.com";
pub const DEFAULT_THEMEALDB_BASE_URL: &str = "https://www.themealdb.com/api/json/v1/1";
pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_GROQ_TEXT_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_GROQ_VISION_MODEL: &str = "meta-llama/llama-4-scout-17b-16e-instruct";

/// Process-wide settings, read once at start-up and handed to every client.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub spoonacular_api_key: Option<String>,
    pub spoonacular_base_url: String,
    pub themealdb_base_url: String,
    pub groq_api_key: Option<String>,
    pub groq_base_url: String,
    pub groq_text_model: String,
    pub groq_vision_model: String,
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let get_or_default = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT must be a valid port number, got {raw:?}"))?,
            None => DEFAULT_PORT,
        };

        let allowed_origins = get("ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Config {
            host: get_or_default("HOST", DEFAULT_HOST),
            port,
            allowed_origins,
            spoonacular_api_key: get("SPOONACULAR_API_KEY"),
            spoonacular_base_url: trim_base_url(get_or_default(
                "SPOONACULAR_BASE_URL",
                DEFAULT_SPOONACULAR_BASE_URL,
            )),
            themealdb_base_url: trim_base_url(get_or_default(
                "THEMEALDB_BASE_URL",
                DEFAULT_THEMEALDB_BASE_URL,
            )),
            groq_api_key: get("GROQ_API_KEY"),
            groq_base_url: trim_base_url(get_or_default("GROQ_BASE_URL", DEFAULT_GROQ_BASE_URL)),
            groq_text_model: get_or_default("GROQ_TEXT_MODEL", DEFAULT_GROQ_TEXT_MODEL),
            groq_vision_model: get_or_default("GROQ_VISION_MODEL", DEFAULT_GROQ_VISION_MODEL),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            allowed_origins: Vec::new(),
            spoonacular_api_key: None,
            spoonacular_base_url: DEFAULT_SPOONACULAR_BASE_URL.to_string(),
            themealdb_base_url: DEFAULT_THEMEALDB_BASE_URL.to_string(),
            groq_api_key: None,
            groq_base_url: DEFAULT_GROQ_BASE_URL.to_string(),
            groq_text_model: DEFAULT_GROQ_TEXT_MODEL.to_string(),
            groq_vision_model: DEFAULT_GROQ_VISION_MODEL.to_string(),
        }
    }
}

/// Rejects missing keys and the placeholders people leave in `.env.example` copies.
pub fn is_usable_api_key(value: Option<&str>) -> bool {
    let Some(value) = value else {
        return false;
    };
    if value.contains("...") {
        return false;
    }
    if value.to_lowercase().contains("your_") {
        return false;
    }
    value.len() > 20
}

fn trim_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
