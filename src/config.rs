use crate::api_connection::endpoints::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::language::Language;

pub const API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";
pub const LEGACY_API_KEY_ENV_VAR: &str = "GOOGLE_GENERATIVE_AI_KEY";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `None` when no usable key is configured; the AI service then runs
    /// in its permanently-unavailable mode.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub language: Language,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            language: Language::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = non_blank(API_KEY_ENV_VAR).or_else(|| non_blank(LEGACY_API_KEY_ENV_VAR));
        let model = non_blank("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = non_blank("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let language = match non_blank("APP_LANGUAGE") {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "ignoring APP_LANGUAGE");
                Language::default()
            }),
            None => Language::default(),
        };

        Self {
            api_key,
            model,
            base_url,
            language,
        }
    }
}
