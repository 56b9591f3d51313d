//! The AI service: builds requests, consults the session memo, calls the
//! transport and normalizes whatever text comes back.
//!
//! Every operation returns an envelope (or a safe default) instead of an
//! error. Checks run in a fixed order: caller contract, availability, cache,
//! transport, normalizer, cache store. An unavailable service never touches
//! the cache.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::api_connection::{GeminiClient, GenerationRequest, GenerativeTransport, InlineImage};
use crate::cache::{analysis_key, recipe_key, RequestCache, SessionMemo};
use crate::config::AppConfig;
use crate::envelope::{AnalysisResult, Envelope, ExpiredItemsResult, FailureReason, RecipeResult};
use crate::food_item::{FoodCategory, StorageInfo};
use crate::language::Language;
use crate::normalizer::{self, ShapedItem};
use crate::prompts::PromptTemplates;

const MISSING_KEY_WARNING: &str = "Google AI API key is not configured properly";

/// An image plus the reference it is cached under (a path or URI).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    pub reference: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl ImageInput {
    pub fn new(reference: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            reference: reference.into(),
            mime_type: mime_type.into(),
            data,
        }
    }

    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let data = tokio::fs::read(path).await?;
        Ok(Self::new(
            path.display().to_string(),
            mime_from_extension(path),
            data,
        ))
    }

    fn to_inline(&self) -> InlineImage {
        InlineImage {
            mime_type: self.mime_type.clone(),
            data: self.data.clone(),
        }
    }
}

/// Unknown or missing extensions are sent as JPEG.
pub fn mime_from_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}

pub struct FoodAiService {
    transport: Option<Arc<dyn GenerativeTransport>>,
    templates: PromptTemplates,
    analysis_cache: Box<dyn RequestCache<AnalysisResult>>,
    recipe_cache: Box<dyn RequestCache<RecipeResult>>,
}

impl fmt::Debug for FoodAiService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FoodAiService")
            .field("model", &self.transport.as_ref().map(|t| t.model_name()))
            .field("cached_analyses", &self.analysis_cache.len())
            .field("cached_recipes", &self.recipe_cache.len())
            .finish()
    }
}

impl FoodAiService {
    pub fn new(transport: Arc<dyn GenerativeTransport>) -> Self {
        Self::with_transport(Some(transport))
    }

    /// A service with no credential; every AI call fails fast.
    pub fn unavailable() -> Self {
        Self::with_transport(None)
    }

    fn with_transport(transport: Option<Arc<dyn GenerativeTransport>>) -> Self {
        Self {
            transport,
            templates: PromptTemplates::default(),
            analysis_cache: Box::new(SessionMemo::<AnalysisResult>::new()),
            recipe_cache: Box::new(SessionMemo::<RecipeResult>::new()),
        }
    }

    /// Never fails: a missing key yields an unavailable service and a warning.
    pub fn from_config(config: &AppConfig) -> Self {
        match &config.api_key {
            Some(key) => {
                let client = GeminiClient::new(key.as_str())
                    .with_model(config.model.as_str())
                    .with_base_url(config.base_url.as_str());
                tracing::info!(model = %config.model, "AI service configured");
                Self::new(Arc::new(client))
            }
            None => {
                tracing::warn!("{}", MISSING_KEY_WARNING);
                Self::unavailable()
            }
        }
    }

    pub fn with_templates(mut self, templates: PromptTemplates) -> Self {
        self.templates = templates;
        self
    }

    pub fn with_caches(
        mut self,
        analysis: Box<dyn RequestCache<AnalysisResult>>,
        recipes: Box<dyn RequestCache<RecipeResult>>,
    ) -> Self {
        self.analysis_cache = analysis;
        self.recipe_cache = recipes;
        self
    }

    pub fn is_available(&self) -> bool {
        self.transport.is_some()
    }

    pub fn clear_cache(&self) {
        self.analysis_cache.clear();
        self.recipe_cache.clear();
        tracing::info!("AI response cache cleared");
    }

    fn transport(&self) -> Result<&Arc<dyn GenerativeTransport>, FailureReason> {
        self.transport.as_ref().ok_or_else(|| {
            tracing::debug!("AI call skipped: service unavailable");
            FailureReason::ServiceUnavailable
        })
    }

    async fn complete(
        transport: &Arc<dyn GenerativeTransport>,
        request: &GenerationRequest,
    ) -> Result<String, FailureReason> {
        match transport.generate(request).await {
            Ok(raw) => {
                tracing::debug!(model = transport.model_name(), raw = %raw, "model replied");
                Ok(raw)
            }
            Err(e) => {
                tracing::warn!(model = transport.model_name(), error = %e, "model call failed");
                Err(FailureReason::Transport(e.to_string()))
            }
        }
    }

    async fn run_list<T: ShapedItem>(
        transport: &Arc<dyn GenerativeTransport>,
        request: &GenerationRequest,
    ) -> Envelope<T> {
        match Self::complete(transport, request).await {
            Ok(raw) => normalizer::normalize_list(&raw),
            Err(reason) => Envelope::Failure(reason),
        }
    }

    /// Detects food items in a photo. Memoized per image reference and language.
    pub async fn analyze_image(&self, image: &ImageInput, language: Language) -> AnalysisResult {
        let transport = match self.transport() {
            Ok(t) => t,
            Err(reason) => return Envelope::Failure(reason),
        };

        let key = analysis_key(&image.reference, language);
        if let Some(hit) = self.analysis_cache.get(&key) {
            tracing::info!(key = %key, "analysis served from cache");
            return hit;
        }

        let request = self.templates.analysis_request(image.to_inline(), language);
        let result = Self::run_list(transport, &request).await;
        tracing::info!(
            success = result.is_success(),
            items = result.items().len(),
            "image analyzed"
        );
        self.analysis_cache.set(key, result.clone());
        result
    }

    /// Suggests recipes for the given ingredients. Memoized per ingredient
    /// set, style and language.
    pub async fn generate_recipe_suggestions(
        &self,
        ingredients: &[String],
        style: Option<&str>,
        language: Language,
    ) -> RecipeResult {
        let request = match self.templates.recipe_request(ingredients, style, language) {
            Ok(request) => request,
            Err(_) => return Envelope::Failure(FailureReason::NoIngredients),
        };
        let transport = match self.transport() {
            Ok(t) => t,
            Err(reason) => return Envelope::Failure(reason),
        };

        let key = recipe_key(ingredients, style, language);
        if let Some(hit) = self.recipe_cache.get(&key) {
            tracing::info!(key = %key, "recipes served from cache");
            return hit;
        }

        let result = Self::run_list(transport, &request).await;
        tracing::info!(
            success = result.is_success(),
            recipes = result.items().len(),
            "recipes generated"
        );
        self.recipe_cache.set(key, result.clone());
        result
    }

    pub async fn detect_expired_items(
        &self,
        image: &ImageInput,
        language: Language,
    ) -> ExpiredItemsResult {
        let transport = match self.transport() {
            Ok(t) => t,
            Err(reason) => return Envelope::Failure(reason),
        };
        let request = self.templates.expired_request(image.to_inline(), language);
        Self::run_list(transport, &request).await
    }

    /// Falls back to `Other` on any failure.
    pub async fn categorize_food(&self, name: &str, language: Language) -> FoodCategory {
        let Ok(transport) = self.transport() else {
            return FoodCategory::Other;
        };
        let request = self.templates.category_request(name, language);
        match Self::complete(transport, &request).await {
            Ok(raw) => normalizer::normalize_category(&raw),
            Err(_) => FoodCategory::Other,
        }
    }

    /// Falls back to `StorageInfo::fallback` on any failure.
    pub async fn storage_info(&self, name: &str, language: Language) -> StorageInfo {
        let Ok(transport) = self.transport() else {
            return StorageInfo::fallback(name, language);
        };
        let request = self.templates.storage_info_request(name, language);
        match Self::complete(transport, &request).await {
            Ok(raw) => normalizer::normalize_storage_info(&raw, name, language),
            Err(_) => StorageInfo::fallback(name, language),
        }
    }
}
