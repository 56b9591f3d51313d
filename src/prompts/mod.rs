//! Prompt templates and the request builders that fill them in.

mod templates;

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::HashMap;
use thiserror::Error;

use crate::api_connection::{GenerationRequest, InlineImage};
use crate::language::Language;

lazy_static! {
    static ref PLACEHOLDER_RE: Regex = Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").unwrap();
}

/// Structured extraction wants a cold model; recipe ideas a warmer one.
const EXTRACTION_TEMPERATURE: f32 = 0.2;
const RECIPE_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("No ingredients provided")]
pub struct EmptyIngredients;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    FoodAnalysis,
    RecipeRecommendation,
    RecipeRecommendationStyled,
    ExpiredDetection,
    FoodCategory,
    StorageInfo,
}

impl PromptKind {
    fn base_key(self) -> &'static str {
        match self {
            PromptKind::FoodAnalysis => "food_analysis",
            PromptKind::RecipeRecommendation => "recipe_recommendation",
            PromptKind::RecipeRecommendationStyled => "recipe_recommendation_styled",
            PromptKind::ExpiredDetection => "expired_detection",
            PromptKind::FoodCategory => "food_category",
            PromptKind::StorageInfo => "storage_info",
        }
    }

    /// Registry key, e.g. `recipe_recommendation_ko`.
    pub fn key(self, language: Language) -> String {
        format!("{}_{}", self.base_key(), language.code())
    }

    fn builtin(self, language: Language) -> &'static str {
        use templates::*;
        match (self, language) {
            (PromptKind::FoodAnalysis, Language::Korean) => FOOD_ANALYSIS_KO,
            (PromptKind::FoodAnalysis, Language::English) => FOOD_ANALYSIS_EN,
            (PromptKind::RecipeRecommendation, Language::Korean) => RECIPE_KO,
            (PromptKind::RecipeRecommendation, Language::English) => RECIPE_EN,
            (PromptKind::RecipeRecommendationStyled, Language::Korean) => RECIPE_STYLED_KO,
            (PromptKind::RecipeRecommendationStyled, Language::English) => RECIPE_STYLED_EN,
            (PromptKind::ExpiredDetection, Language::Korean) => EXPIRED_KO,
            (PromptKind::ExpiredDetection, Language::English) => EXPIRED_EN,
            (PromptKind::FoodCategory, Language::Korean) => CATEGORY_KO,
            (PromptKind::FoodCategory, Language::English) => CATEGORY_EN,
            (PromptKind::StorageInfo, Language::Korean) => STORAGE_INFO_KO,
            (PromptKind::StorageInfo, Language::English) => STORAGE_INFO_EN,
        }
    }
}

/// Substitutes `{{name}}` placeholders. Placeholders with no entry in `vars`
/// are left untouched; present-but-empty values render as empty text.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures| {
            let name = &caps[1];
            match vars.iter().find(|(key, _)| *key == name) {
                Some((_, value)) => value.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Built-in templates plus per-key overrides, which win.
#[derive(Debug, Clone, Default)]
pub struct PromptTemplates {
    overrides: HashMap<String, String>,
}

impl PromptTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_override(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.overrides.insert(key.into(), template.into());
        self
    }

    pub fn template(&self, kind: PromptKind, language: Language) -> &str {
        self.overrides
            .get(&kind.key(language))
            .map(String::as_str)
            .unwrap_or_else(|| kind.builtin(language))
    }

    pub fn analysis_request(&self, image: InlineImage, language: Language) -> GenerationRequest {
        let prompt = self.template(PromptKind::FoodAnalysis, language).to_string();
        GenerationRequest::with_image(prompt, image).temperature(EXTRACTION_TEMPERATURE)
    }

    /// One of four variants: plain or styled, Korean or English. A blank
    /// style counts as no style.
    pub fn recipe_request(
        &self,
        ingredients: &[String],
        style: Option<&str>,
        language: Language,
    ) -> Result<GenerationRequest, EmptyIngredients> {
        let names: Vec<&str> = ingredients
            .iter()
            .map(|i| i.trim())
            .filter(|i| !i.is_empty())
            .collect();
        if names.is_empty() {
            return Err(EmptyIngredients);
        }
        let joined = names.join(", ");

        let prompt = match style.map(str::trim).filter(|s| !s.is_empty()) {
            Some(style) => render(
                self.template(PromptKind::RecipeRecommendationStyled, language),
                &[("ingredients", &joined), ("style", style)],
            ),
            None => render(
                self.template(PromptKind::RecipeRecommendation, language),
                &[("ingredients", &joined)],
            ),
        };
        Ok(GenerationRequest::text(prompt).temperature(RECIPE_TEMPERATURE))
    }

    pub fn expired_request(&self, image: InlineImage, language: Language) -> GenerationRequest {
        let prompt = self.template(PromptKind::ExpiredDetection, language).to_string();
        GenerationRequest::with_image(prompt, image).temperature(EXTRACTION_TEMPERATURE)
    }

    pub fn category_request(&self, name: &str, language: Language) -> GenerationRequest {
        let prompt = render(
            self.template(PromptKind::FoodCategory, language),
            &[("name", name.trim())],
        );
        GenerationRequest::text(prompt).temperature(0.0)
    }

    pub fn storage_info_request(&self, name: &str, language: Language) -> GenerationRequest {
        let prompt = render(
            self.template(PromptKind::StorageInfo, language),
            &[("name", name.trim())],
        );
        GenerationRequest::text(prompt).temperature(EXTRACTION_TEMPERATURE)
    }
}

pub fn build_analysis_request(image: InlineImage, language: Language) -> GenerationRequest {
    PromptTemplates::default().analysis_request(image, language)
}

pub fn build_recipe_request(
    ingredients: &[String],
    style: Option<&str>,
    language: Language,
) -> Result<GenerationRequest, EmptyIngredients> {
    PromptTemplates::default().recipe_request(ingredients, style, language)
}

pub fn build_expired_request(image: InlineImage, language: Language) -> GenerationRequest {
    PromptTemplates::default().expired_request(image, language)
}

pub fn build_category_request(name: &str, language: Language) -> GenerationRequest {
    PromptTemplates::default().category_request(name, language)
}

pub fn build_storage_info_request(name: &str, language: Language) -> GenerationRequest {
    PromptTemplates::default().storage_info_request(name, language)
}
