use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::language::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Accepts English and Korean labels; anything else is `Medium`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "easy" | "쉬움" | "매우 쉬움" | "매우쉬움" => Difficulty::Easy,
            "hard" | "어려움" | "매우 어려움" | "매우어려움" => Difficulty::Hard,
            _ => Difficulty::Medium,
        }
    }

    pub fn label(self, language: Language) -> &'static str {
        match (self, language) {
            (Difficulty::Easy, Language::English) => "easy",
            (Difficulty::Medium, Language::English) => "medium",
            (Difficulty::Hard, Language::English) => "hard",
            (Difficulty::Easy, Language::Korean) => "쉬움",
            (Difficulty::Medium, Language::Korean) => "보통",
            (Difficulty::Hard, Language::Korean) => "어려움",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: String,
    #[serde(default = "required_by_default")]
    pub required: bool,
}

fn required_by_default() -> bool {
    true
}

lazy_static! {
    static ref INGREDIENT_LINE_RE: Regex =
        Regex::new(r"^(?P<name>.*?\S)\s*(?P<qty>\d+(?:\.\d+)?)\s*(?P<unit>[^\d\s]*)$").unwrap();
}

impl RecipeIngredient {
    /// Splits a free-text line like `"김치 200g"` into name, quantity and unit.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        if let Some(caps) = INGREDIENT_LINE_RE.captures(line) {
            let quantity = caps["qty"].parse::<f64>().ok();
            return Some(Self {
                name: caps["name"].trim().to_string(),
                quantity,
                unit: caps["unit"].to_string(),
                required: true,
            });
        }

        Some(Self {
            name: line.to_string(),
            quantity: None,
            unit: String::new(),
            required: true,
        })
    }
}

/// A recipe suggested by the model or loaded from storage. There are no
/// mutating methods; a saved recipe is never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    pub ingredients: Vec<RecipeIngredient>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooking_time_minutes: Option<u32>,
    #[serde(default)]
    pub instructions: Vec<String>,
}

impl Recipe {
    /// Required ingredients not covered by anything in `on_hand`
    /// (case-insensitive substring match in either direction).
    pub fn missing_ingredients<'a>(&'a self, on_hand: &[String]) -> Vec<&'a RecipeIngredient> {
        let on_hand: Vec<String> = on_hand
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        self.ingredients
            .iter()
            .filter(|ingredient| ingredient.required)
            .filter(|ingredient| {
                let name = ingredient.name.to_lowercase();
                !on_hand
                    .iter()
                    .any(|have| name.contains(have.as_str()) || have.contains(name.as_str()))
            })
            .collect()
    }
}
