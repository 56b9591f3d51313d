//! Success/failure envelopes returned by every AI operation instead of errors.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::language::Language;
use crate::normalizer::{DetectedItem, ExpiredItem, ResponseShape};
use crate::recipe::Recipe;

/// Why an AI operation produced no result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The caller supplied no ingredients; no request was sent.
    NoIngredients,
    /// The model returned nothing at all for a `ResponseShape` request.
    NoItemsDetected(ResponseShape),
    /// The model answered but the text could not be parsed into `ResponseShape`.
    ParseFailure(ResponseShape),
    /// No API credential was configured.
    ServiceUnavailable,
    /// The call itself failed; carries the underlying message.
    Transport(String),
}

impl FailureReason {
    pub fn localized(&self, language: Language) -> String {
        match (self, language) {
            (FailureReason::Transport(message), _) => message.clone(),
            (_, Language::English) => self.to_string(),
            (FailureReason::NoIngredients, Language::Korean) => "재료가 입력되지 않았습니다".to_string(),
            (FailureReason::NoItemsDetected(shape), Language::Korean) => match shape {
                ResponseShape::FoodItems => "식재료를 찾을 수 없습니다".to_string(),
                ResponseShape::Recipes => "추천할 레시피를 받지 못했습니다".to_string(),
                ResponseShape::ExpiredItems => "상한 식재료를 찾을 수 없습니다".to_string(),
            },
            (FailureReason::ParseFailure(_), Language::Korean) => {
                "AI 응답을 해석하지 못했습니다".to_string()
            }
            (FailureReason::ServiceUnavailable, Language::Korean) => {
                "AI 서비스를 사용할 수 없습니다. API 키 설정을 확인해주세요".to_string()
            }
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::NoIngredients => f.write_str("No ingredients provided"),
            FailureReason::NoItemsDetected(shape) => match shape {
                ResponseShape::FoodItems => f.write_str("No food items detected"),
                ResponseShape::Recipes => f.write_str("No recipes generated"),
                ResponseShape::ExpiredItems => f.write_str("No expired items detected"),
            },
            FailureReason::ParseFailure(shape) => match shape {
                ResponseShape::FoodItems => f.write_str("Failed to parse AI response"),
                ResponseShape::Recipes => f.write_str("Failed to parse recipe response"),
                ResponseShape::ExpiredItems => {
                    f.write_str("Failed to parse expired items response")
                }
            },
            FailureReason::ServiceUnavailable => {
                f.write_str("AI service is not available: API key is not configured")
            }
            FailureReason::Transport(message) => f.write_str(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<T> {
    Success(Vec<T>),
    Failure(FailureReason),
}

pub type AnalysisResult = Envelope<DetectedItem>;
pub type RecipeResult = Envelope<Recipe>;
pub type ExpiredItemsResult = Envelope<ExpiredItem>;

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success(_))
    }

    /// The items on success; an empty slice on failure.
    pub fn items(&self) -> &[T] {
        match self {
            Envelope::Success(items) => items,
            Envelope::Failure(_) => &[],
        }
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        match self {
            Envelope::Success(_) => None,
            Envelope::Failure(reason) => Some(reason),
        }
    }

    /// Canonical (English) error message, if this is a failure.
    pub fn error(&self) -> Option<String> {
        self.failure().map(|r| r.to_string())
    }
}

/// Serializes as `{"success": bool, "items": [...], "error": "..."}`.
impl<T: Serialize> Serialize for Envelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire<'a, T> {
            success: bool,
            items: &'a [T],
            #[serde(skip_serializing_if = "Option::is_none")]
            error: Option<String>,
        }

        Wire {
            success: self.is_success(),
            items: self.items(),
            error: self.error(),
        }
        .serialize(serializer)
    }
}
