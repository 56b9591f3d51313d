use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::language::Language;
use crate::normalizer::DetectedItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoodCategory {
    Fruit,
    Vegetable,
    Meat,
    Dairy,
    Grain,
    Beverage,
    Condiment,
    Frozen,
    Other,
}

pub const FOOD_CATEGORIES: [FoodCategory; 9] = [
    FoodCategory::Fruit,
    FoodCategory::Vegetable,
    FoodCategory::Meat,
    FoodCategory::Dairy,
    FoodCategory::Grain,
    FoodCategory::Beverage,
    FoodCategory::Condiment,
    FoodCategory::Frozen,
    FoodCategory::Other,
];

impl FoodCategory {
    /// Lenient parse of an English or Korean label. Unknown labels are `Other`.
    pub fn from_label(label: &str) -> Self {
        let cleaned = label
            .trim()
            .trim_matches(|c: char| c == '"' || c == '\'' || c == '.' || c == '`')
            .trim()
            .to_lowercase();
        match cleaned.as_str() {
            "fruit" | "fruits" | "과일" => FoodCategory::Fruit,
            "vegetable" | "vegetables" | "채소" | "야채" => FoodCategory::Vegetable,
            "meat" | "meats" | "육류" | "고기" => FoodCategory::Meat,
            "dairy" | "유제품" => FoodCategory::Dairy,
            "grain" | "grains" | "곡물" | "곡류" => FoodCategory::Grain,
            "beverage" | "beverages" | "drink" | "drinks" | "음료" => FoodCategory::Beverage,
            "condiment" | "condiments" | "seasoning" | "조미료" | "양념" => {
                FoodCategory::Condiment
            }
            "frozen" | "냉동" | "냉동식품" => FoodCategory::Frozen,
            _ => FoodCategory::Other,
        }
    }

    pub fn label(self, language: Language) -> &'static str {
        match language {
            Language::English => match self {
                FoodCategory::Fruit => "fruit",
                FoodCategory::Vegetable => "vegetable",
                FoodCategory::Meat => "meat",
                FoodCategory::Dairy => "dairy",
                FoodCategory::Grain => "grain",
                FoodCategory::Beverage => "beverage",
                FoodCategory::Condiment => "condiment",
                FoodCategory::Frozen => "frozen",
                FoodCategory::Other => "other",
            },
            Language::Korean => match self {
                FoodCategory::Fruit => "과일",
                FoodCategory::Vegetable => "채소",
                FoodCategory::Meat => "육류",
                FoodCategory::Dairy => "유제품",
                FoodCategory::Grain => "곡물",
                FoodCategory::Beverage => "음료",
                FoodCategory::Condiment => "조미료",
                FoodCategory::Frozen => "냉동",
                FoodCategory::Other => "기타",
            },
        }
    }

    /// Shelf life used when nothing better is known.
    pub fn default_shelf_life_days(self) -> i64 {
        match self {
            FoodCategory::Fruit => 7,
            FoodCategory::Vegetable => 7,
            FoodCategory::Meat => 3,
            FoodCategory::Dairy => 10,
            FoodCategory::Grain => 180,
            FoodCategory::Beverage => 30,
            FoodCategory::Condiment => 180,
            FoodCategory::Frozen => 90,
            FoodCategory::Other => 7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoodStatus {
    Fresh,
    Expired,
    Consumed,
    Frozen,
    Disposed,
}

impl FoodStatus {
    /// Lifecycle moves forward only, except that frozen and fresh can swap.
    pub fn can_transition_to(self, next: FoodStatus) -> bool {
        use FoodStatus::*;
        matches!(
            (self, next),
            (Fresh, Frozen | Expired | Consumed | Disposed)
                | (Frozen, Fresh | Expired | Consumed | Disposed)
                | (Expired, Consumed | Disposed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, FoodStatus::Consumed | FoodStatus::Disposed)
    }
}

impl fmt::Display for FoodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FoodStatus::Fresh => "fresh",
            FoodStatus::Expired => "expired",
            FoodStatus::Consumed => "consumed",
            FoodStatus::Frozen => "frozen",
            FoodStatus::Disposed => "disposed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum InventoryError {
    #[error("food item name must not be empty")]
    EmptyName,
    #[error("quantity must be a finite number >= 0, got {0}")]
    InvalidQuantity(f64),
    #[error("remaining amount must be within 0..=1, got {0}")]
    InvalidRemaining(f64),
    #[error("cannot move item from {from} to {to}")]
    InvalidTransition { from: FoodStatus, to: FoodStatus },
    #[error("shelf life of {0} days does not fit the calendar")]
    ShelfLifeOutOfRange(i64),
}

/// Deserializing goes through [`RawFoodItem`], so a stored item gets the
/// same checks as one built with [`FoodItem::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFoodItem")]
pub struct FoodItem {
    pub id: Uuid,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub category: FoodCategory,
    pub added_on: NaiveDate,
    pub expires_on: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frozen_on: Option<NaiveDate>,
    pub status: FoodStatus,
    pub remaining: f64,
    pub owner_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

/// A stored item as written on disk, before validation.
#[derive(Debug, Deserialize)]
pub struct RawFoodItem {
    id: Uuid,
    name: String,
    quantity: f64,
    #[serde(default)]
    unit: String,
    category: FoodCategory,
    added_on: NaiveDate,
    expires_on: NaiveDate,
    #[serde(default)]
    frozen_on: Option<NaiveDate>,
    status: FoodStatus,
    #[serde(default = "full")]
    remaining: f64,
    owner_id: Uuid,
    #[serde(default)]
    memo: Option<String>,
}

fn full() -> f64 {
    1.0
}

impl TryFrom<RawFoodItem> for FoodItem {
    type Error = InventoryError;

    fn try_from(raw: RawFoodItem) -> Result<Self, Self::Error> {
        let name = raw.name.trim();
        if name.is_empty() {
            return Err(InventoryError::EmptyName);
        }
        if !raw.quantity.is_finite() || raw.quantity < 0.0 {
            return Err(InventoryError::InvalidQuantity(raw.quantity));
        }
        if !(0.0..=1.0).contains(&raw.remaining) {
            return Err(InventoryError::InvalidRemaining(raw.remaining));
        }

        Ok(Self {
            id: raw.id,
            name: name.to_string(),
            quantity: raw.quantity,
            unit: raw.unit.trim().to_string(),
            category: raw.category,
            added_on: raw.added_on,
            expires_on: raw.expires_on,
            frozen_on: raw.frozen_on,
            status: raw.status,
            remaining: raw.remaining,
            owner_id: raw.owner_id,
            memo: raw.memo,
        })
    }
}

impl FoodItem {
    pub fn new(
        name: &str,
        quantity: f64,
        unit: &str,
        category: FoodCategory,
        added_on: NaiveDate,
        expires_on: NaiveDate,
        owner_id: Uuid,
    ) -> Result<Self, InventoryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(InventoryError::EmptyName);
        }
        if !quantity.is_finite() || quantity < 0.0 {
            return Err(InventoryError::InvalidQuantity(quantity));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            quantity,
            unit: unit.trim().to_string(),
            category,
            added_on,
            expires_on,
            frozen_on: None,
            status: FoodStatus::Fresh,
            remaining: 1.0,
            owner_id,
            memo: None,
        })
    }

    /// Builds an inventory entry from a model detection. `shelf_life_days`
    /// falls back to the category default.
    pub fn from_detected(
        detected: &DetectedItem,
        owner_id: Uuid,
        added_on: NaiveDate,
        shelf_life_days: Option<i64>,
    ) -> Result<Self, InventoryError> {
        let days = shelf_life_days
            .filter(|d| *d > 0)
            .unwrap_or_else(|| detected.category.default_shelf_life_days());
        let expires_on = Duration::try_days(days)
            .and_then(|shelf_life| added_on.checked_add_signed(shelf_life))
            .ok_or(InventoryError::ShelfLifeOutOfRange(days))?;
        Self::new(
            &detected.name,
            detected.quantity,
            &detected.unit,
            detected.category,
            added_on,
            expires_on,
            owner_id,
        )
    }

    pub fn transition(&mut self, next: FoodStatus) -> Result<(), InventoryError> {
        if !self.status.can_transition_to(next) {
            return Err(InventoryError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    pub fn freeze(&mut self, today: NaiveDate) -> Result<(), InventoryError> {
        self.transition(FoodStatus::Frozen)?;
        self.frozen_on = Some(today);
        Ok(())
    }

    pub fn thaw(&mut self) -> Result<(), InventoryError> {
        if self.status != FoodStatus::Frozen {
            return Err(InventoryError::InvalidTransition {
                from: self.status,
                to: FoodStatus::Fresh,
            });
        }
        self.transition(FoodStatus::Fresh)?;
        self.frozen_on = None;
        Ok(())
    }

    pub fn dispose(&mut self) -> Result<(), InventoryError> {
        self.transition(FoodStatus::Disposed)
    }

    pub fn set_remaining(&mut self, remaining: f64) -> Result<(), InventoryError> {
        if !(0.0..=1.0).contains(&remaining) {
            return Err(InventoryError::InvalidRemaining(remaining));
        }
        if self.status.is_terminal() {
            return Err(InventoryError::InvalidTransition {
                from: self.status,
                to: self.status,
            });
        }
        self.remaining = remaining;
        if remaining == 0.0 {
            self.transition(FoodStatus::Consumed)?;
        }
        Ok(())
    }

    /// Uses up `fraction` of the whole item. Hitting zero marks it consumed.
    pub fn consume(&mut self, fraction: f64) -> Result<(), InventoryError> {
        if !fraction.is_finite() || fraction < 0.0 {
            return Err(InventoryError::InvalidRemaining(fraction));
        }
        let left = (self.remaining - fraction).max(0.0);
        self.set_remaining(left)
    }

    /// Marks a fresh item expired once `today` is past its expiry date.
    /// Returns whether the status changed.
    pub fn refresh_status(&mut self, today: NaiveDate) -> bool {
        if self.status == FoodStatus::Fresh && today > self.expires_on {
            self.status = FoodStatus::Expired;
            return true;
        }
        false
    }
}

/// How long an item keeps and how to store it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageInfo {
    pub name: String,
    pub category: FoodCategory,
    pub storage_days: i64,
    pub storage_desc: String,
    pub storage_method: String,
}

impl StorageInfo {
    pub const DEFAULT_DAYS: i64 = 7;
    /// Anything longer than ten years is treated as a bad answer.
    pub const MAX_DAYS: i64 = 3650;

    pub fn describe_days(days: i64, language: Language) -> String {
        match language {
            Language::Korean => format!("{}일", days),
            Language::English => format!("{} days", days),
        }
    }

    /// Used whenever the model cannot answer.
    pub fn fallback(name: &str, language: Language) -> Self {
        let method = match language {
            Language::Korean => "냉장 보관하세요",
            Language::English => "Keep refrigerated",
        };
        Self {
            name: name.trim().to_string(),
            category: FoodCategory::Other,
            storage_days: Self::DEFAULT_DAYS,
            storage_desc: Self::describe_days(Self::DEFAULT_DAYS, language),
            storage_method: method.to_string(),
        }
    }
}
