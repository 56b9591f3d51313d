use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use super::{DetectedItem, ExpiredItem, ResponseShape, ShapedItem};
use crate::food_item::{FoodCategory, StorageInfo};
use crate::language::Language;
use crate::recipe::{Difficulty, Recipe, RecipeIngredient};

pub(crate) const DEFAULT_UNIT: &str = "개";

lazy_static! {
    static ref MINUTES_RE: Regex = Regex::new(r"^(\d+(?:\.\d+)?)\s*(?:분|min|mins|minutes)?$").unwrap();
}

/// Numbers pass through and strings must be a whole number (`"5"`, `" 2.5 "`).
/// Strings with units or separators (`"3개"`, `"1,000"`) are rejected, as
/// are non-finite results.
pub(crate) fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Cooking times also accept a minute suffix (`"20분"`, `"15 min"`).
fn coerce_minutes(value: &Value) -> Option<f64> {
    coerce_number(value).or_else(|| {
        let s = value.as_str()?.trim().to_lowercase();
        MINUTES_RE
            .captures(&s)
            .and_then(|c| c[1].parse::<f64>().ok())
            .filter(|n| n.is_finite())
    })
}

fn text(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| {
        value
            .get(*k)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

fn field<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| value.get(*k)).filter(|v| !v.is_null())
}

fn bounding_box(value: &Value) -> Option<[u16; 4]> {
    let coords = field(value, &["box_2d", "boundingBox", "bounding_box"])?.as_array()?;
    if coords.len() != 4 {
        return None;
    }
    let mut out = [0u16; 4];
    for (slot, raw) in out.iter_mut().zip(coords) {
        let n = coerce_number(raw)?;
        if !(0.0..=1000.0).contains(&n) {
            return None;
        }
        *slot = n.round() as u16;
    }
    Some(out)
}

impl ShapedItem for DetectedItem {
    const SHAPE: ResponseShape = ResponseShape::FoodItems;

    fn from_value(value: &Value) -> Option<Self> {
        let name = text(value, &["name"])?;
        let quantity = field(value, &["quantity", "amount"]).and_then(coerce_number)?;
        if quantity <= 0.0 {
            return None;
        }

        Some(DetectedItem {
            name,
            quantity,
            unit: text(value, &["unit"]).unwrap_or_else(|| DEFAULT_UNIT.to_string()),
            category: text(value, &["category"])
                .map(|c| FoodCategory::from_label(&c))
                .unwrap_or(FoodCategory::Other),
            bounding_box: bounding_box(value),
        })
    }
}

fn ingredient(value: &Value) -> Option<RecipeIngredient> {
    match value {
        Value::String(line) => RecipeIngredient::parse_line(line),
        Value::Object(_) => {
            let name = text(value, &["name", "item"])?;
            let required = match field(value, &["required"]).and_then(Value::as_bool) {
                Some(required) => required,
                None => !field(value, &["optional"])
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            };
            Some(RecipeIngredient {
                name,
                quantity: field(value, &["quantity", "amount"])
                    .and_then(coerce_number)
                    .filter(|q| *q >= 0.0),
                unit: text(value, &["unit"]).unwrap_or_default(),
                required,
            })
        }
        _ => None,
    }
}

fn instructions(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(steps)) => steps
            .iter()
            .filter_map(|step| match step {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                Value::Object(_) => text(step, &["text", "step", "description"]),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(block)) => block
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

impl ShapedItem for Recipe {
    const SHAPE: ResponseShape = ResponseShape::Recipes;

    fn from_value(value: &Value) -> Option<Self> {
        let name = text(value, &["name", "title"])?;
        let ingredients = field(value, &["ingredients"])
            .and_then(Value::as_array)
            .map(|list| list.iter().filter_map(ingredient).collect())
            .unwrap_or_default();
        let cooking_time_minutes = field(value, &["cookingTime", "cooking_time", "cookingTimeMinutes"])
            .and_then(coerce_minutes)
            .filter(|m| *m >= 0.0)
            .map(|m| m.round() as u32);

        Some(Recipe {
            name,
            ingredients,
            difficulty: text(value, &["difficulty"])
                .map(|d| Difficulty::from_label(&d))
                .unwrap_or_default(),
            cooking_time_minutes,
            instructions: instructions(field(value, &["instructions", "steps"])),
        })
    }
}

impl ShapedItem for ExpiredItem {
    const SHAPE: ResponseShape = ResponseShape::ExpiredItems;

    fn from_value(value: &Value) -> Option<Self> {
        Some(ExpiredItem {
            name: text(value, &["name"])?,
            reason: text(value, &["reason"]).unwrap_or_default(),
            confidence: field(value, &["confidence"])
                .and_then(coerce_number)
                .map(|c| c.clamp(0.0, 1.0))
                .unwrap_or(0.0),
        })
    }
}

/// Fills a `StorageInfo` from a parsed object, taking each missing or
/// unusable field from the fallback.
pub(crate) fn storage_info(value: &Value, name: &str, language: Language) -> StorageInfo {
    let fallback = StorageInfo::fallback(name, language);
    let storage_days = field(value, &["storage_days", "storageDays"])
        .and_then(coerce_number)
        .map(f64::round)
        .filter(|d| *d >= 1.0 && *d <= StorageInfo::MAX_DAYS as f64)
        .map(|d| d as i64)
        .unwrap_or(fallback.storage_days);
    StorageInfo {
        category: text(value, &["category"])
            .map(|c| FoodCategory::from_label(&c))
            .unwrap_or(fallback.category),
        storage_days,
        storage_desc: text(value, &["storage_desc", "storageDesc"])
            .unwrap_or_else(|| StorageInfo::describe_days(storage_days, language)),
        storage_method: text(value, &["storage_method", "storageMethod"])
            .unwrap_or(fallback.storage_method),
        name: fallback.name,
    }
}

/// Keeps every element that passes its shape check; the rest are dropped.
pub(crate) fn collect<T: ShapedItem>(list: Option<&Value>) -> Vec<T> {
    let Some(Value::Array(entries)) = list else {
        return Vec::new();
    };
    let items: Vec<T> = entries.iter().filter_map(T::from_value).collect();
    if items.len() < entries.len() {
        tracing::debug!(
            shape = ?T::SHAPE,
            kept = items.len(),
            dropped = entries.len() - items.len(),
            "dropped entries failing shape checks"
        );
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerce_number_handles_strings() {
        assert_eq!(coerce_number(&json!(3)), Some(3.0));
        assert_eq!(coerce_number(&json!("5")), Some(5.0));
        assert_eq!(coerce_number(&json!(" 2.5 ")), Some(2.5));
        assert_eq!(coerce_number(&json!("many")), None);
        assert_eq!(coerce_number(&json!(null)), None);
        assert_eq!(coerce_number(&json!(true)), None);
    }

    #[test]
    fn strings_with_units_or_separators_are_not_numbers() {
        assert_eq!(coerce_number(&json!("3개")), None);
        assert_eq!(coerce_number(&json!("2.5kg")), None);
        assert_eq!(coerce_number(&json!("1,000")), None);
        assert_eq!(coerce_number(&json!("inf")), None);

        assert!(DetectedItem::from_value(&json!({"name": "쌀", "quantity": "1,000"})).is_none());
        assert!(DetectedItem::from_value(&json!({"name": "사과", "quantity": "3개"})).is_none());
    }

    #[test]
    fn cooking_time_accepts_minute_suffix_only() {
        assert_eq!(coerce_minutes(&json!("20분")), Some(20.0));
        assert_eq!(coerce_minutes(&json!("15 min")), Some(15.0));
        assert_eq!(coerce_minutes(&json!(30)), Some(30.0));
        assert_eq!(coerce_minutes(&json!("1,5분")), None);
        assert_eq!(coerce_minutes(&json!("2시간")), None);
    }

    #[test]
    fn detected_item_shape_checks() {
        let ok = DetectedItem::from_value(&json!({
            "name": "  사과  ", "quantity": "3", "category": "과일", "box_2d": [100, 200, 500, 600]
        }))
        .unwrap();
        assert_eq!(ok.name, "사과");
        assert_eq!(ok.quantity, 3.0);
        assert_eq!(ok.unit, "개");
        assert_eq!(ok.category, FoodCategory::Fruit);
        assert_eq!(ok.bounding_box, Some([100, 200, 500, 600]));

        assert!(DetectedItem::from_value(&json!({"name": "", "quantity": 2})).is_none());
        assert!(DetectedItem::from_value(&json!({"name": "우유", "quantity": -1})).is_none());
        assert!(DetectedItem::from_value(&json!({"name": "우유", "quantity": 0})).is_none());
        assert!(DetectedItem::from_value(&json!({"name": "우유"})).is_none());
        assert!(DetectedItem::from_value(&json!({"name": "우유", "quantity": "lots"})).is_none());
    }

    #[test]
    fn out_of_range_box_is_dropped_not_the_item() {
        let item = DetectedItem::from_value(&json!({
            "name": "egg", "quantity": 6, "box_2d": [0, 0, 2000, 10]
        }))
        .unwrap();
        assert!(item.bounding_box.is_none());
    }

    #[test]
    fn recipe_coerces_mixed_fields() {
        let recipe = Recipe::from_value(&json!({
            "name": "간장 닭볶음",
            "ingredients": ["닭고기 300g", {"name": "파", "optional": true}, 7],
            "difficulty": "쉬움",
            "cookingTime": "20분",
            "instructions": ["1. 자른다", "", 2]
        }))
        .unwrap();
        assert_eq!(recipe.ingredients.len(), 2);
        assert_eq!(recipe.ingredients[0].quantity, Some(300.0));
        assert!(!recipe.ingredients[1].required);
        assert_eq!(recipe.difficulty, Difficulty::Easy);
        assert_eq!(recipe.cooking_time_minutes, Some(20));
        assert_eq!(recipe.instructions, vec!["1. 자른다", "2"]);

        assert!(Recipe::from_value(&json!({"ingredients": []})).is_none());
    }

    #[test]
    fn expired_item_confidence_is_clamped() {
        let item = ExpiredItem::from_value(&json!({"name": "우유", "confidence": 1.7})).unwrap();
        assert_eq!(item.confidence, 1.0);
        assert_eq!(item.reason, "");
    }

    #[test]
    fn storage_info_fills_gaps_from_fallback() {
        let info = storage_info(
            &json!({"category": "채소", "storage_days": "5", "storage_method": "키친타월로 감싸 냉장"}),
            " 상추 ",
            Language::Korean,
        );
        assert_eq!(info.name, "상추");
        assert_eq!(info.category, FoodCategory::Vegetable);
        assert_eq!(info.storage_days, 5);
        assert_eq!(info.storage_desc, "5일");
        assert_eq!(info.storage_method, "키친타월로 감싸 냉장");

        let info = storage_info(&json!({"storage_days": -3}), "milk", Language::English);
        assert_eq!(info, StorageInfo::fallback("milk", Language::English));
    }

    #[test]
    fn description_follows_the_days_it_was_given() {
        let info = storage_info(&json!({"storage_days": 3}), "두부", Language::Korean);
        assert_eq!(info.storage_days, 3);
        assert_eq!(info.storage_desc, "3일");

        let info = storage_info(&json!({"storage_days": 2.6}), "tofu", Language::English);
        assert_eq!(info.storage_desc, "3 days");
    }

    #[test]
    fn absurd_storage_days_fall_back() {
        for days in [json!(1e30), json!(3651), json!(0.2), json!("1e300")] {
            let info = storage_info(&json!({ "storage_days": days }), "꿀", Language::Korean);
            assert_eq!(info.storage_days, StorageInfo::DEFAULT_DAYS);
            assert_eq!(info.storage_desc, "7일");
        }
        let info = storage_info(&json!({"storage_days": 3650}), "꿀", Language::Korean);
        assert_eq!(info.storage_days, StorageInfo::MAX_DAYS);
    }

    #[test]
    fn collect_ignores_non_arrays() {
        let items: Vec<DetectedItem> = collect(Some(&json!({"name": "x"})));
        assert!(items.is_empty());
        let items: Vec<DetectedItem> = collect(None);
        assert!(items.is_empty());
    }
}
