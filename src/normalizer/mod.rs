//! Turns free-text model output into typed envelopes.
//!
//! The pipeline is a fixed sequence of small steps: strip code fences, find
//! balanced `{...}` fragments, parse (retrying with repair passes), pick the
//! fragment carrying the expected key, validate entries. When nothing parses,
//! "nothing found" phrasing becomes an empty success and everything else a
//! parse failure. Nothing here panics or performs I/O.

pub(crate) mod repair;
pub(crate) mod validate;

use lazy_static::lazy_static;
use regex::{Regex, RegexSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::envelope::{Envelope, FailureReason};
use crate::food_item::{FoodCategory, StorageInfo};
use crate::language::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseShape {
    FoodItems,
    Recipes,
    ExpiredItems,
}

impl ResponseShape {
    pub fn list_key(self) -> &'static str {
        match self {
            ResponseShape::FoodItems => "items",
            ResponseShape::Recipes => "recipes",
            ResponseShape::ExpiredItems => "expiredItems",
        }
    }
}

/// A list element the normalizer knows how to validate.
pub trait ShapedItem: Sized {
    const SHAPE: ResponseShape;

    /// `None` drops the element.
    fn from_value(value: &Value) -> Option<Self>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedItem {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub category: FoodCategory,
    /// `[ymin, xmin, ymax, xmax]`, normalized to 0..=1000.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<[u16; 4]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpiredItem {
    pub name: String,
    pub reason: String,
    pub confidence: f64,
}

lazy_static! {
    static ref CODE_FENCE_RE: Regex = Regex::new(r"(?i)```(?:json|javascript|js)?").unwrap();
    static ref NO_RESULT_PHRASES: RegexSet = RegexSet::new([
        r"(?i)\bno\s+(?:food|foods|food items?|items?|ingredients?|groceries|recipes?|expired items?|spoiled (?:food|items?))\b[^.\n]{0,30}\b(?:detected|found|identified|visible|present|recognized)",
        r"(?i)\b(?:could not|couldn't|can't|cannot|unable to|did not|didn't)\s+(?:find|detect|identify|see|recognize|spot)\s+(?:any|food)",
        r"(?i)\bthere (?:are|is|were|was) no\s+(?:food|items?|ingredients?|groceries|expired)",
        r"(?i)^\s*(?:none|nothing (?:detected|found))\.?\s*$",
        r"(?:식재료|음식|재료|식품|상한 것|레시피)(?:가|를|이|은|는)?\s*(?:찾을 수 없|감지되지 않|발견되지 않|보이지 않|확인되지 않|없습니다|없어요|없음)",
    ])
    .unwrap();
}

pub(crate) fn strip_code_fences(raw: &str) -> String {
    CODE_FENCE_RE.replace_all(raw, "").trim().to_string()
}

/// Top-level balanced `{...}` spans in order of appearance. Braces inside
/// double-quoted strings are ignored. If no span balances, falls back to the
/// text between the first `{` and the last `}`.
pub(crate) fn extract_fragments(text: &str) -> Vec<&str> {
    let mut fragments = Vec::new();
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escaped = false;

    for (i, b) in text.bytes().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' if depth > 0 => in_string = true,
            b'{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            b'}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(s) = start.take() {
                        fragments.push(&text[s..=i]);
                    }
                }
            }
            _ => {}
        }
    }

    if fragments.is_empty() {
        if let (Some(s), Some(e)) = (text.find('{'), text.rfind('}')) {
            if s < e {
                fragments.push(&text[s..=e]);
            }
        }
    }
    fragments
}

/// Direct parse, then each repair pass in turn.
pub(crate) fn parse_with_repairs(fragment: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(fragment) {
        return Some(value);
    }
    repair::PASSES.iter().find_map(|pass| {
        let repaired = pass.apply(fragment);
        let parsed = serde_json::from_str::<Value>(&repaired).ok();
        if parsed.is_some() {
            tracing::debug!(pass = pass.name, "model output parsed after repair");
        }
        parsed
    })
}

/// The first fragment whose object carries `key`; otherwise the first
/// fragment that parsed as an object at all.
fn locate_object(raw: &str, key: Option<&str>) -> Option<Value> {
    let text = strip_code_fences(raw);
    let mut fallback = None;

    for fragment in extract_fragments(&text) {
        let Some(value) = parse_with_repairs(fragment) else {
            continue;
        };
        if !value.is_object() {
            continue;
        }
        match key {
            Some(k) if value.get(k).is_some() => return Some(value),
            None => return Some(value),
            Some(_) => {
                fallback.get_or_insert(value);
            }
        }
    }
    fallback
}

pub fn is_no_result_phrase(raw: &str) -> bool {
    NO_RESULT_PHRASES.is_match(raw)
}

/// Normalizes a list-shaped answer (`{"items": [...]}` and friends).
pub fn normalize_list<T: ShapedItem>(raw: &str) -> Envelope<T> {
    let shape = T::SHAPE;
    if raw.trim().is_empty() {
        return Envelope::Failure(FailureReason::NoItemsDetected(shape));
    }

    match locate_object(raw, Some(shape.list_key())) {
        Some(value) => Envelope::Success(validate::collect::<T>(value.get(shape.list_key()))),
        None if is_no_result_phrase(raw) => {
            tracing::debug!(?shape, "model reported no results");
            Envelope::Success(Vec::new())
        }
        None => {
            tracing::debug!(?shape, raw = %raw, "model output could not be parsed");
            Envelope::Failure(FailureReason::ParseFailure(shape))
        }
    }
}

/// Normalizes a single-object answer; `None` when nothing usable parsed.
pub fn normalize_object(raw: &str) -> Option<Value> {
    if raw.trim().is_empty() {
        return None;
    }
    locate_object(raw, None)
}

/// Storage details for `name`; the fallback when nothing usable parsed.
pub fn normalize_storage_info(raw: &str, name: &str, language: Language) -> StorageInfo {
    match normalize_object(raw) {
        Some(value) => validate::storage_info(&value, name, language),
        None => StorageInfo::fallback(name, language),
    }
}

/// Normalizes a bare category answer such as `"채소"` or `Vegetable.`.
pub fn normalize_category(raw: &str) -> FoodCategory {
    let cleaned = strip_code_fences(raw);
    let first_line = cleaned.lines().next().unwrap_or_default();
    let direct = FoodCategory::from_label(first_line);
    if direct != FoodCategory::Other {
        return direct;
    }

    locate_object(&cleaned, Some("category"))
        .and_then(|v| v.get("category").and_then(Value::as_str).map(FoodCategory::from_label))
        .unwrap_or(FoodCategory::Other)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::Recipe;

    #[test]
    fn fenced_korean_items_parse() {
        let raw = "```json\n{\"items\":[{\"name\":\"사과\",\"quantity\":3,\"unit\":\"개\",\"category\":\"과일\"}]}\n```";
        let result = normalize_list::<DetectedItem>(raw);
        let items = result.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "사과");
        assert_eq!(items[0].quantity, 3.0);
        assert_eq!(items[0].category, FoodCategory::Fruit);
    }

    #[test]
    fn prose_around_json_is_discarded() {
        let raw = "Sure! Here is what I found:\n{\"items\": [{\"name\": \"양파\", \"quantity\": 2}]}\nLet me know if you need more.";
        let result = normalize_list::<DetectedItem>(raw);
        assert!(result.is_success());
        assert_eq!(result.items()[0].name, "양파");
    }

    #[test]
    fn invalid_entries_are_dropped_not_fatal() {
        let raw = r#"{"items":[{"name":"당근","quantity":"5"},{"name":"","quantity":2},{"name":"우유","quantity":-1}]}"#;
        let result = normalize_list::<DetectedItem>(raw);
        assert!(result.is_success());
        assert_eq!(result.items().len(), 1);
        assert_eq!(result.items()[0].quantity, 5.0);
    }

    #[test]
    fn first_fragment_with_expected_key_wins() {
        let raw = r#"Note: {"comment": "two answers"} and then {"recipes": [{"name": "비빔밥"}]} and {"recipes": []}"#;
        let result = normalize_list::<Recipe>(raw);
        assert_eq!(result.items().len(), 1);
        assert_eq!(result.items()[0].name, "비빔밥");
    }

    #[test]
    fn object_without_key_is_empty_success() {
        let result = normalize_list::<DetectedItem>(r#"{"message": "ok"}"#);
        assert_eq!(result, Envelope::Success(Vec::new()));
    }

    #[test]
    fn braces_inside_strings_do_not_split_fragments() {
        let text = r#"x {"a": "}{", "b": {"c": 1}} y {"d": 2}"#;
        assert_eq!(
            extract_fragments(text),
            vec![r#"{"a": "}{", "b": {"c": 1}}"#, r#"{"d": 2}"#]
        );
    }

    #[test]
    fn unbalanced_text_falls_back_to_outer_span() {
        assert_eq!(extract_fragments("}{ \"a\": 1 }"), vec!["{ \"a\": 1 }"]);
        assert_eq!(
            extract_fragments(r#"{"a": {"b": 1} trailing"#),
            vec![r#"{"a": {"b": 1}"#]
        );
        assert!(extract_fragments("no braces here").is_empty());
    }

    #[test]
    fn trailing_commas_are_repaired() {
        let raw = r#"{"items": [{"name": "egg", "quantity": 6,},],}"#;
        let result = normalize_list::<DetectedItem>(raw);
        assert_eq!(result.items().len(), 1);
    }

    #[test]
    fn adjacent_objects_are_repaired() {
        let raw = r#"{"items": [{"name": "egg", "quantity": 6} {"name": "milk", "quantity": 1}]}"#;
        let result = normalize_list::<DetectedItem>(raw);
        assert_eq!(result.items().len(), 2);
    }

    #[test]
    fn no_detection_phrase_is_empty_success() {
        let result = normalize_list::<DetectedItem>("No food items were detected in this image.");
        assert_eq!(result, Envelope::Success(Vec::new()));

        let result = normalize_list::<DetectedItem>("이미지에서 식재료를 찾을 수 없습니다.");
        assert_eq!(result, Envelope::Success(Vec::new()));
    }

    #[test]
    fn garbage_is_parse_failure() {
        let result = normalize_list::<DetectedItem>("Invalid JSON");
        assert_eq!(
            result,
            Envelope::Failure(FailureReason::ParseFailure(ResponseShape::FoodItems))
        );
        assert_eq!(result.error().as_deref(), Some("Failed to parse AI response"));
    }

    #[test]
    fn empty_input_is_failure() {
        let result = normalize_list::<DetectedItem>("  \n ");
        assert_eq!(
            result,
            Envelope::Failure(FailureReason::NoItemsDetected(ResponseShape::FoodItems))
        );

        let result = normalize_list::<Recipe>("");
        assert_eq!(result.error().as_deref(), Some("No recipes generated"));
    }

    #[test]
    fn category_answers() {
        assert_eq!(normalize_category("채소"), FoodCategory::Vegetable);
        assert_eq!(normalize_category("  \"Dairy\".\n"), FoodCategory::Dairy);
        assert_eq!(normalize_category("```json\n{\"category\": \"육류\"}\n```"), FoodCategory::Meat);
        assert_eq!(normalize_category("I am not sure"), FoodCategory::Other);
    }

    #[test]
    fn storage_info_answers() {
        let raw = "```json\n{\"category\": \"유제품\", \"name\": \"우유\", \"storage_days\": 10}\n```";
        let info = normalize_storage_info(raw, "우유", Language::Korean);
        assert_eq!(info.category, FoodCategory::Dairy);
        assert_eq!(info.storage_days, 10);
        assert_eq!(info.storage_method, "냉장 보관하세요");

        let info = normalize_storage_info("Sorry, I can't help.", "우유", Language::Korean);
        assert_eq!(info, StorageInfo::fallback("우유", Language::Korean));
    }

    #[test]
    fn single_object_answers() {
        let value = normalize_object("Here: {'storage_days': 5,}").unwrap();
        assert_eq!(value["storage_days"], 5);
        assert!(normalize_object("").is_none());
        assert!(normalize_object("nope").is_none());
    }
}
