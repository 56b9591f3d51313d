//! Session memo for AI responses.
//!
//! `SessionMemo` never evicts, has no TTL and caches failures exactly like
//! successes; entries live until `clear()` or process exit. There is no
//! in-flight de-duplication: two identical requests racing each other both
//! reach the model and the later one overwrites the entry. Callers hold a
//! `dyn RequestCache` so a bounded policy can be swapped in.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::language::Language;

pub trait RequestCache<V>: Send + Sync {
    fn get(&self, key: &str) -> Option<V>;
    fn set(&self, key: String, value: V);
    fn clear(&self);
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug)]
pub struct SessionMemo<V> {
    entries: Mutex<HashMap<String, V>>,
}

impl<V> Default for SessionMemo<V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<V> SessionMemo<V> {
    pub fn new() -> Self {
        Self::default()
    }
}

// A poisoned lock only means another thread panicked mid-insert; the map
// itself is still usable.
impl<V: Clone + Send> RequestCache<V> for SessionMemo<V> {
    fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    fn set(&self, key: String, value: V) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key, value);
    }

    fn clear(&self) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.clear();
    }

    fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.len()
    }
}

pub fn analysis_key(image_reference: &str, language: Language) -> String {
    format!("analyze:{}:{}", language.code(), image_reference)
}

/// Escapes the key delimiters so distinct parts never run together.
fn escape_part(part: &str) -> String {
    let mut out = String::with_capacity(part.len());
    for c in part.chars() {
        if matches!(c, '\\' | ':' | ',') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Order, case and surrounding whitespace of ingredients do not matter.
pub fn recipe_key(ingredients: &[String], style: Option<&str>, language: Language) -> String {
    let mut normalized: Vec<String> = ingredients
        .iter()
        .map(|i| i.trim().to_lowercase())
        .filter(|i| !i.is_empty())
        .map(|i| escape_part(&i))
        .collect();
    normalized.sort();
    normalized.dedup();

    let style = style
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| escape_part(&s.to_lowercase()))
        .unwrap_or_else(|| "-".to_string());

    format!(
        "recipes:{}:{}:{}",
        language.code(),
        style,
        normalized.join(",")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memo_get_set_clear() {
        let memo: SessionMemo<u32> = SessionMemo::new();
        assert!(memo.get("a").is_none());
        memo.set("a".to_string(), 1);
        memo.set("a".to_string(), 2);
        assert_eq!(memo.get("a"), Some(2));
        assert_eq!(memo.len(), 1);
        memo.clear();
        assert!(memo.is_empty());
    }

    #[test]
    fn recipe_keys_collide_for_equivalent_requests() {
        let a = recipe_key(
            &["양파".to_string(), " Garlic ".to_string()],
            Some("Spicy"),
            Language::Korean,
        );
        let b = recipe_key(
            &["garlic".to_string(), "양파".to_string(), "".to_string()],
            Some(" spicy"),
            Language::Korean,
        );
        assert_eq!(a, b);
        assert_eq!(a, "recipes:ko:spicy:garlic,양파");
    }

    #[test]
    fn delimiters_inside_parts_do_not_collide() {
        let a = recipe_key(&["c".to_string()], Some("a:b"), Language::English);
        let b = recipe_key(&["b:c".to_string()], Some("a"), Language::English);
        assert_ne!(a, b);
        assert_eq!(a, r"recipes:en:a\:b:c");

        let joined = recipe_key(&["salt,pepper".to_string()], None, Language::English);
        let split = recipe_key(&["salt".to_string(), "pepper".to_string()], None, Language::English);
        assert_ne!(joined, split);
    }

    #[test]
    fn keys_differ_by_language_and_style() {
        let ingredients = ["rice".to_string()];
        let plain = recipe_key(&ingredients, None, Language::English);
        assert_eq!(plain, "recipes:en:-:rice");
        assert_ne!(plain, recipe_key(&ingredients, None, Language::Korean));
        assert_ne!(plain, recipe_key(&ingredients, Some("vegan"), Language::English));
        assert_eq!(
            analysis_key("file:///fridge.jpg", Language::Korean),
            "analyze:ko:file:///fridge.jpg"
        );
    }
}
