//! Expiry arithmetic over inventory items: D-day labels, freshness levels,
//! ordering, the expiring-soon filter and per-status / per-category counts.

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::food_item::{FoodItem, FoodStatus, FOOD_CATEGORIES};
use crate::language::Language;

pub const DEFAULT_EXPIRING_WINDOW_DAYS: i64 = 3;

/// Negative once the expiry date has passed.
pub fn days_until_expiry(item: &FoodItem, today: NaiveDate) -> i64 {
    (item.expires_on - today).num_days()
}

/// `D-3` three days ahead, `D-Day` on the day, `D+2` two days past.
pub fn d_day_label(days_left: i64) -> String {
    match days_left {
        0 => "D-Day".to_string(),
        n if n > 0 => format!("D-{}", n),
        n => format!("D+{}", -n),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FreshnessLevel {
    Expired,
    DueToday,
    Warning,
    Caution,
    Fresh,
}

impl FreshnessLevel {
    pub fn label(self, language: Language) -> &'static str {
        match (self, language) {
            (FreshnessLevel::Expired, Language::Korean) => "기한 지남",
            (FreshnessLevel::DueToday, Language::Korean) => "오늘까지",
            (FreshnessLevel::Warning, Language::Korean) => "임박",
            (FreshnessLevel::Caution, Language::Korean) => "주의",
            (FreshnessLevel::Fresh, Language::Korean) => "신선",
            (FreshnessLevel::Expired, Language::English) => "expired",
            (FreshnessLevel::DueToday, Language::English) => "due today",
            (FreshnessLevel::Warning, Language::English) => "use soon",
            (FreshnessLevel::Caution, Language::English) => "caution",
            (FreshnessLevel::Fresh, Language::English) => "fresh",
        }
    }
}

/// Share of the storage window still ahead, 0..=100.
pub fn percent_remaining(item: &FoodItem, today: NaiveDate) -> f64 {
    let window = (item.expires_on - item.added_on).num_days().max(1);
    let left = days_until_expiry(item, today).clamp(0, window);
    left as f64 * 100.0 / window as f64
}

/// Above 50% of the window left is fresh, above 20% caution, else warning.
pub fn freshness_level(item: &FoodItem, today: NaiveDate) -> FreshnessLevel {
    let days_left = days_until_expiry(item, today);
    if days_left < 0 {
        return FreshnessLevel::Expired;
    }
    if days_left == 0 {
        return FreshnessLevel::DueToday;
    }
    match percent_remaining(item, today) {
        p if p > 50.0 => FreshnessLevel::Fresh,
        p if p > 20.0 => FreshnessLevel::Caution,
        _ => FreshnessLevel::Warning,
    }
}

/// Soonest expiry first; ties broken by name.
pub fn sort_by_expiry(items: &mut [FoodItem]) {
    items.sort_by(|a, b| a.expires_on.cmp(&b.expires_on).then_with(|| a.name.cmp(&b.name)));
}

/// Fresh items expiring on or before `today + days`, soonest first.
/// Already-expired fresh items are included. A window past the end of the
/// calendar covers every fresh item.
pub fn expiring_within(items: &[FoodItem], today: NaiveDate, days: i64) -> Vec<FoodItem> {
    let horizon = Duration::try_days(days.max(0))
        .and_then(|window| today.checked_add_signed(window))
        .unwrap_or(NaiveDate::MAX);
    let mut soon: Vec<FoodItem> = items
        .iter()
        .filter(|i| i.status == FoodStatus::Fresh && i.expires_on <= horizon)
        .cloned()
        .collect();
    sort_by_expiry(&mut soon);
    soon
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InventoryStats {
    pub total: usize,
    pub fresh: usize,
    pub frozen: usize,
    pub expired: usize,
    pub consumed: usize,
    pub disposed: usize,
    /// Every category is present, with zero when nothing matches.
    pub by_category: BTreeMap<String, usize>,
}

impl InventoryStats {
    pub fn collect(items: &[FoodItem]) -> Self {
        let mut stats = InventoryStats {
            total: items.len(),
            by_category: FOOD_CATEGORIES
                .iter()
                .map(|c| (c.label(Language::English).to_string(), 0))
                .collect(),
            ..Default::default()
        };
        for item in items {
            match item.status {
                FoodStatus::Fresh => stats.fresh += 1,
                FoodStatus::Frozen => stats.frozen += 1,
                FoodStatus::Expired => stats.expired += 1,
                FoodStatus::Consumed => stats.consumed += 1,
                FoodStatus::Disposed => stats.disposed += 1,
            }
            *stats
                .by_category
                .entry(item.category.label(Language::English).to_string())
                .or_insert(0) += 1;
        }
        stats
    }
}
