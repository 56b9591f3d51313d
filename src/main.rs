use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::path::Path;
use tokio::fs;

use fresh_inventory::cli::{parse_args, Command};
use fresh_inventory::config::AppConfig;
use fresh_inventory::envelope::Envelope;
use fresh_inventory::food_item::FoodItem;
use fresh_inventory::freshness::{
    d_day_label, days_until_expiry, expiring_within, freshness_level, sort_by_expiry,
    FreshnessLevel, InventoryStats,
};
use fresh_inventory::language::Language;
use fresh_inventory::normalizer::{DetectedItem, ExpiredItem};
use fresh_inventory::recipe::Recipe;
use fresh_inventory::service::{FoodAiService, ImageInput};

fn init_tracing() {
    let env_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "fresh_inventory=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", text);
    Ok(())
}

/// JSON mode prints the envelope as-is; text mode turns a failure into an error.
fn report<T: Serialize>(
    envelope: Envelope<T>,
    json: bool,
    language: Language,
    print_item: impl Fn(&T),
) -> Result<()> {
    if json {
        return print_json(&envelope);
    }
    match envelope {
        Envelope::Success(items) if items.is_empty() => {
            println!("{}", empty_message(language));
            Ok(())
        }
        Envelope::Success(items) => {
            items.iter().for_each(print_item);
            Ok(())
        }
        Envelope::Failure(reason) => Err(anyhow::anyhow!(reason.localized(language))),
    }
}

fn empty_message(language: Language) -> &'static str {
    match language {
        Language::Korean => "결과가 없습니다.",
        Language::English => "Nothing found.",
    }
}

fn print_detected(item: &DetectedItem) {
    println!("- {} {} {} [{}]", item.name, item.quantity, item.unit, item.category.label(Language::English));
}

fn print_expired(item: &ExpiredItem) {
    println!("- {} ({:.0}%): {}", item.name, item.confidence * 100.0, item.reason);
}

fn print_recipe(recipe: &Recipe, language: Language) {
    let time = recipe
        .cooking_time_minutes
        .map(|m| format!(", {} min", m))
        .unwrap_or_default();
    println!("## {} ({}{})", recipe.name, recipe.difficulty.label(language), time);
    for ingredient in &recipe.ingredients {
        let quantity = ingredient
            .quantity
            .map(|q| format!(" {}{}", q, ingredient.unit))
            .unwrap_or_default();
        let optional = if ingredient.required { "" } else { " (optional)" };
        println!("  * {}{}{}", ingredient.name, quantity, optional);
    }
    for step in &recipe.instructions {
        println!("  {}", step);
    }
}

async fn load_inventory(path: &Path) -> Result<Vec<FoodItem>> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read inventory file '{}'", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse inventory file '{}'", path.display()))
}

#[derive(Serialize)]
struct InventoryLine<'a> {
    #[serde(flatten)]
    item: &'a FoodItem,
    d_day: String,
    freshness: FreshnessLevel,
}

#[derive(Serialize)]
struct InventoryReport<'a> {
    today: NaiveDate,
    items: Vec<InventoryLine<'a>>,
    expiring_soon: Vec<FoodItem>,
    stats: InventoryStats,
}

async fn show_inventory(
    path: &Path,
    days: i64,
    today: NaiveDate,
    json: bool,
    language: Language,
) -> Result<()> {
    let mut items = load_inventory(path).await?;
    let expired_now = items
        .iter_mut()
        .map(|item| item.refresh_status(today))
        .filter(|changed| *changed)
        .count();
    if expired_now > 0 {
        tracing::info!(count = expired_now, "items marked expired");
    }
    sort_by_expiry(&mut items);

    let report = InventoryReport {
        today,
        items: items
            .iter()
            .map(|item| InventoryLine {
                item,
                d_day: d_day_label(days_until_expiry(item, today)),
                freshness: freshness_level(item, today),
            })
            .collect(),
        expiring_soon: expiring_within(&items, today, days),
        stats: InventoryStats::collect(&items),
    };

    if json {
        return print_json(&report);
    }

    for line in &report.items {
        println!(
            "{:<8} {:<12} {} {}{} [{}]",
            line.d_day,
            line.freshness.label(language),
            line.item.name,
            line.item.quantity,
            line.item.unit,
            line.item.status
        );
    }
    println!();
    match language {
        Language::Korean => println!("{}일 안에 소비기한이 다가오는 식품: {}개", days, report.expiring_soon.len()),
        Language::English => println!("Expiring within {} days: {}", days, report.expiring_soon.len()),
    }
    for item in &report.expiring_soon {
        println!("  - {} ({})", item.name, d_day_label(days_until_expiry(item, today)));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let cli = parse_args();
    let config = AppConfig::from_env();
    let language = cli.lang.unwrap_or(config.language);
    let service = FoodAiService::from_config(&config);

    match cli.command {
        Command::Analyze { image } => {
            let image = ImageInput::from_path(&image)
                .await
                .with_context(|| format!("Failed to read image '{}'", image.display()))?;
            let result = service.analyze_image(&image, language).await;
            report(result, cli.json, language, print_detected)
        }
        Command::Recipes { ingredients, style } => {
            let result = service
                .generate_recipe_suggestions(&ingredients, style.as_deref(), language)
                .await;
            report(result, cli.json, language, |r| print_recipe(r, language))
        }
        Command::Expired { image } => {
            let image = ImageInput::from_path(&image)
                .await
                .with_context(|| format!("Failed to read image '{}'", image.display()))?;
            let result = service.detect_expired_items(&image, language).await;
            report(result, cli.json, language, print_expired)
        }
        Command::Categorize { name } => {
            let category = service.categorize_food(&name, language).await;
            if cli.json {
                print_json(&category)
            } else {
                println!("{}", category.label(language));
                Ok(())
            }
        }
        Command::Storage { name } => {
            let info = service.storage_info(&name, language).await;
            if cli.json {
                print_json(&info)
            } else {
                let days = match language {
                    Language::Korean => format!("{}일", info.storage_days),
                    Language::English => format!("{} days", info.storage_days),
                };
                println!(
                    "{} [{}]: {} ({})\n{}",
                    info.name,
                    info.category.label(language),
                    info.storage_desc,
                    days,
                    info.storage_method
                );
                Ok(())
            }
        }
        Command::Inventory { file, days, today } => {
            let today = today.unwrap_or_else(|| Local::now().date_naive());
            show_inventory(&file, days, today, cli.json, language).await
        }
    }
}
