use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::freshness::DEFAULT_EXPIRING_WINDOW_DAYS;
use crate::language::Language;

#[derive(Parser, Debug)]
#[command(name = "fresh-inventory", author, version, about, long_about = None)]
pub struct Cli {
    /// Language for prompts and messages (defaults to APP_LANGUAGE, then ko)
    #[arg(long, global = true, value_enum)]
    pub lang: Option<Language>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Detect food items in a grocery photo
    Analyze {
        #[arg(short, long)]
        image: PathBuf,
    },
    /// Suggest recipes for on-hand ingredients
    Recipes {
        /// Repeat for each ingredient
        #[arg(short, long = "ingredient")]
        ingredients: Vec<String>,
        /// Cooking style, e.g. "Italian" or "비건"
        #[arg(short, long)]
        style: Option<String>,
    },
    /// Spot food that looks spoiled in a photo
    Expired {
        #[arg(short, long)]
        image: PathBuf,
    },
    /// Ask which category a food belongs to
    Categorize { name: String },
    /// Ask how long a food keeps and how to store it
    Storage { name: String },
    /// Show D-day and expiring-soon items from a JSON inventory file
    Inventory {
        #[arg(short, long)]
        file: PathBuf,
        #[arg(short, long, default_value_t = DEFAULT_EXPIRING_WINDOW_DAYS)]
        days: i64,
        /// Evaluate as of this date (YYYY-MM-DD) instead of today
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
