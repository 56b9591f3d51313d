pub mod api_connection;
pub mod cache;
pub mod cli;
pub mod config;
pub mod envelope;
pub mod food_item;
pub mod freshness;
pub mod language;
pub mod normalizer;
pub mod prompts;
pub mod recipe;
pub mod service;
