//! Shelf-Scout: a product page scraping service
//!
//! This crate fetches remote product pages, extracts structured fields from
//! their markup, and serves the results over HTTP — either synchronously or
//! through named background jobs that are collected exactly once.

pub mod config;
pub mod jobs;
pub mod scrape;
pub mod server;

use thiserror::Error;

/// Main error type for Shelf-Scout service operations
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for Shelf-Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use jobs::{JobError, JobRegistry};
pub use scrape::{
    build_http_client, fetch_product, parse_product_page, run_batch, FetchError, ItemResult,
    ProductInfo,
};
