//! Sitewalk: a same-domain link crawler
//!
//! This crate walks every page reachable from a seed URL without leaving the seed's
//! scope, and reports the resulting link graph with reference counts and visit status.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Sitewalk operations
///
/// Per-URL failures never surface here; they are absorbed into the registry.
/// These variants cover setup and output problems only.
#[derive(Debug, Error)]
pub enum SitewalkError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid seed URL '{url}': {reason}")]
    InvalidSeed { url: String, reason: String },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Report serialization error: {0}")]
    Json(#[from] serde_json::Error),
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

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Sitewalk operations
pub type Result<T> = std::result::Result<T, SitewalkError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, crawl_with_transport, Coordinator};
pub use output::CrawlReport;
pub use state::{LinkRecord, LinkRegistry};
pub use url::{normalize_and_filter, scope_root_for};
