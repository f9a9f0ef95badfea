//! Configuration module for Sitewalk
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! A crawl can also run on `Config::default()` without any file.
//!
//! # Example
//!
//! ```no_run
//! use sitewalk::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sitewalk.toml")).unwrap();
//! println!("Polling every {}ms", config.crawler.poll_interval_ms);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, FetchConfig, OutputConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::{validate, validate_crawler_config};
