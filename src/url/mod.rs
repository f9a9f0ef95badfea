//! URL handling module for Sitewalk
//!
//! This module decides which discovered hrefs belong to the crawl and rewrites the
//! accepted ones into the canonical absolute form used as registry keys.

mod filter;
mod normalize;

// Re-export main functions
pub use filter::{has_blocked_extension, Rejection, BLOCKED_SUFFIXES};
pub use normalize::{classify_href, normalize_and_filter, scope_root_for};
