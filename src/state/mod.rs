//! State module for tracking crawl progress
//!
//! This module provides the shared link registry used by the coordinator and workers.
//!
//! # Components
//!
//! - `LinkRecord`: Per-URL reference count and visit flags
//! - `LinkRegistry`: The lock-guarded map of every URL discovered during a crawl
//! - `RetryDecision`: What happened to a URL after a retryable failure

mod link_record;
mod registry;

// Re-export main types
pub use link_record::LinkRecord;
pub use registry::{LinkRegistry, Progress, RetryDecision};
