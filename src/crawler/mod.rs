//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The transport seam and its HTTP implementation
//! - HTML start-tag extraction
//! - The per-URL fetch-and-extract worker
//! - The polling coordinator that drives a crawl to completion

mod coordinator;
mod fetcher;
mod parser;
mod worker;

#[cfg(test)]
mod testing;

pub use coordinator::Coordinator;
pub use fetcher::{
    build_http_client, is_html_content_type, FetchResponse, HttpTransport, Transport,
    TransportError,
};
pub use parser::{anchor_hrefs, start_tags, StartTag};
pub use worker::{fetch_and_extract, PageOutcome, WorkerContext};

use crate::config::{Config, CrawlerConfig};
use crate::output::CrawlReport;
use crate::SitewalkError;
use std::sync::Arc;

/// Crawls every in-scope page reachable from `seed`
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Derive the scope root from the seed
/// 2. Build the HTTP client
/// 3. Poll the link registry, dispatching a worker per unvisited link
/// 4. Return the link graph once every known link is visited
///
/// # Arguments
///
/// * `seed` - Absolute http(s) URL to start from
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl finished (see `CrawlReport::complete`)
/// * `Err(SitewalkError)` - The seed was rejected or the client could not be built
pub async fn crawl(seed: &str, config: &Config) -> Result<CrawlReport, SitewalkError> {
    let coordinator = Coordinator::new(seed, config)?;
    Ok(coordinator.run().await)
}

/// Same as [`crawl`], fetching through a caller-supplied transport
pub async fn crawl_with_transport(
    seed: &str,
    config: &CrawlerConfig,
    transport: Arc<dyn Transport>,
) -> Result<CrawlReport, SitewalkError> {
    let coordinator = Coordinator::with_transport(seed, config.clone(), transport)?;
    Ok(coordinator.run().await)
}
