//! Page fetch-and-extract worker
//!
//! A worker owns exactly one claimed URL. It fetches the page outside the registry
//! lock, classifies the response, and records the result through single-operation
//! registry updates. Every path releases the claim before returning.

use crate::crawler::fetcher::{is_html_content_type, Transport};
use crate::crawler::parser::anchor_hrefs;
use crate::state::{LinkRegistry, RetryDecision};
use crate::url::classify_href;
use std::sync::Arc;

/// Everything a worker needs, shared by all workers of one crawl
pub struct WorkerContext {
    /// The crawl's link registry
    pub registry: Arc<LinkRegistry>,

    /// Where pages are fetched from
    pub transport: Arc<dyn Transport>,

    /// Scope root used to resolve and filter hrefs
    pub scope_root: String,

    /// Retry cap for transport failures and 5xx (above 500) responses
    pub max_attempts: Option<u32>,

    /// Require an exact `text/html` Content-Type
    pub strict_content_type: bool,
}

/// What a worker did with its URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// HTML page parsed; its links were merged into the registry
    Crawled {
        /// Accepted links on the page, duplicates included
        links_found: usize,
        /// Links that were not yet in the registry
        new_links: usize,
    },

    /// Non-200 response that is not retried
    Checked { status: u16 },

    /// Retryable failure; the URL was reopened for dispatch
    Retry { reason: String, attempts: u32 },

    /// Retryable failure on the last allowed attempt; the URL is now terminal
    Exhausted { reason: String, attempts: u32 },

    /// 200 response that is not HTML; the URL was removed from the graph
    Excluded { content_type: Option<String> },

    /// The URL disappeared from the registry while the worker held it
    Vanished,
}

impl PageOutcome {
    /// Short identifier used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Crawled { .. } => "crawled",
            Self::Checked { .. } => "checked",
            Self::Retry { .. } => "retry",
            Self::Exhausted { .. } => "exhausted",
            Self::Excluded { .. } => "excluded",
            Self::Vanished => "vanished",
        }
    }
}

/// Fetches one claimed URL and folds the result into the registry
///
/// # Response Handling
///
/// | Response | Registry effect |
/// |----------|-----------------|
/// | Transport error | reopen (`visited=false, in_flight=false`) |
/// | Status >= 501 | reopen |
/// | Other non-200 | `visited=true` |
/// | 200, HTML | merge accepted links, then `visited=true` |
/// | 200, not HTML or no Content-Type | remove the record |
///
/// With `max_attempts` set, a reopen on the final attempt marks the URL visited and
/// exhausted instead.
pub async fn fetch_and_extract(url: &str, ctx: &WorkerContext) -> PageOutcome {
    let response = match ctx.transport.fetch(url).await {
        Ok(response) => response,
        Err(e) => return release_for_retry(url, ctx, None, e.to_string()),
    };

    let status = response.status;

    if status >= 501 {
        return release_for_retry(url, ctx, Some(status), format!("HTTP {}", status));
    }

    if status != 200 {
        tracing::debug!("{} returned HTTP {}, not retrying", url, status);
        if !ctx.registry.mark_visited(url, Some(status)) {
            return PageOutcome::Vanished;
        }
        return PageOutcome::Checked { status };
    }

    if !is_html_content_type(response.content_type.as_deref(), ctx.strict_content_type) {
        tracing::debug!(
            "{} is not HTML (Content-Type: {}), dropping it from the graph",
            url,
            response.content_type.as_deref().unwrap_or("<missing>")
        );
        ctx.registry.remove(url);
        return PageOutcome::Excluded {
            content_type: response.content_type,
        };
    }

    let mut links_found = 0;
    let mut new_links = 0;

    for href in anchor_hrefs(&response.body) {
        match classify_href(&href, &ctx.scope_root) {
            Ok(canonical) => {
                links_found += 1;
                if ctx.registry.record_reference(&canonical) {
                    new_links += 1;
                }
            }
            Err(rejection) => {
                tracing::trace!("Skipping href {:?} on {}: {}", href, url, rejection);
            }
        }
    }

    if !ctx.registry.mark_visited(url, Some(status)) {
        return PageOutcome::Vanished;
    }

    tracing::debug!(
        "Crawled {}: {} links ({} new)",
        url,
        links_found,
        new_links
    );

    PageOutcome::Crawled {
        links_found,
        new_links,
    }
}

fn release_for_retry(
    url: &str,
    ctx: &WorkerContext,
    status: Option<u16>,
    reason: String,
) -> PageOutcome {
    match ctx
        .registry
        .release_for_retry(url, status, ctx.max_attempts)
    {
        RetryDecision::Reopened { attempts } => {
            tracing::warn!(
                "Fetch of {} failed ({}), attempt {}; will retry",
                url,
                reason,
                attempts
            );
            PageOutcome::Retry { reason, attempts }
        }
        RetryDecision::Exhausted { attempts } => {
            tracing::warn!(
                "Giving up on {} after {} attempts: {}",
                url,
                attempts,
                reason
            );
            PageOutcome::Exhausted { reason, attempts }
        }
        RetryDecision::Missing => PageOutcome::Vanished,
    }
}
