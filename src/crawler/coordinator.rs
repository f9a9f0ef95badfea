//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the polling loop that drives a crawl:
//! - Seeding the registry with the start URL
//! - Claiming every eligible link and spawning a worker for it
//! - Sleeping between passes and detecting completion from registry counts
//! - Joining outstanding workers and producing the final report
//!
//! There is no task queue. The registry itself is the frontier, and a crawl is over
//! when a pass finds every known link visited.

use crate::config::{validate_crawler_config, Config, CrawlerConfig};
use crate::crawler::fetcher::{HttpTransport, Transport};
use crate::crawler::worker::{fetch_and_extract, PageOutcome, WorkerContext};
use crate::output::{CrawlReport, OutcomeCounts};
use crate::state::LinkRegistry;
use crate::url::{normalize_and_filter, scope_root_for};
use crate::SitewalkError;
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

/// Passes between two info-level progress lines
const PROGRESS_EVERY_PASSES: u64 = 10;

/// Main crawler coordinator structure
pub struct Coordinator {
    seed: String,
    config: CrawlerConfig,
    context: Arc<WorkerContext>,
    limiter: Option<Arc<Semaphore>>,
}

impl Coordinator {
    /// Creates a coordinator that fetches over HTTP
    ///
    /// # Arguments
    ///
    /// * `seed` - Absolute http(s) URL to start from
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(SitewalkError)` - The seed is invalid or the HTTP client failed to build
    pub fn new(seed: &str, config: &Config) -> Result<Self, SitewalkError> {
        let transport = HttpTransport::new(config)?;
        Self::with_transport(seed, config.crawler.clone(), Arc::new(transport))
    }

    /// Creates a coordinator over any `Transport`
    pub fn with_transport(
        seed: &str,
        config: CrawlerConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, SitewalkError> {
        validate_crawler_config(&config)?;

        let scope_root = scope_root_for(seed)?;
        // Registered under the same canonical form discovered hrefs take, so a
        // self-link to the homepage lands on the seed's record
        let seed = normalize_and_filter(seed.trim(), &scope_root)
            .unwrap_or_else(|| scope_root.clone());

        let limiter = config
            .max_concurrent_fetches
            .map(|permits| Arc::new(Semaphore::new(permits as usize)));

        let context = Arc::new(WorkerContext {
            registry: Arc::new(LinkRegistry::new()),
            transport,
            scope_root,
            max_attempts: config.max_attempts,
            strict_content_type: config.strict_content_type,
        });

        Ok(Self {
            seed,
            config,
            context,
            limiter,
        })
    }

    /// Canonical registry key of the URL the crawl starts from
    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// The substring every accepted link must contain
    pub fn scope_root(&self) -> &str {
        &self.context.scope_root
    }

    /// Shared handle to the crawl's registry
    pub fn registry(&self) -> Arc<LinkRegistry> {
        Arc::clone(&self.context.registry)
    }

    /// Runs the crawl to completion and returns the link graph
    ///
    /// Each pass:
    /// 1. Snapshots the registry
    /// 2. Claims every unvisited, unowned link and spawns a worker for it
    /// 3. Sleeps for the poll interval
    /// 4. Stops once every known link is visited (or the pass limit is hit)
    ///
    /// All spawned workers are joined before the report is built, so no record in
    /// the report is in flight. Per-URL failures only show up as record state.
    pub async fn run(&self) -> CrawlReport {
        let registry = &self.context.registry;
        let poll_interval = Duration::from_millis(self.config.poll_interval_ms);
        let started_at = Utc::now();
        let start_time = Instant::now();

        tracing::info!(
            "Starting crawl of {} (scope: {})",
            self.seed,
            self.context.scope_root
        );
        registry.seed(&self.seed);

        let mut workers: JoinSet<PageOutcome> = JoinSet::new();
        let mut outcomes = OutcomeCounts::default();
        let mut passes: u64 = 0;
        let mut dispatched = 0;

        loop {
            passes += 1;
            let claimed = self.dispatch_pass(&mut workers);
            dispatched += claimed;

            tokio::time::sleep(poll_interval).await;
            drain_finished(&mut workers, &mut outcomes);

            let progress = registry.progress();
            tracing::debug!(
                "Pass {}: dispatched {}, {}/{} visited, {} in flight",
                passes,
                claimed,
                progress.visited,
                progress.total,
                progress.in_flight
            );

            if passes % PROGRESS_EVERY_PASSES == 0 {
                tracing::info!(
                    "Progress: {} links known, {} visited, {} in flight, {} fetches dispatched",
                    progress.total,
                    progress.visited,
                    progress.in_flight,
                    dispatched
                );
            }

            if progress.is_complete() {
                break;
            }

            if let Some(max_passes) = self.config.max_passes {
                if passes >= max_passes {
                    tracing::warn!(
                        "Stopping after {} passes with {} of {} links unvisited",
                        passes,
                        progress.total - progress.visited,
                        progress.total
                    );
                    break;
                }
            }
        }

        while let Some(joined) = workers.join_next().await {
            record_joined(&mut outcomes, joined);
        }

        let complete = registry.progress().is_complete();
        let links = registry.to_sorted();

        tracing::info!(
            "Crawl of {} finished: {} links, {} fetches over {} passes in {:?}",
            self.seed,
            links.len(),
            outcomes.total(),
            passes,
            start_time.elapsed()
        );

        CrawlReport {
            seed: self.seed.clone(),
            scope_root: self.context.scope_root.clone(),
            started_at,
            finished_at: Utc::now(),
            passes,
            dispatched,
            complete,
            outcomes,
            links,
        }
    }

    /// Claims and dispatches every eligible link in one registry snapshot
    fn dispatch_pass(&self, workers: &mut JoinSet<PageOutcome>) -> usize {
        let registry = &self.context.registry;
        let mut claimed = 0;

        for (url, record) in registry.snapshot() {
            if !record.is_eligible() {
                continue;
            }

            // The snapshot may be stale; the claim re-checks under the write lock
            if !registry.try_claim(&url) {
                continue;
            }

            tracing::debug!("Dispatching {}", url);
            self.spawn_worker(workers, url);
            claimed += 1;
        }

        claimed
    }

    fn spawn_worker(&self, workers: &mut JoinSet<PageOutcome>, url: String) {
        let context = Arc::clone(&self.context);
        let limiter = self.limiter.clone();

        workers.spawn(async move {
            let _permit = match limiter {
                Some(limiter) => limiter.acquire_owned().await.ok(),
                None => None,
            };
            fetch_and_extract(&url, &context).await
        });
    }
}

/// Collects workers that already finished without waiting on the rest
fn drain_finished(workers: &mut JoinSet<PageOutcome>, outcomes: &mut OutcomeCounts) {
    while let Some(joined) = workers.try_join_next() {
        record_joined(outcomes, joined);
    }
}

fn record_joined(outcomes: &mut OutcomeCounts, joined: Result<PageOutcome, JoinError>) {
    match joined {
        Ok(outcome) => outcomes.record(&outcome),
        Err(e) => tracing::error!("Worker task failed: {}", e),
    }
}
