use crate::crawler::PageOutcome;
use crate::state::LinkRecord;
use crate::SitewalkError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// How many worker runs ended in each outcome
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    pub crawled: usize,
    pub checked: usize,
    pub retried: usize,
    pub exhausted: usize,
    pub excluded: usize,
    pub vanished: usize,
}

impl OutcomeCounts {
    /// Tallies one worker outcome
    pub fn record(&mut self, outcome: &PageOutcome) {
        match outcome {
            PageOutcome::Crawled { .. } => self.crawled += 1,
            PageOutcome::Checked { .. } => self.checked += 1,
            PageOutcome::Retry { .. } => self.retried += 1,
            PageOutcome::Exhausted { .. } => self.exhausted += 1,
            PageOutcome::Excluded { .. } => self.excluded += 1,
            PageOutcome::Vanished => self.vanished += 1,
        }
    }

    /// Total number of worker runs
    pub fn total(&self) -> usize {
        self.crawled + self.checked + self.retried + self.exhausted + self.excluded + self.vanished
    }
}

/// Final link graph of one crawl
///
/// `links` holds every URL still in the registry when the crawl returned. After a
/// complete crawl every record is visited and none is in flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlReport {
    /// The URL the crawl started from
    pub seed: String,

    /// Substring every accepted link contains
    pub scope_root: String,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Polling passes the coordinator made
    pub passes: u64,

    /// Worker tasks spawned
    pub dispatched: usize,

    /// False if the pass limit stopped the crawl with unvisited links left
    pub complete: bool,

    pub outcomes: OutcomeCounts,

    pub links: BTreeMap<String, LinkRecord>,
}

impl CrawlReport {
    /// Looks up one URL
    pub fn get(&self, url: &str) -> Option<&LinkRecord> {
        self.links.get(url)
    }

    /// Wall-clock duration of the crawl
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Number of visited records
    pub fn visited_count(&self) -> usize {
        self.links.values().filter(|r| r.visited).count()
    }
}

/// Writes a report as pretty-printed JSON
pub fn write_report(report: &CrawlReport, path: &Path) -> Result<(), SitewalkError> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    tracing::info!("Wrote report for {} links to {}", report.links.len(), path.display());
    Ok(())
}

/// Reads a report previously written by [`write_report`]
pub fn read_report(path: &Path) -> Result<CrawlReport, SitewalkError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
