//! Shared link registry
//!
//! Every read and write goes through one reader/writer lock. Each public method is a
//! single short critical section; callers never hold the lock across I/O.

use crate::state::LinkRecord;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

/// Counts taken from one consistent view of the registry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    /// Records currently known
    pub total: usize,

    /// Records with `visited == true`
    pub visited: usize,

    /// Records owned by a running worker
    pub in_flight: usize,
}

impl Progress {
    /// No unvisited record remains
    pub fn is_complete(&self) -> bool {
        self.total == self.visited
    }
}

/// Outcome of releasing a URL after a retryable failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// The URL is eligible for dispatch again
    Reopened { attempts: u32 },

    /// The retry cap was reached; the URL is now terminal
    Exhausted { attempts: u32 },

    /// The URL is no longer in the registry
    Missing,
}

/// Map of canonical URL to crawl state, shared by the coordinator and its workers
#[derive(Debug, Default)]
pub struct LinkRegistry {
    links: RwLock<HashMap<String, LinkRecord>>,
}

impl LinkRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a crawl root as a fresh record. An existing record is left untouched.
    pub fn seed(&self, url: &str) {
        self.links
            .write()
            .entry(url.to_string())
            .or_insert_with(LinkRecord::discovered);
    }

    /// Copies the whole map under the read lock
    ///
    /// The copy is stale as soon as the lock is released; use it for iteration only.
    pub fn snapshot(&self) -> HashMap<String, LinkRecord> {
        self.links.read().clone()
    }

    /// Returns a copy of one record
    pub fn get(&self, url: &str) -> Option<LinkRecord> {
        self.links.read().get(url).cloned()
    }

    /// Claims a URL for a worker
    ///
    /// Eligibility is re-tested under the write lock, so of any number of concurrent
    /// callers at most one gets `true` until the URL is released again.
    pub fn try_claim(&self, url: &str) -> bool {
        let mut links = self.links.write();
        match links.get_mut(url) {
            Some(record) if record.is_eligible() => {
                record.in_flight = true;
                record.attempts = record.attempts.saturating_add(1);
                true
            }
            _ => false,
        }
    }

    /// Records one observation of `url` as a link target
    ///
    /// Creates the record on first sight, otherwise increments its reference count and
    /// leaves the visit flags alone. Returns true if the record was created.
    pub fn record_reference(&self, url: &str) -> bool {
        let mut links = self.links.write();
        match links.get_mut(url) {
            Some(record) => {
                record.reference_count = record.reference_count.saturating_add(1);
                false
            }
            None => {
                links.insert(url.to_string(), LinkRecord::discovered());
                true
            }
        }
    }

    /// Marks a URL as terminally handled and releases ownership
    ///
    /// Returns false if the URL is not in the registry.
    pub fn mark_visited(&self, url: &str, status: Option<u16>) -> bool {
        let mut links = self.links.write();
        match links.get_mut(url) {
            Some(record) => {
                record.visited = true;
                record.in_flight = false;
                if status.is_some() {
                    record.status = status;
                }
                true
            }
            None => false,
        }
    }

    /// Releases a URL after a retryable failure
    ///
    /// With no cap, or below it, the URL is reopened (`visited=false, in_flight=false`)
    /// and the coordinator will dispatch it again on a later pass. Once `attempts`
    /// reaches `max_attempts` the URL is marked visited and exhausted instead.
    pub fn release_for_retry(
        &self,
        url: &str,
        status: Option<u16>,
        max_attempts: Option<u32>,
    ) -> RetryDecision {
        let mut links = self.links.write();
        let Some(record) = links.get_mut(url) else {
            return RetryDecision::Missing;
        };

        record.in_flight = false;
        if status.is_some() {
            record.status = status;
        }

        match max_attempts {
            Some(max) if record.attempts >= max => {
                record.visited = true;
                record.exhausted = true;
                RetryDecision::Exhausted {
                    attempts: record.attempts,
                }
            }
            _ => {
                record.visited = false;
                RetryDecision::Reopened {
                    attempts: record.attempts,
                }
            }
        }
    }

    /// Deletes a URL from the graph entirely
    pub fn remove(&self, url: &str) -> Option<LinkRecord> {
        self.links.write().remove(url)
    }

    /// Counts records under a single read lock
    pub fn progress(&self) -> Progress {
        let links = self.links.read();
        let mut progress = Progress {
            total: links.len(),
            ..Progress::default()
        };
        for record in links.values() {
            if record.visited {
                progress.visited += 1;
            }
            if record.in_flight {
                progress.in_flight += 1;
            }
        }
        progress
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.links.read().len()
    }

    /// Returns whether the registry has no records
    pub fn is_empty(&self) -> bool {
        self.links.read().is_empty()
    }

    /// Copies the registry into URL order for reporting
    pub fn to_sorted(&self) -> BTreeMap<String, LinkRecord> {
        self.links
            .read()
            .iter()
            .map(|(url, record)| (url.clone(), record.clone()))
            .collect()
    }
}
