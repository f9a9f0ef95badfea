/// Link record definitions for tracking crawl progress
///
/// One record exists per canonical URL discovered during a crawl.
use serde::{Deserialize, Serialize};

/// Crawl state of a single discovered URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// Number of times the URL was observed (seeding counts once)
    pub reference_count: u32,

    /// Fetch-and-extract finished with a terminal outcome
    pub visited: bool,

    /// A worker currently owns this URL
    pub in_flight: bool,

    /// Number of times the URL was claimed for a fetch
    #[serde(default)]
    pub attempts: u32,

    /// Last HTTP status received for the URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    /// The retry cap gave up on this URL
    #[serde(default)]
    pub exhausted: bool,
}

impl LinkRecord {
    /// A freshly discovered URL: referenced once, unvisited, unowned
    pub fn discovered() -> Self {
        Self {
            reference_count: 1,
            visited: false,
            in_flight: false,
            attempts: 0,
            status: None,
            exhausted: false,
        }
    }

    /// Returns true if the coordinator may dispatch a worker for this URL
    pub fn is_eligible(&self) -> bool {
        !self.visited && !self.in_flight
    }
}

impl Default for LinkRecord {
    fn default() -> Self {
        Self::discovered()
    }
}
