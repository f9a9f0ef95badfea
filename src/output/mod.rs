//! Output module for crawl results
//!
//! This module handles:
//! - The `CrawlReport` returned by every crawl
//! - Writing and reading reports as JSON
//! - Summarizing a report into printable statistics

mod report;
pub mod stats;

pub use report::{read_report, write_report, CrawlReport, OutcomeCounts};
pub use stats::{print_statistics, CrawlStatistics};
