//! Statistics derived from a crawl report
//!
//! This module summarizes a `CrawlReport` and prints the summary to stdout.

use crate::output::CrawlReport;
use std::collections::BTreeMap;

/// Number of entries shown in the most-referenced list
const TOP_REFERENCED: usize = 10;

/// Crawl statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlStatistics {
    /// Records in the final graph
    pub total_links: usize,

    /// Records that reached `visited`
    pub visited: usize,

    /// Records left unvisited (only after an incomplete crawl)
    pub unvisited: usize,

    /// Records the retry cap gave up on
    pub exhausted: usize,

    /// Records by last HTTP status
    pub by_status: BTreeMap<u16, usize>,

    /// Most referenced URLs, highest count first
    pub top_referenced: Vec<(String, u32)>,

    /// Seconds between start and finish
    pub duration_secs: f64,

    /// Polling passes
    pub passes: u64,

    pub complete: bool,
}

impl CrawlStatistics {
    /// Summarizes a report
    pub fn from_report(report: &CrawlReport) -> Self {
        let visited = report.visited_count();
        let exhausted = report.links.values().filter(|r| r.exhausted).count();

        let mut by_status = BTreeMap::new();
        for status in report.links.values().filter_map(|r| r.status) {
            *by_status.entry(status).or_insert(0) += 1;
        }

        let mut top_referenced: Vec<(String, u32)> = report
            .links
            .iter()
            .map(|(url, record)| (url.clone(), record.reference_count))
            .collect();
        top_referenced.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_referenced.truncate(TOP_REFERENCED);

        Self {
            total_links: report.links.len(),
            visited,
            unvisited: report.links.len() - visited,
            exhausted,
            by_status,
            top_referenced,
            duration_secs: report.duration().num_milliseconds() as f64 / 1000.0,
            passes: report.passes,
            complete: report.complete,
        }
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Links in graph: {}", stats.total_links);
    println!("  Visited: {}", stats.visited);
    println!("  Unvisited: {}", stats.unvisited);
    println!("  Gave up after retries: {}", stats.exhausted);
    println!(
        "  Duration: {:.1}s over {} polling passes",
        stats.duration_secs, stats.passes
    );
    println!();

    if !stats.by_status.is_empty() {
        println!("Links by HTTP Status:");
        for (status, count) in &stats.by_status {
            let percentage = if stats.total_links > 0 {
                (*count as f64 / stats.total_links as f64) * 100.0
            } else {
                0.0
            };
            println!("  {}: {} ({:.1}%)", status, count, percentage);
        }
        println!();
    }

    if !stats.top_referenced.is_empty() {
        println!("Most Referenced:");
        for (url, count) in &stats.top_referenced {
            println!("  {:>5}  {}", count, url);
        }
        println!();
    }

    if stats.complete {
        println!("Crawl complete.");
    } else {
        println!(
            "Crawl stopped early: {} links were never visited.",
            stats.unvisited
        );
    }
}
