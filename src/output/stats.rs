//! Crawl statistics
//!
//! Counts how every claimed URL ended, for the end-of-run report.

use crate::state::VisitOutcome;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStats {
    /// When the crawl started
    pub started_at: DateTime<Utc>,

    /// When the crawl finished (None while running)
    pub finished_at: Option<DateTime<Utc>>,

    /// Count of visits by outcome label
    pub visits_by_outcome: BTreeMap<&'static str, u64>,

    /// Total links recorded from HTML pages
    pub links_recorded: u64,

    /// Links that were queued for crawling
    pub links_followed: u64,

    /// Fetched URLs whose outcome is a failure
    pub failed_visits: u64,

    /// Records held by the sink when the crawl finished
    pub records_emitted: u64,

    /// True if the crawl was stopped by cancellation rather than exhausting the frontier
    pub cancelled: bool,
}

impl CrawlStats {
    /// Creates empty statistics stamped with the current time
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            visits_by_outcome: BTreeMap::new(),
            links_recorded: 0,
            links_followed: 0,
            failed_visits: 0,
            records_emitted: 0,
            cancelled: false,
        }
    }

    /// Counts one outcome
    pub fn record(&mut self, outcome: &VisitOutcome) {
        if let VisitOutcome::Html { links, followed } = outcome {
            self.links_recorded += *links as u64;
            self.links_followed += *followed as u64;
        }
        if outcome.is_failure() {
            self.failed_visits += 1;
        }
        *self.visits_by_outcome.entry(outcome.label()).or_insert(0) += 1;
    }

    /// Marks the crawl as finished
    pub fn finish(&mut self, records_emitted: usize, cancelled: bool) {
        self.finished_at = Some(Utc::now());
        self.records_emitted = records_emitted as u64;
        self.cancelled = cancelled;
    }

    /// Returns the number of visits that ended with `label`
    pub fn count(&self, label: &str) -> u64 {
        self.visits_by_outcome.get(label).copied().unwrap_or(0)
    }

    /// Number of URLs that were actually fetched (duplicates excluded)
    pub fn urls_fetched(&self) -> u64 {
        self.visits_by_outcome
            .iter()
            .filter(|(label, _)| **label != "already_visited")
            .map(|(_, count)| count)
            .sum()
    }

    /// Number of fetched URLs that ended in an error state
    pub fn failures(&self) -> u64 {
        self.failed_visits
    }

    /// Duration of the crawl in seconds, if finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStats) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Started: {}", stats.started_at.to_rfc3339());
    if let Some(finished) = stats.finished_at {
        println!("  Finished: {}", finished.to_rfc3339());
    }
    if let Some(duration) = stats.duration_seconds() {
        println!("  Duration: {}s", duration);
    }
    if stats.cancelled {
        println!("  Stopped early by cancellation");
    }
    println!("  URLs fetched: {}", stats.urls_fetched());
    println!("  Links recorded: {}", stats.links_recorded);
    println!("  Links followed: {}", stats.links_followed);
    println!("  Records written: {}", stats.records_emitted);
    println!();

    println!("Visits by Outcome:");
    let mut outcome_counts: Vec<_> = stats.visits_by_outcome.iter().collect();
    outcome_counts.sort_by(|a, b| b.1.cmp(a.1));
    for (label, count) in outcome_counts {
        println!("  {}: {}", label, count);
    }
    println!();

    let fetched = stats.urls_fetched();
    let failures = stats.failures();
    let success_rate = if fetched > 0 {
        ((fetched - failures) as f64 / fetched as f64) * 100.0
    } else {
        0.0
    };
    println!(
        "Success Rate: {:.1}% ({} / {} URLs without errors)",
        success_rate,
        fetched - failures,
        fetched
    );
}
