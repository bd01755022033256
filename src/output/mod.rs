//! Output module for crawl records and statistics
//!
//! This module handles:
//! - Accumulating (title, content) records while the crawl runs
//! - Writing the records as a two-column CSV once the crawl is over
//! - Recording crawl statistics for the end-of-run report

mod records;
pub mod stats;

pub use records::{write_records, CrawlRecord, RecordSink, CSV_HEADER, PDF_TITLE};
pub use stats::{print_statistics, CrawlStats};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
