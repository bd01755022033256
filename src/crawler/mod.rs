//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with 429 backoff
//! - Charset detection and HTML parsing with link extraction
//! - PDF text extraction
//! - Frontier management, concurrency limiting and politeness delays
//! - Overall crawl coordination

mod context;
mod coordinator;
mod decode;
mod fetcher;
mod parser;
mod pdf;
mod scheduler;

pub use context::CrawlContext;
pub use coordinator::{run_crawl, run_crawl_with_cancel, Coordinator};
pub use decode::decode_html;
pub use fetcher::{build_http_client, parse_retry_after, FetchResult, Fetcher};
pub use parser::{parse_html, ExtractedLink, ParsedPage, NO_TEXT, NO_TITLE};
pub use pdf::{extract_pdf_text, PdfError};
pub use scheduler::{random_delay, Frontier};

use crate::config::Config;
use crate::output::CrawlStats;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the seed and compute the crawl scope
/// 2. Build the HTTP client
/// 3. Visit the seed and every reachable in-scope URL once
/// 4. Write all collected records to the configured CSV file
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `cancel` - Stops claiming new URLs when cancelled
///
/// # Returns
///
/// * `Ok(CrawlStats)` - Crawl completed and the CSV was written
/// * `Err(SiftError)` - Start-up or final write failed
pub async fn crawl(config: Config, cancel: CancellationToken) -> crate::Result<CrawlStats> {
    run_crawl_with_cancel(config, cancel).await
}
