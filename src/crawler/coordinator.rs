//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Seeding and draining the frontier
//! - Claiming URLs in the visited set before they are fetched
//! - Dispatching fetched bodies to the HTML or PDF path
//! - Bounding the number of in-flight visits
//! - Flushing the collected records once the frontier is exhausted

use crate::config::Config;
use crate::crawler::context::CrawlContext;
use crate::crawler::decode::decode_html;
use crate::crawler::parser::parse_html;
use crate::crawler::pdf::extract_pdf_text;
use crate::crawler::scheduler::Frontier;
use crate::crawler::{FetchResult, Fetcher};
use crate::output::{CrawlRecord, CrawlStats, RecordSink};
use crate::state::VisitOutcome;
use crate::url::{parse_seed_url, ScopeDomain};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// What one visit produced
#[derive(Debug)]
struct VisitReport {
    outcome: VisitOutcome,
    /// In-scope links found on an HTML page, in document order
    discovered: Vec<Url>,
}

impl From<VisitOutcome> for VisitReport {
    fn from(outcome: VisitOutcome) -> Self {
        Self {
            outcome,
            discovered: Vec::new(),
        }
    }
}

/// Everything a visit task needs, cloned out of the coordinator
struct Visit {
    context: Arc<CrawlContext>,
    fetcher: Fetcher,
    delay: Duration,
    cancel: CancellationToken,
}

impl Visit {
    /// Processes a single, already claimed URL
    ///
    /// This method:
    /// 1. Fetches the URL (the fetcher handles 429 backoff)
    /// 2. Dispatches on the declared content type
    /// 3. Waits the politeness delay after any answered request
    async fn run(self, url: &Url) -> VisitReport {
        let (final_url, status, content_type, body) = match self.fetcher.fetch(url).await {
            FetchResult::Success {
                final_url,
                status,
                content_type,
                body,
            } => (final_url, status, content_type, body),

            FetchResult::TransportError { error } => {
                tracing::warn!("Request error for {}: {}", url, error);
                return VisitOutcome::TransportError.into();
            }

            FetchResult::RateLimited { retry_after } => {
                tracing::warn!(
                    "Giving up on {} after retry (server asked for {}s more)",
                    url,
                    retry_after.as_secs()
                );
                return VisitOutcome::RateLimited.into();
            }
        };

        if !status.is_success() {
            tracing::debug!("{} answered HTTP {}", url, status.as_u16());
        }
        if final_url != *url {
            tracing::debug!("{} redirected to {}", url, final_url);
        }

        let report = self.dispatch(url, &content_type, &body);
        self.pause().await;
        report
    }

    fn dispatch(&self, url: &Url, content_type: &str, body: &[u8]) -> VisitReport {
        let lowered = content_type.to_ascii_lowercase();

        if lowered.contains("text/html") {
            self.scrape_html(url, content_type, body)
        } else if lowered.contains("application/pdf") {
            self.scrape_pdf(url, body)
        } else {
            tracing::debug!("Ignoring {} with content type {:?}", url, content_type);
            VisitOutcome::Ignored {
                content_type: content_type.to_string(),
            }
            .into()
        }
    }

    /// Records every link on the page and returns the in-scope ones
    ///
    /// Links are resolved against the requested URL, not the one a redirect led
    /// to, so a seed that redirects to another host name keeps its scope.
    fn scrape_html(&self, url: &Url, content_type: &str, body: &[u8]) -> VisitReport {
        let html = decode_html(body, content_type);
        let parsed = parse_html(&html, url);

        tracing::info!("Scraping HTML URL: {}", url);
        tracing::info!("Page Title: {}", parsed.title);

        let records: Vec<CrawlRecord> = parsed
            .links
            .iter()
            .map(|link| {
                tracing::debug!("Link Text: {}, URL: {}", link.text, link.url);
                CrawlRecord::link(&link.text, link.url.as_str())
            })
            .collect();
        let links = records.len();
        self.context.sink().emit_all(records);

        let scope = self.context.scope();
        let discovered: Vec<Url> = parsed
            .links
            .into_iter()
            .map(|link| link.url)
            .filter(|link| scope.contains(link))
            .collect();

        VisitReport {
            outcome: VisitOutcome::Html {
                links,
                followed: discovered.len(),
            },
            discovered,
        }
    }

    /// PDFs are leaves: one record, never any links
    fn scrape_pdf(&self, url: &Url, body: &[u8]) -> VisitReport {
        tracing::info!("Scraping PDF URL: {}", url);

        match extract_pdf_text(body) {
            Ok(text) => {
                let chars = text.chars().count();
                tracing::info!("Extracted {} characters of PDF text", chars);
                self.context.sink().emit(CrawlRecord::pdf(text));
                VisitOutcome::Pdf { chars }.into()
            }
            Err(e) => {
                tracing::warn!("Error scraping PDF {}: {}", url, e);
                VisitOutcome::ParseError.into()
            }
        }
    }

    async fn pause(&self) {
        if self.delay.is_zero() {
            return;
        }
        tokio::select! {
            _ = tokio::time::sleep(self.delay) => {}
            _ = self.cancel.cancelled() => {}
        }
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    seed: Url,
    context: Arc<CrawlContext>,
    fetcher: Fetcher,
    frontier: Frontier,
    cancel: CancellationToken,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `sink` - Where records are collected during the run
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(SiftError)` - Invalid seed URL or HTTP client failure
    pub fn new(config: &Config, sink: Arc<RecordSink>) -> crate::Result<Self> {
        let seed = parse_seed_url(&config.crawler.seed_url)?;
        let scope = ScopeDomain::from_seed(&seed)?;
        let cancel = CancellationToken::new();
        let fetcher = Fetcher::from_config(&config.crawler, &config.user_agent)?
            .with_cancel(cancel.clone());

        Ok(Self {
            seed,
            context: Arc::new(CrawlContext::new(scope, sink)),
            fetcher,
            frontier: Frontier::new(&config.crawler),
            cancel,
        })
    }

    /// Replaces the cancellation token, e.g. with one wired to Ctrl-C
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.fetcher = self.fetcher.with_cancel(cancel.clone());
        self.cancel = cancel;
        self
    }

    /// Returns a handle that stops the crawl when cancelled
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs the main crawl loop
    ///
    /// This is the core crawling logic that:
    /// 1. Takes URLs from the frontier
    /// 2. Claims each one in the visited set, skipping duplicates
    /// 3. Spawns a visit once a request slot is free
    /// 4. Feeds in-scope links from finished visits back into the frontier
    ///
    /// The loop ends when the frontier is empty and no visit is in flight, or
    /// when the cancellation token fires (in-flight visits are still awaited).
    pub async fn run(&mut self) -> CrawlStats {
        tracing::info!(
            "Starting crawl at {} (scope: {})",
            self.seed,
            self.context.scope().host()
        );

        let mut stats = CrawlStats::start();
        let mut tasks: JoinSet<VisitReport> = JoinSet::new();
        let start_time = std::time::Instant::now();
        let mut visits_done: u64 = 0;

        self.frontier.push(self.seed.clone());

        loop {
            while !self.cancel.is_cancelled() {
                let Some(url) = self.frontier.pop() else {
                    break;
                };

                if !self.context.claim(&url) {
                    stats.record(&VisitOutcome::AlreadyVisited);
                    continue;
                }

                let permit = tokio::select! {
                    permit = self.frontier.acquire() => permit,
                    _ = self.cancel.cancelled() => None,
                };
                let Some(permit) = permit else {
                    break;
                };

                let visit = Visit {
                    context: Arc::clone(&self.context),
                    fetcher: self.fetcher.clone(),
                    delay: self.frontier.politeness_delay(),
                    cancel: self.cancel.clone(),
                };

                tracing::debug!("Processing URL: {}", url);
                tasks.spawn(async move {
                    let _permit = permit;
                    match AssertUnwindSafe(visit.run(&url)).catch_unwind().await {
                        Ok(report) => report,
                        Err(_) => {
                            tracing::error!("Error scraping {}: visit panicked", url);
                            VisitOutcome::Failed.into()
                        }
                    }
                });
            }

            let Some(joined) = tasks.join_next().await else {
                break;
            };

            match joined {
                Ok(report) => {
                    stats.record(&report.outcome);
                    for url in report.discovered {
                        if !self.context.is_visited(&url) {
                            self.frontier.push(url);
                        }
                    }
                }
                Err(e) => {
                    tracing::error!("Visit task did not complete: {}", e);
                    stats.record(&VisitOutcome::Failed);
                }
            }

            visits_done += 1;
            if visits_done % 10 == 0 {
                let rate = visits_done as f64 / start_time.elapsed().as_secs_f64();
                tracing::info!(
                    "Progress: {} URLs visited, {} in frontier, {:.2} URLs/sec",
                    visits_done,
                    self.frontier.len(),
                    rate
                );
            }
        }

        let cancelled = self.cancel.is_cancelled();
        if cancelled {
            tracing::warn!(
                "Crawl cancelled with {} URLs left in the frontier",
                self.frontier.len()
            );
            self.frontier.clear();
        } else {
            tracing::info!("Frontier is empty, crawl complete");
        }

        stats.finish(self.context.sink().len(), cancelled);
        tracing::info!(
            "Crawl finished: {} URLs fetched, {} records in {:?}",
            stats.urls_fetched(),
            stats.records_emitted,
            start_time.elapsed()
        );

        stats
    }
}

/// Runs the main crawl operation and writes the CSV
///
/// # Example
///
/// ```no_run
/// use sitesift::config::Config;
/// use sitesift::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let stats = run_crawl(Config::from_seed("https://example.com/")).await?;
/// println!("{} records", stats.records_emitted);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> crate::Result<CrawlStats> {
    run_crawl_with_cancel(config, CancellationToken::new()).await
}

/// Same as [`run_crawl`], stopping early when `cancel` fires
///
/// Records gathered before cancellation are still written.
pub async fn run_crawl_with_cancel(
    config: Config,
    cancel: CancellationToken,
) -> crate::Result<CrawlStats> {
    let sink = Arc::new(RecordSink::new());
    let mut coordinator = Coordinator::new(&config, Arc::clone(&sink))?.with_cancel(cancel);
    let stats = coordinator.run().await;

    sink.flush(Path::new(&config.output.csv_path))?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> Config {
        let mut config = Config::from_seed("https://example.test/");
        config.crawler.min_delay_ms = 0;
        config.crawler.max_delay_ms = 0;
        config
    }

    fn visit() -> Visit {
        let config = create_test_config();
        let seed = Url::parse(&config.crawler.seed_url).unwrap();
        Visit {
            context: Arc::new(CrawlContext::new(
                ScopeDomain::from_seed(&seed).unwrap(),
                Arc::new(RecordSink::new()),
            )),
            fetcher: Fetcher::from_config(&config.crawler, &config.user_agent).unwrap(),
            delay: Duration::ZERO,
            cancel: CancellationToken::new(),
        }
    }

    #[test]
    fn test_coordinator_creation() {
        let coordinator = Coordinator::new(&create_test_config(), Arc::new(RecordSink::new()));
        assert!(coordinator.is_ok());
    }

    #[test]
    fn test_coordinator_rejects_bad_seed() {
        let config = Config::from_seed("mailto:nobody@example.test");
        let coordinator = Coordinator::new(&config, Arc::new(RecordSink::new()));
        assert!(coordinator.is_err());
    }

    #[test]
    fn test_dispatch_html_records_all_links_follows_in_scope() {
        let visit = visit();
        let page = Url::parse("https://example.test/").unwrap();
        let body = br#"<html><body>
            <a href="/about">About</a>
            <a href="https://other.test/">Other</a>
        </body></html>"#;

        let report = visit.dispatch(&page, "text/html; charset=utf-8", body);

        assert_eq!(
            report.outcome,
            VisitOutcome::Html {
                links: 2,
                followed: 1
            }
        );
        assert_eq!(
            report.discovered,
            vec![Url::parse("https://example.test/about").unwrap()]
        );
        assert_eq!(
            visit.context.sink().snapshot(),
            vec![
                CrawlRecord::link("About", "https://example.test/about"),
                CrawlRecord::link("Other", "https://other.test/"),
            ]
        );
    }

    #[test]
    fn test_dispatch_html_honours_declared_charset() {
        let visit = visit();
        let page = Url::parse("https://example.test/").unwrap();
        let report = visit.dispatch(
            &page,
            "text/html; charset=windows-1252",
            b"<a href='/menu'>Caf\xe9</a>",
        );

        assert!(matches!(report.outcome, VisitOutcome::Html { links: 1, .. }));
        assert_eq!(
            visit.context.sink().snapshot(),
            vec![CrawlRecord::link("Caf\u{e9}", "https://example.test/menu")]
        );
    }

    #[test]
    fn test_dispatch_content_type_is_case_insensitive() {
        let visit = visit();
        let page = Url::parse("https://example.test/").unwrap();
        let report = visit.dispatch(&page, "Text/HTML", b"<a href='/x'>X</a>");
        assert!(matches!(report.outcome, VisitOutcome::Html { .. }));
    }

    #[test]
    fn test_dispatch_malformed_pdf_records_nothing() {
        let visit = visit();
        let page = Url::parse("https://example.test/doc.pdf").unwrap();
        let report = visit.dispatch(&page, "application/pdf", b"%PDF-garbage");

        assert_eq!(report.outcome, VisitOutcome::ParseError);
        assert!(report.discovered.is_empty());
        assert!(visit.context.sink().is_empty());
    }

    #[test]
    fn test_dispatch_other_content_is_ignored() {
        let visit = visit();
        let page = Url::parse("https://example.test/logo.png").unwrap();
        let report = visit.dispatch(&page, "image/png", b"\x89PNG");

        assert_eq!(
            report.outcome,
            VisitOutcome::Ignored {
                content_type: "image/png".to_string()
            }
        );
        assert!(visit.context.sink().is_empty());
    }
}
