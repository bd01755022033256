//! Per-run crawl state shared by every visit task

use crate::output::RecordSink;
use crate::url::ScopeDomain;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use url::Url;

/// State of one crawl run
///
/// Holds the visited set, the scope computed from the seed and the record sink.
/// Each run owns its own context, so several crawls can run side by side in one
/// process.
#[derive(Debug)]
pub struct CrawlContext {
    scope: ScopeDomain,
    visited: Mutex<HashSet<String>>,
    sink: Arc<RecordSink>,
}

impl CrawlContext {
    pub fn new(scope: ScopeDomain, sink: Arc<RecordSink>) -> Self {
        Self {
            scope,
            visited: Mutex::new(HashSet::new()),
            sink,
        }
    }

    /// Marks `url` as visited and returns true if no one had claimed it before
    ///
    /// Check and insert happen under one lock, so each URL is claimed at most once
    /// per run no matter how many tasks discover it.
    pub fn claim(&self, url: &Url) -> bool {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.as_str().to_string())
    }

    /// Returns true if `url` has already been claimed
    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(url.as_str())
    }

    pub fn scope(&self) -> &ScopeDomain {
        &self.scope
    }

    pub fn sink(&self) -> &RecordSink {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> CrawlContext {
        let seed = Url::parse("https://example.test/").unwrap();
        CrawlContext::new(
            ScopeDomain::from_seed(&seed).unwrap(),
            Arc::new(RecordSink::new()),
        )
    }

    #[test]
    fn test_claim_once() {
        let ctx = context();
        let url = Url::parse("https://example.test/about").unwrap();

        assert!(!ctx.is_visited(&url));
        assert!(ctx.claim(&url));
        assert!(ctx.is_visited(&url));
        assert!(!ctx.claim(&url));
    }

    #[test]
    fn test_concurrent_claims_have_one_winner() {
        let ctx = Arc::new(context());
        let url = Url::parse("https://example.test/contested").unwrap();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let ctx = Arc::clone(&ctx);
                let url = url.clone();
                std::thread::spawn(move || ctx.claim(&url))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }

    #[test]
    fn test_url_variants_are_distinct() {
        let ctx = context();
        assert!(ctx.claim(&Url::parse("https://example.test/page").unwrap()));
        assert!(ctx.claim(&Url::parse("https://example.test/page#top").unwrap()));
        assert!(ctx.claim(&Url::parse("https://example.test/page?x=1").unwrap()));
    }
}
