//! Frontier and politeness for the crawl
//!
//! This module handles:
//! - The FIFO queue of discovered, not yet claimed URLs
//! - Global concurrency limiting via a semaphore
//! - The randomized delay every visit waits before releasing its permit

use crate::config::CrawlerConfig;
use rand::Rng;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use url::Url;

/// Frontier manages the queue of URLs awaiting a visit and the request budget
///
/// The frontier may hold the same URL more than once; deduplication happens when a
/// URL is claimed from it, not when it is pushed.
pub struct Frontier {
    /// URLs waiting to be claimed, oldest first
    queue: VecDeque<Url>,

    /// Global semaphore for limiting simultaneous fetches
    semaphore: Arc<Semaphore>,

    min_delay: Duration,
    max_delay: Duration,
}

impl Frontier {
    /// Creates a new frontier
    pub fn new(config: &CrawlerConfig) -> Self {
        Self::with_limits(
            config.max_concurrent_requests.max(1) as usize,
            Duration::from_millis(config.min_delay_ms),
            Duration::from_millis(config.max_delay_ms),
        )
    }

    pub fn with_limits(max_concurrent: usize, min_delay: Duration, max_delay: Duration) -> Self {
        Self {
            queue: VecDeque::new(),
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            min_delay,
            max_delay: max_delay.max(min_delay),
        }
    }

    /// Adds a URL to the back of the queue
    pub fn push(&mut self, url: Url) {
        self.queue.push_back(url);
    }

    /// Takes the oldest URL from the queue
    pub fn pop(&mut self) -> Option<Url> {
        self.queue.pop_front()
    }

    /// Drops every queued URL
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Waits for a request slot
    ///
    /// Returns None only if the semaphore was closed.
    pub async fn acquire(&self) -> Option<OwnedSemaphorePermit> {
        self.semaphore.clone().acquire_owned().await.ok()
    }

    /// Number of request slots currently free
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Returns a uniformly random delay between the configured bounds
    pub fn politeness_delay(&self) -> Duration {
        random_delay(self.min_delay, self.max_delay)
    }

    /// Returns the number of URLs in the queue
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Picks a delay uniformly in `[min, max]` with millisecond resolution
pub fn random_delay(min: Duration, max: Duration) -> Duration {
    let min_ms = min.as_millis() as u64;
    let max_ms = max.as_millis() as u64;
    if max_ms <= min_ms {
        return Duration::from_millis(min_ms);
    }
    Duration::from_millis(rand::rng().random_range(min_ms..=max_ms))
}
