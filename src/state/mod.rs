//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `VisitOutcome`: the terminal result of processing one URL (scraped, ignored, failed, ...)

mod visit_outcome;

pub use visit_outcome::VisitOutcome;
