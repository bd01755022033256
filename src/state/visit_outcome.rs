//! Visit outcome definitions for a single URL
//!
//! Every URL claimed by the crawler ends in exactly one of these outcomes. None of
//! them stops the crawl; failures only abandon the branch rooted at that URL.

use std::fmt;

/// Represents how the processing of one URL ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisitOutcome {
    // ===== Success States =====
    /// HTML page was parsed; `links` records were emitted, `followed` of them in scope
    Html { links: usize, followed: usize },

    /// PDF document was parsed and one record emitted
    Pdf { chars: usize },

    // ===== Skip States =====
    /// Content type was neither HTML nor PDF; nothing recorded
    Ignored { content_type: String },

    /// URL had already been claimed earlier in this run
    AlreadyVisited,

    // ===== Error States =====
    /// Connection, DNS, timeout or body read failure
    TransportError,

    /// Server still answered 429 after the single retry
    RateLimited,

    /// Body claimed to be a PDF but could not be parsed
    ParseError,

    /// Processing panicked; caught at the per-URL boundary
    Failed,
}

impl VisitOutcome {
    /// Returns true if this represents an error state
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::TransportError | Self::RateLimited | Self::ParseError | Self::Failed
        )
    }

    /// Short machine-friendly label used in logs and statistics
    pub fn label(&self) -> &'static str {
        match self {
            Self::Html { .. } => "html",
            Self::Pdf { .. } => "pdf",
            Self::Ignored { .. } => "ignored",
            Self::AlreadyVisited => "already_visited",
            Self::TransportError => "transport_error",
            Self::RateLimited => "rate_limited",
            Self::ParseError => "parse_error",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for VisitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_failure() {
        assert!(VisitOutcome::TransportError.is_failure());
        assert!(VisitOutcome::RateLimited.is_failure());
        assert!(VisitOutcome::ParseError.is_failure());
        assert!(VisitOutcome::Failed.is_failure());

        assert!(!VisitOutcome::Html { links: 0, followed: 0 }.is_failure());
        assert!(!VisitOutcome::Pdf { chars: 10 }.is_failure());
        assert!(!VisitOutcome::AlreadyVisited.is_failure());
        assert!(!VisitOutcome::Ignored {
            content_type: "image/png".to_string()
        }
        .is_failure());
    }

    #[test]
    fn test_display_uses_label() {
        assert_eq!(VisitOutcome::RateLimited.to_string(), "rate_limited");
        assert_eq!(
            VisitOutcome::Ignored {
                content_type: "text/css".to_string()
            }
            .to_string(),
            "ignored"
        );
    }
}
