//! Error types for the engagement analytics engine

use crate::types::SourceKind;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the aggregation boundary.
///
/// Scoring, timeline, summary, and rollup construction are total functions
/// and never produce these; only I/O against the record store can fail.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The principal id does not resolve in the record store. Not retried.
    #[error("principal not found: {0}")]
    NotFound(uuid::Uuid),

    /// A source reader failed. The aggregator retries this once with backoff
    /// before surfacing it.
    #[error("source unavailable ({source}): {message}")]
    SourceUnavailable {
        source: SourceKind,
        message: String,
    },

    /// The caller-supplied deadline elapsed before all source reads finished.
    /// Surfaced immediately; never retried; no partial bundle is returned.
    #[error("aggregation cancelled after {0:?} deadline")]
    Cancelled(Duration),
}

impl EngineError {
    /// Construct a `SourceUnavailable` for the given source kind
    pub fn source_unavailable(source: SourceKind, message: impl Into<String>) -> Self {
        EngineError::SourceUnavailable {
            source,
            message: message.into(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::SourceUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_failing_source() {
        let err = EngineError::source_unavailable(SourceKind::Opportunities, "connection reset");
        assert_eq!(
            err.to_string(),
            "source unavailable (opportunities): connection reset"
        );
    }

    #[test]
    fn test_retryable_classification() {
        assert!(EngineError::source_unavailable(SourceKind::Interactions, "timeout").is_retryable());
        assert!(!EngineError::NotFound(uuid::Uuid::nil()).is_retryable());
        assert!(!EngineError::Cancelled(Duration::from_millis(100)).is_retryable());
    }
}
