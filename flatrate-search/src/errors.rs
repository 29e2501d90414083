//! Error types for streaming availability search.

use thiserror::Error;

/// Failure of a single source operation.
///
/// Source errors never cross the aggregator boundary: a failing source
/// simply contributes nothing to the merged result.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// Connection, DNS or timeout failure while talking to the upstream.
    #[error("Transport error for '{target}': {reason}")]
    Transport {
        /// URL that was requested
        target: String,
        /// The underlying transport failure
        reason: String,
    },

    /// Upstream answered with a non-success status code.
    #[error("Upstream '{target}' answered HTTP {status}")]
    Status {
        /// URL that was requested
        target: String,
        /// The HTTP status code received
        status: u16,
    },

    /// Upstream body could not be decoded as a whole.
    #[error("Parse error for '{target}': {reason}")]
    Parse {
        /// URL that was requested
        target: String,
        /// The reason the body was rejected
        reason: String,
    },
}

impl SourceError {
    /// URL of the upstream request that failed.
    pub fn target(&self) -> &str {
        match self {
            Self::Transport { target, .. }
            | Self::Status { target, .. }
            | Self::Parse { target, .. } => target,
        }
    }
}

/// Errors surfaced by the aggregated title search.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MediaSearchError {
    /// No registered source produced a single match.
    #[error("Title not found: '{title}'")]
    TitleNotFound {
        /// The title that was searched for
        title: String,
    },
}
