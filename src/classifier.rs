//! Retry-eligibility classification for failed service calls
//!
//! Pure business logic only: a failure shape maps deterministically to a
//! verdict, with no side effects and no presentation concerns.

use crate::error::AnalysisClientError;

/// Verdict on whether a failed call is worth retrying
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryVerdict {
    /// Retrying cannot change the outcome
    Terminal,
    /// Retrying may succeed once the server recovers
    Transient,
}

impl RetryVerdict {
    /// Whether this verdict permits another attempt
    pub fn is_transient(self) -> bool {
        matches!(self, Self::Transient)
    }
}

/// Classify a failure as terminal or transient
///
/// A response with a client-side status (bad request, unknown resource)
/// is terminal: the request itself is wrong and resending it cannot fix
/// that. Server-side failures and missing responses are transient. Every
/// other shape — local validation, parse failures, an already-exhausted
/// retry loop, cancellation — is terminal.
pub fn classify(error: &AnalysisClientError) -> RetryVerdict {
    match error {
        AnalysisClientError::Server { .. } | AnalysisClientError::Network { .. } => {
            RetryVerdict::Transient
        }
        _ => RetryVerdict::Terminal,
    }
}
