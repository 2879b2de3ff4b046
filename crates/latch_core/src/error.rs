//! Error types for latch_core

use thiserror::Error;

/// A custom filter predicate failed to evaluate.
///
/// Built-in filters never fail. When a custom predicate returns this error the
/// widget aborts the keystroke: search text, filtered list and focus keep
/// their previous values and the error is handed back to the host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("filter predicate failed for query {query:?}: {reason}")]
    Predicate { query: String, reason: String },
}

impl FilterError {
    pub fn predicate(query: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Predicate {
            query: query.into(),
            reason: reason.into(),
        }
    }
}
