//! Core error types.

use thiserror::Error;

/// Errors surfaced by the planning core.
///
/// Almost every planning problem is absorbed (cycles are broken, missing
/// statistics fall back to estimates); these are the cases a caller has to
/// handle explicitly.
#[derive(Debug, Error)]
pub enum Error {
    /// Embedding order cannot be resolved because the embeds form a cycle.
    #[error("embedding cycle: {} table(s) unresolved: {}", .unresolved.len(), .unresolved.join(", "))]
    EmbeddingCycle {
        /// Tables ordered before the cycle blocked progress.
        ordered: Vec<String>,
        /// Tables that could not be ordered.
        unresolved: Vec<String>,
    },

    /// A mapping breaks the single-owner or acyclic-embedding invariant.
    #[error("invalid mapping: {0}")]
    InvalidMapping(String),

    /// A table was named that is not part of the schema.
    #[error("unknown table: {0}")]
    UnknownTable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::EmbeddingCycle {
            ordered: vec!["c".to_string()],
            unresolved: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "embedding cycle: 2 table(s) unresolved: a, b"
        );
        assert_eq!(
            Error::UnknownTable("ghosts".to_string()).to_string(),
            "unknown table: ghosts"
        );
    }
}
