//! CLI error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors reported by the command-line tool.
#[derive(Debug, Error)]
pub enum CliError {
    /// A file could not be read.
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A file is not valid JSON for the expected shape.
    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        /// File being parsed.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },

    /// Planning failed.
    #[error(transparent)]
    Core(#[from] docshift_core::Error),
}
