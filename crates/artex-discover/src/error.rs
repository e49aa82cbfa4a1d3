//! Discovery error types.

use std::path::PathBuf;

/// Errors that can occur while discovering artifacts.
#[derive(Debug, thiserror::Error)]
pub enum DiscoverError {
    /// The filesystem walk failed at `path`.
    #[error("failed to walk {}: {source}", path.display())]
    Walk {
        /// Entry being visited when the walk failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The output pattern could not be compiled.
    #[error("invalid output pattern '{pattern}': {source}")]
    Pattern {
        /// The configured pattern.
        pattern: String,
        /// Underlying glob error.
        #[source]
        source: glob::PatternError,
    },
}

/// Result type alias for discovery operations.
pub type Result<T> = std::result::Result<T, DiscoverError>;
