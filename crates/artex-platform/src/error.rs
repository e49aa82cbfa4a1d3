//! Error types for platform specification operations.

/// Errors that can occur while building or querying the platform registry.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// Build mode token that no export strategy handles.
    #[error("unsupported platform for exporting artifacts: {flag}. Supported platforms: {supported}")]
    UnsupportedMode {
        /// The flag that was requested.
        flag: String,
        /// Comma-separated list of supported flags.
        supported: String,
    },

    /// Platform selection token outside `both|ios|android|web`.
    #[error("invalid platform selection '{value}' (expected one of: {expected})")]
    InvalidSelection {
        /// The value that was provided.
        value: String,
        /// Comma-separated list of accepted values.
        expected: String,
    },

    /// A specification was configured without any output pattern.
    #[error("no output pattern configured for {platform}")]
    EmptyPatterns {
        /// Display name of the platform.
        platform: String,
    },

    /// The project location is not an absolute path.
    #[error("project location must be absolute: {0}")]
    RelativeProject(String),
}

/// Result type for platform operations.
pub type Result<T> = std::result::Result<T, PlatformError>;
