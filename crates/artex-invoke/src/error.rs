//! Invocation error types.

use std::process::ExitStatus;

/// Errors that can occur while invoking the build tool.
#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    /// The extra argument string is not valid shell syntax.
    #[error("invalid build parameters '{params}': {source}")]
    Args {
        /// The raw parameter string.
        params: String,
        /// Underlying parse error.
        #[source]
        source: shell_words::ParseError,
    },

    /// The process could not be started.
    #[error("failed to launch `{program}`: {source}")]
    Spawn {
        /// Program name.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// I/O failure while feeding or draining the child.
    #[error("I/O error while running `{program}`: {source}")]
    Io {
        /// Program name.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The process exited unsuccessfully.
    #[error("`{command}` exited with {status}")]
    Failed {
        /// Printable command line.
        command: String,
        /// Exit status reported by the OS.
        status: ExitStatus,
        /// Captured standard error, when the mode captures it.
        stderr: String,
    },
}

/// Result type alias for invocation.
pub type Result<T> = std::result::Result<T, InvokeError>;
