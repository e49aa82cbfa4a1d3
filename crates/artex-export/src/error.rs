//! Export error types.

use std::path::PathBuf;
use std::process::ExitStatus;

/// Errors raised by an [`EnvExporter`](crate::EnvExporter).
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    /// The registration tool could not be run.
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Program name.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The registration tool exited unsuccessfully.
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        /// Program name.
        program: String,
        /// Exit status.
        status: ExitStatus,
        /// Captured standard error.
        stderr: String,
    },
}

/// Errors that can occur during export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// A strategy that needs at least one artifact got none.
    #[error("no {mode} artifact found")]
    NoArtifacts {
        /// Build mode flag.
        mode: &'static str,
    },

    /// A discovered artifact disappeared before it could be deployed.
    #[error("artifact does not exist: {}", path.display())]
    MissingSource {
        /// The missing path.
        path: PathBuf,
    },

    /// Copying into the deploy directory failed.
    #[error("failed to copy {} to {}: {source}", from.display(), to.display())]
    Copy {
        /// Source artifact.
        from: PathBuf,
        /// Destination in the deploy directory.
        to: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Writing the zip archive failed.
    #[error("failed to archive {}: {source}", path.display())]
    Archive {
        /// Directory being archived.
        path: PathBuf,
        /// Underlying zip error.
        #[source]
        source: zip::result::ZipError,
    },

    /// Registering an environment value failed.
    #[error("failed to export environment variable {key}: {source}")]
    Env {
        /// Variable name.
        key: String,
        /// Underlying registration error.
        #[source]
        source: EnvError,
    },
}

/// Result type alias for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;
