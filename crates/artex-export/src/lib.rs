//! Artifact export for artex.
//!
//! Discovered artifacts are republished in two ways: copies (or a zip
//! archive) land in the deploy directory, and their locations are registered
//! as environment values for later CI steps.
//!
//! # Strategies
//!
//! | Mode | Deploy directory | Values |
//! |---|---|---|
//! | `ios-framework` | `<name>.zip` of the last artifact | zip path, framework directory |
//! | `aar` | copy of every artifact | last copy, newline-joined copies |
//! | `web` | copy of every artifact | one key for both, last copy persists |
//!
//! A strategy deploys every file it needs and registers its values before
//! committing. If any step fails the deploy directory is put back as it was.

pub mod archive;
pub mod deploy;
pub mod env;
pub mod error;
pub mod strategy;

pub use env::{EnvExporter, Envman, MemoryEnv};
pub use error::{EnvError, ExportError, Result};
pub use strategy::{export, ExportReport};

/// Framework directory of the iOS export.
pub const APP_DIR_PATH: &str = "BITRISE_APP_DIR_PATH";
/// Zipped framework in the deploy directory.
pub const IOS_FRAMEWORK_ZIP_PATH: &str = "BITRISE_IOS_FRAMEWORK_ZIP_PATH";
/// Last deployed Android archive.
pub const AAR_PATH: &str = "BITRISE_AAR_PATH";
/// Newline-joined deployed Android archives.
pub const AAR_PATH_LIST: &str = "BITRISE_AAR_PATH_LIST";
/// Deployed web build. Used for both the single and the list value.
pub const WEB_DIRECTORY_PATH: &str = "BITRISE_WEB_DIRECTORY_PATH";
