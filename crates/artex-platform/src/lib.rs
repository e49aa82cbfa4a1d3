//! Platform specification registry for artex.
//!
//! A run builds and exports at most one artifact family per platform:
//! - **iOS:** `ios-framework`, exported as a zipped framework directory
//! - **Android:** `aar`, exported as copied library archives
//! - **Web:** `web`, exported as copied build directories
//!
//! The registry is ordered and immutable once built; the driver walks it
//! front to back and skips every entry the run's [`Selection`] does not enable.

pub mod error;
pub mod mode;
pub mod selection;
pub mod spec;

pub use error::{PlatformError, Result};
pub use mode::{ArtifactKind, BuildMode};
pub use selection::Selection;
pub use spec::{registry, split_patterns, PatternSet, PlatformSpec};
