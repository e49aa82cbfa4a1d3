//! Pattern-driven build artifact discovery.
//!
//! Artifacts are located by walking the project tree and matching the full
//! path of every entry against an output pattern. Only `*` is a wildcard and
//! it crosses directory separators, so `*/build/web` matches the web build of
//! any project root.

pub mod error;
pub mod pattern;
pub mod walk;

pub use error::{DiscoverError, Result};
pub use pattern::OutputPattern;
pub use walk::{artifact_paths, find_paths};
