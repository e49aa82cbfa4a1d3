//! CLI subcommand implementations.

pub mod build;
pub mod cache;
pub mod doctor;
pub mod platforms;
