//! Platform specifications and the ordered registry.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{PlatformError, Result};
use crate::mode::{ArtifactKind, BuildMode};
use crate::selection::Selection;

/// Static descriptor of one buildable platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PlatformSpec {
    /// Human label, used for logging only.
    pub display_name: String,
    /// Build mode, also selecting the export strategy.
    pub mode: BuildMode,
    /// Selections for which this platform is built.
    pub selectors: Vec<Selection>,
    /// Glob patterns describing where build output lands, in order.
    pub output_patterns: Vec<String>,
    /// Kind of entry the patterns are expected to match.
    pub artifact_kind: ArtifactKind,
    /// Absolute project root.
    pub project_location: PathBuf,
    /// Extra raw arguments for the build tool, in shell syntax.
    pub additional_params: String,
}

impl PlatformSpec {
    /// Construct a specification, validating its patterns and project path.
    pub fn new(
        display_name: impl Into<String>,
        mode: BuildMode,
        selectors: Vec<Selection>,
        output_patterns: Vec<String>,
        project_location: &Path,
    ) -> Result<Self> {
        let display_name = display_name.into();
        if output_patterns.is_empty() {
            return Err(PlatformError::EmptyPatterns {
                platform: display_name,
            });
        }
        if !project_location.is_absolute() {
            return Err(PlatformError::RelativeProject(
                project_location.display().to_string(),
            ));
        }
        Ok(Self {
            display_name,
            mode,
            selectors,
            output_patterns,
            artifact_kind: mode.artifact_kind(),
            project_location: project_location.to_path_buf(),
            additional_params: String::new(),
        })
    }

    /// Attach extra build arguments.
    pub fn with_params(mut self, params: impl Into<String>) -> Self {
        self.additional_params = params.into();
        self
    }

    /// Whether this platform is built for the given selection.
    pub fn buildable(&self, selection: Selection) -> bool {
        self.selectors.contains(&selection)
    }
}

/// Raw newline-separated pattern inputs, one per platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternSet {
    /// iOS framework output patterns.
    pub ios: String,
    /// Android archive output patterns.
    pub android: String,
    /// Web output patterns.
    pub web: String,
}

impl PatternSet {
    /// The raw pattern input for `mode`.
    pub fn get(&self, mode: BuildMode) -> &str {
        match mode {
            BuildMode::IosFramework => &self.ios,
            BuildMode::Aar => &self.android,
            BuildMode::Web => &self.web,
        }
    }
}

/// Split a configuration value into one pattern per line.
///
/// Surrounding whitespace is trimmed and blank lines are dropped.
pub fn split_patterns(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Build the ordered registry: iOS, Android, Web.
pub fn registry(patterns: &PatternSet, project: &Path, params: &str) -> Result<Vec<PlatformSpec>> {
    BuildMode::ALL
        .into_iter()
        .map(|mode| {
            PlatformSpec::new(
                mode.display_name(),
                mode,
                mode.selectors().to_vec(),
                split_patterns(patterns.get(mode)),
                project,
            )
            .map(|spec| spec.with_params(params))
        })
        .collect()
}
