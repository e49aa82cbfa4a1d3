//! Build modes and the artifact kinds they produce.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PlatformError, Result};
use crate::selection::Selection;

/// Build mode passed to the build tool as `build <flag>`.
///
/// The mode also selects the export strategy, so every match over it is
/// exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildMode {
    /// `ios-framework`: an add-to-app iOS framework directory.
    IosFramework,
    /// `aar`: Android library archives.
    Aar,
    /// `web`: a web build directory.
    Web,
}

impl BuildMode {
    /// Every mode, in registry order.
    pub const ALL: [BuildMode; 3] = [BuildMode::IosFramework, BuildMode::Aar, BuildMode::Web];

    /// The sub-command token understood by the build tool.
    pub fn flag(self) -> &'static str {
        match self {
            BuildMode::IosFramework => "ios-framework",
            BuildMode::Aar => "aar",
            BuildMode::Web => "web",
        }
    }

    /// Parse a sub-command token back into a mode.
    pub fn from_flag(flag: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.flag() == flag)
            .ok_or_else(|| PlatformError::UnsupportedMode {
                flag: flag.to_string(),
                supported: supported_flags(),
            })
    }

    /// Human label for logs.
    pub fn display_name(self) -> &'static str {
        match self {
            BuildMode::IosFramework => "iOS",
            BuildMode::Aar => "Android",
            BuildMode::Web => "Web",
        }
    }

    /// Selections that enable this mode. `both` covers iOS and Android only.
    pub fn selectors(self) -> &'static [Selection] {
        match self {
            BuildMode::IosFramework => &[Selection::Both, Selection::Ios],
            BuildMode::Aar => &[Selection::Both, Selection::Android],
            BuildMode::Web => &[Selection::Web],
        }
    }

    /// Whether artifacts of this mode are files or directories.
    pub fn artifact_kind(self) -> ArtifactKind {
        match self {
            BuildMode::Aar => ArtifactKind::File,
            BuildMode::IosFramework | BuildMode::Web => ArtifactKind::Directory,
        }
    }

    /// Whether the build tool may stop and prompt for input in this mode.
    ///
    /// `ios-framework` builds can ask for a code-signing identity.
    pub fn may_prompt(self) -> bool {
        matches!(self, BuildMode::IosFramework)
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.flag())
    }
}

fn supported_flags() -> String {
    let mut flags: Vec<&str> = BuildMode::ALL.iter().map(|m| m.flag()).collect();
    flags.sort_unstable();
    flags.join(", ")
}

/// Filesystem kind of a build artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    /// A regular file (symlinks count as files).
    File,
    /// A directory.
    Directory,
}

impl ArtifactKind {
    /// Whether an entry with the given directory bit has this kind.
    pub fn accepts(self, is_dir: bool) -> bool {
        match self {
            ArtifactKind::File => !is_dir,
            ArtifactKind::Directory => is_dir,
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::File => f.write_str("file"),
            ArtifactKind::Directory => f.write_str("directory"),
        }
    }
}
