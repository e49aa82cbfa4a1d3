//! `artex platforms`: describe the platform registry.

use anyhow::{bail, Result};
use artex_platform::{BuildMode, Selection};
use serde::Serialize;

/// One registry entry as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PlatformInfo {
    /// Display name.
    pub name: &'static str,
    /// Build mode.
    pub mode: BuildMode,
    /// Selections enabling the platform.
    pub selectors: Vec<Selection>,
    /// Expected artifact kind.
    pub artifact_kind: artex_platform::ArtifactKind,
}

/// Registry entries, optionally only those enabled by `selection`.
pub fn entries(selection: Option<Selection>) -> Vec<PlatformInfo> {
    BuildMode::ALL
        .into_iter()
        .filter(|mode| selection.map_or(true, |s| mode.selectors().contains(&s)))
        .map(|mode| PlatformInfo {
            name: mode.display_name(),
            mode,
            selectors: mode.selectors().to_vec(),
            artifact_kind: mode.artifact_kind(),
        })
        .collect()
}

/// Print the registry as a table or JSON.
pub fn run(selection: Option<Selection>, format: Option<&str>) -> Result<()> {
    let entries = entries(selection);
    match format.unwrap_or("text") {
        "text" => {
            println!("Platforms:");
            println!();
            for entry in &entries {
                let selectors: Vec<&str> = entry.selectors.iter().map(|s| s.as_str()).collect();
                println!(
                    "  {:<10} build {:<15} {:<10} selected by: {}",
                    entry.name,
                    entry.mode.flag(),
                    entry.artifact_kind.to_string(),
                    selectors.join(", ")
                );
            }
        }
        "json" => println!("{}", serde_json::to_string_pretty(&entries)?),
        other => bail!("unknown format: '{other}'. Choose: text, json"),
    }
    Ok(())
}
