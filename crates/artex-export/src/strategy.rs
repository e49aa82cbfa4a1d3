//! Per-mode export strategies.

use std::path::{Path, PathBuf};

use artex_platform::BuildMode;
use tracing::{info, warn};

use crate::deploy::{base_name, preflight, stage_all, Deployment};
use crate::env::EnvExporter;
use crate::error::{ExportError, Result};
use crate::{AAR_PATH, AAR_PATH_LIST, APP_DIR_PATH, IOS_FRAMEWORK_ZIP_PATH, WEB_DIRECTORY_PATH};

/// What an export published.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Files or directories written to the deploy directory.
    pub deployed: Vec<PathBuf>,
    /// Environment registrations in the order they were made.
    pub values: Vec<(String, String)>,
}

impl ExportReport {
    fn register(&mut self, env: &mut dyn EnvExporter, key: &str, value: String) -> Result<()> {
        env.export(key, &value).map_err(|source| ExportError::Env {
            key: key.to_string(),
            source,
        })?;
        self.values.push((key.to_string(), value));
        Ok(())
    }
}

/// Export `artifacts` with the strategy for `mode`.
///
/// On error the deploy directory is left as it was found. Values already
/// handed to the exporter before a failed registration stay registered.
pub fn export(
    mode: BuildMode,
    artifacts: &[PathBuf],
    deploy_dir: &Path,
    env: &mut dyn EnvExporter,
) -> Result<ExportReport> {
    match mode {
        BuildMode::IosFramework => export_ios_framework(artifacts, deploy_dir, env),
        BuildMode::Aar => export_aar(artifacts, deploy_dir, env),
        BuildMode::Web => export_web(artifacts, deploy_dir, env),
    }
}

fn export_ios_framework(
    artifacts: &[PathBuf],
    deploy_dir: &Path,
    env: &mut dyn EnvExporter,
) -> Result<ExportReport> {
    let Some(artifact) = artifacts.last() else {
        return Err(ExportError::NoArtifacts {
            mode: BuildMode::IosFramework.flag(),
        });
    };
    if artifacts.len() > 1 {
        warn!(
            "- Multiple artifacts found: {:?}, exporting {}",
            artifacts,
            artifact.display()
        );
    }
    preflight(std::slice::from_ref(artifact))?;

    let file_name = base_name(artifact)?.to_string_lossy().into_owned();
    let zip_path = deploy_dir.join(format!("{file_name}.zip"));
    let mut deployment = Deployment::new(deploy_dir)?;
    deployment.zip(artifact, &zip_path)?;
    info!("- $BITRISE_DEPLOY_DIR/{file_name}.zip");

    let mut report = ExportReport::default();
    report.register(env, IOS_FRAMEWORK_ZIP_PATH, path_value(&zip_path))?;
    info!("- ${IOS_FRAMEWORK_ZIP_PATH}: {}", zip_path.display());
    report.register(env, APP_DIR_PATH, path_value(artifact))?;
    info!("- ${APP_DIR_PATH}: {}", artifact.display());
    report.deployed = deployment.commit();
    Ok(report)
}

fn export_aar(
    artifacts: &[PathBuf],
    deploy_dir: &Path,
    env: &mut dyn EnvExporter,
) -> Result<ExportReport> {
    let mut report = ExportReport::default();
    if artifacts.is_empty() {
        warn!("- No {} artifact found", BuildMode::Aar.flag());
        report.register(env, AAR_PATH_LIST, String::new())?;
        return Ok(report);
    }

    let deployment = stage_all(artifacts, deploy_dir)?;
    let (single, list) = outputs(deployment.paths());
    report.register(env, AAR_PATH, single.clone())?;
    report.register(env, AAR_PATH_LIST, list.join("\n"))?;
    report.deployed = deployment.commit();

    info!("- {AAR_PATH}: {single}");
    info!("- {AAR_PATH_LIST}: {}", list.join("|"));
    Ok(report)
}

fn export_web(
    artifacts: &[PathBuf],
    deploy_dir: &Path,
    env: &mut dyn EnvExporter,
) -> Result<ExportReport> {
    if artifacts.is_empty() {
        return Err(ExportError::NoArtifacts {
            mode: BuildMode::Web.flag(),
        });
    }

    let deployment = stage_all(artifacts, deploy_dir)?;
    let (single, list) = outputs(deployment.paths());
    let mut report = ExportReport::default();
    // Both values share one key; the single value is registered last and persists.
    report.register(env, WEB_DIRECTORY_PATH, list.join("\n"))?;
    report.register(env, WEB_DIRECTORY_PATH, single.clone())?;
    report.deployed = deployment.commit();

    info!("- {WEB_DIRECTORY_PATH}: {single}");
    info!("- {WEB_DIRECTORY_PATH}: {}", list.join("|"));
    Ok(report)
}

/// Last deployed path and every deployed path, as strings.
fn outputs(deployed: &[PathBuf]) -> (String, Vec<String>) {
    let list: Vec<String> = deployed.iter().map(|p| path_value(p)).collect();
    let single = list.last().cloned().unwrap_or_default();
    (single, list)
}

fn path_value(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
