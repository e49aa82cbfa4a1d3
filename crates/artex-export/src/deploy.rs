//! Copying artifacts into the deploy directory.
//!
//! Writes go through a [`Deployment`]. Anything already at a destination is
//! moved into a staging directory first, so an unfinished deployment can put
//! the deploy directory back exactly as it found it.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::warn;

use crate::archive::zip_dir;
use crate::error::{ExportError, Result};

/// Check that every artifact still exists before anything is written.
pub fn preflight(artifacts: &[PathBuf]) -> Result<()> {
    for path in artifacts {
        if fs::symlink_metadata(path).is_err() {
            return Err(ExportError::MissingSource { path: path.clone() });
        }
    }
    Ok(())
}

/// Final path component of an artifact.
pub fn base_name(artifact: &Path) -> Result<&OsStr> {
    artifact
        .file_name()
        .ok_or_else(|| ExportError::MissingSource {
            path: artifact.to_path_buf(),
        })
}

/// Where `artifact` lands inside `deploy_dir`.
pub fn deployed_path(artifact: &Path, deploy_dir: &Path) -> Result<PathBuf> {
    Ok(deploy_dir.join(base_name(artifact)?))
}

/// Copy every artifact into `deploy_dir`, keeping base names.
///
/// The returned deployment holds the copies in artifact order. If any copy
/// fails, the deploy directory is restored before the error is returned.
pub fn stage_all(artifacts: &[PathBuf], deploy_dir: &Path) -> Result<Deployment> {
    preflight(artifacts)?;
    let mut deployment = Deployment::new(deploy_dir)?;
    for artifact in artifacts {
        deployment.copy(artifact)?;
    }
    Ok(deployment)
}

/// One destination written by a deployment.
#[derive(Debug)]
struct Step {
    dest: PathBuf,
    /// Where the previous occupant of `dest` was moved, if there was one.
    backup: Option<PathBuf>,
}

/// Pending writes into a deploy directory.
///
/// Dropping a deployment without calling [`Deployment::commit`] removes what
/// it wrote and restores what it displaced.
#[derive(Debug)]
pub struct Deployment {
    deploy_dir: PathBuf,
    staging: Option<TempDir>,
    steps: Vec<Step>,
    deployed: Vec<PathBuf>,
    committed: bool,
}

impl Deployment {
    /// Start a deployment, creating `deploy_dir` if needed.
    pub fn new(deploy_dir: &Path) -> Result<Self> {
        fs::create_dir_all(deploy_dir).map_err(|source| ExportError::Copy {
            from: PathBuf::new(),
            to: deploy_dir.to_path_buf(),
            source,
        })?;
        Ok(Self {
            deploy_dir: deploy_dir.to_path_buf(),
            staging: None,
            steps: Vec::new(),
            deployed: Vec::new(),
            committed: false,
        })
    }

    /// Copy `artifact` into the deploy directory under its base name.
    pub fn copy(&mut self, artifact: &Path) -> Result<PathBuf> {
        let dest = deployed_path(artifact, &self.deploy_dir)?;
        if artifact != dest {
            let copy_err = |source| ExportError::Copy {
                from: artifact.to_path_buf(),
                to: dest.clone(),
                source,
            };
            self.stage(&dest).map_err(copy_err)?;
            copy_artifact(artifact, &dest).map_err(copy_err)?;
        }
        self.deployed.push(dest.clone());
        Ok(dest)
    }

    /// Write a zip archive of `dir` to `dest`.
    pub fn zip(&mut self, dir: &Path, dest: &Path) -> Result<PathBuf> {
        self.stage(dest).map_err(|source| ExportError::Copy {
            from: dir.to_path_buf(),
            to: dest.to_path_buf(),
            source,
        })?;
        zip_dir(dir, dest)?;
        self.deployed.push(dest.to_path_buf());
        Ok(dest.to_path_buf())
    }

    /// Paths written so far, in order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.deployed
    }

    /// Keep everything written and discard what was displaced.
    pub fn commit(mut self) -> Vec<PathBuf> {
        self.committed = true;
        std::mem::take(&mut self.deployed)
    }

    /// Move whatever occupies `dest` into staging and record the write.
    fn stage(&mut self, dest: &Path) -> io::Result<()> {
        let backup = match fs::symlink_metadata(dest) {
            Ok(_) => {
                let staging = match self.staging.take() {
                    Some(dir) => dir,
                    None => tempfile::Builder::new()
                        .prefix(".artex-staging")
                        .tempdir_in(&self.deploy_dir)?,
                };
                let backup = staging.path().join(self.steps.len().to_string());
                let moved = fs::rename(dest, &backup);
                self.staging = Some(staging);
                moved?;
                Some(backup)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e),
        };
        self.steps.push(Step {
            dest: dest.to_path_buf(),
            backup,
        });
        Ok(())
    }

    fn rollback(&mut self) {
        let mut restored = true;
        for step in self.steps.drain(..).rev() {
            if let Err(e) = remove_path(&step.dest) {
                warn!(path = %step.dest.display(), error = %e, "failed to remove partial deploy");
            }
            if let Some(backup) = step.backup {
                if let Err(e) = fs::rename(&backup, &step.dest) {
                    warn!(
                        path = %step.dest.display(),
                        backup = %backup.display(),
                        error = %e,
                        "failed to restore previous deploy"
                    );
                    restored = false;
                }
            }
        }
        if !restored {
            // Leave unrestored backups on disk.
            if let Some(staging) = self.staging.take() {
                std::mem::forget(staging);
            }
        }
    }
}

impl Drop for Deployment {
    fn drop(&mut self) {
        if !self.committed {
            self.rollback();
        }
    }
}

/// Copy a file, or a directory tree, to `to`, replacing what is there.
pub fn copy_artifact(from: &Path, to: &Path) -> io::Result<()> {
    if from == to {
        return Ok(());
    }
    remove_path(to)?;
    if fs::metadata(from)?.is_dir() {
        copy_tree(from, to)
    } else {
        fs::copy(from, to).map(|_| ())
    }
}

fn copy_tree(from: &Path, to: &Path) -> io::Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let src = entry.path();
        let dst = to.join(entry.file_name());
        if file_type.is_dir() {
            copy_tree(&src, &dst)?;
        } else if file_type.is_symlink() {
            copy_symlink(&src, &dst)?;
        } else {
            fs::copy(&src, &dst)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(fs::read_link(src)?, dst)
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
    fs::copy(src, dst).map(|_| ())
}

fn remove_path(path: &Path) -> io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
