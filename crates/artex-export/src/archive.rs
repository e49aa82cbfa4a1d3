//! Zip archives of artifact directories.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use zip::result::{ZipError, ZipResult};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{ExportError, Result};

/// Archive `dir` into `dest` without compression.
///
/// The directory's own name is the archive root, so unpacking recreates
/// `<name>/...`. The archive is assembled next to `dest` and renamed into
/// place once complete.
pub fn zip_dir(dir: &Path, dest: &Path) -> Result<()> {
    let archive_err = |source| ExportError::Archive {
        path: dir.to_path_buf(),
        source,
    };
    let parent = dest.parent().unwrap_or_else(|| Path::new("."));
    let root = dir
        .file_name()
        .ok_or_else(|| ExportError::MissingSource {
            path: dir.to_path_buf(),
        })?
        .to_string_lossy()
        .into_owned();

    let partial = tempfile::Builder::new()
        .prefix(".artex-")
        .suffix(".zip.partial")
        .tempfile_in(parent)
        .map_err(|e| archive_err(ZipError::Io(e)))?;

    write_archive(dir, &root, partial.as_file()).map_err(archive_err)?;

    partial
        .persist(dest)
        .map_err(|e| archive_err(ZipError::Io(e.error)))?;
    Ok(())
}

fn write_archive(dir: &Path, root: &str, file: &File) -> ZipResult<()> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let mut writer = ZipWriter::new(file);
    writer.add_directory(format!("{root}/"), options)?;
    add_tree(&mut writer, dir, root, options)?;
    writer.finish()?;
    Ok(())
}

fn add_tree(
    writer: &mut ZipWriter<&File>,
    dir: &Path,
    prefix: &str,
    options: SimpleFileOptions,
) -> ZipResult<()> {
    let mut entries = fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        let name = format!("{prefix}/{}", entry.file_name().to_string_lossy());
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            writer.add_directory(format!("{name}/"), options)?;
            add_tree(writer, &path, &name, options)?;
        } else if file_type.is_symlink() {
            let target = fs::read_link(&path)?;
            writer.add_symlink(name, target.to_string_lossy().into_owned(), options)?;
        } else {
            writer.start_file(name, with_mode(options, &path)?)?;
            io::copy(&mut File::open(&path)?, writer)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn with_mode(options: SimpleFileOptions, path: &Path) -> io::Result<SimpleFileOptions> {
    use std::os::unix::fs::PermissionsExt;
    let mode = fs::metadata(path)?.permissions().mode();
    Ok(options.unix_permissions(mode))
}

#[cfg(not(unix))]
fn with_mode(options: SimpleFileOptions, _path: &Path) -> io::Result<SimpleFileOptions> {
    Ok(options)
}
