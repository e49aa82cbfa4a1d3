//! Depth-first filesystem walk.

use std::fs;
use std::path::{Path, PathBuf};

use artex_platform::{ArtifactKind, PlatformSpec};
use tracing::debug;

use crate::error::{DiscoverError, Result};
use crate::pattern::OutputPattern;

/// Find every entry under `root` (inclusive) whose kind is `kind` and whose
/// full path matches `pattern`.
///
/// Children are visited in file-name order so repeated calls over an
/// unchanged tree return the same sequence. A symlinked `root` is resolved;
/// symlinks below it are not followed. Any walk error aborts the call and
/// discards what was collected so far.
pub fn find_paths(root: &Path, pattern: &str, kind: ArtifactKind) -> Result<Vec<PathBuf>> {
    let pattern = OutputPattern::new(pattern)?;
    let mut out = Vec::new();

    let meta = fs::metadata(root).map_err(|source| DiscoverError::Walk {
        path: root.to_path_buf(),
        source,
    })?;
    visit(root, meta.is_dir(), &pattern, kind, &mut out)?;

    if out.is_empty() {
        debug!(
            "couldn't find output artifact on path: {}",
            root.join(pattern.as_str()).display()
        );
    }
    Ok(out)
}

fn visit(
    path: &Path,
    is_dir: bool,
    pattern: &OutputPattern,
    kind: ArtifactKind,
    out: &mut Vec<PathBuf>,
) -> Result<()> {
    if kind.accepts(is_dir) && pattern.matches(&path.to_string_lossy()) {
        out.push(path.to_path_buf());
    }
    if !is_dir {
        return Ok(());
    }

    let walk_err = |source| DiscoverError::Walk {
        path: path.to_path_buf(),
        source,
    };
    let mut children = Vec::new();
    for entry in fs::read_dir(path).map_err(walk_err)? {
        let entry = entry.map_err(walk_err)?;
        let file_type = entry.file_type().map_err(|source| DiscoverError::Walk {
            path: entry.path(),
            source,
        })?;
        children.push((entry.file_name(), file_type.is_dir()));
    }
    children.sort_by(|a, b| a.0.cmp(&b.0));

    for (name, child_is_dir) in children {
        visit(&path.join(name), child_is_dir, pattern, kind, out)?;
    }
    Ok(())
}

/// Discover a specification's artifacts: one walk per output pattern,
/// concatenated in pattern order. Results are not deduplicated.
pub fn artifact_paths(spec: &PlatformSpec) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in &spec.output_patterns {
        paths.extend(find_paths(
            &spec.project_location,
            pattern,
            spec.artifact_kind,
        )?);
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use artex_platform::{BuildMode, Selection};

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("build/host/outputs/repo/b")).unwrap();
        fs::create_dir_all(root.join("build/host/outputs/repo/a")).unwrap();
        fs::write(root.join("build/host/outputs/repo/b/lib.aar"), b"b").unwrap();
        fs::write(root.join("build/host/outputs/repo/a/lib.aar"), b"a").unwrap();
        fs::write(root.join("build/host/outputs/repo/a/lib.pom"), b"pom").unwrap();
        fs::create_dir_all(root.join("build/web/assets")).unwrap();
        fs::write(root.join("build/web/index.html"), b"<html>").unwrap();
        dir
    }

    #[test]
    fn files_in_walk_order() {
        let dir = fixture();
        let found = find_paths(dir.path(), "*.aar", ArtifactKind::File).unwrap();
        assert_eq!(
            found,
            vec![
                dir.path().join("build/host/outputs/repo/a/lib.aar"),
                dir.path().join("build/host/outputs/repo/b/lib.aar"),
            ]
        );
    }

    #[test]
    fn kind_filter_excludes_directories() {
        let dir = fixture();
        let found = find_paths(dir.path(), "*/build/web", ArtifactKind::File).unwrap();
        assert!(found.is_empty());
        let found = find_paths(dir.path(), "*/build/web", ArtifactKind::Directory).unwrap();
        assert_eq!(found, vec![dir.path().join("build/web")]);
    }

    #[test]
    fn only_matching_kind_and_pattern() {
        let dir = fixture();
        let found = find_paths(dir.path(), "*", ArtifactKind::Directory).unwrap();
        assert!(!found.is_empty());
        assert!(found.iter().all(|p| p.is_dir()));
        assert_eq!(found[0], dir.path());

        let found = find_paths(dir.path(), "*/repo/*", ArtifactKind::File).unwrap();
        assert_eq!(found.len(), 3);
        assert!(found.iter().all(|p| p.is_file()));
    }

    #[test]
    fn no_match_is_empty_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let found = find_paths(dir.path(), "*.xcframework", ArtifactKind::Directory).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn missing_root_is_walk_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_paths(&dir.path().join("gone"), "*", ArtifactKind::File).unwrap_err();
        assert!(matches!(err, DiscoverError::Walk { .. }));
    }

    #[test]
    fn stable_across_calls() {
        let dir = fixture();
        let first = find_paths(dir.path(), "*", ArtifactKind::File).unwrap();
        let second = find_paths(dir.path(), "*", ArtifactKind::File).unwrap();
        assert_eq!(first, second);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directory_counts_as_file() {
        let dir = fixture();
        std::os::unix::fs::symlink(dir.path().join("build/web"), dir.path().join("web-link"))
            .unwrap();
        let dirs = find_paths(dir.path(), "*/web-link", ArtifactKind::Directory).unwrap();
        assert!(dirs.is_empty());
        let files = find_paths(dir.path(), "*/web-link", ArtifactKind::File).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn artifact_paths_concatenates_in_pattern_order() {
        let dir = fixture();
        let spec = PlatformSpec::new(
            "Android",
            BuildMode::Aar,
            vec![Selection::Android],
            vec!["*/b/lib.aar".into(), "*/a/lib.aar".into(), "*/b/lib.aar".into()],
            dir.path(),
        )
        .unwrap();
        let found = artifact_paths(&spec).unwrap();
        assert_eq!(
            found,
            vec![
                dir.path().join("build/host/outputs/repo/b/lib.aar"),
                dir.path().join("build/host/outputs/repo/a/lib.aar"),
                dir.path().join("build/host/outputs/repo/b/lib.aar"),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_root_is_walked() {
        let dir = fixture();
        let outer = tempfile::tempdir().unwrap();
        let link = outer.path().join("project");
        std::os::unix::fs::symlink(dir.path(), &link).unwrap();

        let found = find_paths(&link, "*/build/web", ArtifactKind::Directory).unwrap();
        assert_eq!(found, vec![link.join("build/web")]);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_subtree_discards_earlier_matches() {
        use std::os::unix::fs::PermissionsExt;

        let dir = fixture();
        let locked = dir.path().join("zz-locked");
        fs::create_dir(&locked).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        // Privileged users read through the mode bits.
        let readable = fs::read_dir(&locked).is_ok();

        let result = find_paths(dir.path(), "*.aar", ArtifactKind::File);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        if readable {
            return;
        }

        match result {
            Err(DiscoverError::Walk { path, .. }) => assert_eq!(path, locked),
            other => panic!("expected walk error, got {other:?}"),
        }
    }
}
