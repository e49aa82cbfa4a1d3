//! Best-effort dependency cache collection.
//!
//! Each collector turns the project layout into cache include entries. The
//! entries are appended to `BITRISE_CACHE_INCLUDE_PATHS` so a later cache
//! step can archive them. A failing collector only produces a warning.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use artex_export::EnvExporter;
use tracing::{debug, warn};

/// Environment value listing cache include paths, one per line.
pub const CACHE_INCLUDE_PATHS: &str = "BITRISE_CACHE_INCLUDE_PATHS";

/// Directories never searched for indicator files.
const SKIPPED_DIRS: &[&str] = &[
    ".git",
    ".dart_tool",
    ".pub-cache",
    "Pods",
    "Carthage",
    "build",
    "node_modules",
];

/// A path to cache, optionally invalidated by changes to an indicator file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// File or directory to cache.
    pub path: PathBuf,
    /// File whose content change invalidates the cache.
    pub indicator: Option<PathBuf>,
}

impl CacheEntry {
    fn new(path: PathBuf, indicator: Option<PathBuf>) -> Self {
        Self { path, indicator }
    }
}

impl fmt::Display for CacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.indicator {
            Some(indicator) => write!(f, "{} -> {}", self.path.display(), indicator.display()),
            None => write!(f, "{}", self.path.display()),
        }
    }
}

/// Collects cache entries for one toolchain family.
pub trait CacheCollector {
    /// Name used in log messages.
    fn name(&self) -> &str;

    /// Entries to cache for `project`. Empty when the family is not used.
    fn collect(&self, project: &Path) -> Result<Vec<CacheEntry>>;
}

/// `Pods` next to every `Podfile.lock`.
pub struct Cocoapods;

impl CacheCollector for Cocoapods {
    fn name(&self) -> &str {
        "cocoapods"
    }

    fn collect(&self, project: &Path) -> Result<Vec<CacheEntry>> {
        sibling_entries(project, "Podfile.lock", "Pods")
    }
}

/// `Carthage` next to every `Cartfile.resolved`.
pub struct Carthage;

impl CacheCollector for Carthage {
    fn name(&self) -> &str {
        "carthage"
    }

    fn collect(&self, project: &Path) -> Result<Vec<CacheEntry>> {
        sibling_entries(project, "Cartfile.resolved", "Carthage")
    }
}

/// Gradle caches and the Android build cache under the home directory.
pub struct Android {
    home: Option<PathBuf>,
}

impl CacheCollector for Android {
    fn name(&self) -> &str {
        "android"
    }

    fn collect(&self, project: &Path) -> Result<Vec<CacheEntry>> {
        let mut gradle_files = find_named(project, "build.gradle")?;
        gradle_files.extend(find_named(project, "build.gradle.kts")?);
        gradle_files.sort();
        let Some(indicator) = gradle_files.into_iter().next() else {
            return Ok(Vec::new());
        };
        let home = require_home(self.home.as_deref())?;
        Ok([".gradle/caches", ".gradle/wrapper", ".android/build-cache"]
            .into_iter()
            .map(|dir| CacheEntry::new(home.join(dir), Some(indicator.clone())))
            .collect())
    }
}

/// The pub cache and the project's `.dart_tool`, keyed on `pubspec.lock`.
pub struct Flutter {
    home: Option<PathBuf>,
}

impl CacheCollector for Flutter {
    fn name(&self) -> &str {
        "flutter"
    }

    fn collect(&self, project: &Path) -> Result<Vec<CacheEntry>> {
        let lock = project.join("pubspec.lock");
        if !lock.is_file() {
            return Ok(Vec::new());
        }
        let home = require_home(self.home.as_deref())?;
        Ok(vec![
            CacheEntry::new(home.join(".pub-cache"), Some(lock.clone())),
            CacheEntry::new(project.join(".dart_tool"), Some(lock)),
        ])
    }
}

/// The four collectors, in run order.
pub fn default_collectors(home: Option<PathBuf>) -> Vec<Box<dyn CacheCollector>> {
    vec![
        Box::new(Cocoapods),
        Box::new(Carthage),
        Box::new(Android { home: home.clone() }),
        Box::new(Flutter { home }),
    ]
}

/// Run every collector and publish the accumulated include list.
///
/// Starts from the include list already present in the process environment.
pub fn collect_all(project: &Path, collectors: &[Box<dyn CacheCollector>], env: &mut dyn EnvExporter) {
    let existing = std::env::var(CACHE_INCLUDE_PATHS).unwrap_or_default();
    let mut includes = IncludeList::parse(&existing);

    for collector in collectors {
        let entries = match collector.collect(project) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to collect {} cache, error: {e:#}", collector.name());
                continue;
            }
        };
        if !includes.extend(&entries) {
            debug!(collector = collector.name(), "nothing new to cache");
            continue;
        }
        if let Err(e) = env.export(CACHE_INCLUDE_PATHS, &includes.render()) {
            warn!("Failed to collect {} cache, error: {e}", collector.name());
        }
    }
}

/// Ordered, deduplicated include lines.
#[derive(Debug, Default)]
struct IncludeList {
    lines: Vec<String>,
}

impl IncludeList {
    fn parse(value: &str) -> Self {
        let mut list = Self::default();
        for line in value.lines().map(str::trim).filter(|l| !l.is_empty()) {
            list.push(line.to_string());
        }
        list
    }

    fn push(&mut self, line: String) -> bool {
        if self.lines.contains(&line) {
            return false;
        }
        self.lines.push(line);
        true
    }

    /// Append entries, returning whether anything was added.
    fn extend(&mut self, entries: &[CacheEntry]) -> bool {
        let mut added = false;
        for entry in entries {
            added |= self.push(entry.to_string());
        }
        added
    }

    fn render(&self) -> String {
        self.lines.join("\n")
    }
}

fn require_home(home: Option<&Path>) -> Result<&Path> {
    match home {
        Some(home) => Ok(home),
        None => bail!("HOME is not set"),
    }
}

fn sibling_entries(project: &Path, indicator: &str, cached: &str) -> Result<Vec<CacheEntry>> {
    Ok(find_named(project, indicator)?
        .into_iter()
        .filter_map(|file| {
            let dir = file.parent()?.to_path_buf();
            Some(CacheEntry::new(dir.join(cached), Some(file)))
        })
        .collect())
}

/// Every regular file called `name` under `root`, skipping build and
/// dependency directories.
fn find_named(root: &Path, name: &str) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries =
            fs::read_dir(&dir).with_context(|| format!("reading {}", dir.display()))?;
        for entry in entries {
            let entry = entry.with_context(|| format!("reading {}", dir.display()))?;
            let file_type = entry.file_type()?;
            let file_name = entry.file_name();
            if file_type.is_dir() {
                if !SKIPPED_DIRS.iter().any(|skip| file_name == *skip) {
                    pending.push(entry.path());
                }
            } else if file_type.is_file() && file_name == name {
                found.push(entry.path());
            }
        }
    }
    found.sort();
    Ok(found)
}
