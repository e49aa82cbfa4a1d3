//! `artex build`: build each selected platform, discover and export its
//! artifacts, then collect dependency caches.

use std::path::PathBuf;

use anyhow::{Context, Result};
use artex_export::{export, EnvExporter, Envman, ExportReport};
use artex_invoke::{FlutterToolchain, Toolchain};
use artex_platform::{registry, PlatformSpec};
use tracing::{debug, info};

use crate::commands::cache::{self, CacheCollector};
use crate::config::{BuildArgs, Config, RunContext};

/// Finds a specification's artifacts on disk.
pub trait Discovery {
    /// Every artifact matching the specification's patterns, in pattern order.
    fn discover(&self, spec: &PlatformSpec) -> artex_discover::Result<Vec<PathBuf>>;
}

/// Pattern walk over the project tree.
pub struct FsDiscovery;

impl Discovery for FsDiscovery {
    fn discover(&self, spec: &PlatformSpec) -> artex_discover::Result<Vec<PathBuf>> {
        artex_discover::artifact_paths(spec)
    }
}

/// Run the build pipeline.
pub fn run(args: BuildArgs) -> Result<()> {
    let config = Config::resolve(args)?;
    config.print();

    let specs = registry(
        &config.patterns,
        &config.project_location,
        &config.additional_params,
    )
    .context("invalid platform configuration")?;
    let ctx = config.context();
    let toolchain = FlutterToolchain::new(config.build_tool.as_str());
    let mut env = Envman::new(config.envman.as_str());
    let collectors = cache::default_collectors(home_dir());

    execute(&ctx, &specs, &toolchain, &FsDiscovery, &collectors, &mut env)?;
    Ok(())
}

/// Process every specification in order, then collect caches.
///
/// The first build, discovery or export failure aborts the run. Cache
/// collection failures are logged and never fail the run.
pub fn execute(
    ctx: &RunContext,
    specs: &[PlatformSpec],
    toolchain: &dyn Toolchain,
    discovery: &dyn Discovery,
    collectors: &[Box<dyn CacheCollector>],
    env: &mut dyn EnvExporter,
) -> Result<Vec<ExportReport>> {
    let mut reports = Vec::new();
    for spec in specs {
        if !spec.buildable(ctx.selection) {
            debug!(platform = %spec.display_name, selection = %ctx.selection, "not selected");
            continue;
        }
        reports.push(process(ctx, spec, toolchain, discovery, env)?);
    }

    println!();
    info!("Collecting cache");
    cache::collect_all(&ctx.project, collectors, env);

    Ok(reports)
}

fn process(
    ctx: &RunContext,
    spec: &PlatformSpec,
    toolchain: &dyn Toolchain,
    discovery: &dyn Discovery,
    env: &mut dyn EnvExporter,
) -> Result<ExportReport> {
    println!();
    info!("Build {}", spec.display_name);
    toolchain
        .build(spec)
        .with_context(|| format!("failed to build {} platform", spec.display_name))?;

    println!();
    info!("Export {} artifact", spec.display_name);
    let artifacts = discovery
        .discover(spec)
        .with_context(|| format!("failed to find {} artifacts", spec.display_name))?;
    debug!(count = artifacts.len(), "artifacts discovered");

    export(spec.mode, &artifacts, &ctx.deploy_dir, env)
        .with_context(|| format!("failed to export {} artifacts", spec.display_name))
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;
    use std::path::Path;

    use artex_export::{MemoryEnv, AAR_PATH, WEB_DIRECTORY_PATH};
    use artex_invoke::{BuildOutput, InvokeError};
    use artex_platform::{BuildMode, PatternSet, Selection};

    use crate::commands::cache::CacheEntry;

    /// Records build calls; fails for the modes listed in `fail`.
    #[derive(Default)]
    struct FakeToolchain {
        calls: RefCell<Vec<BuildMode>>,
        fail: Vec<BuildMode>,
    }

    impl Toolchain for FakeToolchain {
        fn build(&self, spec: &PlatformSpec) -> artex_invoke::Result<BuildOutput> {
            self.calls.borrow_mut().push(spec.mode);
            if self.fail.contains(&spec.mode) {
                return Err(InvokeError::Spawn {
                    program: "flutter".into(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
                });
            }
            Ok(BuildOutput::default())
        }
    }

    /// Counts discovery calls and delegates to the real walk.
    #[derive(Default)]
    struct CountingDiscovery {
        calls: RefCell<Vec<BuildMode>>,
    }

    impl Discovery for CountingDiscovery {
        fn discover(&self, spec: &PlatformSpec) -> artex_discover::Result<Vec<PathBuf>> {
            self.calls.borrow_mut().push(spec.mode);
            FsDiscovery.discover(spec)
        }
    }

    struct FailingCollector(&'static str);

    impl CacheCollector for FailingCollector {
        fn name(&self) -> &str {
            self.0
        }

        fn collect(&self, _project: &Path) -> Result<Vec<CacheEntry>> {
            anyhow::bail!("{} is broken", self.0)
        }
    }

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let fw = root.join("build/ios/framework/Release/App.xcframework");
        fs::create_dir_all(&fw).unwrap();
        fs::write(fw.join("Info.plist"), b"<plist/>").unwrap();
        let repo = root.join("build/host/outputs/repo");
        fs::create_dir_all(&repo).unwrap();
        fs::write(repo.join("flutter_release-1.0.aar"), b"aar").unwrap();
        fs::create_dir_all(root.join("build/web")).unwrap();
        fs::write(root.join("build/web/index.html"), b"<html>").unwrap();
        dir
    }

    fn specs(project: &Path) -> Vec<PlatformSpec> {
        let patterns = PatternSet {
            ios: "*/build/ios/framework/Release/*.xcframework".into(),
            android: "*/build/host/outputs/repo/*.aar".into(),
            web: "*/build/web".into(),
        };
        registry(&patterns, project, "").unwrap()
    }

    fn ctx(selection: Selection, project: &Path, deploy: &Path) -> RunContext {
        RunContext {
            selection,
            project: project.to_path_buf(),
            deploy_dir: deploy.to_path_buf(),
        }
    }

    #[test]
    fn both_builds_ios_then_android() {
        let project = project();
        let deploy = tempfile::tempdir().unwrap();
        let toolchain = FakeToolchain::default();
        let discovery = CountingDiscovery::default();
        let mut env = MemoryEnv::new();

        let reports = execute(
            &ctx(Selection::Both, project.path(), deploy.path()),
            &specs(project.path()),
            &toolchain,
            &discovery,
            &[],
            &mut env,
        )
        .unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(
            *toolchain.calls.borrow(),
            vec![BuildMode::IosFramework, BuildMode::Aar]
        );
        assert!(deploy.path().join("App.xcframework.zip").is_file());
        assert!(deploy.path().join("flutter_release-1.0.aar").is_file());
        assert!(env.get(AAR_PATH).is_some());
    }

    #[test]
    fn unselected_specs_cost_nothing() {
        let project = project();
        let deploy = tempfile::tempdir().unwrap();
        let toolchain = FakeToolchain::default();
        let discovery = CountingDiscovery::default();
        let mut env = MemoryEnv::new();

        execute(
            &ctx(Selection::Web, project.path(), deploy.path()),
            &specs(project.path()),
            &toolchain,
            &discovery,
            &[],
            &mut env,
        )
        .unwrap();

        assert_eq!(*toolchain.calls.borrow(), vec![BuildMode::Web]);
        assert_eq!(*discovery.calls.borrow(), vec![BuildMode::Web]);
        assert!(env.get(WEB_DIRECTORY_PATH).is_some());
    }

    #[test]
    fn build_failure_stops_the_run() {
        let project = project();
        let deploy = tempfile::tempdir().unwrap();
        let toolchain = FakeToolchain {
            fail: vec![BuildMode::IosFramework],
            ..FakeToolchain::default()
        };
        let discovery = CountingDiscovery::default();
        let mut env = MemoryEnv::new();

        let err = execute(
            &ctx(Selection::Both, project.path(), deploy.path()),
            &specs(project.path()),
            &toolchain,
            &discovery,
            &[],
            &mut env,
        )
        .unwrap_err();

        assert!(err.to_string().contains("failed to build iOS platform"));
        assert_eq!(*toolchain.calls.borrow(), vec![BuildMode::IosFramework]);
        assert!(discovery.calls.borrow().is_empty());
        assert!(env.is_empty());
    }

    #[test]
    fn export_failure_names_platform() {
        let project = tempfile::tempdir().unwrap();
        let deploy = tempfile::tempdir().unwrap();
        let toolchain = FakeToolchain::default();
        let mut env = MemoryEnv::new();

        // No web build on disk.
        let err = execute(
            &ctx(Selection::Web, project.path(), deploy.path()),
            &specs(project.path()),
            &toolchain,
            &FsDiscovery,
            &[],
            &mut env,
        )
        .unwrap_err();
        assert!(err.to_string().contains("failed to export Web artifacts"));
    }

    #[test]
    fn discovery_failure_names_platform() {
        let project = project();
        let deploy = tempfile::tempdir().unwrap();
        let toolchain = FakeToolchain::default();
        let mut env = MemoryEnv::new();
        let mut specs = specs(project.path());
        for spec in &mut specs {
            spec.project_location = project.path().join("vanished");
        }

        let err = execute(
            &ctx(Selection::Android, project.path(), deploy.path()),
            &specs,
            &toolchain,
            &FsDiscovery,
            &[],
            &mut env,
        )
        .unwrap_err();
        assert!(err.to_string().contains("failed to find Android artifacts"));
    }

    #[test]
    fn cache_failures_do_not_fail_the_run() {
        let project = project();
        let deploy = tempfile::tempdir().unwrap();
        let toolchain = FakeToolchain::default();
        let mut env = MemoryEnv::new();
        let collectors: Vec<Box<dyn CacheCollector>> = vec![
            Box::new(FailingCollector("cocoapods")),
            Box::new(FailingCollector("carthage")),
            Box::new(FailingCollector("android")),
            Box::new(FailingCollector("flutter")),
        ];

        let reports = execute(
            &ctx(Selection::Android, project.path(), deploy.path()),
            &specs(project.path()),
            &toolchain,
            &FsDiscovery,
            &collectors,
            &mut env,
        )
        .unwrap();
        assert_eq!(reports.len(), 1);
        assert!(env.get(cache::CACHE_INCLUDE_PATHS).is_none());
    }
}
