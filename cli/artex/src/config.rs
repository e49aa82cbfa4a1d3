//! Build configuration: CLI flags, CI environment inputs, and `artex.toml`.
//!
//! Precedence, highest first: command-line flag, environment variable,
//! config file, built-in default.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use artex_platform::{PatternSet, Selection};
use clap::Args;
use serde::{Deserialize, Serialize};

/// Default config file name, looked up in the project directory.
pub const CONFIG_FILE: &str = "artex.toml";

/// Inputs of `artex build`.
#[derive(Debug, Clone, Default, Args)]
pub struct BuildArgs {
    /// Platforms to build (both, ios, android, web)
    #[arg(long, env = "platform")]
    pub platform: Option<Selection>,
    /// Newline-separated iOS framework output patterns
    #[arg(long, env = "ios_output_pattern")]
    pub ios_output_pattern: Option<String>,
    /// Newline-separated Android archive output patterns
    #[arg(long, env = "android_output_pattern")]
    pub android_output_pattern: Option<String>,
    /// Newline-separated web build output patterns
    #[arg(long, env = "web_output_pattern")]
    pub web_output_pattern: Option<String>,
    /// Project root directory
    #[arg(long, env = "project_location")]
    pub project_location: Option<PathBuf>,
    /// Extra arguments for the build tool, in shell syntax
    #[arg(long, env = "additional_build_params", allow_hyphen_values = true)]
    pub additional_build_params: Option<String>,
    /// Build tool program
    #[arg(long, env = "ARTEX_BUILD_TOOL")]
    pub build_tool: Option<String>,
    /// Directory receiving exported artifacts
    #[arg(long, env = "BITRISE_DEPLOY_DIR")]
    pub deploy_dir: Option<PathBuf>,
    /// Program used to register environment values
    #[arg(long, env = "ARTEX_ENVMAN")]
    pub envman: Option<String>,
    /// Enable debug logging
    #[arg(long, env = "is_debug_mode")]
    pub debug: bool,
    /// Config file (default: <project>/artex.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Contents of `artex.toml`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Platform selection.
    #[serde(default)]
    pub platform: Option<Selection>,
    /// Build tool program.
    #[serde(default)]
    pub build_tool: Option<String>,
    /// Extra build arguments.
    #[serde(default)]
    pub additional_build_params: Option<String>,
    /// Output patterns per platform.
    #[serde(default)]
    pub patterns: PatternsConfig,
}

/// `[patterns]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternsConfig {
    /// iOS framework patterns.
    #[serde(default)]
    pub ios: Option<String>,
    /// Android archive patterns.
    #[serde(default)]
    pub android: Option<String>,
    /// Web build patterns.
    #[serde(default)]
    pub web: Option<String>,
}

impl FileConfig {
    /// Load `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Load an explicit config file, or `artex.toml` in `project` if present.
    pub fn discover(explicit: Option<&Path>, project: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = project.join(CONFIG_FILE);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }
}

/// Resolved, validated configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Platform selection.
    pub platform: Selection,
    /// Raw output patterns.
    pub patterns: PatternSet,
    /// Absolute project root.
    pub project_location: PathBuf,
    /// Absolute deploy directory.
    pub deploy_dir: PathBuf,
    /// Extra build arguments.
    pub additional_params: String,
    /// Build tool program.
    pub build_tool: String,
    /// Registration program.
    pub envman: String,
    /// Debug logging.
    pub debug: bool,
}

/// Paths and selection shared by every stage of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    /// Platform selection.
    pub selection: Selection,
    /// Absolute project root.
    pub project: PathBuf,
    /// Absolute deploy directory.
    pub deploy_dir: PathBuf,
}

impl Config {
    /// Merge flags, environment and config file, then validate.
    ///
    /// Fails before anything is built when an input is missing or the
    /// project directory does not exist. The deploy directory is created.
    pub fn resolve(args: BuildArgs) -> Result<Self> {
        let project_input = args
            .project_location
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        let project_location = std::path::absolute(&project_input).with_context(|| {
            format!(
                "failed to get absolute project path for {}",
                project_input.display()
            )
        })?;
        if !project_location.is_dir() {
            bail!(
                "project path does not exist: {}",
                project_location.display()
            );
        }

        let file = FileConfig::discover(args.config.as_deref(), &project_location)?;

        let patterns = PatternSet {
            ios: required("ios_output_pattern", args.ios_output_pattern, file.patterns.ios)?,
            android: required(
                "android_output_pattern",
                args.android_output_pattern,
                file.patterns.android,
            )?,
            web: required("web_output_pattern", args.web_output_pattern, file.patterns.web)?,
        };

        let Some(deploy_input) = args.deploy_dir else {
            bail!("missing required input: deploy directory (set BITRISE_DEPLOY_DIR or --deploy-dir)");
        };
        let deploy_dir = std::path::absolute(&deploy_input).with_context(|| {
            format!("failed to get absolute path for {}", deploy_input.display())
        })?;
        std::fs::create_dir_all(&deploy_dir)
            .with_context(|| format!("creating deploy directory {}", deploy_dir.display()))?;

        Ok(Self {
            platform: args.platform.or(file.platform).unwrap_or(Selection::Both),
            patterns,
            project_location,
            deploy_dir,
            additional_params: args
                .additional_build_params
                .or(file.additional_build_params)
                .unwrap_or_default(),
            build_tool: args
                .build_tool
                .or(file.build_tool)
                .unwrap_or_else(|| "flutter".to_string()),
            envman: args.envman.unwrap_or_else(|| "envman".to_string()),
            debug: args.debug,
        })
    }

    /// The shared run context.
    pub fn context(&self) -> RunContext {
        RunContext {
            selection: self.platform,
            project: self.project_location.clone(),
            deploy_dir: self.deploy_dir.clone(),
        }
    }

    /// Print the resolved inputs.
    pub fn print(&self) {
        println!("Config:");
        println!("  platform:                {}", self.platform);
        println!("  ios_output_pattern:      {}", one_line(&self.patterns.ios));
        println!("  android_output_pattern:  {}", one_line(&self.patterns.android));
        println!("  web_output_pattern:      {}", one_line(&self.patterns.web));
        println!("  project_location:        {}", self.project_location.display());
        println!("  deploy_dir:              {}", self.deploy_dir.display());
        println!("  additional_build_params: {}", self.additional_params);
        println!("  build_tool:              {}", self.build_tool);
        println!("  is_debug_mode:           {}", self.debug);
    }
}

fn required(name: &str, flag: Option<String>, file: Option<String>) -> Result<String> {
    match flag.or(file) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => bail!("missing required input: {name}"),
    }
}

fn one_line(patterns: &str) -> String {
    patterns.lines().collect::<Vec<_>>().join(" | ")
}
