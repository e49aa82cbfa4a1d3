//! artex: build Flutter modules per platform and publish their artifacts
//! for the rest of a CI workflow.

mod commands;
mod config;
mod logging;

use std::process;

use artex_platform::Selection;
use clap::{Parser, Subcommand};

use config::BuildArgs;

#[derive(Parser)]
#[command(name = "artex", version, about = "Build-and-export orchestrator for Flutter modules")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the selected platforms and export their artifacts
    Build(BuildArgs),
    /// List the supported platforms
    Platforms {
        /// Only platforms enabled by this selection
        #[arg(long)]
        selection: Option<Selection>,
        /// Output format (text, json)
        #[arg(long)]
        format: Option<String>,
    },
    /// Check that the build tool and envman are available
    Doctor {
        /// Build tool program
        #[arg(long, env = "ARTEX_BUILD_TOOL", default_value = "flutter")]
        build_tool: String,
        /// Program used to register environment values
        #[arg(long, env = "ARTEX_ENVMAN", default_value = "envman")]
        envman: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Build(args) => {
            logging::init(args.debug);
            commands::build::run(args)
        }
        Commands::Platforms { selection, format } => {
            commands::platforms::run(selection, format.as_deref())
        }
        Commands::Doctor { build_tool, envman } => {
            logging::init(false);
            commands::doctor::run(&build_tool, &envman)
        }
    }
}
