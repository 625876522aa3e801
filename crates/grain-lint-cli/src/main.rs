//! grain-lint CLI tool.
//!
//! Usage:
//! ```bash
//! grain-lint check [OPTIONS] [PATHS]...
//! grain-lint list-rules [--preset <PRESET>]
//! grain-lint init [--force]
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Layered-architecture and functional-style linter for TypeScript projects
#[derive(Parser)]
#[command(name = "grain-lint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "GRAIN_LINT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run lint checks
    Check {
        /// Files or directories to analyze (default: current directory)
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Rule preset (overrides the config file)
        #[arg(short, long)]
        preset: Option<String>,

        /// Minimum severity that fails the run (overrides the config file)
        #[arg(long)]
        fail_on: Option<String>,

        /// Use the legacy dependency table (same as --preset legacy)
        #[arg(long, conflicts_with = "preset")]
        legacy: bool,

        /// Exclude patterns (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,
    },

    /// List available rules
    ListRules {
        /// Only list the rules of this preset
        #[arg(short, long)]
        preset: Option<String>,
    },

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-violation compact format.
    Compact,
    /// Source snippets with labels, rendered by miette.
    Rich,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check {
            paths,
            format,
            preset,
            fail_on,
            legacy,
            exclude,
        } => {
            let preset = if legacy {
                Some("legacy".to_string())
            } else {
                preset
            };
            let options = commands::check::CheckOptions {
                paths,
                format,
                preset,
                fail_on,
                exclude,
            };
            commands::check::run(&options, cli.config.as_deref())
        }
        Commands::ListRules { preset } => {
            commands::list_rules::run(preset.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Init { force } => {
            commands::init::run(force)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
