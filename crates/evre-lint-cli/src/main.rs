//! evre-lint CLI tool.
//!
//! Usage:
//! ```bash
//! evre-lint check [OPTIONS] [PATHS]...
//! evre-lint list-rules
//! evre-lint init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use evre_lint_core::Severity;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Naming-convention checker for C++ sources
#[derive(Parser)]
#[command(name = "evre-lint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "EVRE_LINT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run lint checks
    Check {
        /// Files or directories to analyze (default: current directory)
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Exclude patterns (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Number of translation units analyzed in parallel
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Check declaration records (JSON) instead of parsing sources
        #[arg(long)]
        records: Option<PathBuf>,

        /// Lowest severity that fails the run (default: from config, else error)
        #[arg(long, value_parser = parse_severity)]
        fail_on: Option<Severity>,

        /// Abort on unreadable or unparsable files instead of skipping them
        #[arg(long)]
        strict: bool,
    },

    /// List built-in checks and configured naming rules
    ListRules,

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
    /// Source excerpts rendered by miette.
    Fancy,
}

fn parse_severity(value: &str) -> Result<Severity, String> {
    Severity::parse(value).ok_or_else(|| format!("expected error, warning or info, got `{value}`"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check {
            paths,
            format,
            exclude,
            jobs,
            records,
            fail_on,
            strict,
        } => {
            let project = project_dir(&paths);
            let source = config_resolver::resolve(&project, cli.config.as_deref());
            commands::check::run(
                &commands::check::CheckOptions {
                    project,
                    paths,
                    format,
                    exclude,
                    jobs,
                    records,
                    fail_on,
                    strict,
                },
                &source,
            )
        }
        Commands::ListRules => {
            let source = config_resolver::resolve(Path::new("."), cli.config.as_deref());
            commands::list_rules::run(&source)
        }
        Commands::Init { force } => commands::init::run(Path::new("."), force),
    }
}

/// The directory whose config applies: the first path given, or its parent
/// when it is a file.
fn project_dir(paths: &[PathBuf]) -> PathBuf {
    match paths.first() {
        Some(path) if path.is_file() => path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
        Some(path) => path.clone(),
        None => PathBuf::from("."),
    }
}
