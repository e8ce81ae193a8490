//! Check command implementation.

use anyhow::{Context, Result};
use evre_lint_core::{models_from_json, Analyzer, Severity};
use evre_lint_cpp::CppFrontend;
use std::path::PathBuf;

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Options of the check command.
pub struct CheckOptions {
    /// Directory reported paths are relative to.
    pub project: PathBuf,
    /// Files or directories to analyze; empty means the project directory.
    pub paths: Vec<PathBuf>,
    /// Output format.
    pub format: OutputFormat,
    /// Extra exclude globs.
    pub exclude: Vec<String>,
    /// Worker thread count.
    pub jobs: Option<usize>,
    /// Declaration records to check instead of sources.
    pub records: Option<PathBuf>,
    /// Failure threshold override.
    pub fail_on: Option<Severity>,
    /// Abort on unreadable or unparsable files.
    pub strict: bool,
}

/// Runs the check command.
pub fn run(options: &CheckOptions, source: &ConfigSource) -> Result<()> {
    let (config, rules) = source.load()?;
    let threshold = options.fail_on.unwrap_or_else(|| config.fail_threshold());

    let mut builder = Analyzer::builder()
        .root(&options.project)
        .paths(options.paths.iter().cloned())
        .config(config)
        .rules(rules)
        .frontend(Box::new(CppFrontend::new()))
        .excludes(options.exclude.iter().cloned())
        .fail_on_parse_error(options.strict);
    if let Some(jobs) = options.jobs {
        builder = builder.parallelism(jobs);
    }
    let analyzer = builder.build().context("Failed to build analyzer")?;

    tracing::info!(
        "Checking {} with {} naming rules",
        analyzer.root().display(),
        analyzer.rules().rules().len()
    );

    let result = match &options.records {
        Some(records) => {
            let json = std::fs::read_to_string(records)
                .with_context(|| format!("Failed to read records: {}", records.display()))?;
            let models = models_from_json(&json)
                .with_context(|| format!("Invalid records in {}", records.display()))?;
            analyzer.analyze_models(&models).context("Analysis failed")?
        }
        None => analyzer.analyze().context("Analysis failed")?,
    };

    super::output::print(&result, options.format, analyzer.root())?;

    if result.has_violations_at(threshold) {
        std::process::exit(1);
    }

    Ok(())
}
