//! Core analyzer for orchestrating lint execution.
//!
//! Each translation unit runs the same synchronous pipeline on a worker of
//! a rayon pool:
//!
//! ```text
//! source ─▶ Frontend ─▶ DeclarationModel ─▶ resolve ─▶ evaluate + checks ─▶ DiagnosticCollector
//! ```
//!
//! The rule configuration and the analyzer itself are shared read-only by
//! every worker. Merging the per-unit results is a barrier; the merged
//! violations are sorted globally.

use crate::checks::{builtin_checks, CheckBox};
use crate::collector::DiagnosticCollector;
use crate::config::Config;
use crate::engine::evaluate_all;
use crate::frontend::{FrontendBox, FrontendError};
use crate::model::DeclarationModel;
use crate::naming::RuleConfiguration;
use crate::resolver::resolve;
use crate::types::{LintResult, Violation};

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error resolving paths.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A source file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// File that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The frontend produced no model for a file.
    #[error("Parse error in {path}: {source}")]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Frontend error.
        source: FrontendError,
    },

    /// Directory traversal failed.
    #[error("Walk error: {0}")]
    Walk(#[from] ignore::Error),

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// The worker pool could not be created.
    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Files were requested but no frontend was configured.
    #[error("No frontend configured")]
    NoFrontend,
}

/// Cooperative cancellation at translation-unit granularity.
///
/// Units that have started run to completion; queued units are not started
/// once [`CancellationToken::cancel`] has been called.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    paths: Vec<PathBuf>,
    frontend: Option<FrontendBox>,
    rules: Option<RuleConfiguration>,
    checks: Option<Vec<CheckBox>>,
    exclude_patterns: Vec<String>,
    extensions: Vec<String>,
    parallelism: Option<usize>,
    config: Option<Config>,
    cancellation: Option<CancellationToken>,
    fail_on_parse_error: bool,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the project root. Reported paths are relative to it, and it is
    /// scanned when no explicit paths are given.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds a file or directory to analyze.
    #[must_use]
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.push(path.into());
        self
    }

    /// Adds several files or directories to analyze.
    #[must_use]
    pub fn paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.paths.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Sets the language frontend.
    #[must_use]
    pub fn frontend(mut self, frontend: FrontendBox) -> Self {
        self.frontend = Some(frontend);
        self
    }

    /// Sets the naming rules.
    #[must_use]
    pub fn rules(mut self, rules: RuleConfiguration) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Replaces the built-in structural checks.
    #[must_use]
    pub fn checks(mut self, checks: Vec<CheckBox>) -> Self {
        self.checks = Some(checks);
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Restricts analysis to these file extensions (without the dot).
    #[must_use]
    pub fn extension(mut self, ext: impl Into<String>) -> Self {
        self.extensions.push(ext.into());
        self
    }

    /// Sets the number of worker threads (default: one per core).
    #[must_use]
    pub fn parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads);
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Shares a cancellation token with the caller.
    #[must_use]
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Sets whether unreadable or unparsable files abort the run (default: false).
    #[must_use]
    pub fn fail_on_parse_error(mut self, fail: bool) -> Self {
        self.fail_on_parse_error = fail;
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory cannot be determined or an
    /// exclude pattern is invalid.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let config = self.config.unwrap_or_default();

        let root = self.root.unwrap_or_else(|| config.analyzer.root.clone());
        let root = absolute(root)?;
        let mut paths = self
            .paths
            .into_iter()
            .map(absolute)
            .collect::<Result<Vec<_>, _>>()?;
        if paths.is_empty() {
            paths.push(root.clone());
        }

        // Merge exclude patterns from config
        let mut exclude_patterns = self.exclude_patterns;
        exclude_patterns.extend(config.analyzer.exclude.iter().cloned());
        let exclude = exclude_patterns
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        let extensions = if self.extensions.is_empty() {
            config.analyzer.extensions.clone()
        } else {
            self.extensions
        };

        Ok(Analyzer {
            root,
            paths,
            frontend: self.frontend,
            rules: self.rules.unwrap_or_default(),
            checks: self.checks.unwrap_or_else(builtin_checks),
            exclude,
            extensions,
            parallelism: self.parallelism.or(config.analyzer.parallelism),
            respect_gitignore: config.analyzer.respect_gitignore,
            config,
            cancellation: self.cancellation.unwrap_or_default(),
            fail_on_parse_error: self.fail_on_parse_error,
        })
    }
}

fn absolute(path: PathBuf) -> Result<PathBuf, std::io::Error> {
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Outcome of one translation unit.
enum UnitOutcome {
    Checked(Vec<Violation>),
    Skipped,
    Cancelled,
    Failed(AnalyzerError),
}

/// The main analyzer that orchestrates lint execution.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    root: PathBuf,
    paths: Vec<PathBuf>,
    frontend: Option<FrontendBox>,
    rules: RuleConfiguration,
    checks: Vec<CheckBox>,
    exclude: Vec<glob::Pattern>,
    extensions: Vec<String>,
    parallelism: Option<usize>,
    respect_gitignore: bool,
    config: Config,
    cancellation: CancellationToken,
    fail_on_parse_error: bool,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the naming rules.
    #[must_use]
    pub fn rules(&self) -> &RuleConfiguration {
        &self.rules
    }

    /// Returns the cancellation token checked before each unit starts.
    #[must_use]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Discovers and analyzes all files.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery fails, or a file fails while
    /// `fail_on_parse_error` is set.
    pub fn analyze(&self) -> Result<LintResult, AnalyzerError> {
        info!("Starting analysis at {}", self.root.display());
        let files = self.discover_files()?;
        info!("Found {} files to analyze", files.len());
        self.analyze_files(&files)
    }

    /// Analyzes the given files in parallel.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker pool cannot start, or a file fails
    /// while `fail_on_parse_error` is set.
    pub fn analyze_files(&self, files: &[PathBuf]) -> Result<LintResult, AnalyzerError> {
        if files.is_empty() {
            return Ok(LintResult::new());
        }
        if self.frontend.is_none() {
            return Err(AnalyzerError::NoFrontend);
        }
        self.run_units(files, |path| self.analyze_unit(path))
    }

    /// Checks models built elsewhere, such as from declaration records.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker pool cannot start.
    pub fn analyze_models(&self, models: &[DeclarationModel]) -> Result<LintResult, AnalyzerError> {
        self.run_units(models, |model| UnitOutcome::Checked(self.check_model(model)))
    }

    /// Runs `check` over every unit on the worker pool and merges the
    /// outcomes in unit order.
    fn run_units<T, F>(&self, units: &[T], check: F) -> Result<LintResult, AnalyzerError>
    where
        T: Sync,
        F: Fn(&T) -> UnitOutcome + Sync,
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.parallelism.unwrap_or(0))
            .build()?;
        let outcomes: Vec<UnitOutcome> = pool.install(|| {
            units
                .par_iter()
                .map(|unit| {
                    if self.cancellation.is_cancelled() {
                        UnitOutcome::Cancelled
                    } else {
                        check(unit)
                    }
                })
                .collect()
        });

        let mut result = LintResult::new();
        for outcome in outcomes {
            match outcome {
                UnitOutcome::Checked(violations) => {
                    result.violations.extend(violations);
                    result.files_checked += 1;
                }
                UnitOutcome::Skipped => {}
                UnitOutcome::Cancelled => result.files_skipped += 1,
                UnitOutcome::Failed(e) => return Err(e),
            }
        }
        result.sort();

        info!(
            "Analysis complete: {} violations in {} files ({} not started)",
            result.violations.len(),
            result.files_checked,
            result.files_skipped
        );
        Ok(result)
    }

    fn analyze_unit(&self, path: &Path) -> UnitOutcome {
        debug!("Analyzing: {}", path.display());

        let source = match std::fs::read(path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(source) => {
                return self.unit_failure(AnalyzerError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        match self.analyze_source(self.display_path(path), &source) {
            Ok(violations) => UnitOutcome::Checked(violations),
            Err(e) => self.unit_failure(e),
        }
    }

    fn unit_failure(&self, error: AnalyzerError) -> UnitOutcome {
        warn!("{error}");
        if self.fail_on_parse_error {
            UnitOutcome::Failed(error)
        } else {
            UnitOutcome::Skipped
        }
    }

    /// Parses one translation unit from memory and checks it.
    ///
    /// # Errors
    ///
    /// Returns an error if no frontend is configured or it fails.
    pub fn analyze_source(
        &self,
        path: &Path,
        source: &str,
    ) -> Result<Vec<Violation>, AnalyzerError> {
        let frontend = self.frontend.as_ref().ok_or(AnalyzerError::NoFrontend)?;
        let model = frontend
            .extract(path, source)
            .map_err(|source| AnalyzerError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(self.check_model(&model))
    }

    /// Runs resolution, naming rules and structural checks over one model
    /// and returns the finalized, deduplicated violations.
    #[must_use]
    pub fn check_model(&self, model: &DeclarationModel) -> Vec<Violation> {
        let resolution = resolve(model);
        let mut collector = DiagnosticCollector::new();

        for violation in resolution.diagnostics {
            if let Some(violation) = self.configure(violation) {
                collector.insert(violation);
            }
        }

        for violation in evaluate_all(&resolution.symbols, &self.rules) {
            if let Some(violation) = self.configure(violation) {
                collector.insert(violation);
            }
        }

        for check in &self.checks {
            if !self.config.is_rule_enabled(check.name()) {
                debug!("Skipping disabled check: {}", check.name());
                continue;
            }
            for decl in model.declarations() {
                if let Some(violation) = check.check(model, decl) {
                    collector.insert(self.apply_severity_override(violation));
                }
            }
        }

        debug!(
            file = %model.file().display(),
            symbols = resolution.symbols.len(),
            violations = collector.len(),
            "checked translation unit"
        );
        collector.into_violations()
    }

    /// Drops violations of disabled rules and applies severity overrides.
    fn configure(&self, violation: Violation) -> Option<Violation> {
        self.config
            .is_rule_enabled(&violation.rule)
            .then(|| self.apply_severity_override(violation))
    }

    /// Applies severity overrides from configuration.
    fn apply_severity_override(&self, mut violation: Violation) -> Violation {
        if let Some(severity) = self.config.rule_severity(&violation.rule) {
            violation.severity = severity;
        }
        violation
    }

    /// Discovers all source files under the configured paths, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if directory traversal fails.
    pub fn discover_files(&self) -> Result<Vec<PathBuf>, AnalyzerError> {
        let mut files = Vec::new();
        for path in &self.paths {
            if path.is_file() {
                if self.is_candidate(path) {
                    files.push(path.clone());
                }
                continue;
            }

            let mut builder = ignore::WalkBuilder::new(path);
            builder
                .hidden(false)
                .git_ignore(self.respect_gitignore)
                .git_exclude(self.respect_gitignore)
                .require_git(false);
            for entry in builder.build() {
                let entry = entry?;
                let file = entry.path();
                if !file.is_file() || !self.is_candidate(file) {
                    continue;
                }
                if self.should_exclude(file) {
                    debug!("Excluding: {}", file.display());
                    continue;
                }
                files.push(file.to_path_buf());
            }
        }
        files.sort();
        files.dedup();
        Ok(files)
    }

    fn is_candidate(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return self.frontend.as_ref().is_some_and(|f| f.handles(path));
        }
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|x| x == ext))
    }

    /// Checks if a path should be excluded. Patterns match the path
    /// relative to the root, so directories above the root never count.
    fn should_exclude(&self, path: &Path) -> bool {
        let relative = self.display_path(path);
        self.exclude
            .iter()
            .any(|pattern| pattern.matches_path(relative))
    }

    fn display_path<'p>(&self, path: &'p Path) -> &'p Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }
}
