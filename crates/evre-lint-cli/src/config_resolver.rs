//! Configuration file lookup.
//!
//! Priority order:
//!
//! 1. `--config` flag or `$EVRE_LINT_CONFIG`
//! 2. `{project}/evre-lint.toml` or `{project}/.evre-lint.toml`
//! 3. `config.toml` in the global directory (`$EVRE_LINT_CONFIG_DIR`, else
//!    `~/.evre-lint/`)
//! 4. Built-in defaults

use anyhow::{Context, Result};
use evre_lint_core::{load_rules_from_toml, Config, RuleConfiguration};
use std::path::{Path, PathBuf};

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given on the command line or through the environment.
    Explicit(PathBuf),
    /// Found in the project directory.
    Project(PathBuf),
    /// Found in the global config directory.
    Global(PathBuf),
    /// Nothing found; defaults apply.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Loads the analyzer configuration and the naming rules from the same
    /// file. Both are empty for [`ConfigSource::Default`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, or either part is invalid.
    pub fn load(&self) -> Result<(Config, RuleConfiguration)> {
        let Some(path) = self.path() else {
            return Ok((Config::default(), RuleConfiguration::empty()));
        };
        if matches!(self, Self::Global(_)) {
            tracing::info!("Using global config: {}", path.display());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config = Config::parse(&content)
            .with_context(|| format!("Failed to load config: {}", path.display()))?;
        let rules = load_rules_from_toml(&content)
            .with_context(|| format!("Invalid naming rules in {}", path.display()))?;
        Ok((config, rules))
    }
}

/// Project-level config file names, checked in order.
const PROJECT_CONFIG_NAMES: &[&str] = &["evre-lint.toml", ".evre-lint.toml"];

/// Config file name within the global config directory.
const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Resolves the configuration file for `project_dir`.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_inner(project_dir, explicit, global_config_dir())
}

/// Takes `global_dir` as a parameter so tests need not touch the environment.
fn resolve_inner(
    project_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    for name in PROJECT_CONFIG_NAMES {
        let candidate = project_dir.join(name);
        if candidate.is_file() {
            tracing::debug!("Found project config: {}", candidate.display());
            return ConfigSource::Project(candidate);
        }
    }

    if let Some(dir) = global_dir {
        let candidate = dir.join(GLOBAL_CONFIG_NAME);
        if candidate.is_file() {
            tracing::debug!("Found global config: {}", candidate.display());
            return ConfigSource::Global(candidate);
        }
    }

    ConfigSource::Default
}

/// Returns the global config directory: `$EVRE_LINT_CONFIG_DIR`, else
/// `~/.evre-lint/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("EVRE_LINT_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".evre-lint"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use evre_lint_core::Severity;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn explicit_wins_over_project() {
        let tmp = TempDir::new().unwrap();
        let explicit = tmp.path().join("custom.toml");
        fs::write(&explicit, "").unwrap();
        let project = tmp.path().join("project");
        fs::create_dir(&project).unwrap();
        fs::write(project.join("evre-lint.toml"), "").unwrap();

        let result = resolve_inner(&project, Some(&explicit), None);
        assert_eq!(result, ConfigSource::Explicit(explicit));
    }

    #[test]
    fn plain_name_preferred_over_dot_prefix() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("evre-lint.toml"), "").unwrap();
        fs::write(tmp.path().join(".evre-lint.toml"), "").unwrap();

        let result = resolve_inner(tmp.path(), None, None);
        assert_eq!(
            result,
            ConfigSource::Project(tmp.path().join("evre-lint.toml"))
        );
    }

    #[test]
    fn dot_prefixed_project_config_is_found() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".evre-lint.toml"), "").unwrap();

        let result = resolve_inner(tmp.path(), None, None);
        assert_eq!(
            result,
            ConfigSource::Project(tmp.path().join(".evre-lint.toml"))
        );
    }

    #[test]
    fn global_fallback_when_project_has_none() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        fs::write(global.path().join("config.toml"), "").unwrap();

        let result = resolve_inner(project.path(), None, Some(global.path().to_path_buf()));
        assert_eq!(
            result,
            ConfigSource::Global(global.path().join("config.toml"))
        );
    }

    #[test]
    fn empty_global_dir_means_defaults() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();

        let result = resolve_inner(project.path(), None, Some(global.path().to_path_buf()));
        assert_eq!(result, ConfigSource::Default);
    }

    #[test]
    fn default_source_loads_empty_configuration() {
        let (config, rules) = ConfigSource::Default.load().unwrap();
        assert!(config.rules.is_empty());
        assert!(rules.is_empty());
    }

    #[test]
    fn load_reads_config_and_naming_rules_from_one_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("evre-lint.toml");
        fs::write(
            &path,
            r#"
fail_on = "warning"

[[naming]]
id = "class-prefix"
applies_to = ["class"]
shape = { prefix = "C" }
message = "class `{name}` must start with `C`"
"#,
        )
        .unwrap();

        let (config, rules) = ConfigSource::Project(path).load().unwrap();
        assert_eq!(config.fail_threshold(), Severity::Warning);
        assert_eq!(rules.rules().len(), 1);
    }

    #[test]
    fn load_reports_invalid_rules_with_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("evre-lint.toml");
        fs::write(
            &path,
            "[[naming]]\nid = \"Bad Id\"\napplies_to = []\nshape = { prefix = \"\" }\nmessage = \"m\"\n",
        )
        .unwrap();

        let err = ConfigSource::Project(path.clone()).load().unwrap_err();
        assert!(err.to_string().contains(&path.display().to_string()));
    }
}
