//! List rules command implementation.

use anyhow::Result;
use evre_lint_core::builtin_checks;
use evre_lint_core::resolver::{AMBIGUOUS_RESOLUTION, UNRESOLVED_DEFINITION};

use crate::config_resolver::ConfigSource;

/// Runs the list-rules command.
pub fn run(source: &ConfigSource) -> Result<()> {
    let (config, rules) = source.load()?;
    let state = |id: &str| if config.is_rule_enabled(id) { "on" } else { "off" };

    println!("Built-in checks:\n");
    println!("{:<26} {:<9} {:<5} Description", "Name", "Severity", "State");
    println!("{}", "-".repeat(80));
    println!(
        "{:<26} {:<9} {:<5} Out-of-line definition with no matching declaration",
        UNRESOLVED_DEFINITION,
        config.rule_severity(UNRESOLVED_DEFINITION).map_or("error".into(), |s| s.to_string()),
        state(UNRESOLVED_DEFINITION)
    );
    println!(
        "{:<26} {:<9} {:<5} Out-of-line definition matching several declarations",
        AMBIGUOUS_RESOLUTION,
        config.rule_severity(AMBIGUOUS_RESOLUTION).map_or("warning".into(), |s| s.to_string()),
        state(AMBIGUOUS_RESOLUTION)
    );
    for check in builtin_checks() {
        println!(
            "{:<26} {:<9} {:<5} {}",
            check.name(),
            config
                .rule_severity(check.name())
                .unwrap_or_else(|| check.default_severity())
                .to_string(),
            state(check.name()),
            check.description()
        );
    }

    match source.path() {
        Some(path) => println!("\nNaming rules from {}:\n", path.display()),
        None => println!("\nNaming rules:\n"),
    }
    if rules.is_empty() {
        println!("  (none configured; run `evre-lint init` to create evre-lint.toml)");
        return Ok(());
    }
    for rule in rules.rules() {
        let severity = config
            .rule_severity(rule.id().as_str())
            .unwrap_or_else(|| rule.severity());
        println!(
            "{:<26} {:<9} {:<5} {} must match {}",
            rule.id().as_str(),
            severity.to_string(),
            state(rule.id().as_str()),
            rule.applies_to(),
            rule.shape()
        );
    }
    Ok(())
}
