//! Shared output formatting for lint results.

use anyhow::Result;
use evre_lint_core::{LintResult, Severity, Violation, ViolationDiagnostic};
use miette::{NamedSource, Report};
use std::fmt::Write as _;
use std::path::Path;

use crate::OutputFormat;

/// Print lint results in the specified format.
pub fn print(result: &LintResult, format: OutputFormat, root: &Path) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(result),
        OutputFormat::Json => return print_json(result),
        OutputFormat::Compact => print!("{}", render_compact(result)),
        OutputFormat::Fancy => print_fancy(result, root),
    }
    Ok(())
}

fn print_text(result: &LintResult) {
    for violation in &result.violations {
        let severity = match violation.severity {
            Severity::Error => "\x1b[31merror\x1b[0m",
            Severity::Warning => "\x1b[33mwarning\x1b[0m",
            Severity::Info => "\x1b[34minfo\x1b[0m",
        };

        println!("{} at {}", violation.rule, violation.location);
        println!("  {severity}: {}", violation.message);
        for label in &violation.labels {
            println!("  --> {}: {}", label.location, label.message);
        }
        if let Some(suggestion) = &violation.suggestion {
            println!("  = help: {}", suggestion.message);
        }
        if let Some(doc_ref) = &violation.doc_ref {
            println!("  = see: {doc_ref}");
        }
        println!();
    }
    println!("{}", summary_colored(result));
}

fn summary_colored(result: &LintResult) -> String {
    let (errors, warnings, _) = result.count_by_severity();
    let color = if errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };
    format!("{color}{}\x1b[0m", summary(result))
}

fn summary(result: &LintResult) -> String {
    let (errors, warnings, infos) = result.count_by_severity();
    let mut line = format!(
        "Found {errors} error(s), {warnings} warning(s), {infos} info(s) in {} file(s)",
        result.files_checked
    );
    if result.files_skipped > 0 {
        let _ = write!(line, "; {} file(s) not checked", result.files_skipped);
    }
    line
}

fn print_json(result: &LintResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{json}");
    Ok(())
}

/// One violation per line: `file:line:column: severity [rule] message (name)`.
fn render_compact(result: &LintResult) -> String {
    result
        .violations
        .iter()
        .map(|v| format!("{v}\n"))
        .collect()
}

fn print_fancy(result: &LintResult, root: &Path) {
    for violation in &result.violations {
        eprintln!("{:?}", fancy_report(violation, root));
    }
    println!("{}", summary(result));
}

fn fancy_report(violation: &Violation, root: &Path) -> Report {
    let report = Report::new(ViolationDiagnostic::from(violation));
    let file = &violation.location.file;
    match std::fs::read_to_string(root.join(file)) {
        Ok(source) => report.with_source_code(NamedSource::new(file.display().to_string(), source)),
        Err(_) => report,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evre_lint_core::Location;

    fn result() -> LintResult {
        let mut result = LintResult::new();
        result.violations.push(
            Violation::new(
                "class-prefix",
                Severity::Error,
                Location::new("wrong_class.hpp", 6, 7),
                "class template `evre::Widget` must start with `C`",
            )
            .with_symbol("class evre::Widget<type>", "evre::Widget"),
        );
        result.violations.push(Violation::new(
            "redundant-qualifier",
            Severity::Warning,
            Location::new("wrong_class.hpp", 14, 23),
            "qualifier `evre::` is redundant inside namespace `evre`",
        ));
        result.files_checked = 1;
        result
    }

    #[test]
    fn compact_is_one_line_per_violation() {
        insta::assert_snapshot!(render_compact(&result()), @r"
        wrong_class.hpp:6:7: error [class-prefix] class template `evre::Widget` must start with `C` (evre::Widget)
        wrong_class.hpp:14:23: warning [redundant-qualifier] qualifier `evre::` is redundant inside namespace `evre`
        ");
    }

    #[test]
    fn summary_counts_by_severity() {
        assert_eq!(
            summary(&result()),
            "Found 1 error(s), 1 warning(s), 0 info(s) in 1 file(s)"
        );
    }

    #[test]
    fn summary_mentions_cancelled_units() {
        let mut result = result();
        result.files_skipped = 3;
        assert!(summary(&result).ends_with("; 3 file(s) not checked"));
    }

    #[test]
    fn json_keeps_qualified_name_and_drops_symbol_key() {
        let json = serde_json::to_string(&result()).unwrap();
        assert!(json.contains("\"qualified_name\":\"evre::Widget\""));
        assert!(!json.contains("symbol_key"));
    }
}
