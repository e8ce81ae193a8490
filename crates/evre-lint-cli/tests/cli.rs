//! End-to-end runs of the `evre-lint` binary.

use std::fs;
use std::process::Command;

const CONFIG: &str = r#"
[[naming]]
id = "class-prefix"
applies_to = ["class"]
shape = { prefix = "C" }
message = "{kind} `{name}` must start with `C`"
"#;

fn evre_lint() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_evre-lint"));
    command.env_remove("EVRE_LINT_CONFIG").env("EVRE_LINT_CONFIG_DIR", "/nonexistent");
    command
}

#[test]
fn check_fails_on_violations_and_prints_compact_lines() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("evre-lint.toml"), CONFIG).unwrap();
    fs::write(
        dir.path().join("widget.hpp"),
        "namespace evre {\nclass Widget {};\n}\n",
    )
    .unwrap();

    let output = evre_lint()
        .args(["check", "--format", "compact"])
        .arg(dir.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        "widget.hpp:2:7: error [class-prefix] class `evre::Widget` must start with `C` (evre::Widget)"
    );
}

#[test]
fn check_passes_on_clean_sources() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("evre-lint.toml"), CONFIG).unwrap();
    fs::write(dir.path().join("engine.hpp"), "class CEngine {};\n").unwrap();

    let status = evre_lint()
        .args(["check", "--format", "json"])
        .arg(dir.path())
        .status()
        .unwrap();
    assert!(status.success());
}

#[test]
fn fail_on_flag_lowers_the_threshold() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("evre-lint.toml"),
        format!("{CONFIG}severity = \"warning\"\n"),
    )
    .unwrap();
    fs::write(dir.path().join("widget.hpp"), "class Widget {};\n").unwrap();

    let lenient = evre_lint()
        .args(["check", "--format", "compact"])
        .arg(dir.path())
        .status()
        .unwrap();
    assert!(lenient.success());

    let strict = evre_lint()
        .args(["check", "--format", "compact", "--fail-on", "warning"])
        .arg(dir.path())
        .status()
        .unwrap();
    assert_eq!(strict.code(), Some(1));
}

#[test]
fn invalid_rules_are_reported_before_analysis() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("evre-lint.toml"),
        "[[naming]]\nid = \"x\"\napplies_to = [\"enum\"]\nshape = { prefix = \"C\" }\nmessage = \"m\"\n",
    )
    .unwrap();

    let output = evre_lint().arg("check").arg(dir.path()).output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid naming rules"), "stderr: {stderr}");
}
