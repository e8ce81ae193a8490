//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const CONFIG_NAME: &str = "evre-lint.toml";

const DEFAULT_CONFIG: &str = r#"# evre-lint configuration

# Lowest severity that makes `evre-lint check` exit with status 1
fail_on = "error"

[analyzer]
# Root directory to analyze (default: current directory)
# root = "./src"

# Glob patterns to exclude, relative to the root
exclude = [
    "**/build/**",
    "**/third_party/**",
]

# File extensions to analyze (default: all C++ source and header extensions)
# extensions = ["hpp", "cpp"]

# Respect .gitignore files
respect_gitignore = true

# Translation units analyzed in parallel (default: one per core)
# parallelism = 4

# Built-in checks can be disabled or re-graded here; the same tables
# re-grade naming rules by id.

[rules.unresolved-definition]
enabled = true
# severity = "warning"

[rules.redundant-qualifier]
enabled = true

# [rules.redundant-template-args]
# enabled = false

# Naming rules. Shapes: prefix, forbidden-prefix, suffix, regex, casing
# (pascal, camel, snake, screaming-snake, lower-first, upper-first),
# max-length, min-length. Messages may use {name}, {simple}, {kind}, {rule}.

[[naming]]
id = "class-prefix"
applies_to = ["class"]
shape = { prefix = "C" }
message = "{kind} `{name}` must start with `C`"

[[naming]]
id = "function-lower"
applies_to = ["function"]
shape = { casing = "lower-first" }
message = "function `{name}` must start with a lowercase letter"
severity = "warning"
"#;

/// Runs the init command in `dir`.
pub fn run(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_NAME);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)?;

    println!("Created {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_NAME} to match your naming conventions");
    println!("  2. Run: evre-lint check");

    Ok(())
}
