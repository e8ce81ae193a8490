//! TOML deserialization types (DTO layer).
//!
//! These types exist solely for serde deserialization.
//! They are converted to domain model types via the loader.

use serde::Deserialize;

/// Raw TOML representation of the `[[naming]]` rule list.
///
/// Other sections of the configuration file are ignored here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamingConfigDto {
    /// Naming rules in declaration order.
    #[serde(default)]
    pub naming: Vec<NamingRuleDto>,
}

/// TOML representation of one naming rule.
#[derive(Debug, Clone, Deserialize)]
pub struct NamingRuleDto {
    /// Rule identifier (e.g., "class-prefix").
    pub id: String,
    /// Declaration kinds the rule applies to.
    pub applies_to: Vec<String>,
    /// Name-shape predicate.
    pub shape: ShapeDto,
    /// Violation message template.
    pub message: String,
    /// Severity (default: "error").
    #[serde(default = "default_severity_str")]
    pub severity: String,
    /// Document reference.
    #[serde(default)]
    pub doc: Option<String>,
}

/// TOML representation of a name shape, written as a one-key table:
/// `shape = { prefix = "C" }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeDto {
    /// Name must start with the string.
    Prefix(String),
    /// Name must not start with the string.
    ForbiddenPrefix(String),
    /// Name must end with the string.
    Suffix(String),
    /// Name must match the regular expression.
    Regex(String),
    /// Name must follow a casing convention.
    Casing(String),
    /// Name must be at most this many characters.
    MaxLength(usize),
    /// Name must be at least this many characters.
    MinLength(usize),
}

fn default_severity_str() -> String {
    "error".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_empty() {
        let dto: NamingConfigDto = toml::from_str("").unwrap();
        assert!(dto.naming.is_empty());
    }

    #[test]
    fn deserialize_ignores_other_sections() {
        let dto: NamingConfigDto = toml::from_str(
            r#"
fail_on = "warning"

[analyzer]
exclude = ["third_party/**"]

[rules.redundant-qualifier]
enabled = false
"#,
        )
        .unwrap();
        assert!(dto.naming.is_empty());
    }

    #[test]
    fn deserialize_all_shapes() {
        let dto: NamingConfigDto = toml::from_str(
            r#"
[[naming]]
id = "class-prefix"
applies_to = ["class"]
shape = { prefix = "C" }
message = "class `{name}` must start with `C`"
doc = "STYLE.md#classes"

[[naming]]
id = "no-m-prefix"
applies_to = ["variable"]
shape = { forbidden-prefix = "m_" }
message = "drop the `m_` prefix"

[[naming]]
id = "exception-suffix"
applies_to = ["class"]
shape = { suffix = "Error" }
message = "m"

[[naming]]
id = "function-regex"
applies_to = ["function"]
shape = { regex = "^[a-z][A-Za-z0-9]*$" }
message = "m"

[[naming]]
id = "function-case"
applies_to = ["function"]
shape = { casing = "lower-first" }
message = "m"
severity = "warning"

[[naming]]
id = "short-names"
applies_to = ["class", "function"]
shape = { max-length = 24 }
message = "m"

[[naming]]
id = "long-names"
applies_to = ["variable"]
shape = { min-length = 2 }
message = "m"
"#,
        )
        .unwrap();

        let shapes: Vec<&ShapeDto> = dto.naming.iter().map(|r| &r.shape).collect();
        assert_eq!(
            shapes,
            vec![
                &ShapeDto::Prefix("C".to_string()),
                &ShapeDto::ForbiddenPrefix("m_".to_string()),
                &ShapeDto::Suffix("Error".to_string()),
                &ShapeDto::Regex("^[a-z][A-Za-z0-9]*$".to_string()),
                &ShapeDto::Casing("lower-first".to_string()),
                &ShapeDto::MaxLength(24),
                &ShapeDto::MinLength(2),
            ]
        );
        assert_eq!(dto.naming[0].severity, "error");
        assert_eq!(dto.naming[0].doc.as_deref(), Some("STYLE.md#classes"));
        assert_eq!(dto.naming[4].severity, "warning");
    }

    #[test]
    fn deserialize_rejects_unknown_shape() {
        let result: Result<NamingConfigDto, _> = toml::from_str(
            r#"
[[naming]]
id = "x"
applies_to = ["class"]
shape = { glob = "C*" }
message = "m"
"#,
        );
        assert!(result.is_err());
    }
}
