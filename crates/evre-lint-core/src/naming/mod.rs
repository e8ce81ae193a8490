//! Naming rules driven by TOML configuration.
//!
//! # Architecture
//!
//! ```text
//! TOML text
//!   ↓ serde (DTO layer)
//! config_dto types
//!   ↓ validate + convert
//! RuleConfiguration (pure domain model)
//!   ↓ shared by reference with every worker
//! engine::evaluate()
//! ```
//!
//! A rule is written as a `[[naming]]` table:
//!
//! ```toml
//! [[naming]]
//! id = "class-prefix"
//! applies_to = ["class"]
//! shape = { prefix = "C" }
//! message = "{kind} `{name}` must start with `C`"
//! ```

pub mod config_dto;
pub mod loader;
pub mod model;

pub use model::{
    CaseStyle, KindSet, MessageContext, MessageTemplate, NameShape, NamingRule, RuleConfiguration,
    RuleError, RuleId,
};

/// Errors from parsing TOML and loading naming rules.
#[derive(Debug, thiserror::Error)]
pub enum LoadRulesError {
    /// TOML deserialization failed.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Domain model validation failed.
    #[error("{0}")]
    Load(#[from] loader::LoadError),
}

/// Parses TOML content and builds the rule configuration.
///
/// Returns an empty configuration if no `[[naming]]` section is present.
///
/// # Errors
///
/// Returns an error if TOML parsing or rule validation fails.
pub fn load_rules_from_toml(content: &str) -> Result<RuleConfiguration, LoadRulesError> {
    let dto: config_dto::NamingConfigDto = toml::from_str(content)?;
    Ok(loader::load(dto)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            load_rules_from_toml("[[naming]\nid = 1"),
            Err(LoadRulesError::Toml(_))
        ));
    }

    #[test]
    fn invalid_rule_is_a_load_error() {
        let result = load_rules_from_toml(
            r#"
[[naming]]
id = "x"
applies_to = ["class"]
shape = { prefix = "" }
message = "m"
"#,
        );
        assert!(matches!(result, Err(LoadRulesError::Load(_))));
    }
}
