//! DTO → Domain model conversion with validation.
//!
//! Every rule is converted even after an earlier one failed, so a broken
//! configuration reports all of its problems in one run.

use crate::model::DeclKind;
use crate::types::Severity;

use super::config_dto::{NamingConfigDto, NamingRuleDto, ShapeDto};
use super::model::{
    CaseStyle, KindSet, MessageTemplate, NameShape, NamingRule, RuleConfiguration, RuleError,
    RuleId,
};

/// Errors during DTO → Domain conversion.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A field-level validation error.
    #[error("{context}: {source}")]
    Validation {
        /// Where the error occurred (e.g., "naming[0].shape").
        context: String,
        /// The underlying rule error.
        source: RuleError,
    },

    /// Unknown declaration kind in `applies_to`.
    #[error(
        "{context}: unknown kind `{value}`, expected: class, template-class, function, variable"
    )]
    UnknownKind {
        /// Where the error occurred.
        context: String,
        /// The invalid value.
        value: String,
    },

    /// Unknown severity string.
    #[error("{context}: unknown severity `{value}`, expected: error, warning, info")]
    UnknownSeverity {
        /// Where the error occurred.
        context: String,
        /// The invalid value.
        value: String,
    },

    /// Cross-rule errors from aggregate root construction.
    #[error("configuration validation errors:\n{}", format_errors(.0))]
    CrossRef(Vec<RuleError>),

    /// Several of the errors above.
    #[error("{} configuration errors:\n{}", .0.len(), format_errors(.0))]
    Multiple(Vec<LoadError>),
}

fn format_errors<E: std::fmt::Display>(errors: &[E]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Converts a `NamingConfigDto` to a validated `RuleConfiguration`.
///
/// # Errors
///
/// Returns the single error, or [`LoadError::Multiple`] when several rules
/// are invalid.
pub fn load(dto: NamingConfigDto) -> Result<RuleConfiguration, LoadError> {
    let mut rules = Vec::with_capacity(dto.naming.len());
    let mut errors = Vec::new();

    for (index, rule) in dto.naming.into_iter().enumerate() {
        match convert_rule(rule, index) {
            Ok(rule) => rules.push(rule),
            Err(mut rule_errors) => errors.append(&mut rule_errors),
        }
    }

    if errors.is_empty() {
        return RuleConfiguration::new(rules).map_err(LoadError::CrossRef);
    }
    if let Err(cross) = RuleConfiguration::new(rules) {
        errors.push(LoadError::CrossRef(cross));
    }
    if errors.len() == 1 {
        Err(errors.remove(0))
    } else {
        Err(LoadError::Multiple(errors))
    }
}

fn convert_rule(dto: NamingRuleDto, index: usize) -> Result<NamingRule, Vec<LoadError>> {
    let ctx = format!("naming[{index}]");
    let mut errors = Vec::new();
    let validation = |field: &str, source: RuleError| LoadError::Validation {
        context: format!("{ctx}.{field}"),
        source,
    };

    let id = RuleId::new(&dto.id)
        .map_err(|e| errors.push(validation("id", e)))
        .ok();
    let label = id.as_ref().map_or(ctx.clone(), |id| format!("{ctx} '{id}'"));

    let kinds = convert_kinds(&dto.applies_to, &label, &mut errors);
    let applies_to = kinds.and_then(|kinds| {
        KindSet::new(kinds)
            .map_err(|e| errors.push(validation("applies_to", e)))
            .ok()
    });

    let shape = convert_shape(dto.shape)
        .map_err(|e| errors.push(validation("shape", e)))
        .ok();

    let message = MessageTemplate::new(&dto.message)
        .map_err(|e| errors.push(validation("message", e)))
        .ok();

    let severity = parse_severity(&dto.severity, &label)
        .map_err(|e| errors.push(e))
        .ok();

    match (id, applies_to, shape, message, severity) {
        (Some(id), Some(applies_to), Some(shape), Some(message), Some(severity))
            if errors.is_empty() =>
        {
            Ok(NamingRule::new(
                id, applies_to, shape, message, severity, dto.doc,
            ))
        }
        _ => Err(errors),
    }
}

fn convert_kinds(
    values: &[String],
    label: &str,
    errors: &mut Vec<LoadError>,
) -> Option<Vec<DeclKind>> {
    let mut kinds = Vec::with_capacity(values.len());
    let mut ok = true;
    for (i, value) in values.iter().enumerate() {
        match DeclKind::parse(value) {
            Some(kind) => kinds.push(kind),
            None => {
                ok = false;
                errors.push(LoadError::UnknownKind {
                    context: format!("{label}.applies_to[{i}]"),
                    value: value.clone(),
                });
            }
        }
    }
    ok.then_some(kinds)
}

fn convert_shape(dto: ShapeDto) -> Result<NameShape, RuleError> {
    match dto {
        ShapeDto::Prefix(p) if p.is_empty() => Err(RuleError::EmptyAffix { shape: "prefix" }),
        ShapeDto::Prefix(p) => Ok(NameShape::Prefix(p)),
        ShapeDto::ForbiddenPrefix(p) if p.is_empty() => Err(RuleError::EmptyAffix {
            shape: "forbidden-prefix",
        }),
        ShapeDto::ForbiddenPrefix(p) => Ok(NameShape::ForbiddenPrefix(p)),
        ShapeDto::Suffix(s) if s.is_empty() => Err(RuleError::EmptyAffix { shape: "suffix" }),
        ShapeDto::Suffix(s) => Ok(NameShape::Suffix(s)),
        ShapeDto::Regex(pattern) => NameShape::regex(&pattern),
        ShapeDto::Casing(value) => CaseStyle::parse(&value).map(NameShape::Casing),
        ShapeDto::MaxLength(0) => Err(RuleError::ZeroLength {
            shape: "max-length",
        }),
        ShapeDto::MaxLength(n) => Ok(NameShape::MaxLength(n)),
        ShapeDto::MinLength(0) => Err(RuleError::ZeroLength {
            shape: "min-length",
        }),
        ShapeDto::MinLength(n) => Ok(NameShape::MinLength(n)),
    }
}

fn parse_severity(value: &str, context: &str) -> Result<Severity, LoadError> {
    Severity::parse(value).ok_or_else(|| LoadError::UnknownSeverity {
        context: context.to_string(),
        value: value.to_string(),
    })
}
