//! Pure domain model for naming rules.
//!
//! This module contains no serde and no I/O dependencies.
//! All invariants are enforced at construction time via validated newtypes.

use crate::checks::{builtin_checks, StructuralCheck};
use crate::model::DeclKind;
use crate::resolver::{AMBIGUOUS_RESOLUTION, UNRESOLVED_DEFINITION};
use crate::types::Severity;
use std::collections::HashSet;
use std::fmt;

// ────────────────────────────────────────────
// Newtypes with validation
// ────────────────────────────────────────────

/// A validated rule identifier (non-empty, `[a-z0-9-]` only).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleId(String);

impl RuleId {
    /// Creates a new rule identifier.
    ///
    /// # Errors
    ///
    /// Returns error if the id is empty or contains invalid characters.
    pub fn new(id: &str) -> Result<Self, RuleError> {
        if id.is_empty() {
            return Err(RuleError::EmptyRuleId);
        }
        if !id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(RuleError::InvalidRuleId { id: id.to_string() });
        }
        Ok(Self(id.to_string()))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Casing conventions a name can be required to follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseStyle {
    /// `WidgetFactory`
    Pascal,
    /// `widgetFactory`
    Camel,
    /// `widget_factory`
    Snake,
    /// `WIDGET_FACTORY`
    ScreamingSnake,
    /// First character is lowercase.
    LowerFirst,
    /// First character is uppercase.
    UpperFirst,
}

impl CaseStyle {
    /// Parses a casing name.
    ///
    /// # Errors
    ///
    /// Returns error for unknown casing names.
    pub fn parse(value: &str) -> Result<Self, RuleError> {
        match value {
            "pascal" => Ok(Self::Pascal),
            "camel" => Ok(Self::Camel),
            "snake" => Ok(Self::Snake),
            "screaming-snake" => Ok(Self::ScreamingSnake),
            "lower-first" => Ok(Self::LowerFirst),
            "upper-first" => Ok(Self::UpperFirst),
            _ => Err(RuleError::UnknownCasing {
                value: value.to_string(),
            }),
        }
    }

    /// Tests whether `name` follows this convention.
    #[must_use]
    pub fn matches(self, name: &str) -> bool {
        let Some(first) = name.chars().next() else {
            return false;
        };
        let alnum = || name.chars().all(|c| c.is_ascii_alphanumeric());
        match self {
            Self::Pascal => first.is_ascii_uppercase() && alnum(),
            Self::Camel => first.is_ascii_lowercase() && alnum(),
            Self::Snake => {
                !first.is_ascii_digit()
                    && name
                        .chars()
                        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
            }
            Self::ScreamingSnake => {
                !first.is_ascii_digit()
                    && name
                        .chars()
                        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
            }
            Self::LowerFirst => first.is_lowercase(),
            Self::UpperFirst => first.is_uppercase(),
        }
    }
}

impl fmt::Display for CaseStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pascal => write!(f, "PascalCase"),
            Self::Camel => write!(f, "camelCase"),
            Self::Snake => write!(f, "snake_case"),
            Self::ScreamingSnake => write!(f, "SCREAMING_SNAKE_CASE"),
            Self::LowerFirst => write!(f, "a lowercase first letter"),
            Self::UpperFirst => write!(f, "an uppercase first letter"),
        }
    }
}

/// Structural test over a simple name.
#[derive(Debug, Clone)]
pub enum NameShape {
    /// Name must start with the string.
    Prefix(String),
    /// Name must not start with the string.
    ForbiddenPrefix(String),
    /// Name must end with the string.
    Suffix(String),
    /// Name must match the compiled expression.
    Regex(regex::Regex),
    /// Name must follow a casing convention.
    Casing(CaseStyle),
    /// Name must have at most this many characters.
    MaxLength(usize),
    /// Name must have at least this many characters.
    MinLength(usize),
}

impl NameShape {
    /// Compiles a regex shape.
    ///
    /// # Errors
    ///
    /// Returns error if the pattern does not compile.
    pub fn regex(pattern: &str) -> Result<Self, RuleError> {
        regex::Regex::new(pattern)
            .map(Self::Regex)
            .map_err(|e| RuleError::InvalidRegex {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })
    }

    /// Tests whether `name` satisfies this shape.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Prefix(prefix) => name.starts_with(prefix.as_str()),
            Self::ForbiddenPrefix(prefix) => !name.starts_with(prefix.as_str()),
            Self::Suffix(suffix) => name.ends_with(suffix.as_str()),
            Self::Regex(re) => re.is_match(name),
            Self::Casing(style) => style.matches(name),
            Self::MaxLength(max) => name.chars().count() <= *max,
            Self::MinLength(min) => name.chars().count() >= *min,
        }
    }

    /// Proposes a conforming name when the fix is mechanical.
    #[must_use]
    pub fn suggest(&self, name: &str) -> Option<String> {
        match self {
            Self::Prefix(prefix) => Some(format!("{prefix}{name}")),
            Self::ForbiddenPrefix(prefix) => name
                .strip_prefix(prefix.as_str())
                .filter(|rest| !rest.is_empty())
                .map(str::to_string),
            Self::Suffix(suffix) => Some(format!("{name}{suffix}")),
            Self::Regex(_) | Self::Casing(_) | Self::MaxLength(_) | Self::MinLength(_) => None,
        }
    }
}

impl fmt::Display for NameShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prefix(p) => write!(f, "prefix `{p}`"),
            Self::ForbiddenPrefix(p) => write!(f, "no prefix `{p}`"),
            Self::Suffix(s) => write!(f, "suffix `{s}`"),
            Self::Regex(re) => write!(f, "matches /{}/", re.as_str()),
            Self::Casing(style) => write!(f, "{style}"),
            Self::MaxLength(n) => write!(f, "at most {n} characters"),
            Self::MinLength(n) => write!(f, "at least {n} characters"),
        }
    }
}

/// Set of declaration kinds a rule applies to.
///
/// `class` also covers class templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindSet(Vec<DeclKind>);

impl KindSet {
    /// Creates a kind set.
    ///
    /// # Errors
    ///
    /// Returns error if `kinds` is empty.
    pub fn new(kinds: Vec<DeclKind>) -> Result<Self, RuleError> {
        if kinds.is_empty() {
            return Err(RuleError::EmptyKindSet);
        }
        Ok(Self(kinds))
    }

    /// Tests whether a symbol of `kind` is covered.
    #[must_use]
    pub fn matches(&self, kind: DeclKind) -> bool {
        self.0
            .iter()
            .any(|&k| k == kind || (k == DeclKind::Class && kind == DeclKind::TemplateClass))
    }

    /// Returns the configured kinds.
    #[must_use]
    pub fn kinds(&self) -> &[DeclKind] {
        &self.0
    }
}

impl fmt::Display for KindSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|k| k.as_str()).collect();
        write!(f, "{}", names.join(", "))
    }
}

/// Values substituted into a [`MessageTemplate`].
#[derive(Debug, Clone, Copy)]
pub struct MessageContext<'a> {
    /// Qualified name (`evre::Widget`).
    pub name: &'a str,
    /// Simple name (`Widget`).
    pub simple: &'a str,
    /// Symbol kind.
    pub kind: DeclKind,
    /// Rule identifier.
    pub rule: &'a str,
}

/// A validated message template.
///
/// Supported placeholders: `{name}`, `{simple}`, `{kind}`, `{rule}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate(String);

impl MessageTemplate {
    const PLACEHOLDERS: [&'static str; 4] = ["name", "simple", "kind", "rule"];

    /// Creates a template, rejecting unknown or unclosed placeholders.
    ///
    /// # Errors
    ///
    /// Returns error on an empty template or a bad placeholder.
    pub fn new(template: &str) -> Result<Self, RuleError> {
        if template.trim().is_empty() {
            return Err(RuleError::EmptyMessage);
        }
        let mut rest = template;
        while let Some(start) = rest.find('{') {
            let after = &rest[start + 1..];
            let Some(end) = after.find('}') else {
                return Err(RuleError::UnclosedPlaceholder {
                    template: template.to_string(),
                });
            };
            let placeholder = &after[..end];
            if !Self::PLACEHOLDERS.contains(&placeholder) {
                return Err(RuleError::UnknownPlaceholder {
                    placeholder: placeholder.to_string(),
                });
            }
            rest = &after[end + 1..];
        }
        Ok(Self(template.to_string()))
    }

    /// Substitutes all placeholders.
    #[must_use]
    pub fn render(&self, ctx: &MessageContext<'_>) -> String {
        self.0
            .replace("{name}", ctx.name)
            .replace("{simple}", ctx.simple)
            .replace("{kind}", &ctx.kind.to_string())
            .replace("{rule}", ctx.rule)
    }

    /// Returns the raw template.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ────────────────────────────────────────────
// Domain entities
// ────────────────────────────────────────────

/// A naming rule. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct NamingRule {
    id: RuleId,
    applies_to: KindSet,
    shape: NameShape,
    message: MessageTemplate,
    severity: Severity,
    doc: Option<String>,
}

impl NamingRule {
    /// Creates a new naming rule.
    #[must_use]
    pub fn new(
        id: RuleId,
        applies_to: KindSet,
        shape: NameShape,
        message: MessageTemplate,
        severity: Severity,
        doc: Option<String>,
    ) -> Self {
        Self {
            id,
            applies_to,
            shape,
            message,
            severity,
            doc,
        }
    }

    /// Returns the rule identifier.
    #[must_use]
    pub fn id(&self) -> &RuleId {
        &self.id
    }

    /// Returns the applicable kinds.
    #[must_use]
    pub fn applies_to(&self) -> &KindSet {
        &self.applies_to
    }

    /// Returns the name-shape predicate.
    #[must_use]
    pub fn shape(&self) -> &NameShape {
        &self.shape
    }

    /// Returns the message template.
    #[must_use]
    pub fn message(&self) -> &MessageTemplate {
        &self.message
    }

    /// Returns the severity.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Returns the document reference.
    #[must_use]
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }
}

// ────────────────────────────────────────────
// Aggregate root
// ────────────────────────────────────────────

/// Validated, ordered set of naming rules.
///
/// Shared read-only by every worker once constructed.
#[derive(Debug, Clone, Default)]
pub struct RuleConfiguration {
    rules: Vec<NamingRule>,
}

impl RuleConfiguration {
    /// Creates a configuration, checking that rule ids are unique and do not
    /// shadow a built-in diagnostic.
    ///
    /// # Errors
    ///
    /// Returns every reserved or duplicate id found.
    pub fn new(rules: Vec<NamingRule>) -> Result<Self, Vec<RuleError>> {
        let mut seen = HashSet::new();
        let errors: Vec<RuleError> = rules
            .iter()
            .filter_map(|rule| {
                let id = rule.id.as_str();
                if is_reserved(id) {
                    Some(RuleError::ReservedRuleId { id: id.to_owned() })
                } else if !seen.insert(id) {
                    Some(RuleError::DuplicateRuleId { id: id.to_owned() })
                } else {
                    None
                }
            })
            .collect();
        if errors.is_empty() {
            Ok(Self { rules })
        } else {
            Err(errors)
        }
    }

    /// Creates an empty configuration.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true if no rules are defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns all rules in declaration order.
    #[must_use]
    pub fn rules(&self) -> &[NamingRule] {
        &self.rules
    }

    /// Returns the rules applicable to `kind`, in declaration order.
    pub fn rules_for(&self, kind: DeclKind) -> impl Iterator<Item = &NamingRule> {
        self.rules
            .iter()
            .filter(move |rule| rule.applies_to.matches(kind))
    }

    /// Gets a rule by id.
    #[must_use]
    pub fn rule(&self, id: &str) -> Option<&NamingRule> {
        self.rules.iter().find(|r| r.id.as_str() == id)
    }
}

/// Ids of the resolver diagnostics and structural checks. A naming rule
/// under one of these would share its dedup key and `[rules.<id>]` table.
fn is_reserved(id: &str) -> bool {
    id == UNRESOLVED_DEFINITION
        || id == AMBIGUOUS_RESOLUTION
        || builtin_checks()
            .iter()
            .any(|check| StructuralCheck::name(check.as_ref()) == id)
}

// ────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────

/// Errors in naming rule construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// Rule id is empty.
    #[error("rule id must not be empty")]
    EmptyRuleId,

    /// Rule id contains invalid characters.
    #[error("invalid rule id `{id}`: must be [a-z0-9-]")]
    InvalidRuleId {
        /// The invalid id.
        id: String,
    },

    /// Two rules share an id.
    #[error("duplicate rule id `{id}`")]
    DuplicateRuleId {
        /// The repeated id.
        id: String,
    },

    /// Rule id belongs to a built-in diagnostic.
    #[error("rule id `{id}` is reserved for a built-in diagnostic")]
    ReservedRuleId {
        /// The reserved id.
        id: String,
    },

    /// `applies_to` is empty.
    #[error("`applies_to` must list at least one kind")]
    EmptyKindSet,

    /// A prefix or suffix shape has an empty string.
    #[error("{shape} must not be empty")]
    EmptyAffix {
        /// Shape name.
        shape: &'static str,
    },

    /// Length bound of zero.
    #[error("{shape} must be greater than zero")]
    ZeroLength {
        /// Shape name.
        shape: &'static str,
    },

    /// Casing name is unknown.
    #[error(
        "unknown casing `{value}`, expected: pascal, camel, snake, screaming-snake, lower-first, upper-first"
    )]
    UnknownCasing {
        /// The invalid value.
        value: String,
    },

    /// Regex does not compile.
    #[error("invalid regex `{pattern}`: {reason}")]
    InvalidRegex {
        /// The invalid pattern.
        pattern: String,
        /// Why it's invalid.
        reason: String,
    },

    /// Message template is empty.
    #[error("message must not be empty")]
    EmptyMessage,

    /// Message template uses an unsupported placeholder.
    #[error("unknown placeholder `{{{placeholder}}}`, expected: {{name}}, {{simple}}, {{kind}}, {{rule}}")]
    UnknownPlaceholder {
        /// The placeholder without braces.
        placeholder: String,
    },

    /// Message template has a `{` without a matching `}`.
    #[error("unclosed placeholder in `{template}`")]
    UnclosedPlaceholder {
        /// The whole template.
        template: String,
    },
}
