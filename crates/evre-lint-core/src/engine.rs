//! Rule engine: evaluates resolved symbols against naming rules.

use crate::naming::{MessageContext, NamingRule, RuleConfiguration};
use crate::resolver::Symbol;
use crate::types::{Suggestion, Violation};
use tracing::trace;

/// Evaluates one symbol against every applicable rule.
///
/// The shape is tested against the simple name. One violation is produced
/// per failing rule, in rule declaration order. Constructors, destructors,
/// operators and anonymous entities are exempt.
#[must_use]
pub fn evaluate(symbol: &Symbol<'_>, config: &RuleConfiguration) -> Vec<Violation> {
    let simple = symbol.simple_name();
    if simple.is_empty() || symbol.is_special_member() {
        return Vec::new();
    }

    config
        .rules_for(symbol.kind())
        .filter(|rule| !rule.shape().matches(simple))
        .map(|rule| violation(symbol, rule))
        .collect()
}

/// Evaluates all symbols in discovery order.
#[must_use]
pub fn evaluate_all(symbols: &[Symbol<'_>], config: &RuleConfiguration) -> Vec<Violation> {
    symbols
        .iter()
        .flat_map(|symbol| evaluate(symbol, config))
        .collect()
}

fn violation(symbol: &Symbol<'_>, rule: &NamingRule) -> Violation {
    let name = symbol.qualified_name().to_string();
    let simple = symbol.simple_name();
    trace!(rule = %rule.id(), symbol = %name, "naming rule failed");

    let message = rule.message().render(&MessageContext {
        name: &name,
        simple,
        kind: symbol.kind(),
        rule: rule.id().as_str(),
    });
    let mut violation = Violation::new(
        rule.id().as_str(),
        rule.severity(),
        symbol.primary().location().clone(),
        message,
    )
    .with_symbol(symbol.key().to_string(), name);

    if let Some(fixed) = rule.shape().suggest(simple) {
        violation = violation.with_suggestion(Suggestion::new(format!(
            "rename `{simple}` to `{fixed}` ({})",
            rule.shape()
        )));
    }
    if let Some(doc) = rule.doc() {
        violation = violation.with_doc_ref(doc);
    }
    violation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DeclKind, Declaration, DeclarationModel, ScopeKind};
    use crate::naming::load_rules_from_toml;
    use crate::resolver::resolve;
    use crate::types::{Location, Severity};

    const RULES: &str = r#"
[[naming]]
id = "class-prefix"
applies_to = ["class"]
shape = { prefix = "C" }
message = "{kind} `{name}` must start with `C`"
doc = "STYLE.md#classes"

[[naming]]
id = "class-length"
applies_to = ["class"]
shape = { max-length = 4 }
message = "`{simple}` is too long"
severity = "warning"

[[naming]]
id = "function-case"
applies_to = ["function"]
shape = { casing = "lower-first" }
message = "function `{name}` must start lowercase"
"#;

    fn model() -> DeclarationModel {
        let mut model = DeclarationModel::new("a.hpp");
        let ns = model
            .add_scope(model.root(), ScopeKind::Namespace, "evre")
            .unwrap();
        let decls = [
            Declaration::new(DeclKind::Class, "Widget", ns, Location::new("a.hpp", 3, 7))
                .definition(),
            Declaration::new(DeclKind::Function, "Run", ns, Location::new("a.hpp", 8, 6)),
            Declaration::new(DeclKind::Function, "stop", ns, Location::new("a.hpp", 9, 6)),
        ];
        for decl in decls {
            model.add_declaration(decl).unwrap();
        }
        let widget = model.add_scope(ns, ScopeKind::Class, "Widget").unwrap();
        model
            .add_declaration(
                Declaration::new(DeclKind::Function, "Widget", widget, Location::new("a.hpp", 4, 5))
                    .special_member(),
            )
            .unwrap();
        model
    }

    #[test]
    fn one_violation_per_failing_rule_in_rule_order() {
        let config = load_rules_from_toml(RULES).unwrap();
        let model = model();
        let resolution = resolve(&model);
        let violations = evaluate(&resolution.symbols[0], &config);

        let rules: Vec<&str> = violations.iter().map(|v| v.rule.as_str()).collect();
        assert_eq!(rules, vec!["class-prefix", "class-length"]);
        assert_eq!(violations[0].message, "class `evre::Widget` must start with `C`");
        assert_eq!(violations[0].qualified_name, "evre::Widget");
        assert_eq!(violations[0].doc_ref.as_deref(), Some("STYLE.md#classes"));
        assert_eq!(
            violations[0].suggestion.as_ref().unwrap().message,
            "rename `Widget` to `CWidget` (prefix `C`)"
        );
        assert_eq!(violations[1].message, "`Widget` is too long");
        assert_eq!(violations[1].severity, Severity::Warning);
        assert!(violations[1].suggestion.is_none());
    }

    #[test]
    fn shape_applies_to_simple_name_only() {
        let config = load_rules_from_toml(
            r#"
[[naming]]
id = "class-prefix"
applies_to = ["class"]
shape = { prefix = "C" }
message = "m"
"#,
        )
        .unwrap();
        let mut model = DeclarationModel::new("a.hpp");
        // the namespace name satisfies the shape, the class name does not
        let ns = model
            .add_scope(model.root(), ScopeKind::Namespace, "Core")
            .unwrap();
        model
            .add_declaration(Declaration::new(
                DeclKind::Class,
                "Widget",
                ns,
                Location::new("a.hpp", 1, 1),
            ))
            .unwrap();
        let resolution = resolve(&model);
        assert_eq!(evaluate(&resolution.symbols[0], &config).len(), 1);
    }

    #[test]
    fn special_members_are_exempt() {
        let config = load_rules_from_toml(RULES).unwrap();
        let model = model();
        let resolution = resolve(&model);
        let ctor = resolution
            .symbols
            .iter()
            .find(|s| s.is_special_member())
            .unwrap();
        assert!(evaluate(ctor, &config).is_empty());
    }

    #[test]
    fn evaluate_all_follows_discovery_order() {
        let config = load_rules_from_toml(RULES).unwrap();
        let model = model();
        let resolution = resolve(&model);
        let violations = evaluate_all(&resolution.symbols, &config);
        let summary: Vec<(&str, &str)> = violations
            .iter()
            .map(|v| (v.qualified_name.as_str(), v.rule.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("evre::Widget", "class-prefix"),
                ("evre::Widget", "class-length"),
                ("evre::Run", "function-case"),
            ]
        );
    }

    #[test]
    fn evaluation_is_deterministic() {
        let config = load_rules_from_toml(RULES).unwrap();
        let model = model();
        let resolution = resolve(&model);
        assert_eq!(
            evaluate_all(&resolution.symbols, &config),
            evaluate_all(&resolution.symbols, &config)
        );
    }
}
