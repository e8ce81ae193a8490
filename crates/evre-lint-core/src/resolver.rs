//! Scope resolution: merges declarations of the same logical entity into
//! symbols.
//!
//! Declarations are visited in source order. Each one is keyed by its
//! qualified name (template segments compared by parameter count and kind)
//! plus its [`KindFamily`]. Out-of-line definitions bind to the first
//! symbol with the same key; in-class declarations either merge or, when
//! they collide with an existing member, open a new candidate.

use crate::model::{DeclKind, Declaration, DeclarationModel, KindFamily, QualifiedName, ScopeKind};
use crate::types::{Label, Severity, Suggestion, Violation};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Rule id of the diagnostic for out-of-line definitions without a declaration.
pub const UNRESOLVED_DEFINITION: &str = "unresolved-definition";

/// Rule id of the diagnostic for definitions matching several declarations.
pub const AMBIGUOUS_RESOLUTION: &str = "ambiguous-resolution";

/// Identity of a logical entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolKey {
    /// Fully qualified name, including template signatures.
    pub name: QualifiedName,
    /// Kind family; a class and a function may share a name.
    pub family: KindFamily,
}

impl fmt::Display for SymbolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.family, self.name.key())
    }
}

/// A resolved logical entity and the declarations that make it up.
#[derive(Debug, Clone)]
pub struct Symbol<'m> {
    key: SymbolKey,
    kind: DeclKind,
    declarations: Vec<&'m Declaration>,
    unresolved: bool,
}

impl<'m> Symbol<'m> {
    fn new(key: SymbolKey, declaration: &'m Declaration, unresolved: bool) -> Self {
        Self {
            key,
            kind: declaration.kind(),
            declarations: vec![declaration],
            unresolved,
        }
    }

    fn push(&mut self, declaration: &'m Declaration) {
        if self.kind == DeclKind::Class && declaration.kind() == DeclKind::TemplateClass {
            self.kind = DeclKind::TemplateClass;
        }
        self.declarations.push(declaration);
    }

    /// Returns the symbol identity.
    #[must_use]
    pub fn key(&self) -> &SymbolKey {
        &self.key
    }

    /// Returns the most specific kind among the constituent declarations.
    #[must_use]
    pub fn kind(&self) -> DeclKind {
        self.kind
    }

    /// Returns the qualified name.
    #[must_use]
    pub fn qualified_name(&self) -> &QualifiedName {
        &self.key.name
    }

    /// Returns the last component of the qualified name.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.key.name.simple_name()
    }

    /// Returns the constituent declarations in source order.
    #[must_use]
    pub fn declarations(&self) -> &[&'m Declaration] {
        &self.declarations
    }

    /// Whether this symbol was opened by an out-of-line definition that had
    /// no matching declaration.
    #[must_use]
    pub fn is_unresolved(&self) -> bool {
        self.unresolved
    }

    /// Whether any constituent is a constructor, destructor or operator.
    #[must_use]
    pub fn is_special_member(&self) -> bool {
        self.declarations.iter().any(|d| d.is_special_member())
    }

    /// The declaration diagnostics are anchored at: the first one that is
    /// not a definition, otherwise the first one.
    #[must_use]
    pub fn primary(&self) -> &'m Declaration {
        self.declarations
            .iter()
            .find(|d| !d.is_definition())
            .copied()
            .unwrap_or(self.declarations[0])
    }
}

/// Output of [`resolve`].
#[derive(Debug, Default)]
pub struct Resolution<'m> {
    /// Symbols in discovery order.
    pub symbols: Vec<Symbol<'m>>,
    /// Unresolved and ambiguous definition diagnostics, in source order.
    pub diagnostics: Vec<Violation>,
}

/// Resolves all declarations of `model` into symbols.
///
/// This is a pure function of the model.
#[must_use]
pub fn resolve(model: &DeclarationModel) -> Resolution<'_> {
    let mut resolution = Resolution::default();
    let mut index: HashMap<SymbolKey, Vec<usize>> = HashMap::new();

    for declaration in model.declarations() {
        let key = SymbolKey {
            name: model.qualified_name(declaration),
            family: declaration.kind().family(),
        };

        if declaration.is_out_of_line() {
            bind_definition(&mut resolution, &mut index, key, declaration);
            continue;
        }

        let member = model
            .scope(declaration.scope())
            .is_some_and(|s| s.kind() == ScopeKind::Class);
        let candidates = index.entry(key.clone()).or_default();
        let target = candidates.iter().copied().find(|&i| {
            !(member
                && resolution.symbols[i]
                    .declarations
                    .iter()
                    .any(|existing| !existing.is_out_of_line() && collides(existing, declaration)))
        });
        match target {
            Some(i) => resolution.symbols[i].push(declaration),
            None => {
                candidates.push(resolution.symbols.len());
                resolution
                    .symbols
                    .push(Symbol::new(key, declaration, false));
            }
        }
    }

    debug!(
        file = %model.file().display(),
        declarations = model.declarations().len(),
        symbols = resolution.symbols.len(),
        diagnostics = resolution.diagnostics.len(),
        "resolved translation unit"
    );
    resolution
}

fn bind_definition<'m>(
    resolution: &mut Resolution<'m>,
    index: &mut HashMap<SymbolKey, Vec<usize>>,
    key: SymbolKey,
    definition: &'m Declaration,
) {
    let candidates = index.entry(key.clone()).or_default();
    let Some(&first) = candidates.first() else {
        resolution.diagnostics.push(unresolved(&key, definition));
        candidates.push(resolution.symbols.len());
        resolution.symbols.push(Symbol::new(key, definition, true));
        return;
    };

    if candidates.len() > 1 {
        let mut diagnostic = Violation::new(
            AMBIGUOUS_RESOLUTION,
            Severity::Warning,
            definition.location().clone(),
            format!(
                "definition of `{}` matches {} declarations; bound to the first",
                key.name,
                candidates.len()
            ),
        )
        // one report per definition site
        .with_symbol(
            format!("{key} @{}", definition.location()),
            key.name.to_string(),
        );
        for &i in candidates.iter() {
            let candidate = resolution.symbols[i].primary();
            diagnostic = diagnostic.with_label(Label::new(
                candidate.location().clone(),
                "candidate declared here",
            ));
        }
        resolution.diagnostics.push(diagnostic);
    }
    resolution.symbols[first].push(definition);
}

fn unresolved(key: &SymbolKey, definition: &Declaration) -> Violation {
    let segments = key.name.segments();
    let owner = QualifiedName::new(segments[..segments.len().saturating_sub(1)].to_vec());
    Violation::new(
        UNRESOLVED_DEFINITION,
        Severity::Error,
        definition.location().clone(),
        format!(
            "out-of-line definition of `{}` has no matching declaration",
            key.name
        ),
    )
    .with_symbol(key.to_string(), key.name.to_string())
    .with_suggestion(Suggestion::new(format!(
        "declare `{}` inside `{owner}`",
        key.name.simple_name()
    )))
}

/// Two in-class declarations of one key that cannot be the same entity.
fn collides(existing: &Declaration, incoming: &Declaration) -> bool {
    match incoming.kind().family() {
        KindFamily::Class => existing.is_definition() && incoming.is_definition(),
        KindFamily::Function => existing.parameter_count() == incoming.parameter_count(),
        KindFamily::Variable => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QualifierSegment, ScopeId, TemplateParam, TemplateParamKind};
    use crate::types::Location;

    fn loc(line: usize) -> Location {
        Location::new("wrong_class.hpp", line, 1)
    }

    struct Fixture {
        model: DeclarationModel,
        evre: ScopeId,
        widget: ScopeId,
    }

    /// `namespace evre { template <typename T> class Widget { void foo(); void bar(); }; }`
    fn fixture() -> Fixture {
        let mut model = DeclarationModel::new("wrong_class.hpp");
        let evre = model
            .add_scope(model.root(), ScopeKind::Namespace, "evre")
            .unwrap();
        let tpl = model
            .add_template_scope(evre, vec![TemplateParam::new("T", TemplateParamKind::Type)])
            .unwrap();
        model
            .add_declaration(
                Declaration::new(DeclKind::TemplateClass, "Widget", tpl, loc(5))
                    .definition()
                    .with_template_params(vec![TemplateParamKind::Type]),
            )
            .unwrap();
        let widget = model.add_scope(tpl, ScopeKind::Class, "Widget").unwrap();
        for (name, line) in [("foo", 9), ("bar", 10)] {
            model
                .add_declaration(
                    Declaration::new(DeclKind::Function, name, widget, loc(line))
                        .with_parameter_count(0),
                )
                .unwrap();
        }
        Fixture {
            model,
            evre,
            widget,
        }
    }

    fn define(fixture: &mut Fixture, name: &str, param: &str, line: usize) {
        let tpl = fixture
            .model
            .add_template_scope(
                fixture.evre,
                vec![TemplateParam::new(param, TemplateParamKind::Type)],
            )
            .unwrap();
        fixture
            .model
            .add_declaration(
                Declaration::new(DeclKind::Function, name, tpl, loc(line))
                    .out_of_line()
                    .with_parameter_count(0)
                    .with_qualifier(
                        vec![
                            QualifierSegment::plain("evre"),
                            QualifierSegment::template("Widget", vec![TemplateParamKind::Type]),
                        ],
                        false,
                    ),
            )
            .unwrap();
    }

    #[test]
    fn out_of_line_definitions_merge_with_members() {
        let mut fixture = fixture();
        define(&mut fixture, "foo", "T", 14);
        define(&mut fixture, "bar", "T", 19);
        let resolution = resolve(&fixture.model);

        assert!(resolution.diagnostics.is_empty());
        let summary: Vec<(String, usize)> = resolution
            .symbols
            .iter()
            .map(|s| (s.key().to_string(), s.declarations().len()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("class evre::Widget<type>".to_string(), 1),
                ("function evre::Widget<type>::foo".to_string(), 2),
                ("function evre::Widget<type>::bar".to_string(), 2),
            ]
        );
    }

    #[test]
    fn parameter_name_does_not_matter() {
        let mut fixture = fixture();
        define(&mut fixture, "foo", "U", 14);
        let resolution = resolve(&fixture.model);
        assert!(resolution.diagnostics.is_empty());
        assert_eq!(resolution.symbols[1].declarations().len(), 2);
    }

    #[test]
    fn primary_prefers_declaration_over_definition() {
        let mut fixture = fixture();
        define(&mut fixture, "foo", "T", 14);
        let resolution = resolve(&fixture.model);
        assert_eq!(resolution.symbols[1].primary().location().line, 9);
        // the class itself only has a definition
        assert_eq!(resolution.symbols[0].primary().location().line, 5);
    }

    #[test]
    fn missing_member_is_unresolved() {
        let mut fixture = fixture();
        define(&mut fixture, "baz", "T", 24);
        define(&mut fixture, "baz", "T", 28);
        let resolution = resolve(&fixture.model);

        assert_eq!(resolution.diagnostics.len(), 1);
        let diagnostic = &resolution.diagnostics[0];
        assert_eq!(diagnostic.rule, UNRESOLVED_DEFINITION);
        assert_eq!(diagnostic.qualified_name, "evre::Widget::baz");
        assert_eq!(diagnostic.location.line, 24);
        assert_eq!(
            diagnostic.suggestion.as_ref().unwrap().message,
            "declare `baz` inside `evre::Widget`"
        );

        let baz = resolution.symbols.last().unwrap();
        assert!(baz.is_unresolved());
        assert_eq!(baz.declarations().len(), 2);
    }

    #[test]
    fn different_template_arity_does_not_bind() {
        let mut fixture = fixture();
        let tpl = fixture
            .model
            .add_template_scope(
                fixture.evre,
                vec![
                    TemplateParam::new("T", TemplateParamKind::Type),
                    TemplateParam::new("N", TemplateParamKind::NonType),
                ],
            )
            .unwrap();
        fixture
            .model
            .add_declaration(
                Declaration::new(DeclKind::Function, "foo", tpl, loc(30))
                    .out_of_line()
                    .with_qualifier(
                        vec![QualifierSegment::template(
                            "Widget",
                            vec![TemplateParamKind::Type, TemplateParamKind::NonType],
                        )],
                        false,
                    ),
            )
            .unwrap();
        let resolution = resolve(&fixture.model);
        assert_eq!(resolution.diagnostics.len(), 1);
        assert_eq!(resolution.diagnostics[0].rule, UNRESOLVED_DEFINITION);
    }

    #[test]
    fn colliding_members_make_definition_ambiguous() {
        let mut fixture = fixture();
        fixture
            .model
            .add_declaration(
                Declaration::new(DeclKind::Function, "foo", fixture.widget, loc(11))
                    .with_parameter_count(0),
            )
            .unwrap();
        define(&mut fixture, "foo", "T", 14);
        let resolution = resolve(&fixture.model);

        assert_eq!(resolution.diagnostics.len(), 1);
        let diagnostic = &resolution.diagnostics[0];
        assert_eq!(diagnostic.rule, AMBIGUOUS_RESOLUTION);
        let lines: Vec<usize> = diagnostic.labels.iter().map(|l| l.location.line).collect();
        assert_eq!(lines, vec![9, 11]);

        let foos: Vec<usize> = resolution
            .symbols
            .iter()
            .filter(|s| s.simple_name() == "foo")
            .map(|s| s.declarations().len())
            .collect();
        assert_eq!(foos, vec![2, 1]);
    }

    #[test]
    fn each_ambiguous_definition_is_reported() {
        let mut fixture = fixture();
        fixture
            .model
            .add_declaration(
                Declaration::new(DeclKind::Function, "foo", fixture.widget, loc(11))
                    .with_parameter_count(0),
            )
            .unwrap();
        define(&mut fixture, "foo", "T", 14);
        define(&mut fixture, "foo", "U", 18);
        let resolution = resolve(&fixture.model);

        let mut collector = crate::collector::DiagnosticCollector::new();
        for diagnostic in resolution.diagnostics {
            collector.insert(diagnostic);
        }
        let lines: Vec<(&str, usize)> = collector
            .finalize()
            .iter()
            .map(|v| (v.rule.as_str(), v.location.line))
            .collect();
        assert_eq!(
            lines,
            vec![(AMBIGUOUS_RESOLUTION, 14), (AMBIGUOUS_RESOLUTION, 18)]
        );
    }

    #[test]
    fn overloads_merge() {
        let mut fixture = fixture();
        fixture
            .model
            .add_declaration(
                Declaration::new(DeclKind::Function, "foo", fixture.widget, loc(11))
                    .with_parameter_count(1),
            )
            .unwrap();
        let resolution = resolve(&fixture.model);
        assert_eq!(resolution.symbols.len(), 3);
        assert_eq!(resolution.symbols[1].declarations().len(), 2);
    }

    #[test]
    fn forward_declared_class_upgrades_to_template() {
        let mut model = DeclarationModel::new("a.hpp");
        let tpl = model
            .add_template_scope(
                model.root(),
                vec![TemplateParam::new("T", TemplateParamKind::Type)],
            )
            .unwrap();
        model
            .add_declaration(
                Declaration::new(DeclKind::Class, "Box", tpl, loc(1))
                    .with_template_params(vec![TemplateParamKind::Type]),
            )
            .unwrap();
        model
            .add_declaration(
                Declaration::new(DeclKind::TemplateClass, "Box", tpl, loc(3))
                    .definition()
                    .with_template_params(vec![TemplateParamKind::Type]),
            )
            .unwrap();
        let resolution = resolve(&model);
        assert_eq!(resolution.symbols.len(), 1);
        assert_eq!(resolution.symbols[0].kind(), DeclKind::TemplateClass);
        assert_eq!(resolution.symbols[0].primary().location().line, 1);
    }

    #[test]
    fn resolution_is_deterministic() {
        let mut fixture = fixture();
        define(&mut fixture, "foo", "T", 14);
        define(&mut fixture, "baz", "T", 24);
        let keys = |r: &Resolution<'_>| -> Vec<String> {
            r.symbols.iter().map(|s| s.key().to_string()).collect()
        };
        let first = resolve(&fixture.model);
        let second = resolve(&fixture.model);
        assert_eq!(keys(&first), keys(&second));
        assert_eq!(first.diagnostics, second.diagnostics);
    }
}
