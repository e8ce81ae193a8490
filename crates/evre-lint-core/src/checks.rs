//! Structural checks over single declarations.
//!
//! Naming rules look at a symbol's name; structural checks look at how a
//! declaration is spelled. They run once per declaration, after resolution.

use crate::model::{DeclKind, Declaration, DeclarationModel, QualifiedName, ScopeKind};
use crate::types::{Severity, Suggestion, Violation};

/// A built-in check that inspects one declaration in its model.
///
/// # Example
///
/// ```
/// use evre_lint_core::checks::StructuralCheck;
/// use evre_lint_core::{Declaration, DeclarationModel, Violation};
///
/// struct NoGlobals;
///
/// impl StructuralCheck for NoGlobals {
///     fn name(&self) -> &'static str { "no-globals" }
///
///     fn check(&self, model: &DeclarationModel, decl: &Declaration) -> Option<Violation> {
///         (decl.scope() == model.root()).then(|| {
///             Violation::new(self.name(), self.default_severity(), decl.location().clone(), "global")
///         })
///     }
/// }
/// ```
pub trait StructuralCheck: Send + Sync {
    /// Returns the kebab-case name of this check.
    fn name(&self) -> &'static str;

    /// Returns a brief description of what this check looks for.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for violations from this check.
    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    /// Checks a single declaration.
    fn check(&self, model: &DeclarationModel, decl: &Declaration) -> Option<Violation>;
}

/// Type alias for boxed `StructuralCheck` trait objects.
pub type CheckBox = Box<dyn StructuralCheck>;

/// All built-in checks, in a stable order.
#[must_use]
pub fn builtin_checks() -> Vec<CheckBox> {
    vec![Box::new(RedundantQualifier), Box::new(RedundantTemplateArgs)]
}

/// A qualifier that restates an enclosing namespace, such as
/// `void evre::Widget<T>::foo()` written inside `namespace evre`.
pub struct RedundantQualifier;

impl StructuralCheck for RedundantQualifier {
    fn name(&self) -> &'static str {
        "redundant-qualifier"
    }

    fn description(&self) -> &'static str {
        "Qualifier repeats an enclosing namespace"
    }

    fn check(&self, model: &DeclarationModel, decl: &Declaration) -> Option<Violation> {
        let anchor = model.anchor_qualifier(decl);
        if anchor.redundant.is_empty() {
            return None;
        }
        let namespace = anchor.redundant.join("::");
        let redundant = format!("{namespace}::");
        let name = model.qualified_name(decl);
        Some(
            Violation::new(
                self.name(),
                self.default_severity(),
                decl.location().clone(),
                format!("qualifier `{redundant}` is redundant inside namespace `{namespace}`"),
            )
            .with_symbol(format!("{} @{}", name.key(), decl.location()), name.to_string())
            .with_suggestion(Suggestion::new(format!("remove `{redundant}`"))),
        )
    }
}

/// A class template constructor spelled with template arguments, such as
/// `Widget<T>() = default;` inside `Widget`'s body.
pub struct RedundantTemplateArgs;

impl StructuralCheck for RedundantTemplateArgs {
    fn name(&self) -> &'static str {
        "redundant-template-args"
    }

    fn description(&self) -> &'static str {
        "Constructor of a class template repeats the template arguments"
    }

    fn check(&self, model: &DeclarationModel, decl: &Declaration) -> Option<Violation> {
        if decl.kind() != DeclKind::Function || !decl.has_spelled_template_args() {
            return None;
        }
        let class = model.scope(decl.scope())?;
        let in_template = class.kind() == ScopeKind::Class
            && class
                .parent()
                .and_then(|p| model.scope(p))
                .is_some_and(|p| p.kind() == ScopeKind::TemplateParamList);
        if !in_template || class.name() != decl.name() {
            return None;
        }
        let name = model.qualified_name(decl);
        Some(
            Violation::new(
                self.name(),
                self.default_severity(),
                decl.location().clone(),
                format!(
                    "constructor of `{}` does not need template arguments",
                    QualifiedName::new(model.scope_path(decl.scope()))
                ),
            )
            .with_symbol(format!("{} @{}", name.key(), decl.location()), name.to_string())
            .with_suggestion(Suggestion::new(format!(
                "write `{}(...)` inside the class body",
                decl.name()
            ))),
        )
    }
}
