//! Declaration model for one translation unit.
//!
//! Scopes are stored in an arena and addressed by [`ScopeId`]; every scope
//! record keeps the handle of its parent, so the tree can be walked upwards
//! without reference cycles. Declarations point at their enclosing scope by
//! handle as well.
//!
//! ```text
//! namespace evre                    Scope(Namespace "evre")
//! template <typename T>               Scope(TemplateParamList [type T])
//! class Widget {                        Scope(Class "Widget")
//!     void foo();                         Declaration(Function "foo")
//! };
//! ```

use crate::types::Location;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Handle of a scope inside a [`DeclarationModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeId(usize);

impl ScopeId {
    /// Returns the arena index of this scope.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Handle of a declaration inside a [`DeclarationModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeclId(usize);

impl DeclId {
    /// Returns the index of this declaration in source order.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Kind of a naming scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScopeKind {
    /// `namespace foo { ... }` (the translation unit root is an anonymous namespace).
    Namespace,
    /// `class Foo { ... }` / `struct Foo { ... }`
    Class,
    /// A function body.
    Function,
    /// `template <...>` prefix wrapping the entity it parameterizes.
    TemplateParamList,
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Namespace => write!(f, "namespace"),
            Self::Class => write!(f, "class"),
            Self::Function => write!(f, "function"),
            Self::TemplateParamList => write!(f, "template parameter list"),
        }
    }
}

/// Kind of a single template parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateParamKind {
    /// `typename T` / `class T`
    Type,
    /// `int N`
    NonType,
    /// `template <typename> class C`
    Template,
}

impl fmt::Display for TemplateParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type => write!(f, "type"),
            Self::NonType => write!(f, "value"),
            Self::Template => write!(f, "template"),
        }
    }
}

/// A named template parameter as declared in a parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateParam {
    /// Parameter identifier (may be empty for unnamed parameters).
    pub name: String,
    /// Parameter kind.
    pub kind: TemplateParamKind,
}

impl TemplateParam {
    /// Creates a new template parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: TemplateParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// A node in the scope tree.
#[derive(Debug, Clone)]
pub struct Scope {
    kind: ScopeKind,
    name: String,
    parent: Option<ScopeId>,
    children: Vec<ScopeId>,
    params: Vec<TemplateParam>,
}

impl Scope {
    /// Returns the scope kind.
    #[must_use]
    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    /// Returns the scope name (empty for anonymous scopes).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the parent scope, `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    /// Returns the child scopes in insertion order.
    #[must_use]
    pub fn children(&self) -> &[ScopeId] {
        &self.children
    }

    /// Returns the template parameters of a `TemplateParamList` scope.
    #[must_use]
    pub fn params(&self) -> &[TemplateParam] {
        &self.params
    }

    /// Returns the parameter kinds of a `TemplateParamList` scope.
    #[must_use]
    pub fn signature(&self) -> TemplateSignature {
        TemplateSignature::new(self.params.iter().map(|p| p.kind).collect())
    }
}

/// Kind of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeclKind {
    /// `class Foo` / `struct Foo`
    Class,
    /// `template <...> class Foo`
    TemplateClass,
    /// Free or member function.
    Function,
    /// Free, static or member variable.
    Variable,
}

impl DeclKind {
    /// All kinds, in a stable order.
    pub const ALL: [Self; 4] = [
        Self::Class,
        Self::TemplateClass,
        Self::Function,
        Self::Variable,
    ];

    /// Parses the configuration spelling of a kind.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "class" => Some(Self::Class),
            "template-class" => Some(Self::TemplateClass),
            "function" => Some(Self::Function),
            "variable" => Some(Self::Variable),
            _ => None,
        }
    }

    /// Returns the family used to decide whether two declarations may merge.
    #[must_use]
    pub fn family(self) -> KindFamily {
        match self {
            Self::Class | Self::TemplateClass => KindFamily::Class,
            Self::Function => KindFamily::Function,
            Self::Variable => KindFamily::Variable,
        }
    }

    /// Returns the configuration spelling of this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::TemplateClass => "template-class",
            Self::Function => "function",
            Self::Variable => "variable",
        }
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class => write!(f, "class"),
            Self::TemplateClass => write!(f, "class template"),
            Self::Function => write!(f, "function"),
            Self::Variable => write!(f, "variable"),
        }
    }
}

/// Compatibility class of declaration kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KindFamily {
    /// Classes and class templates.
    Class,
    /// Functions.
    Function,
    /// Variables.
    Variable,
}

impl fmt::Display for KindFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class => write!(f, "class"),
            Self::Function => write!(f, "function"),
            Self::Variable => write!(f, "variable"),
        }
    }
}

/// Template parameter kinds of a templated name, compared by count and kind.
///
/// Parameter identifiers are deliberately absent: `Widget<T>` and
/// `Widget<U>` have equal signatures.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TemplateSignature(Vec<TemplateParamKind>);

impl TemplateSignature {
    /// Creates a signature from parameter kinds.
    #[must_use]
    pub fn new(kinds: Vec<TemplateParamKind>) -> Self {
        Self(kinds)
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.0.len()
    }

    /// Returns the parameter kinds.
    #[must_use]
    pub fn kinds(&self) -> &[TemplateParamKind] {
        &self.0
    }
}

impl fmt::Display for TemplateSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "<{}>", kinds.join(", "))
    }
}

/// One component of a qualified name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PathSegment {
    /// Component name (empty for anonymous namespaces).
    pub name: String,
    /// Template signature when the component is a template.
    pub signature: Option<TemplateSignature>,
}

impl PathSegment {
    /// A plain, non-template segment.
    #[must_use]
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signature: None,
        }
    }

    /// A template segment.
    #[must_use]
    pub fn template(name: impl Into<String>, signature: TemplateSignature) -> Self {
        Self {
            name: name.into(),
            signature: Some(signature),
        }
    }

    fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "(anonymous)"
        } else {
            &self.name
        }
    }
}

/// A fully qualified name: enclosing scopes plus the entity's own name.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QualifiedName {
    segments: Vec<PathSegment>,
}

impl QualifiedName {
    /// Creates a qualified name from segments.
    #[must_use]
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    /// Returns all segments.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Returns the last component's name.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.segments.last().map_or("", |s| s.name.as_str())
    }

    /// Renders the name including template signatures, e.g.
    /// `evre::Widget<type>::foo`. Two names with equal keys denote the same
    /// entity.
    #[must_use]
    pub fn key(&self) -> String {
        self.segments
            .iter()
            .map(|s| match &s.signature {
                Some(sig) => format!("{}{sig}", s.display_name()),
                None => s.display_name().to_string(),
            })
            .collect::<Vec<_>>()
            .join("::")
    }
}

/// Renders the name without template signatures, e.g. `evre::Widget::foo`.
impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.segments.iter().map(PathSegment::display_name).collect();
        write!(f, "{}", names.join("::"))
    }
}

/// One component of a qualifier as written in source (`Widget<T>` in
/// `evre::Widget<T>::foo`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifierSegment {
    /// Component name.
    pub name: String,
    /// Kinds of the written template arguments, if any were written.
    pub template_args: Option<Vec<TemplateParamKind>>,
}

impl QualifierSegment {
    /// A qualifier component without template arguments.
    #[must_use]
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template_args: None,
        }
    }

    /// A qualifier component with template arguments.
    #[must_use]
    pub fn template(name: impl Into<String>, args: Vec<TemplateParamKind>) -> Self {
        Self {
            name: name.into(),
            template_args: Some(args),
        }
    }

    fn to_path_segment(&self) -> PathSegment {
        PathSegment {
            name: self.name.clone(),
            signature: self.template_args.clone().map(TemplateSignature::new),
        }
    }
}

/// A single syntactic occurrence of a named entity.
#[derive(Debug, Clone)]
pub struct Declaration {
    kind: DeclKind,
    name: String,
    scope: ScopeId,
    location: Location,
    is_definition: bool,
    out_of_line: bool,
    qualifier: Vec<QualifierSegment>,
    global_qualifier: bool,
    template_params: Vec<TemplateParamKind>,
    parameter_count: Option<usize>,
    special_member: bool,
    spelled_template_args: bool,
}

impl Declaration {
    /// Creates a new declaration of `name` inside `scope`.
    #[must_use]
    pub fn new(kind: DeclKind, name: impl Into<String>, scope: ScopeId, location: Location) -> Self {
        Self {
            kind,
            name: name.into(),
            scope,
            location,
            is_definition: false,
            out_of_line: false,
            qualifier: Vec::new(),
            global_qualifier: false,
            template_params: Vec::new(),
            parameter_count: None,
            special_member: false,
            spelled_template_args: false,
        }
    }

    /// Marks this declaration as a definition (it supplies a body or value).
    #[must_use]
    pub fn definition(mut self) -> Self {
        self.is_definition = true;
        self
    }

    /// Marks this declaration as an out-of-line member definition.
    #[must_use]
    pub fn out_of_line(mut self) -> Self {
        self.is_definition = true;
        self.out_of_line = true;
        self
    }

    /// Sets the qualifier as written in source.
    #[must_use]
    pub fn with_qualifier(mut self, qualifier: Vec<QualifierSegment>, global: bool) -> Self {
        self.qualifier = qualifier;
        self.global_qualifier = global;
        self
    }

    /// Sets the entity's own template parameter kinds.
    #[must_use]
    pub fn with_template_params(mut self, params: Vec<TemplateParamKind>) -> Self {
        self.template_params = params;
        self
    }

    /// Sets the number of function parameters.
    #[must_use]
    pub fn with_parameter_count(mut self, count: usize) -> Self {
        self.parameter_count = Some(count);
        self
    }

    /// Marks a constructor, destructor or operator.
    #[must_use]
    pub fn special_member(mut self) -> Self {
        self.special_member = true;
        self
    }

    /// Records that the declarator spelled template arguments on its own
    /// name (`Widget<T>()`).
    #[must_use]
    pub fn spelled_template_args(mut self) -> Self {
        self.spelled_template_args = true;
        self
    }

    /// Returns the declaration kind.
    #[must_use]
    pub fn kind(&self) -> DeclKind {
        self.kind
    }

    /// Returns the simple (unqualified) name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the lexically enclosing scope.
    #[must_use]
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    /// Returns the source location of the declared name.
    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Whether this declaration supplies a body or value.
    #[must_use]
    pub fn is_definition(&self) -> bool {
        self.is_definition
    }

    /// Whether this is a member definition outside its class body.
    #[must_use]
    pub fn is_out_of_line(&self) -> bool {
        self.out_of_line
    }

    /// Returns the written qualifier.
    #[must_use]
    pub fn qualifier(&self) -> &[QualifierSegment] {
        &self.qualifier
    }

    /// Whether the qualifier started with `::`.
    #[must_use]
    pub fn has_global_qualifier(&self) -> bool {
        self.global_qualifier
    }

    /// Returns the entity's own template parameter kinds.
    #[must_use]
    pub fn template_params(&self) -> &[TemplateParamKind] {
        &self.template_params
    }

    /// Returns the number of function parameters, if known.
    #[must_use]
    pub fn parameter_count(&self) -> Option<usize> {
        self.parameter_count
    }

    /// Whether this is a constructor, destructor or operator.
    #[must_use]
    pub fn is_special_member(&self) -> bool {
        self.special_member
    }

    /// Whether the declarator spelled template arguments on its own name.
    #[must_use]
    pub fn has_spelled_template_args(&self) -> bool {
        self.spelled_template_args
    }
}

/// Result of anchoring a written qualifier against the lexical scope chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifierAnchor {
    /// Canonical path of the entity's enclosing scopes.
    pub path: Vec<PathSegment>,
    /// Leading qualifier components that restate enclosing namespaces.
    pub redundant: Vec<String>,
}

/// Errors in declaration model construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// A scope handle does not belong to this model.
    #[error("unknown scope handle #{0}")]
    UnknownScope(usize),

    /// A declaration or path record used an unknown kind.
    #[error("{context}: unknown kind `{value}`")]
    UnknownKind {
        /// Where the kind was found.
        context: String,
        /// The invalid value.
        value: String,
    },
}

/// Owns all scopes and declarations of one translation unit.
#[derive(Debug, Clone)]
pub struct DeclarationModel {
    file: PathBuf,
    scopes: Vec<Scope>,
    declarations: Vec<Declaration>,
}

impl DeclarationModel {
    /// Creates an empty model containing only the root scope.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            scopes: vec![Scope {
                kind: ScopeKind::Namespace,
                name: String::new(),
                parent: None,
                children: Vec::new(),
                params: Vec::new(),
            }],
            declarations: Vec::new(),
        }
    }

    /// Returns the file this model was built from.
    #[must_use]
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Returns the root scope handle.
    #[must_use]
    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Returns a scope by handle.
    #[must_use]
    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.0)
    }

    /// Returns all scopes in insertion order (the root first).
    #[must_use]
    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    /// Returns all declarations in source order.
    #[must_use]
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    /// Returns a declaration by handle.
    #[must_use]
    pub fn declaration(&self, id: DeclId) -> Option<&Declaration> {
        self.declarations.get(id.0)
    }

    /// Adds a named scope under `parent`.
    ///
    /// # Errors
    ///
    /// Returns an error if `parent` is not a scope of this model.
    pub fn add_scope(
        &mut self,
        parent: ScopeId,
        kind: ScopeKind,
        name: impl Into<String>,
    ) -> Result<ScopeId, ModelError> {
        self.push_scope(parent, kind, name.into(), Vec::new())
    }

    /// Adds an anonymous template parameter list scope under `parent`.
    ///
    /// # Errors
    ///
    /// Returns an error if `parent` is not a scope of this model.
    pub fn add_template_scope(
        &mut self,
        parent: ScopeId,
        params: Vec<TemplateParam>,
    ) -> Result<ScopeId, ModelError> {
        self.push_scope(parent, ScopeKind::TemplateParamList, String::new(), params)
    }

    fn push_scope(
        &mut self,
        parent: ScopeId,
        kind: ScopeKind,
        name: String,
        params: Vec<TemplateParam>,
    ) -> Result<ScopeId, ModelError> {
        let id = ScopeId(self.scopes.len());
        self.scopes
            .get_mut(parent.0)
            .ok_or(ModelError::UnknownScope(parent.0))?
            .children
            .push(id);
        self.scopes.push(Scope {
            kind,
            name,
            parent: Some(parent),
            children: Vec::new(),
            params,
        });
        Ok(id)
    }

    /// Finds a direct child scope by kind and name.
    #[must_use]
    pub fn find_child(&self, parent: ScopeId, kind: ScopeKind, name: &str) -> Option<ScopeId> {
        self.scope(parent)?
            .children
            .iter()
            .copied()
            .find(|&c| self.scopes[c.0].kind == kind && self.scopes[c.0].name == name)
    }

    /// Adds a declaration and returns its handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the declaration's scope is not part of this model.
    pub fn add_declaration(&mut self, declaration: Declaration) -> Result<DeclId, ModelError> {
        if self.scope(declaration.scope).is_none() {
            return Err(ModelError::UnknownScope(declaration.scope.0));
        }
        let id = DeclId(self.declarations.len());
        self.declarations.push(declaration);
        Ok(id)
    }

    /// Iterates from `scope` up to the root, inclusive.
    pub fn ancestors(&self, scope: ScopeId) -> impl Iterator<Item = (ScopeId, &Scope)> + '_ {
        let mut next = self.scope(scope).map(|s| (scope, s));
        std::iter::from_fn(move || {
            let current = next?;
            next = current
                .1
                .parent
                .and_then(|p| self.scope(p).map(|s| (p, s)));
            Some(current)
        })
    }

    /// Returns the innermost enclosing template parameter list, if `scope`
    /// is one or sits directly inside one.
    #[must_use]
    pub fn template_params_of(&self, scope: ScopeId) -> Option<&[TemplateParam]> {
        self.scope(scope)
            .filter(|s| s.kind == ScopeKind::TemplateParamList)
            .map(Scope::params)
    }

    /// Computes the named path of a scope, outermost first.
    ///
    /// The root and template parameter lists contribute no component; a
    /// class wrapped in a template parameter list carries that list's
    /// signature.
    #[must_use]
    pub fn scope_path(&self, scope: ScopeId) -> Vec<PathSegment> {
        self.named_path(scope)
            .into_iter()
            .map(|(_, segment)| segment)
            .collect()
    }

    fn named_path(&self, scope: ScopeId) -> Vec<(ScopeKind, PathSegment)> {
        let mut path = Vec::new();
        for (_, s) in self.ancestors(scope) {
            if s.parent.is_none() || s.kind == ScopeKind::TemplateParamList {
                continue;
            }
            let signature = s
                .parent
                .and_then(|p| self.scope(p))
                .filter(|p| p.kind == ScopeKind::TemplateParamList && s.kind == ScopeKind::Class)
                .map(Scope::signature);
            path.push((
                s.kind,
                PathSegment {
                    name: s.name.clone(),
                    signature,
                },
            ));
        }
        path.reverse();
        path
    }

    /// Anchors a declaration's written qualifier against its lexical scopes.
    ///
    /// A qualifier is anchored at the innermost enclosing scope whose name
    /// equals the qualifier's first component; otherwise it is appended to
    /// the lexical path. A leading `::` anchors at the root.
    #[must_use]
    pub fn anchor_qualifier(&self, declaration: &Declaration) -> QualifierAnchor {
        let lexical = self.named_path(declaration.scope);
        let qualifier = &declaration.qualifier;
        let written: Vec<PathSegment> = qualifier
            .iter()
            .map(QualifierSegment::to_path_segment)
            .collect();

        let Some(first) = qualifier.first() else {
            return QualifierAnchor {
                path: lexical.into_iter().map(|(_, s)| s).collect(),
                redundant: Vec::new(),
            };
        };

        if declaration.global_qualifier {
            return QualifierAnchor {
                path: written,
                redundant: Vec::new(),
            };
        }

        let anchor = (0..lexical.len())
            .rev()
            .find(|&i| lexical[i].1.name == first.name);

        match anchor {
            Some(i) => {
                let redundant = qualifier
                    .iter()
                    .zip(&lexical[i..])
                    .take_while(|(q, (kind, s))| {
                        *kind == ScopeKind::Namespace && q.name == s.name && q.template_args.is_none()
                    })
                    .map(|(q, _)| q.name.clone())
                    .collect();
                let mut path: Vec<PathSegment> =
                    lexical[..i].iter().map(|(_, s)| s.clone()).collect();
                path.extend(written);
                QualifierAnchor { path, redundant }
            }
            None => {
                let mut path: Vec<PathSegment> =
                    lexical.into_iter().map(|(_, s)| s).collect();
                path.extend(written);
                QualifierAnchor {
                    path,
                    redundant: Vec::new(),
                }
            }
        }
    }

    /// Computes the fully qualified name of a declaration.
    #[must_use]
    pub fn qualified_name(&self, declaration: &Declaration) -> QualifiedName {
        let mut segments = self.anchor_qualifier(declaration).path;
        let signature = (!declaration.template_params.is_empty())
            .then(|| TemplateSignature::new(declaration.template_params.clone()));
        segments.push(PathSegment {
            name: declaration.name.clone(),
            signature,
        });
        QualifiedName::new(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(line: usize) -> Location {
        Location::new("wrong_class.hpp", line, 1)
    }

    /// Builds the `namespace evre { template <typename T> class Widget }`
    /// skeleton and returns `(model, evre, template_list, widget)`.
    fn widget_model() -> (DeclarationModel, ScopeId, ScopeId, ScopeId) {
        let mut model = DeclarationModel::new("wrong_class.hpp");
        let evre = model
            .add_scope(model.root(), ScopeKind::Namespace, "evre")
            .unwrap();
        let tpl = model
            .add_template_scope(evre, vec![TemplateParam::new("T", TemplateParamKind::Type)])
            .unwrap();
        let widget = model.add_scope(tpl, ScopeKind::Class, "Widget").unwrap();
        (model, evre, tpl, widget)
    }

    #[test]
    fn root_has_no_parent() {
        let model = DeclarationModel::new("a.hpp");
        assert!(model.scope(model.root()).unwrap().parent().is_none());
        assert!(model.declarations().is_empty());
    }

    #[test]
    fn add_scope_links_parent_and_child() {
        let (model, evre, tpl, widget) = widget_model();
        assert_eq!(model.scope(widget).unwrap().parent(), Some(tpl));
        assert_eq!(model.scope(evre).unwrap().children(), &[tpl]);
        assert_eq!(model.find_child(tpl, ScopeKind::Class, "Widget"), Some(widget));
    }

    #[test]
    fn add_scope_rejects_unknown_parent() {
        let mut model = DeclarationModel::new("a.hpp");
        let result = model.add_scope(ScopeId(42), ScopeKind::Namespace, "x");
        assert_eq!(result, Err(ModelError::UnknownScope(42)));
    }

    #[test]
    fn add_declaration_rejects_unknown_scope() {
        let mut model = DeclarationModel::new("a.hpp");
        let decl = Declaration::new(DeclKind::Function, "f", ScopeId(9), loc(1));
        assert!(matches!(
            model.add_declaration(decl),
            Err(ModelError::UnknownScope(9))
        ));
    }

    #[test]
    fn ancestors_walk_to_root() {
        let (model, evre, tpl, widget) = widget_model();
        let chain: Vec<ScopeId> = model.ancestors(widget).map(|(id, _)| id).collect();
        assert_eq!(chain, vec![widget, tpl, evre, model.root()]);
    }

    #[test]
    fn scope_path_carries_template_signature() {
        let (model, _, _, widget) = widget_model();
        let path = QualifiedName::new(model.scope_path(widget));
        assert_eq!(path.to_string(), "evre::Widget");
        assert_eq!(path.key(), "evre::Widget<type>");
    }

    #[test]
    fn member_and_out_of_line_definition_share_qualified_name() {
        let (mut model, _, tpl, widget) = widget_model();
        let member = Declaration::new(DeclKind::Function, "foo", widget, loc(9));
        // template <typename U> void evre::Widget<U>::foo() {}
        let outer = model
            .add_template_scope(
                model.find_child(model.root(), ScopeKind::Namespace, "evre").unwrap(),
                vec![TemplateParam::new("U", TemplateParamKind::Type)],
            )
            .unwrap();
        let definition = Declaration::new(DeclKind::Function, "foo", outer, loc(15))
            .out_of_line()
            .with_qualifier(
                vec![
                    QualifierSegment::plain("evre"),
                    QualifierSegment::template("Widget", vec![TemplateParamKind::Type]),
                ],
                false,
            );

        assert_ne!(tpl, outer);
        assert_eq!(
            model.qualified_name(&member),
            model.qualified_name(&definition)
        );
        assert_eq!(
            model.qualified_name(&definition).key(),
            "evre::Widget<type>::foo"
        );
    }

    #[test]
    fn anchor_reports_redundant_namespace() {
        let (model, evre, _, _) = widget_model();
        let definition = Declaration::new(DeclKind::Function, "foo", evre, loc(15))
            .out_of_line()
            .with_qualifier(
                vec![
                    QualifierSegment::plain("evre"),
                    QualifierSegment::template("Widget", vec![TemplateParamKind::Type]),
                ],
                false,
            );
        let anchor = model.anchor_qualifier(&definition);
        assert_eq!(anchor.redundant, vec!["evre".to_string()]);
    }

    #[test]
    fn unanchored_qualifier_is_appended() {
        let (model, evre, _, _) = widget_model();
        let definition = Declaration::new(DeclKind::Function, "run", evre, loc(3))
            .out_of_line()
            .with_qualifier(vec![QualifierSegment::plain("Engine")], false);
        let anchor = model.anchor_qualifier(&definition);
        assert!(anchor.redundant.is_empty());
        assert_eq!(
            model.qualified_name(&definition).to_string(),
            "evre::Engine::run"
        );
    }

    #[test]
    fn global_qualifier_anchors_at_root() {
        let (model, evre, _, _) = widget_model();
        let definition = Declaration::new(DeclKind::Function, "run", evre, loc(3))
            .out_of_line()
            .with_qualifier(vec![QualifierSegment::plain("Engine")], true);
        assert_eq!(model.qualified_name(&definition).to_string(), "Engine::run");
    }

    #[test]
    fn template_class_declaration_gets_own_signature() {
        let (model, _, tpl, _) = widget_model();
        let class = Declaration::new(DeclKind::TemplateClass, "Widget", tpl, loc(5))
            .definition()
            .with_template_params(vec![TemplateParamKind::Type]);
        assert_eq!(model.qualified_name(&class).key(), "evre::Widget<type>");
    }

    #[test]
    fn anonymous_segments_render_placeholder() {
        let mut model = DeclarationModel::new("a.cpp");
        let anon = model
            .add_scope(model.root(), ScopeKind::Namespace, "")
            .unwrap();
        let decl = Declaration::new(DeclKind::Variable, "counter", anon, loc(2));
        assert_eq!(
            model.qualified_name(&decl).to_string(),
            "(anonymous)::counter"
        );
    }
}
