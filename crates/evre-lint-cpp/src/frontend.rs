//! C++ frontend using Tree-sitter.

use std::path::{Path, PathBuf};

use evre_lint_core::{
    DeclKind, Declaration, DeclarationModel, Frontend, FrontendError, Location, ScopeId,
    ScopeKind, TemplateParam, TemplateParamKind,
};
use tracing::{debug, trace};
use tree_sitter::{Language, Node, Parser};

use crate::syntax::{classify, name_of, template_params, text, Declared, Name};

/// Builds declaration models from C++ source.
///
/// Recognizes namespaces, classes, structs and unions, class and function
/// templates, member and free functions (including out-of-line member
/// definitions) and variables. Function bodies are not entered. Syntax
/// errors are tolerated: whatever the parser recovered is extracted.
pub struct CppFrontend {
    language: Language,
}

impl CppFrontend {
    /// Creates a new C++ frontend.
    #[must_use]
    pub fn new() -> Self {
        Self {
            language: tree_sitter_cpp::LANGUAGE.into(),
        }
    }
}

impl Default for CppFrontend {
    fn default() -> Self {
        Self::new()
    }
}

impl Frontend for CppFrontend {
    fn language_id(&self) -> &'static str {
        "cpp"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["h", "hh", "hpp", "hxx", "cc", "cpp", "cxx", "ipp", "tpp", "inl"]
    }

    fn extract(&self, path: &Path, source: &str) -> Result<DeclarationModel, FrontendError> {
        let failure = |message: String| FrontendError::Parser {
            language: "cpp",
            path: path.display().to_string(),
            message,
        };

        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| failure(e.to_string()))?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| failure("parser produced no tree".to_string()))?;
        let root = tree.root_node();
        if root.has_error() {
            debug!(file = %path.display(), "syntax errors; extracting what was recovered");
        }

        let mut walker = Walker {
            src: source.as_bytes(),
            file: path.to_path_buf(),
            model: DeclarationModel::new(path),
        };
        let scope = walker.model.root();
        walker.items(root, scope)?;
        Ok(walker.model)
    }
}

struct Walker<'s> {
    src: &'s [u8],
    file: PathBuf,
    model: DeclarationModel,
}

impl Walker<'_> {
    fn items(&mut self, node: Node<'_>, scope: ScopeId) -> Result<(), FrontendError> {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.item(child, scope)?;
        }
        Ok(())
    }

    fn item(&mut self, node: Node<'_>, scope: ScopeId) -> Result<(), FrontendError> {
        match node.kind() {
            "namespace_definition" => self.namespace(node, scope),
            "template_declaration" => self.template(node, scope),
            "class_specifier" | "struct_specifier" | "union_specifier" => self.class(node, scope),
            "function_definition" => self.function_definition(node, scope),
            "declaration" | "field_declaration" => self.declaration(node, scope),
            "linkage_specification" => match node.child_by_field_name("body") {
                Some(body) if body.kind() == "declaration_list" => self.items(body, scope),
                Some(body) => self.item(body, scope),
                None => Ok(()),
            },
            "preproc_if" | "preproc_ifdef" | "preproc_else" | "preproc_elif"
            | "preproc_elifdef" | "ERROR" => self.items(node, scope),
            _ => Ok(()),
        }
    }

    fn namespace(&mut self, node: Node<'_>, scope: ScopeId) -> Result<(), FrontendError> {
        let names = match node.child_by_field_name("name") {
            None => vec![String::new()],
            Some(name) if name.kind() == "nested_namespace_specifier" => {
                let mut names = Vec::new();
                collect_identifiers(name, self.src, &mut names);
                names
            }
            Some(name) => vec![text(name, self.src).to_owned()],
        };

        let mut current = scope;
        for name in names {
            current = self.child_scope(current, ScopeKind::Namespace, &name)?;
        }
        match node.child_by_field_name("body") {
            Some(body) => self.items(body, current),
            None => Ok(()),
        }
    }

    fn template(&mut self, node: Node<'_>, scope: ScopeId) -> Result<(), FrontendError> {
        let params = node
            .child_by_field_name("parameters")
            .map(|list| template_params(list, self.src))
            .unwrap_or_default();
        let list = self.model.add_template_scope(scope, params)?;

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if !matches!(child.kind(), "template_parameter_list" | "requires_clause") {
                self.item(child, list)?;
            }
        }
        Ok(())
    }

    fn class(&mut self, node: Node<'_>, scope: ScopeId) -> Result<(), FrontendError> {
        let Some(name_node) = node.child_by_field_name("name") else {
            return Ok(());
        };
        let name_node = match name_node.kind() {
            "type_identifier" => name_node,
            "qualified_identifier" => match name_of(name_node, self.src, &[]) {
                Some(name) if name.qualifier.is_empty() => name.node,
                // `class Outer::Inner { ... }` defines a nested class elsewhere
                _ => return Ok(()),
            },
            _ => {
                trace!(
                    line = name_node.start_position().row + 1,
                    "skipping class template specialization"
                );
                return Ok(());
            }
        };
        let name = text(name_node, self.src).to_owned();
        let body = node.child_by_field_name("body");

        let mut declaration = match self.model.template_params_of(scope) {
            Some(params) => {
                let kinds = params.iter().map(|p| p.kind).collect();
                Declaration::new(DeclKind::TemplateClass, &name, scope, self.location(name_node))
                    .with_template_params(kinds)
            }
            None => Declaration::new(DeclKind::Class, &name, scope, self.location(name_node)),
        };
        if body.is_some() {
            declaration = declaration.definition();
        }
        self.model.add_declaration(declaration)?;

        if let Some(body) = body {
            let class = self.child_scope(scope, ScopeKind::Class, &name)?;
            self.items(body, class)?;
        }
        Ok(())
    }

    fn function_definition(&mut self, node: Node<'_>, scope: ScopeId) -> Result<(), FrontendError> {
        let Some(declarator) = node.child_by_field_name("declarator") else {
            return Ok(());
        };
        let visible = self.visible_params(scope);
        match classify(declarator, self.src, &visible) {
            Some(Declared::Function { name, parameters }) => {
                self.function(name, parameters, scope, true)
            }
            Some(Declared::Variable { name }) => self.variable(name, scope, true),
            None => Ok(()),
        }
    }

    fn declaration(&mut self, node: Node<'_>, scope: ScopeId) -> Result<(), FrontendError> {
        if let Some(ty) = node.child_by_field_name("type") {
            if matches!(
                ty.kind(),
                "class_specifier" | "struct_specifier" | "union_specifier"
            ) {
                self.class(ty, scope)?;
            }
        }

        let defaulted = has_child(node, &["default_method_clause", "delete_method_clause"]);
        let in_class = node.kind() == "field_declaration";
        let external = has_child_text(node, "storage_class_specifier", "extern", self.src);
        let visible = self.visible_params(scope);

        let mut cursor = node.walk();
        let declarators: Vec<Node<'_>> = node
            .children_by_field_name("declarator", &mut cursor)
            .collect();
        for declarator in declarators {
            match classify(declarator, self.src, &visible) {
                Some(Declared::Function { name, parameters }) => {
                    self.function(name, parameters, scope, defaulted)?;
                }
                Some(Declared::Variable { name }) => {
                    self.variable(name, scope, !in_class && !external)?;
                }
                None => {}
            }
        }
        Ok(())
    }

    fn function(
        &mut self,
        name: Name<'_>,
        parameters: Option<usize>,
        scope: ScopeId,
        definition: bool,
    ) -> Result<(), FrontendError> {
        let owner = match name.qualifier.last() {
            Some(segment)
                if segment.template_args.is_none() && self.names_namespace(&segment.name) =>
            {
                None
            }
            Some(segment) => Some(segment.name.clone()),
            None => self.enclosing_class(scope),
        };
        let special = name.special || owner.as_deref() == Some(name.text.as_str());

        let mut declaration = self.declaration_for(DeclKind::Function, &name, scope, definition);
        if let Some(count) = parameters {
            declaration = declaration.with_parameter_count(count);
        }
        if special {
            declaration = declaration.special_member();
        }
        if name.spelled_args {
            declaration = declaration.spelled_template_args();
        }
        self.model.add_declaration(declaration)?;
        Ok(())
    }

    fn variable(&mut self, name: Name<'_>, scope: ScopeId, definition: bool) -> Result<(), FrontendError> {
        let declaration = self.declaration_for(DeclKind::Variable, &name, scope, definition);
        self.model.add_declaration(declaration)?;
        Ok(())
    }

    /// Builds the declaration common to functions and variables: position,
    /// qualifier, definition flag and the entity's own template parameters.
    fn declaration_for(
        &self,
        kind: DeclKind,
        name: &Name<'_>,
        scope: ScopeId,
        definition: bool,
    ) -> Declaration {
        let mut declaration = Declaration::new(kind, &name.text, scope, self.location(name.node));
        let own = self.own_template_params(name, scope);
        if !own.is_empty() {
            declaration = declaration.with_template_params(own);
        }
        if name.qualifier.is_empty() && !name.global {
            if definition {
                declaration = declaration.definition();
            }
        } else {
            declaration = declaration
                .out_of_line()
                .with_qualifier(name.qualifier.clone(), name.global);
        }
        declaration
    }

    /// Template parameter lists wrapping a declaration belong first to the
    /// templated segments of its qualifier; one list left over is its own.
    fn own_template_params(&self, name: &Name<'_>, scope: ScopeId) -> Vec<TemplateParamKind> {
        let lists = self
            .model
            .ancestors(scope)
            .take_while(|(_, s)| s.kind() == ScopeKind::TemplateParamList)
            .count();
        let templated = name
            .qualifier
            .iter()
            .filter(|q| q.template_args.is_some())
            .count();
        if lists <= templated {
            return Vec::new();
        }
        self.model
            .template_params_of(scope)
            .map(|params| params.iter().map(|p| p.kind).collect())
            .unwrap_or_default()
    }

    /// Template parameters visible at `scope`, outermost first.
    fn visible_params(&self, scope: ScopeId) -> Vec<TemplateParam> {
        let mut lists: Vec<&[TemplateParam]> = self
            .model
            .ancestors(scope)
            .map(|(_, s)| s.params())
            .collect();
        lists.reverse();
        lists.into_iter().flatten().cloned().collect()
    }

    fn enclosing_class(&self, scope: ScopeId) -> Option<String> {
        self.model
            .ancestors(scope)
            .map(|(_, s)| s)
            .find(|s| s.kind() != ScopeKind::TemplateParamList)
            .filter(|s| s.kind() == ScopeKind::Class)
            .map(|s| s.name().to_owned())
    }

    /// True when `name` is only known as a namespace in this unit. Unknown
    /// names are assumed to be classes declared elsewhere.
    fn names_namespace(&self, name: &str) -> bool {
        let mut namespace = false;
        for scope in self.model.scopes().iter().filter(|s| s.name() == name) {
            match scope.kind() {
                ScopeKind::Class => return false,
                ScopeKind::Namespace => namespace = true,
                ScopeKind::Function | ScopeKind::TemplateParamList => {}
            }
        }
        namespace
    }

    fn child_scope(
        &mut self,
        parent: ScopeId,
        kind: ScopeKind,
        name: &str,
    ) -> Result<ScopeId, FrontendError> {
        match self.model.find_child(parent, kind, name) {
            Some(existing) => Ok(existing),
            None => Ok(self.model.add_scope(parent, kind, name)?),
        }
    }

    fn location(&self, node: Node<'_>) -> Location {
        let start = node.start_position();
        Location::new(&self.file, start.row + 1, start.column + 1)
            .with_span(node.start_byte(), node.end_byte() - node.start_byte())
    }
}

fn collect_identifiers(node: Node<'_>, src: &[u8], out: &mut Vec<String>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "namespace_identifier" {
            out.push(text(child, src).to_owned());
        } else {
            collect_identifiers(child, src, out);
        }
    }
}

fn has_child(node: Node<'_>, kinds: &[&str]) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|child| kinds.contains(&child.kind()));
    found
}

fn has_child_text(node: Node<'_>, kind: &str, value: &str, src: &[u8]) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|child| child.kind() == kind && text(child, src) == value);
    found
}
