//! Readers for C++ declarator, qualifier and template syntax.
//!
//! tree-sitter-cpp nests the declared name inside layers of pointer,
//! reference, array and init declarators; these helpers peel the layers and
//! report what the declarator names.

use evre_lint_core::{QualifierSegment, TemplateParam, TemplateParamKind};
use tree_sitter::Node;

pub(crate) fn text<'s>(node: Node<'_>, src: &'s [u8]) -> &'s str {
    node.utf8_text(src).unwrap_or("")
}

/// A declared name with the qualification written in front of it.
#[derive(Debug)]
pub(crate) struct Name<'t> {
    /// Node used for the reported position.
    pub node: Node<'t>,
    pub text: String,
    pub qualifier: Vec<QualifierSegment>,
    pub global: bool,
    /// `Widget<T>` rather than `Widget`.
    pub spelled_args: bool,
    /// Destructor or operator name.
    pub special: bool,
}

impl<'t> Name<'t> {
    fn plain(node: Node<'t>, src: &[u8]) -> Self {
        Self {
            node,
            text: text(node, src).to_owned(),
            qualifier: Vec::new(),
            global: false,
            spelled_args: false,
            special: false,
        }
    }
}

/// What a declarator declares.
#[derive(Debug)]
pub(crate) enum Declared<'t> {
    Function {
        name: Name<'t>,
        parameters: Option<usize>,
    },
    Variable {
        name: Name<'t>,
    },
}

/// Peels a declarator down to the function or variable it names.
///
/// `params` are the template parameters visible at the declaration, used to
/// classify template arguments written in a qualifier.
pub(crate) fn classify<'t>(
    declarator: Node<'t>,
    src: &[u8],
    params: &[TemplateParam],
) -> Option<Declared<'t>> {
    let mut node = declarator;
    loop {
        match node.kind() {
            "function_declarator" => {
                let inner = node.child_by_field_name("declarator")?;
                if inner.kind() == "parenthesized_declarator" {
                    // `void (*callback)(int)` declares a variable
                    let name = name_of(unwrap_declarator(inner)?, src, params)?;
                    return Some(Declared::Variable { name });
                }
                let parameters = node
                    .child_by_field_name("parameters")
                    .map(|list| parameter_count(list, src));
                let name = name_of(inner, src, params)?;
                return Some(Declared::Function { name, parameters });
            }
            "pointer_declarator"
            | "reference_declarator"
            | "array_declarator"
            | "init_declarator"
            | "attributed_declarator"
            | "parenthesized_declarator" => {
                node = inner_declarator(node)?;
            }
            _ => return name_of(node, src, params).map(|name| Declared::Variable { name }),
        }
    }
}

fn inner_declarator(node: Node<'_>) -> Option<Node<'_>> {
    node.child_by_field_name("declarator").or_else(|| {
        let mut cursor = node.walk();
        let found = node
            .named_children(&mut cursor)
            .find(|child| child.kind().ends_with("declarator") || is_name(child.kind()));
        found
    })
}

fn unwrap_declarator(node: Node<'_>) -> Option<Node<'_>> {
    let mut node = node;
    while !is_name(node.kind()) {
        node = inner_declarator(node)?;
    }
    Some(node)
}

fn is_name(kind: &str) -> bool {
    matches!(
        kind,
        "identifier"
            | "field_identifier"
            | "type_identifier"
            | "qualified_identifier"
            | "template_function"
            | "destructor_name"
            | "operator_name"
    )
}

/// Reads a (possibly qualified) name node.
pub(crate) fn name_of<'t>(
    node: Node<'t>,
    src: &[u8],
    params: &[TemplateParam],
) -> Option<Name<'t>> {
    match node.kind() {
        "identifier" | "field_identifier" | "type_identifier" => Some(Name::plain(node, src)),
        "destructor_name" | "operator_name" => {
            let mut name = Name::plain(node, src);
            name.special = true;
            Some(name)
        }
        "template_function" | "template_type" => {
            let mut name = Name::plain(node.child_by_field_name("name")?, src);
            name.spelled_args = true;
            Some(name)
        }
        "qualified_identifier" => qualified(node, src, params),
        _ => None,
    }
}

fn qualified<'t>(node: Node<'t>, src: &[u8], params: &[TemplateParam]) -> Option<Name<'t>> {
    let global = node.child_by_field_name("scope").is_none();
    let mut qualifier = Vec::new();
    let mut current = node;
    loop {
        if let Some(scope) = current.child_by_field_name("scope") {
            qualifier.push(segment(scope, src, params));
        }
        let name = current.child_by_field_name("name")?;
        if name.kind() == "qualified_identifier" {
            current = name;
            continue;
        }
        let mut name = name_of(name, src, params)?;
        name.qualifier = qualifier;
        name.global = global;
        return Some(name);
    }
}

fn segment(scope: Node<'_>, src: &[u8], params: &[TemplateParam]) -> QualifierSegment {
    if scope.kind() == "template_type" {
        let name = scope
            .child_by_field_name("name")
            .map_or("", |n| text(n, src));
        let args = scope
            .child_by_field_name("arguments")
            .map(|list| argument_kinds(list, src, params))
            .unwrap_or_default();
        return QualifierSegment::template(name, args);
    }
    QualifierSegment::plain(text(scope, src))
}

/// Classifies written template arguments.
///
/// The grammar cannot tell `N` in `Buffer<N>` from a type, so arguments that
/// name a visible template parameter take that parameter's kind.
pub(crate) fn argument_kinds(
    list: Node<'_>,
    src: &[u8],
    params: &[TemplateParam],
) -> Vec<TemplateParamKind> {
    let mut cursor = list.walk();
    list.named_children(&mut cursor)
        .filter(|arg| arg.kind() != "comment")
        .map(|arg| {
            let spelled = text(arg, src).trim().trim_end_matches("...").trim();
            if let Some(param) = params.iter().rev().find(|p| p.name == spelled) {
                return param.kind;
            }
            if arg.kind() == "type_descriptor" {
                TemplateParamKind::Type
            } else {
                TemplateParamKind::NonType
            }
        })
        .collect()
}

/// Reads a `template <...>` parameter list.
pub(crate) fn template_params(list: Node<'_>, src: &[u8]) -> Vec<TemplateParam> {
    let mut cursor = list.walk();
    list.named_children(&mut cursor)
        .filter_map(|param| {
            let kind = match param.kind() {
                "type_parameter_declaration"
                | "optional_type_parameter_declaration"
                | "variadic_type_parameter_declaration" => TemplateParamKind::Type,
                "template_template_parameter_declaration" => TemplateParamKind::Template,
                "parameter_declaration"
                | "optional_parameter_declaration"
                | "variadic_parameter_declaration" => TemplateParamKind::NonType,
                _ => return None,
            };
            Some(TemplateParam::new(param_name(param, src), kind))
        })
        .collect()
}

fn param_name(param: Node<'_>, src: &[u8]) -> String {
    if let Some(name) = param.child_by_field_name("name") {
        return text(name, src).to_owned();
    }
    if let Some(declarator) = param.child_by_field_name("declarator") {
        return unwrap_declarator(declarator)
            .map(|n| text(n, src).to_owned())
            .unwrap_or_default();
    }
    // `typename T`, `typename... Ts` and `template <class> class C`
    let mut cursor = param.walk();
    let children: Vec<Node<'_>> = param.named_children(&mut cursor).collect();
    children
        .iter()
        .rev()
        .find_map(|child| match child.kind() {
            "type_identifier" => Some(text(*child, src).to_owned()),
            "type_parameter_declaration" | "variadic_type_parameter_declaration" => {
                Some(param_name(*child, src))
            }
            _ => None,
        })
        .unwrap_or_default()
}

/// Counts function parameters; `(void)` counts as none.
pub(crate) fn parameter_count(list: Node<'_>, src: &[u8]) -> usize {
    let mut cursor = list.walk();
    let params: Vec<Node<'_>> = list
        .named_children(&mut cursor)
        .filter(|p| p.kind().ends_with("parameter_declaration"))
        .collect();
    if let [only] = params.as_slice() {
        if only.child_by_field_name("declarator").is_none()
            && only
                .child_by_field_name("type")
                .is_some_and(|t| text(t, src) == "void")
        {
            return 0;
        }
    }
    params.len()
}
