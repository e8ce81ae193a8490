//! Declaration records: the JSON input format for models produced by an
//! external parser.
//!
//! ```json
//! [
//!   {"kind": "template-class", "name": "Widget",
//!    "path": [{"name": "evre", "kind": "namespace"}],
//!    "file": "wrong_class.hpp", "line": 5, "column": 7,
//!    "is_definition": true, "template_params": ["type"]},
//!   {"kind": "function", "name": "foo",
//!    "path": [{"name": "evre", "kind": "namespace"},
//!             {"name": "Widget", "kind": "class", "template": ["type"]}],
//!    "file": "wrong_class.hpp", "line": 14, "column": 23,
//!    "is_definition": true, "out_of_line": true, "parameter_count": 0}
//! ]
//! ```
//!
//! Records carry the canonical path, so out-of-line records are anchored at
//! the root rather than re-derived from a written qualifier.

use crate::model::{
    DeclKind, Declaration, DeclarationModel, ModelError, QualifierSegment, ScopeId, ScopeKind,
    TemplateParam, TemplateParamKind,
};
use crate::types::Location;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One path component of a declaration record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRecord {
    /// Scope name (empty for anonymous namespaces).
    pub name: String,
    /// `namespace`, `class` or `function`.
    pub kind: String,
    /// Template parameter kinds when the component is a class template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<Vec<TemplateParamKind>>,
}

/// One declaration as emitted by an external parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationRecord {
    /// `class`, `template-class`, `function` or `variable`.
    pub kind: String,
    /// Simple name.
    pub name: String,
    /// Enclosing scopes, outermost first.
    #[serde(default)]
    pub path: Vec<PathRecord>,
    /// Source file.
    pub file: PathBuf,
    /// 1-indexed line.
    pub line: usize,
    /// 1-indexed column.
    pub column: usize,
    /// Whether the declaration supplies a body or value.
    #[serde(default)]
    pub is_definition: bool,
    /// Whether this is a member definition outside its class body.
    #[serde(default)]
    pub out_of_line: bool,
    /// The entity's own template parameter kinds.
    #[serde(default)]
    pub template_params: Vec<TemplateParamKind>,
    /// Number of function parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_count: Option<usize>,
    /// Constructor, destructor or operator. Inferred from the name when
    /// not set.
    #[serde(default)]
    pub special_member: bool,
}

impl DeclarationRecord {
    fn is_special_member(&self) -> bool {
        if self.special_member {
            return true;
        }
        if self.kind != "function" {
            return false;
        }
        self.name.starts_with('~')
            || self.name.starts_with("operator")
            || self
                .path
                .last()
                .is_some_and(|p| p.kind == "class" && p.name == self.name)
    }
}

/// Errors while reading declaration records.
#[derive(Debug, thiserror::Error)]
pub enum RecordsError {
    /// The input was not a JSON array of records.
    #[error("invalid declaration records: {0}")]
    Json(#[from] serde_json::Error),

    /// A record could not be placed in the model.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Parses a JSON array of records and builds one model per file, in order of
/// first appearance.
///
/// # Errors
///
/// Returns an error on malformed JSON or on records with unknown kinds.
pub fn models_from_json(json: &str) -> Result<Vec<DeclarationModel>, RecordsError> {
    let records: Vec<DeclarationRecord> = serde_json::from_str(json)?;
    Ok(models_from_records(&records)?)
}

/// Groups records by file and builds one model per file.
///
/// # Errors
///
/// Returns an error on records with unknown kinds.
pub fn models_from_records(
    records: &[DeclarationRecord],
) -> Result<Vec<DeclarationModel>, ModelError> {
    let mut grouped: Vec<(&Path, Vec<&DeclarationRecord>)> = Vec::new();
    for record in records {
        match grouped.iter_mut().find(|(file, _)| *file == record.file) {
            Some((_, group)) => group.push(record),
            None => grouped.push((record.file.as_path(), vec![record])),
        }
    }
    grouped
        .into_iter()
        .map(|(file, group)| DeclarationModel::from_records(file, group))
        .collect()
}

impl DeclarationModel {
    /// Builds a model from records belonging to a single file.
    ///
    /// # Errors
    ///
    /// Returns an error on records with unknown kinds.
    pub fn from_records<'r>(
        file: impl Into<PathBuf>,
        records: impl IntoIterator<Item = &'r DeclarationRecord>,
    ) -> Result<Self, ModelError> {
        let mut model = Self::new(file);
        for (index, record) in records.into_iter().enumerate() {
            let context = format!("record #{index} `{}`", record.name);
            let kind = DeclKind::parse(&record.kind).ok_or_else(|| ModelError::UnknownKind {
                context: context.clone(),
                value: record.kind.clone(),
            })?;
            let location = Location::new(record.file.clone(), record.line, record.column);

            let mut declaration = if record.out_of_line {
                let qualifier = record
                    .path
                    .iter()
                    .map(|p| QualifierSegment {
                        name: p.name.clone(),
                        template_args: p.template.clone(),
                    })
                    .collect();
                let scope = model.ensure_template_scope(model.root(), &record.template_params)?;
                Declaration::new(kind, &record.name, scope, location)
                    .out_of_line()
                    .with_qualifier(qualifier, true)
            } else {
                let enclosing = model.ensure_path(&record.path, &context)?;
                let scope = model.ensure_template_scope(enclosing, &record.template_params)?;
                let declaration = Declaration::new(kind, &record.name, scope, location);
                if record.is_definition {
                    declaration.definition()
                } else {
                    declaration
                }
            };
            declaration = declaration.with_template_params(record.template_params.clone());
            if let Some(count) = record.parameter_count {
                declaration = declaration.with_parameter_count(count);
            }
            if record.is_special_member() {
                declaration = declaration.special_member();
            }
            model.add_declaration(declaration)?;
        }
        Ok(model)
    }

    fn ensure_path(&mut self, path: &[PathRecord], context: &str) -> Result<ScopeId, ModelError> {
        let mut current = self.root();
        for segment in path {
            let kind = match segment.kind.as_str() {
                "namespace" => ScopeKind::Namespace,
                "class" => ScopeKind::Class,
                "function" => ScopeKind::Function,
                other => {
                    return Err(ModelError::UnknownKind {
                        context: format!("{context}, path component `{}`", segment.name),
                        value: other.to_string(),
                    })
                }
            };
            if let Some(params) = &segment.template {
                current = self.ensure_template_scope(current, params)?;
            }
            current = match self.find_child(current, kind, &segment.name) {
                Some(existing) => existing,
                None => self.add_scope(current, kind, &segment.name)?,
            };
        }
        Ok(current)
    }

    /// Reuses a template parameter list child with the same kinds, or adds
    /// one. An empty list means no template scope.
    fn ensure_template_scope(
        &mut self,
        parent: ScopeId,
        kinds: &[TemplateParamKind],
    ) -> Result<ScopeId, ModelError> {
        if kinds.is_empty() {
            return Ok(parent);
        }
        let existing = self.scope(parent).and_then(|p| {
            p.children().iter().copied().find(|&c| {
                self.scope(c).is_some_and(|s| {
                    s.kind() == ScopeKind::TemplateParamList && s.signature().kinds() == kinds
                })
            })
        });
        match existing {
            Some(id) => Ok(id),
            None => self.add_template_scope(
                parent,
                kinds
                    .iter()
                    .map(|&kind| TemplateParam::new(String::new(), kind))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDGET: &str = r#"[
        {"kind": "template-class", "name": "Widget",
         "path": [{"name": "evre", "kind": "namespace"}],
         "file": "wrong_class.hpp", "line": 5, "column": 7,
         "is_definition": true, "template_params": ["type"]},
        {"kind": "function", "name": "foo",
         "path": [{"name": "evre", "kind": "namespace"},
                  {"name": "Widget", "kind": "class", "template": ["type"]}],
         "file": "wrong_class.hpp", "line": 9, "column": 7, "parameter_count": 0},
        {"kind": "function", "name": "foo",
         "path": [{"name": "evre", "kind": "namespace"},
                  {"name": "Widget", "kind": "class", "template": ["type"]}],
         "file": "wrong_class.hpp", "line": 14, "column": 23,
         "is_definition": true, "out_of_line": true, "parameter_count": 0}
    ]"#;

    #[test]
    fn builds_one_model_per_file() {
        let models = models_from_json(WIDGET).unwrap();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].file(), Path::new("wrong_class.hpp"));
        assert_eq!(models[0].declarations().len(), 3);
    }

    #[test]
    fn class_and_members_share_template_scope() {
        let models = models_from_json(WIDGET).unwrap();
        let model = &models[0];
        let names: Vec<String> = model
            .declarations()
            .iter()
            .map(|d| model.qualified_name(d).key())
            .collect();
        assert_eq!(
            names,
            vec![
                "evre::Widget<type>",
                "evre::Widget<type>::foo",
                "evre::Widget<type>::foo",
            ]
        );
        // root, evre, template list, Widget
        assert_eq!(model.scopes().len(), 4);
    }

    #[test]
    fn out_of_line_record_is_a_definition() {
        let models = models_from_json(WIDGET).unwrap();
        let definition = &models[0].declarations()[2];
        assert!(definition.is_out_of_line());
        assert!(definition.is_definition());
        assert_eq!(definition.parameter_count(), Some(0));
    }

    #[test]
    fn constructors_and_operators_are_special_members() {
        let json = r#"[
            {"kind": "function", "name": "Widget",
             "path": [{"name": "Widget", "kind": "class"}],
             "file": "a.hpp", "line": 2, "column": 5},
            {"kind": "function", "name": "operator==",
             "path": [{"name": "Widget", "kind": "class"}],
             "file": "a.hpp", "line": 3, "column": 10},
            {"kind": "function", "name": "size",
             "path": [{"name": "Widget", "kind": "class"}],
             "file": "a.hpp", "line": 4, "column": 10}
        ]"#;
        let models = models_from_json(json).unwrap();
        let special: Vec<bool> = models[0]
            .declarations()
            .iter()
            .map(Declaration::is_special_member)
            .collect();
        assert_eq!(special, vec![true, true, false]);
    }

    #[test]
    fn unknown_kind_is_rejected_with_context() {
        let json = r#"[{"kind": "enum", "name": "Color", "file": "a.hpp", "line": 1, "column": 6}]"#;
        let err = models_from_json(json).unwrap_err();
        assert_eq!(
            err.to_string(),
            "record #0 `Color`: unknown kind `enum`"
        );
    }

    #[test]
    fn unknown_path_kind_is_rejected() {
        let json = r#"[{"kind": "function", "name": "f",
            "path": [{"name": "E", "kind": "enum"}],
            "file": "a.hpp", "line": 1, "column": 6}]"#;
        assert!(matches!(
            models_from_json(json),
            Err(RecordsError::Model(ModelError::UnknownKind { .. }))
        ));
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            models_from_json("{not json"),
            Err(RecordsError::Json(_))
        ));
    }
}
