//! # evre-lint-core
//!
//! Core engine for checking C++ naming conventions over a language-neutral
//! declaration model.
//!
//! This crate provides:
//!
//! - [`DeclarationModel`] for the scopes and declarations of one translation unit
//! - [`resolve`] for merging declarations into [`Symbol`]s by canonical name
//! - [`RuleConfiguration`] for naming rules loaded from `[[naming]]` TOML tables
//! - [`Analyzer`] for running frontends and rules over a file tree in parallel
//! - [`DiagnosticCollector`] for deduplicated, deterministically ordered output
//!
//! Parsing is pluggable through the [`Frontend`] trait; the tree-sitter based
//! C++ frontend lives in `evre-lint-cpp`.
//!
//! ## Example
//!
//! ```ignore
//! use evre_lint_core::{load_rules_from_toml, Analyzer};
//!
//! let analyzer = Analyzer::builder()
//!     .root("./src")
//!     .frontend(Box::new(CppFrontend::new()))
//!     .rules(load_rules_from_toml(&std::fs::read_to_string("evre-lint.toml")?)?)
//!     .build()?;
//!
//! let result = analyzer.analyze()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod collector;
mod config;
mod engine;
mod frontend;
mod types;

pub mod checks;
pub mod model;
pub mod naming;
pub mod records;
pub mod resolver;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError, CancellationToken};
pub use checks::{builtin_checks, CheckBox, StructuralCheck};
pub use collector::{CollectorError, CollectorState, DiagnosticCollector};
pub use config::{AnalyzerConfig, Config, ConfigError, RuleConfig};
pub use engine::{evaluate, evaluate_all};
pub use frontend::{Frontend, FrontendBox, FrontendError};
pub use model::{
    DeclId, DeclKind, Declaration, DeclarationModel, ModelError, QualifiedName, QualifierSegment,
    ScopeId, ScopeKind, TemplateParam, TemplateParamKind,
};
pub use naming::{load_rules_from_toml, LoadRulesError, RuleConfiguration};
pub use records::{models_from_json, DeclarationRecord, RecordsError};
pub use resolver::{resolve, Resolution, Symbol, SymbolKey};
pub use types::{
    Label, LintResult, Location, Severity, Suggestion, Violation, ViolationDiagnostic,
};
