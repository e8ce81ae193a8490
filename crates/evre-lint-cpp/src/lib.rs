//! # evre-lint-cpp
//!
//! Tree-sitter based C++ frontend for evre-lint.
//!
//! [`CppFrontend`] implements [`evre_lint_core::Frontend`]: it parses one
//! translation unit with `tree-sitter-cpp` and records its namespaces,
//! classes, templates, functions and variables in a
//! [`evre_lint_core::DeclarationModel`]. The frontend is structural only;
//! it performs no preprocessing, overload resolution or type checking.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod frontend;
mod syntax;

pub use frontend::CppFrontend;
