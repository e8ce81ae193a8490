//! Language frontends: the extension point that turns source text into a
//! [`DeclarationModel`].
//!
//! Implement [`Frontend`] to teach the analyzer a new language or parser.
//! Frontends are structural only; they must tolerate syntax errors and
//! return whatever declarations they could recognize.

use crate::model::{DeclarationModel, ModelError};
use std::path::Path;

/// Errors a frontend can report for a whole translation unit.
#[derive(Debug, thiserror::Error)]
pub enum FrontendError {
    /// The parser could not be initialized or produced no tree.
    #[error("{language} parser failed on {path}: {message}")]
    Parser {
        /// Language identifier.
        language: &'static str,
        /// File being parsed.
        path: String,
        /// What went wrong.
        message: String,
    },

    /// The recognized structure could not be recorded.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Source-to-model extraction for one language.
pub trait Frontend: Send + Sync {
    /// Language identifier (e.g., `"cpp"`).
    fn language_id(&self) -> &'static str;

    /// File extensions this frontend handles, without the dot.
    fn extensions(&self) -> &'static [&'static str];

    /// Builds the declaration model of one translation unit.
    ///
    /// # Errors
    ///
    /// Returns an error only when no model can be produced at all.
    fn extract(&self, path: &Path, source: &str) -> Result<DeclarationModel, FrontendError>;

    /// Whether `path` has one of [`Self::extensions`].
    fn handles(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions().contains(&ext))
    }
}

/// Type alias for boxed `Frontend` trait objects.
pub type FrontendBox = Box<dyn Frontend>;

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;

    impl Frontend for Plain {
        fn language_id(&self) -> &'static str {
            "plain"
        }

        fn extensions(&self) -> &'static [&'static str] {
            &["h", "hpp"]
        }

        fn extract(&self, path: &Path, _source: &str) -> Result<DeclarationModel, FrontendError> {
            Ok(DeclarationModel::new(path))
        }
    }

    #[test]
    fn handles_matches_extension() {
        assert!(Plain.handles(Path::new("include/widget.hpp")));
        assert!(!Plain.handles(Path::new("src/widget.cpp")));
        assert!(!Plain.handles(Path::new("Makefile")));
    }
}
