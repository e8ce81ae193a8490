//! Diagnostic collector for one translation unit.
//!
//! ```text
//! Empty ──insert──▶ Collecting ──finalize──▶ Finalized
//!   └──────────────finalize─────────────────────┘
//! ```
//!
//! Violations are deduplicated by (symbol identity, rule id). Finalizing
//! sorts by (file, line, column, rule) and freezes the collection.

use crate::types::{sort_violations, Violation};
use std::collections::HashSet;

/// Lifecycle state of a [`DiagnosticCollector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorState {
    /// Nothing inserted yet.
    Empty,
    /// At least one insertion attempted.
    Collecting,
    /// Sorted and frozen.
    Finalized,
}

/// Usage-order errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CollectorError {
    /// Insertion after [`DiagnosticCollector::finalize`].
    #[error("diagnostic collector is finalized; no further insertions are accepted")]
    Finalized,
}

/// Accumulates violations for one translation unit.
#[derive(Debug)]
pub struct DiagnosticCollector {
    state: CollectorState,
    seen: HashSet<(String, String)>,
    violations: Vec<Violation>,
}

impl Default for DiagnosticCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticCollector {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: CollectorState::Empty,
            seen: HashSet::new(),
            violations: Vec::new(),
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> CollectorState {
        self.state
    }

    /// Inserts a violation unless one for the same (symbol, rule) pair is
    /// already held. Returns whether it was retained.
    ///
    /// Violations without a symbol identity are keyed by their location.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::Finalized`] after [`Self::finalize`].
    pub fn try_insert(&mut self, violation: Violation) -> Result<bool, CollectorError> {
        if self.state == CollectorState::Finalized {
            return Err(CollectorError::Finalized);
        }
        self.state = CollectorState::Collecting;

        let identity = if violation.symbol_key.is_empty() {
            violation.location.to_string()
        } else {
            violation.symbol_key.clone()
        };
        if !self.seen.insert((identity, violation.rule.clone())) {
            return Ok(false);
        }
        self.violations.push(violation);
        Ok(true)
    }

    /// Inserts a violation, see [`Self::try_insert`].
    ///
    /// # Panics
    ///
    /// Panics when called after [`Self::finalize`]; that is a bug in the
    /// calling code, not a data error.
    pub fn insert(&mut self, violation: Violation) -> bool {
        match self.try_insert(violation) {
            Ok(retained) => retained,
            Err(e) => panic!("{e}"),
        }
    }

    /// Inserts every violation of `violations`; returns how many were retained.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::Finalized`] after [`Self::finalize`].
    pub fn extend(
        &mut self,
        violations: impl IntoIterator<Item = Violation>,
    ) -> Result<usize, CollectorError> {
        let mut retained = 0;
        for violation in violations {
            if self.try_insert(violation)? {
                retained += 1;
            }
        }
        Ok(retained)
    }

    /// Sorts and freezes the collection. Calling it again is a no-op.
    pub fn finalize(&mut self) -> &[Violation] {
        if self.state != CollectorState::Finalized {
            sort_violations(&mut self.violations);
            self.state = CollectorState::Finalized;
        }
        &self.violations
    }

    /// Returns the violations held so far (sorted once finalized).
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Finalizes and hands the sorted violations to the reporter.
    #[must_use]
    pub fn into_violations(mut self) -> Vec<Violation> {
        self.finalize();
        self.violations
    }

    /// Returns the number of retained violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if nothing was retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }
}
