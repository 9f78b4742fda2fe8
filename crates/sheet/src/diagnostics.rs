//! Recoverable problems collected during a conversion.

use tabxl_formulas::DirectiveError;
use thiserror::Error;

/// A problem that was worked around instead of failing the run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Warning {
    #[error("sheet '{sheet}' cell {cell}: {problem}")]
    Directive {
        sheet: String,
        cell: String,
        problem: DirectiveError,
    },

    #[error("sheet '{sheet}': {problem}; using the default freeze pane")]
    Layout {
        sheet: String,
        problem: DirectiveError,
    },

    #[error("table {table} has no <tbody>; body treated as empty")]
    MissingBody { table: String },

    #[error("table {table}: ignoring colspan '{value}'")]
    InvalidColspan { table: String, value: String },
}

/// Warnings in the order they were raised.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning and log it.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{warning}");
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}
