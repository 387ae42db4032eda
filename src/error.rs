// src/error.rs

use arrow::error::ArrowError;
use thiserror::Error;

/// Errors raised while reconciling a raw table into canonical form.
///
/// Bad individual cells never produce an error; they become nulls in the
/// affected row. Only schema-level failures land here.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// No candidate column for a required attribute was present.
    #[error("no {attribute} column found; expected one of: {}", .expected.join(", "))]
    MissingColumn {
        attribute: &'static str,
        expected: &'static [&'static str],
    },

    #[error("building arrow batch: {0}")]
    Arrow(#[from] ArrowError),
}
