//! Error types for the row codec.
//!
//! Every failure the codec can produce is one of the variants below. All
//! errors are synchronous and fail-fast at the call that triggers them;
//! nothing is retried internally. Recovery (retry the write, re-fetch the
//! row, abort the transaction) belongs to the storage and replication
//! layers above this crate.

use thiserror::Error;

/// Result type alias using [`RowError`].
pub type Result<T> = std::result::Result<T, RowError>;

/// Unified error type for schema and row codec operations.
#[derive(Debug, Error)]
pub enum RowError {
    /// Invalid schema definition: duplicate column name, empty key column
    /// set, or a zero version number.
    #[error("schema definition error: {0}")]
    SchemaDefinition(String),

    /// An append that disagrees with the schema: wrong type for the next
    /// expected column, null for a non-nullable column, or an append past
    /// the end of the column sequence.
    #[error("schema violation: {0}")]
    SchemaViolation(String),

    /// `build` was called before every expected column was appended.
    #[error("row incomplete: next expected column is '{next_column}'")]
    BuildIncomplete { next_column: String },

    /// The byte buffer is not a well-formed row: truncated, failing its
    /// checksum, or structurally inconsistent with the schema.
    #[error("corrupt row: {0}")]
    CorruptRow(String),

    /// A column index outside the row's addressable range.
    #[error("column index {index} out of range for {count} addressable columns")]
    IndexOutOfRange { index: usize, count: usize },

    /// An accessor whose type disagrees with the column's declared type.
    #[error("type mismatch at column {index}: declared {declared}, requested {requested}")]
    TypeMismatch {
        index: usize,
        declared: &'static str,
        requested: &'static str,
    },
}
