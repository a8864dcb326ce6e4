//! Error types for table access.

use thiserror::Error;

use crate::value::ColumnType;

/// Error returned by typed table access.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    /// The table has no column with this name.
    #[error("table '{table}' has no column '{column}'")]
    UnknownColumn { table: String, column: String },

    /// A value of the wrong type was written to or read from a column.
    #[error("column '{column}' in table '{table}' holds {expected:?}, got {found:?}")]
    TypeMismatch {
        table: String,
        column: String,
        expected: ColumnType,
        found: ColumnType,
    },

    /// The row index is past the end of the table.
    #[error("row {row} out of range for table '{table}' ({len} rows)")]
    RowOutOfRange { table: String, row: usize, len: usize },

    /// A column with this name already exists.
    #[error("table '{table}' already has a column '{column}'")]
    DuplicateColumn { table: String, column: String },
}
