//! JSON table codec.
//!
//! Stores a [`Table`] as compact JSON. Nested tables are binary cells holding
//! the JSON bytes of the inner table, so a whole cue bank round-trips through
//! this codec exactly as it would through the container's native codec.

use thiserror::Error;

use crate::codec::TableCodec;
use crate::table::Table;

/// Error from [`JsonTableCodec`].
#[derive(Debug, Error)]
pub enum JsonCodecError {
    /// Input was not a valid JSON table.
    #[error("invalid table JSON: {0}")]
    Parse(#[source] serde_json::Error),

    /// Serialization failed.
    #[error("failed to serialize table '{table}': {source}")]
    Save {
        table: String,
        #[source]
        source: serde_json::Error,
    },

    /// A row has a cell whose type disagrees with its column.
    #[error("table '{table}' row {row}: cell {column} does not match its column type")]
    CellType {
        table: String,
        row: usize,
        column: String,
    },

    /// A row has more or fewer cells than the table has columns.
    #[error("table '{table}' row {row}: expected {expected} cells, found {found}")]
    CellCount {
        table: String,
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Deterministic serde_json-backed [`TableCodec`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTableCodec;

impl JsonTableCodec {
    fn validate(table: &Table) -> Result<(), JsonCodecError> {
        let columns = table.columns();
        for (row_index, row) in table.rows().iter().enumerate() {
            if row.cells.len() != columns.len() {
                return Err(JsonCodecError::CellCount {
                    table: table.name.clone(),
                    row: row_index,
                    expected: columns.len(),
                    found: row.cells.len(),
                });
            }
            for (cell, column) in row.cells.iter().zip(columns) {
                if let Some(value) = cell {
                    if value.column_type() != column.ty {
                        return Err(JsonCodecError::CellType {
                            table: table.name.clone(),
                            row: row_index,
                            column: column.name.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

impl TableCodec for JsonTableCodec {
    type Error = JsonCodecError;

    fn parse(&self, bytes: &[u8]) -> Result<Table, Self::Error> {
        let table: Table = serde_json::from_slice(bytes).map_err(JsonCodecError::Parse)?;
        Self::validate(&table)?;
        Ok(table)
    }

    fn save(&self, table: &Table) -> Result<Vec<u8>, Self::Error> {
        Self::validate(table)?;
        serde_json::to_vec(table).map_err(|source| JsonCodecError::Save {
            table: table.name.clone(),
            source,
        })
    }
}
