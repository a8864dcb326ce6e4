//! Error types for cue bank assembly.

use cuebank_table::TableError;
use thiserror::Error;

/// Boxed error from the external table codec.
pub type CodecError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for cue bank operations.
#[derive(Debug, Error)]
pub enum CueBankError {
    /// The root table or a required nested column is missing or unreadable.
    #[error("malformed container: {0}")]
    MalformedContainer(String),

    /// The table codec failed while parsing or saving.
    #[error("table codec error: {0}")]
    Codec(#[source] CodecError),

    /// A typed table access failed.
    #[error(transparent)]
    Table(#[from] TableError),

    /// A table is full: its positions no longer fit the 16-bit reference width.
    #[error("table '{table}' cannot hold more than 65536 rows")]
    IndexOverflow { table: String },

    /// Every 32-bit cue id has been used.
    #[error("cue id space exhausted (last cue id {last})")]
    CueIdExhausted { last: u32 },

    /// A row lacks a value the typed record requires.
    #[error("table '{table}' row {row}: missing value for '{column}'")]
    MissingValue {
        table: String,
        row: usize,
        column: String,
    },

    /// A binary cell does not have the expected layout.
    #[error("table '{table}' row {row}: invalid '{column}' blob: {reason}")]
    InvalidBlob {
        table: String,
        row: usize,
        column: String,
        reason: String,
    },

    /// A payload is too large for the container prefix record.
    #[error("payload of {0} bytes does not fit the container prefix")]
    PayloadTooLarge(usize),

    /// The configured scratch column is one of the nested table columns.
    #[error("scratch column '{0}' is a nested table column")]
    ScratchColumnConflict(String),

    /// Finalize configuration could not be parsed.
    #[error("invalid finalize config: {0}")]
    Config(#[from] serde_json::Error),
}

impl CueBankError {
    /// Wrap a codec error without altering it.
    pub fn codec<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        CueBankError::Codec(Box::new(err))
    }
}

/// Result alias for cue bank operations.
pub type Result<T> = std::result::Result<T, CueBankError>;
