//! Typed relational tables for cue bank assembly.
//!
//! A cue bank is stored as a root table whose single row holds every nested
//! table as a binary column. This crate models those tables in memory and
//! defines the seam to the binary codec that reads and writes them.
//!
//! # Overview
//!
//! - [`Table`]: named, typed columns with optional per-column defaults, and
//!   rows of nullable cells.
//! - [`TableCodec`]: parse a table from bytes and save it back. The real
//!   container codec lives outside this workspace; [`JsonTableCodec`] is a
//!   deterministic stand-in used by tests and tooling.
//!
//! # Example
//!
//! ```
//! use cuebank_table::{ColumnType, JsonTableCodec, Table, TableCodec, Value};
//!
//! let mut table = Table::new("CueName")
//!     .with_column("CueName", ColumnType::String)
//!     .with_column("CueIndex", ColumnType::U16);
//! let row = table.new_row();
//! let index = table.push_row(row);
//! table.set(index, "CueName", Value::String("intro".into())).unwrap();
//!
//! let codec = JsonTableCodec;
//! let bytes = codec.save(&table).unwrap();
//! let parsed = codec.parse(&bytes).unwrap();
//! assert_eq!(parsed.get_str(0, "CueName").unwrap(), Some("intro"));
//! ```

pub mod codec;
pub mod error;
pub mod json;
pub mod table;
pub mod value;

pub use codec::TableCodec;
pub use error::TableError;
pub use json::{JsonCodecError, JsonTableCodec};
pub use table::{Column, Row, Table};
pub use value::{ColumnType, Value};
