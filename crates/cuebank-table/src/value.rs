//! Cell values and column types.

use serde::{Deserialize, Serialize};

/// Storage type of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
    String,
    Data,
}

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    F32(f32),
    F64(f64),
    String(String),
    /// Opaque binary blob, used both for engine command bytes and nested tables.
    Data(Vec<u8>),
}

impl Value {
    /// Returns the column type this value can be stored in.
    pub fn column_type(&self) -> ColumnType {
        match self {
            Value::U8(_) => ColumnType::U8,
            Value::I8(_) => ColumnType::I8,
            Value::U16(_) => ColumnType::U16,
            Value::I16(_) => ColumnType::I16,
            Value::U32(_) => ColumnType::U32,
            Value::I32(_) => ColumnType::I32,
            Value::U64(_) => ColumnType::U64,
            Value::I64(_) => ColumnType::I64,
            Value::F32(_) => ColumnType::F32,
            Value::F64(_) => ColumnType::F64,
            Value::String(_) => ColumnType::String,
            Value::Data(_) => ColumnType::Data,
        }
    }

    /// Returns the string contents, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the blob contents, if this is a data value.
    pub fn as_data(&self) -> Option<&[u8]> {
        match self {
            Value::Data(d) => Some(d),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(d: Vec<u8>) -> Self {
        Value::Data(d)
    }
}
