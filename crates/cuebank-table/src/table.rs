//! Table, column, and row types.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::TableError;
use crate::value::{ColumnType, Value};

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name, unique within its table.
    pub name: String,
    /// Storage type.
    pub ty: ColumnType,
    /// Value used for cells of rows created by [`Table::new_row`], and read
    /// back in place of null cells. A reader-side setting: codecs do not
    /// store it, so setting a default never changes saved bytes by itself.
    #[serde(skip)]
    pub default: Option<Value>,
}

impl Column {
    /// Create a column without a default.
    pub fn new(name: &str, ty: ColumnType) -> Self {
        Self {
            name: name.to_string(),
            ty,
            default: None,
        }
    }
}

/// One table row. Cells are aligned with the owning table's columns;
/// `None` is a null cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub cells: Vec<Option<Value>>,
}

impl Row {
    /// Returns the raw cell at `column`, without falling back to defaults.
    pub fn cell(&self, column: usize) -> Option<&Value> {
        self.cells.get(column).and_then(Option::as_ref)
    }
}

/// An ordered table of rows with named, typed columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Table name as stored by the codec.
    pub name: String,
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl Table {
    /// Create an empty table with no columns.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Builder form of [`Table::add_column`].
    ///
    /// # Panics
    /// Panics if the column already exists; intended for static schemas.
    pub fn with_column(mut self, name: &str, ty: ColumnType) -> Self {
        if let Err(err) = self.add_column(name, ty) {
            panic!("{}", err);
        }
        self
    }

    /// Builder form of [`Table::set_default`].
    ///
    /// # Panics
    /// Panics if the column is missing or the value has the wrong type.
    pub fn with_default(mut self, column: &str, value: Value) -> Self {
        if let Err(err) = self.set_default(column, value) {
            panic!("{}", err);
        }
        self
    }

    /// Append a column. Existing rows get a null cell for it.
    pub fn add_column(&mut self, name: &str, ty: ColumnType) -> Result<usize, TableError> {
        if self.has_column(name) {
            return Err(TableError::DuplicateColumn {
                table: self.name.clone(),
                column: name.to_string(),
            });
        }
        self.columns.push(Column::new(name, ty));
        for row in &mut self.rows {
            row.cells.push(None);
        }
        Ok(self.columns.len() - 1)
    }

    /// Columns in storage order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Rows in storage order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the named column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Returns true if the named column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    fn require_column(&self, name: &str) -> Result<usize, TableError> {
        self.column_index(name).ok_or_else(|| TableError::UnknownColumn {
            table: self.name.clone(),
            column: name.to_string(),
        })
    }

    fn check_type(&self, column: usize, value: &Value) -> Result<(), TableError> {
        let col = &self.columns[column];
        if col.ty != value.column_type() {
            return Err(TableError::TypeMismatch {
                table: self.name.clone(),
                column: col.name.clone(),
                expected: col.ty,
                found: value.column_type(),
            });
        }
        Ok(())
    }

    fn check_row(&self, row: usize) -> Result<(), TableError> {
        if row >= self.rows.len() {
            return Err(TableError::RowOutOfRange {
                table: self.name.clone(),
                row,
                len: self.rows.len(),
            });
        }
        Ok(())
    }

    /// Set the default value of a column.
    pub fn set_default(&mut self, column: &str, value: Value) -> Result<(), TableError> {
        let index = self.require_column(column)?;
        self.check_type(index, &value)?;
        self.columns[index].default = Some(value);
        Ok(())
    }

    /// Create a detached row filled with the column defaults.
    pub fn new_row(&self) -> Row {
        Row {
            cells: self.columns.iter().map(|c| c.default.clone()).collect(),
        }
    }

    /// Append a row and return its position.
    ///
    /// Rows shorter than the column list are padded with nulls; longer rows
    /// are truncated.
    pub fn push_row(&mut self, mut row: Row) -> usize {
        row.cells.resize(self.columns.len(), None);
        self.rows.push(row);
        self.rows.len() - 1
    }

    /// Write a cell of a detached row, checked against this table's columns.
    pub fn fill(&self, row: &mut Row, column: &str, value: Value) -> Result<(), TableError> {
        let index = self.require_column(column)?;
        self.check_type(index, &value)?;
        if row.cells.len() < self.columns.len() {
            row.cells.resize(self.columns.len(), None);
        }
        row.cells[index] = Some(value);
        Ok(())
    }

    /// Read a cell, falling back to the column default for null cells.
    pub fn get(&self, row: usize, column: &str) -> Result<Option<&Value>, TableError> {
        let index = self.require_column(column)?;
        self.check_row(row)?;
        Ok(self.rows[row]
            .cell(index)
            .or(self.columns[index].default.as_ref()))
    }

    /// Write a cell. The value type must match the column type.
    pub fn set(&mut self, row: usize, column: &str, value: Value) -> Result<(), TableError> {
        let index = self.require_column(column)?;
        self.check_row(row)?;
        self.check_type(index, &value)?;
        self.rows[row].cells[index] = Some(value);
        Ok(())
    }

    fn typed<'a, T>(
        &'a self,
        row: usize,
        column: &str,
        expected: ColumnType,
        extract: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Result<Option<T>, TableError> {
        match self.get(row, column)? {
            None => Ok(None),
            Some(value) => extract(value).map(Some).ok_or_else(|| TableError::TypeMismatch {
                table: self.name.clone(),
                column: column.to_string(),
                expected,
                found: value.column_type(),
            }),
        }
    }

    /// Read a `u8` cell.
    pub fn get_u8(&self, row: usize, column: &str) -> Result<Option<u8>, TableError> {
        self.typed(row, column, ColumnType::U8, |v| match v {
            Value::U8(x) => Some(*x),
            _ => None,
        })
    }

    /// Read a `u16` cell.
    pub fn get_u16(&self, row: usize, column: &str) -> Result<Option<u16>, TableError> {
        self.typed(row, column, ColumnType::U16, |v| match v {
            Value::U16(x) => Some(*x),
            _ => None,
        })
    }

    /// Read a `u32` cell.
    pub fn get_u32(&self, row: usize, column: &str) -> Result<Option<u32>, TableError> {
        self.typed(row, column, ColumnType::U32, |v| match v {
            Value::U32(x) => Some(*x),
            _ => None,
        })
    }

    /// Read a string cell.
    pub fn get_str(&self, row: usize, column: &str) -> Result<Option<&str>, TableError> {
        self.typed(row, column, ColumnType::String, Value::as_str)
    }

    /// Read a binary cell.
    pub fn get_data(&self, row: usize, column: &str) -> Result<Option<&[u8]>, TableError> {
        self.typed(row, column, ColumnType::Data, Value::as_data)
    }

    /// Stable sort of the rows.
    pub fn sort_rows_by<F>(&mut self, compare: F)
    where
        F: FnMut(&Row, &Row) -> Ordering,
    {
        self.rows.sort_by(compare);
    }
}
