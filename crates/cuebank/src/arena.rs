//! Append-only table storage.
//!
//! A row's position is its id: other tables reference it as a 16-bit index.
//! An [`Arena`] therefore never removes or reorders rows, except through
//! [`Arena::sort_by`], which is reserved for the cue name index (nothing
//! references cue name rows by position).

use std::cmp::Ordering;

use cuebank_table::{Row, Table, Value};

use crate::error::{CueBankError, Result};
use crate::rows::Record;

/// Position of a row within its table.
pub type RowId = u16;

/// Largest row count a table can hold while every position fits a [`RowId`].
pub const MAX_ROWS: usize = RowId::MAX as usize + 1;

/// Append-only wrapper around a [`Table`].
#[derive(Debug, Clone, PartialEq)]
pub struct Arena {
    table: Table,
}

impl Arena {
    pub fn new(table: Table) -> Self {
        Self { table }
    }

    /// The underlying table, for serialization and inspection.
    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Id the next appended row will receive.
    pub fn next_id(&self) -> Result<RowId> {
        RowId::try_from(self.table.len()).map_err(|_| self.overflow())
    }

    fn overflow(&self) -> CueBankError {
        CueBankError::IndexOverflow {
            table: self.table.name.clone(),
        }
    }

    /// Build a detached row holding `record`, without appending it.
    pub fn prepare<R: Record>(&self, record: &R) -> Result<Row> {
        let mut row = self.table.new_row();
        record.fill(&self.table, &mut row)?;
        Ok(row)
    }

    /// Append a row built by [`Arena::prepare`].
    pub fn commit(&mut self, row: Row) -> Result<RowId> {
        let id = self.next_id()?;
        self.table.push_row(row);
        Ok(id)
    }

    /// Append a record and return its id.
    pub fn append<R: Record>(&mut self, record: &R) -> Result<RowId> {
        let row = self.prepare(record)?;
        self.commit(row)
    }

    /// Read the record at `id`.
    pub fn get<R: Record>(&self, id: RowId) -> Result<R> {
        R::read(&self.table, usize::from(id))
    }

    /// Overwrite a single cell of an existing row.
    pub fn set(&mut self, id: RowId, column: &str, value: Value) -> Result<()> {
        self.table.set(usize::from(id), column, value)?;
        Ok(())
    }

    /// Position of the first row whose string `column` equals `needle`.
    pub fn position_str(&self, column: &str, needle: &str) -> Result<Option<RowId>> {
        for index in 0..self.table.len() {
            if self.table.get_str(index, column)? == Some(needle) {
                return Ok(RowId::try_from(index).ok());
            }
        }
        Ok(None)
    }

    /// Grow the table with default rows until it holds at least `len` rows.
    pub fn ensure_len(&mut self, len: usize) -> Result<()> {
        if len > MAX_ROWS {
            return Err(self.overflow());
        }
        while self.table.len() < len {
            let row = self.table.new_row();
            self.table.push_row(row);
        }
        Ok(())
    }

    /// Stable sort of the rows.
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&Row, &Row) -> Ordering,
    {
        self.table.sort_rows_by(compare);
    }
}
