//! Table Model
//!
//! Single source of truth for an open document: header, rows, file path
//! and the active validator. Replacing the validator resyncs every cell.

use std::fmt;
use std::path::{Path, PathBuf};

use super::row::Row;
use super::value::ValueCell;
use crate::error::{Error, Result};
use crate::validation::ValidatorHandle;

/// In-memory representation of one CSV document.
#[derive(Clone, Default)]
pub struct TableModel {
    rows: Vec<Row>,
    header: Vec<String>,
    filepath: PathBuf,
    validator: Option<ValidatorHandle>,
}

/// An invalid cell together with the row it lives in.
#[derive(Debug, Clone, Copy)]
pub struct InvalidCell<'a> {
    pub row_number: usize,
    pub cell: &'a ValueCell,
}

impl TableModel {
    pub fn new(filepath: impl Into<PathBuf>) -> Self {
        Self {
            filepath: filepath.into(),
            ..Self::default()
        }
    }

    /// Build a model from reader output.
    ///
    /// Every record must have exactly one value per header column.
    pub fn from_records<I, R>(filepath: impl Into<PathBuf>, header: Vec<String>, records: I) -> Result<Self>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = String>,
    {
        let mut model = Self::new(filepath);
        model.set_header(header);

        for record in records {
            model.push_record(record)?;
        }

        Ok(model)
    }

    pub fn filepath(&self) -> &Path {
        &self.filepath
    }

    pub fn set_filepath(&mut self, filepath: impl Into<PathBuf>) {
        self.filepath = filepath.into();
    }

    /// Replace the column headers.
    ///
    /// Call once per load, before any row is added.
    pub fn set_header(&mut self, header: Vec<String>) {
        self.header = header;
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn row_mut(&mut self, index: usize) -> Option<&mut Row> {
        self.rows.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append an empty row bound to the active validator.
    ///
    /// The new row's number is the row count before insertion.
    pub fn add_row(&mut self) -> &mut Row {
        let row = Row::new(self.rows.len(), self.validator.clone());
        self.rows.push(row);
        let last = self.rows.len() - 1;
        &mut self.rows[last]
    }

    /// Append a row holding one value per header column, in header order.
    ///
    /// A record of the wrong width is rejected and the model is unchanged.
    pub fn push_record<I>(&mut self, values: I) -> Result<&mut Row>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.len() != self.header.len() {
            return Err(Error::StructureMismatch {
                row: self.rows.len(),
                expected: self.header.len(),
                found: values.len(),
            });
        }

        let mut row = Row::new(self.rows.len(), self.validator.clone());
        for (column, value) in self.header.iter().zip(values) {
            row.add_value(column.as_str(), value);
        }
        self.rows.push(row);
        let last = self.rows.len() - 1;
        Ok(&mut self.rows[last])
    }

    pub fn validator(&self) -> Option<&ValidatorHandle> {
        self.validator.as_ref()
    }

    /// Replace the active validator and revalidate every cell.
    pub fn set_validator(&mut self, validator: Option<ValidatorHandle>) {
        self.validator = validator;
        self.revalidate();
    }

    /// Walk the whole table, rebinding each cell to the active validator
    /// and recomputing its state. O(rows × columns), runs to completion.
    fn revalidate(&mut self) {
        log::debug!(
            "revalidating {} rows x {} columns (validator: {})",
            self.rows.len(),
            self.header.len(),
            if self.validator.is_some() { "set" } else { "none" }
        );

        for row in &mut self.rows {
            row.set_validator(self.validator.clone());
            for cell in row.cells_mut() {
                cell.revalidate();
            }
        }
    }

    /// Edit one cell. Returns `false` if the row or column does not exist.
    pub fn set_value(&mut self, row: usize, column: &str, value: impl Into<String>) -> bool {
        match self.rows.get_mut(row).and_then(|r| r.cell_mut(column)) {
            Some(cell) => {
                cell.set_value(value);
                true
            }
            None => false,
        }
    }

    /// Every invalid cell in document order.
    pub fn invalid_cells(&self) -> impl Iterator<Item = InvalidCell<'_>> {
        self.rows.iter().flat_map(|row| {
            row.cells()
                .iter()
                .filter(|cell| !cell.is_valid())
                .map(move |cell| InvalidCell {
                    row_number: row.row_number(),
                    cell,
                })
        })
    }

    pub fn invalid_count(&self) -> usize {
        self.invalid_cells().count()
    }

    pub fn is_valid(&self) -> bool {
        self.rows.iter().all(Row::is_valid)
    }

    /// Values of every row in header order, as handed to a writer.
    pub fn records(&self) -> impl Iterator<Item = Vec<&str>> + '_ {
        self.rows.iter().map(move |row| {
            self.header
                .iter()
                .map(|column| row.cell(column).map(ValueCell::value).unwrap_or_default())
                .collect()
        })
    }
}

impl fmt::Debug for TableModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableModel")
            .field("filepath", &self.filepath)
            .field("header", &self.header)
            .field("rows", &self.rows.len())
            .field("has_validator", &self.validator.is_some())
            .finish()
    }
}
