//! Row
//!
//! One record of the table: its cells in header order, tagged with the
//! position it was appended at.

use std::fmt;

use super::value::ValueCell;
use crate::validation::ValidatorHandle;

/// Ordered mapping from column name to [`ValueCell`].
///
/// Column names are unique and kept in insertion order, which is the
/// header order of the owning table.
#[derive(Clone)]
pub struct Row {
    row_number: usize,
    cells: Vec<ValueCell>,
    validator: Option<ValidatorHandle>,
}

impl Row {
    pub(crate) fn new(row_number: usize, validator: Option<ValidatorHandle>) -> Self {
        Self {
            row_number,
            cells: Vec::new(),
            validator,
        }
    }

    pub fn row_number(&self) -> usize {
        self.row_number
    }

    pub fn set_row_number(&mut self, row_number: usize) {
        self.row_number = row_number;
    }

    /// Append a cell for `column`, validated against the row's validator.
    ///
    /// Each column may be added once; the table's header decides which.
    pub(crate) fn add_value(&mut self, column: impl Into<String>, value: impl Into<String>) -> &mut ValueCell {
        let column = column.into();
        debug_assert!(
            self.cell(&column).is_none(),
            "column '{column}' added twice to row {}",
            self.row_number
        );

        self.cells
            .push(ValueCell::new(column, value, self.validator.clone()));
        let last = self.cells.len() - 1;
        &mut self.cells[last]
    }

    /// Cells in header order.
    pub fn cells(&self) -> &[ValueCell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [ValueCell] {
        &mut self.cells
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|cell| cell.column())
    }

    pub fn cell(&self, column: &str) -> Option<&ValueCell> {
        self.cells.iter().find(|cell| cell.column() == column)
    }

    pub fn cell_mut(&mut self, column: &str) -> Option<&mut ValueCell> {
        self.cells.iter_mut().find(|cell| cell.column() == column)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        self.cells.iter().all(ValueCell::is_valid)
    }

    /// Point the row and every owned cell at `validator`.
    ///
    /// Does not recompute; the table sweep revalidates each cell right after.
    pub(crate) fn set_validator(&mut self, validator: Option<ValidatorHandle>) {
        for cell in &mut self.cells {
            cell.set_validator(validator.clone());
        }
        self.validator = validator;
    }
}

impl fmt::Debug for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Row")
            .field("row_number", &self.row_number)
            .field("cells", &self.cells)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{ValidationState, handle};

    #[test]
    fn test_add_value_keeps_header_order() {
        let mut row = Row::new(0, None);
        row.add_value("name", "Bob");
        row.add_value("age", "nine");
        row.add_value("city", "Oslo");

        let names: Vec<&str> = row.column_names().collect();
        assert_eq!(names, vec!["name", "age", "city"]);
        assert_eq!(row.cell("age").map(ValueCell::value), Some("nine"));
        assert!(row.cell("zip").is_none());
    }

    #[test]
    fn test_add_value_uses_row_validator() {
        let validator = handle(|_: &str, value: &str| {
            if value.is_empty() {
                ValidationState::invalid("empty")
            } else {
                ValidationState::valid()
            }
        });
        let mut row = Row::new(3, Some(validator));

        assert!(!row.add_value("a", "").is_valid());
        assert!(row.add_value("b", "x").is_valid());
        assert!(!row.is_valid());
        assert_eq!(row.row_number(), 3);
    }

    #[test]
    fn test_cell_mut_edit() {
        let mut row = Row::new(0, None);
        row.add_value("name", "Bob");

        row.cell_mut("name").unwrap().set_value("Alice");
        assert_eq!(row.cell("name").unwrap().value(), "Alice");
    }

    #[test]
    #[should_panic(expected = "added twice")]
    #[cfg(debug_assertions)]
    fn test_duplicate_column_is_rejected() {
        let mut row = Row::new(0, None);
        row.add_value("name", "Bob");
        row.add_value("name", "Alice");
    }
}
