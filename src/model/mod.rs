//! Tabular data model
//!
//! Table, rows and cells, kept consistent with the active validator.

pub mod row;
pub mod table;
pub mod value;

pub use row::Row;
pub use table::{InvalidCell, TableModel};
pub use value::ValueCell;
