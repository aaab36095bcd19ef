//! Document and rule file I/O
//!
//! Capabilities the editor consumes for moving data on and off disk. The
//! traits keep the session independent of the concrete file formats.

pub mod reader;
pub mod writer;

use std::path::Path;

use crate::error::Result;
use crate::model::TableModel;
use crate::validation::ValidatorHandle;

pub use reader::CsvFileReader;
pub use writer::CsvFileWriter;

/// Loads a document into a fresh model.
pub trait DocumentReader: Send + Sync {
    fn read(&self, path: &Path) -> Result<TableModel>;
}

/// Persists a model.
pub trait DocumentWriter: Send + Sync {
    fn write(&self, path: &Path, model: &TableModel) -> Result<()>;
}

/// Parses a rule definition file into a validator.
pub trait RuleReader: Send + Sync {
    fn read(&self, path: &Path) -> Result<ValidatorHandle>;
}
