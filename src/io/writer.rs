//! CSV file writing.

use std::path::Path;

use super::DocumentWriter;
use crate::error::{Error, Result};
use crate::model::TableModel;

/// Writes the header followed by every row in model order.
#[derive(Debug, Clone, Copy)]
pub struct CsvFileWriter {
    delimiter: u8,
}

impl Default for CsvFileWriter {
    fn default() -> Self {
        Self::new(b',')
    }
}

impl CsvFileWriter {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    pub fn write_to<W: std::io::Write>(&self, output: W, path: &Path, model: &TableModel) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(output);

        writer
            .write_record(model.header())
            .map_err(|e| Error::csv(path, e))?;
        for record in model.records() {
            writer
                .write_record(&record)
                .map_err(|e| Error::csv(path, e))?;
        }
        writer.flush().map_err(|e| Error::io(path, e))?;

        Ok(())
    }
}

impl DocumentWriter for CsvFileWriter {
    /// Write next to `path`, then rename over it. A failed write leaves
    /// the existing file as it was.
    fn write(&self, path: &Path, model: &TableModel) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut file = tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::io(path, e))?;
        self.write_to(std::io::BufWriter::new(file.as_file_mut()), path, model)?;
        file.persist(path).map_err(|e| Error::io(path, e.error))?;

        log::info!("Wrote {} rows to {}", model.len(), path.display());
        Ok(())
    }
}
