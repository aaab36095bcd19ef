//! CSV file reading.

use std::path::Path;

use super::DocumentReader;
use crate::error::{Error, Result};
use crate::model::TableModel;

/// Reads delimited text where the first record is the header.
#[derive(Debug, Clone, Copy)]
pub struct CsvFileReader {
    delimiter: u8,
}

impl Default for CsvFileReader {
    fn default() -> Self {
        Self::new(b',')
    }
}

impl CsvFileReader {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// Parse CSV from any reader; `path` becomes the model's file path.
    pub fn read_from<R: std::io::Read>(&self, input: R, path: &Path) -> Result<TableModel> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .from_reader(input);

        let header: Vec<String> = reader
            .headers()
            .map_err(|e| Error::csv(path, e))?
            .iter()
            .map(str::to_string)
            .collect();

        let records = reader
            .records()
            .map(|record| {
                record
                    .map(|r| r.iter().map(str::to_string).collect::<Vec<_>>())
                    .map_err(|e| match e.kind() {
                        csv::ErrorKind::UnequalLengths {
                            pos, expected_len, len,
                        } => Error::StructureMismatch {
                            row: pos
                                .as_ref()
                                .map(|p| p.record().saturating_sub(1) as usize)
                                .unwrap_or_default(),
                            expected: *expected_len as usize,
                            found: *len as usize,
                        },
                        _ => Error::csv(path, e),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let model = TableModel::from_records(path, header, records)?;
        log::info!(
            "Read {} rows x {} columns from {}",
            model.len(),
            model.header().len(),
            path.display()
        );
        Ok(model)
    }
}

impl DocumentReader for CsvFileReader {
    fn read(&self, path: &Path) -> Result<TableModel> {
        let file = std::fs::File::open(path).map_err(|e| Error::io(path, e))?;
        self.read_from(std::io::BufReader::new(file), path)
    }
}
