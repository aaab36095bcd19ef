//! Error kinds of the document and rule-file collaborators.
//!
//! The validation core itself never fails; these cover file I/O, parsing
//! and structural problems in loaded data.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read or write a file.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV content.
    #[error("failed to process CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A record does not have one value per header column.
    #[error("row {row} has {found} values, header has {expected} columns")]
    StructureMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// The rule file could not be parsed.
    #[error("failed to parse rule file {path}: {message}")]
    RuleParse { path: PathBuf, message: String },

    /// A rule is well-formed but unusable, e.g. a bad regular expression.
    #[error("invalid rule for column '{column}': {message}")]
    InvalidRule { column: String, message: String },

    /// Rule files must be `.json` or `.toml`.
    #[error("unsupported rule file format: {path}")]
    UnsupportedRuleFormat { path: PathBuf },

    /// Save requested with no document open.
    #[error("no document is open")]
    NoDocument,

    /// The background run was superseded or aborted.
    #[error("operation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}
