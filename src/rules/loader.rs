//! Rule file loading.
//!
//! Reads JSON (`*.json`) or TOML (`*.toml`) rule files into a shareable
//! [`RuleValidator`] handle.

use std::path::Path;
use std::sync::Arc;

use super::schema::{RuleFile, RuleValidator};
use crate::error::{Error, Result};
use crate::io::RuleReader;
use crate::validation::ValidatorHandle;

/// Supported rule file syntaxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleFormat {
    Json,
    Toml,
}

impl RuleFormat {
    /// Pick the syntax from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Some(Self::Json),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Some(Self::Toml),
            _ => None,
        }
    }
}

/// Parse rule file content.
pub fn parse_rules(content: &str, format: RuleFormat, path: &Path) -> Result<RuleValidator> {
    let file: RuleFile = match format {
        RuleFormat::Json => serde_json::from_str(content).map_err(|e| Error::RuleParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?,
        RuleFormat::Toml => toml::from_str(content).map_err(|e| Error::RuleParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?,
    };

    RuleValidator::try_from(file)
}

/// Reads a rule file from disk.
pub fn read_rule_file(path: &Path) -> Result<RuleValidator> {
    let format = RuleFormat::from_path(path).ok_or_else(|| Error::UnsupportedRuleFormat {
        path: path.to_path_buf(),
    })?;

    let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let validator = parse_rules(&content, format, path)?;

    log::info!(
        "Loaded rules for {} columns from {}",
        validator.columns().len(),
        path.display()
    );
    Ok(validator)
}

/// The rule-file reader capability backed by the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleFileReader;

impl RuleReader for RuleFileReader {
    fn read(&self, path: &Path) -> Result<ValidatorHandle> {
        Ok(Arc::new(read_rule_file(path)?))
    }
}
