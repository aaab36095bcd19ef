//! Rule File Schema
//!
//! Per-column rule definitions as written in JSON or TOML rule files, and
//! the compiled, lookup-ready form used for checking cells.

use std::collections::HashMap;

use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::validation::{ValidationState, Validator};

/// Root rule file structure.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RuleFile {
    #[serde(default)]
    pub columns: HashMap<String, ColumnRule>,
}

/// Rules for one column. Every rule is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ColumnRule {
    #[serde(default, alias = "not empty")]
    pub not_empty: bool,
    #[serde(default)]
    pub integer: bool,
    #[serde(default)]
    pub double: bool,
    #[serde(default)]
    pub alphanumeric: bool,
    pub minlength: Option<usize>,
    pub maxlength: Option<usize>,
    /// strftime pattern, e.g. `%Y-%m-%d`
    pub date: Option<String>,
    pub regexp: Option<String>,
    #[serde(alias = "value of")]
    pub value_of: Option<Vec<String>>,
}

/// A column rule with its pattern compiled.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    rule: ColumnRule,
    regexp: Option<Regex>,
}

impl ColumnRule {
    pub fn compile(self, column: &str) -> Result<CompiledRule> {
        let regexp = self
            .regexp
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|e| Error::InvalidRule {
                column: column.to_string(),
                message: e.to_string(),
            })?;

        Ok(CompiledRule { rule: self, regexp })
    }
}

impl CompiledRule {
    /// Check a raw value, collecting one message per failed rule.
    ///
    /// Only `not_empty` looks at empty values; every other rule applies to
    /// non-empty input.
    pub fn check(&self, column: &str, value: &str) -> ValidationState {
        let mut state = ValidationState::valid();
        let rule = &self.rule;

        if value.is_empty() {
            if rule.not_empty {
                state.add_message(format!("Column '{}' must not be empty", column));
            }
            return state;
        }

        if rule.integer && value.parse::<i64>().is_err() {
            state.add_message(format!(
                "Column '{}' expects an integer, got '{}'",
                column, value
            ));
        }

        if rule.double && value.parse::<f64>().is_err() {
            state.add_message(format!(
                "Column '{}' expects a number, got '{}'",
                column, value
            ));
        }

        if rule.alphanumeric && !value.chars().all(char::is_alphanumeric) {
            state.add_message(format!(
                "Column '{}' allows only letters and digits, got '{}'",
                column, value
            ));
        }

        let length = value.chars().count();
        if let Some(min) = rule.minlength {
            if length < min {
                state.add_message(format!(
                    "Column '{}' value is shorter than {} characters",
                    column, min
                ));
            }
        }
        if let Some(max) = rule.maxlength {
            if length > max {
                state.add_message(format!(
                    "Column '{}' value is longer than {} characters",
                    column, max
                ));
            }
        }

        if let Some(format) = &rule.date {
            if NaiveDate::parse_from_str(value, format).is_err() {
                state.add_message(format!(
                    "Column '{}' expects a date in format '{}', got '{}'",
                    column, format, value
                ));
            }
        }

        if let Some(regexp) = &self.regexp {
            if !regexp.is_match(value) {
                state.add_message(format!(
                    "Column '{}' value '{}' does not match '{}'",
                    column,
                    value,
                    regexp.as_str()
                ));
            }
        }

        if let Some(allowed) = &rule.value_of {
            if !allowed.iter().any(|v| v == value) {
                state.add_message(format!(
                    "Column '{}' value '{}' is not one of: {}",
                    column,
                    value,
                    allowed.join(", ")
                ));
            }
        }

        state
    }
}

/// Validator backed by a parsed rule file.
///
/// Columns without rules accept everything.
#[derive(Debug, Clone, Default)]
pub struct RuleValidator {
    columns: HashMap<String, CompiledRule>,
}

impl TryFrom<RuleFile> for RuleValidator {
    type Error = Error;

    fn try_from(file: RuleFile) -> Result<Self> {
        let columns = file
            .columns
            .into_iter()
            .map(|(name, rule)| {
                let compiled = rule.compile(&name)?;
                Ok((name, compiled))
            })
            .collect::<Result<HashMap<_, _>>>()?;

        Ok(Self { columns })
    }
}

impl RuleValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Columns that carry rules, sorted.
    pub fn columns(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.columns.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Validator for RuleValidator {
    fn check(&self, column: &str, value: &str) -> ValidationState {
        match self.columns.get(column) {
            Some(rule) => rule.check(column, value),
            None => ValidationState::valid(),
        }
    }
}
