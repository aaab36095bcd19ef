//! Value Cell
//!
//! The smallest validated unit and the only place a validator is invoked.

use std::fmt;

use crate::validation::{ValidationState, ValidatorHandle, check_with};

/// One column's value within one row.
///
/// `state` always equals `check(column, value)` under the attached
/// validator once any public method returns.
#[derive(Clone)]
pub struct ValueCell {
    column: String,
    value: String,
    state: ValidationState,
    validator: Option<ValidatorHandle>,
}

impl ValueCell {
    /// Create a cell and validate its initial value right away.
    pub fn new(
        column: impl Into<String>,
        value: impl Into<String>,
        validator: Option<ValidatorHandle>,
    ) -> Self {
        let column = column.into();
        let value = value.into();
        let state = check_with(validator.as_ref(), &column, &value);

        Self {
            column,
            value,
            state,
            validator,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn state(&self) -> &ValidationState {
        &self.state
    }

    pub fn is_valid(&self) -> bool {
        self.state.valid
    }

    pub fn has_validator(&self) -> bool {
        self.validator.is_some()
    }

    /// Store a new raw value and recompute the state against it.
    ///
    /// This is the only recomputation path for user edits.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.revalidate();
    }

    /// Swap the validator reference without recomputing.
    ///
    /// Must be paired with [`ValueCell::revalidate`] before control leaves
    /// the sweep.
    pub(crate) fn set_validator(&mut self, validator: Option<ValidatorHandle>) {
        self.validator = validator;
    }

    pub(crate) fn revalidate(&mut self) {
        self.state = check_with(self.validator.as_ref(), &self.column, &self.value);
    }
}

impl fmt::Debug for ValueCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueCell")
            .field("column", &self.column)
            .field("value", &self.value)
            .field("state", &self.state)
            .field("has_validator", &self.validator.is_some())
            .finish()
    }
}
