//! The pluggable validator capability.

use std::sync::Arc;

use super::state::ValidationState;

/// Checks a raw cell value for a given column.
///
/// Implementations must be pure: the revalidation sweep calls `check`
/// rows × columns times on whichever thread replaced the validator, so a
/// call must neither block nor mutate shared state.
pub trait Validator: Send + Sync {
    fn check(&self, column: &str, value: &str) -> ValidationState;
}

/// Shared reference to the active validator. Every cell of a table holds a
/// clone of the same handle; `None` means no rules are loaded.
pub type ValidatorHandle = Arc<dyn Validator>;

impl<F> Validator for F
where
    F: Fn(&str, &str) -> ValidationState + Send + Sync,
{
    fn check(&self, column: &str, value: &str) -> ValidationState {
        self(column, value)
    }
}

/// Run `validator` if one is attached, otherwise report the value as valid.
pub fn check_with(validator: Option<&ValidatorHandle>, column: &str, value: &str) -> ValidationState {
    match validator {
        Some(validator) => validator.check(column, value),
        None => ValidationState::valid(),
    }
}

/// Wrap any validator into a shareable handle.
pub fn handle<V: Validator + 'static>(validator: V) -> ValidatorHandle {
    Arc::new(validator)
}
