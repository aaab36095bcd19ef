//! Validation contract
//!
//! The outcome type and the validator capability shared by every cell.

pub mod state;
pub mod validator;

pub use state::ValidationState;
pub use validator::{Validator, ValidatorHandle, check_with, handle};
