//! smartcsv
//!
//! CSV editing with pluggable, column-level validation.
//!
//! This library provides:
//! - A table model whose cells always reflect the active validator
//! - Rule-file-backed validators (JSON or TOML) with live reload
//! - CSV reading/writing and restartable background load/save
//! - A headless editor session and a command-line front end

pub mod cli;
pub mod config;
pub mod editor;
pub mod error;
pub mod io;
pub mod model;
pub mod rules;
pub mod service;
pub mod validation;

// Re-exports for clean public API
pub use config::Config;
pub use editor::{Editor, EditorEvent};
pub use error::{Error, Result};
pub use model::{Row, TableModel, ValueCell};
pub use rules::RuleValidator;
pub use validation::{ValidationState, Validator, ValidatorHandle};
