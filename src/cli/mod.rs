//! Command-line front end
//!
//! Drives an [`Editor`](crate::editor::Editor) session from the
//! configuration and prints validation reports.

pub mod app;
pub mod report;

pub use app::{run, run_with_config};
