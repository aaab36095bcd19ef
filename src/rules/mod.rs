//! Rule files
//!
//! Column rules loaded from JSON or TOML files, the validator they form,
//! and a watcher for reloading them when the file changes.

pub mod loader;
pub mod schema;
pub mod watcher;

pub use loader::{RuleFileReader, RuleFormat, parse_rules, read_rule_file};
pub use schema::{ColumnRule, RuleFile, RuleValidator};
pub use watcher::{RuleEvent, RuleWatcher};
