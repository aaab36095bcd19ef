//! Editing session
//!
//! The presentation-side owner of the open document: starts background
//! loads and saves, applies their results, and routes cell edits.

pub mod events;
pub mod session;

pub use events::{EditorEvent, Operation};
pub use session::Editor;
