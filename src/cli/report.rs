//! Plain-text rendering of validation results.

use std::io::{self, Write};

use crate::editor::EditorEvent;
use crate::model::TableModel;

/// Print every invalid cell followed by a one-line summary.
pub fn write_report<W: Write>(out: &mut W, model: &TableModel) -> io::Result<()> {
    let mut invalid = 0;
    for entry in model.invalid_cells() {
        invalid += 1;
        writeln!(
            out,
            "row {}, column '{}': '{}' - {}",
            entry.row_number,
            entry.cell.column(),
            entry.cell.value(),
            entry.cell.state().summary()
        )?;
    }

    if invalid == 0 {
        writeln!(
            out,
            "{}: all {} rows valid",
            model.filepath().display(),
            model.len()
        )
    } else {
        writeln!(
            out,
            "{}: {} invalid cells in {} rows",
            model.filepath().display(),
            invalid,
            model.len()
        )
    }
}

/// One status line per session event.
pub fn write_event<W: Write>(out: &mut W, event: &EditorEvent) -> io::Result<()> {
    match event {
        EditorEvent::DocumentLoaded { path, rows, invalid } => writeln!(
            out,
            "opened {} ({} rows, {} invalid cells)",
            path.display(),
            rows,
            invalid
        ),
        EditorEvent::RulesLoaded { path, invalid } => writeln!(
            out,
            "rules {} active ({} invalid cells)",
            path.display(),
            invalid
        ),
        EditorEvent::Saved { path } => writeln!(out, "saved {}", path.display()),
        EditorEvent::RulesChanged { path } => {
            writeln!(out, "rules {} changed, reloading", path.display())
        }
        EditorEvent::Failed { operation, error } => {
            writeln!(out, "{:?} failed: {}", operation, error)
        }
    }
}
