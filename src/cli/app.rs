use std::io::Write;
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};

use super::report::{write_event, write_report};
use crate::config::Config;
use crate::editor::{Editor, EditorEvent};

/// Parse the command line and run one session.
pub async fn run() -> Result<ExitCode> {
    let config = Config::from_args_and_env()?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .init();

    if let Some(path) = &config.project_config_path {
        log::debug!("Using project config {}", path.display());
    }

    let mut stdout = std::io::stdout();
    run_with_config(&config, &mut stdout).await
}

/// Load, edit, report and optionally save according to `config`.
///
/// Exits with status 1 while invalid cells remain.
pub async fn run_with_config<W: Write>(config: &Config, out: &mut W) -> Result<ExitCode> {
    let mut editor = Editor::with_delimiter(config.delimiter);

    if let Some(rules) = config.resolve_rules_path()? {
        editor.open_rules(rules);
    }
    editor.open_document(&config.file);
    drain(&mut editor, out).await?;

    for edit in &config.edits {
        let state = editor
            .edit(edit.row, &edit.column, edit.value.as_str())
            .with_context(|| format!("Failed to apply edit to row {}", edit.row))?;
        writeln!(
            out,
            "set row {}, column '{}' = '{}' ({})",
            edit.row,
            edit.column,
            edit.value,
            if state.valid { "valid" } else { "invalid" }
        )?;
    }

    if let Some(output) = &config.output {
        editor.save_as(output)?;
        drain(&mut editor, out).await?;
    }

    let model = editor.model().context("No document loaded")?;
    write_report(out, model)?;

    if config.watch {
        watch(&mut editor, out).await?;
    }

    let valid = editor.model().is_some_and(|m| m.is_valid());
    Ok(if valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

/// Apply results until no operation is in flight; the first failure aborts.
async fn drain<W: Write>(editor: &mut Editor, out: &mut W) -> Result<()> {
    while let Some(event) = editor.next_event().await {
        write_event(out, &event)?;
        if let EditorEvent::Failed { operation, error } = event {
            return Err(anyhow!(error).context(format!("{:?} failed", operation)));
        }
    }
    Ok(())
}

/// Re-report after every rule reload until Ctrl-C.
async fn watch<W: Write>(editor: &mut Editor, out: &mut W) -> Result<()> {
    if editor.rules_path().is_none() {
        log::warn!("--watch given without a rule file, nothing to watch");
        return Ok(());
    }
    editor.watch_rules()?;
    writeln!(out, "watching rules, press Ctrl-C to stop")?;
    out.flush()?;

    loop {
        let event = tokio::select! {
            _ = tokio::signal::ctrl_c() => None,
            event = editor.next_event() => event,
        };
        let Some(event) = event else { break };

        write_event(out, &event)?;
        if let EditorEvent::RulesLoaded { .. } = event {
            if let Some(model) = editor.model() {
                write_report(out, model)?;
            }
        }
        out.flush()?;
    }

    Ok(())
}
