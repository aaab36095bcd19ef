//! Rule file watching for live reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

/// Events from the rule file watcher
#[derive(Debug)]
pub enum RuleEvent {
    Changed(PathBuf),
    WatcherError(notify::Error),
}

/// Watches one rule file and reports changes over a channel.
///
/// The parent directory is watched so that editors which save by
/// replacing the file are still noticed. Dropping the watcher stops it.
pub struct RuleWatcher {
    _watcher: RecommendedWatcher,
}

impl RuleWatcher {
    pub fn new(path: &Path) -> Result<(Self, mpsc::UnboundedReceiver<RuleEvent>)> {
        let path = std::path::absolute(path)
            .with_context(|| format!("Failed to resolve rule file path: {}", path.display()))?;
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .context("Rule file has no parent directory")?;
        let file_name = path.file_name().map(|n| n.to_os_string());

        let (tx, rx) = mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) => {
                    if let EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) =
                        event.kind
                    {
                        for changed in event.paths {
                            if changed.file_name().map(|n| n.to_os_string()) == file_name {
                                let _ = tx.send(RuleEvent::Changed(changed));
                            }
                        }
                    }
                }
                Err(e) => {
                    let _ = tx.send(RuleEvent::WatcherError(e));
                }
            },
            Config::default().with_poll_interval(Duration::from_secs(1)),
        )?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", dir.display()))?;

        log::info!("Watching rule file {}", path.display());

        Ok((Self { _watcher: watcher }, rx))
    }
}
