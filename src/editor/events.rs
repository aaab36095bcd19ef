use std::path::PathBuf;

use tokio::sync::mpsc::error::TryRecvError;

use super::session::{Editor, LoadedRules};
use crate::error::Error;
use crate::model::TableModel;
use crate::rules::RuleEvent;
use crate::service::Completion;

/// Kind of background operation that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    LoadDocument,
    LoadRules,
    Save,
}

/// What happened to the session, in the order it was applied
#[derive(Debug)]
pub enum EditorEvent {
    /// A new document replaced the previous one.
    DocumentLoaded {
        path: PathBuf,
        rows: usize,
        invalid: usize,
    },
    /// New rules are active and the open document was revalidated.
    RulesLoaded { path: PathBuf, invalid: usize },
    Saved { path: PathBuf },
    /// The watched rule file changed; a reload has been started.
    RulesChanged { path: PathBuf },
    /// The operation failed; the session state is unchanged.
    Failed { operation: Operation, error: Error },
}

/// A completion taken from one of the session queues
enum Pending {
    Document(Completion<TableModel>),
    Rules(Completion<LoadedRules>),
    Save(Completion<PathBuf>),
    Watch(RuleEvent),
    WatchClosed,
}

impl Editor {
    /// Wait for the next background result and apply it to the session.
    ///
    /// Results of superseded runs are dropped without an event. Returns
    /// `None` once nothing is in flight and no rule file is watched.
    pub async fn next_event(&mut self) -> Option<EditorEvent> {
        loop {
            let pending = match self.try_pending() {
                Some(pending) => pending,
                None => {
                    if !self.is_busy() && self.watcher.is_none() {
                        return None;
                    } else {
                        self.wait_pending().await?
                    }
                }
            };

            if let Some(event) = self.apply(pending) {
                return Some(event);
            }
        }
    }

    /// Apply every result that is already available, without waiting.
    pub fn poll_events(&mut self) -> Vec<EditorEvent> {
        let mut events = Vec::new();
        while let Some(pending) = self.try_pending() {
            events.extend(self.apply(pending));
        }
        events
    }

    fn try_pending(&mut self) -> Option<Pending> {
        if let Ok(c) = self.document_rx.try_recv() {
            return Some(Pending::Document(c));
        }
        if let Ok(c) = self.rules_rx.try_recv() {
            return Some(Pending::Rules(c));
        }
        if let Ok(c) = self.save_rx.try_recv() {
            return Some(Pending::Save(c));
        }
        if let Some((_, rx)) = &mut self.watcher {
            match rx.try_recv() {
                Ok(event) => return Some(Pending::Watch(event)),
                Err(TryRecvError::Disconnected) => {
                    log::warn!("Rule watcher stopped");
                    self.watcher = None;
                }
                Err(TryRecvError::Empty) => {}
            }
        }
        None
    }

    async fn wait_pending(&mut self) -> Option<Pending> {
        let watcher = &mut self.watcher;
        let watch = async move {
            match watcher {
                Some((_, rx)) => rx.recv().await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            Some(c) = self.document_rx.recv() => Some(Pending::Document(c)),
            Some(c) = self.rules_rx.recv() => Some(Pending::Rules(c)),
            Some(c) = self.save_rx.recv() => Some(Pending::Save(c)),
            event = watch => Some(event.map_or(Pending::WatchClosed, Pending::Watch)),
            else => None,
        }
    }

    fn apply(&mut self, pending: Pending) -> Option<EditorEvent> {
        match pending {
            Pending::Document(c) => self.apply_document(c),
            Pending::Rules(c) => self.apply_rules(c),
            Pending::Save(c) => self.apply_save(c),
            Pending::Watch(event) => self.apply_watch(event),
            Pending::WatchClosed => {
                log::warn!("Rule watcher stopped");
                self.watcher = None;
                None
            }
        }
    }

    fn apply_document(&mut self, completion: Completion<TableModel>) -> Option<EditorEvent> {
        if !self.document_service.accept(&completion) {
            log::warn!("Discarding result of superseded document load");
            return None;
        }

        match completion.result {
            Ok(mut model) => {
                model.set_validator(self.validator.clone());
                let event = EditorEvent::DocumentLoaded {
                    path: model.filepath().to_path_buf(),
                    rows: model.len(),
                    invalid: model.invalid_count(),
                };
                self.model = Some(model);
                Some(event)
            }
            Err(error) => {
                log::error!("Failed to load document: {}", error);
                Some(EditorEvent::Failed {
                    operation: Operation::LoadDocument,
                    error,
                })
            }
        }
    }

    fn apply_rules(&mut self, completion: Completion<LoadedRules>) -> Option<EditorEvent> {
        if !self.rules_service.accept(&completion) {
            log::warn!("Discarding result of superseded rule load");
            return None;
        }

        match completion.result {
            Ok(LoadedRules { path, validator }) => {
                self.validator = Some(validator);
                self.rules_path = Some(path.clone());

                let invalid = match &mut self.model {
                    Some(model) => {
                        model.set_validator(self.validator.clone());
                        model.invalid_count()
                    }
                    None => 0,
                };
                Some(EditorEvent::RulesLoaded { path, invalid })
            }
            Err(error) => {
                log::error!("Failed to load rules: {}", error);
                Some(EditorEvent::Failed {
                    operation: Operation::LoadRules,
                    error,
                })
            }
        }
    }

    fn apply_save(&mut self, completion: Completion<PathBuf>) -> Option<EditorEvent> {
        if !self.save_service.accept(&completion) {
            log::warn!("Discarding result of superseded save");
            return None;
        }

        match completion.result {
            Ok(path) => {
                if let Some(model) = &mut self.model {
                    model.set_filepath(path.clone());
                }
                Some(EditorEvent::Saved { path })
            }
            Err(error) => {
                log::error!("Failed to save document: {}", error);
                Some(EditorEvent::Failed {
                    operation: Operation::Save,
                    error,
                })
            }
        }
    }

    fn apply_watch(&mut self, event: RuleEvent) -> Option<EditorEvent> {
        match event {
            RuleEvent::Changed(path) => {
                log::info!("Rule file changed: {}", path.display());
                let target = self.rules_path.clone().unwrap_or_else(|| path.clone());
                self.open_rules(target);
                Some(EditorEvent::RulesChanged { path })
            }
            RuleEvent::WatcherError(e) => {
                log::error!("Rule file watcher error: {}", e);
                None
            }
        }
    }
}
