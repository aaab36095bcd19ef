use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use tokio::sync::mpsc;

use crate::error::Error;
use crate::io::{CsvFileReader, CsvFileWriter, DocumentReader, DocumentWriter, RuleReader};
use crate::model::TableModel;
use crate::rules::{RuleEvent, RuleFileReader, RuleWatcher};
use crate::service::{Completion, Service};
use crate::validation::{ValidationState, ValidatorHandle};

/// Rules produced by the rule loading service
pub(crate) struct LoadedRules {
    pub path: PathBuf,
    pub validator: ValidatorHandle,
}

/// Headless editing session for one document at a time.
///
/// Owns the open [`TableModel`], the active rules and one background
/// service per operation kind. Completions are applied on the task that
/// drives [`Editor::next_event`], so the model is only ever touched there.
pub struct Editor {
    pub(crate) model: Option<TableModel>,
    pub(crate) validator: Option<ValidatorHandle>,
    pub(crate) rules_path: Option<PathBuf>,

    pub(crate) document_reader: Arc<dyn DocumentReader>,
    pub(crate) document_writer: Arc<dyn DocumentWriter>,
    pub(crate) rule_reader: Arc<dyn RuleReader>,

    pub(crate) document_service: Service<TableModel>,
    pub(crate) document_rx: mpsc::UnboundedReceiver<Completion<TableModel>>,
    pub(crate) rules_service: Service<LoadedRules>,
    pub(crate) rules_rx: mpsc::UnboundedReceiver<Completion<LoadedRules>>,
    pub(crate) save_service: Service<PathBuf>,
    pub(crate) save_rx: mpsc::UnboundedReceiver<Completion<PathBuf>>,

    pub(crate) watcher: Option<(RuleWatcher, mpsc::UnboundedReceiver<RuleEvent>)>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    /// Session reading and writing comma separated files.
    pub fn new() -> Self {
        Self::with_delimiter(b',')
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self::with_io(
            Arc::new(CsvFileReader::new(delimiter)),
            Arc::new(CsvFileWriter::new(delimiter)),
            Arc::new(RuleFileReader),
        )
    }

    /// Session with custom collaborators.
    pub fn with_io(
        document_reader: Arc<dyn DocumentReader>,
        document_writer: Arc<dyn DocumentWriter>,
        rule_reader: Arc<dyn RuleReader>,
    ) -> Self {
        let (document_service, document_rx) = Service::new("load-document");
        let (rules_service, rules_rx) = Service::new("load-rules");
        let (save_service, save_rx) = Service::new("save");

        Self {
            model: None,
            validator: None,
            rules_path: None,
            document_reader,
            document_writer,
            rule_reader,
            document_service,
            document_rx,
            rules_service,
            rules_rx,
            save_service,
            save_rx,
            watcher: None,
        }
    }

    pub fn model(&self) -> Option<&TableModel> {
        self.model.as_ref()
    }

    pub fn validator(&self) -> Option<&ValidatorHandle> {
        self.validator.as_ref()
    }

    pub fn rules_path(&self) -> Option<&Path> {
        self.rules_path.as_deref()
    }

    /// Whether any background operation is still in flight.
    pub fn is_busy(&self) -> bool {
        self.document_service.is_running()
            || self.rules_service.is_running()
            || self.save_service.is_running()
    }

    /// Start loading a document. Supersedes a load already in flight.
    pub fn open_document(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        let reader = self.document_reader.clone();

        log::info!("Opening {}", path.display());
        self.document_service
            .restart_blocking(move || reader.read(&path));
    }

    /// Start loading a rule file. Supersedes a rule load already in flight.
    pub fn open_rules(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        let reader = self.rule_reader.clone();

        log::info!("Loading rules from {}", path.display());
        self.rules_service.restart_blocking(move || {
            let validator = reader.read(&path)?;
            Ok(LoadedRules { path, validator })
        });
    }

    /// Drop the active rules; every cell becomes valid.
    pub fn clear_rules(&mut self) {
        self.rules_service.cancel();
        self.watcher = None;
        self.rules_path = None;
        self.validator = None;
        if let Some(model) = &mut self.model {
            model.set_validator(None);
        }
    }

    /// Save the open document to its own file path.
    pub fn save(&mut self) -> Result<()> {
        let path = self
            .model
            .as_ref()
            .ok_or(Error::NoDocument)?
            .filepath()
            .to_path_buf();
        self.save_to(path)
    }

    /// Save the open document to a new file path.
    ///
    /// The document takes the new path only once the write has succeeded.
    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        self.save_to(path.into())
    }

    fn save_to(&mut self, path: PathBuf) -> Result<()> {
        let snapshot = self.model.as_ref().ok_or(Error::NoDocument)?.clone();
        let writer = self.document_writer.clone();

        log::info!("Saving {}", path.display());
        self.save_service.restart_blocking(move || {
            writer.write(&path, &snapshot)?;
            Ok(path)
        });

        Ok(())
    }

    /// Commit a user edit to one cell and return its new state.
    pub fn edit(&mut self, row: usize, column: &str, value: impl Into<String>) -> Result<&ValidationState> {
        let model = self.model.as_mut().ok_or(Error::NoDocument)?;
        let cell = model
            .row_mut(row)
            .with_context(|| format!("Row {} does not exist", row))?
            .cell_mut(column)
            .ok_or_else(|| anyhow!("Column '{}' does not exist", column))?;

        cell.set_value(value);
        log::debug!(
            "Edited row {} column '{}': valid={}",
            row,
            column,
            cell.is_valid()
        );
        Ok(cell.state())
    }

    /// Reload the rule file whenever it changes on disk.
    pub fn watch_rules(&mut self) -> Result<()> {
        let path = self
            .rules_path
            .clone()
            .context("No rule file loaded to watch")?;
        self.watcher = Some(RuleWatcher::new(&path)?);
        Ok(())
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    /// Close the document and abandon pending operations on it.
    pub fn close(&mut self) {
        self.document_service.cancel();
        self.save_service.cancel();
        self.model = None;
    }
}
