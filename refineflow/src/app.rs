//! Shared context handed to every command.

use std::future::Future;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use crate::llm::LlmProcessor;
use crate::storage::ActivityStorage;
use crate::types::{ActivityState, AppConfig, Entry, EntryType};

/// What happened to the structured state after an entry was logged
#[derive(Debug, Clone, PartialEq)]
pub enum StateUpdate {
    Updated(ActivityState),
    /// The entry is in the log but the state was left as it was
    Unchanged,
}

pub struct App {
    pub config: AppConfig,
    pub storage: ActivityStorage,
    pub processor: LlmProcessor,
    runtime: tokio::runtime::Runtime,
    show_spinner: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let processor = LlmProcessor::new(&config.llm);
        Self::with_processor(config, processor)
    }

    pub fn with_processor(config: AppConfig, processor: LlmProcessor) -> Result<Self> {
        let data_dir = config.data_dir();
        let storage = ActivityStorage::new(&data_dir)
            .with_context(|| format!("Failed to open data dir {}", data_dir.display()))?;
        let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
        Ok(Self {
            config,
            storage,
            processor,
            runtime,
            show_spinner: true,
        })
    }

    pub fn without_spinner(mut self) -> Self {
        self.show_spinner = false;
        self
    }

    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Like [`App::block_on`], with a spinner on stderr while it runs.
    pub fn block_on_with_spinner<F: Future>(&self, message: &str, future: F) -> F::Output {
        if !self.show_spinner {
            return self.block_on(future);
        }
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));

        let output = self.block_on(future);
        spinner.finish_and_clear();
        output
    }

    /// The entry kind to use when the user did not pick one: the LLM's guess
    /// when it can make one, else note.
    pub fn classify(&self, content: &str) -> EntryType {
        if !self.processor.is_available() {
            return EntryType::Note;
        }
        match self.block_on_with_spinner(
            "Classifying entry...",
            self.processor.classify_entry_type(content),
        ) {
            Ok(entry_type) => entry_type,
            Err(e) => {
                warn!("Entry classification failed, using note: {}", e);
                EntryType::Note
            }
        }
    }

    /// Log an entry and fold what the LLM extracts from it into the state.
    ///
    /// The log is written before extraction, so the entry survives a failed
    /// LLM call. A malformed `state.json` stops everything before any write.
    pub fn add_entry(&self, slug: &str, entry: &Entry) -> Result<StateUpdate> {
        let activity = self.storage.require_activity(slug)?;
        if activity.is_finalized() {
            bail!("Activity '{slug}' is finalized; no more entries can be added");
        }
        if entry.content.trim().is_empty() {
            bail!("Entry content is empty");
        }

        let current = self
            .storage
            .load_state(slug)?
            .unwrap_or_else(|| ActivityState::empty(&activity.description, &activity.created_at));

        self.storage.append_entry(slug, entry)?;

        let updated = self.block_on_with_spinner(
            "Updating activity state...",
            self.processor.process_entry(&activity, entry, &current),
        );
        match updated {
            Some(state) => {
                self.storage.save_state(slug, &state)?;
                Ok(StateUpdate::Updated(state))
            }
            None => Ok(StateUpdate::Unchanged),
        }
    }

    /// Current state, or the initial one when `state.json` does not exist.
    pub fn state_for(&self, slug: &str) -> Result<ActivityState> {
        let activity = self.storage.require_activity(slug)?;
        Ok(self
            .storage
            .load_state(slug)?
            .unwrap_or_else(|| ActivityState::empty(&activity.description, &activity.created_at)))
    }
}
