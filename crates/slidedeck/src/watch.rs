//! Watches the deck file so the presenter can reload it.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use anyhow::{Context, Result};
use notify_debouncer_mini::notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{DebounceEventResult, Debouncer, new_debouncer};

const DEBOUNCE: Duration = Duration::from_millis(200);

pub struct DeckWatcher {
    file: PathBuf,
    events: Receiver<DebounceEventResult>,
    _debouncer: Debouncer<RecommendedWatcher>,
}

impl DeckWatcher {
    /// Watch `file`. `wake` runs on the watcher thread after each batch of
    /// events, so the host can schedule a frame.
    pub fn new(file: &Path, wake: impl Fn() + Send + 'static) -> Result<Self> {
        let file = file
            .canonicalize()
            .with_context(|| format!("Failed to resolve {}", file.display()))?;
        // Editors often save by renaming over the file, so watch the directory.
        let dir = file
            .parent()
            .context("Deck file has no parent directory")?
            .to_path_buf();

        let (tx, events) = mpsc::channel();
        let mut debouncer = new_debouncer(DEBOUNCE, move |result: DebounceEventResult| {
            if tx.send(result).is_ok() {
                wake();
            }
        })
        .context("Failed to start file watcher")?;
        debouncer
            .watcher()
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", dir.display()))?;

        tracing::info!(file = %file.display(), "watching deck for changes");
        Ok(Self {
            file,
            events,
            _debouncer: debouncer,
        })
    }

    /// Drain pending events. True when any of them touched the deck file.
    pub fn changed(&self) -> bool {
        let mut changed = false;
        for result in self.events.try_iter() {
            match result {
                Ok(events) => changed |= events.iter().any(|e| e.path == self.file),
                Err(e) => tracing::warn!("file watcher error: {e}"),
            }
        }
        changed
    }
}
