//! The most recent transcripts, newest first.

use crate::{AppResult, storage};

use voice_typer_core::HistoryCollaborator;

use std::{
    collections::VecDeque,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

/// Entries kept; the oldest is evicted first.
pub(crate) const MAX_HISTORY_ENTRIES: usize = 10;

/// Text up to this many characters is shown whole in a display line.
const PREVIEW_CHARS: usize = 50;

/// Characters kept before the ellipsis when the text is longer.
const PREVIEW_TRUNCATED_CHARS: usize = 47;

/// One remembered transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Trimmed transcript text.
    pub text: String,
    /// When it was delivered.
    pub timestamp: DateTime<Local>,
    /// Whitespace-separated words.
    pub word_count: usize,
}

impl HistoryEntry {
    /// Menu-style line: `"03:07 PM - preview"`.
    pub fn display_line(&self) -> String {
        let preview = if self.text.chars().count() > PREVIEW_CHARS {
            let mut preview: String = self.text.chars().take(PREVIEW_TRUNCATED_CHARS).collect();
            preview.push_str("...");
            preview
        } else {
            self.text.clone()
        };
        format!("{} - {}", self.timestamp.format("%I:%M %p"), preview)
    }
}

/// [`HistoryCollaborator`] bounded to [`MAX_HISTORY_ENTRIES`], persisted as JSON.
pub struct HistoryManager {
    path: Option<PathBuf>,
    entries: Mutex<VecDeque<HistoryEntry>>,
}

impl HistoryManager {
    /// Load history from `path`. An unreadable file starts empty with a warning.
    #[instrument]
    pub fn load(path: &Path) -> Self {
        let mut entries = match storage::load_json::<VecDeque<HistoryEntry>>(path) {
            Ok(Some(entries)) => entries,
            Ok(None) => VecDeque::new(),
            Err(e) => {
                warn!(error = ?e, "Failed to load history, starting empty");
                VecDeque::new()
            }
        };
        entries.truncate(MAX_HISTORY_ENTRIES);
        info!(entries = entries.len(), "History loaded");

        Self {
            path: Some(path.to_path_buf()),
            entries: Mutex::new(entries),
        }
    }

    /// History that is never written to disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: Mutex::new(VecDeque::new()),
        }
    }

    /// Remember `text` as delivered at `timestamp`. Blank text is ignored.
    ///
    /// Returns whether an entry was added.
    pub fn add_at(&self, text: &str, timestamp: DateTime<Local>) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }

        let mut entries = self.lock();
        entries.push_front(HistoryEntry {
            text: text.to_string(),
            timestamp,
            word_count: text.split_whitespace().count(),
        });
        entries.truncate(MAX_HISTORY_ENTRIES);

        debug!(entries = entries.len(), "History entry added");
        true
    }

    /// Entries, newest first.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.lock().iter().cloned().collect()
    }

    /// The entry at `index` (0 = newest).
    pub fn get(&self, index: usize) -> Option<HistoryEntry> {
        self.lock().get(index).cloned()
    }

    /// Forget everything.
    pub fn clear(&self) -> AppResult<()> {
        self.lock().clear();
        self.save()
    }

    /// Remove the entry at `index` (0 = newest). Returns false if out of range.
    pub fn delete(&self, index: usize) -> AppResult<bool> {
        let removed = self.lock().remove(index).is_some();
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    /// Write the entries to disk.
    pub fn save(&self) -> AppResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let entries = self.entries();
        storage::save_json(path, &entries)
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<HistoryEntry>> {
        self.entries.lock().unwrap_or_else(|e| {
            error!("History lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }
}

impl HistoryCollaborator for HistoryManager {
    fn add(&self, text: &str) {
        if !self.add_at(text, Local::now()) {
            return;
        }
        if let Err(e) = self.save() {
            warn!(error = ?e, "Failed to save history");
        }
    }
}
