//! Usage statistics: words dictated, per day and in total.

use crate::{AppResult, storage};

use voice_typer_core::{StatsCollaborator, TranscriptResult};

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

/// Average typing speed used to estimate time saved.
pub(crate) const TYPING_WORDS_PER_MINUTE: f64 = 55.0;

/// Counters for one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStats {
    /// Words dictated.
    pub words: u64,
    /// Characters dictated.
    pub characters: u64,
    /// Completed transcriptions.
    pub transcriptions: u64,
}

/// Persisted statistics document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    /// All-time words.
    pub total_words: u64,
    /// All-time characters.
    pub total_characters: u64,
    /// All-time transcriptions.
    pub total_transcriptions: u64,
    /// Per-day buckets keyed by local ISO date (`YYYY-MM-DD`).
    #[serde(default)]
    pub daily: BTreeMap<String, DailyStats>,
}

/// [`StatsCollaborator`] that keeps [`UsageStats`] in a JSON file.
pub struct StatsManager {
    path: Option<PathBuf>,
    stats: Mutex<UsageStats>,
}

impl StatsManager {
    /// Load stats from `path`. An unreadable file starts fresh with a warning.
    #[instrument]
    pub fn load(path: &Path) -> Self {
        let stats = match storage::load_json::<UsageStats>(path) {
            Ok(Some(stats)) => {
                info!(total_words = stats.total_words, "Stats loaded");
                stats
            }
            Ok(None) => UsageStats::default(),
            Err(e) => {
                warn!(error = ?e, "Failed to load stats, starting fresh");
                UsageStats::default()
            }
        };

        Self {
            path: Some(path.to_path_buf()),
            stats: Mutex::new(stats),
        }
    }

    /// Stats that are never written to disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            stats: Mutex::new(UsageStats::default()),
        }
    }

    /// Account for `transcript` on `date`.
    pub fn record_on(&self, transcript: &TranscriptResult, date: NaiveDate) {
        let words = transcript.word_count() as u64;
        let characters = transcript.char_count() as u64;

        let mut stats = self.lock();
        stats.total_words += words;
        stats.total_characters += characters;
        stats.total_transcriptions += 1;

        let day = stats.daily.entry(date.format("%Y-%m-%d").to_string()).or_default();
        day.words += words;
        day.characters += characters;
        day.transcriptions += 1;

        debug!(words, date = %date, "Stats recorded");
    }

    /// Words dictated on `date`.
    pub fn words_on(&self, date: NaiveDate) -> u64 {
        self.lock()
            .daily
            .get(&date.format("%Y-%m-%d").to_string())
            .map_or(0, |day| day.words)
    }

    /// Words dictated today (local time).
    pub fn today_words(&self) -> u64 {
        self.words_on(Local::now().date_naive())
    }

    /// All-time words.
    pub fn total_words(&self) -> u64 {
        self.lock().total_words
    }

    /// Minutes of typing saved, rounded to one decimal.
    pub fn time_saved_minutes(&self) -> f64 {
        let minutes = self.total_words() as f64 / TYPING_WORDS_PER_MINUTE;
        (minutes * 10.0).round() / 10.0
    }

    /// Snapshot of the current document.
    pub fn snapshot(&self) -> UsageStats {
        self.lock().clone()
    }

    /// Write the current document to disk.
    pub fn save(&self) -> AppResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let snapshot = self.snapshot();
        storage::save_json(path, &snapshot)
    }

    fn lock(&self) -> MutexGuard<'_, UsageStats> {
        self.stats.lock().unwrap_or_else(|e| {
            error!("Stats lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }
}

impl StatsCollaborator for StatsManager {
    fn record(&self, transcript: &TranscriptResult) {
        self.record_on(transcript, Local::now().date_naive());
        if let Err(e) = self.save() {
            warn!(error = ?e, "Failed to save stats");
        }
    }
}
