//! voice-typer: hold a hotkey, speak, release, and the transcript is pasted
//! into the focused application.

mod app;
mod cli;
mod clipboard_injector;
mod config;
mod error;
mod history;
mod key_listener;
mod logging;
mod paste_key_guard;
mod stats;
mod storage;

pub(crate) use {
    app::App,
    clipboard_injector::ClipboardInjector,
    error::{AppError, Result as AppResult},
    history::HistoryManager,
    key_listener::KeyEventListener,
    paste_key_guard::PasteKeyGuard,
    stats::StatsManager,
};

use crate::{cli::Cli, config::Config};

use voice_typer_core::{
    AudioCapture, CaptureSession, ChordMatcher, Collaborators, CpalBackend, HotkeyPreset,
    WhisperTranscriber,
};

use std::{process::ExitCode, sync::Arc};

use clap::Parser;
use tracing::{error, info, instrument};

const STATS_FILE: &str = "stats.json";
const HISTORY_FILE: &str = "history.json";

/// Application entry point.
fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.list_presets {
        for preset in HotkeyPreset::ALL {
            println!("{:<14} {}", preset.name(), preset.label());
        }
        return ExitCode::SUCCESS;
    }

    let data_dir = match config::project_dirs() {
        Ok(dirs) => dirs.data_dir().to_path_buf(),
        Err(e) => {
            eprintln!("Failed to resolve data directory: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Dropping the guard flushes the file log, so it lives until main returns.
    let _log_guard = match logging::init(&data_dir.join("logs")) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let stats = Arc::new(StatsManager::load(&data_dir.join(STATS_FILE)));
    let history = Arc::new(HistoryManager::load(&data_dir.join(HISTORY_FILE)));

    if cli.is_history_command() {
        return match run_history_command(&cli, &history, &stats) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!(error = ?e, "History command failed");
                ExitCode::FAILURE
            }
        };
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = ?e, "Failed to create tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli.preset, cli.record_hotkey, stats, history)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = ?e, "voice-typer failed");
            ExitCode::FAILURE
        }
    }
}

/// Wire the keyboard hook, microphone, transcriber and collaborators, then
/// hand control to [`App::run`].
#[instrument(skip(stats, history))]
async fn run(
    preset: Option<HotkeyPreset>,
    record: bool,
    stats: Arc<StatsManager>,
    history: Arc<HistoryManager>,
) -> AppResult<()> {
    let mut config = Config::load()?;

    if let Some(preset) = preset {
        config.hotkey.set_preset(preset);
        config.save()?;
        info!(preset = preset.name(), "Hotkey preset saved");
        println!("Hotkey set to {}", preset.label());
    }

    let mut key_rx = KeyEventListener::spawn()?;
    let mut matcher = ChordMatcher::new(config.hotkey.spec());

    // Recording a hotkey must work before a model has been downloaded.
    if record {
        app::record_hotkey(&mut config, &mut matcher, &mut key_rx).await;
    }

    config.validate_model_path()?;
    let transcriber = WhisperTranscriber::new(
        &config.whisper.model_path,
        config.whisper.use_gpu,
        &config.whisper.language,
    )?;

    let collaborators = Collaborators {
        transcriber: Arc::new(transcriber),
        injector: Arc::new(ClipboardInjector::new(&config.behavior)),
        stats: Arc::<StatsManager>::clone(&stats),
        history: Arc::<HistoryManager>::clone(&history),
    };

    let capture = AudioCapture::new(Box::new(CpalBackend::new(
        config.audio.selected_device.clone(),
    )));
    let session = CaptureSession::new(capture, collaborators);

    info!(
        model_path = ?config.whisper.model_path,
        language = %config.whisper.language,
        auto_paste = config.behavior.auto_paste,
        "Pipeline ready"
    );

    let app = App {
        session,
        matcher,
        key_rx,
        stats,
        history,
        in_flight: None,
    };

    app.run().await
}

fn run_history_command(
    cli: &Cli,
    history: &HistoryManager,
    stats: &StatsManager,
) -> AppResult<()> {
    if cli.clear_history {
        history.clear()?;
        println!("History cleared");
        return Ok(());
    }

    if let Some(index) = cli.delete_history {
        if history.delete(index)? {
            println!("Deleted history entry {}", index);
        } else {
            println!("No history entry at index {}", index);
        }
        return Ok(());
    }

    if let Some(index) = cli.copy_history {
        match history.get(index) {
            Some(entry) => {
                clipboard_injector::copy_to_clipboard(&entry.text)?;
                println!("Copied history entry {} to the clipboard", index);
            }
            None => println!("No history entry at index {}", index),
        }
        return Ok(());
    }

    print_history(history, stats);
    Ok(())
}

fn print_history(history: &HistoryManager, stats: &StatsManager) {
    let entries = history.entries();
    if entries.is_empty() {
        println!("No transcriptions yet");
    }
    for (index, entry) in entries.iter().enumerate() {
        println!("{:>2}  {}  ({} words)", index, entry.display_line(), entry.word_count);
    }

    println!();
    println!(
        "Today: {} words | Total: {} words | Time saved: {} min",
        stats.today_words(),
        stats.total_words(),
        stats.time_saved_minutes()
    );
}
