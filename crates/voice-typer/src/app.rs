use crate::{AppResult, HistoryManager, StatsManager, config::Config};

use voice_typer_core::{
    CaptureSession, ChordEdge, ChordMatcher, KeyEvent, PipelineOutcome, RECORDING_WINDOW,
    SessionStatus, record_chord,
};

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{broadcast, mpsc},
    task::JoinHandle,
};
use tracing::{debug, error, info, instrument, warn};

/// How long shutdown waits for an in-flight transcription.
const PIPELINE_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Main application state.
///
/// Owns the hotkey matcher and drives the capture session from keyboard
/// hook events until Ctrl+C or the hook goes away.
pub struct App {
    pub(crate) session: CaptureSession,
    pub(crate) matcher: ChordMatcher,
    pub(crate) key_rx: mpsc::Receiver<KeyEvent>,
    pub(crate) stats: Arc<StatsManager>,
    pub(crate) history: Arc<HistoryManager>,
    pub(crate) in_flight: Option<JoinHandle<()>>,
}

impl App {
    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!(
            hotkey = %self.matcher.target(),
            today_words = self.stats.today_words(),
            total_words = self.stats.total_words(),
            time_saved_minutes = self.stats.time_saved_minutes(),
            "voice-typer ready"
        );

        let status_handle = tokio::spawn(log_status(self.session.subscribe_status()));

        loop {
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    if let Err(e) = result {
                        error!(error = ?e, "Failed to listen for Ctrl+C");
                    }
                    info!("Shutdown requested");
                    break;
                }

                event = self.key_rx.recv() => match event {
                    Some(event) => self.handle_key_event(event),
                    None => {
                        error!("Keyboard hook closed, shutting down");
                        break;
                    }
                }
            }
        }

        self.session.shutdown();

        if let Some(handle) = self.in_flight.take() {
            match tokio::time::timeout(PIPELINE_SHUTDOWN_TIMEOUT, handle).await {
                Ok(Ok(())) => debug!("In-flight transcription finished"),
                Ok(Err(e)) => warn!(error = ?e, "In-flight transcription task failed"),
                Err(_) => warn!("In-flight transcription did not finish before shutdown"),
            }
        }

        status_handle.abort();
        info!(
            history_entries = self.history.entries().len(),
            "voice-typer shut down successfully"
        );

        Ok(())
    }

    fn handle_key_event(&mut self, event: KeyEvent) {
        match self.matcher.apply(event) {
            Some(ChordEdge::Activated) => {
                if let Err(e) = self.session.on_chord_active() {
                    error!(error = ?e, "Failed to start recording");
                }
            }
            Some(ChordEdge::Deactivated) => {
                if let Some(pipeline) = self.session.on_chord_inactive() {
                    let stats = Arc::clone(&self.stats);
                    self.in_flight = Some(tokio::spawn(async move {
                        match pipeline.await {
                            Ok(outcome) => log_outcome(&outcome, &stats),
                            Err(e) => error!(error = ?e, "Processing task failed"),
                        }
                    }));
                }
            }
            None => {}
        }
    }
}

/// Run the custom hotkey recording window and persist the result.
///
/// Failure keeps the current hotkey and is not fatal.
#[instrument(skip_all)]
pub(crate) async fn record_hotkey(
    config: &mut Config,
    matcher: &mut ChordMatcher,
    key_rx: &mut mpsc::Receiver<KeyEvent>,
) {
    info!(
        window_secs = RECORDING_WINDOW.as_secs(),
        "Press and hold the modifier keys for the new hotkey"
    );

    match record_chord(matcher, key_rx, RECORDING_WINDOW).await {
        Ok(spec) => {
            config.hotkey.set_custom(&spec);
            match config.save() {
                Ok(()) => info!(hotkey = %spec, "New hotkey saved"),
                Err(e) => error!(error = ?e, hotkey = %spec, "Failed to save new hotkey"),
            }
        }
        Err(e) => {
            warn!(error = %e, hotkey = %matcher.target(), "Hotkey recording failed, keeping current hotkey");
        }
    }
}

fn log_outcome(outcome: &PipelineOutcome, stats: &StatsManager) {
    match outcome.transcript() {
        Some(transcript) => info!(
            word_count = transcript.word_count(),
            today_words = stats.today_words(),
            time_saved_minutes = stats.time_saved_minutes(),
            "Cycle complete"
        ),
        None => debug!(status = %outcome.status(), "Cycle complete without text"),
    }
}

async fn log_status(mut status_rx: broadcast::Receiver<SessionStatus>) {
    loop {
        match status_rx.recv().await {
            Ok(status) => info!(%status, "Status"),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!(skipped, "Status observer lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
