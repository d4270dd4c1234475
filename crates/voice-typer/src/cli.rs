use voice_typer_core::HotkeyPreset;

use clap::{ArgGroup, Parser};

/// Push-to-talk voice typing: hold the hotkey, speak, release to paste.
#[derive(Debug, Parser)]
#[command(name = "voice-typer", version, about)]
#[command(group(
    ArgGroup::new("history")
        .args(["show_history", "clear_history", "delete_history", "copy_history"])
        .multiple(false)
))]
pub(crate) struct Cli {
    /// Switch to a built-in hotkey (see --list-presets) and save it before starting.
    #[arg(long, value_name = "NAME", value_parser = parse_preset, conflicts_with = "record_hotkey")]
    pub(crate) preset: Option<HotkeyPreset>,

    /// Record a new hotkey chord (5 second window) before starting.
    #[arg(long)]
    pub(crate) record_hotkey: bool,

    /// Print the built-in hotkey presets and exit.
    #[arg(long)]
    pub(crate) list_presets: bool,

    /// Print recent transcriptions and usage stats, then exit.
    #[arg(long)]
    pub(crate) show_history: bool,

    /// Remove every history entry, then exit.
    #[arg(long)]
    pub(crate) clear_history: bool,

    /// Remove one history entry (0 is the newest), then exit.
    #[arg(long, value_name = "INDEX")]
    pub(crate) delete_history: Option<usize>,

    /// Put one history entry (0 is the newest) back on the clipboard, then exit.
    #[arg(long, value_name = "INDEX")]
    pub(crate) copy_history: Option<usize>,
}

impl Cli {
    /// Whether the invocation only touches history and never starts listening.
    pub(crate) fn is_history_command(&self) -> bool {
        self.show_history
            || self.clear_history
            || self.delete_history.is_some()
            || self.copy_history.is_some()
    }
}

/// Parse a preset by its config-file name.
pub(crate) fn parse_preset(name: &str) -> Result<HotkeyPreset, String> {
    HotkeyPreset::ALL
        .into_iter()
        .find(|preset| preset.name().eq_ignore_ascii_case(name))
        .ok_or_else(|| {
            let names: Vec<&str> = HotkeyPreset::ALL.iter().map(|p| p.name()).collect();
            format!("unknown preset '{}', expected one of: {}", name, names.join(", "))
        })
}
