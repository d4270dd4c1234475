use voice_typer_core::{HotkeyPreset, HotkeySpec, ModifierRole};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Push-to-talk hotkey configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotkeyConfig {
    /// Built-in hotkey, used when no custom chord is set.
    #[serde(default)]
    pub preset: HotkeyPreset,

    /// User-recorded modifier chord. Takes priority over `preset` when non-empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom: Vec<ModifierRole>,
}

impl HotkeyConfig {
    /// The hotkey to match.
    pub fn spec(&self) -> HotkeySpec {
        if self.custom.is_empty() {
            return self.preset.spec();
        }
        match HotkeySpec::chord(self.custom.iter().copied()) {
            Ok(spec) => spec,
            Err(e) => {
                warn!(error = ?e, "Invalid custom hotkey, using preset");
                self.preset.spec()
            }
        }
    }

    /// Switch to a built-in preset, dropping any custom chord.
    pub fn set_preset(&mut self, preset: HotkeyPreset) {
        self.preset = preset;
        self.custom.clear();
    }

    /// Adopt a recorded hotkey. A single-key spec clears the custom chord.
    pub fn set_custom(&mut self, spec: &HotkeySpec) {
        self.custom = spec.roles();
    }
}
