use crate::config::{default_auto_paste, default_restore_clipboard};

use serde::{Deserialize, Serialize};

/// Application behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviourConfig {
    /// Whether to simulate the paste shortcut after copying the transcript.
    #[serde(default = "default_auto_paste")]
    pub auto_paste: bool,

    /// Whether to put the previous clipboard contents back after pasting.
    #[serde(default = "default_restore_clipboard")]
    pub restore_clipboard: bool,
}

impl Default for BehaviourConfig {
    fn default() -> Self {
        Self {
            auto_paste: default_auto_paste(),
            restore_clipboard: default_restore_clipboard(),
        }
    }
}
