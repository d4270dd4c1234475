use serde::{Deserialize, Serialize};

/// Microphone selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Input device name as reported by the host audio API. Unset, or a name
    /// that no longer matches a device, uses the system default input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_device: Option<String>,
}
