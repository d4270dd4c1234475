use crate::{
    CoreError, CoreResult,
    hotkey::{ModifierRole, PhysicalKey},
};

use std::{collections::BTreeSet, fmt, panic::Location};

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};

/// The key combination that triggers push-to-talk.
///
/// A `Chord` is satisfied by any side of each role; a `Key` must be held
/// exactly (so `RightCommand` and `LeftCommand` stay distinct presets).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HotkeySpec {
    /// Every role must be held by at least one key.
    Chord(BTreeSet<ModifierRole>),
    /// A single concrete key.
    Key(PhysicalKey),
}

impl HotkeySpec {
    /// Build a chord from roles, collapsing duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyHotkey`] if `roles` is empty.
    #[track_caller]
    pub fn chord<I>(roles: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = ModifierRole>,
    {
        let roles: BTreeSet<ModifierRole> = roles.into_iter().collect();
        if roles.is_empty() {
            return Err(CoreError::EmptyHotkey {
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(HotkeySpec::Chord(roles))
    }

    /// A single-key hotkey.
    pub fn key(key: PhysicalKey) -> Self {
        HotkeySpec::Key(key)
    }

    /// Whether the given held keys satisfy this spec.
    pub fn is_satisfied_by<'a, I>(&self, held: I) -> bool
    where
        I: IntoIterator<Item = &'a PhysicalKey> + Clone,
    {
        match self {
            HotkeySpec::Chord(roles) => roles
                .iter()
                .all(|role| held.clone().into_iter().any(|k| k.role() == Some(*role))),
            HotkeySpec::Key(target) => held.into_iter().any(|k| k == target),
        }
    }

    /// Whether releasing `key` can affect this spec.
    pub fn involves(&self, key: &PhysicalKey) -> bool {
        match self {
            HotkeySpec::Chord(roles) => key.role().is_some_and(|r| roles.contains(&r)),
            HotkeySpec::Key(target) => target == key,
        }
    }

    /// Roles of a chord spec, empty for single-key specs.
    pub fn roles(&self) -> Vec<ModifierRole> {
        match self {
            HotkeySpec::Chord(roles) => roles.iter().copied().collect(),
            HotkeySpec::Key(_) => Vec::new(),
        }
    }
}

impl fmt::Display for HotkeySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HotkeySpec::Chord(roles) => {
                let names: Vec<String> = roles.iter().map(ToString::to_string).collect();
                f.write_str(&names.join("+"))
            }
            HotkeySpec::Key(key) => write!(f, "{key}"),
        }
    }
}

/// Built-in hotkey choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HotkeyPreset {
    /// Right Command (default).
    #[default]
    RightCommand,
    /// Left Command.
    LeftCommand,
    /// Right Option.
    RightOption,
    /// Left Option.
    LeftOption,
    /// Right Control.
    RightControl,
    /// F13.
    F13,
}

impl HotkeyPreset {
    /// Every preset, in menu order.
    pub const ALL: [HotkeyPreset; 6] = [
        HotkeyPreset::RightCommand,
        HotkeyPreset::LeftCommand,
        HotkeyPreset::RightOption,
        HotkeyPreset::LeftOption,
        HotkeyPreset::RightControl,
        HotkeyPreset::F13,
    ];

    /// The concrete hotkey this preset stands for.
    pub fn spec(self) -> HotkeySpec {
        let key = match self {
            HotkeyPreset::RightCommand => PhysicalKey::RIGHT_COMMAND,
            HotkeyPreset::LeftCommand => PhysicalKey::LEFT_COMMAND,
            HotkeyPreset::RightOption => PhysicalKey::RIGHT_OPTION,
            HotkeyPreset::LeftOption => PhysicalKey::LEFT_OPTION,
            HotkeyPreset::RightControl => PhysicalKey::RIGHT_CONTROL,
            HotkeyPreset::F13 => PhysicalKey::Function(13),
        };
        HotkeySpec::Key(key)
    }

    /// Config-file name of the preset.
    pub fn name(self) -> &'static str {
        match self {
            HotkeyPreset::RightCommand => "right_command",
            HotkeyPreset::LeftCommand => "left_command",
            HotkeyPreset::RightOption => "right_option",
            HotkeyPreset::LeftOption => "left_option",
            HotkeyPreset::RightControl => "right_control",
            HotkeyPreset::F13 => "f13",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            HotkeyPreset::RightCommand => "Right Command ⌘",
            HotkeyPreset::LeftCommand => "Left Command ⌘",
            HotkeyPreset::RightOption => "Right Option ⌥",
            HotkeyPreset::LeftOption => "Left Option ⌥",
            HotkeyPreset::RightControl => "Right Control ⌃",
            HotkeyPreset::F13 => "F13 Key",
        }
    }
}
