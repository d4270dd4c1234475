use std::fmt;

use serde::{Deserialize, Serialize};

/// Logical modifier identity, independent of which side of the keyboard it sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierRole {
    /// Command / Meta / Super.
    Command,
    /// Control.
    Control,
    /// Option / Alt.
    Option,
    /// Shift.
    Shift,
}

impl fmt::Display for ModifierRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModifierRole::Command => "Command",
            ModifierRole::Control => "Control",
            ModifierRole::Option => "Option",
            ModifierRole::Shift => "Shift",
        };
        f.write_str(name)
    }
}

/// Which physical copy of a modifier was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Left-hand modifier.
    Left,
    /// Right-hand modifier.
    Right,
}

/// A key as reported by the keyboard hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhysicalKey {
    /// A modifier key. `side` is `None` when the platform cannot tell.
    Modifier {
        /// Logical modifier.
        role: ModifierRole,
        /// Left/right copy, if known.
        side: Option<Side>,
    },
    /// Function key `F<n>`.
    Function(u8),
    /// Any other key, by platform key code.
    Other(u32),
}

impl PhysicalKey {
    /// Shorthand for a sided modifier.
    pub const fn modifier(role: ModifierRole, side: Side) -> Self {
        PhysicalKey::Modifier {
            role,
            side: Some(side),
        }
    }

    /// Left Control.
    pub const LEFT_CONTROL: Self = Self::modifier(ModifierRole::Control, Side::Left);
    /// Right Control.
    pub const RIGHT_CONTROL: Self = Self::modifier(ModifierRole::Control, Side::Right);
    /// Left Option / Alt.
    pub const LEFT_OPTION: Self = Self::modifier(ModifierRole::Option, Side::Left);
    /// Right Option / AltGr.
    pub const RIGHT_OPTION: Self = Self::modifier(ModifierRole::Option, Side::Right);
    /// Left Command / Meta.
    pub const LEFT_COMMAND: Self = Self::modifier(ModifierRole::Command, Side::Left);
    /// Right Command / Meta.
    pub const RIGHT_COMMAND: Self = Self::modifier(ModifierRole::Command, Side::Right);
    /// Left Shift.
    pub const LEFT_SHIFT: Self = Self::modifier(ModifierRole::Shift, Side::Left);
    /// Right Shift.
    pub const RIGHT_SHIFT: Self = Self::modifier(ModifierRole::Shift, Side::Right);

    /// The logical role of this key, or `None` for non-modifiers.
    pub fn role(&self) -> Option<ModifierRole> {
        match self {
            PhysicalKey::Modifier { role, .. } => Some(*role),
            _ => None,
        }
    }

    /// Equivalence used for chord matching: modifiers compare by role only,
    /// every other key compares exactly.
    pub fn is_equivalent(&self, other: &PhysicalKey) -> bool {
        match (self.role(), other.role()) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self == other,
            _ => false,
        }
    }
}

impl fmt::Display for PhysicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhysicalKey::Modifier { role, side } => match side {
                Some(Side::Left) => write!(f, "Left {role}"),
                Some(Side::Right) => write!(f, "Right {role}"),
                None => write!(f, "{role}"),
            },
            PhysicalKey::Function(n) => write!(f, "F{n}"),
            PhysicalKey::Other(code) => write!(f, "Key({code})"),
        }
    }
}

/// A press or release delivered by the keyboard hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    /// Key went down (auto-repeat may deliver this more than once).
    Press(PhysicalKey),
    /// Key went up.
    Release(PhysicalKey),
}
