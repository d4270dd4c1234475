mod key;
mod matcher;
mod recorder;
mod spec;

pub use {
    key::{KeyEvent, ModifierRole, PhysicalKey, Side},
    matcher::{ChordEdge, ChordMatcher},
    recorder::{RECORDING_WINDOW, record_chord},
    spec::{HotkeyPreset, HotkeySpec},
};
