//! Key codes, modifier flags and capture chords

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Modifier keys held during an input event
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// Either shift key
        const SHIFT = 1 << 0;
        /// Either control key
        const CONTROL = 1 << 1;
        /// Either alt/option key
        const ALT = 1 << 2;
        /// Either meta/command key
        const META = 1 << 3;
    }
}

impl Modifiers {
    /// Build from individual flags as delivered by the platform
    pub fn from_flags(shift: bool, control: bool, alt: bool, meta: bool) -> Self {
        let mut modifiers = Self::empty();
        modifiers.set(Self::SHIFT, shift);
        modifiers.set(Self::CONTROL, control);
        modifiers.set(Self::ALT, alt);
        modifiers.set(Self::META, meta);
        modifiers
    }

    /// Control or meta held: shortcut chord mode
    pub fn is_chord(self) -> bool {
        self.intersects(Self::CONTROL | Self::META)
    }
}

/// Key codes
///
/// Named after physical keys, matching the platform's `code` strings
/// (`"KeyA"`, `"Digit1"`, `"ArrowUp"`, ...).
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,
    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Minus,
    Equal,
    Shift,
    Control,
    Alt,
    Meta,
}

impl KeyCode {
    const LETTERS: [KeyCode; 26] = [
        Self::A, Self::B, Self::C, Self::D, Self::E, Self::F, Self::G, Self::H, Self::I,
        Self::J, Self::K, Self::L, Self::M, Self::N, Self::O, Self::P, Self::Q, Self::R,
        Self::S, Self::T, Self::U, Self::V, Self::W, Self::X, Self::Y, Self::Z,
    ];

    const DIGITS: [KeyCode; 10] = [
        Self::Digit0, Self::Digit1, Self::Digit2, Self::Digit3, Self::Digit4,
        Self::Digit5, Self::Digit6, Self::Digit7, Self::Digit8, Self::Digit9,
    ];

    /// Parse a platform key code string; `None` for keys the engine ignores
    pub fn from_code(code: &str) -> Option<Self> {
        if let Some(letter) = code.strip_prefix("Key") {
            let mut chars = letter.chars();
            return match (chars.next(), chars.next()) {
                (Some(c @ 'A'..='Z'), None) => Some(Self::LETTERS[(c as u8 - b'A') as usize]),
                _ => None,
            };
        }
        if let Some(digit) = code.strip_prefix("Digit") {
            return digit
                .parse::<usize>()
                .ok()
                .and_then(|d| Self::DIGITS.get(d).copied());
        }
        let key = match code {
            "Space" => Self::Space,
            "Enter" | "NumpadEnter" => Self::Enter,
            "Escape" => Self::Escape,
            "Tab" => Self::Tab,
            "Backspace" => Self::Backspace,
            "Delete" => Self::Delete,
            "ArrowUp" => Self::Up,
            "ArrowDown" => Self::Down,
            "ArrowLeft" => Self::Left,
            "ArrowRight" => Self::Right,
            "Home" => Self::Home,
            "End" => Self::End,
            "PageUp" => Self::PageUp,
            "PageDown" => Self::PageDown,
            "Minus" | "NumpadSubtract" => Self::Minus,
            "Equal" | "NumpadAdd" => Self::Equal,
            "ShiftLeft" | "ShiftRight" => Self::Shift,
            "ControlLeft" | "ControlRight" => Self::Control,
            "AltLeft" | "AltRight" => Self::Alt,
            "MetaLeft" | "MetaRight" | "OSLeft" | "OSRight" => Self::Meta,
            _ => return None,
        };
        Some(key)
    }

    /// True for shift/control/alt/meta
    pub fn is_modifier(self) -> bool {
        matches!(self, Self::Shift | Self::Control | Self::Alt | Self::Meta)
    }
}

/// Key plus required modifiers, e.g. Ctrl+Z
///
/// Used for the capture list: matching chords are reported to the host as
/// "suppress default handling".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyChord {
    /// Non-modifier key
    pub key: KeyCode,
    /// Control must be held
    #[serde(default)]
    pub ctrl: bool,
    /// Shift must be held
    #[serde(default)]
    pub shift: bool,
    /// Alt must be held
    #[serde(default)]
    pub alt: bool,
    /// Meta must be held
    #[serde(default)]
    pub meta: bool,
}

impl KeyChord {
    /// Bare key, no modifiers
    pub fn key(key: KeyCode) -> Self {
        Self { key, ctrl: false, shift: false, alt: false, meta: false }
    }

    /// Ctrl + key
    pub fn ctrl(key: KeyCode) -> Self {
        Self { ctrl: true, ..Self::key(key) }
    }

    /// Meta + key
    pub fn meta(key: KeyCode) -> Self {
        Self { meta: true, ..Self::key(key) }
    }

    /// Add shift to the chord
    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// Required modifiers as flags
    pub fn modifiers(&self) -> Modifiers {
        Modifiers::from_flags(self.shift, self.ctrl, self.alt, self.meta)
    }

    /// Exact match: same key and exactly the same modifier set
    pub fn matches(&self, key: KeyCode, modifiers: Modifiers) -> bool {
        self.key == key && self.modifiers() == modifiers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        assert_eq!(KeyCode::from_code("KeyA"), Some(KeyCode::A));
        assert_eq!(KeyCode::from_code("KeyZ"), Some(KeyCode::Z));
        assert_eq!(KeyCode::from_code("Digit7"), Some(KeyCode::Digit7));
        assert_eq!(KeyCode::from_code("ArrowLeft"), Some(KeyCode::Left));
        assert_eq!(KeyCode::from_code("ControlRight"), Some(KeyCode::Control));
        assert_eq!(KeyCode::from_code("KeyAB"), None);
        assert_eq!(KeyCode::from_code("Digit12"), None);
        assert_eq!(KeyCode::from_code("F13"), None);
    }

    #[test]
    fn test_modifier_chord_detection() {
        assert!(Modifiers::CONTROL.is_chord());
        assert!((Modifiers::META | Modifiers::SHIFT).is_chord());
        assert!(!(Modifiers::SHIFT | Modifiers::ALT).is_chord());
        assert!(KeyCode::Meta.is_modifier());
        assert!(!KeyCode::Z.is_modifier());
    }

    #[test]
    fn test_chord_matches_exact_modifiers() {
        let undo = KeyChord::ctrl(KeyCode::Z);
        assert!(undo.matches(KeyCode::Z, Modifiers::CONTROL));
        assert!(!undo.matches(KeyCode::Z, Modifiers::CONTROL | Modifiers::SHIFT));
        assert!(!undo.matches(KeyCode::Y, Modifiers::CONTROL));

        let redo = KeyChord::ctrl(KeyCode::Z).with_shift();
        assert!(redo.matches(KeyCode::Z, Modifiers::CONTROL | Modifiers::SHIFT));
    }

    #[test]
    fn test_chord_deserializes_with_defaults() {
        let chord: KeyChord = ron::from_str("(key: S, ctrl: true)").unwrap();
        assert_eq!(chord, KeyChord::ctrl(KeyCode::S));
    }
}
