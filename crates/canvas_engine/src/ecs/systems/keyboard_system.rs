//! Keyboard system
//!
//! Tracks per-key state from raw key events and reports which events the
//! host should keep away from the platform (the capture list).
//!
//! While Ctrl or Meta is held, a non-modifier key that is not a captured
//! chord never enters the down state. Such keys belong to platform or
//! browser shortcuts, and their key-up is often never delivered, which would
//! otherwise leave them stuck down.

use std::collections::HashMap;

use crate::core::config::KeyboardConfig;
use crate::input::{ButtonState, KeyChord, KeyCode, Modifiers};

/// Keyboard state and capture policy
#[derive(Debug, Default)]
pub struct KeyboardSystem {
    keys: HashMap<KeyCode, ButtonState>,
    modifiers: Modifiers,
    keys_to_capture: Vec<KeyChord>,
}

impl KeyboardSystem {
    /// Create from configuration
    pub fn new(config: &KeyboardConfig) -> Self {
        Self {
            keys: HashMap::new(),
            modifiers: Modifiers::empty(),
            keys_to_capture: config.keys_to_capture.clone(),
        }
    }

    /// Whether a key with these modifiers is a captured chord
    pub fn is_captured(&self, code: KeyCode, modifiers: Modifiers) -> bool {
        self.keys_to_capture.iter().any(|chord| chord.matches(code, modifiers))
    }

    /// Raw key down; returns true when the host should suppress it
    pub fn on_key_down(&mut self, code: KeyCode, modifiers: Modifiers) -> bool {
        self.modifiers = modifiers;
        let captured = self.is_captured(code, modifiers);
        if modifiers.is_chord() && !code.is_modifier() && !captured {
            log::trace!("Ignoring {:?} held with {:?}", code, modifiers);
            return false;
        }
        self.keys.entry(code).or_default().latch_down();
        captured
    }

    /// Raw key up; always releases the key
    pub fn on_key_up(&mut self, code: KeyCode, modifiers: Modifiers) -> bool {
        self.modifiers = modifiers;
        let captured = self.is_captured(code, modifiers);
        if let Some(state) = self.keys.get_mut(&code) {
            state.latch_up();
        }
        captured
    }

    /// Fold latched events into this frame's state
    pub fn update(&mut self, delta_time: f32) {
        for state in self.keys.values_mut() {
            state.update(delta_time);
        }
        self.keys.retain(|_, state| state.is_active() || state.is_raw_down());
    }

    fn state(&self, code: KeyCode) -> Option<&ButtonState> {
        self.keys.get(&code)
    }

    /// Held this frame
    pub fn is_down(&self, code: KeyCode) -> bool {
        self.state(code).is_some_and(|state| state.down)
    }

    /// Went down this frame
    pub fn is_pressed(&self, code: KeyCode) -> bool {
        self.state(code).is_some_and(|state| state.pressed)
    }

    /// Went up this frame
    pub fn is_released(&self, code: KeyCode) -> bool {
        self.state(code).is_some_and(|state| state.released)
    }

    /// Seconds the key has been held
    pub fn down_time(&self, code: KeyCode) -> f32 {
        self.state(code).map_or(0.0, |state| state.down_time)
    }

    /// Auto-repeat events received while held
    pub fn repeat_count(&self, code: KeyCode) -> u32 {
        self.state(code).map_or(0, |state| state.repeat_count)
    }

    /// Modifiers from the latest key event
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Keys held this frame
    pub fn keys_down(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.keys.iter().filter(|(_, state)| state.down).map(|(code, _)| *code)
    }

    /// Release everything, e.g. when the surface loses focus
    pub fn reset(&mut self) {
        self.keys.clear();
        self.modifiers = Modifiers::empty();
    }
}
