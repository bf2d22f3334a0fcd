//! Input state
//!
//! Raw platform events are latched as they arrive and folded into per-frame
//! state exactly once per frame, so `pressed`/`released` edges last exactly
//! one frame no matter how many events arrived in between.

pub mod cursor;
pub mod keyboard;
pub mod pointer;

pub use cursor::{CursorKind, CursorRegistry};
pub use keyboard::{KeyChord, KeyCode, Modifiers};
pub use pointer::{PointerButton, PointerButtons, PointerState};

/// Edge-detected state of one key or button
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ButtonState {
    /// Held this frame
    pub down: bool,
    /// Went down this frame
    pub pressed: bool,
    /// Went up this frame
    pub released: bool,
    /// Seconds held so far (0 while up)
    pub down_time: f32,
    /// Raw down events received while already held (platform auto-repeat)
    pub repeat_count: u32,
    raw_down: bool,
    press_latched: bool,
}

impl ButtonState {
    /// Record a raw down event
    pub fn latch_down(&mut self) {
        if self.raw_down {
            self.repeat_count += 1;
        } else {
            self.raw_down = true;
            self.press_latched = true;
        }
    }

    /// Record a raw up event
    pub fn latch_up(&mut self) {
        self.raw_down = false;
    }

    /// True while the raw event stream says the button is held
    pub fn is_raw_down(&self) -> bool {
        self.raw_down
    }

    /// Fold latched events into this frame's state
    pub fn update(&mut self, delta_time: f32) {
        let was_down = self.down;
        self.pressed = !was_down && (self.raw_down || self.press_latched);
        self.down = self.raw_down;
        // a press and release inside one frame still yields both edges
        self.released = (was_down || self.pressed) && !self.raw_down;
        self.press_latched = false;

        if self.down {
            self.down_time += delta_time;
        } else {
            self.down_time = 0.0;
            self.repeat_count = 0;
        }
    }

    /// Forget everything, e.g. on focus loss
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// True if any edge or held state is set
    pub fn is_active(&self) -> bool {
        self.down || self.pressed || self.released
    }
}
