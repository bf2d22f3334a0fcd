//! Pointer buttons and the per-frame pointer state machine

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::{ButtonState, Modifiers};
use crate::foundation::math::Vec2;

/// Default press-to-release travel (pixels) still counted as a click
pub const DEFAULT_CLICK_THRESHOLD: f32 = 4.0;

/// Pointer buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerButton {
    /// Left mouse button / primary touch
    Primary,
    /// Right mouse button
    Secondary,
    /// Middle mouse button / wheel press
    Auxiliary,
    /// Browser back button
    Back,
    /// Browser forward button
    Forward,
}

impl PointerButton {
    /// All buttons in slot order
    pub const ALL: [PointerButton; 5] = [
        Self::Primary,
        Self::Secondary,
        Self::Auxiliary,
        Self::Back,
        Self::Forward,
    ];

    /// Map a platform button index (0 primary, 1 auxiliary, 2 secondary, 3 back, 4 forward)
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Primary),
            1 => Some(Self::Auxiliary),
            2 => Some(Self::Secondary),
            3 => Some(Self::Back),
            4 => Some(Self::Forward),
            _ => None,
        }
    }

    fn slot(self) -> usize {
        match self {
            Self::Primary => 0,
            Self::Secondary => 1,
            Self::Auxiliary => 2,
            Self::Back => 3,
            Self::Forward => 4,
        }
    }

    /// Flag for this button
    pub fn flag(self) -> PointerButtons {
        match self {
            Self::Primary => PointerButtons::PRIMARY,
            Self::Secondary => PointerButtons::SECONDARY,
            Self::Auxiliary => PointerButtons::AUXILIARY,
            Self::Back => PointerButtons::BACK,
            Self::Forward => PointerButtons::FORWARD,
        }
    }
}

bitflags! {
    /// Set of pointer buttons
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PointerButtons: u8 {
        /// Primary button
        const PRIMARY = 1 << 0;
        /// Secondary button
        const SECONDARY = 1 << 1;
        /// Auxiliary button
        const AUXILIARY = 1 << 2;
        /// Back button
        const BACK = 1 << 3;
        /// Forward button
        const FORWARD = 1 << 4;
    }
}

impl PointerButtons {
    /// Collect a list of buttons into a flag set
    pub fn from_buttons(buttons: &[PointerButton]) -> Self {
        buttons.iter().fold(Self::empty(), |acc, button| acc | button.flag())
    }

    /// Whether `button` is in the set
    pub fn has(self, button: PointerButton) -> bool {
        self.contains(button.flag())
    }
}

/// Per-button pointer state: edge state plus click tracking
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerButtonState {
    /// Edge-detected state
    pub state: ButtonState,
    /// Released this frame with total travel within the click threshold
    pub clicked: bool,
    /// Screen position of the latest press
    pub press_position: Vec2,
    /// Path length travelled since the latest press
    pub travel: f32,
}

/// Pointer state sampled once per frame
///
/// Raw events (`on_*`) latch into the pending fields; [`PointerState::update`]
/// turns them into this frame's edges.
#[derive(Debug, Clone)]
pub struct PointerState {
    buttons: [PointerButtonState; 5],
    click_threshold: f32,

    raw_position: Vec2,
    raw_on_screen: bool,
    raw_scroll: Vec2,
    raw_modifiers: Modifiers,

    /// Screen position this frame
    pub position: Vec2,
    /// Screen position last frame
    pub previous_position: Vec2,
    /// Position change since last frame
    pub delta: Vec2,
    /// World position under the pointer (filled in by the pointer system)
    pub world_position: Vec2,
    /// Pointer is over the surface
    pub on_screen: bool,
    /// Pointer entered the surface this frame
    pub entered: bool,
    /// Pointer left the surface this frame
    pub left: bool,
    /// Wheel movement accumulated this frame
    pub scroll_delta: Vec2,
    /// Modifiers from the latest pointer event
    pub modifiers: Modifiers,
}

impl Default for PointerState {
    fn default() -> Self {
        Self::new(DEFAULT_CLICK_THRESHOLD)
    }
}

impl PointerState {
    /// Create with a click travel threshold in pixels
    pub fn new(click_threshold: f32) -> Self {
        Self {
            buttons: [PointerButtonState::default(); 5],
            click_threshold,
            raw_position: Vec2::zeros(),
            raw_on_screen: false,
            raw_scroll: Vec2::zeros(),
            raw_modifiers: Modifiers::empty(),
            position: Vec2::zeros(),
            previous_position: Vec2::zeros(),
            delta: Vec2::zeros(),
            world_position: Vec2::zeros(),
            on_screen: false,
            entered: false,
            left: false,
            scroll_delta: Vec2::zeros(),
            modifiers: Modifiers::empty(),
        }
    }

    /// Click travel threshold in pixels
    pub fn click_threshold(&self) -> f32 {
        self.click_threshold
    }

    /// Raw move event
    pub fn on_move(&mut self, position: Vec2, modifiers: Modifiers) {
        let step = (position - self.raw_position).norm();
        for button in &mut self.buttons {
            if button.state.is_raw_down() {
                button.travel += step;
            }
        }
        self.raw_position = position;
        self.raw_on_screen = true;
        self.raw_modifiers = modifiers;
    }

    /// Raw button down event
    pub fn on_down(&mut self, button: PointerButton, position: Vec2, modifiers: Modifiers) {
        self.on_move(position, modifiers);
        let slot = &mut self.buttons[button.slot()];
        if !slot.state.is_raw_down() {
            slot.press_position = position;
            slot.travel = 0.0;
        }
        slot.state.latch_down();
    }

    /// Raw button up event
    pub fn on_up(&mut self, button: PointerButton, position: Vec2, modifiers: Modifiers) {
        self.on_move(position, modifiers);
        self.buttons[button.slot()].state.latch_up();
    }

    /// Raw enter event
    pub fn on_enter(&mut self, position: Vec2) {
        self.raw_position = position;
        self.raw_on_screen = true;
    }

    /// Raw leave event
    pub fn on_leave(&mut self) {
        self.raw_on_screen = false;
    }

    /// Raw wheel event (accumulates until the next frame)
    pub fn on_wheel(&mut self, delta: Vec2) {
        self.raw_scroll += delta;
    }

    /// Fold latched events into this frame's state
    pub fn update(&mut self, delta_time: f32) {
        self.previous_position = self.position;
        self.position = self.raw_position;
        self.delta = self.position - self.previous_position;

        let was_on_screen = self.on_screen;
        self.on_screen = self.raw_on_screen;
        self.entered = !was_on_screen && self.on_screen;
        self.left = was_on_screen && !self.on_screen;

        self.scroll_delta = self.raw_scroll;
        self.raw_scroll = Vec2::zeros();
        self.modifiers = self.raw_modifiers;

        let threshold = self.click_threshold;
        for button in &mut self.buttons {
            button.state.update(delta_time);
            button.clicked = button.state.released && button.travel <= threshold;
        }
    }

    /// Clear per-frame wheel movement after the frame consumed it
    pub fn clear_scroll(&mut self) {
        self.scroll_delta = Vec2::zeros();
    }

    /// Full state of one button
    pub fn button(&self, button: PointerButton) -> &PointerButtonState {
        &self.buttons[button.slot()]
    }

    /// Button held this frame
    pub fn is_down(&self, button: PointerButton) -> bool {
        self.button(button).state.down
    }

    /// Button went down this frame
    pub fn is_pressed(&self, button: PointerButton) -> bool {
        self.button(button).state.pressed
    }

    /// Button went up this frame
    pub fn is_released(&self, button: PointerButton) -> bool {
        self.button(button).state.released
    }

    /// Button was clicked (released without dragging) this frame
    pub fn is_clicked(&self, button: PointerButton) -> bool {
        self.button(button).clicked
    }

    /// Button held and moved past the click threshold
    pub fn is_dragging(&self, button: PointerButton) -> bool {
        let state = self.button(button);
        state.state.down && state.travel > self.click_threshold
    }

    /// Set of buttons held this frame
    pub fn buttons_down(&self) -> PointerButtons {
        PointerButton::ALL
            .iter()
            .filter(|button| self.is_down(**button))
            .fold(PointerButtons::empty(), |acc, button| acc | button.flag())
    }

    /// Drop all button state, e.g. when the surface loses focus
    pub fn reset_buttons(&mut self) {
        for button in &mut self.buttons {
            *button = PointerButtonState::default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press_release(state: &mut PointerState, path: &[Vec2]) {
        let (first, rest) = path.split_first().unwrap();
        state.on_down(PointerButton::Primary, *first, Modifiers::empty());
        state.update(0.016);
        for point in rest {
            state.on_move(*point, Modifiers::empty());
            state.update(0.016);
        }
        let last = *path.last().unwrap();
        state.on_up(PointerButton::Primary, last, Modifiers::empty());
        state.update(0.016);
    }

    #[test]
    fn test_click_within_threshold() {
        let mut state = PointerState::new(4.0);
        press_release(&mut state, &[Vec2::new(10.0, 10.0), Vec2::new(12.0, 10.0), Vec2::new(10.0, 10.0)]);
        assert!(state.is_released(PointerButton::Primary));
        assert!(state.is_clicked(PointerButton::Primary));
    }

    #[test]
    fn test_drag_beyond_threshold_is_not_click() {
        let mut state = PointerState::new(4.0);
        press_release(&mut state, &[Vec2::new(0.0, 0.0), Vec2::new(3.0, 0.0), Vec2::new(0.0, 0.0)]);
        // returned to the start point, but travelled 6px
        assert!(state.is_released(PointerButton::Primary));
        assert!(!state.is_clicked(PointerButton::Primary));
    }

    #[test]
    fn test_long_hold_still_clicks() {
        let mut state = PointerState::new(4.0);
        state.on_down(PointerButton::Primary, Vec2::new(5.0, 5.0), Modifiers::empty());
        for _ in 0..600 {
            state.update(0.016);
        }
        state.on_up(PointerButton::Primary, Vec2::new(5.0, 5.0), Modifiers::empty());
        state.update(0.016);
        assert!(state.is_clicked(PointerButton::Primary));
        state.update(0.016);
        assert!(!state.is_clicked(PointerButton::Primary));
    }

    #[test]
    fn test_enter_leave_edges() {
        let mut state = PointerState::default();
        state.on_enter(Vec2::new(1.0, 1.0));
        state.update(0.016);
        assert!(state.entered && state.on_screen);
        state.update(0.016);
        assert!(!state.entered);
        state.on_leave();
        state.update(0.016);
        assert!(state.left && !state.on_screen);
    }

    #[test]
    fn test_scroll_accumulates_per_frame() {
        let mut state = PointerState::default();
        state.on_wheel(Vec2::new(0.0, 1.0));
        state.on_wheel(Vec2::new(0.0, 2.0));
        state.update(0.016);
        assert_eq!(state.scroll_delta, Vec2::new(0.0, 3.0));
        state.clear_scroll();
        state.update(0.016);
        assert_eq!(state.scroll_delta, Vec2::zeros());
    }

    #[test]
    fn test_button_index_mapping() {
        assert_eq!(PointerButton::from_index(1), Some(PointerButton::Auxiliary));
        assert_eq!(PointerButton::from_index(2), Some(PointerButton::Secondary));
        assert_eq!(PointerButton::from_index(9), None);
        let set = PointerButtons::from_buttons(&[PointerButton::Secondary, PointerButton::Auxiliary]);
        assert!(set.has(PointerButton::Auxiliary));
        assert!(!set.has(PointerButton::Primary));
    }
}
