//! Pointer system
//!
//! Receives raw pointer events from the platform adapter, samples them once
//! per frame into [`PointerState`], and decides which pointer target is
//! hovered: targets are tested topmost first (reverse render order) and the
//! first hit wins.
//!
//! The raw handlers return whether the host should suppress the event's
//! default platform handling.

use crate::core::config::PointerConfig;
use crate::ecs::component::ComponentId;
use crate::ecs::entity::EntityId;
use crate::ecs::world::World;
use crate::foundation::math::{Rect, Vec2};
use crate::input::{Modifiers, PointerButton, PointerButtons, PointerState};
use crate::render::Camera;

/// Type name of hoverable components
const POINTER_TARGET: &str = "PointerTarget";

/// Pointer input and hover tracking
#[derive(Debug)]
pub struct PointerSystem {
    state: PointerState,
    drag_enabled: bool,
    drag_buttons: PointerButtons,
    hovered: Option<(EntityId, ComponentId)>,
}

impl PointerSystem {
    /// Create from configuration
    pub fn new(config: &PointerConfig) -> Self {
        Self {
            state: PointerState::new(config.click_threshold),
            drag_enabled: config.drag_enabled,
            drag_buttons: PointerButtons::from_buttons(&config.camera_drag_buttons),
            hovered: None,
        }
    }

    /// Sampled state for this frame
    pub fn state(&self) -> &PointerState {
        &self.state
    }

    /// Topmost hovered target
    pub fn hovered(&self) -> Option<(EntityId, ComponentId)> {
        self.hovered
    }

    /// Whether camera dragging is allowed
    pub fn drag_enabled(&self) -> bool {
        self.drag_enabled
    }

    /// Allow or forbid camera dragging
    pub fn set_drag_enabled(&mut self, enabled: bool) {
        self.drag_enabled = enabled;
    }

    /// Buttons that pan the camera
    pub fn drag_buttons(&self) -> PointerButtons {
        self.drag_buttons
    }

    fn suppresses(&self, button: PointerButton) -> bool {
        self.drag_enabled && self.drag_buttons.has(button)
    }

    /// Raw move
    pub fn on_pointer_move(&mut self, position: Vec2, modifiers: Modifiers) -> bool {
        self.state.on_move(position, modifiers);
        false
    }

    /// Raw button down; suppresses the context menu and autoscroll for drag buttons
    pub fn on_pointer_down(&mut self, button: PointerButton, position: Vec2, modifiers: Modifiers) -> bool {
        self.state.on_down(button, position, modifiers);
        self.suppresses(button)
    }

    /// Raw button up
    pub fn on_pointer_up(&mut self, button: PointerButton, position: Vec2, modifiers: Modifiers) -> bool {
        self.state.on_up(button, position, modifiers);
        self.suppresses(button)
    }

    /// Raw enter
    pub fn on_pointer_enter(&mut self, position: Vec2) -> bool {
        self.state.on_enter(position);
        false
    }

    /// Raw leave
    pub fn on_pointer_leave(&mut self) -> bool {
        self.state.on_leave();
        false
    }

    /// Raw wheel; the engine always consumes it for zoom
    pub fn on_wheel(&mut self, delta: Vec2) -> bool {
        self.state.on_wheel(delta);
        true
    }

    /// Fold raw events into this frame's state
    pub fn sample(&mut self, delta_time: f32) {
        self.state.update(delta_time);
    }

    /// Update the world position and hovered target; true if the hovered target changed
    pub fn hit_test(&mut self, world: &mut World, camera: &Camera) -> bool {
        self.state.world_position = camera.screen_to_world(self.state.position);

        let hovered = if self.state.on_screen {
            self.find_hovered(world, camera)
        } else {
            None
        };
        let changed = hovered != self.hovered;
        self.hovered = hovered;
        changed
    }

    fn find_hovered(&self, world: &mut World, camera: &Camera) -> Option<(EntityId, ComponentId)> {
        let root = world.root();
        let targets = world.components_of_type(root, POINTER_TARGET);
        let screen_point = self.state.position;
        targets.into_iter().rev().find(|(entity, component)| {
            let Some(matrix) = world.world_matrix(*entity) else {
                return false;
            };
            world
                .component(*entity, *component)
                .and_then(|c| c.as_pointer_target())
                .is_some_and(|target| target.check_if_pointer_over(&matrix, camera, screen_point))
        })
    }

    /// Every pointer target whose screen bounds overlap `screen_rect`, in render order
    pub fn targets_within_box(
        &self,
        world: &mut World,
        camera: &Camera,
        screen_rect: &Rect,
    ) -> Vec<(EntityId, ComponentId)> {
        let root = world.root();
        world
            .components_of_type(root, POINTER_TARGET)
            .into_iter()
            .filter(|(entity, component)| {
                let Some(matrix) = world.world_matrix(*entity) else {
                    return false;
                };
                world
                    .component(*entity, *component)
                    .and_then(|c| c.as_pointer_target())
                    .is_some_and(|target| target.check_if_within_box(&matrix, camera, screen_rect))
            })
            .collect()
    }

    /// End-of-frame cleanup
    pub fn late_update(&mut self) {
        self.state.clear_scroll();
    }

    /// Forget hover and button state, e.g. after the surface lost focus
    pub fn reset(&mut self) {
        self.state.reset_buttons();
        self.hovered = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system() -> PointerSystem {
        PointerSystem::new(&PointerConfig::default())
    }

    #[test]
    fn test_suppression_flags() {
        let mut pointer = system();
        let at = Vec2::new(5.0, 5.0);
        assert!(!pointer.on_pointer_move(at, Modifiers::empty()));
        assert!(!pointer.on_pointer_down(PointerButton::Primary, at, Modifiers::empty()));
        assert!(pointer.on_pointer_down(PointerButton::Secondary, at, Modifiers::empty()));
        assert!(pointer.on_wheel(Vec2::new(0.0, 3.0)));

        pointer.set_drag_enabled(false);
        assert!(!pointer.on_pointer_up(PointerButton::Secondary, at, Modifiers::empty()));
    }

    #[test]
    fn test_click_versus_drag() {
        let mut pointer = system();
        let start = Vec2::new(100.0, 100.0);

        pointer.on_pointer_down(PointerButton::Primary, start, Modifiers::empty());
        pointer.sample(0.016);
        pointer.on_pointer_move(start + Vec2::new(3.0, 0.0), Modifiers::empty());
        pointer.sample(0.016);
        // long hold, short travel: still a click
        for _ in 0..120 {
            pointer.sample(0.016);
        }
        pointer.on_pointer_up(PointerButton::Primary, start + Vec2::new(3.0, 0.0), Modifiers::empty());
        pointer.sample(0.016);
        assert!(pointer.state().is_clicked(PointerButton::Primary));

        pointer.on_pointer_down(PointerButton::Primary, start, Modifiers::empty());
        pointer.sample(0.016);
        pointer.on_pointer_move(start + Vec2::new(3.0, 0.0), Modifiers::empty());
        pointer.on_pointer_move(start, Modifiers::empty());
        pointer.on_pointer_up(PointerButton::Primary, start, Modifiers::empty());
        pointer.sample(0.016);
        // back where it started, but travelled 6px
        assert!(!pointer.state().is_clicked(PointerButton::Primary));
        assert!(pointer.state().is_released(PointerButton::Primary));
    }

    #[test]
    fn test_scroll_cleared_in_late_update() {
        let mut pointer = system();
        pointer.on_wheel(Vec2::new(0.0, 2.0));
        pointer.on_wheel(Vec2::new(0.0, 1.0));
        pointer.sample(0.016);
        assert_eq!(pointer.state().scroll_delta, Vec2::new(0.0, 3.0));
        pointer.late_update();
        assert_eq!(pointer.state().scroll_delta, Vec2::zeros());
    }
}
