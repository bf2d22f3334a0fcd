//! Camera drag component
//!
//! Pans the camera while one of its buttons is held over the surface and
//! zooms toward the pointer on wheel input. The engine attaches one to a
//! root-level controller entity built from the pointer configuration.

use crate::ecs::component::ComponentId;
use crate::ecs::context::UpdateContext;
use crate::foundation::math::Vec2;
use crate::input::{CursorKind, PointerButton, PointerButtons};

/// Default priority of the grabbing cursor
pub const DRAG_CURSOR_PRIORITY: i32 = 100;

/// Pointer-driven camera pan and zoom
#[derive(Debug, Clone, PartialEq)]
pub struct CameraDrag {
    /// Buttons that pan while held
    pub buttons: PointerButtons,
    /// Wheel zooms toward the pointer
    pub zoom_enabled: bool,
    /// Priority of the grabbing cursor request
    pub cursor_priority: i32,
    dragging: bool,
}

impl CameraDrag {
    /// Drag with the given buttons, zoom enabled
    pub fn new(buttons: PointerButtons) -> Self {
        Self {
            buttons,
            zoom_enabled: true,
            cursor_priority: DRAG_CURSOR_PRIORITY,
            dragging: false,
        }
    }

    /// Disable wheel zoom
    pub fn without_zoom(mut self) -> Self {
        self.zoom_enabled = false;
        self
    }

    /// Currently panning
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub(crate) fn update(&mut self, id: ComponentId, ctx: &mut UpdateContext<'_, '_>) -> bool {
        let pointer = ctx.frame.pointer;
        let state = pointer.state();
        let request_id = format!("camera-drag-{}", id.0);
        let mut changed = false;

        let held = pointer.drag_enabled()
            && state.on_screen
            && PointerButton::ALL
                .iter()
                .any(|button| self.buttons.has(*button) && state.is_down(*button));

        if held {
            if !self.dragging {
                self.dragging = true;
                ctx.frame.cursor.request(&request_id, CursorKind::Grabbing, self.cursor_priority);
            }
            if state.delta != Vec2::zeros() {
                changed |= ctx.frame.camera.translate(state.delta);
            }
        } else if self.dragging {
            self.dragging = false;
            ctx.frame.cursor.cancel(&request_id);
        }

        if self.zoom_enabled && state.on_screen && state.scroll_delta.y != 0.0 {
            changed |= ctx.frame.camera.zoom_camera(-state.scroll_delta.y, Some(state.position));
        }
        changed
    }
}
