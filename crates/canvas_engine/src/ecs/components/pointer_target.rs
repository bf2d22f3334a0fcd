//! Pointer target component
//!
//! Makes an entity hoverable and clickable. The pointer system decides
//! which target is hovered each frame (topmost in draw order wins); the
//! component turns that into per-frame edges and button state.

use serde::{Deserialize, Serialize};

use crate::ecs::component::ComponentId;
use crate::ecs::context::UpdateContext;
use crate::foundation::math::{Affine2D, Rect, Vec2};
use crate::input::{CursorKind, PointerButton, PointerButtons};
use crate::render::Camera;

/// Hit area shape in local space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitShape {
    /// Axis-aligned rectangle
    Rectangle,
    /// Ellipse inscribed in the rectangle
    Ellipse,
}

/// Hover and button state as of the last update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerTargetState {
    /// Pointer is over this target (and it is the topmost target)
    pub hovered: bool,
    /// Became hovered this frame
    pub entered: bool,
    /// Stopped being hovered this frame
    pub left: bool,
    /// Buttons pressed over the target this frame
    pub pressed: PointerButtons,
    /// Buttons released this frame after being pressed over the target
    pub released: PointerButtons,
    /// Buttons clicked (press and release without dragging) over the target
    pub clicked: PointerButtons,
    /// Buttons pressed over the target and still held
    pub held: PointerButtons,
}

/// Hoverable, clickable area attached to an entity
#[derive(Debug, Clone, PartialEq)]
pub struct PointerTarget {
    /// Hit area shape
    pub shape: HitShape,
    /// Hit area size
    pub size: Vec2,
    /// Top-left of the hit area relative to the entity origin
    pub offset: Vec2,
    /// Cursor shown while hovered, with its priority
    pub hover_cursor: Option<(CursorKind, i32)>,
    state: PointerTargetState,
}

impl PointerTarget {
    /// Rectangle hit area of `size` centred on the entity origin
    pub fn rectangle(size: Vec2) -> Self {
        Self {
            shape: HitShape::Rectangle,
            size,
            offset: -size * 0.5,
            hover_cursor: None,
            state: PointerTargetState::default(),
        }
    }

    /// Ellipse hit area of `size` centred on the entity origin
    pub fn ellipse(size: Vec2) -> Self {
        Self { shape: HitShape::Ellipse, ..Self::rectangle(size) }
    }

    /// Set the hit area offset
    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    /// Show a cursor while hovered
    pub fn with_hover_cursor(mut self, cursor: CursorKind, priority: i32) -> Self {
        self.hover_cursor = Some((cursor, priority));
        self
    }

    /// State as of the last update
    pub fn state(&self) -> &PointerTargetState {
        &self.state
    }

    /// Hovered as of the last update
    pub fn is_hovered(&self) -> bool {
        self.state.hovered
    }

    /// Whether a local-space point lies in the hit area
    pub fn contains_local(&self, point: Vec2) -> bool {
        let min = self.offset;
        let max = self.offset + self.size;
        match self.shape {
            HitShape::Rectangle => Rect::from_corners(min, max).contains(point),
            HitShape::Ellipse => {
                let radii = self.size.abs() * 0.5;
                if radii.x <= 0.0 || radii.y <= 0.0 {
                    return false;
                }
                let centre = (min + max) * 0.5;
                let dx = (point.x - centre.x) / radii.x;
                let dy = (point.y - centre.y) / radii.y;
                dx * dx + dy * dy <= 1.0
            }
        }
    }

    /// Whether a screen point is inside the hit area of an entity with `world_matrix`
    pub fn check_if_pointer_over(&self, world_matrix: &Affine2D, camera: &Camera, screen_point: Vec2) -> bool {
        let to_screen = camera.world_to_screen_matrix() * *world_matrix;
        to_screen
            .try_inverse()
            .is_some_and(|to_local| self.contains_local(to_local.transform_point(screen_point)))
    }

    /// Whether the hit area's screen bounding box overlaps `screen_rect`
    pub fn check_if_within_box(&self, world_matrix: &Affine2D, camera: &Camera, screen_rect: &Rect) -> bool {
        let to_screen = camera.world_to_screen_matrix() * *world_matrix;
        let corners = [
            self.offset,
            self.offset + Vec2::new(self.size.x, 0.0),
            self.offset + Vec2::new(0.0, self.size.y),
            self.offset + self.size,
        ]
        .map(|corner| to_screen.transform_point(corner));
        Rect::from_points(&corners).is_some_and(|bounds| bounds.intersects(screen_rect))
    }

    pub(crate) fn cursor_request_id(id: ComponentId) -> String {
        format!("pointer-target-{}", id.0)
    }

    pub(crate) fn update(&mut self, id: ComponentId, ctx: &mut UpdateContext<'_, '_>) -> bool {
        let pointer = ctx.frame.pointer;
        let hovered = pointer.hovered() == Some((ctx.entity, id));
        let was_hovered = self.state.hovered;
        let state = pointer.state();

        let pressed = buttons_where(|button| state.is_pressed(button));
        let released = buttons_where(|button| state.is_released(button));
        let clicked = buttons_where(|button| state.is_clicked(button));

        self.state.hovered = hovered;
        self.state.entered = hovered && !was_hovered;
        self.state.left = was_hovered && !hovered;
        self.state.pressed = if hovered { pressed } else { PointerButtons::empty() };
        let tracked = self.state.held | self.state.pressed;
        self.state.released = released & tracked;
        self.state.clicked = if hovered { clicked & tracked } else { PointerButtons::empty() };
        self.state.held = tracked & state.buttons_down();

        if let Some((cursor, priority)) = self.hover_cursor {
            let request_id = Self::cursor_request_id(id);
            if hovered {
                ctx.frame.cursor.request(&request_id, cursor, priority);
            } else if was_hovered {
                ctx.frame.cursor.cancel(&request_id);
            }
        }

        self.state.entered || self.state.left
    }
}

fn buttons_where(mut predicate: impl FnMut(PointerButton) -> bool) -> PointerButtons {
    PointerButton::ALL
        .iter()
        .filter(|button| predicate(**button))
        .fold(PointerButtons::empty(), |acc, button| acc | button.flag())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        let mut camera = Camera::new();
        camera.set_canvas_size(Vec2::new(200.0, 100.0));
        camera
    }

    #[test]
    fn test_rectangle_hit() {
        let target = PointerTarget::rectangle(Vec2::new(20.0, 10.0));
        let world = Affine2D::translation(Vec2::new(10.0, 0.0));
        let camera = camera();
        // entity origin lands at screen (110, 50)
        assert!(target.check_if_pointer_over(&world, &camera, Vec2::new(110.0, 50.0)));
        assert!(target.check_if_pointer_over(&world, &camera, Vec2::new(119.0, 54.0)));
        assert!(!target.check_if_pointer_over(&world, &camera, Vec2::new(121.0, 50.0)));
    }

    #[test]
    fn test_ellipse_excludes_corners() {
        let target = PointerTarget::ellipse(Vec2::new(20.0, 20.0));
        assert!(target.contains_local(Vec2::new(9.0, 0.0)));
        assert!(!target.contains_local(Vec2::new(9.0, 9.0)));
    }

    #[test]
    fn test_hit_follows_rotation_and_zoom() {
        let target = PointerTarget::rectangle(Vec2::new(40.0, 4.0));
        let world = Affine2D::rotation_degrees(90.0);
        let mut camera = camera();
        camera.set_zoom(1.0);
        // rotated bar is vertical, 80px tall on screen after zoom
        assert!(target.check_if_pointer_over(&world, &camera, Vec2::new(100.0, 85.0)));
        assert!(!target.check_if_pointer_over(&world, &camera, Vec2::new(130.0, 50.0)));
    }

    #[test]
    fn test_within_box() {
        let target = PointerTarget::rectangle(Vec2::new(10.0, 10.0));
        let world = Affine2D::identity();
        let camera = camera();
        let hit = Rect::from_corners(Vec2::new(104.0, 54.0), Vec2::new(150.0, 90.0));
        let miss = Rect::from_corners(Vec2::new(106.0, 56.0), Vec2::new(150.0, 90.0));
        assert!(target.check_if_within_box(&world, &camera, &hit));
        assert!(!target.check_if_within_box(&world, &camera, &miss));
    }
}
