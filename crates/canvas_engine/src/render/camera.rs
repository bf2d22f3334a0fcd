//! 2D camera model
//!
//! The camera maps world units to surface pixels:
//!
//! ```text
//! world_to_screen = translate(canvas_center) * translate(position)
//!                 * rotate(rotation) * scale(2^zoom)
//! ```
//!
//! `position` is therefore a screen-space offset from the canvas centre, and
//! zoom is logarithmic (0 = 1x, 1 = 2x, -1 = 0.5x). Both matrices and the
//! visible world bounds are cached until a parameter or the canvas size
//! changes.

use std::cell::Cell;

use crate::foundation::math::{Affine2D, Rect, Vec2};

#[derive(Debug, Clone, Copy)]
struct CameraCache {
    world_to_screen: Affine2D,
    screen_to_world: Affine2D,
    world_bounds: Rect,
}

/// View parameters plus cached derived matrices
#[derive(Debug, Clone)]
pub struct Camera {
    zoom: f32,
    rotation: f32,
    position: Vec2,
    canvas_size: Vec2,
    cache: Cell<Option<CameraCache>>,
    recomputes: Cell<u32>,
    changed: bool,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    /// Camera at the origin, zoom 0, no canvas yet
    pub fn new() -> Self {
        Self {
            zoom: 0.0,
            rotation: 0.0,
            position: Vec2::zeros(),
            canvas_size: Vec2::zeros(),
            cache: Cell::new(None),
            recomputes: Cell::new(0),
            changed: true,
        }
    }

    /// Log2 zoom
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Linear scale factor, `2^zoom`
    pub fn scale(&self) -> f32 {
        self.zoom.exp2()
    }

    /// Rotation in degrees
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Screen-space offset from the canvas centre
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Surface size in pixels
    pub fn canvas_size(&self) -> Vec2 {
        self.canvas_size
    }

    /// Canvas centre in pixels
    pub fn canvas_center(&self) -> Vec2 {
        self.canvas_size * 0.5
    }

    /// Set zoom; returns true if it changed
    pub fn set_zoom(&mut self, zoom: f32) -> bool {
        if self.zoom == zoom {
            return false;
        }
        self.zoom = zoom;
        self.invalidate();
        true
    }

    /// Set rotation; returns true if it changed
    pub fn set_rotation(&mut self, rotation: f32) -> bool {
        if self.rotation == rotation {
            return false;
        }
        self.rotation = rotation;
        self.invalidate();
        true
    }

    /// Set position; returns true if it changed
    pub fn set_position(&mut self, position: Vec2) -> bool {
        if self.position == position {
            return false;
        }
        self.position = position;
        self.invalidate();
        true
    }

    /// Set canvas size; returns true if it changed
    pub fn set_canvas_size(&mut self, size: Vec2) -> bool {
        if self.canvas_size == size {
            return false;
        }
        self.canvas_size = size;
        self.invalidate();
        true
    }

    fn invalidate(&mut self) {
        self.cache.set(None);
        self.changed = true;
    }

    fn cached(&self) -> CameraCache {
        if let Some(cache) = self.cache.get() {
            return cache;
        }
        let scale = self.scale();
        let world_to_screen = Affine2D::from_trs(
            self.canvas_center() + self.position,
            self.rotation,
            Vec2::new(scale, scale),
        );
        let screen_to_world = world_to_screen.try_inverse().unwrap_or_default();
        let corners = [
            Vec2::zeros(),
            Vec2::new(self.canvas_size.x, 0.0),
            Vec2::new(0.0, self.canvas_size.y),
            self.canvas_size,
        ]
        .map(|corner| screen_to_world.transform_point(corner));
        let world_bounds = Rect::from_points(&corners)
            .unwrap_or_else(|| Rect::new(Vec2::zeros(), Vec2::zeros()));

        let cache = CameraCache { world_to_screen, screen_to_world, world_bounds };
        self.cache.set(Some(cache));
        self.recomputes.set(self.recomputes.get() + 1);
        cache
    }

    /// World -> screen matrix
    pub fn world_to_screen_matrix(&self) -> Affine2D {
        self.cached().world_to_screen
    }

    /// Screen -> world matrix
    pub fn screen_to_world_matrix(&self) -> Affine2D {
        self.cached().screen_to_world
    }

    /// Axis-aligned world rectangle covering the visible canvas
    pub fn world_bounds(&self) -> Rect {
        self.cached().world_bounds
    }

    /// Map a screen pixel to world units
    pub fn screen_to_world(&self, point: Vec2) -> Vec2 {
        self.screen_to_world_matrix().transform_point(point)
    }

    /// Map a world point to screen pixels
    pub fn world_to_screen(&self, point: Vec2) -> Vec2 {
        self.world_to_screen_matrix().transform_point(point)
    }

    /// How many times the cached matrices were rebuilt
    pub fn matrix_recomputes(&self) -> u32 {
        self.recomputes.get()
    }

    /// True if any parameter changed since the last call
    pub fn take_changed(&mut self) -> bool {
        std::mem::replace(&mut self.changed, false)
    }
}
