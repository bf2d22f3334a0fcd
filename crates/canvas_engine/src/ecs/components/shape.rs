//! Shape component
//!
//! Rectangles, ellipses and single line segments. Lines take their end
//! points from the geometry rather than the drawable rectangle.

use serde::{Deserialize, Serialize};

use super::drawable::Drawable;
use crate::foundation::math::Vec2;
use crate::render::RenderQueue;

/// What a shape draws
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShapeGeometry {
    /// Axis-aligned rectangle filling the drawable rectangle
    Rectangle,
    /// Ellipse inscribed in the drawable rectangle
    Ellipse,
    /// Segment between two local points; both must be set
    Line {
        /// Start point
        start: Option<Vec2>,
        /// End point
        end: Option<Vec2>,
    },
}

/// Primitive shape
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    /// Geometry
    pub geometry: ShapeGeometry,
    /// Style and placement
    pub drawable: Drawable,
}

impl Shape {
    /// Rectangle with the given drawable
    pub fn rectangle(drawable: Drawable) -> Self {
        Self { geometry: ShapeGeometry::Rectangle, drawable }
    }

    /// Ellipse with the given drawable
    pub fn ellipse(drawable: Drawable) -> Self {
        Self { geometry: ShapeGeometry::Ellipse, drawable }
    }

    /// Segment from `start` to `end`
    pub fn line(start: Vec2, end: Vec2, drawable: Drawable) -> Self {
        Self {
            geometry: ShapeGeometry::Line { start: Some(start), end: Some(end) },
            drawable,
        }
    }

    pub(crate) fn queue_render_commands(&self, queue: &mut RenderQueue<'_>) {
        if !self.drawable.is_drawn() {
            return;
        }
        let style = &self.drawable.style;
        let opacity = self.drawable.opacity;
        let shape = self.drawable.shape_draw();

        match self.geometry {
            ShapeGeometry::Rectangle => queue.draw_rect(style, opacity, &shape),
            ShapeGeometry::Ellipse => queue.draw_ellipse(style, opacity, &shape),
            ShapeGeometry::Line { start: Some(start), end: Some(end) } => {
                for tile in shape.tiles() {
                    let shift = tile - shape.position;
                    queue.draw_line(style, opacity, start + shift, end + shift);
                }
            }
            ShapeGeometry::Line { start, end } => {
                log::debug!(
                    "Line shape missing {}; nothing drawn",
                    if start.is_none() { "start point" } else { "end point" }
                );
            }
        }
    }
}
