//! Polyline component

use super::drawable::Drawable;
use crate::foundation::math::Vec2;
use crate::render::RenderQueue;

/// Connected line segments through local points
#[derive(Debug, Clone, PartialEq)]
pub struct LineComponent {
    /// Points in entity-local space
    pub points: Vec<Vec2>,
    /// Connect the last point back to the first
    pub closed: bool,
    /// Style (stroke color and width); offset shifts every point
    pub drawable: Drawable,
}

impl LineComponent {
    /// Open polyline
    pub fn new(points: Vec<Vec2>, drawable: Drawable) -> Self {
        Self { points, closed: false, drawable }
    }

    /// Closed polygon outline
    pub fn closed(points: Vec<Vec2>, drawable: Drawable) -> Self {
        Self { points, closed: true, drawable }
    }

    /// Segments in draw order
    pub fn segments(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        let closing = if self.closed && self.points.len() > 2 {
            self.points.last().copied().zip(self.points.first().copied())
        } else {
            None
        };
        self.points
            .windows(2)
            .map(|pair| (pair[0], pair[1]))
            .chain(closing)
    }

    pub(crate) fn queue_render_commands(&self, queue: &mut RenderQueue<'_>) {
        if self.points.len() < 2 || !self.drawable.visible {
            return;
        }
        let offset = self.drawable.offset;
        for (from, to) in self.segments() {
            queue.draw_line(&self.drawable.style, self.drawable.opacity, from + offset, to + offset);
        }
    }
}
