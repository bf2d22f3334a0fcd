//! Drawing surface abstraction
//!
//! The render system replays commands against a [`DrawingSurface`], a
//! canvas-2D style immediate-mode API. Platform adapters implement it for
//! their real canvas; [`RecordingSurface`] captures calls for headless runs
//! and tests.

use crate::assets::ImageData;
use crate::foundation::math::{Affine2D, Vec2};
use crate::render::commands::TextAlign;
use crate::render::style::{Color, LineCap, LineJoin};

/// Immediate-mode 2D drawing target
pub trait DrawingSurface {
    /// Pixel size of the surface
    fn size(&self) -> Vec2;

    /// Fill the whole surface, ignoring the current transform
    fn clear(&mut self, color: Color);

    /// Replace the current transform
    fn set_transform(&mut self, transform: &Affine2D);

    /// Global alpha applied to every draw
    fn set_global_alpha(&mut self, alpha: f32);

    /// Fill color for subsequent fills
    fn set_fill_color(&mut self, color: Color);

    /// Stroke color for subsequent strokes
    fn set_stroke_color(&mut self, color: Color);

    /// Stroke width in current-transform units
    fn set_line_width(&mut self, width: f32);

    /// Line join for subsequent strokes
    fn set_line_join(&mut self, join: LineJoin);

    /// Line cap for subsequent strokes
    fn set_line_cap(&mut self, cap: LineCap);

    /// Image smoothing for subsequent image draws
    fn set_image_smoothing(&mut self, enabled: bool);

    /// Fill an axis-aligned rectangle
    fn fill_rect(&mut self, position: Vec2, size: Vec2);

    /// Stroke an axis-aligned rectangle
    fn stroke_rect(&mut self, position: Vec2, size: Vec2);

    /// Fill the ellipse inscribed in a rectangle
    fn fill_ellipse(&mut self, position: Vec2, size: Vec2);

    /// Stroke the ellipse inscribed in a rectangle
    fn stroke_ellipse(&mut self, position: Vec2, size: Vec2);

    /// Stroke a line segment
    fn stroke_line(&mut self, from: Vec2, to: Vec2);

    /// Draw an image scaled into a rectangle
    fn draw_image(&mut self, image: &ImageData, position: Vec2, size: Vec2);

    /// Fill text at an anchor point
    fn fill_text(&mut self, text: &str, position: Vec2, font_size: f32, align: TextAlign);
}

/// One recorded surface call
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    /// `clear`
    Clear(Color),
    /// `set_transform`
    SetTransform(Affine2D),
    /// `set_global_alpha`
    GlobalAlpha(f32),
    /// `set_fill_color`
    FillColor(Color),
    /// `set_stroke_color`
    StrokeColor(Color),
    /// `set_line_width`
    LineWidth(f32),
    /// `set_line_join`
    LineJoin(LineJoin),
    /// `set_line_cap`
    LineCap(LineCap),
    /// `set_image_smoothing`
    ImageSmoothing(bool),
    /// `fill_rect`
    FillRect(Vec2, Vec2),
    /// `stroke_rect`
    StrokeRect(Vec2, Vec2),
    /// `fill_ellipse`
    FillEllipse(Vec2, Vec2),
    /// `stroke_ellipse`
    StrokeEllipse(Vec2, Vec2),
    /// `stroke_line`
    Line(Vec2, Vec2),
    /// `draw_image` (records the image name)
    Image(String, Vec2, Vec2),
    /// `fill_text`
    Text(String, Vec2, f32, TextAlign),
}

/// Surface that records every call
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    size: Vec2,
    ops: Vec<SurfaceOp>,
    clear_count: u32,
}

impl RecordingSurface {
    /// Create a surface of the given pixel size
    pub fn new(width: f32, height: f32) -> Self {
        Self { size: Vec2::new(width, height), ops: Vec::new(), clear_count: 0 }
    }

    /// Change the reported size (simulates a canvas resize)
    pub fn resize(&mut self, width: f32, height: f32) {
        self.size = Vec2::new(width, height);
    }

    /// Calls recorded since the last `take_ops`
    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    /// Drain recorded calls
    pub fn take_ops(&mut self) -> Vec<SurfaceOp> {
        std::mem::take(&mut self.ops)
    }

    /// Number of `clear` calls, i.e. frames actually rendered
    pub fn clear_count(&self) -> u32 {
        self.clear_count
    }

    /// Number of recorded draw calls (fills, strokes, images, text)
    pub fn draw_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| {
                matches!(
                    op,
                    SurfaceOp::FillRect(..)
                        | SurfaceOp::StrokeRect(..)
                        | SurfaceOp::FillEllipse(..)
                        | SurfaceOp::StrokeEllipse(..)
                        | SurfaceOp::Line(..)
                        | SurfaceOp::Image(..)
                        | SurfaceOp::Text(..)
                )
            })
            .count()
    }
}

impl DrawingSurface for RecordingSurface {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn clear(&mut self, color: Color) {
        self.clear_count += 1;
        self.ops.push(SurfaceOp::Clear(color));
    }

    fn set_transform(&mut self, transform: &Affine2D) {
        self.ops.push(SurfaceOp::SetTransform(*transform));
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.ops.push(SurfaceOp::GlobalAlpha(alpha));
    }

    fn set_fill_color(&mut self, color: Color) {
        self.ops.push(SurfaceOp::FillColor(color));
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.ops.push(SurfaceOp::StrokeColor(color));
    }

    fn set_line_width(&mut self, width: f32) {
        self.ops.push(SurfaceOp::LineWidth(width));
    }

    fn set_line_join(&mut self, join: LineJoin) {
        self.ops.push(SurfaceOp::LineJoin(join));
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.ops.push(SurfaceOp::LineCap(cap));
    }

    fn set_image_smoothing(&mut self, enabled: bool) {
        self.ops.push(SurfaceOp::ImageSmoothing(enabled));
    }

    fn fill_rect(&mut self, position: Vec2, size: Vec2) {
        self.ops.push(SurfaceOp::FillRect(position, size));
    }

    fn stroke_rect(&mut self, position: Vec2, size: Vec2) {
        self.ops.push(SurfaceOp::StrokeRect(position, size));
    }

    fn fill_ellipse(&mut self, position: Vec2, size: Vec2) {
        self.ops.push(SurfaceOp::FillEllipse(position, size));
    }

    fn stroke_ellipse(&mut self, position: Vec2, size: Vec2) {
        self.ops.push(SurfaceOp::StrokeEllipse(position, size));
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2) {
        self.ops.push(SurfaceOp::Line(from, to));
    }

    fn draw_image(&mut self, image: &ImageData, position: Vec2, size: Vec2) {
        self.ops.push(SurfaceOp::Image(image.name.clone(), position, size));
    }

    fn fill_text(&mut self, text: &str, position: Vec2, font_size: f32, align: TextAlign) {
        self.ops.push(SurfaceOp::Text(text.to_string(), position, font_size, align));
    }
}
