//! Text component

use super::drawable::Drawable;
use crate::render::commands::TextAlign;
use crate::render::style::{Color, RenderStyle};
use crate::render::RenderQueue;

/// Single line of text anchored at the drawable offset
#[derive(Debug, Clone, PartialEq)]
pub struct TextComponent {
    /// Text to draw
    pub text: String,
    /// Font size in local units
    pub font_size: f32,
    /// Horizontal alignment relative to the anchor
    pub align: TextAlign,
    /// Style (fill color) and anchor
    pub drawable: Drawable,
}

impl TextComponent {
    /// White, left-aligned text
    pub fn new(text: impl Into<String>, font_size: f32) -> Self {
        Self {
            text: text.into(),
            font_size,
            align: TextAlign::Left,
            drawable: Drawable::default().with_style(RenderStyle::new().with_fill(Color::WHITE)),
        }
    }

    /// Set the alignment
    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    /// Replace the drawable
    pub fn with_drawable(mut self, drawable: Drawable) -> Self {
        self.drawable = drawable;
        self
    }

    pub(crate) fn queue_render_commands(&self, queue: &mut RenderQueue<'_>) {
        if !self.drawable.visible || self.font_size <= 0.0 {
            return;
        }
        queue.draw_text(
            &self.drawable.style,
            self.drawable.opacity,
            &self.text,
            self.drawable.offset,
            self.font_size,
            self.align,
        );
    }
}
