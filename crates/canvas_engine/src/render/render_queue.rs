//! # Render Queue
//!
//! Write handle handed to the render traversal for one frame. It pairs the
//! frame's [`RenderCommandStream`] with the material registry and the text
//! interner, so components describe draws in terms of styles and strings and
//! never see material or text ids.

use crate::assets::ImageId;
use crate::foundation::collections::HashFactory;
use crate::foundation::math::{Affine2D, Vec2};
use crate::render::commands::{RenderCommandStream, ShapeDraw, TextAlign};
use crate::render::material::{MaterialId, MaterialRegistry};
use crate::render::style::RenderStyle;

/// Per-frame writer over the render system's stream
pub struct RenderQueue<'a> {
    stream: &'a mut RenderCommandStream,
    materials: &'a mut MaterialRegistry,
    texts: &'a mut HashFactory<String, String>,
}

impl<'a> RenderQueue<'a> {
    pub(crate) fn new(
        stream: &'a mut RenderCommandStream,
        materials: &'a mut MaterialRegistry,
        texts: &'a mut HashFactory<String, String>,
    ) -> Self {
        Self { stream, materials, texts }
    }

    /// Open an entity's transform scope
    pub fn push_transform(&mut self, local: &Affine2D, opacity: f32) {
        self.stream.push_transform(local, opacity);
    }

    /// Close the innermost transform scope
    pub fn pop_transform(&mut self) {
        self.stream.pop_transform();
    }

    /// Intern a style as a material
    pub fn material(&mut self, style: &RenderStyle) -> MaterialId {
        self.materials.intern(style)
    }

    /// Intern a string, returning its id
    pub fn intern_text(&mut self, text: &str) -> u32 {
        self.texts.intern(text.to_string(), |key| key.clone())
    }

    /// Rectangle(s); styles with neither fill nor stroke draw nothing
    pub fn draw_rect(&mut self, style: &RenderStyle, opacity: f32, shape: &ShapeDraw) {
        if style.resolve().is_invisible() {
            return;
        }
        let material = self.material(style);
        self.stream.draw_rect(material, opacity, shape);
    }

    /// Ellipse(s) inscribed in the shape rectangle
    pub fn draw_ellipse(&mut self, style: &RenderStyle, opacity: f32, shape: &ShapeDraw) {
        if style.resolve().is_invisible() {
            return;
        }
        let material = self.material(style);
        self.stream.draw_ellipse(material, opacity, shape);
    }

    /// Line segment, stroked with the style's stroke color
    pub fn draw_line(&mut self, style: &RenderStyle, opacity: f32, from: Vec2, to: Vec2) {
        if style.stroke.is_none() {
            return;
        }
        let material = self.material(style);
        self.stream.draw_line(material, opacity, from, to);
    }

    /// Image scaled into the shape rectangle(s)
    pub fn draw_image(&mut self, image: ImageId, opacity: f32, shape: &ShapeDraw) {
        self.stream.draw_image(image, opacity, shape);
    }

    /// Text filled with the style's fill color
    pub fn draw_text(
        &mut self,
        style: &RenderStyle,
        opacity: f32,
        text: &str,
        position: Vec2,
        font_size: f32,
        align: TextAlign,
    ) {
        if text.is_empty() || style.fill.is_none() {
            return;
        }
        let material = self.material(style);
        let text_id = self.intern_text(text);
        self.stream.draw_text(material, opacity, text_id, position, font_size, align);
    }

    /// Underlying stream
    pub fn stream(&self) -> &RenderCommandStream {
        self.stream
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::commands::Opcode;
    use crate::render::style::Color;

    #[test]
    fn test_invisible_styles_skip_draws() {
        let mut stream = RenderCommandStream::new();
        let mut materials = MaterialRegistry::new();
        let mut texts = HashFactory::new();
        let mut queue = RenderQueue::new(&mut stream, &mut materials, &mut texts);

        let shape = ShapeDraw::single(Vec2::zeros(), Vec2::new(4.0, 4.0));
        queue.push_transform(&Affine2D::translation(Vec2::new(1.0, 0.0)), 1.0);
        queue.draw_rect(&RenderStyle::new(), 1.0, &shape);
        queue.draw_line(&RenderStyle::new().with_fill(Color::WHITE), 1.0, Vec2::zeros(), Vec2::x());
        queue.draw_text(&RenderStyle::new(), 1.0, "hidden", Vec2::zeros(), 12.0, TextAlign::Left);
        queue.pop_transform();

        assert!(queue.stream().is_empty());
        assert!(materials.is_empty());
    }

    #[test]
    fn test_text_is_interned_once() {
        let mut stream = RenderCommandStream::new();
        let mut materials = MaterialRegistry::new();
        let mut texts = HashFactory::new();
        {
            let mut queue = RenderQueue::new(&mut stream, &mut materials, &mut texts);
            let style = RenderStyle::new().with_fill(Color::WHITE);
            queue.draw_text(&style, 1.0, "label", Vec2::zeros(), 12.0, TextAlign::Center);
            queue.draw_text(&style, 1.0, "label", Vec2::new(0.0, 20.0), 12.0, TextAlign::Center);
            assert_eq!(queue.stream().count(Opcode::DrawText), 2);
            assert_eq!(queue.stream().count(Opcode::SetMaterial), 1);
        }
        assert_eq!(texts.len(), 1);
        assert_eq!(materials.len(), 1);
    }
}
