//! Drawable capability
//!
//! Shared by every component that puts pixels on the surface: a style, a
//! local rectangle (offset + size), an opacity factor, optional grid tiling
//! and a visibility toggle.

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec2;
use crate::render::commands::ShapeDraw;
use crate::render::style::RenderStyle;

/// Grid repetition of a drawable
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tiling {
    /// Copies along x and y
    pub repeat: (u32, u32),
    /// Spacing between copies
    pub gap: Vec2,
}

impl Tiling {
    /// `columns` x `rows` copies with no gap
    pub fn grid(columns: u32, rows: u32) -> Self {
        Self { repeat: (columns, rows), gap: Vec2::zeros() }
    }

    /// Set the gap between copies
    pub fn with_gap(mut self, gap: Vec2) -> Self {
        self.gap = gap;
        self
    }
}

/// Style and placement of something drawn in entity-local space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Drawable {
    /// Render style
    pub style: RenderStyle,
    /// Top-left corner relative to the entity origin
    pub offset: Vec2,
    /// Width and height
    pub size: Vec2,
    /// Opacity factor on top of the entity opacity
    pub opacity: f32,
    /// Optional grid repetition
    pub tiling: Option<Tiling>,
    /// Hidden drawables emit nothing but still update
    pub visible: bool,
}

impl Default for Drawable {
    fn default() -> Self {
        Self {
            style: RenderStyle::default(),
            offset: Vec2::zeros(),
            size: Vec2::new(1.0, 1.0),
            opacity: 1.0,
            tiling: None,
            visible: true,
        }
    }
}

impl Drawable {
    /// Drawable of `size` centred on the entity origin
    pub fn centered(size: Vec2) -> Self {
        Self { offset: -size * 0.5, size, ..Self::default() }
    }

    /// Set the style
    pub fn with_style(mut self, style: RenderStyle) -> Self {
        self.style = style;
        self
    }

    /// Set the offset
    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    /// Set the size
    pub fn with_size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }

    /// Set the opacity factor
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    /// Repeat in a grid
    pub fn with_tiling(mut self, tiling: Tiling) -> Self {
        self.tiling = Some(tiling);
        self
    }

    /// Whether anything would be drawn
    pub fn is_drawn(&self) -> bool {
        self.visible
            && self.opacity > 0.0
            && self.tiling.map_or(true, |t| t.repeat.0 > 0 && t.repeat.1 > 0)
    }

    /// Placement as a (possibly tiled) shape draw
    pub fn shape_draw(&self) -> ShapeDraw {
        match self.tiling {
            Some(tiling) => ShapeDraw {
                position: self.offset,
                size: self.size,
                repeat: tiling.repeat,
                gap: tiling.gap,
            },
            None => ShapeDraw::single(self.offset, self.size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_offset() {
        let drawable = Drawable::centered(Vec2::new(10.0, 4.0));
        assert_eq!(drawable.offset, Vec2::new(-5.0, -2.0));
        assert_eq!(drawable.shape_draw().repeat, (1, 1));
    }

    #[test]
    fn test_tiled_shape_draw() {
        let drawable = Drawable::default()
            .with_size(Vec2::new(2.0, 2.0))
            .with_tiling(Tiling::grid(3, 2).with_gap(Vec2::new(1.0, 0.0)));
        let shape = drawable.shape_draw();
        let tiles: Vec<_> = shape.tiles().collect();
        assert_eq!(tiles.len(), 6);
        assert_eq!(tiles[2], Vec2::new(6.0, 0.0));
        assert_eq!(tiles[3], Vec2::new(0.0, 2.0));
    }

    #[test]
    fn test_empty_tiling_is_not_drawn() {
        let drawable = Drawable::default().with_tiling(Tiling::grid(0, 4));
        assert!(!drawable.is_drawn());
        assert!(Drawable::default().is_drawn());
    }
}
