//! Colors and render styles
//!
//! A [`RenderStyle`] leaves any field unset; [`RenderStyle::resolve`] fills in
//! the defaults. Two styles that resolve to the same values share one
//! [`StyleKey`] and therefore one material.

use serde::{Deserialize, Serialize};

/// 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha
    pub a: u8,
}

impl Color {
    /// Opaque black
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Opaque white
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    /// Fully transparent
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    /// Opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color with alpha
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let nibble = |i: usize| u8::from_str_radix(&digits[i..=i], 16).ok().map(|v| v * 17);
        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        match digits.len() {
            3 => Some(Self::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
            4 => Some(Self::rgba(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    /// Alpha as a 0..1 fraction
    pub fn alpha(&self) -> f32 {
        f32::from(self.a) / 255.0
    }

    /// Same color with alpha multiplied by `factor` (clamped to 0..1)
    #[must_use]
    pub fn with_alpha_factor(self, factor: f32) -> Self {
        let alpha = (self.alpha() * factor.clamp(0.0, 1.0) * 255.0).round();
        Self { a: alpha as u8, ..self }
    }

    /// CSS `rgba(...)` string
    pub fn to_css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.alpha())
    }
}

/// How stroked line segments join
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LineJoin {
    /// Sharp corner
    #[default]
    Miter,
    /// Rounded corner
    Round,
    /// Cut-off corner
    Bevel,
}

/// How stroked line ends are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LineCap {
    /// Flat end at the endpoint
    #[default]
    Butt,
    /// Rounded end
    Round,
    /// Flat end extended by half the line width
    Square,
}

/// Authoring-side style; unset fields take defaults on resolve
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderStyle {
    /// Fill color (none: no fill)
    pub fill: Option<Color>,
    /// Stroke color (none: no stroke)
    pub stroke: Option<Color>,
    /// Stroke width in screen pixels (default 1)
    pub line_width: Option<f32>,
    /// Line join (default miter)
    pub line_join: Option<LineJoin>,
    /// Line cap (default butt)
    pub line_cap: Option<LineCap>,
    /// Image smoothing (default on)
    pub smoothing: Option<bool>,
    /// Style opacity (default 1)
    pub opacity: Option<f32>,
}

impl RenderStyle {
    /// Empty style (every field default)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fill color
    pub fn with_fill(mut self, color: Color) -> Self {
        self.fill = Some(color);
        self
    }

    /// Set the stroke color
    pub fn with_stroke(mut self, color: Color) -> Self {
        self.stroke = Some(color);
        self
    }

    /// Set the stroke width
    pub fn with_line_width(mut self, width: f32) -> Self {
        self.line_width = Some(width);
        self
    }

    /// Set the line join
    pub fn with_line_join(mut self, join: LineJoin) -> Self {
        self.line_join = Some(join);
        self
    }

    /// Set the line cap
    pub fn with_line_cap(mut self, cap: LineCap) -> Self {
        self.line_cap = Some(cap);
        self
    }

    /// Set image smoothing
    pub fn with_smoothing(mut self, smoothing: bool) -> Self {
        self.smoothing = Some(smoothing);
        self
    }

    /// Set the style opacity
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    /// Apply defaults
    pub fn resolve(&self) -> ResolvedStyle {
        ResolvedStyle {
            fill: self.fill,
            stroke: self.stroke,
            line_width: self.line_width.unwrap_or(1.0),
            line_join: self.line_join.unwrap_or_default(),
            line_cap: self.line_cap.unwrap_or_default(),
            smoothing: self.smoothing.unwrap_or(true),
            opacity: self.opacity.unwrap_or(1.0).clamp(0.0, 1.0),
        }
    }
}

/// Style with every field decided
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedStyle {
    /// Fill color
    pub fill: Option<Color>,
    /// Stroke color
    pub stroke: Option<Color>,
    /// Stroke width
    pub line_width: f32,
    /// Line join
    pub line_join: LineJoin,
    /// Line cap
    pub line_cap: LineCap,
    /// Image smoothing
    pub smoothing: bool,
    /// Style opacity
    pub opacity: f32,
}

impl ResolvedStyle {
    /// Content key used for material interning
    pub fn key(&self) -> StyleKey {
        StyleKey {
            fill: self.fill,
            stroke: self.stroke,
            line_width_bits: canonical_bits(self.line_width),
            line_join: self.line_join,
            line_cap: self.line_cap,
            smoothing: self.smoothing,
            opacity_bits: canonical_bits(self.opacity),
        }
    }

    /// Nothing would be painted by shape draws with this style
    pub fn is_invisible(&self) -> bool {
        self.fill.is_none() && self.stroke.is_none()
    }
}

// -0.0 and 0.0 must produce one key
fn canonical_bits(value: f32) -> u32 {
    if value == 0.0 { 0 } else { value.to_bits() }
}

/// Hashable identity of a resolved style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StyleKey {
    fill: Option<Color>,
    stroke: Option<Color>,
    line_width_bits: u32,
    line_join: LineJoin,
    line_cap: LineCap,
    smoothing: bool,
    opacity_bits: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parsing() {
        assert_eq!(Color::from_hex("#fff"), Some(Color::WHITE));
        assert_eq!(Color::from_hex("#1e1e24"), Some(Color::rgb(0x1e, 0x1e, 0x24)));
        assert_eq!(Color::from_hex("#ff000080"), Some(Color::rgba(255, 0, 0, 0x80)));
        assert_eq!(Color::from_hex("#0008"), Some(Color::rgba(0, 0, 0, 0x88)));
        assert_eq!(Color::from_hex("fff"), None);
        assert_eq!(Color::from_hex("#ggg"), None);
        assert_eq!(Color::from_hex("#12345"), None);
    }

    #[test]
    fn test_alpha_factor() {
        let color = Color::rgb(10, 20, 30).with_alpha_factor(0.5);
        assert_eq!(color.a, 128);
        assert_eq!(Color::WHITE.with_alpha_factor(2.0).a, 255);
        assert_eq!(Color::rgba(1, 2, 3, 255).to_css(), "rgba(1, 2, 3, 1)");
    }

    #[test]
    fn test_resolve_defaults() {
        let resolved = RenderStyle::new().resolve();
        assert_eq!(resolved.fill, None);
        assert_eq!(resolved.stroke, None);
        assert_eq!(resolved.line_width, 1.0);
        assert_eq!(resolved.line_join, LineJoin::Miter);
        assert_eq!(resolved.line_cap, LineCap::Butt);
        assert!(resolved.smoothing);
        assert_eq!(resolved.opacity, 1.0);
        assert!(resolved.is_invisible());
    }

    #[test]
    fn test_explicit_defaults_share_key() {
        let implicit = RenderStyle::new().with_fill(Color::BLACK);
        let explicit = RenderStyle::new()
            .with_fill(Color::BLACK)
            .with_line_width(1.0)
            .with_line_join(LineJoin::Miter)
            .with_line_cap(LineCap::Butt)
            .with_smoothing(true)
            .with_opacity(1.0);
        assert_eq!(implicit.resolve().key(), explicit.resolve().key());
        assert_ne!(
            implicit.resolve().key(),
            implicit.with_line_width(2.0).resolve().key()
        );
    }
}
