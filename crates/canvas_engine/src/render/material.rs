//! Material interning
//!
//! Materials are resolved render styles addressed by a small integer id.
//! The registry is append-only for the life of the render system.

use super::style::{Color, LineCap, LineJoin, RenderStyle, ResolvedStyle, StyleKey};
use crate::foundation::collections::HashFactory;

/// Small integer handle to an interned material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub u32);

/// Drawing state applied to the surface when a material is selected
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Id in the registry
    pub id: MaterialId,
    /// Fill color with the style opacity folded into alpha
    pub fill: Option<Color>,
    /// Stroke color with the style opacity folded into alpha
    pub stroke: Option<Color>,
    /// Stroke width in screen pixels
    pub line_width: f32,
    /// Line join
    pub line_join: LineJoin,
    /// Line cap
    pub line_cap: LineCap,
    /// Image smoothing
    pub smoothing: bool,
}

impl Material {
    fn from_resolved(id: MaterialId, style: &ResolvedStyle) -> Self {
        Self {
            id,
            fill: style.fill.map(|c| c.with_alpha_factor(style.opacity)),
            stroke: style.stroke.map(|c| c.with_alpha_factor(style.opacity)),
            line_width: style.line_width,
            line_join: style.line_join,
            line_cap: style.line_cap,
            smoothing: style.smoothing,
        }
    }
}

/// Content-keyed material cache
#[derive(Debug, Default)]
pub struct MaterialRegistry {
    materials: HashFactory<StyleKey, Material>,
}

impl MaterialRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Material id for a style, interning it on first sight
    pub fn intern(&mut self, style: &RenderStyle) -> MaterialId {
        let resolved = style.resolve();
        let next = MaterialId(u32::try_from(self.materials.len()).unwrap_or(u32::MAX));
        let id = self.materials.intern(resolved.key(), |_| Material::from_resolved(next, &resolved));
        MaterialId(id)
    }

    /// Look up a material
    pub fn get(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0)
    }

    /// Number of distinct materials
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// True when nothing was interned
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_resolved_styles_share_material() {
        let mut registry = MaterialRegistry::new();
        let a = registry.intern(&RenderStyle::new().with_stroke(Color::WHITE));
        let b = registry.intern(&RenderStyle::new().with_stroke(Color::WHITE).with_line_width(1.0));
        assert_eq!(a, b);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_one_field_difference_gives_new_material() {
        let mut registry = MaterialRegistry::new();
        let thin = registry.intern(&RenderStyle::new().with_stroke(Color::WHITE).with_line_width(1.0));
        let thick = registry.intern(&RenderStyle::new().with_stroke(Color::WHITE).with_line_width(2.0));
        assert_ne!(thin, thick);
        assert_eq!(registry.get(thick).unwrap().line_width, 2.0);
        assert_eq!(registry.get(thick).unwrap().id, thick);
    }

    #[test]
    fn test_opacity_folds_into_alpha() {
        let mut registry = MaterialRegistry::new();
        let id = registry.intern(&RenderStyle::new().with_fill(Color::rgb(255, 0, 0)).with_opacity(0.5));
        let material = registry.get(id).unwrap();
        assert_eq!(material.fill, Some(Color::rgba(255, 0, 0, 128)));
        assert_eq!(material.stroke, None);
        assert!(registry.get(MaterialId(42)).is_none());
    }
}
