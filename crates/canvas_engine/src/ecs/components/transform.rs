//! Entity transform
//!
//! Position, rotation (degrees) and scale relative to the parent entity,
//! plus a scale multiplier applied on top of the authored scale (used for
//! scale-to-camera). The local matrix is cached behind a dirty flag; the
//! world matrix cache lives here too but is managed by the [`World`], which
//! knows the parent chain.
//!
//! [`World`]: crate::ecs::World

use crate::foundation::math::{Affine2D, Vec2};

/// Local transform with cached matrices
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    position: Vec2,
    rotation: f32,
    scale: Vec2,
    scale_multiplier: Vec2,
    local: Affine2D,
    local_dirty: bool,
    pub(crate) world: Affine2D,
    pub(crate) world_dirty: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Vec2::zeros(), 0.0, Vec2::new(1.0, 1.0))
    }
}

impl Transform {
    /// Create from position, rotation in degrees and scale
    pub fn new(position: Vec2, rotation: f32, scale: Vec2) -> Self {
        Self {
            position,
            rotation,
            scale,
            scale_multiplier: Vec2::new(1.0, 1.0),
            local: Affine2D::identity(),
            local_dirty: true,
            world: Affine2D::identity(),
            world_dirty: true,
        }
    }

    /// Position relative to the parent
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Rotation in degrees
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Authored scale
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    /// Multiplier applied on top of the authored scale
    pub fn scale_multiplier(&self) -> Vec2 {
        self.scale_multiplier
    }

    /// Scale actually used for the matrix
    pub fn effective_scale(&self) -> Vec2 {
        self.scale.component_mul(&self.scale_multiplier)
    }

    pub(crate) fn set_position(&mut self, position: Vec2) -> bool {
        if self.position == position {
            return false;
        }
        self.position = position;
        self.local_dirty = true;
        true
    }

    pub(crate) fn set_rotation(&mut self, rotation: f32) -> bool {
        if self.rotation == rotation {
            return false;
        }
        self.rotation = rotation;
        self.local_dirty = true;
        true
    }

    pub(crate) fn set_scale(&mut self, scale: Vec2) -> bool {
        if self.scale == scale {
            return false;
        }
        self.scale = scale;
        self.local_dirty = true;
        true
    }

    pub(crate) fn set_scale_multiplier(&mut self, multiplier: Vec2) -> bool {
        if self.scale_multiplier == multiplier {
            return false;
        }
        self.scale_multiplier = multiplier;
        self.local_dirty = true;
        true
    }

    /// True when the cached local matrix is stale
    pub fn is_local_dirty(&self) -> bool {
        self.local_dirty
    }

    /// True when the cached world matrix is stale
    pub fn is_world_dirty(&self) -> bool {
        self.world_dirty
    }

    /// Rebuild the local matrix if stale; returns true if it was rebuilt
    pub(crate) fn refresh_local(&mut self) -> bool {
        if !self.local_dirty {
            return false;
        }
        self.local = Affine2D::from_trs(self.position, self.rotation, self.effective_scale());
        self.local_dirty = false;
        true
    }

    /// Cached local matrix (may be stale; the world refreshes it before use)
    pub fn cached_local(&self) -> Affine2D {
        self.local
    }

    /// Local matrix computed from the current values, bypassing the cache
    pub fn compute_local(&self) -> Affine2D {
        Affine2D::from_trs(self.position, self.rotation, self.effective_scale())
    }
}
