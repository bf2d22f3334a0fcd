//! Update contexts
//!
//! The engine threads these through the tree update instead of exposing a
//! global engine handle. [`FrameContext`] borrows every system disjointly
//! from the engine for the duration of one frame; [`UpdateContext`] adds the
//! world and the entity currently being updated.

use super::entity::EntityId;
use super::resources::Resources;
use super::systems::{CameraSystem, ImageSystem, KeyboardSystem, PointerSystem};
use super::world::World;
use crate::input::CursorRegistry;

/// Systems available to updates during one frame
pub struct FrameContext<'a> {
    /// Seconds since the previous frame
    pub delta_time: f32,
    /// Camera, mutable so components can pan and zoom
    pub camera: &'a mut CameraSystem,
    /// Pointer state sampled this frame
    pub pointer: &'a PointerSystem,
    /// Keyboard state sampled this frame
    pub keyboard: &'a KeyboardSystem,
    /// Image requests and lookups
    pub images: &'a mut ImageSystem,
    /// Cursor requests
    pub cursor: &'a mut CursorRegistry,
    /// Editor-owned data
    pub resources: &'a mut Resources,
}

/// Context for updating one entity
pub struct UpdateContext<'a, 'f> {
    /// Entity being updated
    pub entity: EntityId,
    /// The tree (the entity's components are detached while they update)
    pub world: &'a mut World,
    /// Frame-wide systems
    pub frame: &'a mut FrameContext<'f>,
}

impl<'a, 'f> UpdateContext<'a, 'f> {
    /// Context for a different entity sharing the same borrows
    pub fn reborrow(&mut self, entity: EntityId) -> UpdateContext<'_, 'f> {
        UpdateContext { entity, world: self.world, frame: self.frame }
    }

    /// Seconds since the previous frame
    pub fn delta_time(&self) -> f32 {
        self.frame.delta_time
    }
}
