//! Entity-Component-System implementation
//!
//! A rooted tree of entities stored in a slot-map arena. Entities carry a
//! transform, components and an optional behavior; systems are engine-wide
//! services lent to the tree during update.

pub mod component;
pub mod components;
pub mod context;
pub mod entity;
pub mod resources;
pub mod systems;
pub mod world;

#[cfg(test)]
mod tests;

pub use component::{Component, ComponentId, ComponentKind};
pub use context::{FrameContext, UpdateContext};
pub use entity::{Behavior, Entity, EntityConfig, EntityId, ScaleAxes};
pub use resources::Resources;
pub use world::{World, WorldStats};
