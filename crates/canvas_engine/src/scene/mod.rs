//! Scene management
//!
//! A scene is a named subtree with its own lifecycle: it builds its entities
//! when created, may run per-frame logic, and is torn down with its root
//! entity.
//!
//! ```text
//! register(id, factory) -> create_scene(id) -> [flush] -> Scene::create
//!                                              update ... Scene::update
//!                          destroy_scene(id) -> [flush] -> Scene::destroy
//! ```

mod scene_system;

pub use scene_system::{SceneFactory, SceneSystem};

use crate::ecs::{EntityId, UpdateContext, World};
use crate::engine::EngineError;

/// Lifecycle hooks of a scene
///
/// `ctx.entity` is the scene's root entity in every hook that takes a
/// context.
pub trait Scene {
    /// Build the scene's entities under its root
    fn create(&mut self, ctx: &mut UpdateContext<'_, '_>) -> Result<(), EngineError>;

    /// Per-frame logic after the scene's subtree updated; true if something visible changed
    fn update(&mut self, _ctx: &mut UpdateContext<'_, '_>) -> bool {
        false
    }

    /// Called while the scene's root is being destroyed (its children are already gone)
    fn destroy(&mut self, _root: EntityId, _world: &mut World) {}
}
