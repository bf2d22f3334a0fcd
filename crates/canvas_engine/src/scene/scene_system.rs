//! Scene system
//!
//! Scenes are registered under an id with a factory. Creating or destroying
//! a scene only queues the request; the engine flushes the queue during its
//! early update, when no traversal is running. Each active scene owns one
//! root-level entity named after its id, and the scene object rides on that
//! entity as its behavior, so destroying the entity destroys the scene.

use std::collections::HashMap;
use std::mem;

use super::Scene;
use crate::ecs::{Behavior, EntityConfig, EntityId, FrameContext, UpdateContext, World};
use crate::engine::EngineError;

/// Builds a fresh scene instance
pub type SceneFactory = Box<dyn Fn() -> Box<dyn Scene>>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum SceneRequest {
    Create(String),
    Destroy(String),
}

/// Adapts a scene to the entity behavior hook
struct SceneBehavior {
    id: String,
    scene: Box<dyn Scene>,
}

impl Behavior for SceneBehavior {
    fn update(&mut self, ctx: &mut UpdateContext<'_, '_>) -> bool {
        self.scene.update(ctx)
    }

    fn destroy(&mut self, entity: EntityId, world: &mut World) {
        self.scene.destroy(entity, world);
        log::info!("Destroyed scene '{}'", self.id);
    }
}

/// Scene registry and lifecycle queue
#[derive(Default)]
pub struct SceneSystem {
    factories: HashMap<String, SceneFactory>,
    active: Vec<(String, EntityId)>,
    pending: Vec<SceneRequest>,
}

impl std::fmt::Debug for SceneSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneSystem")
            .field("registered", &self.factories.keys().collect::<Vec<_>>())
            .field("active", &self.active)
            .field("pending", &self.pending)
            .finish()
    }
}

impl SceneSystem {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scene factory, replacing any previous one under `id`
    pub fn register(&mut self, id: impl Into<String>, factory: SceneFactory) {
        let id = id.into();
        log::debug!("Registered scene '{}'", id);
        self.factories.insert(id, factory);
    }

    /// Whether a factory exists for `id`
    pub fn is_registered(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Queue creation of a registered scene
    pub fn create_scene(&mut self, id: &str) -> Result<(), EngineError> {
        if !self.factories.contains_key(id) {
            return Err(EngineError::UnknownScene(id.to_string()));
        }
        self.pending.push(SceneRequest::Create(id.to_string()));
        Ok(())
    }

    /// Queue destruction of a scene; false if it is neither active nor queued
    pub fn destroy_scene(&mut self, id: &str) -> bool {
        let queued = self.pending.iter().any(|request| *request == SceneRequest::Create(id.to_string()));
        if self.scene_entity(id).is_none() && !queued {
            return false;
        }
        self.pending.push(SceneRequest::Destroy(id.to_string()));
        true
    }

    /// Root entity of an active scene
    pub fn scene_entity(&self, id: &str) -> Option<EntityId> {
        self.active.iter().find(|(name, _)| name == id).map(|(_, entity)| *entity)
    }

    /// Ids of active scenes in creation order
    pub fn active_scenes(&self) -> impl Iterator<Item = &str> + '_ {
        self.active.iter().map(|(id, _)| id.as_str())
    }

    /// Whether requests are waiting for the next flush
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Forget active scenes and queued requests; factories stay registered
    ///
    /// Does not touch the world, the caller tears the scene roots down.
    pub fn clear(&mut self) {
        self.active.clear();
        self.pending.clear();
    }

    /// Apply queued requests; returns true if any scene was created or destroyed
    pub fn flush(&mut self, world: &mut World, frame: &mut FrameContext<'_>) -> bool {
        self.active.retain(|(_, entity)| world.contains(*entity));
        let mut changed = false;

        for request in mem::take(&mut self.pending) {
            match request {
                SceneRequest::Create(id) => changed |= self.instantiate(&id, world, frame),
                SceneRequest::Destroy(id) => {
                    if let Some(index) = self.active.iter().position(|(name, _)| *name == id) {
                        let (_, entity) = self.active.remove(index);
                        world.destroy_entity(entity);
                        changed = true;
                    }
                }
            }
        }
        changed
    }

    fn instantiate(&mut self, id: &str, world: &mut World, frame: &mut FrameContext<'_>) -> bool {
        if self.scene_entity(id).is_some() {
            log::warn!("Scene '{}' is already active", id);
            return false;
        }
        let Some(factory) = self.factories.get(id) else {
            log::error!("{}", EngineError::UnknownScene(id.to_string()));
            return false;
        };
        let mut scene = factory();

        let entity = match world.create_entity(None, EntityConfig::named(id)) {
            Ok(entity) => entity,
            Err(error) => {
                log::error!("Scene '{}' has no root: {}", id, error);
                return false;
            }
        };
        if let Err(error) = scene.create(&mut UpdateContext { entity, world, frame }) {
            log::error!("Scene '{}' failed to create: {}", id, error);
            world.destroy_entity(entity);
            return false;
        }

        world.set_behavior(entity, Box::new(SceneBehavior { id: id.to_string(), scene }));
        self.active.push((id.to_string(), entity));
        log::info!("Created scene '{}'", id);
        true
    }
}
