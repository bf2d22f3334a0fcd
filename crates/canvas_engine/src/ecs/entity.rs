//! Entity implementation
//!
//! An entity is a node of the scene tree. It owns its transform, its
//! components and an optional behavior hook; the tree links (parent and
//! children) are arena keys managed by the [`World`](super::World).

use std::sync::atomic::{AtomicU64, Ordering};

use bitflags::bitflags;

use super::component::{Component, ComponentId};
use super::components::transform::Transform;
use super::context::UpdateContext;
use super::world::World;
use crate::foundation::math::Vec2;

slotmap::new_key_type! {
    /// Arena key of an entity; stale once the entity is destroyed
    pub struct EntityId;
}

static NEXT_ENTITY_SERIAL: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_entity_serial() -> u64 {
    NEXT_ENTITY_SERIAL.fetch_add(1, Ordering::Relaxed)
}

bitflags! {
    /// Axes along which an entity cancels camera zoom
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ScaleAxes: u8 {
        /// Horizontal axis
        const X = 1 << 0;
        /// Vertical axis
        const Y = 1 << 1;
    }
}

/// Custom per-entity logic run after the entity's components and children
pub trait Behavior {
    /// Per-frame hook; return true if something visible changed
    fn update(&mut self, _ctx: &mut UpdateContext<'_, '_>) -> bool {
        false
    }

    /// Called once while the entity is being destroyed, after its children
    fn destroy(&mut self, _entity: EntityId, _world: &mut World) {}
}

/// Construction options for an entity
#[derive(Debug, Clone, PartialEq)]
pub struct EntityConfig {
    /// Human-readable name
    pub name: String,
    /// Position relative to the parent
    pub position: Vec2,
    /// Rotation in degrees
    pub rotation: f32,
    /// Scale
    pub scale: Vec2,
    /// Draw order among siblings; negative draws behind the parent's own components
    pub z_index: i32,
    /// Opacity multiplied into every descendant draw
    pub opacity: f32,
    /// Disabled entities are skipped by update and render
    pub enabled: bool,
    /// Axes that cancel the camera zoom
    pub scale_to_camera: ScaleAxes,
}

impl Default for EntityConfig {
    fn default() -> Self {
        Self {
            name: "entity".to_string(),
            position: Vec2::zeros(),
            rotation: 0.0,
            scale: Vec2::new(1.0, 1.0),
            z_index: 0,
            opacity: 1.0,
            enabled: true,
            scale_to_camera: ScaleAxes::empty(),
        }
    }
}

impl EntityConfig {
    /// Defaults with a name
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    /// Set the position
    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    /// Set the rotation in degrees
    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the scale
    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    /// Set the z-index
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Set the opacity
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    /// Start disabled
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Cancel camera zoom on the given axes
    pub fn with_scale_to_camera(mut self, axes: ScaleAxes) -> Self {
        self.scale_to_camera = axes;
        self
    }
}

/// Scene tree node
pub struct Entity {
    serial: u64,
    pub(crate) name: String,
    pub(crate) enabled: bool,
    pub(crate) z_index: i32,
    pub(crate) opacity: f32,
    pub(crate) transform: Transform,
    pub(crate) scale_to_camera: ScaleAxes,
    pub(crate) parent: Option<EntityId>,
    pub(crate) children: Vec<EntityId>,
    pub(crate) children_sort_dirty: bool,
    pub(crate) components: Vec<Component>,
    pub(crate) behavior: Option<Box<dyn Behavior>>,
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("serial", &self.serial)
            .field("name", &self.name)
            .field("enabled", &self.enabled)
            .field("z_index", &self.z_index)
            .field("children", &self.children.len())
            .field("components", &self.components.len())
            .field("has_behavior", &self.behavior.is_some())
            .finish()
    }
}

impl Entity {
    pub(crate) fn new(config: EntityConfig, parent: Option<EntityId>) -> Self {
        Self {
            serial: next_entity_serial(),
            name: config.name,
            enabled: config.enabled,
            z_index: config.z_index,
            opacity: config.opacity.clamp(0.0, 1.0),
            transform: Transform::new(config.position, config.rotation, config.scale),
            scale_to_camera: config.scale_to_camera,
            parent,
            children: Vec::new(),
            children_sort_dirty: false,
            components: Vec::new(),
            behavior: None,
        }
    }

    /// Process-unique creation serial; breaks z-index ties
    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// Name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Enabled flag
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Draw order among siblings
    pub fn z_index(&self) -> i32 {
        self.z_index
    }

    /// Own opacity (not multiplied by ancestors)
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Transform values
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Camera-zoom cancelling axes
    pub fn scale_to_camera(&self) -> ScaleAxes {
        self.scale_to_camera
    }

    /// Parent key, `None` for the root and detached entities
    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    /// Children in insertion order (z-sorted once the world has sorted them)
    pub fn children(&self) -> &[EntityId] {
        &self.children
    }

    /// Components in insertion order
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Component by id
    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.iter().find(|c| c.id() == id)
    }

    /// Mutable component by id
    pub fn component_mut(&mut self, id: ComponentId) -> Option<&mut Component> {
        self.components.iter_mut().find(|c| c.id() == id)
    }

    /// First component of a type
    pub fn component_of_type(&self, type_name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.type_name() == type_name)
    }

    /// Whether a behavior hook is attached
    pub fn has_behavior(&self) -> bool {
        self.behavior.is_some()
    }

    pub(crate) fn sort_key(&self) -> (i32, u64) {
        (self.z_index, self.serial)
    }
}
