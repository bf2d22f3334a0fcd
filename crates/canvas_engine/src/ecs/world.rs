//! World implementation
//!
//! The world owns every entity in a slot-map arena and links them into one
//! rooted tree. Parent links are plain keys, so destroying an entity leaves
//! no dangling references: a stale [`EntityId`] simply stops resolving.
//!
//! ## Transform caching
//!
//! Each entity caches its local and world matrix. Transform setters only mark
//! state dirty when a value actually changed, and marking walks the changed
//! entity's subtree only. A dirty entity always has dirty descendants, so the
//! walk stops at entities that are already dirty. Matrices are rebuilt lazily
//! on read; [`WorldStats`] counts rebuilds.
//!
//! ## Traversal
//!
//! Children are kept sorted by `(z_index, serial)`. Sorting is deferred until
//! a traversal needs it. Update visits components, then children, then the
//! behavior hook. Render visits negative-z children, then the entity's own
//! components, then the remaining children.

use std::mem;

use slotmap::SlotMap;

use super::component::{Component, ComponentId};
use super::context::{FrameContext, UpdateContext};
use super::entity::{Behavior, Entity, EntityConfig, EntityId, ScaleAxes};
use crate::engine::EngineError;
use crate::foundation::math::{Affine2D, Vec2};
use crate::render::RenderQueue;

/// Matrix rebuild counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldStats {
    /// World matrices rebuilt
    pub world_recomputes: u64,
    /// Local matrices rebuilt
    pub local_recomputes: u64,
}

/// Entity arena plus the scene tree
pub struct World {
    entities: SlotMap<EntityId, Entity>,
    root: EntityId,
    stats: WorldStats,
    updating_components: Option<EntityId>,
    pending_component_removals: Vec<ComponentId>,
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.entities.len())
            .field("root", &self.root)
            .field("stats", &self.stats)
            .finish()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Create a world containing only the root entity
    pub fn new() -> Self {
        let mut entities = SlotMap::with_key();
        let root = entities.insert(Entity::new(EntityConfig::named("root"), None));
        Self {
            entities,
            root,
            stats: WorldStats::default(),
            updating_components: None,
            pending_component_removals: Vec::new(),
        }
    }

    /// Root entity
    pub fn root(&self) -> EntityId {
        self.root
    }

    /// Number of live entities, root included
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Always false: the root exists for the world's whole life
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Whether the id still resolves
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(id)
    }

    /// Entity by id
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Mutable entity by id
    ///
    /// Tree links and transform values are only changed through the world,
    /// which keeps caches and sort order consistent.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    /// First entity with this name, in arena order
    pub fn find_by_name(&self, name: &str) -> Option<EntityId> {
        self.entities.iter().find(|(_, entity)| entity.name == name).map(|(id, _)| id)
    }

    /// Rebuild counters
    pub fn stats(&self) -> WorldStats {
        self.stats
    }

    /// Zero the rebuild counters
    pub fn reset_stats(&mut self) {
        self.stats = WorldStats::default();
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Create an entity under `parent` (the root when `None`)
    pub fn create_entity(&mut self, parent: Option<EntityId>, config: EntityConfig) -> Result<EntityId, EngineError> {
        let parent = parent.unwrap_or(self.root);
        if !self.entities.contains_key(parent) {
            return Err(EngineError::InvalidEntity(format!(
                "cannot create '{}' under a destroyed parent",
                config.name
            )));
        }
        let id = self.entities.insert(Entity::new(config, Some(parent)));
        if let Some(parent) = self.entities.get_mut(parent) {
            parent.children.push(id);
            parent.children_sort_dirty = true;
        }
        Ok(id)
    }

    /// Destroy an entity and its subtree
    ///
    /// Depth first: the entity's components are dropped, its children are
    /// destroyed, its behavior's `destroy` hook runs, then it is unlinked.
    /// Returns false for the root and for stale ids.
    pub fn destroy_entity(&mut self, id: EntityId) -> bool {
        if id == self.root {
            log::warn!("The root entity cannot be destroyed");
            return false;
        }
        if !self.entities.contains_key(id) {
            return false;
        }
        self.destroy_recursive(id);
        true
    }

    fn destroy_recursive(&mut self, id: EntityId) {
        let Some(entity) = self.entities.get_mut(id) else {
            return;
        };
        entity.components.clear();
        let children = mem::take(&mut entity.children);
        for child in children {
            self.destroy_recursive(child);
        }

        if let Some(mut behavior) = self.entities.get_mut(id).and_then(|entity| entity.behavior.take()) {
            behavior.destroy(id, self);
            // The hook may have attached new children
            let late_children = self
                .entities
                .get_mut(id)
                .map(|entity| mem::take(&mut entity.children))
                .unwrap_or_default();
            for child in late_children {
                self.destroy_recursive(child);
            }
        }

        self.unlink_from_parent(id);
        self.entities.remove(id);
    }

    /// Destroy everything except the root
    pub fn clear(&mut self) {
        let children = self.entities.get(self.root).map(|root| root.children.clone()).unwrap_or_default();
        for child in children {
            self.destroy_recursive(child);
        }
    }

    // ---------------------------------------------------------------------
    // Hierarchy
    // ---------------------------------------------------------------------

    /// Move `child` under `parent`
    pub fn add_child(&mut self, parent: EntityId, child: EntityId) -> Result<(), EngineError> {
        self.set_parent(child, Some(parent))
    }

    /// Reparent an entity; `None` detaches it from the tree
    ///
    /// Fails for stale ids, for the root, and when the move would create a
    /// cycle.
    pub fn set_parent(&mut self, child: EntityId, parent: Option<EntityId>) -> Result<(), EngineError> {
        if child == self.root {
            return Err(EngineError::InvalidEntity("the root cannot be reparented".to_string()));
        }
        if !self.entities.contains_key(child) {
            return Err(EngineError::InvalidEntity("reparenting a destroyed entity".to_string()));
        }
        let Some(parent) = parent else {
            self.detach(child);
            return Ok(());
        };
        if !self.entities.contains_key(parent) {
            return Err(EngineError::InvalidEntity("new parent was destroyed".to_string()));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(EngineError::InvalidEntity(
                "an entity cannot become a descendant of itself".to_string(),
            ));
        }
        if self.entities.get(child).and_then(|entity| entity.parent) == Some(parent) {
            return Ok(());
        }

        self.unlink_from_parent(child);
        if let Some(entity) = self.entities.get_mut(child) {
            entity.parent = Some(parent);
        }
        if let Some(entity) = self.entities.get_mut(parent) {
            entity.children.push(child);
            entity.children_sort_dirty = true;
        }
        self.mark_world_dirty(child);
        Ok(())
    }

    /// Unlink an entity from its parent; it stays alive but is no longer traversed
    pub fn detach(&mut self, id: EntityId) {
        if id == self.root {
            return;
        }
        self.unlink_from_parent(id);
        if let Some(entity) = self.entities.get_mut(id) {
            entity.parent = None;
        }
        self.mark_world_dirty(id);
    }

    fn unlink_from_parent(&mut self, id: EntityId) {
        let Some(parent) = self.entities.get(id).and_then(|entity| entity.parent) else {
            return;
        };
        if let Some(parent) = self.entities.get_mut(parent) {
            parent.children.retain(|child| *child != id);
        }
    }

    /// Whether `ancestor` is `id` or one of its ancestors
    pub fn is_ancestor_or_self(&self, ancestor: EntityId, id: EntityId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.entities.get(node).and_then(|entity| entity.parent);
        }
        false
    }

    // ---------------------------------------------------------------------
    // Attributes
    // ---------------------------------------------------------------------

    /// Set the local position; returns true if it changed
    pub fn set_position(&mut self, id: EntityId, position: Vec2) -> bool {
        self.mutate_transform(id, |transform| transform.set_position(position))
    }

    /// Set the rotation in degrees; returns true if it changed
    pub fn set_rotation(&mut self, id: EntityId, rotation: f32) -> bool {
        self.mutate_transform(id, |transform| transform.set_rotation(rotation))
    }

    /// Set the scale; returns true if it changed
    pub fn set_scale(&mut self, id: EntityId, scale: Vec2) -> bool {
        self.mutate_transform(id, |transform| transform.set_scale(scale))
    }

    /// Set the scale multiplier; returns true if it changed
    pub fn set_scale_multiplier(&mut self, id: EntityId, multiplier: Vec2) -> bool {
        self.mutate_transform(id, |transform| transform.set_scale_multiplier(multiplier))
    }

    fn mutate_transform(
        &mut self,
        id: EntityId,
        mutate: impl FnOnce(&mut super::components::Transform) -> bool,
    ) -> bool {
        let Some(entity) = self.entities.get_mut(id) else {
            return false;
        };
        if !mutate(&mut entity.transform) {
            return false;
        }
        self.mark_world_dirty(id);
        true
    }

    /// Mark the world matrix of `id` and its descendants stale
    fn mark_world_dirty(&mut self, id: EntityId) {
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            let Some(entity) = self.entities.get_mut(node) else {
                continue;
            };
            if entity.transform.world_dirty && node != id {
                continue;
            }
            entity.transform.world_dirty = true;
            stack.extend(entity.children.iter().copied());
        }
    }

    /// Set the z-index; returns true if it changed
    pub fn set_z_index(&mut self, id: EntityId, z_index: i32) -> bool {
        let Some(entity) = self.entities.get_mut(id) else {
            return false;
        };
        if entity.z_index == z_index {
            return false;
        }
        entity.z_index = z_index;
        let parent = entity.parent;
        if let Some(parent) = parent.and_then(|parent| self.entities.get_mut(parent)) {
            parent.children_sort_dirty = true;
        }
        true
    }

    /// Enable or disable; returns true if it changed
    pub fn set_enabled(&mut self, id: EntityId, enabled: bool) -> bool {
        match self.entities.get_mut(id) {
            Some(entity) if entity.enabled != enabled => {
                entity.enabled = enabled;
                true
            }
            _ => false,
        }
    }

    /// Set the opacity (clamped to 0..=1); returns true if it changed
    pub fn set_opacity(&mut self, id: EntityId, opacity: f32) -> bool {
        let opacity = opacity.clamp(0.0, 1.0);
        match self.entities.get_mut(id) {
            Some(entity) if entity.opacity != opacity => {
                entity.opacity = opacity;
                true
            }
            _ => false,
        }
    }

    /// Set which axes cancel the camera zoom
    pub fn set_scale_to_camera(&mut self, id: EntityId, axes: ScaleAxes) {
        if let Some(entity) = self.entities.get_mut(id) {
            entity.scale_to_camera = axes;
        }
        if axes.is_empty() {
            self.set_scale_multiplier(id, Vec2::new(1.0, 1.0));
        }
    }

    /// Attach a behavior hook, replacing any previous one
    pub fn set_behavior(&mut self, id: EntityId, behavior: Box<dyn Behavior>) -> bool {
        match self.entities.get_mut(id) {
            Some(entity) => {
                entity.behavior = Some(behavior);
                true
            }
            None => false,
        }
    }

    // ---------------------------------------------------------------------
    // Matrices
    // ---------------------------------------------------------------------

    /// Local matrix, rebuilt if stale
    pub fn local_matrix(&mut self, id: EntityId) -> Option<Affine2D> {
        let entity = self.entities.get_mut(id)?;
        if entity.transform.refresh_local() {
            self.stats.local_recomputes += 1;
        }
        Some(entity.transform.cached_local())
    }

    /// World matrix (`parent.world * local`), rebuilt along the stale part of the parent chain
    pub fn world_matrix(&mut self, id: EntityId) -> Option<Affine2D> {
        let entity = self.entities.get(id)?;
        if !entity.transform.world_dirty {
            return Some(entity.transform.world);
        }
        let parent = entity.parent;
        let parent_world = match parent {
            Some(parent) => self.world_matrix(parent).unwrap_or_default(),
            None => Affine2D::identity(),
        };
        let local = self.local_matrix(id)?;
        let entity = self.entities.get_mut(id)?;
        entity.transform.world = parent_world * local;
        entity.transform.world_dirty = false;
        self.stats.world_recomputes += 1;
        Some(entity.transform.world)
    }

    // ---------------------------------------------------------------------
    // Components
    // ---------------------------------------------------------------------

    /// Attach a component
    pub fn add_component(&mut self, id: EntityId, component: Component) -> Result<ComponentId, EngineError> {
        let entity = self.entities.get_mut(id).ok_or_else(|| {
            EngineError::InvalidEntity(format!("adding component '{}' to a destroyed entity", component.name))
        })?;
        let component_id = component.id();
        entity.components.push(component);
        Ok(component_id)
    }

    /// Detach and drop a component; returns true if it was found
    ///
    /// Removing a component of the entity whose components are currently
    /// updating takes effect when their update pass ends.
    pub fn remove_component(&mut self, id: EntityId, component: ComponentId) -> bool {
        let Some(entity) = self.entities.get_mut(id) else {
            return false;
        };
        let before = entity.components.len();
        entity.components.retain(|c| c.id() != component);
        if entity.components.len() != before {
            return true;
        }
        if self.updating_components == Some(id) {
            self.pending_component_removals.push(component);
            return true;
        }
        false
    }

    /// Component by id
    pub fn component(&self, id: EntityId, component: ComponentId) -> Option<&Component> {
        self.entities.get(id)?.component(component)
    }

    /// Mutable component by id
    pub fn component_mut(&mut self, id: EntityId, component: ComponentId) -> Option<&mut Component> {
        self.entities.get_mut(id)?.component_mut(component)
    }

    /// Enabled components of a type under `root`, in render traversal order
    pub fn components_of_type(&mut self, root: EntityId, type_name: &str) -> Vec<(EntityId, ComponentId)> {
        self.traversal_order(root)
            .into_iter()
            .filter_map(|id| self.entities.get(id).map(|entity| (id, entity)))
            .flat_map(|(id, entity)| {
                entity
                    .components
                    .iter()
                    .filter(|c| c.enabled && c.type_name() == type_name)
                    .map(move |c| (id, c.id()))
            })
            .collect()
    }

    // ---------------------------------------------------------------------
    // Ordering
    // ---------------------------------------------------------------------

    fn sort_children(&mut self, id: EntityId) {
        let Some(entity) = self.entities.get(id) else {
            return;
        };
        if !entity.children_sort_dirty {
            return;
        }
        let mut keyed: Vec<_> = entity
            .children
            .iter()
            .filter_map(|child| self.entities.get(*child).map(|c| (c.sort_key(), *child)))
            .collect();
        keyed.sort_by_key(|(key, _)| *key);
        if let Some(entity) = self.entities.get_mut(id) {
            entity.children = keyed.into_iter().map(|(_, child)| child).collect();
            entity.children_sort_dirty = false;
        }
    }

    /// Children sorted by `(z_index, serial)`
    pub fn sorted_children(&mut self, id: EntityId) -> Vec<EntityId> {
        self.sort_children(id);
        self.entities.get(id).map(|entity| entity.children.clone()).unwrap_or_default()
    }

    /// Enabled entities under `root` in render order
    ///
    /// Negative-z children (and their subtrees) come first, then the entity
    /// itself, then the remaining children.
    pub fn traversal_order(&mut self, root: EntityId) -> Vec<EntityId> {
        let mut order = Vec::new();
        self.collect_traversal(root, &mut order);
        order
    }

    fn collect_traversal(&mut self, id: EntityId, order: &mut Vec<EntityId>) {
        if !self.entities.get(id).is_some_and(|entity| entity.enabled) {
            return;
        }
        let children = self.sorted_children(id);
        let split = self.first_non_negative(&children);
        for child in &children[..split] {
            self.collect_traversal(*child, order);
        }
        order.push(id);
        for child in &children[split..] {
            self.collect_traversal(*child, order);
        }
    }

    fn first_non_negative(&self, sorted: &[EntityId]) -> usize {
        sorted.partition_point(|child| self.entities.get(*child).is_some_and(|c| c.z_index < 0))
    }

    // ---------------------------------------------------------------------
    // Traversal
    // ---------------------------------------------------------------------

    /// Update the whole tree; true if anything reported a visible change
    pub fn update(&mut self, frame: &mut FrameContext<'_>) -> bool {
        let root = self.root;
        self.update_entity(root, frame)
    }

    /// Update one subtree: components, children, then the behavior hook
    pub fn update_entity(&mut self, id: EntityId, frame: &mut FrameContext<'_>) -> bool {
        let Some(entity) = self.entities.get(id) else {
            return false;
        };
        if !entity.enabled {
            return false;
        }
        let mut changed = false;

        let axes = entity.scale_to_camera;
        if !axes.is_empty() {
            let inverse = 1.0 / frame.camera.camera().scale();
            let multiplier = Vec2::new(
                if axes.contains(ScaleAxes::X) { inverse } else { 1.0 },
                if axes.contains(ScaleAxes::Y) { inverse } else { 1.0 },
            );
            changed |= self.set_scale_multiplier(id, multiplier);
        }

        changed |= self.update_components(id, frame);

        self.sort_children(id);
        let children = self.entities.get(id).map(|entity| entity.children.clone()).unwrap_or_default();
        for child in children {
            let still_ours = self.entities.get(child).is_some_and(|c| c.parent == Some(id));
            if still_ours {
                changed |= self.update_entity(child, frame);
            }
        }

        let behavior = self.entities.get_mut(id).and_then(|entity| entity.behavior.take());
        if let Some(mut behavior) = behavior {
            changed |= behavior.update(&mut UpdateContext { entity: id, world: self, frame });
            match self.entities.get_mut(id) {
                Some(entity) if entity.behavior.is_none() => entity.behavior = Some(behavior),
                Some(_) => {}
                None => behavior.destroy(id, self),
            }
        }
        changed
    }

    fn update_components(&mut self, id: EntityId, frame: &mut FrameContext<'_>) -> bool {
        let Some(entity) = self.entities.get_mut(id) else {
            return false;
        };
        if entity.components.is_empty() {
            return false;
        }
        let mut components = mem::take(&mut entity.components);
        let outer = self.updating_components.replace(id);
        let outer_removals = mem::take(&mut self.pending_component_removals);

        let mut changed = false;
        {
            let mut ctx = UpdateContext { entity: id, world: self, frame };
            for component in &mut components {
                changed |= component.update(&mut ctx);
            }
        }

        self.updating_components = outer;
        let removals = mem::replace(&mut self.pending_component_removals, outer_removals);
        if !removals.is_empty() {
            components.retain(|c| !removals.contains(&c.id()));
            changed = true;
        }
        if let Some(entity) = self.entities.get_mut(id) {
            let added = mem::replace(&mut entity.components, components);
            entity.components.extend(added);
        }
        changed
    }

    /// Record the whole tree into a render queue
    pub fn queue_render_commands(&mut self, queue: &mut RenderQueue<'_>) {
        let root = self.root;
        self.queue_entity(root, queue);
    }

    fn queue_entity(&mut self, id: EntityId, queue: &mut RenderQueue<'_>) {
        let Some(entity) = self.entities.get(id) else {
            return;
        };
        if !entity.enabled {
            return;
        }
        let opacity = entity.opacity;
        let Some(local) = self.local_matrix(id) else {
            return;
        };
        queue.push_transform(&local, opacity);

        self.sort_children(id);
        let children = self.entities.get(id).map(|entity| entity.children.clone()).unwrap_or_default();
        let split = self.first_non_negative(&children);

        for child in &children[..split] {
            self.queue_entity(*child, queue);
        }
        if let Some(entity) = self.entities.get(id) {
            for component in &entity.components {
                component.queue_render_commands(queue);
            }
        }
        for child in &children[split..] {
            self.queue_entity(*child, queue);
        }

        queue.pop_transform();
    }
}
