//! Core engine implementation
//!
//! [`Engine`] owns the scene tree and every system and drives them in a fixed
//! order once per host frame:
//!
//! ```text
//! input sampling -> early update (images, scenes, camera, pointer hit-test)
//!                -> tree update -> late update -> render (only if something changed)
//! ```
//!
//! The host (a platform adapter) forwards raw input events as they arrive and
//! calls [`Engine::run_frame`] at display refresh rate.

use std::mem;

use thiserror::Error;

use crate::assets::ImageLoader;
use crate::config::ConfigError;
use crate::core::config::EngineConfig;
use crate::ecs::components::CameraDrag;
use crate::ecs::systems::{CameraSystem, ImageSystem, KeyboardSystem, PointerSystem};
use crate::ecs::{Component, ComponentId, EntityConfig, EntityId, FrameContext, Resources, World};
use crate::foundation::math::{Rect, Vec2};
use crate::foundation::profiler::{EngineStats, Profiler};
use crate::foundation::time::FrameTimer;
use crate::input::{CursorKind, CursorRegistry, KeyCode, Modifiers, PointerButton, PointerButtons};
use crate::render::{DrawingSurface, RenderSystem, ReplayStats};
use crate::scene::{Scene, SceneSystem};

/// Name of the entity carrying the built-in camera drag component
pub const CAMERA_CONTROLLER: &str = "camera-controller";

/// Outcome of one [`Engine::run_frame`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Some update reported a visible change
    pub changed: bool,
    /// The frame was replayed onto the surface
    pub rendered: bool,
    /// Replay counters when rendered
    pub replay: Option<ReplayStats>,
    /// New cursor to show, if the winning request changed this frame
    pub cursor: Option<CursorKind>,
    /// The stats snapshot was refreshed this frame
    pub stats_refreshed: bool,
}

/// Main engine struct
///
/// The engine coordinates all subsystems and the frame loop.
pub struct Engine {
    config: EngineConfig,
    world: World,
    camera: CameraSystem,
    pointer: PointerSystem,
    keyboard: KeyboardSystem,
    images: ImageSystem,
    cursor: CursorRegistry,
    scenes: SceneSystem,
    renderer: RenderSystem,
    resources: Resources,
    timer: FrameTimer,
    profiler: Profiler,
    stats: EngineStats,
    rendered_frames: u64,
    force_render: bool,
    starting_scenes: Vec<String>,
    camera_controller: EntityId,
    destroyed: bool,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("entities", &self.world.len())
            .field("scenes", &self.scenes)
            .field("frames", &self.timer.frame_count())
            .field("rendered_frames", &self.rendered_frames)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Create a new engine instance
    ///
    /// Validates the configuration, builds every system and queues the
    /// starting scenes for the first frame. Scenes must be registered before
    /// that frame runs.
    pub fn new(config: EngineConfig, image_loader: Box<dyn ImageLoader>) -> Result<Self, EngineError> {
        log::info!("Initializing canvas engine...");
        config.validate()?;
        let clear_color = config.render.clear_color()?;

        let mut world = World::new();
        let camera_controller = world
            .create_entity(None, EntityConfig::named(CAMERA_CONTROLLER).with_z_index(i32::MIN))
            .map_err(|e| EngineError::InitializationFailed(format!("Camera controller: {}", e)))?;
        let drag = CameraDrag::new(PointerButtons::from_buttons(&config.pointer.camera_drag_buttons));
        world
            .add_component(camera_controller, Component::new("camera-drag", drag.into()))
            .map_err(|e| EngineError::InitializationFailed(format!("Camera controller: {}", e)))?;

        let engine = Self {
            camera: CameraSystem::new(config.camera.clone()),
            pointer: PointerSystem::new(&config.pointer),
            keyboard: KeyboardSystem::new(&config.keyboard),
            images: ImageSystem::new(config.images.clone(), image_loader),
            cursor: CursorRegistry::new(),
            scenes: SceneSystem::new(),
            renderer: RenderSystem::new(clear_color, config.render.image_smoothing),
            resources: Resources::new(),
            timer: FrameTimer::new(),
            profiler: Profiler::new(),
            stats: EngineStats::default(),
            rendered_frames: 0,
            force_render: true,
            starting_scenes: config.starting_scenes.clone(),
            camera_controller,
            destroyed: false,
            world,
            config,
        };
        log::info!(
            "Canvas engine ready ({} image sources, {} starting scenes)",
            engine.config.images.len(),
            engine.starting_scenes.len()
        );
        Ok(engine)
    }

    // ---------------------------------------------------------------------
    // Frame loop
    // ---------------------------------------------------------------------

    /// Run one frame; `surface` is `None` while the host has nothing to draw on
    pub fn run_frame(&mut self, delta_time: f32, mut surface: Option<&mut dyn DrawingSurface>) -> FrameReport {
        if self.destroyed {
            log::warn!("run_frame called on a destroyed engine");
            return FrameReport::default();
        }
        self.timer.tick(delta_time);
        let delta_time = self.timer.delta_time();
        self.profiler.begin("frame");

        self.profiler.begin("input");
        self.pointer.sample(delta_time);
        self.keyboard.update(delta_time);
        if let Some(surface) = surface.as_deref() {
            self.camera.set_canvas_size(surface.size());
        }
        self.profiler.end();

        let mut changed = false;

        self.profiler.begin("early_update");
        let image_loaded = self.images.update();
        for id in mem::take(&mut self.starting_scenes) {
            if let Err(error) = self.scenes.create_scene(&id) {
                log::error!("Starting scene skipped: {}", error);
            }
        }
        if self.scenes.has_pending() {
            let mut frame = FrameContext {
                delta_time,
                camera: &mut self.camera,
                pointer: &self.pointer,
                keyboard: &self.keyboard,
                images: &mut self.images,
                cursor: &mut self.cursor,
                resources: &mut self.resources,
            };
            changed |= self.scenes.flush(&mut self.world, &mut frame);
        }
        changed |= self.camera.update(delta_time);
        changed |= self.pointer.hit_test(&mut self.world, self.camera.camera());
        self.profiler.end();

        self.profiler.begin("update");
        {
            let mut frame = FrameContext {
                delta_time,
                camera: &mut self.camera,
                pointer: &self.pointer,
                keyboard: &self.keyboard,
                images: &mut self.images,
                cursor: &mut self.cursor,
                resources: &mut self.resources,
            };
            changed |= self.world.update(&mut frame);
        }
        self.profiler.end();

        self.profiler.begin("late_update");
        self.pointer.late_update();
        changed |= self.camera.take_changed();
        self.profiler.end();

        let mut replay = None;
        if changed || image_loaded || self.force_render {
            self.profiler.begin("render");
            replay = self.render(surface.take());
            self.profiler.end();
        }

        self.profiler.end();
        let stats_refreshed = self.refresh_stats();

        FrameReport {
            changed,
            rendered: replay.is_some(),
            replay,
            cursor: self.cursor.take_change(),
            stats_refreshed,
        }
    }

    fn render(&mut self, surface: Option<&mut dyn DrawingSurface>) -> Option<ReplayStats> {
        if !self.renderer.check_surface(surface.as_deref()) {
            // keep the request so the frame renders once a surface shows up
            self.force_render = true;
            return None;
        }
        let surface = surface?;
        self.force_render = false;

        {
            let mut queue = self.renderer.begin_frame();
            self.world.queue_render_commands(&mut queue);
        }
        let stats = self.renderer.replay(surface, &self.camera.world_to_screen_matrix(), &self.images);
        self.rendered_frames += 1;
        Some(stats)
    }

    fn refresh_stats(&mut self) -> bool {
        if !self.timer.roll_window(self.config.stats_interval_secs) {
            return false;
        }
        self.stats = EngineStats {
            fps: self.timer.fps(),
            frame_count: self.timer.frame_count(),
            rendered_frames: self.rendered_frames,
            trace: self.profiler.snapshot(),
        };
        self.profiler.reset();
        log::trace!("Stats: {:.1} fps, {} rendered", self.stats.fps, self.stats.rendered_frames);
        true
    }

    /// Render on the next frame even if nothing changed
    pub fn force_render(&mut self) {
        self.force_render = true;
    }

    /// Surface size changed
    pub fn resize(&mut self, width: f32, height: f32) {
        if self.camera.set_canvas_size(Vec2::new(width, height)) {
            self.force_render = true;
        }
    }

    /// Tear down every scene and entity; the engine is unusable afterwards
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        log::info!("Destroying canvas engine ({} entities)", self.world.len());
        self.world.clear();
        self.scenes.clear();
        self.images.clear();
        self.cursor.clear();
        self.pointer.reset();
        self.keyboard.reset();
        self.destroyed = true;
    }

    /// Whether [`Engine::destroy`] has run
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    // ---------------------------------------------------------------------
    // Scenes
    // ---------------------------------------------------------------------

    /// Register a scene factory under `id`
    pub fn register_scene(&mut self, id: impl Into<String>, factory: impl Fn() -> Box<dyn Scene> + 'static) {
        self.scenes.register(id, Box::new(factory));
    }

    /// Queue a registered scene for creation at the next frame
    pub fn create_scene(&mut self, id: &str) -> Result<(), EngineError> {
        self.scenes.create_scene(id)
    }

    /// Queue an active scene for destruction at the next frame
    pub fn destroy_scene(&mut self, id: &str) -> bool {
        self.scenes.destroy_scene(id)
    }

    /// Scene registry
    pub fn scenes(&self) -> &SceneSystem {
        &self.scenes
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    /// Get the scene tree
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get mutable access to the scene tree
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Entity carrying the camera drag component
    pub fn camera_controller(&self) -> EntityId {
        self.camera_controller
    }

    /// Get the camera system
    pub fn camera(&self) -> &CameraSystem {
        &self.camera
    }

    /// Get mutable access to the camera system
    pub fn camera_mut(&mut self) -> &mut CameraSystem {
        &mut self.camera
    }

    /// Get the pointer system
    pub fn pointer(&self) -> &PointerSystem {
        &self.pointer
    }

    /// Get mutable access to the pointer system
    pub fn pointer_mut(&mut self) -> &mut PointerSystem {
        &mut self.pointer
    }

    /// Get the keyboard system
    pub fn keyboard(&self) -> &KeyboardSystem {
        &self.keyboard
    }

    /// Get the image system
    pub fn images(&self) -> &ImageSystem {
        &self.images
    }

    /// Get mutable access to the image system
    pub fn images_mut(&mut self) -> &mut ImageSystem {
        &mut self.images
    }

    /// Get the cursor registry
    pub fn cursor(&self) -> &CursorRegistry {
        &self.cursor
    }

    /// Get the render system
    pub fn renderer(&self) -> &RenderSystem {
        &self.renderer
    }

    /// Configuration the engine was built with
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Latest stats snapshot
    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// Map a screen pixel to world units
    pub fn screen_to_world(&self, point: Vec2) -> Vec2 {
        self.camera.screen_to_world(point)
    }

    /// Map a world point to screen pixels
    pub fn world_to_screen(&self, point: Vec2) -> Vec2 {
        self.camera.world_to_screen(point)
    }

    /// Visible world rectangle
    pub fn world_bounds(&self) -> Rect {
        self.camera.world_bounds()
    }

    /// Pointer targets overlapping a screen rectangle, in render order
    pub fn targets_within_box(&mut self, screen_rect: &Rect) -> Vec<(EntityId, ComponentId)> {
        self.pointer.targets_within_box(&mut self.world, self.camera.camera(), screen_rect)
    }

    /// Ask for a cursor; the highest priority request wins
    pub fn request_cursor(&mut self, id: &str, cursor: CursorKind, priority: i32) {
        self.cursor.request(id, cursor, priority);
    }

    /// Withdraw a cursor request
    pub fn cancel_cursor_request(&mut self, id: &str) {
        self.cursor.cancel(id);
    }

    // ---------------------------------------------------------------------
    // Resources
    // ---------------------------------------------------------------------

    /// Store editor-owned data, returning any previous value of the same type
    pub fn insert_resource<T: 'static>(&mut self, value: T) -> Option<T> {
        self.resources.insert(value)
    }

    /// Borrow editor-owned data
    pub fn resource<T: 'static>(&self) -> Option<&T> {
        self.resources.get::<T>()
    }

    /// Mutably borrow editor-owned data
    pub fn resource_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.resources.get_mut::<T>()
    }

    /// Take editor-owned data back out
    pub fn remove_resource<T: 'static>(&mut self) -> Option<T> {
        self.resources.remove::<T>()
    }

    // ---------------------------------------------------------------------
    // Input forwarding; the return value asks the host to suppress the
    // platform default for the event
    // ---------------------------------------------------------------------

    /// Pointer moved over the surface
    pub fn pointer_move(&mut self, position: Vec2, modifiers: Modifiers) -> bool {
        self.pointer.on_pointer_move(position, modifiers)
    }

    /// Pointer button pressed
    pub fn pointer_down(&mut self, button: PointerButton, position: Vec2, modifiers: Modifiers) -> bool {
        self.pointer.on_pointer_down(button, position, modifiers)
    }

    /// Pointer button released
    pub fn pointer_up(&mut self, button: PointerButton, position: Vec2, modifiers: Modifiers) -> bool {
        self.pointer.on_pointer_up(button, position, modifiers)
    }

    /// Pointer entered the surface
    pub fn pointer_enter(&mut self, position: Vec2) -> bool {
        self.pointer.on_pointer_enter(position)
    }

    /// Pointer left the surface
    pub fn pointer_leave(&mut self) -> bool {
        self.pointer.on_pointer_leave()
    }

    /// Wheel scrolled over the surface
    pub fn wheel(&mut self, delta: Vec2) -> bool {
        self.pointer.on_wheel(delta)
    }

    /// Key pressed
    pub fn key_down(&mut self, code: KeyCode, modifiers: Modifiers) -> bool {
        self.keyboard.on_key_down(code, modifiers)
    }

    /// Key released
    pub fn key_up(&mut self, code: KeyCode, modifiers: Modifiers) -> bool {
        self.keyboard.on_key_up(code, modifiers)
    }

    /// Surface lost focus: drop held buttons and keys
    pub fn blur(&mut self) {
        self.pointer.reset();
        self.keyboard.reset();
    }
}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Initialization error
    #[error("Engine initialization failed: {0}")]
    InitializationFailed(String),

    /// Scene id with no registered factory
    #[error("Unknown scene: {0}")]
    UnknownScene(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    /// Stale or otherwise unusable entity id
    #[error("Invalid entity: {0}")]
    InvalidEntity(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryImageLoader;
    use crate::ecs::UpdateContext;
    use crate::render::RecordingSurface;

    struct EmptyScene;

    impl Scene for EmptyScene {
        fn create(&mut self, _ctx: &mut UpdateContext<'_, '_>) -> Result<(), EngineError> {
            Ok(())
        }
    }

    fn engine(config: EngineConfig) -> Engine {
        Engine::new(config, Box::new(MemoryImageLoader::new())).unwrap()
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EngineConfig::default().with_clear_color("not a color");
        let result = Engine::new(config, Box::new(MemoryImageLoader::new()));
        assert!(matches!(result, Err(EngineError::ConfigError(_))));
    }

    #[test]
    fn test_idle_frames_do_not_render() {
        let mut engine = engine(EngineConfig::default());
        let mut surface = RecordingSurface::new(320.0, 240.0);

        let first = engine.run_frame(0.016, Some(&mut surface));
        assert!(first.rendered);
        for _ in 0..5 {
            assert!(!engine.run_frame(0.016, Some(&mut surface)).rendered);
        }
        assert_eq!(surface.clear_count(), 1);

        engine.force_render();
        assert!(engine.run_frame(0.016, Some(&mut surface)).rendered);
        assert_eq!(surface.clear_count(), 2);
    }

    #[test]
    fn test_missing_surface_defers_render() {
        let mut engine = engine(EngineConfig::default());
        let report = engine.run_frame(0.016, None);
        assert!(!report.rendered);

        let mut surface = RecordingSurface::new(320.0, 240.0);
        assert!(engine.run_frame(0.016, Some(&mut surface)).rendered);
    }

    #[test]
    fn test_starting_scene_is_created_on_first_frame() {
        let mut engine = engine(EngineConfig::default().with_starting_scene("level"));
        engine.register_scene("level", || Box::new(EmptyScene));
        assert!(engine.scenes().scene_entity("level").is_none());

        let report = engine.run_frame(0.016, None);
        assert!(report.changed);
        let entity = engine.scenes().scene_entity("level").unwrap();
        assert_eq!(engine.world().entity(entity).unwrap().name(), "level");
        assert!(matches!(engine.create_scene("missing"), Err(EngineError::UnknownScene(_))));
    }

    #[test]
    fn test_resources_round_trip() {
        let mut engine = engine(EngineConfig::default());
        assert!(engine.insert_resource(vec![1u32, 2]).is_none());
        engine.resource_mut::<Vec<u32>>().unwrap().push(3);
        assert_eq!(engine.resource::<Vec<u32>>(), Some(&vec![1, 2, 3]));
        assert_eq!(engine.remove_resource::<Vec<u32>>(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_destroy_forgets_scene_roots() {
        let mut engine = engine(EngineConfig::default().with_starting_scene("level"));
        engine.register_scene("level", || Box::new(EmptyScene));
        engine.run_frame(0.016, None);
        let root = engine.scenes().scene_entity("level").unwrap();

        engine.destroy();
        assert!(!engine.world().contains(root));
        assert!(engine.scenes().scene_entity("level").is_none());
        assert_eq!(engine.scenes().active_scenes().count(), 0);
    }

    #[test]
    fn test_destroy_clears_tree() {
        let mut engine = engine(EngineConfig::default());
        engine.destroy();
        assert!(engine.is_destroyed());
        assert_eq!(engine.world().len(), 1);
        assert_eq!(engine.run_frame(0.016, None), FrameReport::default());
    }
}
