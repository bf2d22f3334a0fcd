//! # Canvas Engine
//!
//! A retained-mode 2D scene-graph engine with a deferred render-command
//! pipeline, built to sit inside a level editor.
//!
//! ## Features
//!
//! - **Scene tree**: entities with transforms, z-ordering and opacity, stored in a slot-map arena
//! - **Dirty-flag transforms**: local and world matrices rebuilt only when something moved
//! - **Deferred rendering**: draws are recorded as packed commands and replayed once per frame
//! - **Material interning**: identical styles share one material; redundant state changes are dropped
//! - **Editor input**: hover and click targets, box queries, camera drag and zoom, cursor arbitration
//! - **Render on change**: frames with no visible change skip rendering entirely
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use canvas_engine::prelude::*;
//!
//! struct Level;
//!
//! impl Scene for Level {
//!     fn create(&mut self, ctx: &mut UpdateContext<'_, '_>) -> Result<(), EngineError> {
//!         let tile = ctx.world.create_entity(Some(ctx.entity), EntityConfig::named("tile"))?;
//!         let shape = Shape::rectangle(Drawable::centered(Vec2::new(32.0, 32.0))
//!             .with_style(RenderStyle::new().with_fill(Color::WHITE)));
//!         ctx.world.add_component(tile, Component::new("body", shape.into()))?;
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::default().with_starting_scene("level");
//!     let mut engine = Engine::new(config, Box::new(MemoryImageLoader::new()))?;
//!     engine.register_scene("level", || Box::new(Level));
//!
//!     let mut surface = RecordingSurface::new(800.0, 600.0);
//!     engine.run_frame(1.0 / 60.0, Some(&mut surface));
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

// Core engine modules
pub mod core;
pub mod config;
pub mod engine;

pub mod foundation;
pub mod ecs;
pub mod assets;
pub mod render;
pub mod input;
pub mod scene;

pub use engine::{Engine, EngineError, FrameReport};
pub use core::config::EngineConfig;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        Engine, EngineConfig, EngineError, FrameReport,
        assets::{FileImageLoader, ImageData, ImageId, ImageLoader, MemoryImageLoader},
        config::Config,
        core::config::{CameraConfig, KeyboardConfig, PointerConfig, RenderConfig},
        ecs::{
            Behavior, Component, ComponentId, ComponentKind, Entity, EntityConfig, EntityId,
            FrameContext, ScaleAxes, UpdateContext, World,
            components::{
                CameraDrag, Drawable, HitShape, ImageComponent, Lerp, LerpLaw, LerpProperty,
                LineComponent, PointerTarget, Shape, ShapeGeometry, TextComponent, Tiling,
            },
            systems::{CameraSystem, CameraTarget, ImageSystem, KeyboardSystem, PointerSystem},
        },
        foundation::{
            math::{Affine2D, Rect, Vec2, Vec2Ext},
            profiler::EngineStats,
        },
        input::{CursorKind, KeyChord, KeyCode, Modifiers, PointerButton, PointerButtons},
        render::{
            Camera, Color, DrawingSurface, LineCap, LineJoin, RecordingSurface, RenderStyle,
            TextAlign,
        },
        scene::Scene,
    };
}
