//! # Rendering System
//!
//! Deferred 2D rendering for the scene tree.
//!
//! ## Architecture
//!
//! - **Style / Material**: authoring styles resolved and interned into small material ids
//! - **Command stream**: packed opcodes recorded by the tree traversal each frame
//! - **Render queue**: the write handle components draw through
//! - **Render system**: replays the stream once against a drawing surface
//! - **Camera**: world <-> screen mapping with cached matrices
//!
//! ## Frame flow
//!
//! ```text
//! RenderSystem::begin_frame() -> RenderQueue
//!     World::queue_render_commands(queue)      (push/pop scopes, draws)
//! RenderSystem::replay(surface, camera_matrix, images)
//! ```
//!
//! Nothing is drawn while recording; a frame that is never replayed costs only
//! the recording.

pub mod camera;
pub mod commands;
pub mod material;
pub mod render_queue;
pub mod render_system;
pub mod style;
pub mod surface;

pub use camera::Camera;
pub use commands::{Opcode, RenderCommand, RenderCommandStream, ShapeDraw, TextAlign};
pub use material::{Material, MaterialId, MaterialRegistry};
pub use render_queue::RenderQueue;
pub use render_system::{RenderSystem, ReplayStats};
pub use style::{Color, LineCap, LineJoin, RenderStyle, ResolvedStyle};
pub use surface::{DrawingSurface, RecordingSurface, SurfaceOp};
