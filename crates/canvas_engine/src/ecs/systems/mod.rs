//! ECS Systems module
//!
//! Engine-wide services, each owning one concern. The engine drives them in
//! a fixed order every frame and lends them to the tree update through
//! [`FrameContext`](crate::ecs::FrameContext).

pub mod camera_system;
pub mod image_system;
pub mod keyboard_system;
pub mod pointer_system;

pub use camera_system::{CameraSystem, CameraTarget};
pub use image_system::ImageSystem;
pub use keyboard_system::KeyboardSystem;
pub use pointer_system::PointerSystem;
