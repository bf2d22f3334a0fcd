//! ECS Components module
//!
//! Concrete component kinds. Drawing components embed a [`Drawable`];
//! the transform lives on the entity itself rather than as a component.

pub mod camera_drag;
pub mod drawable;
pub mod image;
pub mod lerp;
pub mod line;
pub mod pointer_target;
pub mod shape;
pub mod text;
pub mod transform;

pub use camera_drag::CameraDrag;
pub use drawable::{Drawable, Tiling};
pub use image::ImageComponent;
pub use lerp::{Lerp, LerpLaw, LerpProperty};
pub use line::LineComponent;
pub use pointer_target::{HitShape, PointerTarget, PointerTargetState};
pub use shape::{Shape, ShapeGeometry};
pub use text::TextComponent;
pub use transform::Transform;
