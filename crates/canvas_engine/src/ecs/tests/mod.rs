//! Integration tests for the scene tree
//!
//! These exercise the world together with components, systems, the render
//! system and the engine frame loop.

mod interaction;
mod scene_graph;
