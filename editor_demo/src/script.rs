//! Scripted editor session
//!
//! Stands in for a platform adapter: each step forwards raw input to the
//! engine the way a browser or window event loop would, then lets frames run.

use canvas_engine::prelude::*;

/// One scripted host action
#[derive(Debug, Clone, Copy)]
pub enum Step {
    /// Run this many idle frames
    Frames(u32),
    /// Pointer enters the surface
    Enter(Vec2),
    /// Pointer moves
    Move(Vec2),
    /// Press and release without moving
    Click(PointerButton, Vec2),
    /// Press at `from`, move to `to`, release
    Drag(PointerButton, Vec2, Vec2),
    /// Wheel over the current pointer position
    Wheel(f32),
    /// Key press and release with modifiers held
    Key(KeyCode, Modifiers),
    /// Host surface resized
    Resize(f32, f32),
    /// Pointer leaves the surface
    Leave,
}

/// Hover, select three tiles, pan, zoom and undo
pub fn editing_session() -> Vec<Step> {
    vec![
        Step::Frames(2),
        Step::Enter(Vec2::new(400.0, 300.0)),
        Step::Move(Vec2::new(368.0, 268.0)),
        Step::Frames(1),
        Step::Click(PointerButton::Primary, Vec2::new(368.0, 268.0)),
        Step::Frames(30),
        Step::Click(PointerButton::Primary, Vec2::new(432.0, 332.0)),
        Step::Frames(30),
        Step::Click(PointerButton::Primary, Vec2::new(496.0, 268.0)),
        Step::Frames(30),
        Step::Drag(PointerButton::Secondary, Vec2::new(600.0, 450.0), Vec2::new(560.0, 430.0)),
        Step::Wheel(-240.0),
        Step::Frames(5),
        Step::Key(KeyCode::Z, Modifiers::CONTROL),
        Step::Key(KeyCode::K, Modifiers::CONTROL),
        Step::Resize(1024.0, 768.0),
        Step::Frames(2),
        Step::Leave,
        Step::Frames(5),
    ]
}
