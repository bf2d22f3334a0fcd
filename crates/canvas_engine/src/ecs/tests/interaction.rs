//! Engine-driven input, camera and frame gating

use crate::assets::{ImageData, MemoryImageLoader};
use crate::ecs::components::{Drawable, ImageComponent, Lerp, LerpProperty, PointerTarget, PointerTargetState};
use crate::ecs::{Component, EntityConfig, UpdateContext};
use crate::engine::{Engine, EngineError};
use crate::foundation::math::Vec2;
use crate::input::{CursorKind, KeyCode, Modifiers, PointerButton};
use crate::render::{RecordingSurface, SurfaceOp};
use crate::scene::Scene;
use crate::EngineConfig;
use approx::assert_relative_eq;

const FRAME: f32 = 0.016;

/// One 100x80 clickable tile at the world origin
struct Board;

impl Scene for Board {
    fn create(&mut self, ctx: &mut UpdateContext<'_, '_>) -> Result<(), EngineError> {
        let tile = ctx.world.create_entity(Some(ctx.entity), EntityConfig::named("tile"))?;
        let target = PointerTarget::rectangle(Vec2::new(100.0, 80.0)).with_hover_cursor(CursorKind::Pointer, 10);
        ctx.world.add_component(tile, Component::new("hit", target.into()))?;
        Ok(())
    }
}

fn board() -> (Engine, RecordingSurface) {
    let config = EngineConfig::default().with_starting_scene("board");
    let mut engine = Engine::new(config, Box::new(MemoryImageLoader::new())).unwrap();
    engine.register_scene("board", || Box::new(Board));
    let mut surface = RecordingSurface::new(200.0, 100.0);
    engine.run_frame(FRAME, Some(&mut surface));
    (engine, surface)
}

fn tile_state(engine: &Engine) -> PointerTargetState {
    let tile = engine.world().find_by_name("tile").unwrap();
    *engine
        .world()
        .entity(tile)
        .and_then(|entity| entity.component_of_type("PointerTarget"))
        .and_then(Component::as_pointer_target)
        .unwrap()
        .state()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hover_sets_cursor() {
        let (mut engine, mut surface) = board();
        engine.pointer_enter(Vec2::new(100.0, 50.0));
        let report = engine.run_frame(FRAME, Some(&mut surface));

        let state = tile_state(&engine);
        assert!(state.hovered && state.entered);
        assert!(report.changed);
        assert_eq!(report.cursor, Some(CursorKind::Pointer));

        engine.pointer_leave();
        let report = engine.run_frame(FRAME, Some(&mut surface));
        assert!(tile_state(&engine).left);
        assert_eq!(report.cursor, Some(CursorKind::Default));
    }

    #[test]
    fn test_click_versus_drag() {
        let (mut engine, mut surface) = board();
        engine.pointer_enter(Vec2::new(100.0, 50.0));
        engine.run_frame(FRAME, Some(&mut surface));

        engine.pointer_down(PointerButton::Primary, Vec2::new(100.0, 50.0), Modifiers::empty());
        engine.run_frame(FRAME, Some(&mut surface));
        assert!(tile_state(&engine).pressed.has(PointerButton::Primary));

        engine.pointer_up(PointerButton::Primary, Vec2::new(102.0, 50.0), Modifiers::empty());
        engine.run_frame(FRAME, Some(&mut surface));
        let state = tile_state(&engine);
        assert!(state.released.has(PointerButton::Primary));
        assert!(state.clicked.has(PointerButton::Primary));

        engine.pointer_down(PointerButton::Primary, Vec2::new(100.0, 50.0), Modifiers::empty());
        engine.run_frame(FRAME, Some(&mut surface));
        engine.pointer_move(Vec2::new(130.0, 50.0), Modifiers::empty());
        engine.run_frame(FRAME, Some(&mut surface));
        assert!(tile_state(&engine).held.has(PointerButton::Primary));
        engine.pointer_up(PointerButton::Primary, Vec2::new(130.0, 50.0), Modifiers::empty());
        engine.run_frame(FRAME, Some(&mut surface));

        let state = tile_state(&engine);
        assert!(state.released.has(PointerButton::Primary));
        assert!(!state.clicked.has(PointerButton::Primary));
    }

    #[test]
    fn test_wheel_zoom_keeps_focal_point() {
        let (mut engine, mut surface) = board();
        let focal = Vec2::new(150.0, 30.0);
        engine.pointer_enter(focal);
        engine.run_frame(FRAME, Some(&mut surface));
        let before = engine.screen_to_world(focal);

        assert!(engine.wheel(Vec2::new(0.0, -200.0)));
        let report = engine.run_frame(FRAME, Some(&mut surface));
        assert!(report.rendered);
        assert!(engine.camera().zoom() > 0.0);
        assert_relative_eq!(engine.screen_to_world(focal), before, epsilon = 1e-3);
    }

    #[test]
    fn test_secondary_drag_pans_camera() {
        let (mut engine, mut surface) = board();
        engine.pointer_enter(Vec2::new(100.0, 50.0));
        engine.run_frame(FRAME, Some(&mut surface));

        assert!(engine.pointer_down(PointerButton::Secondary, Vec2::new(100.0, 50.0), Modifiers::empty()));
        let report = engine.run_frame(FRAME, Some(&mut surface));
        assert_eq!(report.cursor, Some(CursorKind::Grabbing));

        engine.pointer_move(Vec2::new(120.0, 60.0), Modifiers::empty());
        engine.run_frame(FRAME, Some(&mut surface));
        assert_relative_eq!(engine.camera().position(), Vec2::new(20.0, 10.0));

        engine.pointer_up(PointerButton::Secondary, Vec2::new(120.0, 60.0), Modifiers::empty());
        engine.run_frame(FRAME, Some(&mut surface));
        assert_ne!(engine.cursor().current(), CursorKind::Grabbing);
    }

    #[test]
    fn test_renders_only_while_animating() {
        let mut engine = Engine::new(EngineConfig::default(), Box::new(MemoryImageLoader::new())).unwrap();
        let mover = engine.world_mut().create_entity(None, EntityConfig::named("mover")).unwrap();
        let lerp = Lerp::linear(LerpProperty::PositionX, 100.0).with_target(10.0);
        engine.world_mut().add_component(mover, Component::new("slide", lerp.into())).unwrap();

        let mut surface = RecordingSurface::new(200.0, 100.0);
        for _ in 0..20 {
            engine.run_frame(FRAME, Some(&mut surface));
        }
        let x = engine.world().entity(mover).unwrap().transform().position().x;
        assert_relative_eq!(x, 10.0);
        assert_eq!(surface.clear_count(), 7);
    }

    #[test]
    fn test_finished_image_load_triggers_render() {
        let loader = MemoryImageLoader::new().with_image("grass.png", ImageData::solid_color("grass", 8, 8, [0, 160, 0, 255]));
        let config = EngineConfig::default().with_image("grass", "grass.png");
        let mut engine = Engine::new(config, Box::new(loader)).unwrap();
        let tile = engine.world_mut().create_entity(None, EntityConfig::named("grass")).unwrap();
        let image = ImageComponent::new("grass", Drawable::centered(Vec2::new(16.0, 16.0)));
        engine.world_mut().add_component(tile, Component::new("sprite", image.into())).unwrap();

        let mut surface = RecordingSurface::new(200.0, 100.0);
        let first = engine.run_frame(FRAME, Some(&mut surface));
        assert!(first.rendered);
        assert_eq!(first.replay.map(|stats| stats.skipped), Some(1));

        surface.take_ops();
        let second = engine.run_frame(FRAME, Some(&mut surface));
        assert!(second.rendered);
        assert!(surface.ops().iter().any(|op| matches!(op, SurfaceOp::Image(name, ..) if name == "grass")));

        assert!(!engine.run_frame(FRAME, Some(&mut surface)).rendered);
    }

    #[test]
    fn test_captured_chords() {
        let mut engine = Engine::new(EngineConfig::default(), Box::new(MemoryImageLoader::new())).unwrap();
        assert!(engine.key_down(KeyCode::Z, Modifiers::CONTROL));
        assert!(!engine.key_down(KeyCode::K, Modifiers::CONTROL));
        assert!(!engine.key_down(KeyCode::A, Modifiers::empty()));
        engine.run_frame(FRAME, None);

        assert!(engine.keyboard().is_down(KeyCode::Z));
        assert!(!engine.keyboard().is_down(KeyCode::K));
        assert!(engine.keyboard().is_pressed(KeyCode::A));
    }
}
