//! Headless level editor session
//!
//! Builds a small level, replays a scripted editing session against a
//! recording surface and logs what the engine did each frame.
//!
//! Usage: `editor_demo [config.toml|config.ron]`

mod level;
mod script;

use canvas_engine::prelude::*;
use thiserror::Error;

use level::{Level, Selection, FLOOR_IMAGE, LEVEL_SCENE};
use script::Step;

const FRAME_TIME: f32 = 1.0 / 60.0;
const FLOOR_SOURCE: &str = "floor.png";

/// Demo-level failures
#[derive(Error, Debug)]
enum DemoError {
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Config error: {0}")]
    Config(#[from] canvas_engine::config::ConfigError),
}

struct EditorDemoApp {
    engine: Engine,
    surface: RecordingSurface,
    pointer: Vec2,
    frames_run: u32,
    frames_rendered: u32,
}

impl EditorDemoApp {
    fn new(config: EngineConfig) -> Result<Self, DemoError> {
        log::info!("Creating editor demo application...");

        let config = config
            .with_image(FLOOR_IMAGE, FLOOR_SOURCE)
            .with_starting_scene(LEVEL_SCENE);
        let loader = MemoryImageLoader::new()
            .with_image(FLOOR_SOURCE, ImageData::solid_color(FLOOR_IMAGE, 16, 16, [40, 44, 52, 255]));

        let mut engine = Engine::new(config, Box::new(loader))?;
        engine.register_scene(LEVEL_SCENE, || Box::new(Level));
        engine.insert_resource(Selection::default());

        Ok(Self {
            engine,
            surface: RecordingSurface::new(800.0, 600.0),
            pointer: Vec2::zeros(),
            frames_run: 0,
            frames_rendered: 0,
        })
    }

    fn frame(&mut self) {
        let report = self.engine.run_frame(FRAME_TIME, Some(&mut self.surface));
        self.frames_run += 1;
        if let Some(cursor) = report.cursor {
            log::info!("Cursor -> {:?}", cursor);
        }
        if let Some(replay) = report.replay {
            self.frames_rendered += 1;
            log::debug!(
                "Rendered: {} commands, {} draws, {} skipped, {} surface ops",
                replay.commands,
                replay.draws,
                replay.skipped,
                self.surface.take_ops().len()
            );
        }
        if report.stats_refreshed {
            let stats = self.engine.stats();
            log::debug!("{:.1} fps over {} frames", stats.fps, stats.frame_count);
        }
    }

    fn run_step(&mut self, step: Step) {
        match step {
            Step::Frames(count) => {
                for _ in 0..count {
                    self.frame();
                }
            }
            Step::Enter(position) => {
                self.pointer = position;
                self.engine.pointer_enter(position);
                self.frame();
            }
            Step::Move(position) => {
                self.pointer = position;
                self.engine.pointer_move(position, Modifiers::empty());
                self.frame();
            }
            Step::Click(button, position) => {
                self.pointer = position;
                self.engine.pointer_down(button, position, Modifiers::empty());
                self.frame();
                self.engine.pointer_up(button, position, Modifiers::empty());
                self.frame();
            }
            Step::Drag(button, from, to) => {
                self.engine.pointer_move(from, Modifiers::empty());
                self.engine.pointer_down(button, from, Modifiers::empty());
                self.frame();
                self.engine.pointer_move(to, Modifiers::empty());
                self.frame();
                self.engine.pointer_up(button, to, Modifiers::empty());
                self.frame();
                self.pointer = to;
                log::info!("Camera offset after drag: {:?}", self.engine.camera().position());
            }
            Step::Wheel(delta) => {
                let before = self.engine.screen_to_world(self.pointer);
                self.engine.wheel(Vec2::new(0.0, delta));
                self.frame();
                log::info!(
                    "Zoom {:.3}; world point under pointer {:?} -> {:?}",
                    self.engine.camera().zoom(),
                    before,
                    self.engine.screen_to_world(self.pointer)
                );
            }
            Step::Key(code, modifiers) => {
                let suppressed = self.engine.key_down(code, modifiers);
                log::info!("{:?} with {:?}: host default suppressed = {}", code, modifiers, suppressed);
                self.frame();
                self.engine.key_up(code, modifiers);
                self.frame();
            }
            Step::Resize(width, height) => {
                self.surface.resize(width, height);
                self.engine.resize(width, height);
                self.frame();
            }
            Step::Leave => {
                self.engine.pointer_leave();
                self.frame();
            }
        }
    }

    fn summarize(&mut self) {
        let bounds = self.engine.world_bounds();
        let in_view = self
            .engine
            .targets_within_box(&Rect::new(Vec2::zeros(), Vec2::new(1024.0, 768.0)))
            .len();
        let selection = self.engine.resource::<Selection>();
        let (selected, undo_requests) = selection.map_or((0, 0), |s| (s.tiles.len(), s.undo_requests));

        log::info!("Visible world: {:?}", bounds);
        log::info!("Targets on screen: {}", in_view);
        log::info!("Selected tiles: {}, undo requests: {}", selected, undo_requests);
        log::info!(
            "Frames: {} run, {} rendered, {} materials",
            self.frames_run,
            self.frames_rendered,
            self.engine.renderer().materials().len()
        );
    }

    fn shutdown(mut self) {
        self.engine.destroy();
        log::info!("Editor demo finished");
    }
}

fn load_config() -> Result<EngineConfig, DemoError> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading engine config from {}", path);
            Ok(EngineConfig::load_from_file(path)?)
        }
        None => Ok(EngineConfig::default()),
    }
}

fn main() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let app = load_config().and_then(EditorDemoApp::new);
    let mut app = match app {
        Ok(app) => app,
        Err(e) => {
            log::error!("Failed to start editor demo: {}", e);
            std::process::exit(1);
        }
    };

    for step in script::editing_session() {
        app.run_step(step);
    }
    app.summarize();
    app.shutdown();
}
