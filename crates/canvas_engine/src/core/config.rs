//! # Engine Configuration
//!
//! Every option the engine recognises, with its default. Configuration can be
//! built in code with the `with_*` helpers or loaded from TOML/RON through the
//! [`Config`] trait; missing fields fall back to their defaults.
//!
//! ## Sections
//!
//! - **Camera**: initial view, zoom bounds and target-animation tuning
//! - **Pointer**: click threshold and camera-drag buttons
//! - **Keyboard**: chords whose default platform handling is suppressed
//! - **Render**: clear color and image smoothing
//! - **Images / scenes**: asset name -> source map and scenes created at startup

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};
use crate::foundation::math::Vec2;
use crate::input::{KeyChord, KeyCode, PointerButton};
use crate::render::style::Color;

/// # Camera Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Initial zoom (log2: 0 = 1x, 1 = 2x)
    pub zoom: f32,
    /// Initial rotation in degrees
    pub rotation: f32,
    /// Initial screen-space offset
    pub position: Vec2,
    /// Lowest allowed zoom
    pub min_zoom: f32,
    /// Highest allowed zoom
    pub max_zoom: f32,
    /// Zoom change per unit of zoom delta (wheel units)
    pub zoom_speed: f32,
    /// Fraction of the remaining distance covered per 1/100 s when flying to a target
    pub target_lerp_speed: f32,
    /// Minimum per-frame position step (pixels) during target animation
    pub target_min_position_step: f32,
    /// Minimum per-frame rotation step (degrees) during target animation
    pub target_min_rotation_step: f32,
    /// Minimum per-frame zoom step during target animation
    pub target_min_zoom_step: f32,
    /// Distance on every axis below which the target snaps and clears
    pub target_epsilon: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            zoom: 0.0,
            rotation: 0.0,
            position: Vec2::zeros(),
            min_zoom: -4.0,
            max_zoom: 4.0,
            zoom_speed: 0.0015,
            target_lerp_speed: 0.1,
            target_min_position_step: 0.5,
            target_min_rotation_step: 0.1,
            target_min_zoom_step: 0.001,
            target_epsilon: 0.001,
        }
    }
}

impl CameraConfig {
    /// Set the initial zoom
    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom;
        self
    }

    /// Set the initial position
    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    /// Set the zoom bounds
    pub fn with_zoom_bounds(mut self, min_zoom: f32, max_zoom: f32) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    /// Validate the camera section
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_zoom <= self.max_zoom) {
            return Err(ConfigError::Invalid(format!(
                "camera min_zoom {} exceeds max_zoom {}",
                self.min_zoom, self.max_zoom
            )));
        }
        if !(0.0..=1.0).contains(&self.target_lerp_speed) || self.target_lerp_speed == 0.0 {
            return Err(ConfigError::Invalid(format!(
                "camera target_lerp_speed must be in (0, 1], got {}",
                self.target_lerp_speed
            )));
        }
        if self.target_epsilon < 0.0 {
            return Err(ConfigError::Invalid("camera target_epsilon must not be negative".to_string()));
        }
        Ok(())
    }
}

/// # Pointer Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerConfig {
    /// Total press-to-release travel (pixels) that still counts as a click
    pub click_threshold: f32,
    /// Whether the camera can be dragged at all
    pub drag_enabled: bool,
    /// Buttons that pan the camera while held
    pub camera_drag_buttons: Vec<PointerButton>,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            click_threshold: crate::input::pointer::DEFAULT_CLICK_THRESHOLD,
            drag_enabled: true,
            camera_drag_buttons: vec![PointerButton::Secondary, PointerButton::Auxiliary],
        }
    }
}

/// # Keyboard Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardConfig {
    /// Chords the host should not pass on to the platform
    pub keys_to_capture: Vec<KeyChord>,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            keys_to_capture: vec![
                KeyChord::ctrl(KeyCode::Z),
                KeyChord::ctrl(KeyCode::Z).with_shift(),
                KeyChord::ctrl(KeyCode::Y),
                KeyChord::ctrl(KeyCode::S),
                KeyChord::meta(KeyCode::Z),
                KeyChord::meta(KeyCode::Z).with_shift(),
                KeyChord::meta(KeyCode::S),
            ],
        }
    }
}

/// # Render Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Surface clear color as a CSS hex string (`#rgb`, `#rrggbb`, `#rrggbbaa`)
    pub clear_color: String,
    /// Smooth scaled images
    pub image_smoothing: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: "#1e1e24".to_string(),
            image_smoothing: false,
        }
    }
}

impl RenderConfig {
    /// Parsed clear color
    pub fn clear_color(&self) -> Result<Color, ConfigError> {
        Color::from_hex(&self.clear_color)
            .ok_or_else(|| ConfigError::Invalid(format!("bad clear_color {:?}", self.clear_color)))
    }
}

/// # Complete Engine Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Camera settings
    pub camera: CameraConfig,
    /// Pointer settings
    pub pointer: PointerConfig,
    /// Keyboard settings
    pub keyboard: KeyboardConfig,
    /// Rendering settings
    pub render: RenderConfig,
    /// Image name -> source (file path for the default loader)
    pub images: HashMap<String, String>,
    /// Scenes created on the first frame, in order
    pub starting_scenes: Vec<String>,
    /// How often the stats snapshot refreshes, in seconds
    pub stats_interval_secs: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            pointer: PointerConfig::default(),
            keyboard: KeyboardConfig::default(),
            render: RenderConfig::default(),
            images: HashMap::new(),
            starting_scenes: Vec::new(),
            stats_interval_secs: 0.1,
        }
    }
}

impl EngineConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the camera section
    pub fn with_camera(mut self, camera: CameraConfig) -> Self {
        self.camera = camera;
        self
    }

    /// Set the pointer section
    pub fn with_pointer(mut self, pointer: PointerConfig) -> Self {
        self.pointer = pointer;
        self
    }

    /// Set the clear color
    pub fn with_clear_color(mut self, color: impl Into<String>) -> Self {
        self.render.clear_color = color.into();
        self
    }

    /// Register an image source
    pub fn with_image(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.images.insert(name.into(), source.into());
        self
    }

    /// Queue a scene for creation at startup
    pub fn with_starting_scene(mut self, scene: impl Into<String>) -> Self {
        self.starting_scenes.push(scene.into());
        self
    }

    /// Enable or disable camera dragging
    pub fn with_drag_enabled(mut self, enabled: bool) -> Self {
        self.pointer.drag_enabled = enabled;
        self
    }

    /// Add a captured key chord
    pub fn with_captured_key(mut self, chord: KeyChord) -> Self {
        self.keyboard.keys_to_capture.push(chord);
        self
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.camera.validate()?;
        self.render.clear_color()?;
        if self.pointer.click_threshold < 0.0 {
            return Err(ConfigError::Invalid("pointer click_threshold must not be negative".to_string()));
        }
        if !(self.stats_interval_secs > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "stats_interval_secs must be positive, got {}",
                self.stats_interval_secs
            )));
        }
        if let Some(chord) = self.keyboard.keys_to_capture.iter().find(|chord| chord.key.is_modifier()) {
            return Err(ConfigError::Invalid(format!("captured chord uses a modifier as its key: {chord:?}")));
        }
        Ok(())
    }
}

impl Config for EngineConfig {}
