//! Camera system
//!
//! Owns the [`Camera`] and everything that moves it: direct setters, pans,
//! zooming toward a focal point, and animated flights to a [`CameraTarget`].
//! Any direct manipulation cancels a running flight.

use crate::core::config::CameraConfig;
use crate::foundation::math::{utils, Affine2D, Rect, Vec2};
use crate::render::Camera;

/// Destination of an animated camera flight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTarget {
    /// Screen-space offset to reach
    pub position: Vec2,
    /// Rotation to reach, in degrees
    pub rotation: f32,
    /// Zoom to reach
    pub zoom: f32,
}

/// Camera plus its controls
#[derive(Debug)]
pub struct CameraSystem {
    camera: Camera,
    config: CameraConfig,
    target: Option<CameraTarget>,
}

impl CameraSystem {
    /// Camera initialised from configuration
    pub fn new(config: CameraConfig) -> Self {
        let mut camera = Camera::new();
        camera.set_zoom(config.zoom.clamp(config.min_zoom, config.max_zoom));
        camera.set_rotation(config.rotation);
        camera.set_position(config.position);
        Self { camera, config, target: None }
    }

    /// Camera model
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Configuration in use
    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Running flight target
    pub fn target(&self) -> Option<CameraTarget> {
        self.target
    }

    /// Log2 zoom
    pub fn zoom(&self) -> f32 {
        self.camera.zoom()
    }

    /// Screen-space offset
    pub fn position(&self) -> Vec2 {
        self.camera.position()
    }

    /// Rotation in degrees
    pub fn rotation(&self) -> f32 {
        self.camera.rotation()
    }

    fn clamp_zoom(&self, zoom: f32) -> f32 {
        let clamped = zoom.clamp(self.config.min_zoom, self.config.max_zoom);
        if clamped != zoom {
            log::trace!(
                "Zoom {} clamped to {} (bounds {}..={})",
                zoom,
                clamped,
                self.config.min_zoom,
                self.config.max_zoom
            );
        }
        clamped
    }

    /// Change zoom by `delta` wheel units, keeping the world point under
    /// `focal` (a screen point) fixed on screen. Without a focal point the
    /// canvas centre stays fixed. Returns true if the zoom changed.
    pub fn zoom_camera(&mut self, delta: f32, focal: Option<Vec2>) -> bool {
        let current = self.camera.zoom();
        let zoom = self.clamp_zoom(current + delta * self.config.zoom_speed);
        if zoom == current {
            return false;
        }
        self.target = None;

        if let Some(focal) = focal {
            let k = (zoom - current).exp2();
            let position = self.camera.position();
            let anchor = focal - self.camera.canvas_center() - position;
            self.camera.set_position(position + anchor * (1.0 - k));
        }
        self.camera.set_zoom(zoom)
    }

    /// Set the zoom directly (clamped)
    pub fn set_zoom(&mut self, zoom: f32) -> bool {
        self.target = None;
        let zoom = self.clamp_zoom(zoom);
        self.camera.set_zoom(zoom)
    }

    /// Set the screen-space offset
    pub fn set_position(&mut self, position: Vec2) -> bool {
        self.target = None;
        self.camera.set_position(position)
    }

    /// Shift the screen-space offset
    pub fn translate(&mut self, delta: Vec2) -> bool {
        self.target = None;
        let position = self.camera.position() + delta;
        self.camera.set_position(position)
    }

    /// Set the rotation in degrees
    pub fn set_rotation(&mut self, rotation: f32) -> bool {
        self.target = None;
        self.camera.set_rotation(rotation)
    }

    /// Start an animated flight (target zoom is clamped)
    pub fn set_target(&mut self, target: CameraTarget) {
        self.target = Some(CameraTarget { zoom: self.clamp_zoom(target.zoom), ..target });
    }

    /// Stop any flight where it is
    pub fn clear_target(&mut self) {
        self.target = None;
    }

    /// Resize the canvas; returns true if the size changed
    pub fn set_canvas_size(&mut self, size: Vec2) -> bool {
        self.camera.set_canvas_size(size)
    }

    /// Screen pixel to world units
    pub fn screen_to_world(&self, point: Vec2) -> Vec2 {
        self.camera.screen_to_world(point)
    }

    /// World units to screen pixel
    pub fn world_to_screen(&self, point: Vec2) -> Vec2 {
        self.camera.world_to_screen(point)
    }

    /// World -> screen matrix
    pub fn world_to_screen_matrix(&self) -> Affine2D {
        self.camera.world_to_screen_matrix()
    }

    /// Screen -> world matrix
    pub fn screen_to_world_matrix(&self) -> Affine2D {
        self.camera.screen_to_world_matrix()
    }

    /// Visible world rectangle
    pub fn world_bounds(&self) -> Rect {
        self.camera.world_bounds()
    }

    /// Advance a running flight; returns true if the camera moved
    pub fn update(&mut self, delta_time: f32) -> bool {
        let Some(target) = self.target else {
            return false;
        };
        let config = &self.config;
        let factor = 1.0 - (1.0 - config.target_lerp_speed).powf(delta_time * 100.0);

        let position = self.camera.position();
        let next_position = Vec2::new(
            approach(position.x, target.position.x - position.x, factor, config.target_min_position_step),
            approach(position.y, target.position.y - position.y, factor, config.target_min_position_step),
        );
        let rotation = self.camera.rotation();
        let next_rotation = approach(
            rotation,
            utils::shortest_angle_delta(rotation, target.rotation),
            factor,
            config.target_min_rotation_step,
        );
        let zoom = self.camera.zoom();
        let next_zoom = approach(zoom, target.zoom - zoom, factor, config.target_min_zoom_step);

        let epsilon = config.target_epsilon;
        let arrived = (target.position - next_position).abs().max() <= epsilon
            && utils::shortest_angle_delta(next_rotation, target.rotation).abs() <= epsilon
            && (target.zoom - next_zoom).abs() <= epsilon;

        let mut moved = false;
        if arrived {
            moved |= self.camera.set_position(target.position);
            moved |= self.camera.set_rotation(target.rotation);
            moved |= self.camera.set_zoom(target.zoom);
            self.target = None;
            log::debug!("Camera reached target {:?}", target);
        } else {
            moved |= self.camera.set_position(next_position);
            moved |= self.camera.set_rotation(next_rotation);
            moved |= self.camera.set_zoom(next_zoom);
        }
        moved
    }

    /// True if the camera changed since the last call
    pub fn take_changed(&mut self) -> bool {
        self.camera.take_changed()
    }
}

/// One smoothing step toward `current + delta`, at least `min_step`, never past it
fn approach(current: f32, delta: f32, factor: f32, min_step: f32) -> f32 {
    if delta == 0.0 {
        return current;
    }
    let mut step = delta * factor;
    if step.abs() < min_step {
        step = min_step.copysign(delta);
    }
    if step.abs() >= delta.abs() {
        current + delta
    } else {
        current + step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn system() -> CameraSystem {
        let mut system = CameraSystem::new(CameraConfig::default());
        system.set_canvas_size(Vec2::new(800.0, 600.0));
        system
    }

    #[test]
    fn test_zoom_keeps_focal_point_fixed() {
        let mut system = system();
        system.set_position(Vec2::new(30.0, -12.0));
        system.set_rotation(20.0);
        let focal = Vec2::new(620.0, 140.0);
        let world_before = system.screen_to_world(focal);

        assert!(system.zoom_camera(400.0, Some(focal)));
        assert!(system.zoom() > 0.0);
        assert_relative_eq!(system.world_to_screen(world_before), focal, epsilon = 1e-2);

        assert!(system.zoom_camera(-900.0, Some(focal)));
        assert_relative_eq!(system.world_to_screen(world_before), focal, epsilon = 1e-2);
    }

    #[test]
    fn test_zoom_clamps_to_bounds() {
        let mut system = system();
        assert!(system.zoom_camera(1.0e6, None));
        assert_eq!(system.zoom(), 4.0);
        assert!(!system.zoom_camera(10.0, None));
        assert!(!system.set_zoom(12.0));
        assert!(system.set_zoom(-100.0));
        assert_eq!(system.zoom(), -4.0);
    }

    #[test]
    fn test_target_flight_arrives_and_clears() {
        let mut system = system();
        system.set_target(CameraTarget { position: Vec2::new(200.0, -50.0), rotation: 350.0, zoom: 1.0 });
        let mut frames = 0;
        while system.target().is_some() {
            system.update(1.0 / 60.0);
            frames += 1;
            assert!(frames < 1000, "flight never arrived");
        }
        assert_eq!(system.position(), Vec2::new(200.0, -50.0));
        assert_eq!(system.rotation(), 350.0);
        assert_eq!(system.zoom(), 1.0);
        assert!(!system.update(1.0 / 60.0));
    }

    #[test]
    fn test_manual_control_cancels_flight() {
        let mut system = system();
        system.set_target(CameraTarget { position: Vec2::new(10.0, 0.0), rotation: 0.0, zoom: 0.0 });
        system.translate(Vec2::new(1.0, 1.0));
        assert!(system.target().is_none());
    }

    #[test]
    fn test_approach_never_overshoots() {
        assert_eq!(approach(0.0, 10.0, 2.0, 0.0), 10.0);
        assert_eq!(approach(0.0, 0.2, 0.1, 0.5), 0.2);
        assert_relative_eq!(approach(0.0, -10.0, 0.1, 0.5), -1.0);
    }
}
