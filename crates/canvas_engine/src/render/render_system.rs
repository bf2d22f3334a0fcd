//! Render system
//!
//! Owns the per-frame [`RenderCommandStream`], the material registry and the
//! text interner. The tree traversal records into the stream through a
//! [`RenderQueue`]; [`RenderSystem::replay`] then walks the stream once
//! against a [`DrawingSurface`].
//!
//! Replay keeps its own transform stack instead of relying on surface
//! save/restore, so material and opacity state survive pops. A parallel
//! stack of cumulative uniform scales (camera included) corrects stroke
//! widths: materials specify widths in screen pixels.

use crate::assets::ImageId;
use crate::ecs::systems::ImageSystem;
use crate::foundation::collections::HashFactory;
use crate::foundation::math::{Affine2D, Vec2};
use crate::render::commands::{RenderCommand, RenderCommandStream, ShapeDraw};
use crate::render::material::{Material, MaterialRegistry};
use crate::render::render_queue::RenderQueue;
use crate::render::style::Color;
use crate::render::surface::DrawingSurface;

const MIN_SCALE: f32 = 1e-6;

/// Counters from one replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Commands decoded
    pub commands: usize,
    /// Draw commands that reached the surface
    pub draws: usize,
    /// Draw commands dropped (unknown material, text or image not ready)
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Fill {
    Rect,
    Ellipse,
}

/// Mutable surface state tracked during one replay
struct ReplayState<'m> {
    matrices: Vec<Affine2D>,
    scales: Vec<f32>,
    material: Option<&'m Material>,
    line_width: Option<f32>,
    smoothing: bool,
}

impl ReplayState<'_> {
    fn scale(&self) -> f32 {
        self.scales.last().copied().unwrap_or(1.0).max(MIN_SCALE)
    }

    fn apply_line_width(&mut self, surface: &mut dyn DrawingSurface, material: &Material) {
        let width = material.line_width / self.scale();
        if self.line_width != Some(width) {
            surface.set_line_width(width);
            self.line_width = Some(width);
        }
    }
}

/// Stream, materials and replay
#[derive(Debug)]
pub struct RenderSystem {
    stream: RenderCommandStream,
    materials: MaterialRegistry,
    texts: HashFactory<String, String>,
    clear_color: Color,
    image_smoothing: bool,
    surface_ready: Option<bool>,
}

impl RenderSystem {
    /// Create with the frame clear color and the default image smoothing
    pub fn new(clear_color: Color, image_smoothing: bool) -> Self {
        Self {
            stream: RenderCommandStream::new(),
            materials: MaterialRegistry::new(),
            texts: HashFactory::new(),
            clear_color,
            image_smoothing,
            surface_ready: None,
        }
    }

    /// Clear color used at the start of every rendered frame
    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    /// Change the clear color
    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    /// Reset the stream and hand out a writer for this frame
    pub fn begin_frame(&mut self) -> RenderQueue<'_> {
        self.stream.clear();
        RenderQueue::new(&mut self.stream, &mut self.materials, &mut self.texts)
    }

    /// Commands recorded for the current frame
    pub fn stream(&self) -> &RenderCommandStream {
        &self.stream
    }

    /// Interned materials
    pub fn materials(&self) -> &MaterialRegistry {
        &self.materials
    }

    /// Number of interned strings
    pub fn text_count(&self) -> usize {
        self.texts.len()
    }

    /// Whether a surface can be drawn to this frame
    ///
    /// Missing and zero-sized surfaces are logged once per transition.
    pub fn check_surface(&mut self, surface: Option<&dyn DrawingSurface>) -> bool {
        let ready = surface.is_some_and(|surface| {
            let size = surface.size();
            size.x > 0.0 && size.y > 0.0
        });
        if self.surface_ready != Some(ready) {
            if ready {
                log::info!("Drawing surface available");
            } else {
                log::warn!("Drawing surface unavailable; skipping render");
            }
            self.surface_ready = Some(ready);
        }
        ready
    }

    /// Clear the surface and replay the recorded stream
    pub fn replay(
        &self,
        surface: &mut dyn DrawingSurface,
        camera_matrix: &Affine2D,
        images: &ImageSystem,
    ) -> ReplayStats {
        let mut stats = ReplayStats::default();

        surface.set_transform(&Affine2D::identity());
        surface.set_global_alpha(1.0);
        surface.clear(self.clear_color);
        surface.set_image_smoothing(self.image_smoothing);
        surface.set_transform(camera_matrix);

        let mut state = ReplayState {
            matrices: vec![*camera_matrix],
            scales: vec![camera_matrix.uniform_scale()],
            material: None,
            line_width: None,
            smoothing: self.image_smoothing,
        };

        for command in self.stream.commands() {
            stats.commands += 1;
            let drawn = match command {
                RenderCommand::PushTransform(local) => {
                    let top = state.matrices.last().copied().unwrap_or(*camera_matrix);
                    let next = top * local;
                    state.matrices.push(next);
                    state.scales.push(next.uniform_scale());
                    surface.set_transform(&next);
                    continue;
                }
                RenderCommand::PopTransform => {
                    if state.matrices.len() > 1 {
                        state.matrices.pop();
                        state.scales.pop();
                    } else {
                        log::warn!("Unbalanced PopTransform in render stream");
                    }
                    let top = state.matrices.last().copied().unwrap_or(*camera_matrix);
                    surface.set_transform(&top);
                    continue;
                }
                RenderCommand::SetMaterial(id) => {
                    state.material = self.materials.get(id);
                    match state.material {
                        Some(material) => self.apply_material(surface, &mut state, material),
                        None => log::warn!("Unknown material {}; skipping its draws", id.0),
                    }
                    continue;
                }
                RenderCommand::SetOpacity(alpha) => {
                    surface.set_global_alpha(alpha);
                    continue;
                }
                RenderCommand::DrawRect(shape) => Self::draw_shape(surface, &mut state, &shape, Fill::Rect),
                RenderCommand::DrawEllipse(shape) => Self::draw_shape(surface, &mut state, &shape, Fill::Ellipse),
                RenderCommand::DrawLine { from, to } => Self::draw_line(surface, &mut state, from, to),
                RenderCommand::DrawImage { image, shape } => Self::draw_image(surface, images, image, &shape),
                RenderCommand::DrawText { text_id, position, font_size, align } => {
                    match (state.material.and_then(|m| m.fill), self.texts.get(text_id)) {
                        (Some(_), Some(text)) => {
                            surface.fill_text(text, position, font_size, align);
                            true
                        }
                        (_, None) => {
                            log::warn!("Unknown text id {}", text_id);
                            false
                        }
                        _ => false,
                    }
                }
            };

            if drawn {
                stats.draws += 1;
            } else {
                stats.skipped += 1;
            }
        }

        log::trace!(
            "Replayed {} commands: {} draws, {} skipped",
            stats.commands,
            stats.draws,
            stats.skipped
        );
        stats
    }

    fn apply_material<'m>(
        &self,
        surface: &mut dyn DrawingSurface,
        state: &mut ReplayState<'m>,
        material: &'m Material,
    ) {
        if let Some(fill) = material.fill {
            surface.set_fill_color(fill);
        }
        if let Some(stroke) = material.stroke {
            surface.set_stroke_color(stroke);
        }
        surface.set_line_join(material.line_join);
        surface.set_line_cap(material.line_cap);
        state.line_width = None;

        let smoothing = self.image_smoothing && material.smoothing;
        if smoothing != state.smoothing {
            surface.set_image_smoothing(smoothing);
            state.smoothing = smoothing;
        }
    }

    fn draw_shape(surface: &mut dyn DrawingSurface, state: &mut ReplayState<'_>, shape: &ShapeDraw, fill: Fill) -> bool {
        let Some(material) = state.material else {
            return false;
        };
        if material.fill.is_some() {
            for tile in shape.tiles() {
                match fill {
                    Fill::Rect => surface.fill_rect(tile, shape.size),
                    Fill::Ellipse => surface.fill_ellipse(tile, shape.size),
                }
            }
        }
        if material.stroke.is_some() {
            state.apply_line_width(surface, material);
            for tile in shape.tiles() {
                match fill {
                    Fill::Rect => surface.stroke_rect(tile, shape.size),
                    Fill::Ellipse => surface.stroke_ellipse(tile, shape.size),
                }
            }
        }
        true
    }

    fn draw_line(surface: &mut dyn DrawingSurface, state: &mut ReplayState<'_>, from: Vec2, to: Vec2) -> bool {
        let Some(material) = state.material.filter(|m| m.stroke.is_some()) else {
            return false;
        };
        state.apply_line_width(surface, material);
        surface.stroke_line(from, to);
        true
    }

    fn draw_image(surface: &mut dyn DrawingSurface, images: &ImageSystem, image: ImageId, shape: &ShapeDraw) -> bool {
        // not loaded yet (or failed): silently skipped, the load is reported elsewhere
        let Some(data) = images.get(image) else {
            if !images.is_known(image) {
                log::warn!("Unknown image id {:?} in replay; skipped", image);
            }
            return false;
        };
        for tile in shape.tiles() {
            surface.draw_image(data, tile, shape.size);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::assets::{ImageData, MemoryImageLoader};
    use crate::render::commands::TextAlign;
    use crate::render::material::MaterialId;
    use crate::render::style::RenderStyle;
    use crate::render::surface::{RecordingSurface, SurfaceOp};
    use approx::assert_relative_eq;

    fn images() -> ImageSystem {
        let loader = MemoryImageLoader::new().with_image("grass.png", ImageData::solid_color("grass", 4, 4, [0, 200, 0, 255]));
        let sources = HashMap::from([("grass".to_string(), "grass.png".to_string())]);
        ImageSystem::new(sources, Box::new(loader))
    }

    fn line_widths(ops: &[SurfaceOp]) -> Vec<f32> {
        ops.iter()
            .filter_map(|op| match op {
                SurfaceOp::LineWidth(width) => Some(*width),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_replay_clears_and_composes_transforms() {
        let mut system = RenderSystem::new(Color::BLACK, true);
        let local = Affine2D::translation(Vec2::new(10.0, 0.0));
        {
            let mut queue = system.begin_frame();
            queue.push_transform(&local, 1.0);
            queue.draw_rect(
                &RenderStyle::new().with_fill(Color::WHITE),
                1.0,
                &ShapeDraw::single(Vec2::zeros(), Vec2::new(2.0, 2.0)),
            );
            queue.pop_transform();
        }

        let camera = Affine2D::scale(Vec2::new(2.0, 2.0));
        let mut surface = RecordingSurface::new(100.0, 100.0);
        let stats = system.replay(&mut surface, &camera, &images());

        assert_eq!(surface.clear_count(), 1);
        assert_eq!(surface.draw_count(), 1);
        assert_eq!(stats.draws, 1);
        assert_eq!(stats.skipped, 0);
        assert!(surface.ops().contains(&SurfaceOp::SetTransform(camera * local)));
        assert_eq!(surface.ops().last(), Some(&SurfaceOp::SetTransform(camera)));
    }

    #[test]
    fn test_line_width_is_screen_space() {
        let mut system = RenderSystem::new(Color::BLACK, true);
        let style = RenderStyle::new().with_stroke(Color::WHITE).with_line_width(2.0);
        {
            let mut queue = system.begin_frame();
            queue.draw_line(&style, 1.0, Vec2::zeros(), Vec2::new(1.0, 0.0));
            queue.push_transform(&Affine2D::scale(Vec2::new(4.0, 4.0)), 1.0);
            queue.draw_line(&style, 1.0, Vec2::zeros(), Vec2::new(1.0, 0.0));
            queue.pop_transform();
        }

        let mut surface = RecordingSurface::new(100.0, 100.0);
        system.replay(&mut surface, &Affine2D::scale(Vec2::new(2.0, 2.0)), &images());

        let widths = line_widths(surface.ops());
        assert_eq!(widths.len(), 2);
        assert_relative_eq!(widths[0], 1.0);
        assert_relative_eq!(widths[1], 0.25);
    }

    #[test]
    fn test_unknown_material_skips_until_next_valid() {
        let mut system = RenderSystem::new(Color::BLACK, true);
        let known = system.materials.intern(&RenderStyle::new().with_fill(Color::WHITE));
        let shape = ShapeDraw::single(Vec2::zeros(), Vec2::new(1.0, 1.0));
        system.stream.draw_rect(MaterialId(99), 1.0, &shape);
        system.stream.draw_rect(MaterialId(99), 1.0, &shape);
        system.stream.draw_rect(known, 1.0, &shape);

        let mut surface = RecordingSurface::new(10.0, 10.0);
        let stats = system.replay(&mut surface, &Affine2D::identity(), &images());
        assert_eq!(stats.skipped, 2);
        assert_eq!(stats.draws, 1);
        assert_eq!(surface.draw_count(), 1);
    }

    #[test]
    fn test_images_draw_once_loaded() {
        let mut system = RenderSystem::new(Color::BLACK, true);
        let mut images = images();
        let grass = images.request("grass");
        let shape = ShapeDraw { position: Vec2::zeros(), size: Vec2::new(4.0, 4.0), repeat: (3, 2), gap: Vec2::zeros() };
        system.begin_frame().draw_image(grass, 1.0, &shape);

        let mut surface = RecordingSurface::new(10.0, 10.0);
        let stats = system.replay(&mut surface, &Affine2D::identity(), &images);
        assert_eq!(stats.skipped, 1);
        assert_eq!(surface.draw_count(), 0);

        assert!(images.update());
        surface.take_ops();
        let stats = system.replay(&mut surface, &Affine2D::identity(), &images);
        assert_eq!(stats.draws, 1);
        assert_eq!(surface.draw_count(), 6);
    }

    #[test]
    fn test_stale_image_id_skips_without_stopping_replay() {
        let mut system = RenderSystem::new(Color::BLACK, true);
        let mut images = images();
        let grass = images.request("grass");
        assert!(images.update());
        assert!(images.is_known(grass));
        {
            let mut queue = system.begin_frame();
            queue.draw_image(grass, 1.0, &ShapeDraw::single(Vec2::zeros(), Vec2::new(4.0, 4.0)));
            queue.draw_rect(
                &RenderStyle::new().with_fill(Color::WHITE),
                1.0,
                &ShapeDraw::single(Vec2::zeros(), Vec2::new(2.0, 2.0)),
            );
        }

        images.clear();
        assert!(!images.is_known(grass));
        assert!(!images.is_known(ImageId(42)));

        let mut surface = RecordingSurface::new(10.0, 10.0);
        let stats = system.replay(&mut surface, &Affine2D::identity(), &images);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.draws, 1);
        assert_eq!(surface.draw_count(), 1);
    }

    #[test]
    fn test_text_needs_fill() {
        let mut system = RenderSystem::new(Color::BLACK, true);
        {
            let mut queue = system.begin_frame();
            queue.draw_text(&RenderStyle::new().with_fill(Color::WHITE), 1.0, "spawn", Vec2::zeros(), 12.0, TextAlign::Center);
        }
        let mut surface = RecordingSurface::new(10.0, 10.0);
        system.replay(&mut surface, &Affine2D::identity(), &images());
        assert!(surface
            .ops()
            .contains(&SurfaceOp::Text("spawn".to_string(), Vec2::zeros(), 12.0, TextAlign::Center)));
        assert_eq!(system.text_count(), 1);
    }

    #[test]
    fn test_surface_checks() {
        let mut system = RenderSystem::new(Color::BLACK, true);
        assert!(!system.check_surface(None));
        let empty = RecordingSurface::new(0.0, 10.0);
        assert!(!system.check_surface(Some(&empty)));
        let surface = RecordingSurface::new(10.0, 10.0);
        assert!(system.check_surface(Some(&surface)));
    }
}
