//! Image component
//!
//! Draws a named image into the drawable rectangle. The image is requested
//! from the image system on the component's first update; until it has
//! loaded, replay skips the draw.

use super::drawable::Drawable;
use crate::assets::ImageId;
use crate::ecs::context::UpdateContext;
use crate::render::RenderQueue;

/// Named image drawn into a rectangle
#[derive(Debug, Clone, PartialEq)]
pub struct ImageComponent {
    /// Asset name, resolved through the engine's image map
    pub image_name: String,
    /// Placement (the style only contributes smoothing)
    pub drawable: Drawable,
    image_id: Option<ImageId>,
}

impl ImageComponent {
    /// Image component for an asset name
    pub fn new(image_name: impl Into<String>, drawable: Drawable) -> Self {
        Self { image_name: image_name.into(), drawable, image_id: None }
    }

    /// Id handed out by the image system, once requested
    pub fn image_id(&self) -> Option<ImageId> {
        self.image_id
    }

    pub(crate) fn update(&mut self, ctx: &mut UpdateContext<'_, '_>) -> bool {
        if self.image_id.is_some() {
            return false;
        }
        self.image_id = Some(ctx.frame.images.request(&self.image_name));
        // Visible only once loaded, which the image system reports itself
        false
    }

    pub(crate) fn queue_render_commands(&self, queue: &mut RenderQueue<'_>) {
        let Some(image) = self.image_id else {
            return;
        };
        if !self.drawable.is_drawn() {
            return;
        }
        queue.draw_image(image, self.drawable.opacity, &self.drawable.shape_draw());
    }
}
