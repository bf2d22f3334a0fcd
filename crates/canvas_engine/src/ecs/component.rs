//! Components
//!
//! A component is a unit of per-frame behavior and/or drawing attached to an
//! entity. The set of kinds is closed; each kind implements only the
//! capabilities it has and the dispatch below fills in no-ops for the rest.

use std::sync::atomic::{AtomicU64, Ordering};

use super::components::{CameraDrag, ImageComponent, Lerp, LineComponent, PointerTarget, Shape, TextComponent};
use super::context::UpdateContext;
use crate::render::RenderQueue;

static NEXT_COMPONENT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique component id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub u64);

impl ComponentId {
    fn next() -> Self {
        Self(NEXT_COMPONENT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Concrete component data
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentKind {
    /// Rectangle, ellipse or line segment
    Shape(Shape),
    /// Named image
    Image(ImageComponent),
    /// Polyline
    Line(LineComponent),
    /// Text label
    Text(TextComponent),
    /// Property animation
    Lerp(Lerp),
    /// Hoverable area
    PointerTarget(PointerTarget),
    /// Camera pan/zoom controller
    CameraDrag(CameraDrag),
}

impl ComponentKind {
    /// Name used by tree queries
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Shape(_) => "Shape",
            Self::Image(_) => "Image",
            Self::Line(_) => "Line",
            Self::Text(_) => "Text",
            Self::Lerp(_) => "Lerp",
            Self::PointerTarget(_) => "PointerTarget",
            Self::CameraDrag(_) => "CameraDrag",
        }
    }
}

/// Component attached to an entity
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    id: ComponentId,
    /// Human-readable name
    pub name: String,
    /// Disabled components neither update nor draw
    pub enabled: bool,
    /// Kind-specific data
    pub kind: ComponentKind,
}

impl Component {
    /// Wrap component data under a name
    pub fn new(name: impl Into<String>, kind: ComponentKind) -> Self {
        Self { id: ComponentId::next(), name: name.into(), enabled: true, kind }
    }

    /// Id
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// Kind name used by tree queries
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    /// Per-frame update; true if something visible changed
    pub fn update(&mut self, ctx: &mut UpdateContext<'_, '_>) -> bool {
        if !self.enabled {
            return false;
        }
        let id = self.id;
        match &mut self.kind {
            ComponentKind::Image(image) => image.update(ctx),
            ComponentKind::Lerp(lerp) => lerp.update(ctx),
            ComponentKind::PointerTarget(target) => target.update(id, ctx),
            ComponentKind::CameraDrag(drag) => drag.update(id, ctx),
            ComponentKind::Shape(_) | ComponentKind::Line(_) | ComponentKind::Text(_) => false,
        }
    }

    /// Record draws in entity-local space
    pub fn queue_render_commands(&self, queue: &mut RenderQueue<'_>) {
        if !self.enabled {
            return;
        }
        match &self.kind {
            ComponentKind::Shape(shape) => shape.queue_render_commands(queue),
            ComponentKind::Image(image) => image.queue_render_commands(queue),
            ComponentKind::Line(line) => line.queue_render_commands(queue),
            ComponentKind::Text(text) => text.queue_render_commands(queue),
            ComponentKind::Lerp(_) | ComponentKind::PointerTarget(_) | ComponentKind::CameraDrag(_) => {}
        }
    }

    /// Whether this kind draws anything
    pub fn is_drawable(&self) -> bool {
        matches!(
            self.kind,
            ComponentKind::Shape(_) | ComponentKind::Image(_) | ComponentKind::Line(_) | ComponentKind::Text(_)
        )
    }

    /// Shape data
    pub fn as_shape_mut(&mut self) -> Option<&mut Shape> {
        match &mut self.kind {
            ComponentKind::Shape(shape) => Some(shape),
            _ => None,
        }
    }

    /// Text data
    pub fn as_text_mut(&mut self) -> Option<&mut TextComponent> {
        match &mut self.kind {
            ComponentKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Lerp data
    pub fn as_lerp(&self) -> Option<&Lerp> {
        match &self.kind {
            ComponentKind::Lerp(lerp) => Some(lerp),
            _ => None,
        }
    }

    /// Mutable lerp data
    pub fn as_lerp_mut(&mut self) -> Option<&mut Lerp> {
        match &mut self.kind {
            ComponentKind::Lerp(lerp) => Some(lerp),
            _ => None,
        }
    }

    /// Pointer target data
    pub fn as_pointer_target(&self) -> Option<&PointerTarget> {
        match &self.kind {
            ComponentKind::PointerTarget(target) => Some(target),
            _ => None,
        }
    }

    /// Camera drag data
    pub fn as_camera_drag(&self) -> Option<&CameraDrag> {
        match &self.kind {
            ComponentKind::CameraDrag(drag) => Some(drag),
            _ => None,
        }
    }
}

macro_rules! impl_from_kind {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for ComponentKind {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from_kind!(
    Shape(Shape),
    Image(ImageComponent),
    Line(LineComponent),
    Text(TextComponent),
    Lerp(Lerp),
    PointerTarget(PointerTarget),
    CameraDrag(CameraDrag),
);
