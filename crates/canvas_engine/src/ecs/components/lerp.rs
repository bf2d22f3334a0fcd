//! Lerp component
//!
//! Moves one property of its entity toward a target value every frame.
//! Two laws are available:
//!
//! - **Linear**: constant speed in units per second. With `degrees` set the
//!   value is treated as an angle and travels the shortest way round.
//! - **Fractional**: each frame covers `speed * dt` of the remaining
//!   distance, but never less than `min_step`, so it always arrives instead
//!   of stalling asymptotically. Within `epsilon` it snaps.
//!
//! Neither law overshoots: a step that would pass the target lands on it.
//! Writes go through the world setters, so dirty flags follow as usual.

use serde::{Deserialize, Serialize};

use crate::ecs::context::UpdateContext;
use crate::ecs::entity::EntityId;
use crate::ecs::world::World;
use crate::foundation::math::{utils, Vec2};

/// Entity property driven by a lerp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LerpProperty {
    /// Local x position
    PositionX,
    /// Local y position
    PositionY,
    /// Rotation in degrees
    Rotation,
    /// Horizontal scale
    ScaleX,
    /// Vertical scale
    ScaleY,
    /// Entity opacity
    Opacity,
}

impl LerpProperty {
    /// Current value on an entity
    pub fn read(self, world: &World, entity: EntityId) -> Option<f32> {
        let entity = world.entity(entity)?;
        let transform = entity.transform();
        Some(match self {
            Self::PositionX => transform.position().x,
            Self::PositionY => transform.position().y,
            Self::Rotation => transform.rotation(),
            Self::ScaleX => transform.scale().x,
            Self::ScaleY => transform.scale().y,
            Self::Opacity => entity.opacity(),
        })
    }

    /// Write a value through the matching world setter
    pub fn write(self, world: &mut World, entity: EntityId, value: f32) -> bool {
        let Some(current) = world.entity(entity) else {
            return false;
        };
        let position = current.transform().position();
        let scale = current.transform().scale();
        match self {
            Self::PositionX => world.set_position(entity, Vec2::new(value, position.y)),
            Self::PositionY => world.set_position(entity, Vec2::new(position.x, value)),
            Self::Rotation => world.set_rotation(entity, value),
            Self::ScaleX => world.set_scale(entity, Vec2::new(value, scale.y)),
            Self::ScaleY => world.set_scale(entity, Vec2::new(scale.x, value)),
            Self::Opacity => world.set_opacity(entity, value),
        }
    }
}

/// How the value approaches its target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LerpLaw {
    /// Constant speed
    Linear {
        /// Units per second
        speed: f32,
        /// Treat the value as an angle in degrees
        degrees: bool,
    },
    /// Fraction of the remaining distance per second
    Fractional {
        /// Fraction of the remaining distance covered per second
        speed: f32,
        /// Smallest step taken per frame
        min_step: f32,
        /// Distance below which the value snaps to the target
        epsilon: f32,
    },
}

impl LerpLaw {
    /// Next value after `delta_time` seconds
    pub fn step(self, current: f32, target: f32, delta_time: f32) -> f32 {
        match self {
            Self::Linear { speed, degrees } => {
                let delta = if degrees {
                    utils::shortest_angle_delta(current, target)
                } else {
                    target - current
                };
                let step = speed.abs() * delta_time;
                if step >= delta.abs() {
                    target
                } else {
                    current + step.copysign(delta)
                }
            }
            Self::Fractional { speed, min_step, epsilon } => {
                let delta = target - current;
                let mut step = delta * speed * delta_time;
                if step.abs() < min_step {
                    step = min_step.copysign(delta);
                }
                if step.abs() >= delta.abs() {
                    return target;
                }
                let next = current + step;
                if (target - next).abs() <= epsilon {
                    target
                } else {
                    next
                }
            }
        }
    }
}

/// Animates one entity property toward a target
#[derive(Debug, Clone, PartialEq)]
pub struct Lerp {
    /// Driven property
    pub property: LerpProperty,
    /// Approach law
    pub law: LerpLaw,
    target: Option<f32>,
}

impl Lerp {
    /// Lerp with no target yet
    pub fn new(property: LerpProperty, law: LerpLaw) -> Self {
        Self { property, law, target: None }
    }

    /// Linear lerp
    pub fn linear(property: LerpProperty, speed: f32) -> Self {
        Self::new(property, LerpLaw::Linear { speed, degrees: property == LerpProperty::Rotation })
    }

    /// Fractional lerp
    pub fn fractional(property: LerpProperty, speed: f32, min_step: f32, epsilon: f32) -> Self {
        Self::new(property, LerpLaw::Fractional { speed, min_step, epsilon })
    }

    /// Start with a target
    pub fn with_target(mut self, target: f32) -> Self {
        self.target = Some(target);
        self
    }

    /// Current target
    pub fn target(&self) -> Option<f32> {
        self.target
    }

    /// Retarget
    pub fn set_target(&mut self, target: f32) {
        self.target = Some(target);
    }

    /// Stop animating
    pub fn clear_target(&mut self) {
        self.target = None;
    }

    pub(crate) fn update(&mut self, ctx: &mut UpdateContext<'_, '_>) -> bool {
        let Some(target) = self.target else {
            return false;
        };
        let Some(current) = self.property.read(ctx.world, ctx.entity) else {
            return false;
        };
        if current == target {
            return false;
        }
        let next = self.law.step(current, target, ctx.frame.delta_time);
        self.property.write(ctx.world, ctx.entity, next)
    }
}
