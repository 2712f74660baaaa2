//! Physics components of a body: shape, motion and collision hook.

use std::fmt;

use glam::Vec2;

use crate::bodies::{BodyHandle, BodySet};
use crate::error::{PhysicsError, Result};

use super::transform::Transform2D;

/// Local-space collision shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Axis-aligned rectangle given by its bounds.
    Rect {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
    },
    Circle { origin: Vec2, radius: f32 },
}

impl Shape {
    /// The unit square `[0, 1] x [0, 1]`. Scaled and placed by the transform,
    /// so the transform position becomes the lower left corner.
    pub fn unit_rect() -> Self {
        Shape::Rect {
            left: 0.0,
            right: 1.0,
            bottom: 0.0,
            top: 1.0,
        }
    }

    /// A circle of radius 1 centered on the transform position.
    pub fn unit_circle() -> Self {
        Shape::Circle {
            origin: Vec2::ZERO,
            radius: 1.0,
        }
    }

    pub fn rect(left: f32, right: f32, bottom: f32, top: f32) -> Self {
        Shape::Rect {
            left,
            right,
            bottom,
            top,
        }
    }

    pub fn circle(origin: Vec2, radius: f32) -> Self {
        Shape::Circle { origin, radius }
    }

    /// Check that the parameters describe a real region.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Shape::Rect {
                left,
                right,
                bottom,
                top,
            } => {
                if ![left, right, bottom, top].iter().all(|v| v.is_finite()) {
                    return Err(PhysicsError::InvalidShape(format!(
                        "rect bounds must be finite, got {left}..{right}, {bottom}..{top}"
                    )));
                }
                if left > right || bottom > top {
                    return Err(PhysicsError::InvalidShape(format!(
                        "rect bounds are inverted: {left}..{right}, {bottom}..{top}"
                    )));
                }
                Ok(())
            }
            Shape::Circle { origin, radius } => {
                if !origin.is_finite() || !radius.is_finite() || radius < 0.0 {
                    return Err(PhysicsError::InvalidShape(format!(
                        "circle at {origin} with radius {radius}"
                    )));
                }
                Ok(())
            }
        }
    }
}

/// Hook invoked once per resolved collision with `(self, other)`.
///
/// The callback may freely edit or remove bodies in the set; the engine
/// re-validates everything it touches afterwards.
pub type CollisionCallback = Box<dyn FnMut(&mut BodySet, BodyHandle, BodyHandle)>;

/// A simulated object.
///
/// A body with `velocity == None` is static. Static bodies never move but
/// still take part in collisions and receive callbacks.
pub struct Body {
    pub transform: Transform2D,
    pub shape: Shape,
    pub velocity: Option<Vec2>,
    /// Only used for the elastic exchange between two dynamic bodies.
    pub mass: f32,
    pub on_collision: Option<CollisionCallback>,
}

impl Body {
    /// Create a new static body.
    pub fn new_static(transform: Transform2D, shape: Shape) -> Self {
        Self {
            transform,
            shape,
            velocity: None,
            mass: 1.0,
            on_collision: None,
        }
    }

    /// Create a new dynamic body moving with `velocity`.
    pub fn new_dynamic(transform: Transform2D, shape: Shape, velocity: Vec2) -> Self {
        Self {
            transform,
            shape,
            velocity: Some(velocity),
            mass: 1.0,
            on_collision: None,
        }
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&mut BodySet, BodyHandle, BodyHandle) + 'static,
    {
        self.on_collision = Some(Box::new(callback));
        self
    }

    #[inline]
    pub fn is_dynamic(&self) -> bool {
        self.velocity.is_some()
    }

    /// Velocity used by the solvers; static bodies contribute zero.
    #[inline]
    pub fn velocity_or_zero(&self) -> Vec2 {
        self.velocity.unwrap_or(Vec2::ZERO)
    }

    pub fn validate(&self) -> Result<()> {
        self.shape.validate()?;
        if !self.mass.is_finite() || self.mass <= 0.0 {
            return Err(PhysicsError::InvalidMass(self.mass));
        }
        if let Some(v) = self.velocity {
            if !v.is_finite() {
                return Err(PhysicsError::InvalidVelocity(v.x, v.y));
            }
        }
        if !self.transform.position.is_finite() || !self.transform.scale.is_finite() {
            return Err(PhysicsError::InvalidShape(format!(
                "transform must be finite, got position {} scale {}",
                self.transform.position, self.transform.scale
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body")
            .field("transform", &self.transform)
            .field("shape", &self.shape)
            .field("velocity", &self.velocity)
            .field("mass", &self.mass)
            .field("on_collision", &self.on_collision.is_some())
            .finish()
    }
}
