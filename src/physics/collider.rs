//! World-space collision geometry derived from a body's shape and transform.

use glam::Vec2;

use crate::components::{Shape, Transform2D};

/// Axis-aligned bounding box for discrete overlap tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb2D {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb2D {
    /// Test whether two boxes overlap. Touching boxes do not overlap.
    #[inline]
    pub fn overlaps(&self, other: &Aabb2D) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        0.5 * (self.min + self.max)
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }
}

/// A shape placed in the world, ready for the swept solvers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorldShape {
    /// Rectangle by center and full width/height.
    Rect { center: Vec2, size: Vec2 },
    Circle { center: Vec2, radius: f32 },
}

impl WorldShape {
    /// Map a local shape into world space. Rotation is ignored.
    ///
    /// Circles scale by the largest absolute scale component so a
    /// non-uniformly scaled circle still encloses its scaled extent. Under
    /// non-uniform scale this differs from scaling the radius by `scale.x`.
    pub fn from_body(transform: &Transform2D, shape: &Shape) -> Self {
        match *shape {
            Shape::Rect {
                left,
                right,
                bottom,
                top,
            } => {
                let a = transform.scale * Vec2::new(left, bottom);
                let b = transform.scale * Vec2::new(right, top);
                // Negative scale mirrors the bounds.
                let lb = a.min(b);
                let rt = a.max(b);
                WorldShape::Rect {
                    center: transform.position + 0.5 * (lb + rt),
                    size: rt - lb,
                }
            }
            Shape::Circle { origin, radius } => {
                let scale = transform.scale.abs().max_element();
                WorldShape::Circle {
                    center: transform.transform_point(origin),
                    radius: radius * scale,
                }
            }
        }
    }

    /// Compute the world-space AABB for this shape.
    pub fn aabb(&self) -> Aabb2D {
        match *self {
            WorldShape::Rect { center, size } => Aabb2D {
                min: center - 0.5 * size,
                max: center + 0.5 * size,
            },
            WorldShape::Circle { center, radius } => Aabb2D {
                min: center - Vec2::splat(radius),
                max: center + Vec2::splat(radius),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_world_shape() {
        let transform =
            Transform2D::from_position_scale(Vec2::new(-0.995, 0.95), Vec2::new(0.19, 0.04));
        let shape = WorldShape::from_body(&transform, &Shape::unit_rect());
        let WorldShape::Rect { center, size } = shape else {
            panic!("expected a rect");
        };
        let eps = 1e-6;
        assert!((center - Vec2::new(-0.9, 0.97)).length() < eps);
        assert!((size - Vec2::new(0.19, 0.04)).length() < eps);
    }

    #[test]
    fn test_rect_negative_scale() {
        let transform = Transform2D::from_position_scale(Vec2::ZERO, Vec2::new(-2.0, 1.0));
        let aabb = WorldShape::from_body(&transform, &Shape::unit_rect()).aabb();
        let eps = 1e-6;
        assert!((aabb.min - Vec2::new(-2.0, 0.0)).length() < eps);
        assert!((aabb.max - Vec2::new(0.0, 1.0)).length() < eps);
    }

    #[test]
    fn test_circle_world_shape() {
        let transform = Transform2D::from_position_scale(Vec2::new(1.0, 1.0), Vec2::new(0.02, 0.01));
        let shape = WorldShape::from_body(&transform, &Shape::circle(Vec2::new(1.0, 0.0), 1.0));
        let WorldShape::Circle { center, radius } = shape else {
            panic!("expected a circle");
        };
        assert!((center - Vec2::new(1.02, 1.0)).length() < 1e-6);
        assert!((radius - 0.02).abs() < 1e-6);
    }

    #[test]
    fn test_circle_radius_uses_largest_scale() {
        let transform = Transform2D::from_position_scale(Vec2::ZERO, Vec2::new(0.01, -0.03));
        let shape = WorldShape::from_body(&transform, &Shape::unit_circle());
        let WorldShape::Circle { radius, .. } = shape else {
            panic!("expected a circle");
        };
        assert!((radius - 0.03).abs() < 1e-6);
    }

    #[test]
    fn test_aabb_overlap() {
        let a = Aabb2D {
            min: Vec2::new(-1.0, -1.0),
            max: Vec2::new(1.0, 1.0),
        };
        let b = Aabb2D {
            min: Vec2::new(0.5, 0.5),
            max: Vec2::new(2.0, 2.0),
        };
        let touching = Aabb2D {
            min: Vec2::new(1.0, -1.0),
            max: Vec2::new(2.0, 1.0),
        };
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&touching));
        assert_eq!(b.center(), Vec2::new(1.25, 1.25));
        assert_eq!(a.size(), Vec2::new(2.0, 2.0));
    }
}
