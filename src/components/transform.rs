//! Transform component for simulated bodies.

use glam::Vec2;

/// World placement of a body. Stores position and scale; rotation is not
/// modeled by the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    pub position: Vec2,
    pub scale: Vec2,
}

impl Transform2D {
    /// Create an identity transform.
    pub fn identity() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: Vec2::ONE,
        }
    }

    /// Create a transform from a position.
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            scale: Vec2::ONE,
        }
    }

    /// Create a transform from a position and a (possibly non-uniform) scale.
    pub fn from_position_scale(position: Vec2, scale: Vec2) -> Self {
        Self { position, scale }
    }

    /// Map a point from local space into world space.
    #[inline]
    pub fn transform_point(&self, local: Vec2) -> Vec2 {
        self.position + self.scale * local
    }

    pub fn translate_by(&mut self, offset: Vec2) {
        self.position += offset;
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let t = Transform2D::identity();
        assert_eq!(t.position, Vec2::ZERO);
        assert_eq!(t.scale, Vec2::ONE);
    }

    #[test]
    fn test_transform_point() {
        let t = Transform2D::from_position_scale(Vec2::new(1.0, 2.0), Vec2::new(2.0, 0.5));
        let p = t.transform_point(Vec2::new(1.0, 1.0));
        assert!((p - Vec2::new(3.0, 2.5)).length() < 1e-6);
    }

    #[test]
    fn test_translate_by() {
        let mut t = Transform2D::from_position(Vec2::new(1.0, 1.0));
        t.translate_by(Vec2::new(-0.5, 2.0));
        assert_eq!(t.position, Vec2::new(0.5, 3.0));
    }
}
