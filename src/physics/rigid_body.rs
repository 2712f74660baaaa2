//! Kinematic integration of moving bodies.

use crate::bodies::{BodyHandle, BodySet};

/// Move every dynamic body along its velocity for `dt` seconds.
///
/// These writes are the engine's own and are not recorded as external
/// changes.
pub fn advance_positions(bodies: &mut BodySet, dt: f32) {
    if dt == 0.0 {
        return;
    }
    for (_, body) in bodies.iter_mut_untracked() {
        if let Some(velocity) = body.velocity {
            body.transform.translate_by(velocity * dt);
        }
    }
}

/// Like [`advance_positions`], but each body stops at `horizon(handle)`
/// seconds when that comes first, so nobody is carried past a predicted
/// contact that was not resolved.
pub fn advance_positions_until(
    bodies: &mut BodySet,
    dt: f32,
    horizon: impl Fn(BodyHandle) -> f32,
) {
    if dt == 0.0 {
        return;
    }
    for (handle, body) in bodies.iter_mut_untracked() {
        if let Some(velocity) = body.velocity {
            let step = dt.min(horizon(handle)).max(0.0);
            body.transform.translate_by(velocity * step);
        }
    }
}

/// Total kinetic energy of all dynamic bodies.
pub fn kinetic_energy(bodies: &BodySet) -> f32 {
    bodies
        .iter()
        .filter_map(|(_, b)| b.velocity.map(|v| 0.5 * b.mass * v.length_squared()))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Body, Shape, Transform2D};
    use glam::Vec2;

    #[test]
    fn test_advance_moves_only_dynamic_bodies() {
        let mut bodies = BodySet::new();
        let ball = bodies
            .insert(Body::new_dynamic(
                Transform2D::from_position(Vec2::new(1.0, 1.0)),
                Shape::unit_circle(),
                Vec2::new(2.0, -1.0),
            ))
            .unwrap();
        let wall = bodies
            .insert(Body::new_static(
                Transform2D::from_position(Vec2::new(5.0, 0.0)),
                Shape::unit_rect(),
            ))
            .unwrap();
        bodies.take_touched();

        advance_positions(&mut bodies, 0.5);

        let eps = 1e-6;
        let p = bodies.get(ball).unwrap().transform.position;
        assert!((p - Vec2::new(2.0, 0.5)).length() < eps);
        assert_eq!(
            bodies.get(wall).unwrap().transform.position,
            Vec2::new(5.0, 0.0)
        );
        assert!(bodies.take_touched().is_empty());
    }

    #[test]
    fn test_advance_until_stops_at_horizon() {
        let mut bodies = BodySet::new();
        let held = bodies
            .insert(Body::new_dynamic(
                Transform2D::identity(),
                Shape::unit_circle(),
                Vec2::new(1.0, 0.0),
            ))
            .unwrap();
        let free = bodies
            .insert(Body::new_dynamic(
                Transform2D::identity(),
                Shape::unit_circle(),
                Vec2::new(0.0, 2.0),
            ))
            .unwrap();

        advance_positions_until(&mut bodies, 1.0, |h| {
            if h == held {
                0.25
            } else {
                f32::INFINITY
            }
        });

        let eps = 1e-6;
        let p = bodies.get(held).unwrap().transform.position;
        assert!((p - Vec2::new(0.25, 0.0)).length() < eps);
        let p = bodies.get(free).unwrap().transform.position;
        assert!((p - Vec2::new(0.0, 2.0)).length() < eps);
    }

    #[test]
    fn test_kinetic_energy() {
        let mut bodies = BodySet::new();
        bodies
            .insert(
                Body::new_dynamic(Transform2D::identity(), Shape::unit_circle(), Vec2::X)
                    .with_mass(2.0),
            )
            .unwrap();
        bodies
            .insert(Body::new_dynamic(
                Transform2D::identity(),
                Shape::unit_circle(),
                Vec2::new(0.0, -3.0),
            ))
            .unwrap();
        bodies
            .insert(Body::new_static(Transform2D::identity(), Shape::unit_rect()))
            .unwrap();

        let eps = 1e-6;
        assert!((kinetic_energy(&bodies) - 5.5).abs() < eps);
    }
}
