//! Scene setup helpers shared by the benchmarks.

use anyhow::Result;
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sweep2d::{Body, BodySet, PhysicsConfig, PhysicsEngine2D, Shape, Transform2D};

/// Four static walls enclosing `[-half, half]` on both axes.
pub fn spawn_walls(bodies: &mut BodySet, half: f32) -> Result<()> {
    let t = 1.0;
    for shape in [
        Shape::rect(-half - t, -half, -half - t, half + t),
        Shape::rect(half, half + t, -half - t, half + t),
        Shape::rect(-half - t, half + t, -half - t, -half),
        Shape::rect(-half - t, half + t, half, half + t),
    ] {
        bodies.insert(Body::new_static(Transform2D::identity(), shape))?;
    }
    Ok(())
}

/// `n` small balls on a grid inside a box, with random velocities.
pub fn setup_ball_box(n: usize) -> Result<BodySet> {
    let mut bodies = BodySet::new();
    let half = 10.0;
    spawn_walls(&mut bodies, half)?;

    // Fixed seed so scenes are identical across runs.
    let mut rng = StdRng::seed_from_u64(42);
    let per_row = (n as f32).sqrt().ceil().max(1.0) as usize;
    let spacing = 2.0 * half / (per_row as f32 + 1.0);
    let radius = (spacing * 0.25).min(0.2);
    for i in 0..n {
        let position = Vec2::new(
            -half + spacing * ((i % per_row) as f32 + 1.0),
            -half + spacing * ((i / per_row) as f32 + 1.0),
        );
        let velocity = Vec2::new(rng.gen_range(-3.0..3.0), rng.gen_range(-3.0..3.0));
        bodies.insert(Body::new_dynamic(
            Transform2D::from_position(position),
            Shape::circle(Vec2::ZERO, radius),
            velocity,
        ))?;
    }
    Ok(bodies)
}

/// One ball above a grid of `n` static bricks.
pub fn setup_brick_field(n: usize) -> Result<BodySet> {
    let mut bodies = BodySet::new();
    let half = 10.0;
    spawn_walls(&mut bodies, half)?;

    let per_row = (n as f32).sqrt().ceil().max(1.0) as usize;
    let width = 2.0 * half / per_row as f32;
    for i in 0..n {
        let left = -half + width * (i % per_row) as f32;
        let bottom = (i / per_row) as f32 * 0.3;
        bodies.insert(Body::new_static(
            Transform2D::from_position_scale(Vec2::new(left, bottom), Vec2::new(width * 0.9, 0.2)),
            Shape::unit_rect(),
        ))?;
    }
    bodies.insert(Body::new_dynamic(
        Transform2D::from_position(Vec2::new(0.1, -half + 1.0)),
        Shape::circle(Vec2::ZERO, 0.1),
        Vec2::new(2.3, 4.1),
    ))?;
    Ok(bodies)
}

/// Ball box with a freshly constructed engine.
pub fn setup_scene(n: usize) -> Result<(BodySet, PhysicsEngine2D)> {
    let mut bodies = setup_ball_box(n)?;
    let mut engine = PhysicsEngine2D::new(PhysicsConfig::default());
    engine.construct(&mut bodies);
    Ok((bodies, engine))
}
