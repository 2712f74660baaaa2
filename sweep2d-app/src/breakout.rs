//! Breakout scene: walls, a pit, an auto-tracking paddle, a brick grid and
//! falling power-ups that split the balls.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;
use glam::Vec2;
use log::{debug, info};
use sweep2d::{Body, BodyHandle, BodySet, Shape, Transform2D};

pub const BALL_RADIUS: f32 = 0.02;
pub const BALL_SPEED: f32 = 1.2;
const PADDLE_HALF_WIDTH: f32 = 0.15;
const PADDLE_Y: f32 = -0.9;
const PADDLE_SPEED: f32 = 1.5;
const BRICK_ROWS: usize = 5;
const BRICK_COLUMNS: usize = 10;
/// Every n-th destroyed brick drops a power-up.
const POWERUP_EVERY: u32 = 6;
/// Maximum bounce angle off the paddle, from vertical.
const MAX_BOUNCE_ANGLE: f32 = std::f32::consts::FRAC_PI_3;

#[derive(Debug, Default)]
pub struct GameState {
    pub score: u32,
    pub lives: u32,
    pub bricks_left: usize,
    pub balls: Vec<BodyHandle>,
    pub powerups: Vec<BodyHandle>,
    pub splits_pending: u32,
}

impl GameState {
    fn is_ball(&self, handle: BodyHandle) -> bool {
        self.balls.contains(&handle)
    }

    pub fn is_over(&self) -> bool {
        self.lives == 0 || self.bricks_left == 0
    }
}

pub struct Breakout {
    pub bodies: BodySet,
    pub state: Rc<RefCell<GameState>>,
    pub paddle: BodyHandle,
}

impl Breakout {
    pub fn new(lives: u32) -> Result<Self> {
        let mut bodies = BodySet::new();
        let state = Rc::new(RefCell::new(GameState {
            lives,
            ..Default::default()
        }));

        // Side walls and ceiling.
        for shape in [
            Shape::rect(-1.2, -1.0, -1.2, 1.2),
            Shape::rect(1.0, 1.2, -1.2, 1.2),
            Shape::rect(-1.2, 1.2, 1.0, 1.2),
        ] {
            bodies.insert(Body::new_static(Transform2D::identity(), shape))?;
        }

        let paddle = bodies.insert(
            Body::new_static(
                Transform2D::from_position(Vec2::new(0.0, PADDLE_Y)),
                Shape::rect(-PADDLE_HALF_WIDTH, PADDLE_HALF_WIDTH, -0.03, 0.0),
            )
            .with_callback(paddle_callback(state.clone())),
        )?;

        bodies.insert(
            Body::new_static(Transform2D::identity(), Shape::rect(-1.2, 1.2, -1.2, -1.0))
                .with_callback(pit_callback(state.clone(), paddle)),
        )?;

        let width = 2.0 / BRICK_COLUMNS as f32;
        for row in 0..BRICK_ROWS {
            for col in 0..BRICK_COLUMNS {
                let lower_left = Vec2::new(-1.0 + col as f32 * width, 0.45 + row as f32 * 0.08);
                bodies.insert(
                    Body::new_static(
                        Transform2D::from_position_scale(lower_left, Vec2::new(width * 0.95, 0.07)),
                        Shape::unit_rect(),
                    )
                    .with_callback(brick_callback(state.clone(), paddle)),
                )?;
            }
        }
        state.borrow_mut().bricks_left = BRICK_ROWS * BRICK_COLUMNS;

        let ball = spawn_ball(&mut bodies, Vec2::new(0.0, PADDLE_Y + 0.1), Vec2::new(0.6, 1.0))?;
        state.borrow_mut().balls.push(ball);

        Ok(Self {
            bodies,
            state,
            paddle,
        })
    }

    /// Move the paddle toward the lowest ball.
    pub fn steer_paddle(&mut self, dt: f32) {
        let target = {
            let state = self.state.borrow();
            state
                .balls
                .iter()
                .filter_map(|h| self.bodies.get(*h))
                .map(|b| b.transform.position)
                .min_by(|a, b| a.y.total_cmp(&b.y))
        };
        let Some(target) = target else {
            return;
        };
        let Some(paddle) = self.bodies.get(self.paddle) else {
            return;
        };
        let x = paddle.transform.position.x;
        let step = (target.x - x).clamp(-PADDLE_SPEED * dt, PADDLE_SPEED * dt);
        if step.abs() < 1e-4 {
            return;
        }
        let limit = 1.0 - PADDLE_HALF_WIDTH;
        if let Some(paddle) = self.bodies.get_mut(self.paddle) {
            paddle.transform.position.x = (x + step).clamp(-limit, limit);
        }
    }

    /// Split every ball in two for each power-up caught since the last call.
    pub fn apply_splits(&mut self) -> Result<()> {
        let (splits, balls) = {
            let mut state = self.state.borrow_mut();
            (std::mem::take(&mut state.splits_pending), state.balls.clone())
        };
        for _ in 0..splits {
            for &ball in &balls {
                let Some(body) = self.bodies.get(ball) else {
                    continue;
                };
                let position = body.transform.position;
                let velocity = body.velocity_or_zero();
                let rotated = Vec2::from_angle(0.5).rotate(velocity);
                let offset = rotated.normalize_or_zero() * 3.0 * BALL_RADIUS;
                let spawned = spawn_ball(&mut self.bodies, position + offset, rotated)?;
                self.state.borrow_mut().balls.push(spawned);
            }
            info!("power-up: balls split");
        }
        Ok(())
    }

    /// Forget handles of bodies removed during the frame.
    pub fn prune(&mut self) {
        let bodies = &self.bodies;
        let mut state = self.state.borrow_mut();
        state.balls.retain(|h| bodies.contains(*h));
        state.powerups.retain(|h| bodies.contains(*h));
    }
}

fn spawn_ball(bodies: &mut BodySet, position: Vec2, direction: Vec2) -> Result<BodyHandle> {
    let velocity = direction.normalize_or(Vec2::Y) * BALL_SPEED;
    Ok(bodies.insert(Body::new_dynamic(
        Transform2D::from_position(position),
        Shape::circle(Vec2::ZERO, BALL_RADIUS),
        velocity,
    ))?)
}

/// Re-aim the ball by where it struck the paddle.
fn paddle_callback(
    state: Rc<RefCell<GameState>>,
) -> impl FnMut(&mut BodySet, BodyHandle, BodyHandle) {
    move |set, this, other| {
        if !state.borrow().is_ball(other) {
            return;
        }
        let Some(center) = set.get(this).map(|p| p.transform.position.x) else {
            return;
        };
        let Some(ball) = set.get_mut(other) else {
            return;
        };
        let offset = ((ball.transform.position.x - center) / PADDLE_HALF_WIDTH).clamp(-1.0, 1.0);
        let speed = ball.velocity_or_zero().length().max(BALL_SPEED);
        let angle = offset * MAX_BOUNCE_ANGLE;
        ball.velocity = Some(Vec2::new(angle.sin(), angle.cos()) * speed);
    }
}

/// Lose a ball; respawn above the paddle while lives remain.
fn pit_callback(
    state: Rc<RefCell<GameState>>,
    paddle: BodyHandle,
) -> impl FnMut(&mut BodySet, BodyHandle, BodyHandle) {
    move |set, _, other| {
        let mut state = state.borrow_mut();
        if !state.is_ball(other) {
            return;
        }
        set.remove(other);
        state.balls.retain(|h| *h != other);
        if !state.balls.is_empty() {
            return;
        }

        state.lives = state.lives.saturating_sub(1);
        info!("ball lost, {} lives left", state.lives);
        if state.lives == 0 {
            return;
        }
        let x = set.get(paddle).map_or(0.0, |p| p.transform.position.x);
        if let Ok(ball) = spawn_ball(set, Vec2::new(x, PADDLE_Y + 0.1), Vec2::new(0.4, 1.0)) {
            state.balls.push(ball);
        }
    }
}

/// Break on a ball hit, score, and occasionally drop a power-up.
fn brick_callback(
    state: Rc<RefCell<GameState>>,
    paddle: BodyHandle,
) -> impl FnMut(&mut BodySet, BodyHandle, BodyHandle) {
    move |set, this, other| {
        if !state.borrow().is_ball(other) {
            return;
        }
        let center = set.world_bounds(this).map(|b| b.center());
        set.remove(this);

        let drop_powerup = {
            let mut state = state.borrow_mut();
            state.score += 1;
            state.bricks_left = state.bricks_left.saturating_sub(1);
            debug!("brick destroyed, score {} with {} left", state.score, state.bricks_left);
            state.score % POWERUP_EVERY == 0
        };
        let Some(center) = center.filter(|_| drop_powerup) else {
            return;
        };

        let powerup = Body::new_dynamic(
            Transform2D::from_position(center),
            Shape::rect(-0.03, 0.03, -0.015, 0.015),
            Vec2::new(0.0, -0.6),
        )
        .with_mass(0.01)
        .with_callback(powerup_callback(state.clone(), paddle));
        if let Ok(handle) = set.insert(powerup) {
            state.borrow_mut().powerups.push(handle);
        }
    }
}

/// A power-up vanishes on its first contact; caught by the paddle it
/// requests a split.
fn powerup_callback(
    state: Rc<RefCell<GameState>>,
    paddle: BodyHandle,
) -> impl FnMut(&mut BodySet, BodyHandle, BodyHandle) {
    move |set, this, other| {
        set.remove(this);
        if other == paddle {
            state.borrow_mut().splits_pending += 1;
        }
    }
}
