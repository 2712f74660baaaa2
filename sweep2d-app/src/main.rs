mod breakout;

use anyhow::Result;
use clap::Parser;
use log::info;
use sweep2d::{PhysicsConfig, PhysicsEngine2D};

use crate::breakout::Breakout;

/// Headless Breakout run on the sweep2d collision engine.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct RunConfig {
    /// Number of frames to simulate.
    #[arg(default_value_t = 60 * 120)]
    frames: u32,

    /// Seconds of simulated time per frame.
    #[arg(default_value_t = 1.0 / 60.0)]
    frame_time: f32,

    /// Balls that may be lost before the game ends.
    #[arg(long, default_value_t = 3)]
    lives: u32,
}

impl RunConfig {
    fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.frame_time > 0.0 && self.frame_time.is_finite(),
            "frame time must be positive, got {}",
            self.frame_time
        );
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let run = RunConfig::parse();
    run.validate()?;

    let mut game = Breakout::new(run.lives)?;
    let mut engine = PhysicsEngine2D::new(PhysicsConfig::default());
    engine.construct(&mut game.bodies);

    let frames_per_second = (1.0 / run.frame_time).round().max(1.0) as u32;
    let mut total_events = 0usize;
    let mut frame = 0;
    while frame < run.frames {
        game.steer_paddle(run.frame_time);
        total_events += engine.process(&mut game.bodies, run.frame_time);
        game.prune();
        game.apply_splits()?;
        frame += 1;

        let state = game.state.borrow();
        if frame % frames_per_second == 0 {
            info!(
                "t={:.0}s score={} lives={} balls={} bricks={} events={}",
                frame as f32 * run.frame_time,
                state.score,
                state.lives,
                state.balls.len(),
                state.bricks_left,
                total_events,
            );
        }
        if state.is_over() {
            break;
        }
    }

    let state = game.state.borrow();
    let outcome = if state.bricks_left == 0 {
        "cleared"
    } else if state.lives == 0 {
        "game over"
    } else {
        "time up"
    };
    info!(
        "{outcome} after {frame} frames: score {} with {} lives, {total_events} collisions",
        state.score, state.lives
    );
    println!(
        "{outcome}: score {} / bricks left {} / lives {} / frames {frame} / collisions {total_events}",
        state.score, state.bricks_left, state.lives
    );
    Ok(())
}
