//! Per-body data read and written by the engine.

pub mod physics;
pub mod transform;

pub use physics::{Body, CollisionCallback, Shape};
pub use transform::Transform2D;
