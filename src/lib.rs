//! sweep2d: continuous-time 2D collision engine
//!
//! Bodies are circles and axis-aligned rectangles moving at constant velocity.
//! Rather than stepping and correcting overlaps, the engine solves for the
//! exact moment each pair touches and processes contacts in time order, so
//! nothing tunnels through thin walls regardless of the frame length.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! 1. **components** - Plain body data (transform, shape, velocity, callback)
//! 2. **bodies** - Generation-checked body storage with change tracking
//! 3. **physics::sweep** - Closed-form swept collision solvers
//! 4. **physics::hitlist** - Min-time event queue and invalidation cascade
//! 5. **physics** - `PhysicsEngine2D`, the per-frame driver and response

pub mod bodies;
pub mod components;
pub mod error;
pub mod physics;

pub use bodies::{BodyHandle, BodySet};
pub use components::{Body, CollisionCallback, Shape, Transform2D};
pub use error::{PhysicsError, Result};
pub use physics::collider::{Aabb2D, WorldShape};
pub use physics::contact::{ContactEvent, Hit, NEVER};
pub use physics::hitlist::Hitlist;
pub use physics::sweep::{sweep, Sweep};
pub use physics::{PhysicsConfig, PhysicsEngine2D};

// Re-export glam for convenience
pub use glam;
