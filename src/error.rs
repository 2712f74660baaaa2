//! Error types for the collision engine.

use thiserror::Error;

use crate::bodies::BodyHandle;

/// Errors reported at the public boundary of the engine.
///
/// Numeric degeneracies inside the solvers are never errors; they simply mean
/// "no collision".
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PhysicsError {
    /// Shape parameters that cannot describe a real region.
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    #[error("invalid mass {0}: mass must be finite and positive")]
    InvalidMass(f32),

    #[error("invalid velocity ({0}, {1}): velocity must be finite")]
    InvalidVelocity(f32, f32),

    /// The handle refers to a body that has been removed.
    #[error("stale body handle {0:?}")]
    StaleHandle(BodyHandle),
}

pub type Result<T> = std::result::Result<T, PhysicsError>;
