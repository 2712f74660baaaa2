//! Instantaneous collision response.

use glam::Vec2;
use tracing::trace;

use crate::bodies::{BodyHandle, BodySet};

use super::contact::Hit;

/// Perfectly elastic exchange between two moving bodies.
///
/// The formula is applied to the full velocity vectors, so the tangential
/// components are exchanged as well.
pub fn elastic_exchange(m1: f32, v1: Vec2, m2: f32, v2: Vec2) -> (Vec2, Vec2) {
    let total = m1 + m2;
    let v1_out = (m1 - m2) / total * v1 + 2.0 * m2 / total * v2;
    let v2_out = 2.0 * m1 / total * v1 + (m2 - m1) / total * v2;
    (v1_out, v2_out)
}

/// Mirror `velocity` about a surface with unit normal `normal`.
#[inline]
pub fn reflect(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Update the velocities of the participants of `hit`.
///
/// Bodies are expected to be at their contact positions already.
pub fn apply_response(bodies: &mut BodySet, hit: &Hit) {
    let Some(first) = bodies.get(hit.entity1) else {
        return;
    };
    let (m1, v1) = (first.mass, first.velocity_or_zero());

    if hit.dynamic {
        let Some(second) = bodies.get(hit.entity2) else {
            return;
        };
        let (m2, v2) = (second.mass, second.velocity_or_zero());
        let (v1_out, v2_out) = elastic_exchange(m1, v1, m2, v2);
        set_velocity(bodies, hit.entity1, v1_out);
        set_velocity(bodies, hit.entity2, v2_out);
        trace!(?v1_out, ?v2_out, "elastic exchange");
    } else {
        let v1_out = reflect(v1, hit.normal);
        set_velocity(bodies, hit.entity1, v1_out);
        trace!(?v1_out, "reflected off static body");
    }
}

fn set_velocity(bodies: &mut BodySet, handle: BodyHandle, velocity: Vec2) {
    if let Some(body) = bodies.get_mut_untracked(handle) {
        if body.velocity.is_some() {
            body.velocity = Some(velocity);
        }
    }
}

/// Run the collision callbacks of both participants, `entity1` first.
pub fn notify(bodies: &mut BodySet, hit: &Hit) {
    invoke(bodies, hit.entity1, hit.entity2);
    invoke(bodies, hit.entity2, hit.entity1);
}

/// Call the callback of `this`, if it is still alive and has one.
///
/// The callback is moved out of the body while it runs so that it can borrow
/// the whole set.
fn invoke(bodies: &mut BodySet, this: BodyHandle, other: BodyHandle) {
    let Some(mut callback) = bodies
        .get_mut_untracked(this)
        .and_then(|b| b.on_collision.take())
    else {
        return;
    };
    callback(bodies, this, other);
    // Put it back unless the body died or installed a new one.
    if let Some(body) = bodies.get_mut_untracked(this) {
        if body.on_collision.is_none() {
            body.on_collision = Some(callback);
        }
    }
}
