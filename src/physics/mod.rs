//! Continuous-time collision engine.
//!
//! # Architecture
//!
//! Instead of stepping and fixing overlaps, the engine predicts the exact time
//! of every upcoming contact and jumps from one to the next:
//!
//! 1. Sync bodies changed outside the engine
//! 2. Pop the earliest queued collision that falls inside the frame
//! 3. Advance every moving body to the contact time
//! 4. Apply the elastic or reflective response
//! 5. Run the collision callbacks of both participants
//! 6. Purge events of removed bodies and recompute the participants
//! 7. Repeat until the next collision lies beyond the frame, then advance
//!    the bodies through the rest of it

pub mod collider;
pub mod contact;
pub mod hitlist;
pub mod rigid_body;
pub mod solver;
pub mod sweep;

use tracing::{debug, trace, warn};

use crate::bodies::{BodyHandle, BodySet};
use crate::components::Body;
use crate::error::Result;

use self::contact::{ContactEvent, Hit};
use self::hitlist::Hitlist;

/// Configuration for the collision engine.
#[derive(Debug, Clone)]
pub struct PhysicsConfig {
    /// Two predicted times closer than this are treated as simultaneous when
    /// deciding whether a new event beats a partner's commitment.
    /// Default: 1e-6.
    pub time_epsilon: f32,
    /// Maximum number of collisions resolved by one `process` call. When hit,
    /// moving bodies are advanced through the rest of the frame but held at
    /// their next predicted contact, and the queue is rebuilt. Default: 10000.
    pub max_events_per_process: usize,
    /// Maximum number of bodies recomputed by one invalidation cascade.
    /// Default: 100000.
    pub max_cascade: usize,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            time_epsilon: 1e-6,
            max_events_per_process: 10_000,
            max_cascade: 100_000,
        }
    }
}

/// The engine state: queued collisions and the contacts of the last frame.
///
/// Bodies live in a [`BodySet`] owned by the caller and passed to each call.
#[derive(Debug, Clone)]
pub struct PhysicsEngine2D {
    config: PhysicsConfig,
    hitlist: Hitlist,
    contacts: Vec<ContactEvent>,
}

impl Default for PhysicsEngine2D {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}

impl PhysicsEngine2D {
    /// Create a new engine with the given configuration.
    pub fn new(config: PhysicsConfig) -> Self {
        Self {
            hitlist: Hitlist::new(config.time_epsilon, config.max_cascade),
            config,
            contacts: Vec::new(),
        }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn hitlist(&self) -> &Hitlist {
        &self.hitlist
    }

    /// Contacts resolved by the last [`PhysicsEngine2D::process`] call.
    pub fn contacts(&self) -> &[ContactEvent] {
        &self.contacts
    }

    /// Queued collisions, earliest first.
    pub fn pending(&self) -> Vec<Hit> {
        self.hitlist.snapshot()
    }

    pub fn next_hit(&self) -> Option<&Hit> {
        self.hitlist.peek()
    }

    /// Earliest known collision time of a moving body.
    pub fn earliest(&self, handle: BodyHandle) -> f32 {
        self.hitlist.earliest(handle)
    }

    /// Drop every queued collision and contact record.
    pub fn clear(&mut self) {
        self.hitlist.clear();
        self.contacts.clear();
        debug!("engine cleared");
    }

    /// Rebuild the queue from scratch for every body in the set.
    pub fn construct(&mut self, bodies: &mut BodySet) {
        bodies.take_touched();
        self.hitlist.construct(bodies);
    }

    /// Register a body that is already in the set.
    pub fn add_body(&mut self, bodies: &BodySet, handle: BodyHandle) -> Result<()> {
        bodies.try_get(handle)?;
        self.hitlist.recompute_for(bodies, handle);
        Ok(())
    }

    /// Remove a body from the set and forget its collisions.
    pub fn remove_body(&mut self, bodies: &mut BodySet, handle: BodyHandle) -> Option<Body> {
        let body = bodies.remove(handle)?;
        self.hitlist.recompute_for(bodies, handle);
        Some(body)
    }

    /// Re-derive the collisions of a body whose shape, transform or velocity
    /// was changed.
    pub fn update_body(&mut self, bodies: &BodySet, handle: BodyHandle) -> Result<()> {
        bodies.try_get(handle)?;
        self.hitlist.recompute_for(bodies, handle);
        Ok(())
    }

    /// Like [`PhysicsEngine2D::update_body`], but a removed body is purged
    /// instead of reported.
    pub fn recompute_for(&mut self, bodies: &BodySet, handle: BodyHandle) {
        self.hitlist.recompute_for(bodies, handle);
    }

    /// Discrete overlap test between the bounds of two bodies.
    pub fn overlapping(&self, bodies: &BodySet, a: BodyHandle, b: BodyHandle) -> bool {
        match (bodies.world_bounds(a), bodies.world_bounds(b)) {
            (Some(a), Some(b)) => a.overlaps(&b),
            _ => false,
        }
    }

    /// Advance the simulation by `delta_time` seconds, resolving every
    /// collision that happens within it in chronological order.
    ///
    /// Returns the number of resolved collisions.
    pub fn process(&mut self, bodies: &mut BodySet, delta_time: f32) -> usize {
        self.contacts.clear();
        if !delta_time.is_finite() || delta_time < 0.0 {
            warn!(delta_time, "ignoring invalid time step");
            return 0;
        }

        self.sync(bodies);

        let mut remaining = delta_time;
        let mut resolved = 0usize;
        let mut capped = false;

        while let Some(next) = self.hitlist.peek().copied() {
            if next.time > remaining {
                break;
            }
            if resolved >= self.config.max_events_per_process {
                warn!(
                    limit = self.config.max_events_per_process,
                    remaining, "event limit reached, holding bodies at their next contact"
                );
                capped = true;
                break;
            }
            let Some(hit) = self.hitlist.pop() else {
                break;
            };
            if !bodies.contains(hit.entity1) || !bodies.contains(hit.entity2) {
                warn!(entity1 = ?hit.entity1, entity2 = ?hit.entity2, "dropping event of removed body");
                self.hitlist.purge_dead(bodies);
                continue;
            }

            let time = hit.time.max(0.0);
            remaining -= time;
            self.resolve_hit(bodies, &hit);
            resolved += 1;
            self.contacts.push(ContactEvent {
                entity1: hit.entity1,
                entity2: hit.entity2,
                normal: hit.normal,
                at: delta_time - remaining,
                dynamic: hit.dynamic,
            });

            // Callbacks may have removed or edited bodies.
            self.hitlist.purge_dead(bodies);
            let mut changed: Vec<BodyHandle> =
                hit.moving().filter(|h| bodies.contains(*h)).collect();
            changed.extend(bodies.take_touched());
            self.hitlist.recompute_all(bodies, changed);
        }

        if capped {
            // Unresolved contacts stay pending for the next frame.
            let hitlist = &self.hitlist;
            rigid_body::advance_positions_until(bodies, remaining, |h| hitlist.earliest(h));
            self.hitlist.construct(bodies);
        } else {
            rigid_body::advance_positions(bodies, remaining);
            self.hitlist.rebase(remaining);
        }

        if resolved > 0 {
            debug!(resolved, delta_time, "frame processed");
        }
        resolved
    }

    /// Carry out one collision: move everything to the contact time, apply
    /// the response and run the callbacks.
    pub fn resolve_hit(&mut self, bodies: &mut BodySet, hit: &Hit) {
        let time = hit.time.max(0.0);
        rigid_body::advance_positions(bodies, time);
        solver::apply_response(bodies, hit);
        self.hitlist.rebase(time);
        for handle in hit.moving() {
            self.hitlist.reset_earliest(handle);
        }
        trace!(
            entity1 = ?hit.entity1,
            entity2 = ?hit.entity2,
            time = hit.time,
            normal = ?hit.normal,
            "resolved hit"
        );
        solver::notify(bodies, hit);
    }

    /// Pick up bodies inserted, edited or removed outside the engine.
    fn sync(&mut self, bodies: &mut BodySet) {
        self.hitlist.purge_dead(bodies);
        let touched = bodies.take_touched();
        if !touched.is_empty() {
            trace!(count = touched.len(), "syncing changed bodies");
            self.hitlist.recompute_all(bodies, touched);
        }
    }
}
