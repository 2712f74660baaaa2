//! Event scheduler: a min-time queue of predicted collisions plus the
//! earliest known collision time of every moving body.
//!
//! # Invariant
//!
//! Every live moving body has at most one queued event, and that event is its
//! earliest collision among partners that are not committed to an even
//! earlier one. A candidate `(a, b)` with `b` moving is only accepted while it
//! beats `earliest[b]` by more than `time_epsilon`; when it does, `b` drops
//! its old event and the body that event was shared with gets recomputed.
//!
//! Any change to a body's trajectory invalidates its events. Recomputations
//! cascade through an explicit worklist rather than recursion.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use slotmap::SecondaryMap;
use tracing::{debug, trace, warn};

use crate::bodies::{BodyHandle, BodySet};

use super::collider::WorldShape;
use super::contact::{Hit, NEVER};
use super::sweep::sweep;

/// Heap entry ordered so that the earliest hit is on top.
#[derive(Debug, Clone, Copy)]
struct Queued(Hit);

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        other.0.chronological(&self.0)
    }
}

/// The queue of pending collisions.
#[derive(Debug, Clone)]
pub struct Hitlist {
    heap: BinaryHeap<Queued>,
    earliest: SecondaryMap<BodyHandle, f32>,
    time_epsilon: f32,
    max_cascade: usize,
}

impl Default for Hitlist {
    fn default() -> Self {
        Self::new(1e-6, 100_000)
    }
}

impl Hitlist {
    pub fn new(time_epsilon: f32, max_cascade: usize) -> Self {
        Self {
            heap: BinaryHeap::new(),
            earliest: SecondaryMap::new(),
            time_epsilon,
            max_cascade,
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.earliest.clear();
    }

    /// The nearest pending collision.
    pub fn peek(&self) -> Option<&Hit> {
        self.heap.peek().map(|q| &q.0)
    }

    pub fn pop(&mut self) -> Option<Hit> {
        self.heap.pop().map(|q| q.0)
    }

    /// Queue a hit. Returns `false` if the same pair, in either order, is
    /// already queued.
    pub fn push(&mut self, hit: Hit) -> bool {
        let duplicate = self.heap.iter().any(|q| {
            (q.0.entity1 == hit.entity2 && q.0.entity2 == hit.entity1)
                || (q.0.entity1 == hit.entity1 && q.0.entity2 == hit.entity2)
        });
        if duplicate {
            return false;
        }
        self.heap.push(Queued(hit));
        true
    }

    /// Earliest known collision time of a moving body, [`NEVER`] if unknown.
    pub fn earliest(&self, handle: BodyHandle) -> f32 {
        self.earliest.get(handle).copied().unwrap_or(NEVER)
    }

    /// Mark a body's next collision as unknown.
    pub fn reset_earliest(&mut self, handle: BodyHandle) {
        self.earliest.insert(handle, NEVER);
    }

    /// The queued event involving `handle`, if any.
    pub fn event_of(&self, handle: BodyHandle) -> Option<Hit> {
        self.heap
            .iter()
            .map(|q| q.0)
            .filter(|h| h.involves(handle))
            .min_by(Hit::chronological)
    }

    /// All queued events, earliest first.
    pub fn snapshot(&self) -> Vec<Hit> {
        let mut hits: Vec<Hit> = self.heap.iter().map(|q| q.0).collect();
        hits.sort_by(Hit::chronological);
        hits
    }

    /// Move "now" forward by `elapsed` seconds.
    pub fn rebase(&mut self, elapsed: f32) {
        if elapsed == 0.0 {
            return;
        }
        let mut hits = std::mem::take(&mut self.heap).into_vec();
        for q in &mut hits {
            q.0.time -= elapsed;
        }
        self.heap = BinaryHeap::from(hits);
        for (_, time) in self.earliest.iter_mut() {
            *time -= elapsed;
        }
    }

    /// Remove and return the hits matching `pred`, earliest first.
    fn remove_where(&mut self, mut pred: impl FnMut(&Hit) -> bool) -> Vec<Hit> {
        let mut removed = Vec::new();
        self.heap.retain(|q| {
            if pred(&q.0) {
                removed.push(q.0);
                false
            } else {
                true
            }
        });
        removed.sort_by(Hit::chronological);
        removed
    }

    fn remove_involving(&mut self, handle: BodyHandle) -> Vec<Hit> {
        self.remove_where(|h| h.involves(handle))
    }

    /// Cold rebuild from every moving/moving and moving/static pair.
    ///
    /// Candidates are accepted in time order while none of their moving
    /// participants is already committed, which leaves each body with its
    /// earliest collision that no partner has claimed first.
    pub fn construct(&mut self, bodies: &BodySet) {
        self.clear();

        let movers: Vec<(BodyHandle, WorldShape, glam::Vec2)> = bodies
            .dynamic_handles()
            .into_iter()
            .filter_map(|h| {
                let b = bodies.get(h)?;
                Some((
                    h,
                    WorldShape::from_body(&b.transform, &b.shape),
                    b.velocity_or_zero(),
                ))
            })
            .collect();
        let statics: Vec<(BodyHandle, WorldShape)> = bodies
            .static_handles()
            .into_iter()
            .filter_map(|h| bodies.world_shape(h).map(|shape| (h, shape)))
            .collect();

        let mut candidates = Vec::new();
        for (i, (a, shape_a, va)) in movers.iter().enumerate() {
            self.earliest.insert(*a, NEVER);
            for (b, shape_b, vb) in &movers[i + 1..] {
                if let Some(s) = sweep(shape_a, *va, shape_b, *vb) {
                    candidates.push(Hit {
                        entity1: *a,
                        entity2: *b,
                        time: s.time,
                        normal: s.normal,
                        dynamic: true,
                    });
                }
            }
            for (s_handle, shape_s) in &statics {
                if let Some(s) = sweep(shape_a, *va, shape_s, glam::Vec2::ZERO) {
                    candidates.push(Hit {
                        entity1: *a,
                        entity2: *s_handle,
                        time: s.time,
                        normal: s.normal,
                        dynamic: false,
                    });
                }
            }
        }

        candidates.sort_by(Hit::chronological);
        let considered = candidates.len();
        for hit in candidates {
            let free = hit.moving().all(|h| self.earliest(h) == NEVER);
            if free {
                for h in hit.moving() {
                    self.earliest.insert(h, hit.time);
                }
                self.push(hit);
            }
        }

        debug!(
            movers = movers.len(),
            statics = statics.len(),
            candidates = considered,
            queued = self.heap.len(),
            "hitlist constructed"
        );
    }

    /// Re-derive the collisions of `handle` after its shape, transform or
    /// velocity changed, or after it was removed from `bodies`.
    pub fn recompute_for(&mut self, bodies: &BodySet, handle: BodyHandle) {
        self.recompute_all(bodies, [handle]);
    }

    /// [`Hitlist::recompute_for`] for several bodies, sharing one cascade.
    pub fn recompute_all(
        &mut self,
        bodies: &BodySet,
        handles: impl IntoIterator<Item = BodyHandle>,
    ) {
        let mut work = Vec::new();
        for handle in handles {
            self.invalidate(bodies, handle, &mut work);
        }
        self.drain(bodies, work);
    }

    /// Drop events whose participants are no longer alive and recompute the
    /// survivors they were shared with.
    pub fn purge_dead(&mut self, bodies: &BodySet) {
        let removed =
            self.remove_where(|h| !bodies.contains(h.entity1) || !bodies.contains(h.entity2));
        let mut work = Vec::new();
        for hit in &removed {
            for h in [hit.entity1, hit.entity2] {
                if bodies.contains(h) {
                    self.orphan(bodies, h, &mut work);
                }
            }
        }
        self.earliest.retain(|h, _| bodies.contains(h));
        if !removed.is_empty() {
            trace!(removed = removed.len(), "purged events of removed bodies");
        }
        self.drain(bodies, work);
    }

    /// Forget everything predicted for `handle`.
    fn invalidate(&mut self, bodies: &BodySet, handle: BodyHandle, work: &mut Vec<BodyHandle>) {
        for hit in self.remove_involving(handle) {
            if let Some(partner) = hit.partner_of(handle) {
                self.orphan(bodies, partner, work);
            }
        }

        let Some(body) = bodies.get(handle) else {
            self.earliest.remove(handle);
            return;
        };

        if body.is_dynamic() {
            self.earliest.insert(handle, NEVER);
            work.push(handle);
            return;
        }

        // A static body never drives an event; wake every mover that now
        // reaches it before its current commitment.
        let shape = WorldShape::from_body(&body.transform, &body.shape);
        for (other, ob) in bodies.iter() {
            let Some(velocity) = ob.velocity else {
                continue;
            };
            let other_shape = WorldShape::from_body(&ob.transform, &ob.shape);
            if let Some(s) = sweep(&other_shape, velocity, &shape, glam::Vec2::ZERO) {
                if s.time < self.earliest(other) - self.time_epsilon {
                    work.push(other);
                }
            }
        }
    }

    /// A body lost its queued event; its next collision is unknown again.
    fn orphan(&mut self, bodies: &BodySet, handle: BodyHandle, work: &mut Vec<BodyHandle>) {
        if bodies.is_dynamic(handle) {
            self.earliest.insert(handle, NEVER);
            work.push(handle);
        }
    }

    fn drain(&mut self, bodies: &BodySet, mut work: Vec<BodyHandle>) {
        let mut steps = 0usize;
        while let Some(handle) = work.pop() {
            if steps >= self.max_cascade {
                warn!(
                    pending = work.len() + 1,
                    limit = self.max_cascade,
                    "recompute cascade limit reached"
                );
                break;
            }
            steps += 1;
            self.improve(bodies, handle, &mut work);
        }
    }

    /// Search for a collision of `handle` earlier than its current one and
    /// commit to it.
    fn improve(&mut self, bodies: &BodySet, handle: BodyHandle, work: &mut Vec<BodyHandle>) {
        let Some(body) = bodies.get(handle) else {
            self.invalidate(bodies, handle, work);
            return;
        };
        let Some(velocity) = body.velocity else {
            return;
        };

        let current = self.event_of(handle);
        let limit = current.map_or(NEVER, |h| h.time);
        let shape = WorldShape::from_body(&body.transform, &body.shape);

        let mut best: Option<Hit> = None;
        for (other, ob) in bodies.iter() {
            if other == handle || current.is_some_and(|h| h.involves(other)) {
                continue;
            }
            let other_shape = WorldShape::from_body(&ob.transform, &ob.shape);
            let Some(s) = sweep(&shape, velocity, &other_shape, ob.velocity_or_zero()) else {
                continue;
            };
            if s.time >= limit - self.time_epsilon {
                continue;
            }
            if ob.is_dynamic() && s.time >= self.earliest(other) - self.time_epsilon {
                continue;
            }
            if best.map_or(true, |b| s.time < b.time) {
                best = Some(Hit {
                    entity1: handle,
                    entity2: other,
                    time: s.time,
                    normal: s.normal,
                    dynamic: ob.is_dynamic(),
                });
            }
        }

        let Some(best) = best else {
            self.earliest.insert(handle, limit);
            return;
        };

        if let Some(old) = current {
            self.remove_where(|h| h.entity1 == old.entity1 && h.entity2 == old.entity2);
            if let Some(partner) = old.partner_of(handle) {
                self.orphan(bodies, partner, work);
            }
        }

        if best.dynamic {
            // The partner's previous commitment was later; drop it.
            for hit in self.remove_involving(best.entity2) {
                if let Some(third) = hit.partner_of(best.entity2) {
                    if third != handle {
                        self.orphan(bodies, third, work);
                    }
                }
            }
            self.earliest.insert(best.entity2, best.time);
            // The partner may have an even earlier option of its own.
            work.push(best.entity2);
        }

        self.earliest.insert(handle, best.time);
        self.push(best);
        trace!(
            entity1 = ?best.entity1,
            entity2 = ?best.entity2,
            time = best.time,
            dynamic = best.dynamic,
            "scheduled hit"
        );
    }
}
