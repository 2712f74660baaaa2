//! Generation-checked body storage shared between the engine and game logic.

use slotmap::SlotMap;

use crate::components::Body;
use crate::error::{PhysicsError, Result};
use crate::physics::collider::{Aabb2D, WorldShape};

slotmap::new_key_type! {
    /// Stable identity of a body. A handle of a removed body is never
    /// reused, so liveness can be checked in O(1).
    pub struct BodyHandle;
}

/// Arena of bodies.
///
/// Mutable access through [`BodySet::get_mut`] and insertion are recorded so
/// the engine can re-derive collisions for bodies changed behind its back
/// (for example from a collision callback).
#[derive(Debug, Default)]
pub struct BodySet {
    bodies: SlotMap<BodyHandle, Body>,
    touched: Vec<BodyHandle>,
}

impl BodySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store a body.
    pub fn insert(&mut self, body: Body) -> Result<BodyHandle> {
        body.validate()?;
        let handle = self.bodies.insert(body);
        self.touched.push(handle);
        Ok(handle)
    }

    pub fn remove(&mut self, handle: BodyHandle) -> Option<Body> {
        self.bodies.remove(handle)
    }

    #[inline]
    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains_key(handle)
    }

    #[inline]
    pub fn get(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle)
    }

    pub fn try_get(&self, handle: BodyHandle) -> Result<&Body> {
        self.bodies
            .get(handle)
            .ok_or(PhysicsError::StaleHandle(handle))
    }

    /// Mutable access; the body is marked as changed.
    pub fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        let body = self.bodies.get_mut(handle)?;
        self.touched.push(handle);
        Some(body)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, &Body)> {
        self.bodies.iter()
    }

    /// Handles of all moving bodies, in storage order.
    pub fn dynamic_handles(&self) -> Vec<BodyHandle> {
        self.bodies
            .iter()
            .filter(|(_, b)| b.is_dynamic())
            .map(|(h, _)| h)
            .collect()
    }

    /// Handles of all static bodies, in storage order.
    pub fn static_handles(&self) -> Vec<BodyHandle> {
        self.bodies
            .iter()
            .filter(|(_, b)| !b.is_dynamic())
            .map(|(h, _)| h)
            .collect()
    }

    pub fn is_dynamic(&self, handle: BodyHandle) -> bool {
        self.bodies.get(handle).is_some_and(Body::is_dynamic)
    }

    /// World-space shape of a body.
    pub fn world_shape(&self, handle: BodyHandle) -> Option<WorldShape> {
        self.bodies
            .get(handle)
            .map(|b| WorldShape::from_body(&b.transform, &b.shape))
    }

    /// World-space bounding box of a body.
    pub fn world_bounds(&self, handle: BodyHandle) -> Option<Aabb2D> {
        self.world_shape(handle).map(|s| s.aabb())
    }

    pub fn clear(&mut self) {
        self.bodies.clear();
        self.touched.clear();
    }

    /// Mutable access without change tracking, for the engine's own writes.
    pub(crate) fn get_mut_untracked(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(handle)
    }

    pub(crate) fn iter_mut_untracked(&mut self) -> impl Iterator<Item = (BodyHandle, &mut Body)> {
        self.bodies.iter_mut()
    }

    /// Drain the change log, deduplicated, keeping first-seen order.
    pub(crate) fn take_touched(&mut self) -> Vec<BodyHandle> {
        let mut touched = std::mem::take(&mut self.touched);
        let mut seen = slotmap::SecondaryMap::new();
        touched.retain(|h| seen.insert(*h, ()).is_none());
        touched
    }
}
