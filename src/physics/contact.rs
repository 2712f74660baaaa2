//! Collision event records.

use std::cmp::Ordering;

use glam::Vec2;

use crate::bodies::BodyHandle;

/// Time used for "no known collision".
pub const NEVER: f32 = f32::INFINITY;

/// A predicted collision between two bodies.
///
/// `entity1` is always a moving body. `dynamic` is true when `entity2` moves
/// too; otherwise `entity2` is static.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub entity1: BodyHandle,
    pub entity2: BodyHandle,
    /// Seconds from now until contact.
    pub time: f32,
    /// Surface normal at the contact point.
    pub normal: Vec2,
    pub dynamic: bool,
}

impl Hit {
    #[inline]
    pub fn involves(&self, handle: BodyHandle) -> bool {
        self.entity1 == handle || self.entity2 == handle
    }

    /// The participant that is not `handle`.
    #[inline]
    pub fn partner_of(&self, handle: BodyHandle) -> Option<BodyHandle> {
        if self.entity1 == handle {
            Some(self.entity2)
        } else if self.entity2 == handle {
            Some(self.entity1)
        } else {
            None
        }
    }

    /// Moving participants: `entity1`, plus `entity2` when dynamic.
    pub fn moving(&self) -> impl Iterator<Item = BodyHandle> {
        std::iter::once(self.entity1).chain(self.dynamic.then_some(self.entity2))
    }

    /// Chronological order, ties broken by handles so runs are reproducible.
    pub fn chronological(&self, other: &Hit) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then_with(|| self.entity1.cmp(&other.entity1))
            .then_with(|| self.entity2.cmp(&other.entity2))
    }
}

/// A resolved collision, as reported after `process`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactEvent {
    pub entity1: BodyHandle,
    pub entity2: BodyHandle,
    pub normal: Vec2,
    /// Seconds into the `process` call at which the contact happened.
    pub at: f32,
    pub dynamic: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn handles() -> (BodyHandle, BodyHandle, BodyHandle) {
        let mut map: SlotMap<BodyHandle, ()> = SlotMap::with_key();
        (map.insert(()), map.insert(()), map.insert(()))
    }

    #[test]
    fn test_partner_of() {
        let (a, b, c) = handles();
        let hit = Hit {
            entity1: a,
            entity2: b,
            time: 1.0,
            normal: Vec2::X,
            dynamic: true,
        };
        assert_eq!(hit.partner_of(a), Some(b));
        assert_eq!(hit.partner_of(b), Some(a));
        assert_eq!(hit.partner_of(c), None);
        assert!(hit.involves(b));
        assert!(!hit.involves(c));
        assert_eq!(hit.moving().collect::<Vec<_>>(), vec![a, b]);

        let against_wall = Hit { dynamic: false, ..hit };
        assert_eq!(against_wall.moving().collect::<Vec<_>>(), vec![a]);
    }

    #[test]
    fn test_chronological_order() {
        let (a, b, c) = handles();
        let early = Hit {
            entity1: b,
            entity2: c,
            time: 0.5,
            normal: Vec2::Y,
            dynamic: false,
        };
        let late = Hit {
            entity1: a,
            entity2: c,
            time: 2.0,
            normal: Vec2::Y,
            dynamic: false,
        };
        assert_eq!(early.chronological(&late), Ordering::Less);

        let tie = Hit { time: 0.5, ..late };
        assert_eq!(tie.chronological(&early), Ordering::Less);
    }
}
