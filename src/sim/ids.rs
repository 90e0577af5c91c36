//! Ball identity

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::consts::FAKE_BALL_ID;
use crate::error::{PhysicsError, Result};

/// Unique ball identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BallId(pub u32);

impl BallId {
    /// Id shared by all synthetic collision proxies
    pub const FAKE: BallId = BallId(FAKE_BALL_ID);

    pub fn is_fake(self) -> bool {
        self == Self::FAKE
    }
}

impl std::fmt::Display for BallId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic id allocator owned by a world. Tracks live ids so overrides and
/// counter ids never collide.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next_id: u32,
    live: HashSet<u32>,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            live: HashSet::new(),
        }
    }

    /// Allocate the next free id, or claim an explicit override (reserved/test
    /// ids). The fake-ball id and ids already live are refused.
    pub fn allocate(&mut self, override_id: Option<u32>) -> Result<BallId> {
        if let Some(id) = override_id {
            if id == FAKE_BALL_ID || !self.live.insert(id) {
                return Err(PhysicsError::IdUnavailable(id));
            }
            return Ok(BallId(id));
        }
        while self.next_id == FAKE_BALL_ID || self.live.contains(&self.next_id) {
            self.next_id += 1;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.live.insert(id);
        Ok(BallId(id))
    }

    /// Return an id to the pool of claimable overrides. The counter never
    /// goes back.
    pub fn release(&mut self, id: BallId) {
        self.live.remove(&id.0);
    }

    pub fn is_live(&self, id: BallId) -> bool {
        self.live.contains(&id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.allocate(None).unwrap(), BallId(0));
        assert_eq!(ids.allocate(None).unwrap(), BallId(1));
        assert_eq!(ids.allocate(Some(500)).unwrap(), BallId(500));
        assert_eq!(ids.allocate(None).unwrap(), BallId(2));
    }

    #[test]
    fn test_counter_skips_fake_id() {
        let mut ids = IdAllocator {
            next_id: FAKE_BALL_ID,
            ..IdAllocator::new()
        };
        assert_eq!(ids.allocate(None).unwrap(), BallId(FAKE_BALL_ID + 1));
        assert!(BallId::FAKE.is_fake());
    }

    #[test]
    fn test_counter_skips_claimed_override() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.allocate(Some(1)).unwrap(), BallId(1));
        assert_eq!(ids.allocate(None).unwrap(), BallId(0));
        assert_eq!(ids.allocate(None).unwrap(), BallId(2));
    }

    #[test]
    fn test_override_conflicts_rejected() {
        let mut ids = IdAllocator::new();
        let first = ids.allocate(None).unwrap();
        assert!(matches!(
            ids.allocate(Some(first.0)),
            Err(PhysicsError::IdUnavailable(0))
        ));
        assert!(matches!(
            ids.allocate(Some(FAKE_BALL_ID)),
            Err(PhysicsError::IdUnavailable(FAKE_BALL_ID))
        ));

        ids.release(first);
        assert!(!ids.is_live(first));
        assert_eq!(ids.allocate(Some(0)).unwrap(), first);
    }
}
