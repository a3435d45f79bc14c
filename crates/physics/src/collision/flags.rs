//! Collider content bits and the query masks built from them.
//!
//! A query only sees colliders whose contents share at least one bit with its
//! mask.

use serde::{Deserialize, Serialize};

/// Bitset describing what a collider is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ContentFlags(pub u32);

impl ContentFlags {
    pub const EMPTY: Self = Self(0);

    /// Level geometry that never moves.
    pub const SOLID: Self = Self(1 << 0);

    /// Props: pushed, stood on, grabbed and leased.
    pub const DYNAMIC: Self = Self(1 << 1);

    pub const PLAYER_BODY: Self = Self(1 << 2);

    /// Seen by overlaps only; movement passes through.
    pub const TRIGGER: Self = Self(1 << 3);

    /// What ground probes and the suspension ray may land on.
    pub const MASK_GROUND: Self = Self(Self::SOLID.0 | Self::DYNAMIC.0);

    /// What stops a sliding body.
    pub const MASK_PLAYER_SOLID: Self = Self(Self::SOLID.0 | Self::DYNAMIC.0 | Self::PLAYER_BODY.0);

    /// Grab rays and contact proxies.
    pub const MASK_INTERACT: Self = Self(Self::DYNAMIC.0);

    /// All bits of `other` are set.
    #[inline]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// At least one bit of `other` is set.
    #[inline]
    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

impl std::ops::BitOr for ContentFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitAnd for ContentFlags {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masks() {
        assert!(ContentFlags::MASK_GROUND.intersects(ContentFlags::DYNAMIC));
        assert!(!ContentFlags::MASK_GROUND.intersects(ContentFlags::PLAYER_BODY));
        assert!(ContentFlags::MASK_PLAYER_SOLID.contains(ContentFlags::SOLID));
        assert!(!ContentFlags::MASK_INTERACT.intersects(ContentFlags::TRIGGER));
    }

    #[test]
    fn test_set_operations() {
        let flags = ContentFlags::SOLID | ContentFlags::TRIGGER;
        assert!(flags.contains(ContentFlags::TRIGGER));
        assert_eq!(flags.difference(ContentFlags::TRIGGER), ContentFlags::SOLID);
        assert_eq!(flags & ContentFlags::SOLID, ContentFlags::SOLID);
        assert_eq!(ContentFlags::EMPTY | ContentFlags::DYNAMIC, ContentFlags::DYNAMIC);
    }
}
