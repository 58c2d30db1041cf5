//! Per-player restriction instances

use crate::identity::PlayerId;
use crate::time::{MILLIS_PER_SECOND, PERMANENT};
use serde::{Deserialize, Serialize};

/// When a player restriction stops applying
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expiry {
    Permanent,
    /// Epoch milliseconds
    At(i64),
}

impl Expiry {
    /// Expiry for a duration starting at `now`; `-1` is permanent
    pub fn after(now_millis: i64, duration_secs: i64) -> Self {
        if duration_secs == PERMANENT {
            Expiry::Permanent
        } else {
            Expiry::At(now_millis.saturating_add(duration_secs.saturating_mul(MILLIS_PER_SECOND)))
        }
    }

    /// Rebuild from the storage representation
    pub fn from_stored(expire_at_millis: i64, is_permanent: bool) -> Self {
        if is_permanent {
            Expiry::Permanent
        } else {
            Expiry::At(expire_at_millis)
        }
    }

    /// Storage representation: (expire_at_millis, is_permanent)
    pub fn to_stored(self) -> (i64, bool) {
        match self {
            Expiry::Permanent => (i64::MAX, true),
            Expiry::At(at) => (at, false),
        }
    }

    pub fn is_permanent(&self) -> bool {
        matches!(self, Expiry::Permanent)
    }

    pub fn is_expired(&self, now_millis: i64) -> bool {
        match self {
            Expiry::Permanent => false,
            Expiry::At(at) => now_millis >= *at,
        }
    }

    /// Whole seconds left; `-1` permanent, `0` once expired
    pub fn remaining_secs(&self, now_millis: i64) -> i64 {
        match self {
            Expiry::Permanent => PERMANENT,
            Expiry::At(at) => ((at - now_millis) / MILLIS_PER_SECOND).max(0),
        }
    }
}

/// A restriction explicitly assigned to one player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRestriction {
    pub player: PlayerId,
    /// Catalog name as assigned
    pub restriction: String,
    pub expiry: Expiry,
}

impl PlayerRestriction {
    pub fn new(player: PlayerId, restriction: impl Into<String>, expiry: Expiry) -> Self {
        Self {
            player,
            restriction: restriction.into(),
            expiry,
        }
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.restriction.eq_ignore_ascii_case(name)
    }

    pub fn is_expired(&self, now_millis: i64) -> bool {
        self.expiry.is_expired(now_millis)
    }

    pub fn remaining_secs(&self, now_millis: i64) -> i64 {
        self.expiry.remaining_secs(now_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timed_expiry_boundary() {
        let expiry = Expiry::after(1_000, 10);
        assert_eq!(expiry, Expiry::At(11_000));
        assert!(!expiry.is_expired(10_999));
        assert!(expiry.is_expired(11_000));
        assert_eq!(expiry.remaining_secs(1_000), 10);
        assert_eq!(expiry.remaining_secs(20_000), 0);
    }

    #[test]
    fn test_permanent_never_expires() {
        let expiry = Expiry::after(0, PERMANENT);
        assert!(expiry.is_permanent());
        assert!(!expiry.is_expired(i64::MAX));
        assert_eq!(expiry.remaining_secs(0), PERMANENT);
        assert_eq!(Expiry::from_stored(0, true), Expiry::Permanent);
        assert_eq!(expiry.to_stored(), (i64::MAX, true));
    }
}
