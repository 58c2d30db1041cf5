//! Player restriction rows.

use haven_core::{PlayerId, StoredRestriction};
use native_db::*;
use native_model::{native_model, Model};
use serde::{Deserialize, Serialize};

/// One restriction held by one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[native_model(id = 1, version = 1)]
#[native_db]
pub struct StoredPlayerRestriction {
    /// Primary key - `"<player>:<restriction, lower-cased>"`.
    #[primary_key]
    pub id: String,
    /// Player UUID in hyphenated form.
    #[secondary_key]
    pub player: String,
    /// Restriction name as assigned.
    pub restriction: String,
    /// Epoch millis; `i64::MAX` for permanent rows.
    pub expire_at_millis: i64,
    pub is_permanent: bool,
}

impl StoredPlayerRestriction {
    pub fn new(
        player: PlayerId,
        restriction: &str,
        expire_at_millis: i64,
        is_permanent: bool,
    ) -> Self {
        Self {
            id: Self::key(player, restriction),
            player: player.to_string(),
            restriction: restriction.to_string(),
            expire_at_millis,
            is_permanent,
        }
    }

    /// Primary key for a (player, restriction) pair.
    pub fn key(player: PlayerId, restriction: &str) -> String {
        format!("{player}:{}", restriction.to_lowercase())
    }

    pub fn is_expired(&self, now_millis: i64) -> bool {
        !self.is_permanent && now_millis >= self.expire_at_millis
    }

    /// Convert to the engine's row type.
    pub fn to_stored(&self) -> StoredRestriction {
        StoredRestriction {
            restriction: self.restriction.clone(),
            expire_at_millis: self.expire_at_millis,
            is_permanent: self.is_permanent,
        }
    }
}
