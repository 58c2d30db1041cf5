//! Persistence collaborators
//!
//! The engine treats storage as the durable source of truth and keeps an
//! in-memory cache rebuilt at startup. Concrete backends live in other
//! crates (`haven-db`, `haven-script`); the in-memory versions here serve
//! tests and storage-less deployments.

use crate::error::Result;
use crate::identity::PlayerId;
use crate::zone::SpawnZone;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A persisted player restriction row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRestriction {
    pub restriction: String,
    pub expire_at_millis: i64,
    pub is_permanent: bool,
}

impl StoredRestriction {
    pub fn is_expired(&self, now_millis: i64) -> bool {
        !self.is_permanent && now_millis >= self.expire_at_millis
    }
}

/// Durable store for per-player restrictions
pub trait RestrictionStore: Send + Sync {
    fn load_player_restrictions(&self) -> Result<HashMap<PlayerId, Vec<StoredRestriction>>>;

    /// Insert or replace the row for (player, restriction)
    fn save_player_restriction(
        &self,
        player: PlayerId,
        restriction: &str,
        expire_at_millis: i64,
        is_permanent: bool,
    ) -> Result<()>;

    /// Delete the row for (player, restriction) if present
    fn remove_player_restriction(&self, player: PlayerId, restriction: &str) -> Result<()>;

    /// Purge expired rows, returning how many were removed
    fn cleanup_expired(&self, now_millis: i64) -> Result<usize>;
}

/// Durable store for the full zone set
pub trait ZoneStore: Send + Sync {
    fn load(&self) -> Result<Vec<SpawnZone>>;

    /// Replace the stored set with `zones`
    fn save(&self, zones: &[&SpawnZone]) -> Result<()>;
}

/// Restriction rows kept in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: RwLock<HashMap<PlayerId, Vec<StoredRestriction>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows across all players
    pub fn row_count(&self) -> usize {
        self.rows.read().values().map(Vec::len).sum()
    }
}

impl RestrictionStore for MemoryStore {
    fn load_player_restrictions(&self) -> Result<HashMap<PlayerId, Vec<StoredRestriction>>> {
        Ok(self.rows.read().clone())
    }

    fn save_player_restriction(
        &self,
        player: PlayerId,
        restriction: &str,
        expire_at_millis: i64,
        is_permanent: bool,
    ) -> Result<()> {
        let mut rows = self.rows.write();
        let bucket = rows.entry(player).or_default();
        bucket.retain(|r| !r.restriction.eq_ignore_ascii_case(restriction));
        bucket.push(StoredRestriction {
            restriction: restriction.to_string(),
            expire_at_millis,
            is_permanent,
        });
        Ok(())
    }

    fn remove_player_restriction(&self, player: PlayerId, restriction: &str) -> Result<()> {
        let mut rows = self.rows.write();
        if let Some(bucket) = rows.get_mut(&player) {
            bucket.retain(|r| !r.restriction.eq_ignore_ascii_case(restriction));
            if bucket.is_empty() {
                rows.remove(&player);
            }
        }
        Ok(())
    }

    fn cleanup_expired(&self, now_millis: i64) -> Result<usize> {
        let mut rows = self.rows.write();
        let mut removed = 0;
        rows.retain(|_, bucket| {
            let before = bucket.len();
            bucket.retain(|r| !r.is_expired(now_millis));
            removed += before - bucket.len();
            !bucket.is_empty()
        });
        Ok(removed)
    }
}

/// Zone set kept in process memory
#[derive(Debug, Default)]
pub struct MemoryZoneStore {
    zones: Mutex<Vec<SpawnZone>>,
}

impl MemoryZoneStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store, e.g. before handing it to a registry
    pub fn with_zones(zones: Vec<SpawnZone>) -> Self {
        Self {
            zones: Mutex::new(zones),
        }
    }

    /// Copy of what was last saved
    pub fn stored(&self) -> Vec<SpawnZone> {
        self.zones.lock().clone()
    }
}

impl ZoneStore for MemoryZoneStore {
    fn load(&self) -> Result<Vec<SpawnZone>> {
        Ok(self.zones.lock().clone())
    }

    fn save(&self, zones: &[&SpawnZone]) -> Result<()> {
        *self.zones.lock() = zones.iter().map(|z| (*z).clone()).collect();
        Ok(())
    }
}
