//! Database store wrapper.

use crate::error::{Error, Result};
use crate::models::*;
use haven_core::{PlayerId, RestrictionStore, StoredRestriction};
use native_db::*;
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

// Static models for the database
static MODELS: LazyLock<Models> = LazyLock::new(|| {
    let mut models = Models::new();
    models
        .define::<StoredPlayerRestriction>()
        .expect("StoredPlayerRestriction model definition");
    models
});

/// Database store for player restrictions.
pub struct Store {
    pub(crate) db: Database<'static>,
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Builder::new()
            .create(&MODELS, path.as_ref())
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(Self { db })
    }

    /// Create an in-memory database.
    pub fn in_memory() -> Result<Self> {
        let db = Builder::new()
            .create_in_memory(&MODELS)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(Self { db })
    }

    /// Insert or replace a restriction row.
    pub fn save_restriction(&self, row: StoredPlayerRestriction) -> Result<()> {
        let rw = self.db.rw_transaction()?;
        rw.upsert(row)?;
        rw.commit()?;
        Ok(())
    }

    /// Load one row.
    pub fn load_restriction(
        &self,
        player: PlayerId,
        restriction: &str,
    ) -> Result<Option<StoredPlayerRestriction>> {
        let r = self.db.r_transaction()?;
        let stored: Option<StoredPlayerRestriction> = r
            .get()
            .primary(StoredPlayerRestriction::key(player, restriction))?;
        Ok(stored)
    }

    /// Delete one row. Returns whether it existed.
    pub fn delete_restriction(&self, player: PlayerId, restriction: &str) -> Result<bool> {
        let rw = self.db.rw_transaction()?;
        let stored: Option<StoredPlayerRestriction> = rw
            .get()
            .primary(StoredPlayerRestriction::key(player, restriction))?;
        let existed = stored.is_some();
        if let Some(s) = stored {
            rw.remove(s)?;
        }
        rw.commit()?;
        Ok(existed)
    }

    /// Delete every expired row. Returns how many were removed.
    pub fn purge_expired(&self, now_millis: i64) -> Result<usize> {
        let expired: Vec<StoredPlayerRestriction> = self
            .all_restrictions()?
            .into_iter()
            .filter(|row| row.is_expired(now_millis))
            .collect();
        if expired.is_empty() {
            return Ok(0);
        }

        let count = expired.len();
        let rw = self.db.rw_transaction()?;
        for row in expired {
            rw.remove(row)?;
        }
        rw.commit()?;
        Ok(count)
    }
}

impl RestrictionStore for Store {
    fn load_player_restrictions(
        &self,
    ) -> haven_core::Result<HashMap<PlayerId, Vec<StoredRestriction>>> {
        let mut players: HashMap<PlayerId, Vec<StoredRestriction>> = HashMap::new();
        for row in self.all_restrictions()? {
            match row.player.parse::<PlayerId>() {
                Ok(player) => players.entry(player).or_default().push(row.to_stored()),
                Err(e) => log::warn!("Skipping restriction row {}: {e}", row.id),
            }
        }
        Ok(players)
    }

    fn save_player_restriction(
        &self,
        player: PlayerId,
        restriction: &str,
        expire_at_millis: i64,
        is_permanent: bool,
    ) -> haven_core::Result<()> {
        self.save_restriction(StoredPlayerRestriction::new(
            player,
            restriction,
            expire_at_millis,
            is_permanent,
        ))?;
        Ok(())
    }

    fn remove_player_restriction(&self, player: PlayerId, restriction: &str) -> haven_core::Result<()> {
        self.delete_restriction(player, restriction)?;
        Ok(())
    }

    fn cleanup_expired(&self, now_millis: i64) -> haven_core::Result<usize> {
        let removed = self.purge_expired(now_millis)?;
        if removed > 0 {
            log::debug!("Purged {removed} expired restriction rows");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haven_core::{
        Catalog, ManualClock, PlaytimeSource, RestrictionAction, RestrictionDef, RestrictionKind,
        RestrictionManager, SessionPlaytime, PERMANENT,
    };
    use std::sync::Arc;

    #[test]
    fn test_upsert_replaces_row() {
        let store = Store::in_memory().unwrap();
        let player = PlayerId::random();
        store.save_player_restriction(player, "muted", 5_000, false).unwrap();
        store.save_player_restriction(player, "MUTED", 9_000, false).unwrap();

        let rows = store.restrictions_for_player(player).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].expire_at_millis, 9_000);
    }

    #[test]
    fn test_delete_restriction() {
        let store = Store::in_memory().unwrap();
        let player = PlayerId::random();
        store.save_player_restriction(player, "muted", 5_000, false).unwrap();
        assert!(store.delete_restriction(player, "Muted").unwrap());
        assert!(!store.delete_restriction(player, "muted").unwrap());
        assert!(store.load_restriction(player, "muted").unwrap().is_none());
    }

    #[test]
    fn test_purge_expired_keeps_permanent() {
        let store = Store::in_memory().unwrap();
        let a = PlayerId::random();
        let b = PlayerId::random();
        store.save_player_restriction(a, "muted", 1_000, false).unwrap();
        store.save_player_restriction(a, "no_tnt", i64::MAX, true).unwrap();
        store.save_player_restriction(b, "muted", 60_000, false).unwrap();

        assert_eq!(store.cleanup_expired(2_000).unwrap(), 1);
        assert_eq!(store.cleanup_expired(2_000).unwrap(), 0);
        assert_eq!(store.count_restrictions().unwrap(), 2);
    }

    #[test]
    fn test_load_groups_by_player() {
        let store = Store::in_memory().unwrap();
        let a = PlayerId::random();
        let b = PlayerId::random();
        store.save_player_restriction(a, "muted", 1_000, false).unwrap();
        store.save_player_restriction(a, "no_tnt", i64::MAX, true).unwrap();
        store.save_player_restriction(b, "muted", 1_000, false).unwrap();

        let loaded = store.load_player_restrictions().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[&a].len(), 2);
        assert!(loaded[&a].iter().any(|r| r.is_permanent));
    }

    #[test]
    fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("restrictions.db");
        let player = PlayerId::random();
        {
            let store = Store::open(&path).unwrap();
            store.save_player_restriction(player, "muted", i64::MAX, true).unwrap();
        }
        let store = Store::open(&path).unwrap();
        let row = store.load_restriction(player, "muted").unwrap().unwrap();
        assert!(row.is_permanent);
    }

    #[test]
    fn test_manager_over_database() {
        let store = Arc::new(Store::in_memory().unwrap());
        let catalog = Catalog::from_defs([RestrictionDef::new("muted", RestrictionKind::Command)
            .unwrap()
            .with_action(RestrictionAction::Execute)
            .with_target("msg")
            .unwrap()])
        .unwrap();
        let playtime: Arc<dyn PlaytimeSource> = Arc::new(SessionPlaytime::new());
        let clock = Arc::new(ManualClock::at(0));
        let player = PlayerId::random();

        let manager = RestrictionManager::new(catalog.clone(), store.clone(), playtime.clone(), clock.clone());
        manager.assign(player, "muted", PERMANENT).unwrap();

        let restarted = RestrictionManager::new(catalog, store.clone(), playtime, clock);
        assert_eq!(restarted.load().loaded, 1);
        assert!(restarted.is_restricted(player, "muted"));
        assert_eq!(store.count_restrictions().unwrap(), 1);
    }
}
