//! Restriction state: the catalog plus every player's personal instances
//!
//! Reads (`is_restricted`, `remaining_seconds`, `first_denying`) only take
//! read locks over in-memory state and never touch storage, so they are safe
//! on the host's tick loop. Mutations persist first and publish second; a
//! storage failure leaves memory untouched. Writers are serialized so the
//! cache always ends in the same order as storage.

use crate::catalog::Catalog;
use crate::decision::Denial;
use crate::error::{Error, Result};
use crate::identity::PlayerId;
use crate::player::{Expiry, PlayerRestriction};
use crate::playtime::PlaytimeSource;
use crate::restriction::{DefaultWindow, RestrictionAction, RestrictionDef, RestrictionKind};
use crate::store::RestrictionStore;
use crate::time::{Clock, PERMANENT};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

/// Where an active restriction comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestrictionSource {
    /// Assigned to the player by an operator
    Personal,
    /// Applied automatically from the catalog
    Default,
}

/// A restriction currently in force for a player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveRestriction {
    pub name: String,
    /// `-1` when permanent
    pub remaining_secs: i64,
    pub source: RestrictionSource,
}

/// Counts from rebuilding the cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub purged: usize,
}

/// Counts from one expiry sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Expired instances dropped from memory
    pub evicted: usize,
    /// Players left with no instances
    pub emptied_players: usize,
    /// Rows the store reported purging, `None` if the store failed
    pub purged_from_store: Option<usize>,
}

pub struct RestrictionManager {
    catalog: RwLock<Arc<Catalog>>,
    players: RwLock<HashMap<PlayerId, Vec<PlayerRestriction>>>,
    store: Arc<dyn RestrictionStore>,
    playtime: Arc<dyn PlaytimeSource>,
    clock: Arc<dyn Clock>,
    /// Held across persist-then-publish
    writer: Mutex<()>,
}

impl RestrictionManager {
    /// Create a manager with an empty cache; call [`load`](Self::load) to
    /// pull persisted instances.
    pub fn new(
        catalog: Catalog,
        store: Arc<dyn RestrictionStore>,
        playtime: Arc<dyn PlaytimeSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            catalog: RwLock::new(Arc::new(catalog)),
            players: RwLock::new(HashMap::new()),
            store,
            playtime,
            clock,
            writer: Mutex::new(()),
        }
    }

    /// Rebuild the player cache from storage.
    ///
    /// Rows naming restrictions missing from the catalog are removed from
    /// storage. If storage cannot be read the cache starts empty.
    pub fn load(&self) -> LoadReport {
        let _writer = self.writer.lock();
        let rows = match self.store.load_player_restrictions() {
            Ok(rows) => rows,
            Err(e) => {
                log::error!("Failed to load player restrictions, starting empty: {e}");
                self.players.write().clear();
                return LoadReport::default();
            }
        };

        let catalog = self.catalog();
        let mut report = LoadReport::default();
        let mut players: HashMap<PlayerId, Vec<PlayerRestriction>> = HashMap::new();

        for (player, stored) in rows {
            for row in stored {
                let Some(def) = catalog.get(&row.restriction) else {
                    log::warn!(
                        "Purging restriction '{}' of player {player}: not in catalog",
                        row.restriction
                    );
                    if let Err(e) = self.store.remove_player_restriction(player, &row.restriction) {
                        log::error!("Failed to purge '{}' for {player}: {e}", row.restriction);
                    }
                    report.purged += 1;
                    continue;
                };
                let bucket = players.entry(player).or_default();
                bucket.retain(|r| !r.is_named(&def.name));
                bucket.push(PlayerRestriction::new(
                    player,
                    def.name.clone(),
                    Expiry::from_stored(row.expire_at_millis, row.is_permanent),
                ));
                report.loaded += 1;
            }
        }

        *self.players.write() = players;
        log::info!(
            "Loaded {} player restrictions ({} purged)",
            report.loaded,
            report.purged
        );
        report
    }

    /// Current catalog snapshot
    pub fn catalog(&self) -> Arc<Catalog> {
        self.catalog.read().clone()
    }

    pub fn set_catalog(&self, catalog: Catalog) {
        *self.catalog.write() = Arc::new(catalog);
    }

    /// Swap the catalog and rebuild the cache against it
    pub fn reload(&self, catalog: Catalog) -> LoadReport {
        self.set_catalog(catalog);
        self.load()
    }

    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    /// The player's live personal instance of `name`, if any
    pub fn personal(&self, player: PlayerId, name: &str) -> Option<PlayerRestriction> {
        let now = self.now_millis();
        self.players
            .read()
            .get(&player)?
            .iter()
            .find(|r| r.is_named(name) && !r.is_expired(now))
            .cloned()
    }

    pub fn has_personal_override(&self, player: PlayerId, name: &str) -> bool {
        self.personal(player, name).is_some()
    }

    /// Whether the catalog default for `name` applies to the player right now
    pub fn should_apply_default(&self, player: PlayerId, name: &str) -> bool {
        let catalog = self.catalog();
        match catalog.get(name) {
            Some(def) => self.default_remaining(player, def).is_some(),
            None => false,
        }
    }

    pub fn is_restricted(&self, player: PlayerId, name: &str) -> bool {
        self.remaining_seconds(player, name) != 0
    }

    /// Time left on a restriction: `-1` permanent, `0` not restricted
    pub fn remaining_seconds(&self, player: PlayerId, name: &str) -> i64 {
        let catalog = self.catalog();
        let Some(def) = catalog.get(name) else {
            return 0;
        };
        self.remaining_for(player, def)
    }

    fn remaining_for(&self, player: PlayerId, def: &RestrictionDef) -> i64 {
        let now = self.now_millis();
        if let Some(instance) = self.personal(player, &def.name) {
            // a timed instance in its final second still restricts
            return match instance.remaining_secs(now) {
                0 => 1,
                secs => secs,
            };
        }
        self.default_remaining(player, def).unwrap_or(0)
    }

    /// Remaining default time, or `None` when the default does not apply
    fn default_remaining(&self, player: PlayerId, def: &RestrictionDef) -> Option<i64> {
        match def.default_window() {
            DefaultWindow::Never => None,
            _ if self.has_personal_override(player, &def.name) => None,
            DefaultWindow::Always => Some(PERMANENT),
            DefaultWindow::Until(threshold) => {
                let elapsed = self.playtime.elapsed_qualifying_seconds(player);
                (elapsed < threshold).then(|| threshold - elapsed)
            }
        }
    }

    /// The first catalog restriction that currently forbids `action` on
    /// `target` for this player
    pub fn first_denying(
        &self,
        player: PlayerId,
        kinds: &[RestrictionKind],
        action: RestrictionAction,
        target: &str,
    ) -> Option<Denial> {
        let catalog = self.catalog();
        let denial = catalog
            .covering(kinds, action, target)
            .find_map(|def| match self.remaining_for(player, def) {
                0 => None,
                remaining_secs => Some(Denial::Restriction {
                    name: def.name.clone(),
                    remaining_secs,
                }),
            });
        denial
    }

    /// Give a player a personal restriction, replacing any earlier one.
    ///
    /// `duration_secs` is `-1` for permanent or a positive number of seconds.
    /// Zero is refused here; callers treat it as a removal.
    pub fn assign(
        &self,
        player: PlayerId,
        name: &str,
        duration_secs: i64,
    ) -> Result<PlayerRestriction> {
        if duration_secs == 0 || duration_secs < PERMANENT {
            return Err(Error::InvalidDuration(duration_secs.to_string()));
        }
        let catalog = self.catalog();
        let def = catalog
            .get(name)
            .ok_or_else(|| Error::NotFound(format!("restriction '{name}'")))?;

        let _writer = self.writer.lock();
        let expiry = Expiry::after(self.now_millis(), duration_secs);
        let (expire_at, is_permanent) = expiry.to_stored();
        self.store
            .save_player_restriction(player, &def.name, expire_at, is_permanent)?;

        let instance = PlayerRestriction::new(player, def.name.clone(), expiry);
        let mut players = self.players.write();
        let bucket = players.entry(player).or_default();
        bucket.retain(|r| !r.is_named(&def.name));
        bucket.push(instance.clone());
        log::info!("Restricted {player} with '{}' ({duration_secs}s)", def.name);
        Ok(instance)
    }

    /// Drop a personal restriction. Returns whether one was held in memory.
    pub fn remove(&self, player: PlayerId, name: &str) -> Result<bool> {
        let _writer = self.writer.lock();
        self.store.remove_player_restriction(player, name)?;
        let removed = Self::evict(&mut self.players.write(), player, name);
        if removed {
            log::info!("Removed restriction '{name}' from {player}");
        }
        Ok(removed)
    }

    /// Drop every personal restriction of a player, returning how many
    /// were removed. Instances whose storage delete fails stay in memory.
    pub fn remove_all(&self, player: PlayerId) -> Result<usize> {
        let _writer = self.writer.lock();
        let names: Vec<String> = self
            .players
            .read()
            .get(&player)
            .map(|bucket| bucket.iter().map(|r| r.restriction.clone()).collect())
            .unwrap_or_default();

        let mut removed = 0;
        let mut failure = None;
        for name in names {
            match self.store.remove_player_restriction(player, &name) {
                Ok(()) => {
                    if Self::evict(&mut self.players.write(), player, &name) {
                        removed += 1;
                    }
                }
                Err(e) => {
                    log::error!("Failed to remove '{name}' from {player}: {e}");
                    failure = Some(e);
                }
            }
        }
        match failure {
            Some(e) => Err(e),
            None => Ok(removed),
        }
    }

    fn evict(
        players: &mut HashMap<PlayerId, Vec<PlayerRestriction>>,
        player: PlayerId,
        name: &str,
    ) -> bool {
        let Some(bucket) = players.get_mut(&player) else {
            return false;
        };
        let before = bucket.len();
        bucket.retain(|r| !r.is_named(name));
        let removed = bucket.len() != before;
        if bucket.is_empty() {
            players.remove(&player);
        }
        removed
    }

    /// Live personal instances, dropping any that have expired
    pub fn personal_restrictions(&self, player: PlayerId) -> Vec<PlayerRestriction> {
        let now = self.now_millis();
        let mut players = self.players.write();
        let Some(bucket) = players.get_mut(&player) else {
            return Vec::new();
        };
        bucket.retain(|r| !r.is_expired(now));
        let live = bucket.clone();
        if bucket.is_empty() {
            players.remove(&player);
        }
        live
    }

    /// Catalog defaults currently applying to the player
    pub fn active_defaults(&self, player: PlayerId) -> Vec<ActiveRestriction> {
        let catalog = self.catalog();
        let defaults = catalog
            .iter()
            .filter_map(|def| {
                self.default_remaining(player, def)
                    .map(|remaining_secs| ActiveRestriction {
                        name: def.name.clone(),
                        remaining_secs,
                        source: RestrictionSource::Default,
                    })
            })
            .collect();
        defaults
    }

    /// Personal instances followed by applying defaults
    pub fn list_active(&self, player: PlayerId) -> Vec<ActiveRestriction> {
        let now = self.now_millis();
        let catalog = self.catalog();
        let mut active: Vec<ActiveRestriction> = self
            .personal_restrictions(player)
            .into_iter()
            .filter(|r| catalog.contains(&r.restriction))
            .map(|r| ActiveRestriction {
                remaining_secs: r.remaining_secs(now),
                name: r.restriction,
                source: RestrictionSource::Personal,
            })
            .collect();
        active.extend(self.active_defaults(player));
        active
    }

    /// Players with at least one cached instance
    pub fn tracked_players(&self) -> usize {
        self.players.read().len()
    }

    /// Drop expired instances and empty buckets, then let storage purge its
    /// own expired rows.
    pub fn sweep(&self) -> SweepReport {
        let _writer = self.writer.lock();
        let now = self.now_millis();
        let mut report = SweepReport::default();
        {
            let mut players = self.players.write();
            players.retain(|_, bucket| {
                let before = bucket.len();
                bucket.retain(|r| !r.is_expired(now));
                report.evicted += before - bucket.len();
                if bucket.is_empty() {
                    report.emptied_players += 1;
                    false
                } else {
                    true
                }
            });
        }

        report.purged_from_store = match self.store.cleanup_expired(now) {
            Ok(n) => Some(n),
            Err(e) => {
                log::error!("Restriction store cleanup failed: {e}");
                None
            }
        };
        log::debug!(
            "Sweep evicted {} instances, emptied {} players",
            report.evicted,
            report.emptied_players
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playtime::SessionPlaytime;
    use crate::store::{MemoryStore, StoredRestriction};
    use crate::time::ManualClock;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct Fixture {
        manager: RestrictionManager,
        store: Arc<MemoryStore>,
        playtime: Arc<SessionPlaytime>,
        clock: Arc<ManualClock>,
    }

    fn catalog() -> Catalog {
        Catalog::from_defs([
            RestrictionDef::new("no_pvp", RestrictionKind::Entity)
                .unwrap()
                .with_action(RestrictionAction::Damage)
                .with_target("player")
                .unwrap()
                .as_default(3_600)
                .unwrap(),
            RestrictionDef::new("no_tnt", RestrictionKind::Item)
                .unwrap()
                .with_action(RestrictionAction::Use)
                .with_target("tnt")
                .unwrap()
                .as_default(PERMANENT)
                .unwrap(),
            RestrictionDef::new("no_elytra", RestrictionKind::Equipment)
                .unwrap()
                .with_action(RestrictionAction::Equip)
                .with_target("elytra")
                .unwrap()
                .as_default(0)
                .unwrap(),
            RestrictionDef::new("muted", RestrictionKind::Command)
                .unwrap()
                .with_action(RestrictionAction::Execute)
                .with_target("/msg")
                .unwrap(),
        ])
        .unwrap()
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let playtime = Arc::new(SessionPlaytime::new());
        let clock = Arc::new(ManualClock::at(1_000_000));
        let manager = RestrictionManager::new(
            catalog(),
            store.clone(),
            playtime.clone(),
            clock.clone(),
        );
        Fixture {
            manager,
            store,
            playtime,
            clock,
        }
    }

    /// Store whose writes can be made to fail
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        failing: AtomicBool,
        cleanups: AtomicUsize,
    }

    impl FlakyStore {
        fn check(&self) -> Result<()> {
            if self.failing.load(Ordering::SeqCst) {
                Err(Error::Storage("disk full".into()))
            } else {
                Ok(())
            }
        }
    }

    impl RestrictionStore for FlakyStore {
        fn load_player_restrictions(&self) -> Result<HashMap<PlayerId, Vec<StoredRestriction>>> {
            self.check()?;
            self.inner.load_player_restrictions()
        }

        fn save_player_restriction(
            &self,
            player: PlayerId,
            restriction: &str,
            expire_at_millis: i64,
            is_permanent: bool,
        ) -> Result<()> {
            self.check()?;
            self.inner
                .save_player_restriction(player, restriction, expire_at_millis, is_permanent)
        }

        fn remove_player_restriction(&self, player: PlayerId, restriction: &str) -> Result<()> {
            self.check()?;
            self.inner.remove_player_restriction(player, restriction)
        }

        fn cleanup_expired(&self, now_millis: i64) -> Result<usize> {
            self.cleanups.fetch_add(1, Ordering::SeqCst);
            self.inner.cleanup_expired(now_millis)
        }
    }

    #[test]
    fn test_assign_twice_keeps_one_entry() {
        let f = fixture();
        let p = PlayerId::random();
        f.manager.assign(p, "muted", 60).unwrap();
        f.manager.assign(p, "MUTED", 600).unwrap();

        let personal: Vec<_> = f
            .manager
            .list_active(p)
            .into_iter()
            .filter(|a| a.name == "muted")
            .collect();
        assert_eq!(personal.len(), 1);
        assert_eq!(personal[0].remaining_secs, 600);
        assert_eq!(f.store.row_count(), 1);
    }

    #[test]
    fn test_zero_duration_is_rejected() {
        let f = fixture();
        let p = PlayerId::random();
        assert!(matches!(
            f.manager.assign(p, "muted", 0),
            Err(Error::InvalidDuration(_))
        ));
        assert!(f.manager.personal_restrictions(p).is_empty());
        assert_eq!(f.store.row_count(), 0);
    }

    #[test]
    fn test_assign_unknown_restriction() {
        let f = fixture();
        assert!(matches!(
            f.manager.assign(PlayerId::random(), "nope", 60),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_permanent_default_applies_and_survives_sweep() {
        let f = fixture();
        let p = PlayerId::random();
        assert!(f.manager.is_restricted(p, "no_tnt"));
        assert_eq!(f.manager.remaining_seconds(p, "no_tnt"), PERMANENT);

        f.clock.advance_secs(10 * 365 * 86_400);
        f.playtime.set(p, 10 * 365 * 86_400);
        f.manager.sweep();
        assert!(f.manager.is_restricted(p, "no_tnt"));
    }

    #[test]
    fn test_zero_default_never_applies() {
        let f = fixture();
        let p = PlayerId::random();
        assert!(!f.manager.should_apply_default(p, "no_elytra"));
        f.playtime.set(p, 1_000_000);
        assert!(!f.manager.is_restricted(p, "no_elytra"));
    }

    #[test]
    fn test_timed_default_follows_playtime() {
        let f = fixture();
        let p = PlayerId::random();
        f.playtime.set(p, 600);
        assert_eq!(f.manager.remaining_seconds(p, "no_pvp"), 3_000);
        f.playtime.set(p, 3_600);
        assert!(!f.manager.is_restricted(p, "no_pvp"));
    }

    #[test]
    fn test_personal_override_replaces_default() {
        let f = fixture();
        let p = PlayerId::random();
        f.manager.assign(p, "no_pvp", 30).unwrap();
        assert!(!f.manager.should_apply_default(p, "no_pvp"));
        assert_eq!(f.manager.remaining_seconds(p, "no_pvp"), 30);

        // once the shorter override lapses the default window takes over again
        f.clock.advance_secs(31);
        assert_eq!(f.manager.remaining_seconds(p, "no_pvp"), 3_600);
    }

    #[test]
    fn test_personal_expiry() {
        let f = fixture();
        let p = PlayerId::random();
        f.manager.assign(p, "muted", 10).unwrap();
        assert!(f.manager.is_restricted(p, "muted"));
        f.clock.advance_secs(10);
        assert!(!f.manager.is_restricted(p, "muted"));
        assert!(f.manager.personal_restrictions(p).is_empty());
        assert_eq!(f.manager.tracked_players(), 0);
    }

    #[test]
    fn test_unknown_name_is_not_restricted() {
        let f = fixture();
        assert!(!f.manager.is_restricted(PlayerId::random(), "ghost"));
        assert_eq!(f.manager.remaining_seconds(PlayerId::random(), "ghost"), 0);
    }

    #[test]
    fn test_remove_and_remove_all() {
        let f = fixture();
        let p = PlayerId::random();
        assert!(!f.manager.remove(p, "muted").unwrap());

        f.manager.assign(p, "muted", PERMANENT).unwrap();
        f.manager.assign(p, "no_pvp", 120).unwrap();
        assert!(f.manager.remove(p, "Muted").unwrap());
        assert!(!f.manager.is_restricted(p, "muted"));

        f.manager.assign(p, "muted", 60).unwrap();
        assert_eq!(f.manager.remove_all(p).unwrap(), 2);
        assert_eq!(f.store.row_count(), 0);
        assert_eq!(f.manager.tracked_players(), 0);
    }

    #[test]
    fn test_storage_failure_leaves_memory_unchanged() {
        let store = Arc::new(FlakyStore::default());
        let manager = RestrictionManager::new(
            catalog(),
            store.clone(),
            Arc::new(SessionPlaytime::new()),
            Arc::new(ManualClock::at(0)),
        );
        let p = PlayerId::random();
        manager.assign(p, "muted", PERMANENT).unwrap();

        store.failing.store(true, Ordering::SeqCst);
        assert!(manager.assign(p, "no_pvp", 60).unwrap_err().is_storage());
        assert!(manager.remove(p, "muted").unwrap_err().is_storage());
        assert!(manager.remove_all(p).is_err());
        assert!(manager.is_restricted(p, "muted"));
        assert!(manager.personal(p, "no_pvp").is_none());
    }

    #[test]
    fn test_load_failure_starts_empty() {
        let store = Arc::new(FlakyStore::default());
        store.failing.store(true, Ordering::SeqCst);
        let manager = RestrictionManager::new(
            catalog(),
            store,
            Arc::new(SessionPlaytime::new()),
            Arc::new(ManualClock::at(0)),
        );
        assert_eq!(manager.load(), LoadReport::default());
        assert_eq!(manager.tracked_players(), 0);
    }

    #[test]
    fn test_load_purges_orphans() {
        let f = fixture();
        let p = PlayerId::random();
        f.store
            .save_player_restriction(p, "muted", i64::MAX, true)
            .unwrap();
        f.store
            .save_player_restriction(p, "deleted_rule", i64::MAX, true)
            .unwrap();

        let report = f.manager.load();
        assert_eq!(report, LoadReport { loaded: 1, purged: 1 });
        assert_eq!(f.store.row_count(), 1);
        assert!(f.manager.is_restricted(p, "muted"));
    }

    #[test]
    fn test_sweep_is_idempotent() {
        let store = Arc::new(FlakyStore::default());
        let clock = Arc::new(ManualClock::at(0));
        let manager = RestrictionManager::new(
            catalog(),
            store.clone(),
            Arc::new(SessionPlaytime::new()),
            clock.clone(),
        );
        let a = PlayerId::random();
        let b = PlayerId::random();
        manager.assign(a, "muted", 5).unwrap();
        manager.assign(a, "no_tnt", PERMANENT).unwrap();
        manager.assign(b, "muted", 5).unwrap();
        clock.advance_secs(5);

        let first = manager.sweep();
        assert_eq!(first.evicted, 2);
        assert_eq!(first.emptied_players, 1);
        assert_eq!(first.purged_from_store, Some(2));
        assert_eq!(manager.tracked_players(), 1);

        let second = manager.sweep();
        assert_eq!(second.evicted, 0);
        assert_eq!(second.emptied_players, 0);
        assert_eq!(second.purged_from_store, Some(0));
        assert_eq!(manager.tracked_players(), 1);
        assert_eq!(store.cleanups.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_first_denying_matches_kind_and_action() {
        let f = fixture();
        let p = PlayerId::random();
        let tnt = "minecraft:tnt";
        let denial = f
            .manager
            .first_denying(p, &[RestrictionKind::Item], RestrictionAction::Use, tnt)
            .unwrap();
        assert_eq!(
            denial,
            Denial::Restriction {
                name: "no_tnt".into(),
                remaining_secs: PERMANENT
            }
        );
        assert!(f
            .manager
            .first_denying(p, &[RestrictionKind::Item], RestrictionAction::Drop, tnt)
            .is_none());
        assert!(f
            .manager
            .first_denying(p, &[RestrictionKind::Command], RestrictionAction::Execute, "msg")
            .is_none());

        f.manager.assign(p, "muted", 90).unwrap();
        assert!(f
            .manager
            .first_denying(p, &[RestrictionKind::Command], RestrictionAction::Execute, "msg")
            .is_some());
    }

    #[test]
    fn test_list_active_mixes_personal_and_defaults() {
        let f = fixture();
        let p = PlayerId::random();
        f.manager.assign(p, "muted", PERMANENT).unwrap();
        let active = f.manager.list_active(p);
        let names: Vec<_> = active.iter().map(|a| (a.name.as_str(), a.source)).collect();
        assert_eq!(
            names,
            vec![
                ("muted", RestrictionSource::Personal),
                ("no_pvp", RestrictionSource::Default),
                ("no_tnt", RestrictionSource::Default),
            ]
        );
    }

    /// Store that yields between writing a row and returning, widening the
    /// gap between persisting and publishing
    #[derive(Default)]
    struct YieldingStore {
        inner: MemoryStore,
    }

    impl RestrictionStore for YieldingStore {
        fn load_player_restrictions(&self) -> Result<HashMap<PlayerId, Vec<StoredRestriction>>> {
            self.inner.load_player_restrictions()
        }

        fn save_player_restriction(
            &self,
            player: PlayerId,
            restriction: &str,
            expire_at_millis: i64,
            is_permanent: bool,
        ) -> Result<()> {
            self.inner
                .save_player_restriction(player, restriction, expire_at_millis, is_permanent)?;
            std::thread::yield_now();
            Ok(())
        }

        fn remove_player_restriction(&self, player: PlayerId, restriction: &str) -> Result<()> {
            self.inner.remove_player_restriction(player, restriction)?;
            std::thread::yield_now();
            Ok(())
        }

        fn cleanup_expired(&self, now_millis: i64) -> Result<usize> {
            self.inner.cleanup_expired(now_millis)
        }
    }

    #[test]
    fn test_concurrent_assign_and_remove_agree_with_store() {
        let store = Arc::new(YieldingStore::default());
        let manager = RestrictionManager::new(
            catalog(),
            store.clone(),
            Arc::new(SessionPlaytime::new()),
            Arc::new(ManualClock::at(0)),
        );
        let p = PlayerId::random();

        for _ in 0..20 {
            std::thread::scope(|s| {
                for worker in 0..4 {
                    let manager = &manager;
                    s.spawn(move || {
                        for round in 0..25 {
                            if (worker + round) % 2 == 0 {
                                manager.assign(p, "muted", 60).unwrap();
                            } else {
                                manager.remove(p, "muted").unwrap();
                            }
                        }
                    });
                }
            });

            let rows = store.load_player_restrictions().unwrap();
            let stored = rows
                .get(&p)
                .is_some_and(|bucket| bucket.iter().any(|r| r.restriction == "muted"));
            assert_eq!(manager.personal(p, "muted").is_some(), stored);
        }
    }
}
