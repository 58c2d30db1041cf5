//! ZoneRegistry - owner of every spawn zone
//!
//! # Design
//!
//! Zones live in an `Arc<IndexMap>` keyed by lower-cased name, in
//! registration order. Readers take a [`ZoneSnapshot`] (an `Arc` clone) and
//! evaluate geometry without holding any lock. Writers are serialized by a
//! separate mutex, apply their change to a copy, persist the copy and only
//! then publish it, so a storage failure never leaves memory ahead of disk.
//! After a failed load nothing is written back until a load succeeds, so an
//! unreadable zone file is never replaced by the (partial) in-memory set.
//!
//! Adding and removing zones goes through a two-step workflow: an operator
//! [proposes](ZoneRegistry::propose) a change and then
//! [confirms](ZoneRegistry::confirm) it by typing the zone name again within
//! the confirmation window.

use crate::error::{Error, Result};
use crate::identity::{Location, PlayerId, WorldId};
use crate::store::ZoneStore;
use crate::time::{Clock, MILLIS_PER_SECOND};
use crate::zone::{Point, Shape, SpawnZone};
use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Default confirmation window for pending zone actions
pub const DEFAULT_CONFIRM_WINDOW_SECS: i64 = 30;

type ZoneMap = IndexMap<String, SpawnZone>;

/// Immutable view of the zone set
///
/// Cloning is O(1). A snapshot keeps answering from the zone set it was
/// taken from even if the registry is mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct ZoneSnapshot {
    zones: Arc<ZoneMap>,
}

impl ZoneSnapshot {
    /// First zone (in registration order) containing the point
    pub fn lookup(&self, world: &WorldId, x: f64, z: f64) -> Option<&SpawnZone> {
        self.zones.values().find(|zone| zone.contains(world, x, z))
    }

    /// Every zone containing the point
    pub fn lookup_all(&self, world: &WorldId, x: f64, z: f64) -> Vec<&SpawnZone> {
        self.zones
            .values()
            .filter(|zone| zone.contains(world, x, z))
            .collect()
    }

    pub fn lookup_location(&self, location: &Location) -> Option<&SpawnZone> {
        self.zones
            .values()
            .find(|zone| zone.contains_location(location))
    }

    pub fn get(&self, name: &str) -> Option<&SpawnZone> {
        self.zones.get(&key(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpawnZone> {
        self.zones.values()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

/// What a pending action will do once confirmed
#[derive(Debug, Clone, PartialEq)]
pub enum ZoneActionKind {
    /// Create a zone with the default protection template
    Add { world: WorldId, shape: Shape },
    Remove,
}

/// An unconfirmed proposal from one operator
#[derive(Debug, Clone, PartialEq)]
pub struct PendingZoneAction {
    pub kind: ZoneActionKind,
    pub zone_name: String,
    /// Epoch millis
    pub created_at: i64,
}

/// Result of a confirmed action
#[derive(Debug, Clone, PartialEq)]
pub enum ZoneChange {
    Added(SpawnZone),
    Removed(SpawnZone),
}

/// Rectangle corners captured by an operator
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub pos1: Option<Location>,
    pub pos2: Option<Location>,
}

impl Selection {
    /// World and rectangle spanned by both corners
    pub fn rect(&self) -> Result<(WorldId, Shape)> {
        let (Some(a), Some(b)) = (&self.pos1, &self.pos2) else {
            return Err(Error::InvalidShape(
                "both pos1 and pos2 must be set".to_string(),
            ));
        };
        if a.world != b.world {
            return Err(Error::InvalidShape(format!(
                "corners are in different worlds ({} and {})",
                a.world, b.world
            )));
        }
        let shape = Shape::rect(Point::new(a.x, a.z), Point::new(b.x, b.z))?;
        Ok((a.world.clone(), shape))
    }
}

pub struct ZoneRegistry {
    zones: RwLock<Arc<ZoneMap>>,
    /// Serializes writers; never held by readers
    writer: Mutex<()>,
    /// Set while storage is unreadable; publishing is refused
    load_failed: AtomicBool,
    pending: Mutex<HashMap<PlayerId, PendingZoneAction>>,
    selections: Mutex<HashMap<PlayerId, Selection>>,
    store: Arc<dyn ZoneStore>,
    clock: Arc<dyn Clock>,
    confirm_window_millis: i64,
}

impl ZoneRegistry {
    pub fn new(store: Arc<dyn ZoneStore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_confirm_window(store, clock, DEFAULT_CONFIRM_WINDOW_SECS)
    }

    pub fn with_confirm_window(
        store: Arc<dyn ZoneStore>,
        clock: Arc<dyn Clock>,
        confirm_window_secs: i64,
    ) -> Self {
        Self {
            zones: RwLock::new(Arc::new(ZoneMap::new())),
            writer: Mutex::new(()),
            load_failed: AtomicBool::new(false),
            pending: Mutex::new(HashMap::new()),
            selections: Mutex::new(HashMap::new()),
            store,
            clock,
            confirm_window_millis: confirm_window_secs.max(0) * MILLIS_PER_SECOND,
        }
    }

    /// Replace the zone set with what storage holds. Returns the zone count.
    ///
    /// On a read failure the current zones stay published and every write is
    /// refused until a later load succeeds. Duplicate names keep the first
    /// occurrence.
    pub fn load(&self) -> Result<usize> {
        let _guard = self.writer.lock();
        let loaded = match self.store.load() {
            Ok(zones) => zones,
            Err(e) => {
                self.load_failed.store(true, Ordering::SeqCst);
                log::error!(
                    "Failed to load zones, keeping {} and refusing writes: {e}",
                    self.len()
                );
                return Err(e);
            }
        };
        let mut map = ZoneMap::with_capacity(loaded.len());
        for zone in loaded {
            let k = key(zone.name());
            if map.contains_key(&k) {
                log::warn!("Skipping duplicate zone '{}'", zone.name());
                continue;
            }
            map.insert(k, zone);
        }
        let count = map.len();
        *self.zones.write() = Arc::new(map);
        self.load_failed.store(false, Ordering::SeqCst);
        log::info!("Loaded {count} zones");
        Ok(count)
    }

    /// Whether the last load failed and writes are being refused
    pub fn is_read_only(&self) -> bool {
        self.load_failed.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> ZoneSnapshot {
        ZoneSnapshot {
            zones: self.zones.read().clone(),
        }
    }

    pub fn lookup(&self, world: &WorldId, x: f64, z: f64) -> Option<SpawnZone> {
        self.snapshot().lookup(world, x, z).cloned()
    }

    pub fn lookup_all(&self, world: &WorldId, x: f64, z: f64) -> Vec<SpawnZone> {
        self.snapshot()
            .lookup_all(world, x, z)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<SpawnZone> {
        self.snapshot().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.snapshot().get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.zones.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert and persist a new zone
    pub fn add(&self, zone: SpawnZone) -> Result<()> {
        let _guard = self.writer.lock();
        let current = self.zones.read().clone();
        let k = key(zone.name());
        if current.contains_key(&k) {
            return Err(Error::AlreadyExists(format!("zone '{}'", zone.name())));
        }
        let mut next = (*current).clone();
        log::info!("Adding zone '{}' ({})", zone.name(), zone.shape().describe());
        next.insert(k, zone);
        self.publish(next)
    }

    /// Delete and persist; returns the removed zone
    pub fn remove(&self, name: &str) -> Result<SpawnZone> {
        let _guard = self.writer.lock();
        let current = self.zones.read().clone();
        let mut next = (*current).clone();
        let removed = next
            .shift_remove(&key(name))
            .ok_or_else(|| Error::NotFound(format!("zone '{name}'")))?;
        self.publish(next)?;
        log::info!("Removed zone '{}'", removed.name());
        Ok(removed)
    }

    /// Apply `change` to a copy of the named zone, persist, then publish.
    /// Returns the updated zone.
    pub fn update(
        &self,
        name: &str,
        change: impl FnOnce(&mut SpawnZone) -> Result<()>,
    ) -> Result<SpawnZone> {
        let _guard = self.writer.lock();
        let current = self.zones.read().clone();
        let mut next = (*current).clone();
        let zone = next
            .get_mut(&key(name))
            .ok_or_else(|| Error::NotFound(format!("zone '{name}'")))?;
        change(zone)?;
        let updated = zone.clone();
        self.publish(next)?;
        Ok(updated)
    }

    /// Apply a `key value` edit (see [`SpawnZone::apply_edit`])
    pub fn edit(&self, name: &str, key: &str, value: &str) -> Result<SpawnZone> {
        let zone = self.update(name, |zone| zone.apply_edit(key, value))?;
        log::info!("Edited zone '{}': {key} = {value}", zone.name());
        Ok(zone)
    }

    /// Append a vertex to a polygon zone
    pub fn add_point(&self, name: &str, at: &Location) -> Result<SpawnZone> {
        self.update(name, |zone| {
            if zone.world() != &at.world {
                return Err(Error::InvalidShape(format!(
                    "point is in world {}, zone is in {}",
                    at.world,
                    zone.world()
                )));
            }
            match zone.shape_mut() {
                Shape::Polygon(polygon) => polygon.push_point(Point::new(at.x, at.z)),
                other => Err(Error::InvalidShape(format!(
                    "zone is a {}, not a polygon",
                    other.shape_type().as_str()
                ))),
            }
        })
    }

    fn publish(&self, next: ZoneMap) -> Result<()> {
        if self.is_read_only() {
            return Err(Error::Storage(
                "zone storage could not be read, refusing to overwrite it".to_string(),
            ));
        }
        let zones: Vec<&SpawnZone> = next.values().collect();
        self.store.save(&zones)?;
        *self.zones.write() = Arc::new(next);
        Ok(())
    }

    fn is_stale(&self, action: &PendingZoneAction, now: i64) -> bool {
        now - action.created_at > self.confirm_window_millis
    }

    /// Record a proposal for `operator`, superseding any earlier one.
    ///
    /// Adding an existing name or removing a missing one is refused up front.
    pub fn propose(
        &self,
        operator: PlayerId,
        zone_name: &str,
        kind: ZoneActionKind,
    ) -> Result<PendingZoneAction> {
        let zone_name = zone_name.trim();
        match &kind {
            ZoneActionKind::Add { .. } if self.contains(zone_name) => {
                return Err(Error::AlreadyExists(format!("zone '{zone_name}'")));
            }
            ZoneActionKind::Remove if !self.contains(zone_name) => {
                return Err(Error::NotFound(format!("zone '{zone_name}'")));
            }
            _ => {}
        }

        let now = self.clock.now_millis();
        let action = PendingZoneAction {
            kind,
            zone_name: zone_name.to_string(),
            created_at: now,
        };
        let mut pending = self.pending.lock();
        pending.retain(|_, p| !self.is_stale(p, now));
        pending.insert(operator, action.clone());
        Ok(action)
    }

    /// The operator's live pending action, if any
    pub fn pending(&self, operator: PlayerId) -> Option<PendingZoneAction> {
        let now = self.clock.now_millis();
        let mut pending = self.pending.lock();
        let stale = self.is_stale(pending.get(&operator)?, now);
        if stale {
            pending.remove(&operator);
            return None;
        }
        pending.get(&operator).cloned()
    }

    pub fn cancel(&self, operator: PlayerId) -> Option<PendingZoneAction> {
        self.pending.lock().remove(&operator)
    }

    /// Confirm the operator's pending action by echoing its zone name.
    ///
    /// Fails with [`Error::Expired`] when nothing is pending or the window has
    /// passed, and with [`Error::NameMismatch`] (keeping the action for a
    /// retry) when the name differs. On success the action is consumed; if
    /// applying it fails the action stays pending unless a newer one replaced
    /// it meanwhile.
    pub fn confirm(&self, operator: PlayerId, typed_name: &str) -> Result<ZoneChange> {
        let now = self.clock.now_millis();
        let action = {
            let mut pending = self.pending.lock();
            let action = pending.remove(&operator).ok_or(Error::Expired)?;
            if self.is_stale(&action, now) {
                return Err(Error::Expired);
            }
            if !action.zone_name.eq_ignore_ascii_case(typed_name.trim()) {
                let expected = action.zone_name.clone();
                pending.insert(operator, action);
                return Err(Error::NameMismatch {
                    expected,
                    got: typed_name.trim().to_string(),
                });
            }
            action
        };

        let applied = match &action.kind {
            ZoneActionKind::Add { world, shape } => {
                SpawnZone::with_default_protections(&action.zone_name, world.clone(), shape.clone())
                    .and_then(|zone| {
                        self.add(zone.clone())?;
                        self.selections.lock().remove(&operator);
                        Ok(ZoneChange::Added(zone))
                    })
            }
            ZoneActionKind::Remove => self.remove(&action.zone_name).map(ZoneChange::Removed),
        };
        if let Err(e) = &applied {
            log::warn!("Zone action on '{}' failed, still pending: {e}", action.zone_name);
            self.pending.lock().entry(operator).or_insert(action);
        }
        applied
    }

    pub fn set_pos1(&self, operator: PlayerId, at: Location) {
        self.selections.lock().entry(operator).or_default().pos1 = Some(at);
    }

    pub fn set_pos2(&self, operator: PlayerId, at: Location) {
        self.selections.lock().entry(operator).or_default().pos2 = Some(at);
    }

    pub fn selection(&self, operator: PlayerId) -> Selection {
        self.selections
            .lock()
            .get(&operator)
            .cloned()
            .unwrap_or_default()
    }

    /// Drop the operator's selection and pending action, e.g. when they leave
    pub fn forget(&self, operator: PlayerId) {
        self.selections.lock().remove(&operator);
        self.pending.lock().remove(&operator);
    }
}

fn key(name: &str) -> String {
    name.trim().to_lowercase()
}
