//! Sources of "qualifying time" used by default-restriction windows
//!
//! Two policies exist and are deliberately kept apart:
//! - [`SessionPlaytime`] counts each player's own accumulated play time,
//!   so every player's window is independent.
//! - [`ServerUptime`] counts time since the process started, so a timed
//!   default restriction lifts for everybody at the same moment.

use crate::identity::PlayerId;
use crate::time::{Clock, MILLIS_PER_SECOND};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Elapsed policy time for a player
pub trait PlaytimeSource: Send + Sync {
    fn elapsed_qualifying_seconds(&self, player: PlayerId) -> i64;
}

/// Per-player cumulative play time, fed by the host (e.g. from its
/// play-time statistic on join and periodically while online)
#[derive(Debug, Default)]
pub struct SessionPlaytime {
    seconds: RwLock<HashMap<PlayerId, i64>>,
}

impl SessionPlaytime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a player's total
    pub fn set(&self, player: PlayerId, seconds: i64) {
        self.seconds.write().insert(player, seconds.max(0));
    }

    /// Add to a player's total
    pub fn add(&self, player: PlayerId, seconds: i64) {
        let mut map = self.seconds.write();
        let total = map.entry(player).or_insert(0);
        *total = total.saturating_add(seconds).max(0);
    }
}

impl PlaytimeSource for SessionPlaytime {
    fn elapsed_qualifying_seconds(&self, player: PlayerId) -> i64 {
        self.seconds.read().get(&player).copied().unwrap_or(0)
    }
}

/// Time since the process started, identical for every player
pub struct ServerUptime {
    clock: Arc<dyn Clock>,
    started_at: i64,
}

impl ServerUptime {
    /// Start counting from the clock's current time
    pub fn starting_now(clock: Arc<dyn Clock>) -> Self {
        let started_at = clock.now_millis();
        Self { clock, started_at }
    }
}

impl PlaytimeSource for ServerUptime {
    fn elapsed_qualifying_seconds(&self, _player: PlayerId) -> i64 {
        ((self.clock.now_millis() - self.started_at) / MILLIS_PER_SECOND).max(0)
    }
}
