//! Hub - owner of the restriction and zone state
//!
//! The Hub is built once at startup and handed (by reference or `Arc`) to the
//! host's event and command layers. It owns:
//! - the [`RestrictionManager`] (catalog + per-player instances)
//! - the [`ZoneRegistry`]
//! - the playtime source selected by [`PlaytimePolicy`]
//!
//! Action checks live in `checks.rs`, operator commands in `command.rs` and
//! the expiry sweeper in `sweeper.rs`; all of them are `impl Hub` blocks.

use crate::config::{HubConfig, PlaytimePolicy};
use crate::error::Result;
use haven_core::{
    Catalog, Clock, LoadReport, MemoryStore, MemoryZoneStore, PlayerId, PlaytimeSource,
    RestrictionManager, RestrictionStore, ServerUptime, SessionPlaytime, SystemClock, ZoneRegistry,
    ZoneStore,
};
use haven_script::ZoneFile;
use std::path::Path;
use std::sync::Arc;

/// Central owner of haven's state
///
/// ```
/// use haven_hub::{Hub, HubConfig};
///
/// let hub = Hub::builder(HubConfig::default()).build();
/// assert!(hub.zones().is_empty());
/// assert_eq!(hub.restrictions().catalog().len(), 0);
/// ```
pub struct Hub {
    pub(crate) config: HubConfig,
    pub(crate) restrictions: Arc<RestrictionManager>,
    pub(crate) zones: Arc<ZoneRegistry>,
    pub(crate) playtime: Arc<dyn PlaytimeSource>,
    session: Option<Arc<SessionPlaytime>>,
    pub(crate) clock: Arc<dyn Clock>,
}

impl Hub {
    pub fn builder(config: HubConfig) -> HubBuilder {
        HubBuilder::new(config)
    }

    /// Build a hub backed by the files named in `config.paths`.
    ///
    /// A missing catalog file yields an empty catalog; a malformed one is an
    /// error, since loading against an empty catalog would purge every stored
    /// restriction. Player restrictions go to the native_db file when one is
    /// configured and can be opened, otherwise memory.
    pub fn open(config: HubConfig) -> Result<Self> {
        let catalog = read_catalog(&config.paths.catalog)?;
        let zone_store: Arc<dyn ZoneStore> = Arc::new(ZoneFile::new(&config.paths.zones));
        let restriction_store: Arc<dyn RestrictionStore> = match &config.paths.database {
            Some(path) => match haven_db::Store::open(path) {
                Ok(store) => Arc::new(store),
                Err(e) => {
                    log::error!(
                        "Failed to open database {}, player restrictions will not persist: {e}",
                        path.display()
                    );
                    Arc::new(MemoryStore::new())
                }
            },
            None => {
                log::warn!("No database configured, player restrictions will not persist");
                Arc::new(MemoryStore::new())
            }
        };
        Ok(HubBuilder::new(config)
            .catalog(catalog)
            .restriction_store(restriction_store)
            .zone_store(zone_store)
            .build())
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    pub fn restrictions(&self) -> &Arc<RestrictionManager> {
        &self.restrictions
    }

    pub fn zones(&self) -> &Arc<ZoneRegistry> {
        &self.zones
    }

    pub fn playtime(&self) -> &Arc<dyn PlaytimeSource> {
        &self.playtime
    }

    /// The per-player counter the host feeds, when that policy is active
    pub fn session_playtime(&self) -> Option<&Arc<SessionPlaytime>> {
        self.session.as_ref()
    }

    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Re-read the catalog file and zone file, then rebuild player state.
    ///
    /// A catalog that fails to parse leaves the current one in place. A zone
    /// file that fails to parse keeps the current zones and makes the registry
    /// read-only until a reload succeeds.
    pub fn reload(&self) -> Result<LoadReport> {
        let catalog = read_catalog(&self.config.paths.catalog)?;
        let report = self.restrictions.reload(catalog);
        self.zones.load()?;
        Ok(report)
    }

    /// Drop per-player zone tooling state when a player leaves
    pub fn player_quit(&self, player: PlayerId) {
        self.zones.forget(player);
    }

    /// Write the current catalog to the configured catalog file
    pub fn save_catalog(&self) -> Result<()> {
        haven_script::save_catalog(&self.config.paths.catalog, &self.restrictions.catalog())?;
        Ok(())
    }

    /// Seconds until zone rules stop applying to this player.
    ///
    /// `None` when playtime bypass is switched off, `Some(0)` once reached.
    pub fn playtime_bypass_remaining(&self, player: PlayerId) -> Option<i64> {
        let threshold = self.config.zones.bypass_after_playtime;
        if threshold <= 0 {
            return None;
        }
        let elapsed = self.playtime.elapsed_qualifying_seconds(player);
        Some((threshold - elapsed).max(0))
    }

    pub fn has_playtime_bypass(&self, player: PlayerId) -> bool {
        self.playtime_bypass_remaining(player) == Some(0)
    }
}

fn read_catalog(path: &Path) -> Result<Catalog> {
    if !path.exists() {
        log::warn!("No catalog at {}, starting with no restrictions", path.display());
        return Ok(Catalog::new());
    }
    let mut loader = haven_script::Loader::new();
    loader.load_file(path)?;
    if loader.skipped() > 0 {
        log::warn!("{} catalog entries were skipped", loader.skipped());
    }
    Ok(loader.into_catalog())
}

/// Step-by-step construction of a [`Hub`]
///
/// Anything not supplied falls back to an in-memory or wall-clock default.
pub struct HubBuilder {
    config: HubConfig,
    catalog: Catalog,
    restriction_store: Option<Arc<dyn RestrictionStore>>,
    zone_store: Option<Arc<dyn ZoneStore>>,
    playtime: Option<Arc<dyn PlaytimeSource>>,
    session: Option<Arc<SessionPlaytime>>,
    clock: Option<Arc<dyn Clock>>,
}

impl HubBuilder {
    pub fn new(config: HubConfig) -> Self {
        Self {
            config,
            catalog: Catalog::new(),
            restriction_store: None,
            zone_store: None,
            playtime: None,
            session: None,
            clock: None,
        }
    }

    pub fn catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn restriction_store(mut self, store: Arc<dyn RestrictionStore>) -> Self {
        self.restriction_store = Some(store);
        self
    }

    pub fn zone_store(mut self, store: Arc<dyn ZoneStore>) -> Self {
        self.zone_store = Some(store);
        self
    }

    /// Use a specific playtime source instead of the configured policy
    pub fn playtime(mut self, playtime: Arc<dyn PlaytimeSource>) -> Self {
        self.playtime = Some(playtime);
        self.session = None;
        self
    }

    /// Use a session counter the caller keeps a handle to
    pub fn session_playtime(mut self, session: Arc<SessionPlaytime>) -> Self {
        self.playtime = Some(session.clone());
        self.session = Some(session);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Assemble the hub and load persisted state
    pub fn build(self) -> Hub {
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>);

        let (playtime, session) = match (self.playtime, self.session) {
            (Some(playtime), session) => (playtime, session),
            (None, _) => match self.config.restrictions.playtime_policy {
                PlaytimePolicy::Session => {
                    let session = Arc::new(SessionPlaytime::new());
                    (session.clone() as Arc<dyn PlaytimeSource>, Some(session))
                }
                PlaytimePolicy::ServerUptime => (
                    Arc::new(ServerUptime::starting_now(clock.clone())) as Arc<dyn PlaytimeSource>,
                    None,
                ),
            },
        };

        let restriction_store = self
            .restriction_store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()) as Arc<dyn RestrictionStore>);
        let zone_store = self
            .zone_store
            .unwrap_or_else(|| Arc::new(MemoryZoneStore::new()) as Arc<dyn ZoneStore>);

        let restrictions = Arc::new(RestrictionManager::new(
            self.catalog,
            restriction_store,
            playtime.clone(),
            clock.clone(),
        ));
        let zones = Arc::new(ZoneRegistry::with_confirm_window(
            zone_store,
            clock.clone(),
            self.config.zones.confirm_window_secs,
        ));

        restrictions.load();
        if zones.load().is_err() {
            log::warn!("Zone edits are disabled until the zone file loads");
        }
        log::info!(
            "Hub ready: {} restrictions, {} zones, playtime policy {:?}",
            restrictions.catalog().len(),
            zones.len(),
            self.config.restrictions.playtime_policy
        );

        Hub {
            config: self.config,
            restrictions,
            zones,
            playtime,
            session,
            clock,
        }
    }
}
