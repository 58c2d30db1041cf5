//! Haven Core - temporal and spatial restriction engine
//!
//! This crate holds the state and rules behind two kinds of player limits:
//! - **Restrictions**: named rules from a catalog that stop a player from
//!   using, dropping, equipping or damaging something, or from running a
//!   command. They are assigned per player for a duration, or applied by
//!   default while a player's qualifying time is below a threshold.
//! - **Zones**: named 2D regions (circle, rectangle, polygon) of one world,
//!   each with its own block/interact ACLs and hard toggles for pvp,
//!   explosions and fire spread.
//!
//! ## Collaborators
//!
//! Storage, zone persistence and playtime are injected through traits
//! ([`RestrictionStore`], [`ZoneStore`], [`PlaytimeSource`]); time comes from a
//! [`Clock`] so tests can drive expiry with a [`ManualClock`].
//!
//! ```rust,ignore
//! use haven_core::{Catalog, MemoryStore, RestrictionManager, SessionPlaytime, SystemClock};
//! use std::sync::Arc;
//!
//! let manager = RestrictionManager::new(
//!     Catalog::new(),
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(SessionPlaytime::new()),
//!     Arc::new(SystemClock),
//! );
//! manager.load();
//! ```

mod catalog;
mod decision;
mod error;
mod identity;
mod manager;
mod player;
mod playtime;
mod registry;
mod restriction;
mod store;
pub mod time;
pub mod zone;

pub use catalog::Catalog;
pub use decision::{Decision, Denial, ZoneRule};
pub use error::{Error, Result};
pub use identity::{Location, PlayerId, ResourceKey, WorldId};
pub use manager::{ActiveRestriction, LoadReport, RestrictionManager, RestrictionSource, SweepReport};
pub use player::{Expiry, PlayerRestriction};
pub use playtime::{PlaytimeSource, ServerUptime, SessionPlaytime};
pub use registry::{
    PendingZoneAction, Selection, ZoneActionKind, ZoneChange, ZoneRegistry, ZoneSnapshot,
    DEFAULT_CONFIRM_WINDOW_SECS,
};
pub use restriction::{
    normalize_command, normalize_target, DefaultWindow, RestrictionAction, RestrictionDef,
    RestrictionKind,
};
pub use store::{MemoryStore, MemoryZoneStore, RestrictionStore, StoredRestriction, ZoneStore};
pub use time::{format_duration, parse_duration, Clock, ManualClock, SystemClock, PERMANENT};
pub use zone::{
    Acl, AclMode, Capability, Circle, Point, Polygon, Rect, Shape, ShapeType, SpawnZone, Toggle,
};
