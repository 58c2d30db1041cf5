//! Haven Hub - engine facade for the host
//!
//! This crate wires the core engine to its collaborators and exposes the
//! surfaces the host calls into.
//!
//! ## Architecture
//!
//! ```text
//! Hub (built once at startup)
//!  │
//!  ├── RestrictionManager ← catalog + per-player instances
//!  │    └── RestrictionStore (native_db or memory)
//!  │
//!  ├── ZoneRegistry ← snapshots, pending confirmations, selections
//!  │    └── ZoneStore (RON zone file or memory)
//!  │
//!  └── PlaytimeSource (session counter or server uptime)
//! ```
//!
//! ## Key Components
//!
//! - [`Hub`]: owns the state, built from a [`HubConfig`]
//! - `check_*` methods: one synchronous allow/deny decision per host event
//! - [`Hub::execute`]: the operator command surface
//! - [`Hub::start_sweeper`]: periodic expiry sweep on tokio

mod checks;
mod command;
mod config;
mod error;
mod hub;
mod sweeper;

pub use checks::Actor;
pub use command::{AddShape, Command, Operator, PlayerDirectory, Reply, ZoneCommand};
pub use config::{HubConfig, PathsConfig, PlaytimePolicy, RestrictionsConfig, ZonesConfig};
pub use error::{Error, Result};
pub use hub::{Hub, HubBuilder};
