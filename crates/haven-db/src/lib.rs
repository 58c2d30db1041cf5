//! Haven DB - Database layer using native_db
//!
//! Provides persistent storage for per-player restriction instances. The
//! [`Store`] implements [`haven_core::RestrictionStore`] so it can be handed
//! straight to a `RestrictionManager`.

mod error;
mod models;
mod queries;
mod store;

pub use error::{Error, Result};
pub use models::StoredPlayerRestriction;
pub use store::Store;
