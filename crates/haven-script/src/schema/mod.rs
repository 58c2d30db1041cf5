//! Schema definitions for RON files

pub mod restriction;
pub mod zone;

pub use restriction::{ActionList, CatalogFile, DurationValue, RestrictionEntry};
pub use zone::{AclEntry, ZoneEntry, ZoneFileDoc};
