//! Haven Script - RON file formats
//!
//! - Restriction catalog files ([`Loader`], [`save_catalog`])
//! - The zone document, exposed as a [`haven_core::ZoneStore`] ([`ZoneFile`])
//!
//! Both formats are deserialized into typed schema structs with explicit
//! defaults; a malformed entry is logged and skipped rather than failing
//! the whole file.

mod error;
mod loader;
mod schema;
mod zone_file;

pub use error::{Error, Result};
pub use loader::{catalog_to_string, load_catalog, save_catalog, Loader};
pub use schema::{
    AclEntry, ActionList, CatalogFile, DurationValue, RestrictionEntry, ZoneEntry, ZoneFileDoc,
};
pub use zone_file::ZoneFile;

use ron::extensions::Extensions;
use std::fs;
use std::path::Path;

/// RON options shared by every haven document: optional fields may be
/// written bare (`radius: 50.0`) as well as `Some(50.0)`
pub fn ron_options() -> ron::Options {
    ron::Options::default().with_default_extension(Extensions::IMPLICIT_SOME)
}

/// Write `content` next to `path` and rename it into place
pub(crate) fn write_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("ron.tmp");
    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)
}
