//! Zone persistence in a RON document

use crate::error::Result;
use crate::schema::{ZoneEntry, ZoneFileDoc};
use haven_core::{SpawnZone, ZoneStore};
use ron::ser::PrettyConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// Zone set stored as one RON file
///
/// A missing file reads as no zones. Entries that fail validation are
/// logged and skipped. Saves replace the file atomically.
#[derive(Debug, Clone)]
pub struct ZoneFile {
    path: PathBuf,
}

impl ZoneFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse a zone document
    pub fn parse(content: &str) -> Result<Vec<SpawnZone>> {
        let doc: ZoneFileDoc = crate::ron_options().from_str(content)?;
        let mut zones = Vec::with_capacity(doc.zones.len());
        for entry in doc.zones {
            match entry.to_zone() {
                Ok(zone) => zones.push(zone),
                Err(e) => log::warn!("Skipping zone '{}': {e}", entry.name),
            }
        }
        Ok(zones)
    }

    /// Render zones as a zone document
    pub fn render(zones: &[&SpawnZone]) -> Result<String> {
        let doc = ZoneFileDoc {
            zones: zones.iter().map(|z| ZoneEntry::from_zone(z)).collect(),
        };
        Ok(ron::ser::to_string_pretty(&doc, PrettyConfig::new())?)
    }

    fn read(&self) -> Result<Vec<SpawnZone>> {
        if !self.path.exists() {
            log::info!("No zone file at {}, starting empty", self.path.display());
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        Self::parse(&content)
    }

    fn write(&self, zones: &[&SpawnZone]) -> Result<()> {
        crate::write_atomic(&self.path, &Self::render(zones)?)?;
        log::debug!("Saved {} zones to {}", zones.len(), self.path.display());
        Ok(())
    }
}

impl ZoneStore for ZoneFile {
    fn load(&self) -> haven_core::Result<Vec<SpawnZone>> {
        Ok(self.read()?)
    }

    fn save(&self, zones: &[&SpawnZone]) -> haven_core::Result<()> {
        Ok(self.write(zones)?)
    }
}
