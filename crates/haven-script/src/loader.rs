//! RON restriction catalog loader

use crate::error::{Error, Result};
use crate::schema::{CatalogFile, RestrictionEntry};
use haven_core::Catalog;
use ron::ser::PrettyConfig;
use std::fs;
use std::path::Path;

/// Loader for RON catalog files
///
/// Malformed entries (unknown type or action, bad target id, bad duration,
/// duplicate name) are logged and skipped; only unreadable or unparsable
/// files are errors.
#[derive(Debug, Default)]
pub struct Loader {
    catalog: Catalog,
    skipped: usize,
}

impl Loader {
    /// Create a new loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a single RON file
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let loaded = self.load_str(&content)?;
        log::info!("Loaded {loaded} restrictions from {}", path.display());
        Ok(loaded)
    }

    /// Load restrictions from a RON string, returning how many were accepted
    pub fn load_str(&mut self, content: &str) -> Result<usize> {
        let file: CatalogFile = crate::ron_options().from_str(content)?;
        let mut loaded = 0;
        for entry in file.restrictions {
            let def = match entry.to_def() {
                Ok(def) => def,
                Err(e) => {
                    log::warn!("Skipping restriction '{}': {e}", entry.name);
                    self.skipped += 1;
                    continue;
                }
            };
            if let Err(e) = self.catalog.insert(def) {
                log::warn!("Skipping restriction '{}': {e}", entry.name);
                self.skipped += 1;
                continue;
            }
            loaded += 1;
        }
        Ok(loaded)
    }

    /// Load all RON files from a directory
    pub fn load_directory(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();

        if !path.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Not a directory: {:?}", path),
            )));
        }

        let mut entries: Vec<_> = fs::read_dir(path)?.collect::<std::io::Result<_>>()?;
        entries.sort_by_key(|e| e.path());

        let mut loaded = 0;
        for entry in entries {
            let file_path = entry.path();
            if file_path.extension().map(|e| e == "ron").unwrap_or(false) {
                loaded += self.load_file(&file_path)?;
            } else if file_path.is_dir() {
                loaded += self.load_directory(&file_path)?;
            }
        }
        Ok(loaded)
    }

    /// Entries rejected so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn into_catalog(self) -> Catalog {
        self.catalog
    }
}

/// Load a catalog file in one call
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog> {
    let mut loader = Loader::new();
    loader.load_file(path)?;
    Ok(loader.into_catalog())
}

/// Render a catalog as RON, defaults first and then by name
pub fn catalog_to_string(catalog: &Catalog) -> Result<String> {
    let file = CatalogFile {
        restrictions: catalog
            .sorted_for_save()
            .into_iter()
            .map(RestrictionEntry::from_def)
            .collect(),
    };
    Ok(ron::ser::to_string_pretty(&file, PrettyConfig::new())?)
}

/// Write a catalog file
pub fn save_catalog(path: impl AsRef<Path>, catalog: &Catalog) -> Result<()> {
    let path = path.as_ref();
    crate::write_atomic(path, &catalog_to_string(catalog)?)?;
    log::info!("Saved {} restrictions to {}", catalog.len(), path.display());
    Ok(())
}
