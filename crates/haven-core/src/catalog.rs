//! Restriction catalog
//!
//! The set of restriction definitions in force. A catalog is immutable once
//! handed to the state manager; reloads swap in a new one.

use crate::error::{Error, Result};
use crate::restriction::{RestrictionAction, RestrictionDef, RestrictionKind};

/// Ordered collection of restriction definitions with case-insensitive names
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    defs: Vec<RestrictionDef>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from definitions, rejecting duplicate names
    pub fn from_defs(defs: impl IntoIterator<Item = RestrictionDef>) -> Result<Self> {
        let mut catalog = Self::new();
        for def in defs {
            catalog.insert(def)?;
        }
        Ok(catalog)
    }

    /// Add a definition
    pub fn insert(&mut self, def: RestrictionDef) -> Result<()> {
        if self.contains(&def.name) {
            return Err(Error::AlreadyExists(def.name));
        }
        self.defs.push(def);
        Ok(())
    }

    /// Look up by case-insensitive name
    pub fn get(&self, name: &str) -> Option<&RestrictionDef> {
        self.defs.iter().find(|d| d.is_named(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RestrictionDef> {
        self.defs.iter()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Restrictions that could forbid `action` on `target` for the given kinds
    pub fn covering<'a>(
        &'a self,
        kinds: &'a [RestrictionKind],
        action: RestrictionAction,
        target: &'a str,
    ) -> impl Iterator<Item = &'a RestrictionDef> + 'a {
        self.defs
            .iter()
            .filter(move |d| kinds.contains(&d.kind) && d.covers(action, target))
    }

    /// Definitions in save order: defaults first, then by name
    pub fn sorted_for_save(&self) -> Vec<&RestrictionDef> {
        let mut defs: Vec<&RestrictionDef> = self.defs.iter().collect();
        defs.sort_by(|a, b| {
            b.is_default
                .cmp(&a.is_default)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        defs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(name: &str, kind: RestrictionKind) -> RestrictionDef {
        RestrictionDef::new(name, kind).unwrap()
    }

    #[test]
    fn test_case_insensitive_lookup_and_duplicates() {
        let mut catalog = Catalog::new();
        catalog.insert(def("NoElytra", RestrictionKind::Equipment)).unwrap();
        assert!(catalog.get("noelytra").is_some());
        assert_eq!(
            catalog.insert(def("NOELYTRA", RestrictionKind::Item)),
            Err(Error::AlreadyExists("NOELYTRA".to_string()))
        );
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_covering_filters_by_kind() {
        let elytra = def("no_elytra", RestrictionKind::Equipment)
            .with_action(RestrictionAction::Equip)
            .with_target("elytra")
            .unwrap();
        let held = def("no_elytra_item", RestrictionKind::Item)
            .with_action(RestrictionAction::Equip)
            .with_target("elytra")
            .unwrap();
        let catalog = Catalog::from_defs([elytra, held]).unwrap();

        let kinds = [RestrictionKind::Equipment, RestrictionKind::Item];
        let names: Vec<_> = catalog
            .covering(&kinds, RestrictionAction::Equip, "minecraft:elytra")
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(names, ["no_elytra", "no_elytra_item"]);

        let only_item = [RestrictionKind::Item];
        assert_eq!(
            catalog
                .covering(&only_item, RestrictionAction::Equip, "minecraft:elytra")
                .count(),
            1
        );
    }

    #[test]
    fn test_sorted_for_save() {
        let catalog = Catalog::from_defs([
            def("b", RestrictionKind::Item),
            def("z", RestrictionKind::Item).as_default(60).unwrap(),
            def("A", RestrictionKind::Item),
        ])
        .unwrap();
        let order: Vec<_> = catalog.sorted_for_save().iter().map(|d| d.name.clone()).collect();
        assert_eq!(order, ["z", "A", "b"]);
    }
}
