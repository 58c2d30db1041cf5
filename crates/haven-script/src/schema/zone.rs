//! Zone file schema
//!
//! ```ron
//! (
//!     zones: [
//!         (
//!             name: "spawn",
//!             world: "world",
//!             type: "CIRCLE",
//!             center: (0.0, 0.0),
//!             radius: 50.0,
//!             block_break: (enabled: true, mode: "WHITELIST", list: []),
//!             pvp: true,
//!         ),
//!     ],
//! )
//! ```

use haven_core::{
    Acl, AclMode, Error as CoreError, Point, ResourceKey, Shape, SpawnZone,
};
use serde::{Deserialize, Serialize};

/// A whole zone file, zones in registration order
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ZoneFileDoc {
    #[serde(default)]
    pub zones: Vec<ZoneEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AclEntry {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default)]
    pub list: Vec<String>,
}

fn default_mode() -> String {
    "BLACKLIST".to_string()
}

impl Default for AclEntry {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: default_mode(),
            list: Vec::new(),
        }
    }
}

impl AclEntry {
    /// Convert, skipping (with a warning) ids that do not parse
    pub fn to_acl(&self, zone: &str, category: &str) -> haven_core::Result<Acl> {
        let mode: AclMode = self.mode.parse()?;
        let mut list = std::collections::BTreeSet::new();
        for raw in &self.list {
            match ResourceKey::parse(raw) {
                Ok(id) => {
                    list.insert(id);
                }
                Err(e) => log::warn!("Zone '{zone}' {category}: skipping id '{raw}': {e}"),
            }
        }
        Ok(Acl {
            enabled: self.enabled,
            mode,
            list,
        })
    }

    pub fn from_acl(acl: &Acl) -> Self {
        Self {
            enabled: acl.enabled,
            mode: match acl.mode {
                AclMode::Whitelist => "WHITELIST".to_string(),
                AclMode::Blacklist => "BLACKLIST".to_string(),
            },
            list: acl.list.iter().map(|k| k.as_str().to_string()).collect(),
        }
    }
}

/// One zone as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneEntry {
    pub name: String,
    pub world: String,
    /// CIRCLE, RECT or POLY
    #[serde(rename = "type")]
    pub shape_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<(f64, f64)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<(f64, f64)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<(f64, f64)>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<(f64, f64)>,
    #[serde(default)]
    pub block_break: AclEntry,
    #[serde(default)]
    pub block_place: AclEntry,
    #[serde(default)]
    pub interact: AclEntry,
    #[serde(default)]
    pub entity_interact: AclEntry,
    #[serde(default)]
    pub pvp: bool,
    #[serde(default)]
    pub explosions: bool,
    #[serde(default)]
    pub fire_spread: bool,
}

fn point((x, z): (f64, f64)) -> Point {
    Point::new(x, z)
}

fn missing(zone: &str, field: &str) -> CoreError {
    CoreError::InvalidShape(format!("zone '{zone}' is missing '{field}'"))
}

impl ZoneEntry {
    fn shape(&self) -> haven_core::Result<Shape> {
        let name = self.name.as_str();
        match self.shape_type.trim().to_ascii_uppercase().as_str() {
            "CIRCLE" => Shape::circle(
                point(self.center.ok_or_else(|| missing(name, "center"))?),
                self.radius.ok_or_else(|| missing(name, "radius"))?,
            ),
            "RECT" => Shape::rect(
                point(self.min.ok_or_else(|| missing(name, "min"))?),
                point(self.max.ok_or_else(|| missing(name, "max"))?),
            ),
            "POLY" | "POLYGON" => Shape::polygon(self.points.iter().copied().map(point).collect()),
            other => Err(CoreError::InvalidShape(format!(
                "zone '{name}' has unknown type '{other}'"
            ))),
        }
    }

    /// Validate and build the zone
    pub fn to_zone(&self) -> haven_core::Result<SpawnZone> {
        let name = self.name.as_str();
        let mut zone = SpawnZone::new(name, self.world.as_str(), self.shape()?)?;
        zone.block_break = self.block_break.to_acl(name, "block_break")?;
        zone.block_place = self.block_place.to_acl(name, "block_place")?;
        zone.interact = self.interact.to_acl(name, "interact")?;
        zone.entity_interact = self.entity_interact.to_acl(name, "entity_interact")?;
        zone.pvp_blocked = self.pvp;
        zone.explosions_blocked = self.explosions;
        zone.fire_spread_blocked = self.fire_spread;
        Ok(zone)
    }

    pub fn from_zone(zone: &SpawnZone) -> Self {
        let mut entry = Self {
            name: zone.name().to_string(),
            world: zone.world().as_str().to_string(),
            shape_type: zone.shape().shape_type().as_str().to_string(),
            center: None,
            radius: None,
            min: None,
            max: None,
            points: Vec::new(),
            block_break: AclEntry::from_acl(&zone.block_break),
            block_place: AclEntry::from_acl(&zone.block_place),
            interact: AclEntry::from_acl(&zone.interact),
            entity_interact: AclEntry::from_acl(&zone.entity_interact),
            pvp: zone.pvp_blocked,
            explosions: zone.explosions_blocked,
            fire_spread: zone.fire_spread_blocked,
        };
        match zone.shape() {
            Shape::Circle(c) => {
                entry.center = Some((c.center().x, c.center().z));
                entry.radius = Some(c.radius());
            }
            Shape::Rect(r) => {
                entry.min = Some((r.min().x, r.min().z));
                entry.max = Some((r.max().x, r.max().z));
            }
            Shape::Polygon(p) => {
                entry.points = p.points().iter().map(|pt| (pt.x, pt.z)).collect();
            }
        }
        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haven_core::{Capability, WorldId};

    #[test]
    fn test_circle_entry() {
        let entry: ZoneEntry = crate::ron_options().from_str(
            r#"(
                name: "spawn",
                world: "world",
                type: "CIRCLE",
                center: (0.0, 0.0),
                radius: 50.0,
                block_break: (enabled: true, mode: "WHITELIST", list: []),
                pvp: true,
            )"#,
        )
        .unwrap();
        let zone = entry.to_zone().unwrap();
        let world = WorldId::new("world");
        assert!(zone.contains(&world, 50.0, 0.0));
        assert!(zone.pvp_blocked);
        assert!(!zone.allows(Capability::BlockBreak, &ResourceKey::parse("stone").unwrap()));
        assert!(!zone.block_place.enabled);
        assert_eq!(zone.block_place.mode, AclMode::Blacklist);
    }

    #[test]
    fn test_bad_ids_are_skipped() {
        let entry: ZoneEntry = crate::ron_options().from_str(
            r#"(
                name: "market",
                world: "world",
                type: "RECT",
                min: (10.0, 10.0),
                max: (-10.0, -10.0),
                interact: (enabled: true, mode: "WHITELIST", list: ["chest", "Bad Id!"]),
            )"#,
        )
        .unwrap();
        let zone = entry.to_zone().unwrap();
        assert_eq!(zone.interact.list.len(), 1);
        assert!(zone.contains(&WorldId::new("world"), 0.0, 0.0));
    }

    #[test]
    fn test_invalid_shapes() {
        let poly: ZoneEntry = crate::ron_options().from_str(
            r#"(name: "p", world: "world", type: "POLY", points: [(0.0, 0.0), (1.0, 1.0)])"#,
        )
        .unwrap();
        assert!(matches!(poly.to_zone(), Err(CoreError::InvalidShape(_))));

        let radius: ZoneEntry = crate::ron_options().from_str(
            r#"(name: "c", world: "world", type: "CIRCLE", center: (0.0, 0.0), radius: 20000.0)"#,
        )
        .unwrap();
        assert!(radius.to_zone().is_err());

        let kind: ZoneEntry =
            crate::ron_options().from_str(r#"(name: "h", world: "world", type: "HEXAGON")"#).unwrap();
        assert!(kind.to_zone().is_err());
    }

    #[test]
    fn test_from_zone_round_trip() {
        let zone = SpawnZone::with_default_protections(
            "plaza",
            "world",
            Shape::polygon(vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(5.0, 8.0),
            ])
            .unwrap(),
        )
        .unwrap();
        let entry = ZoneEntry::from_zone(&zone);
        assert_eq!(entry.shape_type, "POLY");
        assert_eq!(entry.points.len(), 3);
        assert_eq!(entry.to_zone().unwrap(), zone);
    }
}
