//! A named protected zone

use super::acl::{Acl, AclMode, Capability, Toggle};
use super::shape::{Point, Shape};
use crate::error::{Error, Result};
use crate::identity::{Location, ResourceKey, WorldId};

/// Utility blocks that stay usable inside a freshly created zone
const DEFAULT_INTERACT_ALLOWED: [&str; 11] = [
    "ender_chest",
    "crafting_table",
    "enchanting_table",
    "anvil",
    "chipped_anvil",
    "damaged_anvil",
    "smithing_table",
    "grindstone",
    "stonecutter",
    "cartography_table",
    "loom",
];

/// Traders listed (but not enforced) in a fresh zone's entity ACL
const DEFAULT_ENTITY_LIST: [&str; 2] = ["villager", "wandering_trader"];

/// A named region of one world with its own protection rules
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnZone {
    name: String,
    world: WorldId,
    shape: Shape,
    pub block_break: Acl,
    pub block_place: Acl,
    pub interact: Acl,
    pub entity_interact: Acl,
    pub pvp_blocked: bool,
    pub explosions_blocked: bool,
    pub fire_spread_blocked: bool,
}

impl SpawnZone {
    /// A zone with every ACL disabled and nothing blocked
    pub fn new(name: impl Into<String>, world: impl Into<WorldId>, shape: Shape) -> Result<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(Error::InvalidId(format!("zone name '{name}'")));
        }
        Ok(Self {
            name,
            world: world.into(),
            shape,
            block_break: Acl::disabled(),
            block_place: Acl::disabled(),
            interact: Acl::disabled(),
            entity_interact: Acl::disabled(),
            pvp_blocked: false,
            explosions_blocked: false,
            fire_spread_blocked: false,
        })
    }

    /// A zone with the protection template used by the add-zone workflow:
    /// breaking and placing denied outright, interaction limited to utility
    /// blocks, entity interaction unrestricted, toggles off.
    pub fn with_default_protections(
        name: impl Into<String>,
        world: impl Into<WorldId>,
        shape: Shape,
    ) -> Result<Self> {
        let mut zone = Self::new(name, world, shape)?;
        zone.block_break = Acl::whitelist([]);
        zone.block_place = Acl::whitelist([]);
        zone.interact = Acl::whitelist(keys(&DEFAULT_INTERACT_ALLOWED));
        zone.entity_interact = Acl {
            enabled: false,
            mode: AclMode::Whitelist,
            list: keys(&DEFAULT_ENTITY_LIST).collect(),
        };
        Ok(zone)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn world(&self) -> &WorldId {
        &self.world
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn shape_mut(&mut self) -> &mut Shape {
        &mut self.shape
    }

    /// Point containment; a different world is never contained
    pub fn contains(&self, world: &WorldId, x: f64, z: f64) -> bool {
        if &self.world != world {
            return false;
        }
        self.shape.contains(x, z)
    }

    pub fn contains_location(&self, location: &Location) -> bool {
        self.contains(&location.world, location.x, location.z)
    }

    pub fn centroid(&self) -> Point {
        self.shape.centroid()
    }

    pub fn acl(&self, capability: Capability) -> &Acl {
        match capability {
            Capability::BlockBreak => &self.block_break,
            Capability::BlockPlace => &self.block_place,
            Capability::Interact => &self.interact,
            Capability::EntityInteract => &self.entity_interact,
        }
    }

    pub fn acl_mut(&mut self, capability: Capability) -> &mut Acl {
        match capability {
            Capability::BlockBreak => &mut self.block_break,
            Capability::BlockPlace => &mut self.block_place,
            Capability::Interact => &mut self.interact,
            Capability::EntityInteract => &mut self.entity_interact,
        }
    }

    /// ACL decision for one category
    pub fn allows(&self, capability: Capability, id: &ResourceKey) -> bool {
        self.acl(capability).allows(id)
    }

    pub fn blocks(&self, toggle: Toggle) -> bool {
        match toggle {
            Toggle::Pvp => self.pvp_blocked,
            Toggle::Explosions => self.explosions_blocked,
            Toggle::FireSpread => self.fire_spread_blocked,
        }
    }

    pub fn set_blocked(&mut self, toggle: Toggle, blocked: bool) {
        match toggle {
            Toggle::Pvp => self.pvp_blocked = blocked,
            Toggle::Explosions => self.explosions_blocked = blocked,
            Toggle::FireSpread => self.fire_spread_blocked = blocked,
        }
    }

    /// Apply one `key value` edit.
    ///
    /// Keys: `world`, `radius`, `center` (`x,z`), `bounds` (`x1,z1,x2,z2`),
    /// a toggle name (`pvp`, `explosions`, `fire_spread`) with a boolean, or
    /// `<category>.enabled|mode|add|remove`.
    pub fn apply_edit(&mut self, key: &str, value: &str) -> Result<()> {
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();

        if let Some(toggle) = Toggle::from_key(&key) {
            self.set_blocked(toggle, parse_bool(&key, value)?);
            return Ok(());
        }

        if let Some((category, field)) = key.split_once('.') {
            let capability = Capability::from_key(category).ok_or_else(|| unknown_key(&key))?;
            let acl = self.acl_mut(capability);
            match field {
                "enabled" => acl.enabled = parse_bool(&key, value)?,
                "mode" => acl.mode = value.parse()?,
                "add" => {
                    acl.list.insert(ResourceKey::parse(value)?);
                }
                "remove" => {
                    let id = ResourceKey::parse(value)?;
                    if !acl.list.remove(&id) {
                        return Err(Error::NotFound(format!("{id} in {capability}")));
                    }
                }
                _ => return Err(unknown_key(&key)),
            }
            return Ok(());
        }

        match key.as_str() {
            "world" => {
                if value.is_empty() {
                    return Err(invalid(&key, "world name is empty"));
                }
                self.world = WorldId::new(value);
            }
            "radius" => {
                let radius = parse_f64(&key, value)?;
                match &mut self.shape {
                    Shape::Circle(circle) => circle.set_radius(radius)?,
                    _ => return Err(Error::InvalidShape("radius applies to circles only".to_string())),
                }
            }
            "center" => {
                let coords = parse_coords(&key, value, 2)?;
                match &mut self.shape {
                    Shape::Circle(circle) => circle.set_center(Point::new(coords[0], coords[1]))?,
                    _ => return Err(Error::InvalidShape("center applies to circles only".to_string())),
                }
            }
            "bounds" => {
                let c = parse_coords(&key, value, 4)?;
                match &mut self.shape {
                    Shape::Rect(rect) => {
                        rect.set_corners(Point::new(c[0], c[1]), Point::new(c[2], c[3]))?
                    }
                    _ => return Err(Error::InvalidShape("bounds applies to rectangles only".to_string())),
                }
            }
            _ => return Err(unknown_key(&key)),
        }
        Ok(())
    }
}

fn keys<'a>(names: &'a [&'a str]) -> impl Iterator<Item = ResourceKey> + 'a {
    names.iter().filter_map(|n| ResourceKey::parse(n).ok())
}

fn unknown_key(key: &str) -> Error {
    Error::NotFound(format!("edit key '{key}'"))
}

fn invalid(key: &str, reason: impl Into<String>) -> Error {
    Error::InvalidValue {
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" => Ok(true),
        "false" | "off" | "no" => Ok(false),
        _ => Err(invalid(key, format!("expected true/false, got '{value}'"))),
    }
}

fn parse_f64(key: &str, value: &str) -> Result<f64> {
    value
        .parse::<f64>()
        .map_err(|_| invalid(key, format!("expected a number, got '{value}'")))
}

fn parse_coords(key: &str, value: &str, count: usize) -> Result<Vec<f64>> {
    let coords = value
        .split(',')
        .map(|part| parse_f64(key, part.trim()))
        .collect::<Result<Vec<_>>>()?;
    if coords.len() != count {
        return Err(invalid(key, format!("expected {count} comma-separated numbers")));
    }
    Ok(coords)
}
