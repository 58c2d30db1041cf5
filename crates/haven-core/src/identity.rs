//! Identity types for players, worlds and game resources

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a player (also used for operators)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    /// The server console acting as an operator
    pub const CONSOLE: PlayerId = PlayerId(Uuid::nil());

    /// Create a new player ID
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a random player ID
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the raw UUID
    pub fn raw(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PlayerId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| Error::InvalidId(format!("{s}: {e}")))
    }
}

/// Name of a world/level. Compared exactly (case-sensitive).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorldId(pub String);

impl WorldId {
    /// Create a new world ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for WorldId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for WorldId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Namespaced identifier for a material or entity type, e.g. `minecraft:stone`.
///
/// Parsing accepts bare names and legacy upper-case enum names:
/// `ENDER_CHEST` and `ender_chest` both become `minecraft:ender_chest`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceKey(String);

impl ResourceKey {
    /// Namespace assumed when none is given
    pub const DEFAULT_NAMESPACE: &'static str = "minecraft";

    /// Parse and normalize a key
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let (namespace, path) = match trimmed.split_once(':') {
            Some((ns, path)) => (ns, path),
            None => (Self::DEFAULT_NAMESPACE, trimmed),
        };
        let namespace = namespace.to_ascii_lowercase();
        let path = path.to_ascii_lowercase();

        let ns_ok = !namespace.is_empty()
            && namespace
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "_-.".contains(c));
        let path_ok = !path.is_empty()
            && path
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "_-./".contains(c));
        if !ns_ok || !path_ok {
            return Err(Error::InvalidId(raw.to_string()));
        }

        Ok(Self(format!("{namespace}:{path}")))
    }

    /// Get the full key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part after the namespace
    pub fn path(&self) -> &str {
        self.0.split_once(':').map(|(_, p)| p).unwrap_or(&self.0)
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ResourceKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ResourceKey {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<ResourceKey> for String {
    fn from(key: ResourceKey) -> Self {
        key.0
    }
}

/// A position inside a world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub world: WorldId,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Location {
    /// Create a new location
    pub fn new(world: impl Into<WorldId>, x: f64, y: f64, z: f64) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
        }
    }
}
