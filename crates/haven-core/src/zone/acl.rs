//! Capability ACLs and hard-block toggles

use crate::error::{Error, Result};
use crate::identity::ResourceKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// How an ACL list is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AclMode {
    /// Only listed ids are allowed
    Whitelist,
    /// Listed ids are denied
    #[default]
    Blacklist,
}

impl FromStr for AclMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "whitelist" => Ok(AclMode::Whitelist),
            "blacklist" => Ok(AclMode::Blacklist),
            _ => Err(Error::InvalidValue {
                key: "mode".to_string(),
                reason: format!("expected WHITELIST or BLACKLIST, got '{s}'"),
            }),
        }
    }
}

/// Decide one ACL question.
///
/// Disabled ACLs allow everything; otherwise the id is allowed iff its
/// membership matches the mode.
pub fn allowed(enabled: bool, mode: AclMode, list: &BTreeSet<ResourceKey>, id: &ResourceKey) -> bool {
    if !enabled {
        return true;
    }
    (mode == AclMode::Whitelist) == list.contains(id)
}

/// One action category's ACL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Acl {
    pub enabled: bool,
    pub mode: AclMode,
    pub list: BTreeSet<ResourceKey>,
}

impl Acl {
    /// An ACL that allows everything
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Enabled whitelist
    pub fn whitelist(list: impl IntoIterator<Item = ResourceKey>) -> Self {
        Self {
            enabled: true,
            mode: AclMode::Whitelist,
            list: list.into_iter().collect(),
        }
    }

    /// Enabled blacklist
    pub fn blacklist(list: impl IntoIterator<Item = ResourceKey>) -> Self {
        Self {
            enabled: true,
            mode: AclMode::Blacklist,
            list: list.into_iter().collect(),
        }
    }

    pub fn allows(&self, id: &ResourceKey) -> bool {
        allowed(self.enabled, self.mode, &self.list, id)
    }
}

/// ACL-governed action categories inside a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    BlockBreak,
    BlockPlace,
    Interact,
    EntityInteract,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::BlockBreak,
        Capability::BlockPlace,
        Capability::Interact,
        Capability::EntityInteract,
    ];

    /// Key used in zone files and edit commands
    pub fn key(&self) -> &'static str {
        match self {
            Capability::BlockBreak => "block_break",
            Capability::BlockPlace => "block_place",
            Capability::Interact => "interact",
            Capability::EntityInteract => "entity_interact",
        }
    }

    /// Parse a key, accepting `-` in place of `_`
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|c| c.key() == key)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Unconditional "block when set" switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Toggle {
    Pvp,
    Explosions,
    FireSpread,
}

impl Toggle {
    pub const ALL: [Toggle; 3] = [Toggle::Pvp, Toggle::Explosions, Toggle::FireSpread];

    pub fn key(&self) -> &'static str {
        match self {
            Toggle::Pvp => "pvp",
            Toggle::Explosions => "explosions",
            Toggle::FireSpread => "fire_spread",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|t| t.key() == key)
    }
}

impl fmt::Display for Toggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
