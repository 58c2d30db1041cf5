//! Restriction definitions
//!
//! A restriction names a category of player action (what kind of thing, which
//! actions, which targets) plus an optional default-activation policy.

use crate::error::{Error, Result};
use crate::identity::ResourceKey;
use crate::time::PERMANENT;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// What a restriction's targets refer to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RestrictionKind {
    /// Worn items (armor slots). Shares material matching with `Item`.
    Equipment,
    /// Held/dropped items
    Item,
    /// Entity types
    Entity,
    /// Chat commands
    Command,
}

impl RestrictionKind {
    /// Whether targets are material ids
    pub fn targets_materials(&self) -> bool {
        matches!(self, RestrictionKind::Equipment | RestrictionKind::Item)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RestrictionKind::Equipment => "EQUIPMENT",
            RestrictionKind::Item => "ITEM",
            RestrictionKind::Entity => "ENTITY",
            RestrictionKind::Command => "COMMAND",
        }
    }
}

impl fmt::Display for RestrictionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RestrictionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EQUIPMENT" => Ok(RestrictionKind::Equipment),
            "ITEM" => Ok(RestrictionKind::Item),
            "ENTITY" => Ok(RestrictionKind::Entity),
            "COMMAND" => Ok(RestrictionKind::Command),
            _ => Err(Error::InvalidValue {
                key: "kind".to_string(),
                reason: format!("unknown restriction kind '{s}'"),
            }),
        }
    }
}

/// An action a restriction can forbid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RestrictionAction {
    Damage,
    Use,
    Drop,
    Pickup,
    Equip,
    Execute,
}

impl RestrictionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RestrictionAction::Damage => "DAMAGE",
            RestrictionAction::Use => "USE",
            RestrictionAction::Drop => "DROP",
            RestrictionAction::Pickup => "PICKUP",
            RestrictionAction::Equip => "EQUIP",
            RestrictionAction::Execute => "EXECUTE",
        }
    }
}

impl fmt::Display for RestrictionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RestrictionAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DAMAGE" => Ok(RestrictionAction::Damage),
            "USE" => Ok(RestrictionAction::Use),
            "DROP" => Ok(RestrictionAction::Drop),
            "PICKUP" => Ok(RestrictionAction::Pickup),
            "EQUIP" => Ok(RestrictionAction::Equip),
            "EXECUTE" => Ok(RestrictionAction::Execute),
            _ => Err(Error::InvalidValue {
                key: "actions".to_string(),
                reason: format!("unknown action '{s}'"),
            }),
        }
    }
}

/// How a default restriction activates for players without an override
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultWindow {
    /// Never auto-applied
    Never,
    /// Always applied
    Always,
    /// Applied while the player's policy time is below this many seconds
    Until(i64),
}

/// A named restriction loaded from the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestrictionDef {
    /// Unique, case-insensitive name
    pub name: String,
    pub kind: RestrictionKind,
    pub actions: BTreeSet<RestrictionAction>,
    /// Normalized target identifiers (material/entity keys or command names)
    pub targets: BTreeSet<String>,
    /// `-1` permanent, `0` never auto-activated, `>0` seconds of policy time
    pub default_duration_secs: i64,
    pub is_default: bool,
}

impl RestrictionDef {
    /// Create a restriction with no actions, no targets and no default policy
    pub fn new(name: impl Into<String>, kind: RestrictionKind) -> Result<Self> {
        let name = name.into();
        let name = name.trim().to_string();
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(Error::InvalidId(format!("restriction name '{name}'")));
        }
        Ok(Self {
            name,
            kind,
            actions: BTreeSet::new(),
            targets: BTreeSet::new(),
            default_duration_secs: PERMANENT,
            is_default: false,
        })
    }

    /// Add an action
    pub fn with_action(mut self, action: RestrictionAction) -> Self {
        self.actions.insert(action);
        self
    }

    /// Add a target, normalized for this restriction's kind
    pub fn with_target(mut self, raw: &str) -> Result<Self> {
        let target = normalize_target(self.kind, raw)?;
        self.targets.insert(target);
        Ok(self)
    }

    /// Make this a default restriction with the given duration policy
    pub fn as_default(mut self, duration_secs: i64) -> Result<Self> {
        if duration_secs < PERMANENT {
            return Err(Error::InvalidDuration(duration_secs.to_string()));
        }
        self.is_default = true;
        self.default_duration_secs = duration_secs;
        Ok(self)
    }

    /// Whether `name` refers to this restriction
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Whether this restriction covers `action` on `target`
    ///
    /// `target` must already be normalized (a `ResourceKey` string, or a
    /// lower-case command name).
    pub fn covers(&self, action: RestrictionAction, target: &str) -> bool {
        self.actions.contains(&action) && self.targets.contains(target)
    }

    /// The default activation window
    pub fn default_window(&self) -> DefaultWindow {
        if !self.is_default {
            return DefaultWindow::Never;
        }
        match self.default_duration_secs {
            PERMANENT => DefaultWindow::Always,
            0 => DefaultWindow::Never,
            secs => DefaultWindow::Until(secs),
        }
    }
}

/// Normalize a target string for a restriction kind
pub fn normalize_target(kind: RestrictionKind, raw: &str) -> Result<String> {
    match kind {
        RestrictionKind::Command => normalize_command(raw),
        _ => Ok(ResourceKey::parse(raw)?.to_string()),
    }
}

/// Lower-case a command name and strip the leading slash and arguments
pub fn normalize_command(raw: &str) -> Result<String> {
    let name = raw
        .trim()
        .trim_start_matches('/')
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_lowercase();
    if name.is_empty() {
        return Err(Error::InvalidId(format!("command '{raw}'")));
    }
    Ok(name)
}
