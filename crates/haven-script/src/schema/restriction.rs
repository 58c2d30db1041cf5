//! Restriction catalog schema

use haven_core::{
    parse_duration, Error as CoreError, RestrictionAction, RestrictionDef, RestrictionKind,
    PERMANENT,
};
use serde::{Deserialize, Serialize};

/// A whole catalog file
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CatalogFile {
    pub restrictions: Vec<RestrictionEntry>,
}

/// Actions as either `"USE,DROP"` or `["USE", "DROP"]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionList {
    Csv(String),
    List(Vec<String>),
}

impl Default for ActionList {
    fn default() -> Self {
        ActionList::List(Vec::new())
    }
}

impl ActionList {
    fn names(&self) -> Vec<&str> {
        match self {
            ActionList::Csv(s) => s.split(',').map(str::trim).filter(|s| !s.is_empty()).collect(),
            ActionList::List(v) => v.iter().map(String::as_str).collect(),
        }
    }
}

/// Seconds as a number, or the operator duration grammar (`"1d12h"`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(i64),
    Text(String),
}

impl Default for DurationValue {
    fn default() -> Self {
        DurationValue::Seconds(PERMANENT)
    }
}

impl DurationValue {
    pub fn seconds(&self) -> haven_core::Result<i64> {
        match self {
            DurationValue::Seconds(s) if *s >= PERMANENT => Ok(*s),
            DurationValue::Seconds(s) => Err(CoreError::InvalidDuration(s.to_string())),
            DurationValue::Text(t) => parse_duration(t),
        }
    }
}

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestrictionEntry {
    pub name: String,
    /// EQUIPMENT, ITEM, ENTITY or COMMAND
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub actions: ActionList,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub item: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entity: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
    /// Default window: `-1` permanent, `0` never, otherwise seconds
    #[serde(default)]
    pub time: DurationValue,
    #[serde(default)]
    pub default: bool,
}

impl RestrictionEntry {
    /// Validate and convert into a catalog definition
    pub fn to_def(&self) -> haven_core::Result<RestrictionDef> {
        let kind: RestrictionKind = self.kind.parse()?;
        let mut def = RestrictionDef::new(self.name.as_str(), kind)?;
        for action in self.actions.names() {
            def = def.with_action(action.parse::<RestrictionAction>()?);
        }

        let targets = match kind {
            RestrictionKind::Equipment | RestrictionKind::Item => &self.item,
            RestrictionKind::Entity => &self.entity,
            RestrictionKind::Command => &self.command,
        };
        for target in targets {
            def = def.with_target(target)?;
        }

        let time = self.time.seconds()?;
        if self.default {
            def = def.as_default(time)?;
        } else {
            def.default_duration_secs = time;
        }
        Ok(def)
    }

    /// Render a catalog definition back into file form
    pub fn from_def(def: &RestrictionDef) -> Self {
        let targets: Vec<String> = def.targets.iter().cloned().collect();
        let (item, entity, command) = match def.kind {
            RestrictionKind::Equipment | RestrictionKind::Item => (targets, vec![], vec![]),
            RestrictionKind::Entity => (vec![], targets, vec![]),
            RestrictionKind::Command => (vec![], vec![], targets),
        };
        Self {
            name: def.name.clone(),
            kind: def.kind.as_str().to_string(),
            actions: ActionList::List(def.actions.iter().map(|a| a.as_str().to_string()).collect()),
            item,
            entity,
            command,
            time: DurationValue::Seconds(def.default_duration_secs),
            default: def.is_default,
        }
    }
}
