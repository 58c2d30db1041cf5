//! Outcome of an action check

use crate::time::format_duration;
use crate::zone::{Capability, Toggle};
use std::fmt;

/// Which zone rule produced a denial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneRule {
    Capability(Capability),
    Toggle(Toggle),
}

impl fmt::Display for ZoneRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneRule::Capability(c) => write!(f, "{c}"),
            ZoneRule::Toggle(t) => write!(f, "{t}"),
        }
    }
}

/// Why an action was denied, with enough detail for player feedback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    /// A restriction currently applies; `remaining_secs` is `-1` when permanent
    Restriction { name: String, remaining_secs: i64 },
    /// A zone rule blocks the action
    Zone { zone: String, rule: ZoneRule },
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Denial::Restriction {
                name,
                remaining_secs,
            } => write!(
                f,
                "restricted by '{name}' ({})",
                format_duration(*remaining_secs)
            ),
            Denial::Zone { zone, rule } => write!(f, "protected by zone '{zone}' ({rule})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Decision {
    #[default]
    Allow,
    Deny(Denial),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn is_denied(&self) -> bool {
        !self.is_allowed()
    }

    pub fn denial(&self) -> Option<&Denial> {
        match self {
            Decision::Allow => None,
            Decision::Deny(d) => Some(d),
        }
    }

    /// Keep a denial, otherwise evaluate `next`
    pub fn or_else(self, next: impl FnOnce() -> Decision) -> Decision {
        match self {
            Decision::Allow => next(),
            deny => deny,
        }
    }
}

impl From<Option<Denial>> for Decision {
    fn from(denial: Option<Denial>) -> Self {
        denial.map_or(Decision::Allow, Decision::Deny)
    }
}
