//! Operator command surface
//!
//! Lines are parsed into a [`Command`] and then executed against the hub.
//! Parsing only checks shape (argument count, numbers); everything else is
//! validated by the manager or the registry and comes back as a typed error.

use crate::error::{Error, Result};
use crate::hub::Hub;
use haven_core::{
    format_duration, parse_duration, Capability, Location, PlayerId, Point, RestrictionSource,
    Shape, SpawnZone, Toggle, ZoneActionKind, ZoneChange,
};
use std::collections::HashMap;
use std::fmt;

/// Who is running a command
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    pub id: PlayerId,
    /// Where the operator stands; `None` for the console
    pub location: Option<Location>,
}

impl Operator {
    pub fn console() -> Self {
        Self {
            id: PlayerId::CONSOLE,
            location: None,
        }
    }

    pub fn player(id: PlayerId, location: Location) -> Self {
        Self {
            id,
            location: Some(location),
        }
    }

    pub fn is_console(&self) -> bool {
        self.id == PlayerId::CONSOLE
    }

    fn position(&self) -> Result<&Location> {
        self.location.as_ref().ok_or(Error::NoPosition)
    }
}

/// Resolves player names typed by operators
pub trait PlayerDirectory {
    fn resolve(&self, name: &str) -> Option<PlayerId>;
}

/// Name table, falling back to a literal UUID
impl PlayerDirectory for HashMap<String, PlayerId> {
    fn resolve(&self, name: &str) -> Option<PlayerId> {
        self.iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(name))
            .map(|(_, id)| *id)
            .or_else(|| name.parse().ok())
    }
}

/// Text sent back to the operator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    lines: Vec<String>,
}

impl Reply {
    pub fn new(line: impl Into<String>) -> Self {
        Self {
            lines: vec![line.into()],
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines.join("\n"))
    }
}

/// Shape requested by `zone add`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AddShape {
    /// Circle around the operator; `None` uses the configured radius
    Circle(Option<f64>),
    /// Rectangle from the operator's pos1/pos2
    Rect,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ZoneCommand {
    Add { name: String, shape: AddShape },
    Remove { name: String },
    Confirm { name: String, removing: bool },
    Edit { name: String, key: String, value: String },
    Pos1,
    Pos2,
    AddPoint { name: String },
    List,
    Info { name: Option<String> },
    Cancel,
    Playtime { player: Option<String> },
}

/// A parsed operator command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Restrict {
        player: String,
        restriction: String,
        duration: String,
    },
    /// `restriction` of `None` means all of them
    Unrestrict {
        player: String,
        restriction: Option<String>,
    },
    Restrictions { player: Option<String> },
    Reload,
    Zone(ZoneCommand),
}

const USAGE: &str = "commands: restrict, unrestrict, restrictions, reload, zone";
const ZONE_USAGE: &str =
    "zone add|remove|edit|pos1|pos2|addpoint|list|info|cancel|playtime";

fn usage(text: &str) -> Error {
    Error::Usage(text.to_string())
}

impl Command {
    pub fn parse(line: &str) -> Result<Self> {
        let words: Vec<&str> = line.trim().trim_start_matches('/').split_whitespace().collect();
        let Some((head, args)) = words.split_first() else {
            return Err(usage(USAGE));
        };

        match head.to_ascii_lowercase().as_str() {
            "restrict" => match args {
                [player, restriction, duration] => Ok(Command::Restrict {
                    player: player.to_string(),
                    restriction: restriction.to_string(),
                    duration: duration.to_string(),
                }),
                _ => Err(usage("restrict <player> <restriction> <duration>")),
            },
            "unrestrict" => match args {
                [player, target] => Ok(Command::Unrestrict {
                    player: player.to_string(),
                    restriction: (!target.eq_ignore_ascii_case("all")).then(|| target.to_string()),
                }),
                _ => Err(usage("unrestrict <player> <restriction|all>")),
            },
            "restrictions" => match args {
                [] => Ok(Command::Restrictions { player: None }),
                [player] => Ok(Command::Restrictions {
                    player: Some(player.to_string()),
                }),
                _ => Err(usage("restrictions [player]")),
            },
            "reload" => Ok(Command::Reload),
            "zone" => ZoneCommand::parse(args).map(Command::Zone),
            _ => Err(usage(USAGE)),
        }
    }
}

impl ZoneCommand {
    fn parse(args: &[&str]) -> Result<Self> {
        let Some((sub, rest)) = args.split_first() else {
            return Err(usage(ZONE_USAGE));
        };
        let is_confirm = |word: &str| word.eq_ignore_ascii_case("confirm");

        match (sub.to_ascii_lowercase().as_str(), rest) {
            ("add", [name, word]) if is_confirm(*word) => Ok(ZoneCommand::Confirm {
                name: name.to_string(),
                removing: false,
            }),
            ("add", [name]) => Ok(ZoneCommand::Add {
                name: name.to_string(),
                shape: AddShape::Circle(None),
            }),
            ("add", [name, word]) if word.eq_ignore_ascii_case("rect") => Ok(ZoneCommand::Add {
                name: name.to_string(),
                shape: AddShape::Rect,
            }),
            ("add", [name, radius]) => {
                let radius: f64 = radius
                    .parse()
                    .map_err(|_| usage("radius must be a number"))?;
                Ok(ZoneCommand::Add {
                    name: name.to_string(),
                    shape: AddShape::Circle(Some(radius)),
                })
            }
            ("add", _) => Err(usage("zone add <name> [radius|rect] [confirm]")),
            ("remove" | "delete", [name, word]) if is_confirm(*word) => Ok(ZoneCommand::Confirm {
                name: name.to_string(),
                removing: true,
            }),
            ("remove" | "delete", [name]) => Ok(ZoneCommand::Remove {
                name: name.to_string(),
            }),
            ("remove" | "delete", _) => Err(usage("zone remove <name> [confirm]")),
            ("edit", [name, key, value @ ..]) if !value.is_empty() => Ok(ZoneCommand::Edit {
                name: name.to_string(),
                key: key.to_string(),
                value: value.join(" "),
            }),
            ("edit", _) => Err(usage("zone edit <name> <key> <value>")),
            ("pos1", []) => Ok(ZoneCommand::Pos1),
            ("pos2", []) => Ok(ZoneCommand::Pos2),
            ("addpoint", [name]) => Ok(ZoneCommand::AddPoint {
                name: name.to_string(),
            }),
            ("list", []) => Ok(ZoneCommand::List),
            ("info", []) => Ok(ZoneCommand::Info { name: None }),
            ("info", [name]) => Ok(ZoneCommand::Info {
                name: Some(name.to_string()),
            }),
            ("cancel", []) => Ok(ZoneCommand::Cancel),
            ("playtime", []) => Ok(ZoneCommand::Playtime { player: None }),
            ("playtime", [player]) => Ok(ZoneCommand::Playtime {
                player: Some(player.to_string()),
            }),
            _ => Err(usage(ZONE_USAGE)),
        }
    }
}

impl Hub {
    /// Parse and run one operator command line
    pub fn execute(
        &self,
        operator: &Operator,
        players: &dyn PlayerDirectory,
        line: &str,
    ) -> Result<Reply> {
        let command = Command::parse(line)?;
        log::debug!("{} runs {:?}", operator.id, command);
        self.run(operator, players, command)
    }

    pub fn run(
        &self,
        operator: &Operator,
        players: &dyn PlayerDirectory,
        command: Command,
    ) -> Result<Reply> {
        match command {
            Command::Restrict {
                player,
                restriction,
                duration,
            } => {
                let id = resolve(players, &player)?;
                let secs = parse_duration(&duration)?;
                let catalog = self.restrictions.catalog();
                let def = catalog
                    .get(&restriction)
                    .ok_or_else(|| haven_core::Error::NotFound(format!("restriction '{restriction}'")))?;
                if secs == 0 {
                    self.restrictions.remove(id, &def.name)?;
                    return Ok(Reply::new(format!("Removed '{}' from {player}", def.name)));
                }
                self.restrictions.assign(id, &def.name, secs)?;
                Ok(Reply::new(format!(
                    "Restricted {player} with '{}' for {}",
                    def.name,
                    format_duration(secs)
                )))
            }
            Command::Unrestrict {
                player,
                restriction: None,
            } => {
                let id = resolve(players, &player)?;
                let removed = self.restrictions.remove_all(id)?;
                Ok(Reply::new(format!("Removed {removed} restrictions from {player}")))
            }
            Command::Unrestrict {
                player,
                restriction: Some(name),
            } => {
                let id = resolve(players, &player)?;
                if self.restrictions.remove(id, &name)? {
                    Ok(Reply::new(format!("Removed '{name}' from {player}")))
                } else {
                    Ok(Reply::new(format!("{player} has no personal '{name}'")))
                }
            }
            Command::Restrictions { player } => {
                let (id, label) = self.target(operator, players, player)?;
                let active = self.restrictions.list_active(id);
                if active.is_empty() {
                    return Ok(Reply::new(format!("{label} has no active restrictions")));
                }
                let mut reply = Reply::new(format!("Active restrictions of {label}:"));
                for entry in active {
                    let source = match entry.source {
                        RestrictionSource::Personal => "",
                        RestrictionSource::Default => " (default)",
                    };
                    reply.push(format!(
                        "  {}: {}{source}",
                        entry.name,
                        format_duration(entry.remaining_secs)
                    ));
                }
                Ok(reply)
            }
            Command::Reload => {
                let report = self.reload()?;
                Ok(Reply::new(format!(
                    "Reloaded {} restrictions, {} player entries ({} purged), {} zones",
                    self.restrictions.catalog().len(),
                    report.loaded,
                    report.purged,
                    self.zones.len()
                )))
            }
            Command::Zone(zone) => self.run_zone(operator, players, zone),
        }
    }

    fn run_zone(
        &self,
        operator: &Operator,
        players: &dyn PlayerDirectory,
        command: ZoneCommand,
    ) -> Result<Reply> {
        match command {
            ZoneCommand::Add { name, shape } => {
                let (world, shape) = match shape {
                    AddShape::Circle(radius) => {
                        let at = operator.position()?;
                        let center = Point::new(at.x.floor() + 0.5, at.z.floor() + 0.5);
                        let radius = radius.unwrap_or(self.config.zones.default_radius);
                        (at.world.clone(), Shape::circle(center, radius)?)
                    }
                    AddShape::Rect => self.zones.selection(operator.id).rect()?,
                };
                let description = shape.describe();
                self.zones
                    .propose(operator.id, &name, ZoneActionKind::Add { world, shape })?;
                Ok(Reply::new(format!(
                    "Zone '{name}' ({description}) pending. Run 'zone add {name} confirm' within {}",
                    format_duration(self.config.zones.confirm_window_secs)
                )))
            }
            ZoneCommand::Remove { name } => {
                if operator.is_console() {
                    if !self.zones.contains(&name) {
                        return Err(haven_core::Error::NotFound(format!("zone '{name}'")).into());
                    }
                    return Err(usage("the console must run 'zone remove <name> confirm'"));
                }
                self.zones.propose(operator.id, &name, ZoneActionKind::Remove)?;
                Ok(Reply::new(format!(
                    "Removal of '{name}' pending. Run 'zone remove {name} confirm' within {}",
                    format_duration(self.config.zones.confirm_window_secs)
                )))
            }
            ZoneCommand::Confirm {
                name,
                removing: true,
            } if operator.is_console() => {
                let zone = self.zones.remove(&name)?;
                Ok(Reply::new(format!("Zone '{}' removed", zone.name())))
            }
            ZoneCommand::Confirm { name, .. } => match self.zones.confirm(operator.id, &name)? {
                ZoneChange::Added(zone) => Ok(Reply::new(format!(
                    "Zone '{}' created: {}",
                    zone.name(),
                    zone.shape().describe()
                ))),
                ZoneChange::Removed(zone) => {
                    Ok(Reply::new(format!("Zone '{}' removed", zone.name())))
                }
            },
            ZoneCommand::Edit { name, key, value } => {
                let zone = self.zones.edit(&name, &key, &value)?;
                Ok(Reply::new(format!(
                    "Zone '{}' updated: {key} = {value}",
                    zone.name()
                )))
            }
            ZoneCommand::Pos1 => {
                let at = operator.position()?.clone();
                let line = corner_line("pos1", &at);
                self.zones.set_pos1(operator.id, at);
                Ok(Reply::new(line))
            }
            ZoneCommand::Pos2 => {
                let at = operator.position()?.clone();
                let line = corner_line("pos2", &at);
                self.zones.set_pos2(operator.id, at);
                Ok(Reply::new(line))
            }
            ZoneCommand::AddPoint { name } => {
                let zone = self.zones.add_point(&name, operator.position()?)?;
                Ok(Reply::new(format!(
                    "Zone '{}' is now {}",
                    zone.name(),
                    zone.shape().describe()
                )))
            }
            ZoneCommand::List => {
                let snapshot = self.zones.snapshot();
                if snapshot.is_empty() {
                    return Ok(Reply::new("No zones defined"));
                }
                let mut reply = Reply::new(format!("{} zones:", snapshot.len()));
                for zone in snapshot.iter() {
                    reply.push(format!(
                        "  {} [{}] {}",
                        zone.name(),
                        zone.world(),
                        zone.shape().describe()
                    ));
                }
                Ok(reply)
            }
            ZoneCommand::Info { name: None } => Ok(self.zone_module_info(operator)),
            ZoneCommand::Info { name: Some(name) } => {
                let zone = self
                    .zones
                    .get(&name)
                    .ok_or_else(|| haven_core::Error::NotFound(format!("zone '{name}'")))?;
                Ok(describe_zone(&zone))
            }
            ZoneCommand::Cancel => match self.zones.cancel(operator.id) {
                Some(action) => Ok(Reply::new(format!(
                    "Cancelled pending action on '{}'",
                    action.zone_name
                ))),
                None => Ok(Reply::new("Nothing pending")),
            },
            ZoneCommand::Playtime { player } => {
                let (id, label) = self.target(operator, players, player)?;
                let elapsed = self.playtime.elapsed_qualifying_seconds(id);
                let mut reply = Reply::new(format!("{label} playtime: {}", format_duration(elapsed)));
                match self.playtime_bypass_remaining(id) {
                    Some(0) => reply.push("Zone protection no longer applies"),
                    Some(left) => reply.push(format!(
                        "Zone protection lifts in {}",
                        format_duration(left)
                    )),
                    None => {}
                }
                Ok(reply)
            }
        }
    }

    fn zone_module_info(&self, operator: &Operator) -> Reply {
        let zones = &self.config.zones;
        let mut reply = Reply::new(format!(
            "Zones {}: {} defined",
            if zones.enabled { "enabled" } else { "disabled" },
            self.zones.len()
        ));
        if zones.bypass_after_playtime > 0 {
            reply.push(format!(
                "Bypass after {} of playtime",
                format_duration(zones.bypass_after_playtime)
            ));
        } else {
            reply.push("Playtime bypass disabled");
        }
        if let Some(action) = self.zones.pending(operator.id) {
            let verb = match action.kind {
                ZoneActionKind::Add { .. } => "add",
                ZoneActionKind::Remove => "remove",
            };
            reply.push(format!(
                "Pending: {verb} '{}' since {}",
                action.zone_name,
                haven_core::time::format_instant(action.created_at)
            ));
        }
        reply
    }

    /// The named player, or the operator themself
    fn target(
        &self,
        operator: &Operator,
        players: &dyn PlayerDirectory,
        player: Option<String>,
    ) -> Result<(PlayerId, String)> {
        match player {
            Some(name) => Ok((resolve(players, &name)?, name)),
            None if operator.is_console() => Err(usage("the console must name a player")),
            None => Ok((operator.id, "You".to_string())),
        }
    }
}

fn resolve(players: &dyn PlayerDirectory, name: &str) -> Result<PlayerId> {
    players
        .resolve(name)
        .ok_or_else(|| Error::UnknownPlayer(name.to_string()))
}

fn corner_line(corner: &str, at: &Location) -> String {
    format!("{corner} set to {} in {}", Point::new(at.x, at.z), at.world)
}

fn describe_zone(zone: &SpawnZone) -> Reply {
    let mut reply = Reply::new(format!(
        "Zone '{}' in {}: {}",
        zone.name(),
        zone.world(),
        zone.shape().describe()
    ));
    for capability in Capability::ALL {
        let acl = zone.acl(capability);
        if acl.enabled {
            reply.push(format!(
                "  {capability}: {:?} of {} ids",
                acl.mode,
                acl.list.len()
            ));
        } else {
            reply.push(format!("  {capability}: off"));
        }
    }
    let blocked: Vec<&str> = Toggle::ALL
        .iter()
        .filter(|t| zone.blocks(**t))
        .map(|t| t.key())
        .collect();
    if blocked.is_empty() {
        reply.push("  blocks: nothing");
    } else {
        reply.push(format!("  blocks: {}", blocked.join(", ")));
    }
    reply
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HubConfig;
    use haven_core::{
        Catalog, ManualClock, MemoryZoneStore, RestrictionAction, RestrictionDef, RestrictionKind,
    };
    use std::sync::Arc;

    struct Fixture {
        hub: Hub,
        clock: Arc<ManualClock>,
        players: HashMap<String, PlayerId>,
        alice: PlayerId,
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(ManualClock::at(1_000_000));
        let catalog = Catalog::from_defs([
            RestrictionDef::new("muted", RestrictionKind::Command)
                .unwrap()
                .with_action(RestrictionAction::Execute)
                .with_target("msg")
                .unwrap(),
            RestrictionDef::new("newbie", RestrictionKind::Item)
                .unwrap()
                .with_action(RestrictionAction::Use)
                .with_target("lava_bucket")
                .unwrap()
                .as_default(3_600)
                .unwrap(),
        ])
        .unwrap();
        let hub = Hub::builder(HubConfig::default())
            .catalog(catalog)
            .zone_store(Arc::new(MemoryZoneStore::new()))
            .clock(clock.clone())
            .build();
        let alice = PlayerId::random();
        let players = HashMap::from([("Alice".to_string(), alice)]);
        Fixture {
            hub,
            clock,
            players,
            alice,
        }
    }

    fn admin() -> Operator {
        Operator::player(PlayerId::random(), Location::new("world", 10.3, 64.0, -4.7))
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            Command::parse("/unrestrict bob ALL").unwrap(),
            Command::Unrestrict {
                player: "bob".to_string(),
                restriction: None
            }
        );
        assert_eq!(
            Command::parse("zone add spawn 50").unwrap(),
            Command::Zone(ZoneCommand::Add {
                name: "spawn".to_string(),
                shape: AddShape::Circle(Some(50.0))
            })
        );
        assert_eq!(
            Command::parse("zone edit spawn interact.add ender_chest").unwrap(),
            Command::Zone(ZoneCommand::Edit {
                name: "spawn".to_string(),
                key: "interact.add".to_string(),
                value: "ender_chest".to_string()
            })
        );
        assert!(matches!(
            Command::parse("zone add spawn big"),
            Err(Error::Usage(_))
        ));
        assert!(matches!(Command::parse("restrict bob"), Err(Error::Usage(_))));
        assert!(matches!(Command::parse(""), Err(Error::Usage(_))));
    }

    #[test]
    fn test_restrict_and_unrestrict() {
        let f = fixture();
        let console = Operator::console();

        let reply = f.hub.execute(&console, &f.players, "restrict alice muted 1d12h").unwrap();
        assert_eq!(reply.to_string(), "Restricted alice with 'muted' for 1d 12h");
        assert_eq!(f.hub.restrictions().remaining_seconds(f.alice, "muted"), 129_600);

        // zero duration removes
        f.hub.execute(&console, &f.players, "restrict alice muted 0").unwrap();
        assert!(!f.hub.restrictions().is_restricted(f.alice, "muted"));

        f.hub.execute(&console, &f.players, "restrict alice muted -1").unwrap();
        let reply = f.hub.execute(&console, &f.players, "unrestrict alice all").unwrap();
        assert_eq!(reply.to_string(), "Removed 1 restrictions from alice");

        assert!(matches!(
            f.hub.execute(&console, &f.players, "restrict carol muted 1h"),
            Err(Error::UnknownPlayer(_))
        ));
        assert!(matches!(
            f.hub.execute(&console, &f.players, "restrict alice nope 1h"),
            Err(Error::Core(haven_core::Error::NotFound(_)))
        ));
        assert!(matches!(
            f.hub.execute(&console, &f.players, "restrict alice muted soon"),
            Err(Error::Core(haven_core::Error::InvalidDuration(_)))
        ));
    }

    #[test]
    fn test_restrictions_listing() {
        let f = fixture();
        let console = Operator::console();
        f.hub.execute(&console, &f.players, "restrict alice muted 90").unwrap();

        let reply = f.hub.execute(&console, &f.players, "restrictions alice").unwrap();
        assert_eq!(
            reply.lines(),
            [
                "Active restrictions of alice:".to_string(),
                "  muted: 1m".to_string(),
                "  newbie: 1h 0m (default)".to_string(),
            ]
        );
        assert!(matches!(
            f.hub.execute(&console, &f.players, "restrictions"),
            Err(Error::Usage(_))
        ));
    }

    #[test]
    fn test_zone_add_confirm_flow() {
        let f = fixture();
        let op = admin();

        let reply = f.hub.execute(&op, &f.players, "zone add spawn 50").unwrap();
        assert!(reply.to_string().contains("zone add spawn confirm"));
        assert!(f.hub.zones().is_empty());

        assert!(matches!(
            f.hub.execute(&op, &f.players, "zone add other confirm"),
            Err(Error::Core(haven_core::Error::NameMismatch { .. }))
        ));
        f.hub.execute(&op, &f.players, "zone add SPAWN confirm").unwrap();

        let zone = f.hub.zones().get("spawn").unwrap();
        assert_eq!(zone.centroid(), Point::new(10.5, -4.5));
        // protection template: breaking is denied outright
        assert!(zone.acl(Capability::BlockBreak).enabled);

        // the action was consumed
        assert!(matches!(
            f.hub.execute(&op, &f.players, "zone add spawn confirm"),
            Err(Error::Core(haven_core::Error::Expired))
        ));
    }

    #[test]
    fn test_zone_confirm_window() {
        let f = fixture();
        let op = admin();
        f.hub.execute(&op, &f.players, "zone add spawn").unwrap();
        f.clock.advance_secs(31);
        assert!(matches!(
            f.hub.execute(&op, &f.players, "zone add spawn confirm"),
            Err(Error::Core(haven_core::Error::Expired))
        ));
        assert!(f.hub.zones().is_empty());
    }

    #[test]
    fn test_zone_remove() {
        let f = fixture();
        let op = admin();
        f.hub.execute(&op, &f.players, "zone add spawn").unwrap();
        f.hub.execute(&op, &f.players, "zone add spawn confirm").unwrap();

        f.hub.execute(&op, &f.players, "zone remove spawn").unwrap();
        assert!(f.hub.zones().contains("spawn"));
        f.hub.execute(&op, &f.players, "zone remove spawn confirm").unwrap();
        assert!(f.hub.zones().is_empty());

        assert!(matches!(
            f.hub.execute(&op, &f.players, "zone remove spawn"),
            Err(Error::Core(haven_core::Error::NotFound(_)))
        ));
    }

    #[test]
    fn test_console_zone_commands() {
        let f = fixture();
        let console = Operator::console();
        assert!(matches!(
            f.hub.execute(&console, &f.players, "zone add spawn"),
            Err(Error::NoPosition)
        ));

        let op = admin();
        f.hub.execute(&op, &f.players, "zone add spawn").unwrap();
        f.hub.execute(&op, &f.players, "zone add spawn confirm").unwrap();
        assert!(matches!(
            f.hub.execute(&console, &f.players, "zone remove spawn"),
            Err(Error::Usage(_))
        ));
        f.hub.execute(&console, &f.players, "zone remove spawn confirm").unwrap();
        assert!(f.hub.zones().is_empty());
    }

    #[test]
    fn test_zone_rect_edit_and_info() {
        let f = fixture();
        let mut op = admin();
        f.hub.execute(&op, &f.players, "zone pos1").unwrap();
        op.location = Some(Location::new("world", -20.0, 70.0, 30.0));
        f.hub.execute(&op, &f.players, "zone pos2").unwrap();
        f.hub.execute(&op, &f.players, "zone add market rect").unwrap();
        f.hub.execute(&op, &f.players, "zone add market confirm").unwrap();

        f.hub.execute(&op, &f.players, "zone edit market pvp true").unwrap();
        f.hub
            .execute(&op, &f.players, "zone edit market block_break.enabled false")
            .unwrap();
        let zone = f.hub.zones().get("market").unwrap();
        assert!(zone.pvp_blocked);
        assert!(!zone.acl(Capability::BlockBreak).enabled);

        let info = f.hub.execute(&op, &f.players, "zone info market").unwrap();
        assert!(info.lines().contains(&"  block_break: off".to_string()));
        assert!(info.lines().contains(&"  blocks: pvp".to_string()));

        let list = f.hub.execute(&op, &f.players, "zone list").unwrap();
        assert_eq!(list.lines().len(), 2);
    }

    #[test]
    fn test_zone_cancel_and_module_info() {
        let f = fixture();
        let op = admin();
        f.hub.execute(&op, &f.players, "zone add spawn").unwrap();
        let info = f.hub.execute(&op, &f.players, "zone info").unwrap();
        assert!(info.to_string().contains("Pending: add 'spawn'"));

        let reply = f.hub.execute(&op, &f.players, "zone cancel").unwrap();
        assert_eq!(reply.to_string(), "Cancelled pending action on 'spawn'");
        let reply = f.hub.execute(&op, &f.players, "zone cancel").unwrap();
        assert_eq!(reply.to_string(), "Nothing pending");
    }

    #[test]
    fn test_playtime_report() {
        let f = fixture();
        let session = f.hub.session_playtime().unwrap();
        session.set(f.alice, 120);
        let reply = f
            .hub
            .execute(&Operator::console(), &f.players, "zone playtime alice")
            .unwrap();
        assert_eq!(reply.lines(), ["alice playtime: 2m".to_string()]);
    }
}
