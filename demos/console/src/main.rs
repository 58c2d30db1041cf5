//! Haven Console
//!
//! Runs the hub against the files named in a RON config and reads commands
//! from stdin. Operator commands (`restrict`, `zone add spawn`, ...) run as an
//! in-world admin whose position is set with `tp`. A few extra verbs simulate
//! host events:
//!
//! ```text
//! join <name>                        register a player
//! leave <name>                       drop a player
//! tp <world> <x> <z>                 move the admin
//! playtime <name> <secs>             set a player's session playtime
//! check break <name> <world> <x> <z> <block>
//! check interact <name> <world> <x> <z> <block>
//! check cmd <name> <command line...>
//! check use <name> <item>
//! check pvp <attacker> <victim> <world> <x> <z>
//! check explosion <world> <x> <z>
//! quit
//! ```

use haven_core::{Decision, Location, PlayerId, ResourceKey};
use haven_hub::{Actor, Hub, HubConfig, Operator};
use std::collections::HashMap;
use tokio::io::{AsyncBufReadExt, BufReader};

struct Console {
    hub: Hub,
    players: HashMap<String, PlayerId>,
    admin: Operator,
}

impl Console {
    fn new(hub: Hub) -> Self {
        let admin = Operator::player(PlayerId::random(), Location::new("world", 0.0, 64.0, 0.0));
        Self {
            hub,
            players: HashMap::new(),
            admin,
        }
    }

    fn handle(&mut self, line: &str) -> Result<String, Box<dyn std::error::Error>> {
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            ["join", name] => {
                let id = *self
                    .players
                    .entry(name.to_string())
                    .or_insert_with(PlayerId::random);
                Ok(format!("{name} is {id}"))
            }
            ["leave", name] => {
                let id = self.player(name)?;
                self.players.remove(*name);
                self.hub.player_quit(id);
                Ok(format!("{name} left"))
            }
            ["tp", world, x, z] => {
                self.admin.location = Some(Location::new(*world, x.parse()?, 64.0, z.parse()?));
                Ok(format!("admin moved to {x}, {z} in {world}"))
            }
            ["playtime", name, secs] => {
                let id = self.player(name)?;
                let session = self
                    .hub
                    .session_playtime()
                    .ok_or("playtime policy is not per-session")?;
                session.set(id, secs.parse()?);
                Ok(format!("{name} has played {secs}s"))
            }
            ["check", rest @ ..] => self.check(rest),
            _ => {
                let reply = self.hub.execute(&self.admin, &self.players, line)?;
                Ok(reply.to_string())
            }
        }
    }

    fn check(&self, args: &[&str]) -> Result<String, Box<dyn std::error::Error>> {
        let decision = match args {
            ["break", name, world, x, z, block] => {
                let at = Location::new(*world, x.parse()?, 64.0, z.parse()?);
                self.hub
                    .check_block_break(&self.actor(name)?, &at, &ResourceKey::parse(block)?)
            }
            ["interact", name, world, x, z, block] => {
                let at = Location::new(*world, x.parse()?, 64.0, z.parse()?);
                self.hub
                    .check_interact(&self.actor(name)?, &at, &ResourceKey::parse(block)?)
            }
            ["cmd", name, command @ ..] => {
                self.hub.check_command(&self.actor(name)?, &command.join(" "))
            }
            ["use", name, item] => self
                .hub
                .check_item_use(&self.actor(name)?, &ResourceKey::parse(item)?),
            ["pvp", attacker, victim, world, x, z] => {
                self.player(victim)?;
                let at = Location::new(*world, x.parse()?, 64.0, z.parse()?);
                self.hub.check_damage(
                    &self.actor(attacker)?,
                    &at,
                    &at,
                    &ResourceKey::parse("player")?,
                )
            }
            ["explosion", world, x, z] => {
                let at = Location::new(*world, x.parse()?, 64.0, z.parse()?);
                self.hub.check_explosion(&at)
            }
            _ => return Err("unknown check".into()),
        };
        Ok(match decision {
            Decision::Allow => "allowed".to_string(),
            Decision::Deny(denial) => format!("denied: {denial}"),
        })
    }

    fn player(&self, name: &str) -> Result<PlayerId, Box<dyn std::error::Error>> {
        self.players
            .get(name)
            .copied()
            .ok_or_else(|| format!("unknown player {name}, use 'join {name}' first").into())
    }

    fn actor(&self, name: &str) -> Result<Actor, Box<dyn std::error::Error>> {
        Ok(Actor::player(self.player(name)?))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading configuration from {path}");
            HubConfig::load(&path)?
        }
        None => HubConfig::default(),
    };

    let hub = Hub::open(config)?;
    let sweeper = hub.start_sweeper();
    let mut console = Console::new(hub);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" {
            break;
        }
        match console.handle(line) {
            Ok(out) => println!("{out}"),
            Err(e) => println!("error: {e}"),
        }
    }

    sweeper.abort();
    Ok(())
}
