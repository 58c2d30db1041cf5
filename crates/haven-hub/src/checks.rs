//! Action checks
//!
//! One function per host event. Every check is synchronous, reads an immutable
//! snapshot and never errors: anything not covered by a rule is allowed.

use crate::hub::Hub;
use haven_core::{
    normalize_command, Capability, Decision, Denial, Location, PlayerId, ResourceKey,
    RestrictionAction, RestrictionKind, SpawnZone, Toggle, ZoneRule,
};

/// Entity types that detonate when spawned
const EXPLOSIVE_ENTITIES: [&str; 3] = ["tnt", "end_crystal", "tnt_minecart"];

/// Entity type of a player victim
const PLAYER_ENTITY: &str = "minecraft:player";

/// The player behind an action, with the permissions the host resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: PlayerId,
    pub bypass_restrictions: bool,
    pub bypass_zones: bool,
}

impl Actor {
    pub fn player(id: PlayerId) -> Self {
        Self {
            id,
            bypass_restrictions: false,
            bypass_zones: false,
        }
    }

    pub fn with_restriction_bypass(mut self) -> Self {
        self.bypass_restrictions = true;
        self
    }

    pub fn with_zone_bypass(mut self) -> Self {
        self.bypass_zones = true;
        self
    }
}

impl Hub {
    pub fn check_block_break(&self, actor: &Actor, at: &Location, block: &ResourceKey) -> Decision {
        self.zone_capability(actor, at, Capability::BlockBreak, block)
    }

    pub fn check_block_place(&self, actor: &Actor, at: &Location, block: &ResourceKey) -> Decision {
        self.zone_capability(actor, at, Capability::BlockPlace, block)
    }

    pub fn check_interact(&self, actor: &Actor, at: &Location, block: &ResourceKey) -> Decision {
        self.zone_capability(actor, at, Capability::Interact, block)
    }

    pub fn check_entity_interact(
        &self,
        actor: &Actor,
        at: &Location,
        entity_type: &ResourceKey,
    ) -> Decision {
        self.zone_capability(actor, at, Capability::EntityInteract, entity_type)
    }

    /// A player hitting an entity.
    ///
    /// ENTITY restrictions on the victim type come first. Player victims are
    /// then protected when either side stands in a zone that blocks pvp.
    pub fn check_damage(
        &self,
        attacker: &Actor,
        attacker_at: &Location,
        victim_at: &Location,
        victim_type: &ResourceKey,
    ) -> Decision {
        self.restriction(
            attacker,
            &[RestrictionKind::Entity],
            RestrictionAction::Damage,
            victim_type.as_str(),
        )
        .or_else(|| {
            if victim_type.as_str() != PLAYER_ENTITY || !self.zones_apply_to(attacker) {
                return Decision::Allow;
            }
            self.zone_toggle(victim_at, Toggle::Pvp)
                .or_else(|| self.zone_toggle(attacker_at, Toggle::Pvp))
        })
    }

    /// A chat command line, with or without the leading slash
    pub fn check_command(&self, actor: &Actor, line: &str) -> Decision {
        match normalize_command(line) {
            Ok(command) => self.restriction(
                actor,
                &[RestrictionKind::Command],
                RestrictionAction::Execute,
                &command,
            ),
            Err(_) => Decision::Allow,
        }
    }

    pub fn check_item_use(&self, actor: &Actor, item: &ResourceKey) -> Decision {
        self.restriction(actor, &[RestrictionKind::Item], RestrictionAction::Use, item.as_str())
    }

    pub fn check_item_drop(&self, actor: &Actor, item: &ResourceKey) -> Decision {
        self.restriction(actor, &[RestrictionKind::Item], RestrictionAction::Drop, item.as_str())
    }

    pub fn check_item_pickup(&self, actor: &Actor, item: &ResourceKey) -> Decision {
        self.restriction(
            actor,
            &[RestrictionKind::Item],
            RestrictionAction::Pickup,
            item.as_str(),
        )
    }

    /// Putting an item into an armor slot
    pub fn check_equip(&self, actor: &Actor, item: &ResourceKey) -> Decision {
        self.restriction(
            actor,
            &[RestrictionKind::Equipment, RestrictionKind::Item],
            RestrictionAction::Equip,
            item.as_str(),
        )
    }

    /// The worn items the player must take off, with the reason for each
    pub fn restricted_equipment<'a>(
        &self,
        actor: &Actor,
        worn: impl IntoIterator<Item = &'a ResourceKey>,
    ) -> Vec<(ResourceKey, Denial)> {
        worn.into_iter()
            .filter_map(|item| match self.check_equip(actor, item) {
                Decision::Deny(denial) => Some((item.clone(), denial)),
                Decision::Allow => None,
            })
            .collect()
    }

    pub fn check_explosion(&self, at: &Location) -> Decision {
        self.zone_toggle(at, Toggle::Explosions)
    }

    pub fn check_fire_spread(&self, at: &Location) -> Decision {
        self.zone_toggle(at, Toggle::FireSpread)
    }

    /// Spawning an entity that explodes, where explosions are blocked
    pub fn check_explosive_spawn(&self, at: &Location, entity_type: &ResourceKey) -> Decision {
        let explosive = entity_type.as_str().starts_with("minecraft:")
            && EXPLOSIVE_ENTITIES.contains(&entity_type.path());
        if !explosive {
            return Decision::Allow;
        }
        self.check_explosion(at)
    }

    fn restriction(
        &self,
        actor: &Actor,
        kinds: &[RestrictionKind],
        action: RestrictionAction,
        target: &str,
    ) -> Decision {
        if !self.config.restrictions.enabled || actor.bypass_restrictions {
            return Decision::Allow;
        }
        self.restrictions
            .first_denying(actor.id, kinds, action, target)
            .into()
    }

    fn zones_apply_to(&self, actor: &Actor) -> bool {
        self.config.zones.enabled && !actor.bypass_zones && !self.has_playtime_bypass(actor.id)
    }

    fn zone_capability(
        &self,
        actor: &Actor,
        at: &Location,
        capability: Capability,
        id: &ResourceKey,
    ) -> Decision {
        if !self.zones_apply_to(actor) {
            return Decision::Allow;
        }
        self.zone_rule(at, ZoneRule::Capability(capability), |zone| {
            !zone.allows(capability, id)
        })
    }

    fn zone_toggle(&self, at: &Location, toggle: Toggle) -> Decision {
        if !self.config.zones.enabled {
            return Decision::Allow;
        }
        self.zone_rule(at, ZoneRule::Toggle(toggle), |zone| zone.blocks(toggle))
    }

    fn zone_rule(&self, at: &Location, rule: ZoneRule, denies: impl Fn(&SpawnZone) -> bool) -> Decision {
        let snapshot = self.zones.snapshot();
        match snapshot.lookup_location(at) {
            Some(zone) if denies(zone) => Decision::Deny(Denial::Zone {
                zone: zone.name().to_string(),
                rule,
            }),
            _ => Decision::Allow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HubConfig;
    use haven_core::{
        Acl, Catalog, ManualClock, MemoryZoneStore, Point, RestrictionDef, SessionPlaytime, Shape,
    };
    use std::sync::Arc;

    fn key(raw: &str) -> ResourceKey {
        ResourceKey::parse(raw).unwrap()
    }

    fn spawn_zone() -> SpawnZone {
        let shape = Shape::circle(Point::new(0.0, 0.0), 50.0).unwrap();
        let mut zone = SpawnZone::new("spawn", "world", shape).unwrap();
        zone.block_break = Acl::whitelist([]);
        zone
    }

    fn hub_with(zones: Vec<SpawnZone>, catalog: Catalog, config: HubConfig) -> Hub {
        Hub::builder(config)
            .catalog(catalog)
            .zone_store(Arc::new(MemoryZoneStore::with_zones(zones)))
            .clock(Arc::new(ManualClock::at(0)))
            .build()
    }

    fn catalog() -> Catalog {
        Catalog::from_defs([
            RestrictionDef::new("no_tnt", RestrictionKind::Item)
                .unwrap()
                .with_action(RestrictionAction::Use)
                .with_action(RestrictionAction::Drop)
                .with_target("tnt")
                .unwrap(),
            RestrictionDef::new("no_elytra", RestrictionKind::Equipment)
                .unwrap()
                .with_action(RestrictionAction::Equip)
                .with_target("elytra")
                .unwrap(),
            RestrictionDef::new("peaceful", RestrictionKind::Entity)
                .unwrap()
                .with_action(RestrictionAction::Damage)
                .with_target("villager")
                .unwrap()
                .as_default(-1)
                .unwrap(),
            RestrictionDef::new("muted", RestrictionKind::Command)
                .unwrap()
                .with_action(RestrictionAction::Execute)
                .with_target("msg")
                .unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn test_spawn_circle_scenario() {
        let hub = hub_with(vec![spawn_zone()], Catalog::new(), HubConfig::default());
        let actor = Actor::player(PlayerId::random());

        let inside = Location::new("world", 10.0, 64.0, 10.0);
        let outside = Location::new("world", 100.0, 64.0, 0.0);
        let decision = hub.check_block_break(&actor, &inside, &key("stone"));
        assert_eq!(
            decision.denial().unwrap().to_string(),
            "protected by zone 'spawn' (block_break)"
        );
        assert!(hub.check_block_break(&actor, &outside, &key("stone")).is_allowed());
        // other categories are still disabled
        assert!(hub.check_block_place(&actor, &inside, &key("stone")).is_allowed());
        // same coordinates in another world
        let nether = Location::new("world_nether", 10.0, 64.0, 10.0);
        assert!(hub.check_block_break(&actor, &nether, &key("stone")).is_allowed());
    }

    #[test]
    fn test_zone_bypass() {
        let mut config = HubConfig::default();
        let hub = hub_with(vec![spawn_zone()], Catalog::new(), config.clone());
        let inside = Location::new("world", 0.0, 64.0, 0.0);
        let actor = Actor::player(PlayerId::random()).with_zone_bypass();
        assert!(hub.check_block_break(&actor, &inside, &key("stone")).is_allowed());

        config.zones.enabled = false;
        let hub = hub_with(vec![spawn_zone()], Catalog::new(), config);
        let actor = Actor::player(PlayerId::random());
        assert!(hub.check_block_break(&actor, &inside, &key("stone")).is_allowed());
    }

    #[test]
    fn test_playtime_bypass_lifts_zone_rules() {
        let mut config = HubConfig::default();
        config.zones.bypass_after_playtime = 3_600;
        let session = Arc::new(SessionPlaytime::new());
        let hub = Hub::builder(config)
            .zone_store(Arc::new(MemoryZoneStore::with_zones(vec![spawn_zone()])))
            .session_playtime(session.clone())
            .build();

        let p = PlayerId::random();
        let actor = Actor::player(p);
        let inside = Location::new("world", 0.0, 64.0, 0.0);
        assert!(hub.check_block_break(&actor, &inside, &key("dirt")).is_denied());
        session.set(p, 3_600);
        assert!(hub.check_block_break(&actor, &inside, &key("dirt")).is_allowed());
    }

    #[test]
    fn test_item_checks() {
        let hub = hub_with(vec![], catalog(), HubConfig::default());
        let p = PlayerId::random();
        let actor = Actor::player(p);

        assert!(hub.check_item_use(&actor, &key("tnt")).is_allowed());
        hub.restrictions().assign(p, "no_tnt", 600).unwrap();
        let denial = hub.check_item_use(&actor, &key("TNT")).denial().cloned();
        assert_eq!(
            denial,
            Some(Denial::Restriction {
                name: "no_tnt".to_string(),
                remaining_secs: 600
            })
        );
        assert!(hub.check_item_drop(&actor, &key("tnt")).is_denied());
        assert!(hub.check_item_pickup(&actor, &key("tnt")).is_allowed());
        assert!(hub.check_item_use(&actor, &key("stone")).is_allowed());
        assert!(hub
            .check_item_use(&actor.with_restriction_bypass(), &key("tnt"))
            .is_allowed());
    }

    #[test]
    fn test_equipment_shares_material_matching() {
        let hub = hub_with(vec![], catalog(), HubConfig::default());
        let p = PlayerId::random();
        let actor = Actor::player(p);
        hub.restrictions().assign(p, "no_elytra", -1).unwrap();

        let worn = [key("elytra"), key("iron_helmet")];
        let stripped = hub.restricted_equipment(&actor, &worn);
        assert_eq!(stripped.len(), 1);
        assert_eq!(stripped[0].0, key("elytra"));
        assert!(hub.check_equip(&actor, &key("elytra")).is_denied());
        // equip restrictions do not leak into plain use
        assert!(hub.check_item_use(&actor, &key("elytra")).is_allowed());
    }

    #[test]
    fn test_command_check() {
        let hub = hub_with(vec![], catalog(), HubConfig::default());
        let p = PlayerId::random();
        let actor = Actor::player(p);
        hub.restrictions().assign(p, "muted", 60).unwrap();

        assert!(hub.check_command(&actor, "/MSG bob hi").is_denied());
        assert!(hub.check_command(&actor, "msg").is_denied());
        assert!(hub.check_command(&actor, "/spawn").is_allowed());
        assert!(hub.check_command(&actor, "   ").is_allowed());

        let mut config = HubConfig::default();
        config.restrictions.enabled = false;
        let hub = hub_with(vec![], catalog(), config);
        hub.restrictions().assign(p, "muted", 60).unwrap();
        assert!(hub.check_command(&actor, "/msg").is_allowed());
    }

    #[test]
    fn test_damage_checks() {
        let mut zone = spawn_zone();
        zone.pvp_blocked = true;
        let hub = hub_with(vec![zone], catalog(), HubConfig::default());
        let actor = Actor::player(PlayerId::random());
        let inside = Location::new("world", 0.0, 64.0, 0.0);
        let outside = Location::new("world", 500.0, 64.0, 0.0);

        // permanent default protects villagers everywhere
        let decision = hub.check_damage(&actor, &outside, &outside, &key("villager"));
        assert!(matches!(
            decision.denial(),
            Some(Denial::Restriction { remaining_secs: -1, .. })
        ));

        let player = key("player");
        assert!(hub.check_damage(&actor, &outside, &inside, &player).is_denied());
        assert!(hub.check_damage(&actor, &inside, &outside, &player).is_denied());
        assert!(hub.check_damage(&actor, &outside, &outside, &player).is_allowed());
        assert!(hub.check_damage(&actor, &inside, &inside, &key("zombie")).is_allowed());
        assert!(hub
            .check_damage(&actor.with_zone_bypass(), &inside, &inside, &player)
            .is_allowed());
    }

    #[test]
    fn test_environment_toggles() {
        let mut zone = spawn_zone();
        zone.explosions_blocked = true;
        let hub = hub_with(vec![zone], Catalog::new(), HubConfig::default());
        let inside = Location::new("world", 5.0, 40.0, -5.0);
        let outside = Location::new("world", 60.0, 40.0, 0.0);

        assert!(hub.check_explosion(&inside).is_denied());
        assert!(hub.check_explosion(&outside).is_allowed());
        assert!(hub.check_fire_spread(&inside).is_allowed());
        assert!(hub.check_explosive_spawn(&inside, &key("end_crystal")).is_denied());
        assert!(hub.check_explosive_spawn(&inside, &key("creeper")).is_allowed());
        assert!(hub.check_explosive_spawn(&outside, &key("tnt")).is_allowed());
    }
}
