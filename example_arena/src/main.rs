//! Example Arena - a headless scripted fight driving the ability_core
//! engine
//!
//! This demo shows:
//! - Wiring the engine to host-side collaborators (spatial store, power
//!   profile, feedback sink)
//! - Equipping the default roster and activating abilities
//! - Reporting damage through the combat-resolver boundary and applying
//!   the composed results to host-side health

use ability_core::prelude::*;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

const TICK_SECONDS: f64 = 0.05;
const CONTENT_TIER: u32 = 3;

/// Host-side world: positions and teams
struct ArenaWorld {
    positions: HashMap<ActorId, (f64, f64)>,
    teams: HashMap<ActorId, u8>,
}

impl ArenaWorld {
    fn new() -> Self {
        ArenaWorld {
            positions: HashMap::new(),
            teams: HashMap::new(),
        }
    }

    fn spawn(&mut self, actor: ActorId, team: u8, x: f64, y: f64) {
        self.positions.insert(actor, (x, y));
        self.teams.insert(actor, team);
    }

    fn despawn(&mut self, actor: ActorId) {
        self.positions.remove(&actor);
        self.teams.remove(&actor);
    }

    fn within(&self, origin: ActorId, radius: f64, same_team: bool) -> Vec<ActorId> {
        let (Some(&origin_pos), Some(&origin_team)) =
            (self.positions.get(&origin), self.teams.get(&origin))
        else {
            return Vec::new();
        };
        let mut found: Vec<ActorId> = self
            .positions
            .iter()
            .filter(|(id, _)| **id != origin)
            .filter(|(id, pos)| {
                let team_matches = self.teams.get(*id) == Some(&origin_team);
                let close = dist(origin_pos, **pos) <= radius;
                close && (team_matches == same_team)
            })
            .map(|(id, _)| *id)
            .collect();
        found.sort();
        found
    }
}

fn dist(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

impl SpatialQuery for ArenaWorld {
    fn nearby_allies(&self, origin: ActorId, radius: f64) -> Vec<ActorId> {
        self.within(origin, radius, true)
    }

    fn nearby_enemies(&self, origin: ActorId, radius: f64) -> Vec<ActorId> {
        self.within(origin, radius, false)
    }

    fn distance(&self, a: ActorId, b: ActorId) -> Option<f64> {
        let pa = self.positions.get(&a)?;
        let pb = self.positions.get(&b)?;
        Some(dist(*pa, *pb))
    }
}

/// Flat power profile: heroes are a little ahead of the curve
struct ArenaProfile {
    hero: ActorId,
}

impl PowerProfile for ArenaProfile {
    fn stat_multiplier(&self, actor: ActorId) -> f64 {
        if actor == self.hero {
            1.4
        } else {
            1.0
        }
    }

    fn power_tier(&self, actor: ActorId) -> u32 {
        if actor == self.hero {
            CONTENT_TIER
        } else {
            1
        }
    }
}

/// Feedback sink that renders the event stream to stdout
struct ConsoleSink;

impl FeedbackSink for ConsoleSink {
    fn notify(&mut self, event: &EngineEvent) {
        match event {
            EngineEvent::AbilityActivated {
                actor, ability_id, ..
            } => println!("  > {actor} activates {ability_id}"),
            EngineEvent::AbilityResolved {
                actor,
                ability_id,
                targets,
                amount,
                flags,
                fallback,
            } => {
                let crit = if flags.critical { " (crit!)" } else { "" };
                let burst = if *fallback { " [fallback burst]" } else { "" };
                println!(
                    "  > {actor}'s {ability_id} resolves for {amount:.1}{crit} on {} target(s){burst}",
                    targets.len()
                );
            }
            EngineEvent::ActivationFailed {
                actor,
                ability_id,
                reason,
            } => println!("  > {actor} cannot use {ability_id}: {reason}"),
            EngineEvent::EffectApplied {
                actor,
                effect_id,
                value,
            } => println!("  . {effect_id} x{value:.0} on {actor}"),
            EngineEvent::EffectExpired { actor, effect_id } => {
                println!("  . {effect_id} fades from {actor}")
            }
            EngineEvent::DamageResolved {
                target,
                amount,
                flags,
                ..
            } => {
                let exec = if flags.execute { " EXECUTE" } else { "" };
                println!("  * {target} takes {amount:.1}{exec}");
            }
            EngineEvent::ChargeAbsorbed {
                ability_id,
                blocked,
                stored_total,
                ..
            } => println!("  . {ability_id} absorbs {blocked:.1} (stored {stored_total:.1})"),
            EngineEvent::FeverStarted { actor } => println!("  ! {actor} enters FEVER"),
            EngineEvent::FeverEnded { actor } => println!("  ! {actor}'s fever ends"),
        }
    }
}

struct Arena {
    engine: CombatEngine,
    world: ArenaWorld,
    profile: ArenaProfile,
    rng: ChaCha8Rng,
    health: HashMap<ActorId, f64>,
    max_health: HashMap<ActorId, f64>,
    hero: ActorId,
    kills: u32,
}

impl Arena {
    fn new(hero: ActorId) -> Self {
        Arena {
            engine: CombatEngine::with_defaults(Box::new(ConsoleSink)),
            world: ArenaWorld::new(),
            profile: ArenaProfile { hero },
            rng: ChaCha8Rng::seed_from_u64(0xA12E),
            health: HashMap::new(),
            max_health: HashMap::new(),
            hero,
            kills: 0,
        }
    }

    fn spawn(&mut self, actor: ActorId, team: u8, x: f64, y: f64, health: f64) {
        self.world.spawn(actor, team, x, y);
        self.health.insert(actor, health);
        self.max_health.insert(actor, health);
        self.engine.register_actor(actor);
    }

    fn vitals(&self, actor: ActorId) -> TargetVitals {
        TargetVitals::new(
            self.health.get(&actor).copied().unwrap_or(0.0),
            self.max_health.get(&actor).copied().unwrap_or(1.0),
        )
    }

    fn living_enemies(&self) -> Vec<ActorId> {
        self.world.within(self.hero, 100.0, false)
    }

    /// One basic weapon swing from the hero, reported through the
    /// combat-resolver boundary
    fn hero_swing(&mut self, target: ActorId) {
        let outcome = self.engine.damage_dealt(
            self.hero,
            target,
            10.0,
            self.vitals(target),
            CONTENT_TIER,
            &self.world,
            &self.profile,
        );
        self.apply_damage(target, outcome.amount);
    }

    fn apply_damage(&mut self, target: ActorId, amount: f64) {
        let Some(health) = self.health.get_mut(&target) else {
            return;
        };
        *health -= amount;
        if *health <= 0.0 {
            println!("  x {target} is defeated");
            self.engine.kill_confirmed(self.hero, target);
            self.engine.remove_actor(target);
            self.world.despawn(target);
            self.health.remove(&target);
            self.kills += 1;
        }
    }

    /// An enemy swing back at the hero
    fn enemy_swing(&mut self, source: ActorId, raw: f64) {
        let outcome = self.engine.damage_received(self.hero, Some(source), raw);
        if let Some(health) = self.health.get_mut(&self.hero) {
            *health -= outcome.amount;
        }
    }

    fn try_activate(&mut self, ability_id: &str, target: Option<ActorId>) {
        let result = self.engine.activate(
            self.hero,
            ability_id,
            target,
            &self.world,
            &self.profile,
            &mut self.rng,
        );
        if let Err(err) = result {
            tracing::debug!(ability_id, %err, "activation skipped");
        }
    }

    fn tick(&mut self) {
        self.engine
            .tick(TICK_SECONDS, &self.world, &self.profile, &mut self.rng);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let hero = ActorId(1);
    let mut arena = Arena::new(hero);

    println!("=== Example Arena ===");
    arena.spawn(hero, 0, 0.0, 0.0, 500.0);
    for ability in [
        "honed_edge",
        "hunters_mark",
        "surging_wrath",
        "stone_ward",
        "bloodlust",
        "ember_attunement",
        "swift_strike",
        "piercing_bolt",
        "bulwark_release",
    ] {
        if let Err(err) = arena.engine.equip(hero, ability) {
            eprintln!("failed to equip {ability}: {err}");
        }
    }

    // An allied companion nearby for the proximity bonus
    arena.spawn(ActorId(2), 0, 2.0, 1.0, 300.0);

    // Wave one
    println!("--- wave 1 ---");
    for (id, x) in [(10u64, 6.0), (11, 8.0), (12, 10.0)] {
        arena.spawn(ActorId(id), 1, x, 0.0, 90.0);
    }
    run_wave(&mut arena, 400);

    // Wave two: tougher, and the hero opens with the charge ability
    println!("--- wave 2 ---");
    for (id, x) in [(20u64, 7.0), (21, 9.0)] {
        arena.spawn(ActorId(id), 1, x, 0.0, 140.0);
    }
    arena.try_activate("bulwark_release", None);
    run_wave(&mut arena, 400);

    println!("=== arena cleared: {} defeated ===", arena.kills);
}

fn run_wave(arena: &mut Arena, max_ticks: u32) {
    for step in 0..max_ticks {
        arena.tick();

        let enemies = arena.living_enemies();
        if enemies.is_empty() {
            break;
        }

        // Hero swings every 8 ticks and weaves in actives as they come
        // off cooldown
        if step % 8 == 0 {
            let target = enemies[0];
            arena.hero_swing(target);
            arena.try_activate("swift_strike", Some(target));
        }
        if step % 40 == 0 {
            arena.try_activate("piercing_bolt", None);
        }

        // Enemies chip at the hero every 20 ticks
        if step % 20 == 10 {
            for enemy in enemies {
                arena.enemy_swing(enemy, 6.0);
            }
        }
    }
}
