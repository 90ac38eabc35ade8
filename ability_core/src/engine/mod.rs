//! CombatEngine - the single owner of all mutable combat state
//!
//! Everything is keyed by `ActorId` handles inside this one instance;
//! there are no process-wide statics, and cleanup is an explicit
//! `remove_actor` call. All mutation happens on the tick thread: if the
//! host runs I/O elsewhere, it marshals back here before touching actor
//! state.

mod events;

pub use events::EngineEvent;

use crate::ability::{
    passive, AbilityBehavior, AbilityDef, AbilityPhase, AbilityState, ActivationError, PassiveHook,
};
use crate::clock::{TaskHandle, TickScheduler};
use crate::config::{default_abilities, EngineConstants};
use crate::damage::{compose, Contribution, DamageOutcome, ExecuteCheck};
use crate::effect::{EffectRegistry, ExpireHook};
use crate::momentum::MomentumTracker;
use crate::scaling::{ScaleCategory, ScalingResolver};
use crate::traits::{FeedbackSink, PowerProfile, SpatialQuery};
use crate::types::{ActorId, DamageFlags, TargetVitals, Tick};
use rand::Rng;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Scheduled engine work, carried through the scheduler as data
#[derive(Debug, Clone, PartialEq)]
enum EngineTask {
    /// Advance a multi-phase active ability (projectile impact, charge
    /// release)
    AdvancePhase { actor: ActorId, ability_id: String },
    /// Periodic hook for an equipped on-tick passive
    PassiveTick { actor: ActorId, ability_id: String },
    SweepEffects,
    SweepMomentum,
}

/// Failures inside scheduled task handlers. Logged and isolated by the
/// dispatch loop; they never escape `tick` and never block sibling
/// tasks.
#[derive(Error, Debug)]
enum TaskError {
    #[error("{0} vanished before its scheduled phase ran")]
    ActorGone(ActorId),
    #[error("ability '{0}' vanished from the roster")]
    AbilityGone(String),
}

/// Per-actor engine state
#[derive(Debug, Default)]
struct ActorRecord {
    /// Equipped ability ids, in registration order. Passive
    /// contributions apply in this order.
    equipped: Vec<String>,
    /// Runtime state for equipped actives
    ability_states: HashMap<String, AbilityState>,
    /// Repeating task handles for on-tick passives
    passive_tasks: HashMap<String, TaskHandle>,
}

impl ActorRecord {
    fn has(&self, ability_id: &str) -> bool {
        self.equipped.iter().any(|id| id == ability_id)
    }
}

/// The ability, effect, and damage-composition engine.
///
/// Single-threaded and tick-driven: the host calls `tick` once per
/// frame with the elapsed wall-clock seconds, reports combat events as
/// they happen, and renders the feedback stream.
pub struct CombatEngine {
    constants: EngineConstants,
    abilities: HashMap<String, AbilityDef>,
    scheduler: TickScheduler<EngineTask>,
    effects: EffectRegistry,
    momentum: MomentumTracker,
    scaling: ScalingResolver,
    actors: HashMap<ActorId, ActorRecord>,
    sink: Box<dyn FeedbackSink>,
    /// Wall-clock seconds accumulated from `tick` deltas; drives combo
    /// and fever timing
    clock_secs: f64,
}

impl CombatEngine {
    pub fn new(
        constants: EngineConstants,
        abilities: HashMap<String, AbilityDef>,
        sink: Box<dyn FeedbackSink>,
    ) -> Self {
        let mut scheduler = TickScheduler::new();
        let effect_interval = constants.sweep.effect_sweep_interval_ticks.max(1);
        scheduler.schedule_repeating(effect_interval, effect_interval, EngineTask::SweepEffects);
        let momentum_interval = constants.sweep.momentum_sweep_interval_ticks.max(1);
        scheduler.schedule_repeating(
            momentum_interval,
            momentum_interval,
            EngineTask::SweepMomentum,
        );

        CombatEngine {
            momentum: MomentumTracker::new(constants.momentum.clone()),
            scaling: ScalingResolver::new(constants.scaling.clone()),
            constants,
            abilities,
            scheduler,
            effects: EffectRegistry::new(),
            actors: HashMap::new(),
            sink,
            clock_secs: 0.0,
        }
    }

    /// Engine with default constants and the default ability roster
    pub fn with_defaults(sink: Box<dyn FeedbackSink>) -> Self {
        Self::new(EngineConstants::default(), default_abilities(), sink)
    }

    pub fn now(&self) -> Tick {
        self.scheduler.now()
    }

    pub fn clock_secs(&self) -> f64 {
        self.clock_secs
    }

    pub fn effects(&self) -> &EffectRegistry {
        &self.effects
    }

    pub fn momentum(&self) -> &MomentumTracker {
        &self.momentum
    }

    /// Effective phase of an equipped active ability at the current tick
    pub fn ability_phase(&self, actor: ActorId, ability_id: &str) -> Option<AbilityPhase> {
        self.actors
            .get(&actor)
            .and_then(|record| record.ability_states.get(ability_id))
            .map(|state| state.phase_at(self.scheduler.now()))
    }

    /// Create the actor's record ahead of combat. Also happens lazily on
    /// the first combat interaction.
    pub fn register_actor(&mut self, actor: ActorId) {
        self.ensure_actor(actor);
    }

    /// Remove a single effect from an actor (dispel). Returns true if a
    /// live entry was removed; no expiry hook fires for a dispel.
    pub fn dispel(&mut self, actor: ActorId, effect_id: &str) -> bool {
        let removed = self.effects.clear(actor, effect_id);
        if removed {
            self.emit(EngineEvent::EffectExpired {
                actor,
                effect_id: effect_id.to_string(),
            });
        }
        removed
    }

    /// Strip every effect from an actor (full cleanse)
    pub fn dispel_all(&mut self, actor: ActorId) {
        self.effects.clear_all(actor);
    }

    /// Purge every trace of an actor: effects, ability state, momentum,
    /// and any scheduled tasks it owns.
    pub fn remove_actor(&mut self, actor: ActorId) {
        if let Some(record) = self.actors.remove(&actor) {
            for (_, handle) in record.passive_tasks {
                self.scheduler.cancel(handle);
            }
            for (_, mut state) in record.ability_states {
                if let Some(handle) = state.abandon() {
                    self.scheduler.cancel(handle);
                }
            }
        }
        self.effects.clear_all(actor);
        self.momentum.remove_actor(actor);
        debug!(%actor, "actor state purged");
    }

    /// Equip an ability. Passives start reacting to events immediately;
    /// actives get an idle state slot. Equipping twice is a no-op.
    pub fn equip(&mut self, actor: ActorId, ability_id: &str) -> Result<(), ActivationError> {
        let def = self
            .abilities
            .get(ability_id)
            .cloned()
            .ok_or_else(|| ActivationError::UnknownAbility(ability_id.to_string()))?;
        self.ensure_actor(actor);
        let now = self.scheduler.now();

        {
            let record = match self.actors.get_mut(&actor) {
                Some(record) => record,
                None => return Err(ActivationError::UnknownActor),
            };
            if record.has(ability_id) {
                return Ok(());
            }
            record.equipped.push(ability_id.to_string());
            if def.is_active() {
                record
                    .ability_states
                    .insert(ability_id.to_string(), AbilityState::new());
            }
        }

        if def.behavior.handles(PassiveHook::Equip) {
            let outcome = passive::on_equip(&def, &mut self.effects, actor, now);
            self.report_applied(outcome.applied);
        }
        if let AbilityBehavior::Attunement {
            refresh_every_ticks,
            ..
        } = def.behavior
        {
            let interval = refresh_every_ticks.max(1);
            let handle = self.scheduler.schedule_repeating(
                interval,
                interval,
                EngineTask::PassiveTick {
                    actor,
                    ability_id: ability_id.to_string(),
                },
            );
            if let Some(record) = self.actors.get_mut(&actor) {
                record.passive_tasks.insert(ability_id.to_string(), handle);
            }
        }
        debug!(%actor, ability_id, "ability equipped");
        Ok(())
    }

    /// Unequip an ability, cancelling any in-flight phase and clearing
    /// the effects it owns
    pub fn unequip(&mut self, actor: ActorId, ability_id: &str) -> Result<(), ActivationError> {
        let def = self
            .abilities
            .get(ability_id)
            .cloned()
            .ok_or_else(|| ActivationError::UnknownAbility(ability_id.to_string()))?;
        let now = self.scheduler.now();

        let (passive_task, pending_phase) = {
            let record = self
                .actors
                .get_mut(&actor)
                .ok_or(ActivationError::UnknownActor)?;
            if !record.has(ability_id) {
                return Err(ActivationError::UnknownAbility(ability_id.to_string()));
            }
            let passive_task = record.passive_tasks.remove(ability_id);
            let pending_phase = record
                .ability_states
                .remove(ability_id)
                .and_then(|mut state| state.abandon());
            record.equipped.retain(|id| id != ability_id);
            (passive_task, pending_phase)
        };

        if let Some(handle) = passive_task {
            self.scheduler.cancel(handle);
        }
        if let Some(handle) = pending_phase {
            self.scheduler.cancel(handle);
        }
        if def.behavior.handles(PassiveHook::Unequip) {
            passive::on_unequip(&def, &mut self.effects, actor, now);
        }
        debug!(%actor, ability_id, "ability unequipped");
        Ok(())
    }

    /// Activate an equipped active ability.
    ///
    /// Fails without mutating any state when the slot is mid-phase, on
    /// cooldown, or no target can be resolved; resources commit only
    /// after target resolution succeeds. A provided target that is gone
    /// or out of range falls back to the nearest eligible enemy.
    pub fn activate<R: Rng>(
        &mut self,
        actor: ActorId,
        ability_id: &str,
        target: Option<ActorId>,
        world: &dyn SpatialQuery,
        profile: &dyn PowerProfile,
        rng: &mut R,
    ) -> Result<(), ActivationError> {
        self.ensure_actor(actor);
        let now = self.scheduler.now();

        let def = match self.abilities.get(ability_id).cloned() {
            Some(def) => def,
            None => {
                return self.fail(actor, ability_id, ActivationError::UnknownAbility(
                    ability_id.to_string(),
                ))
            }
        };
        let equipped = self
            .actors
            .get(&actor)
            .map(|record| record.has(ability_id))
            .unwrap_or(false);
        if !equipped {
            return self.fail(
                actor,
                ability_id,
                ActivationError::UnknownAbility(ability_id.to_string()),
            );
        }

        if let Some(state) = self
            .actors
            .get(&actor)
            .and_then(|record| record.ability_states.get(ability_id))
        {
            if let Err(err) = state.check_activation(now) {
                return self.fail(actor, ability_id, err);
            }
        }

        // Target resolution happens before anything commits
        let wanted_range = match def.behavior {
            AbilityBehavior::Strike { range, .. } | AbilityBehavior::Projectile { range, .. } => {
                Some(range)
            }
            _ => None,
        };
        let resolved_target = match wanted_range {
            Some(range) => {
                let candidate = target
                    .filter(|t| self.is_live_target(actor, *t, range, world))
                    .or_else(|| {
                        world
                            .nearby_enemies(actor, range)
                            .into_iter()
                            .find(|t| self.actors.contains_key(t))
                    });
                match candidate {
                    Some(t) => Some(t),
                    None => return self.fail(actor, ability_id, ActivationError::NoEligibleTarget),
                }
            }
            None => None,
        };

        match def.behavior {
            AbilityBehavior::Strike { base_damage, .. } => {
                let target_id = resolved_target.unwrap_or(actor);
                let (amount, flags) = self.roll_active_amount(&def, base_damage, actor, profile, rng, false);
                self.finish_active(actor, &def, profile, now);
                self.emit(EngineEvent::AbilityActivated {
                    actor,
                    ability_id: def.id.clone(),
                    target: Some(target_id),
                });
                self.emit(EngineEvent::AbilityResolved {
                    actor,
                    ability_id: def.id.clone(),
                    targets: vec![target_id],
                    amount,
                    flags,
                    fallback: false,
                });
            }
            AbilityBehavior::Projectile { travel_ticks, .. } => {
                let handle = self.scheduler.schedule_once(
                    travel_ticks,
                    EngineTask::AdvancePhase {
                        actor,
                        ability_id: def.id.clone(),
                    },
                );
                if let Some(state) = self.state_mut(actor, ability_id) {
                    state.begin_executing(resolved_target, Some(handle));
                }
                self.emit(EngineEvent::AbilityActivated {
                    actor,
                    ability_id: def.id.clone(),
                    target: resolved_target,
                });
            }
            AbilityBehavior::ChargeRelease { window_ticks, .. } => {
                let handle = self.scheduler.schedule_once(
                    window_ticks,
                    EngineTask::AdvancePhase {
                        actor,
                        ability_id: def.id.clone(),
                    },
                );
                if let Some(state) = self.state_mut(actor, ability_id) {
                    state.begin_charging(None, handle);
                }
                self.emit(EngineEvent::AbilityActivated {
                    actor,
                    ability_id: def.id.clone(),
                    target: None,
                });
            }
            _ => {
                return self.fail(
                    actor,
                    ability_id,
                    ActivationError::NotActivatable(ability_id.to_string()),
                )
            }
        }
        Ok(())
    }

    /// Compose an outgoing hit reported by the combat resolver.
    ///
    /// Contribution order: the source's passives in registration order,
    /// then momentum, proximity, tier scaling, and the execute check.
    /// The hit itself registers as a qualifying momentum event only
    /// after composing, so its own momentum boosts the next hit, not
    /// this one.
    pub fn damage_dealt(
        &mut self,
        source: ActorId,
        target: ActorId,
        raw_amount: f64,
        target_vitals: TargetVitals,
        content_tier: u32,
        world: &dyn SpatialQuery,
        profile: &dyn PowerProfile,
    ) -> DamageOutcome {
        self.ensure_actor(source);
        let now = self.scheduler.now();
        let now_secs = self.clock_secs;
        let stat_multiplier = profile.stat_multiplier(source);
        let floors = self.constants.floors.clone();

        let mut contributions = Vec::new();
        for def in self.equipped_defs(source) {
            if def.behavior.handles(PassiveHook::DamageDealt) {
                let outcome = passive::on_damage_dealt(
                    &def,
                    &mut self.effects,
                    source,
                    target,
                    now,
                    stat_multiplier,
                    &floors,
                );
                if let Some(contribution) = outcome.contribution {
                    contributions.push(contribution);
                }
                self.report_applied(outcome.applied);
            }
        }

        let momentum = self.momentum.contribution(source, now_secs);
        if momentum.additive > 0.0 {
            contributions.push(Contribution::additive("momentum", momentum.additive));
        }
        if momentum.fever_active {
            contributions.push(Contribution::fever(
                "fever",
                self.constants.momentum.fever_multiplier,
            ));
        }

        let allies = world.nearby_allies(source, self.constants.proximity.group_radius);
        let group_size = allies
            .iter()
            .filter(|ally| self.actors.contains_key(*ally))
            .count()
            + 1;
        let group_bonus = self.constants.proximity.bonus_for_group(group_size);
        if group_bonus > 0.0 {
            contributions.push(Contribution::group("proximity", group_bonus));
        }

        contributions.push(Contribution::tier(
            "tier",
            self.scaling
                .multiplier(ScaleCategory::AbilityDamage, content_tier),
        ));

        let execute = ExecuteCheck {
            vitals: target_vitals,
            threshold: self.constants.execute.health_fraction_threshold,
            epsilon: self.constants.execute.epsilon,
        };
        let outcome = compose(raw_amount, &contributions, Some(execute));

        self.emit(EngineEvent::DamageResolved {
            source: Some(source),
            target,
            amount: outcome.amount,
            flags: outcome.flags,
        });

        if self.momentum.register_event(source, now_secs) {
            self.emit(EngineEvent::FeverStarted { actor: source });
        }
        outcome
    }

    /// Compose an incoming hit against the target's defensive passives,
    /// then let any charging ability absorb its share
    pub fn damage_received(
        &mut self,
        target: ActorId,
        source: Option<ActorId>,
        raw_amount: f64,
    ) -> DamageOutcome {
        self.ensure_actor(target);
        let now = self.scheduler.now();

        let mut contributions = Vec::new();
        for def in self.equipped_defs(target) {
            if def.behavior.handles(PassiveHook::DamageReceived) {
                let outcome = passive::on_damage_received(&def, &mut self.effects, target, now);
                if let Some(contribution) = outcome.contribution {
                    contributions.push(contribution);
                }
                self.report_applied(outcome.applied);
            }
        }

        let mut outcome = compose(raw_amount, &contributions, None);

        for (ability_id, block_factor) in self.charging_blockers(target) {
            if outcome.amount <= 0.0 {
                break;
            }
            let blocked = outcome.amount * block_factor;
            outcome.amount -= blocked;
            let stored_total = match self.state_mut(target, &ability_id) {
                Some(state) => {
                    state.accumulator += blocked;
                    state.accumulator
                }
                None => blocked,
            };
            self.emit(EngineEvent::ChargeAbsorbed {
                actor: target,
                ability_id,
                blocked,
                stored_total,
            });
        }

        self.emit(EngineEvent::DamageResolved {
            source,
            target,
            amount: outcome.amount,
            flags: outcome.flags,
        });
        outcome
    }

    /// Report a confirmed kill: the killer's on-kill passives fire and
    /// its momentum registers; the victim's momentum zeroes immediately
    pub fn kill_confirmed(&mut self, source: ActorId, victim: ActorId) {
        self.ensure_actor(source);
        let now = self.scheduler.now();

        for def in self.equipped_defs(source) {
            if def.behavior.handles(PassiveHook::Kill) {
                let outcome = passive::on_kill(&def, &mut self.effects, source, now);
                self.report_applied(outcome.applied);
            }
        }
        if self.momentum.register_event(source, self.clock_secs) {
            self.emit(EngineEvent::FeverStarted { actor: source });
        }
        self.momentum.register_reset(victim);
    }

    /// Advance one tick: accumulate the wall clock, then drain and
    /// dispatch every due task. A failing task is logged and skipped;
    /// it never blocks its siblings.
    pub fn tick<R: Rng>(
        &mut self,
        dt_secs: f64,
        world: &dyn SpatialQuery,
        profile: &dyn PowerProfile,
        rng: &mut R,
    ) {
        self.clock_secs += dt_secs.max(0.0);
        let due = self.scheduler.advance();
        for due_task in due {
            if let Err(err) = self.dispatch(due_task.task, world, profile, rng) {
                warn!(error = %err, "scheduled task failed; continuing with remaining queue");
            }
        }
    }

    fn dispatch<R: Rng>(
        &mut self,
        task: EngineTask,
        world: &dyn SpatialQuery,
        profile: &dyn PowerProfile,
        rng: &mut R,
    ) -> Result<(), TaskError> {
        match task {
            EngineTask::SweepEffects => {
                self.sweep_effects();
                Ok(())
            }
            EngineTask::SweepMomentum => {
                for actor in self.momentum.sweep(self.clock_secs) {
                    self.emit(EngineEvent::FeverEnded { actor });
                }
                Ok(())
            }
            EngineTask::PassiveTick { actor, ability_id } => {
                let def = self
                    .abilities
                    .get(&ability_id)
                    .cloned()
                    .ok_or_else(|| TaskError::AbilityGone(ability_id.clone()))?;
                let equipped = self
                    .actors
                    .get(&actor)
                    .map(|record| record.has(&ability_id))
                    .unwrap_or(false);
                if !equipped {
                    return Err(TaskError::ActorGone(actor));
                }
                let now = self.scheduler.now();
                let outcome = passive::on_tick(&def, &mut self.effects, actor, now);
                self.report_applied(outcome.applied);
                Ok(())
            }
            EngineTask::AdvancePhase { actor, ability_id } => {
                self.advance_phase(actor, &ability_id, world, profile, rng)
            }
        }
    }

    fn sweep_effects(&mut self) {
        let now = self.scheduler.now();
        for expired in self.effects.sweep(now) {
            self.emit(EngineEvent::EffectExpired {
                actor: expired.actor,
                effect_id: expired.effect_id.clone(),
            });
            if let ExpireHook::NotifyOwner { ability_id } = expired.hook {
                self.owner_effect_expired(expired.actor, &ability_id);
            }
        }
    }

    /// The exactly-once on-expire reaction for an owned effect
    fn owner_effect_expired(&mut self, actor: ActorId, ability_id: &str) {
        let Some(def) = self.abilities.get(ability_id).cloned() else {
            return;
        };
        let equipped = self
            .actors
            .get(&actor)
            .map(|record| record.has(ability_id))
            .unwrap_or(false);
        if !equipped {
            return;
        }
        if let AbilityBehavior::Attunement { .. } = def.behavior {
            // The aura lapsed (e.g. a long stall between ticks); a still-
            // equipped attunement re-applies it
            let now = self.scheduler.now();
            let outcome = passive::on_equip(&def, &mut self.effects, actor, now);
            self.report_applied(outcome.applied);
        } else {
            debug!(%actor, ability_id, "owned effect expired");
        }
    }

    fn advance_phase<R: Rng>(
        &mut self,
        actor: ActorId,
        ability_id: &str,
        world: &dyn SpatialQuery,
        profile: &dyn PowerProfile,
        rng: &mut R,
    ) -> Result<(), TaskError> {
        let def = self
            .abilities
            .get(ability_id)
            .cloned()
            .ok_or_else(|| TaskError::AbilityGone(ability_id.to_string()))?;
        let now = self.scheduler.now();
        let (stored, target) = match self
            .actors
            .get(&actor)
            .and_then(|record| record.ability_states.get(ability_id))
        {
            Some(state) => (state.accumulator, state.target),
            None => return Err(TaskError::ActorGone(actor)),
        };

        match def.behavior {
            AbilityBehavior::Projectile {
                base_damage,
                radius,
                ..
            } => {
                let live = target
                    .filter(|t| self.actors.contains_key(t) && world.distance(actor, *t).is_some());
                let (amount, flags) =
                    self.roll_active_amount(&def, base_damage, actor, profile, rng, true);
                let (targets, fallback) = match live {
                    Some(t) => (vec![t], false),
                    None => {
                        // Deliberate fallback: the target left the world
                        // mid-flight, so the bolt bursts around the
                        // source instead of vanishing
                        warn!(%actor, ability_id, "projectile target lost; resolving as area burst");
                        let hit: Vec<ActorId> = world
                            .nearby_enemies(actor, self.scaled_radius(radius, actor, profile))
                            .into_iter()
                            .filter(|t| self.actors.contains_key(t))
                            .collect();
                        (hit, true)
                    }
                };
                self.finish_active(actor, &def, profile, now);
                self.emit(EngineEvent::AbilityResolved {
                    actor,
                    ability_id: def.id.clone(),
                    targets,
                    amount,
                    flags,
                    fallback,
                });
            }
            AbilityBehavior::ChargeRelease {
                release_multiplier,
                radius,
                ..
            } => {
                // Nothing stored still releases at the documented
                // minimum rather than fizzling
                let effective = if stored > 0.0 {
                    stored
                } else {
                    self.constants.floors.min_release_damage
                };
                let amount = effective * release_multiplier;
                let flags = DamageFlags {
                    secondary_hit: true,
                    ..DamageFlags::default()
                };
                let targets: Vec<ActorId> = world
                    .nearby_enemies(actor, self.scaled_radius(radius, actor, profile))
                    .into_iter()
                    .filter(|t| self.actors.contains_key(t))
                    .collect();
                self.finish_active(actor, &def, profile, now);
                self.emit(EngineEvent::AbilityResolved {
                    actor,
                    ability_id: def.id.clone(),
                    targets,
                    amount,
                    flags,
                    fallback: false,
                });
            }
            _ => {
                debug!(%actor, ability_id, "no phase to advance");
            }
        }
        Ok(())
    }

    /// Effect radii ride their own scaling curve, separate from damage
    fn scaled_radius(&self, radius: f64, actor: ActorId, profile: &dyn PowerProfile) -> f64 {
        radius
            * self
                .scaling
                .multiplier(ScaleCategory::EffectSize, profile.power_tier(actor))
    }

    /// Roll crit and tier scaling for an active resolution
    fn roll_active_amount<R: Rng>(
        &self,
        def: &AbilityDef,
        base_damage: f64,
        actor: ActorId,
        profile: &dyn PowerProfile,
        rng: &mut R,
        secondary: bool,
    ) -> (f64, DamageFlags) {
        let mut flags = DamageFlags {
            secondary_hit: secondary,
            ..DamageFlags::default()
        };
        let mut amount = base_damage;
        if def.crit_chance > 0.0 && rng.gen::<f64>() < def.crit_chance / 100.0 {
            amount *= self.constants.crit.base_multiplier;
            flags.critical = true;
        }
        amount *= self
            .scaling
            .multiplier(ScaleCategory::AbilityDamage, profile.power_tier(actor));
        (amount, flags)
    }

    /// Complete an activation: start the (power-adjusted, floored)
    /// cooldown and return the slot to idle
    fn finish_active(
        &mut self,
        actor: ActorId,
        def: &AbilityDef,
        profile: &dyn PowerProfile,
        now: Tick,
    ) {
        let cooldown = def.adjusted_cooldown(
            profile.stat_multiplier(actor),
            self.constants.floors.min_cooldown_ticks,
        );
        if let Some(state) = self.state_mut(actor, &def.id) {
            state.resolve(now, cooldown);
        }
    }

    fn ensure_actor(&mut self, actor: ActorId) {
        self.actors.entry(actor).or_default();
    }

    fn state_mut(&mut self, actor: ActorId, ability_id: &str) -> Option<&mut AbilityState> {
        self.actors
            .get_mut(&actor)
            .and_then(|record| record.ability_states.get_mut(ability_id))
    }

    /// Equipped definitions in registration order
    fn equipped_defs(&self, actor: ActorId) -> Vec<AbilityDef> {
        self.actors
            .get(&actor)
            .map(|record| {
                record
                    .equipped
                    .iter()
                    .filter_map(|id| self.abilities.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Charging charge-release abilities on an actor, with their block
    /// factors
    fn charging_blockers(&self, actor: ActorId) -> Vec<(String, f64)> {
        let Some(record) = self.actors.get(&actor) else {
            return Vec::new();
        };
        record
            .equipped
            .iter()
            .filter_map(|id| {
                let state = record.ability_states.get(id)?;
                if !state.is_charging() {
                    return None;
                }
                match self.abilities.get(id)?.behavior {
                    AbilityBehavior::ChargeRelease { block_factor, .. } => {
                        Some((id.clone(), block_factor))
                    }
                    _ => None,
                }
            })
            .collect()
    }

    fn is_live_target(
        &self,
        source: ActorId,
        target: ActorId,
        range: f64,
        world: &dyn SpatialQuery,
    ) -> bool {
        self.actors.contains_key(&target)
            && world
                .distance(source, target)
                .map(|d| d <= range)
                .unwrap_or(false)
    }

    fn fail(
        &mut self,
        actor: ActorId,
        ability_id: &str,
        err: ActivationError,
    ) -> Result<(), ActivationError> {
        self.emit(EngineEvent::ActivationFailed {
            actor,
            ability_id: ability_id.to_string(),
            reason: err.to_string(),
        });
        Err(err)
    }

    fn report_applied(&mut self, applied: Vec<passive::AppliedEffect>) {
        for effect in applied {
            self.emit(EngineEvent::EffectApplied {
                actor: effect.actor,
                effect_id: effect.effect_id,
                value: effect.value,
            });
        }
    }

    fn emit(&mut self, event: EngineEvent) {
        self.sink.notify(&event);
    }
}
