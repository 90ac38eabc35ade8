//! Passive behavior application
//!
//! One function per hook. Each takes the equipped passive's definition,
//! reads and mutates the effect registry, and reports the pipeline
//! contribution plus any effects it wrote so the engine can emit events.
//! The engine only calls a hook the behavior declares via `handles`.

use super::definition::{AbilityBehavior, AbilityDef};
use crate::config::FloorConstants;
use crate::damage::Contribution;
use crate::effect::{EffectRegistry, ExpireHook};
use crate::types::{ActorId, Tick};

/// An effect write performed by a hook, reported for event emission
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedEffect {
    pub actor: ActorId,
    pub effect_id: String,
    pub value: f64,
}

/// What one hook invocation produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HookOutcome {
    pub contribution: Option<Contribution>,
    pub applied: Vec<AppliedEffect>,
}

impl HookOutcome {
    fn contribution(source: &str, factor: f64) -> Self {
        HookOutcome {
            contribution: Some(Contribution::additive(source, factor)),
            applied: Vec::new(),
        }
    }
}

/// Trigger threshold adjusted by the actor's power level. Stronger
/// actors trigger sooner, but never below the configured floor.
pub fn adjusted_threshold(base: u32, stat_multiplier: f64, min_trigger_attacks: u32) -> u32 {
    let scaled = (base as f64 / stat_multiplier.max(1.0)).round() as u32;
    scaled.max(min_trigger_attacks)
}

fn counter_effect_id(def: &AbilityDef) -> String {
    format!("{}::counter", def.id)
}

fn source_tag(def: &AbilityDef) -> String {
    format!("passive:{}", def.id)
}

pub fn on_damage_dealt(
    def: &AbilityDef,
    effects: &mut EffectRegistry,
    source: ActorId,
    target: ActorId,
    now: Tick,
    stat_multiplier: f64,
    floors: &FloorConstants,
) -> HookOutcome {
    match &def.behavior {
        AbilityBehavior::DamageAmp { factor } => HookOutcome::contribution(&source_tag(def), *factor),

        AbilityBehavior::MarkPrey {
            effect_id,
            per_stack_bonus,
            max_stacks,
            duration_ticks,
        } => {
            // Marks already on the target boost this hit; the hit then
            // adds its own stack for the next one.
            let existing = effects.stacks(target, effect_id, now);
            let mut outcome = HookOutcome::default();
            if existing > 0 {
                outcome.contribution = Some(Contribution::additive(
                    &source_tag(def),
                    existing as f64 * per_stack_bonus,
                ));
            }
            let new_count = effects.increment_stack(
                target,
                effect_id,
                *max_stacks,
                *duration_ticks,
                now,
                ExpireHook::None,
            );
            outcome.applied.push(AppliedEffect {
                actor: target,
                effect_id: effect_id.clone(),
                value: new_count as f64,
            });
            outcome
        }

        AbilityBehavior::ThresholdSurge {
            base_threshold,
            counter_window_ticks,
            bonus_effect,
            bonus_value,
            bonus_duration_ticks,
        } => {
            let mut outcome = HookOutcome::default();
            if let Some(value) = effects.get(source, bonus_effect, now) {
                outcome.contribution =
                    Some(Contribution::additive(&source_tag(def), value));
            }

            let threshold =
                adjusted_threshold(*base_threshold, stat_multiplier, floors.min_trigger_attacks);
            let counter_id = counter_effect_id(def);
            let count = effects.increment_stack(
                source,
                &counter_id,
                threshold,
                *counter_window_ticks,
                now,
                ExpireHook::None,
            );
            if count >= threshold {
                effects.clear(source, &counter_id);
                effects.set_or_refresh(
                    source,
                    bonus_effect,
                    *bonus_value,
                    *bonus_duration_ticks,
                    now,
                    ExpireHook::NotifyOwner {
                        ability_id: def.id.clone(),
                    },
                );
                outcome.applied.push(AppliedEffect {
                    actor: source,
                    effect_id: bonus_effect.clone(),
                    value: *bonus_value,
                });
            }
            outcome
        }

        AbilityBehavior::FrenzyOnKill {
            effect_id,
            per_stack_bonus,
            ..
        } => {
            let stacks = effects.stacks(source, effect_id, now);
            if stacks > 0 {
                HookOutcome::contribution(&source_tag(def), stacks as f64 * per_stack_bonus)
            } else {
                HookOutcome::default()
            }
        }

        _ => HookOutcome::default(),
    }
}

pub fn on_damage_received(
    def: &AbilityDef,
    _effects: &mut EffectRegistry,
    _target: ActorId,
    _now: Tick,
) -> HookOutcome {
    match &def.behavior {
        AbilityBehavior::DamageWard { reduction } => {
            HookOutcome::contribution(&source_tag(def), -reduction)
        }
        _ => HookOutcome::default(),
    }
}

pub fn on_kill(
    def: &AbilityDef,
    effects: &mut EffectRegistry,
    source: ActorId,
    now: Tick,
) -> HookOutcome {
    match &def.behavior {
        AbilityBehavior::FrenzyOnKill {
            effect_id,
            max_stacks,
            duration_ticks,
            ..
        } => {
            let new_count = effects.increment_stack(
                source,
                effect_id,
                *max_stacks,
                *duration_ticks,
                now,
                ExpireHook::NotifyOwner {
                    ability_id: def.id.clone(),
                },
            );
            HookOutcome {
                contribution: None,
                applied: vec![AppliedEffect {
                    actor: source,
                    effect_id: effect_id.clone(),
                    value: new_count as f64,
                }],
            }
        }
        _ => HookOutcome::default(),
    }
}

pub fn on_equip(
    def: &AbilityDef,
    effects: &mut EffectRegistry,
    actor: ActorId,
    now: Tick,
) -> HookOutcome {
    match &def.behavior {
        AbilityBehavior::Attunement {
            effect_id,
            value,
            duration_ticks,
            ..
        } => {
            effects.set_or_refresh(
                actor,
                effect_id,
                *value,
                *duration_ticks,
                now,
                ExpireHook::NotifyOwner {
                    ability_id: def.id.clone(),
                },
            );
            HookOutcome {
                contribution: None,
                applied: vec![AppliedEffect {
                    actor,
                    effect_id: effect_id.clone(),
                    value: *value,
                }],
            }
        }
        _ => HookOutcome::default(),
    }
}

pub fn on_unequip(
    def: &AbilityDef,
    effects: &mut EffectRegistry,
    actor: ActorId,
    _now: Tick,
) -> HookOutcome {
    match &def.behavior {
        AbilityBehavior::ThresholdSurge { bonus_effect, .. } => {
            effects.clear(actor, &counter_effect_id(def));
            effects.clear(actor, bonus_effect);
            HookOutcome::default()
        }
        AbilityBehavior::FrenzyOnKill { effect_id, .. }
        | AbilityBehavior::Attunement { effect_id, .. } => {
            effects.clear(actor, effect_id);
            HookOutcome::default()
        }
        _ => HookOutcome::default(),
    }
}

pub fn on_tick(
    def: &AbilityDef,
    effects: &mut EffectRegistry,
    actor: ActorId,
    now: Tick,
) -> HookOutcome {
    match &def.behavior {
        AbilityBehavior::Attunement {
            effect_id,
            value,
            duration_ticks,
            ..
        } => {
            effects.set_or_refresh(
                actor,
                effect_id,
                *value,
                *duration_ticks,
                now,
                ExpireHook::NotifyOwner {
                    ability_id: def.id.clone(),
                },
            );
            HookOutcome::default()
        }
        _ => HookOutcome::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::damage::ContributionKind;

    const SOURCE: ActorId = ActorId(1);
    const TARGET: ActorId = ActorId(2);

    fn floors() -> FloorConstants {
        FloorConstants::default()
    }

    fn surge_def() -> AbilityDef {
        AbilityDef {
            id: "surge".to_string(),
            name: "Surge".to_string(),
            cooldown_ticks: 0,
            crit_chance: 0.0,
            behavior: AbilityBehavior::ThresholdSurge {
                base_threshold: 10,
                counter_window_ticks: 600,
                bonus_effect: "surge_bonus".to_string(),
                bonus_value: 0.30,
                bonus_duration_ticks: 100,
            },
        }
    }

    #[test]
    fn test_adjusted_threshold_floors() {
        assert_eq!(adjusted_threshold(10, 1.0, 6), 10);
        assert_eq!(adjusted_threshold(10, 1.6, 6), 6);
        // A huge power level never drops below the floor
        assert_eq!(adjusted_threshold(10, 100.0, 6), 6);
        // A weak multiplier never raises the threshold
        assert_eq!(adjusted_threshold(10, 0.2, 6), 10);
    }

    #[test]
    fn test_surge_fires_at_threshold_and_resets() {
        let def = surge_def();
        let mut effects = EffectRegistry::new();

        // Nine attacks: counter builds, no bonus yet
        for _ in 0..9 {
            let outcome =
                on_damage_dealt(&def, &mut effects, SOURCE, TARGET, 0, 1.0, &floors());
            assert!(outcome.applied.is_empty());
        }
        assert_eq!(effects.stacks(SOURCE, "surge::counter", 0), 9);

        // Tenth attack fires the bonus and resets the counter
        let outcome = on_damage_dealt(&def, &mut effects, SOURCE, TARGET, 0, 1.0, &floors());
        assert_eq!(outcome.applied.len(), 1);
        assert_eq!(outcome.applied[0].effect_id, "surge_bonus");
        assert_eq!(effects.stacks(SOURCE, "surge::counter", 0), 0);
        assert_eq!(effects.get(SOURCE, "surge_bonus", 0), Some(0.30));

        // The next attack sees the live bonus as a contribution
        let outcome = on_damage_dealt(&def, &mut effects, SOURCE, TARGET, 1, 1.0, &floors());
        match outcome.contribution {
            Some(ref c) => assert_eq!(c.kind, ContributionKind::Additive(0.30)),
            None => panic!("expected surge bonus contribution"),
        }
    }

    #[test]
    fn test_mark_contributes_before_stacking() {
        let def = AbilityDef {
            id: "mark".to_string(),
            name: "Mark Prey".to_string(),
            cooldown_ticks: 0,
            crit_chance: 0.0,
            behavior: AbilityBehavior::MarkPrey {
                effect_id: "prey_mark".to_string(),
                per_stack_bonus: 0.05,
                max_stacks: 5,
                duration_ticks: 100,
            },
        };
        let mut effects = EffectRegistry::new();

        // First hit: no marks yet, so no contribution, one stack applied
        let outcome = on_damage_dealt(&def, &mut effects, SOURCE, TARGET, 0, 1.0, &floors());
        assert!(outcome.contribution.is_none());
        assert_eq!(effects.stacks(TARGET, "prey_mark", 0), 1);

        // Third hit sees two existing marks
        on_damage_dealt(&def, &mut effects, SOURCE, TARGET, 1, 1.0, &floors());
        let outcome = on_damage_dealt(&def, &mut effects, SOURCE, TARGET, 2, 1.0, &floors());
        match outcome.contribution {
            Some(ref c) => assert_eq!(c.kind, ContributionKind::Additive(0.10)),
            None => panic!("expected mark contribution"),
        }
    }

    #[test]
    fn test_frenzy_stacks_from_kills() {
        let def = AbilityDef {
            id: "frenzy".to_string(),
            name: "Frenzy".to_string(),
            cooldown_ticks: 0,
            crit_chance: 0.0,
            behavior: AbilityBehavior::FrenzyOnKill {
                effect_id: "frenzy_stacks".to_string(),
                per_stack_bonus: 0.04,
                max_stacks: 5,
                duration_ticks: 200,
            },
        };
        let mut effects = EffectRegistry::new();

        for _ in 0..7 {
            on_kill(&def, &mut effects, SOURCE, 0);
        }
        // Clamped at 5 stacks
        assert_eq!(effects.stacks(SOURCE, "frenzy_stacks", 0), 5);

        let outcome = on_damage_dealt(&def, &mut effects, SOURCE, TARGET, 1, 1.0, &floors());
        match outcome.contribution {
            Some(ref c) => assert_eq!(c.kind, ContributionKind::Additive(0.20)),
            None => panic!("expected frenzy contribution"),
        }
    }

    #[test]
    fn test_ward_reduces_incoming() {
        let def = AbilityDef {
            id: "ward".to_string(),
            name: "Stone Ward".to_string(),
            cooldown_ticks: 0,
            crit_chance: 0.0,
            behavior: AbilityBehavior::DamageWard { reduction: 0.2 },
        };
        let mut effects = EffectRegistry::new();
        let outcome = on_damage_received(&def, &mut effects, TARGET, 0);
        match outcome.contribution {
            Some(ref c) => assert_eq!(c.kind, ContributionKind::Additive(-0.2)),
            None => panic!("expected ward contribution"),
        }
    }

    #[test]
    fn test_attunement_equip_tick_unequip() {
        let def = AbilityDef {
            id: "attune".to_string(),
            name: "Attunement".to_string(),
            cooldown_ticks: 0,
            crit_chance: 0.0,
            behavior: AbilityBehavior::Attunement {
                effect_id: "attune_aura".to_string(),
                value: 1.0,
                duration_ticks: 30,
                refresh_every_ticks: 20,
            },
        };
        let mut effects = EffectRegistry::new();

        on_equip(&def, &mut effects, SOURCE, 0);
        assert_eq!(effects.get(SOURCE, "attune_aura", 29), Some(1.0));

        // Refresh at tick 20 extends to tick 50
        on_tick(&def, &mut effects, SOURCE, 20);
        assert_eq!(effects.get(SOURCE, "attune_aura", 49), Some(1.0));

        on_unequip(&def, &mut effects, SOURCE, 25);
        assert_eq!(effects.get(SOURCE, "attune_aura", 25), None);
    }

    #[test]
    fn test_unequip_clears_surge_state() {
        let def = surge_def();
        let mut effects = EffectRegistry::new();
        for _ in 0..10 {
            on_damage_dealt(&def, &mut effects, SOURCE, TARGET, 0, 1.0, &floors());
        }
        assert!(effects.get(SOURCE, "surge_bonus", 0).is_some());

        on_unequip(&def, &mut effects, SOURCE, 0);
        assert_eq!(effects.get(SOURCE, "surge_bonus", 0), None);
        assert_eq!(effects.stacks(SOURCE, "surge::counter", 0), 0);
    }
}
