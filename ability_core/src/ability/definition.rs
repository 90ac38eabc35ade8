//! Ability definitions - immutable, TOML-loadable

use crate::types::AbilityKind;
use serde::{Deserialize, Serialize};

/// Event hooks a passive behavior can declare.
///
/// The engine invokes only the hooks a behavior declares via
/// `AbilityBehavior::handles`; there is no open-ended type inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassiveHook {
    DamageDealt,
    DamageReceived,
    Kill,
    Equip,
    Unequip,
    Tick,
}

/// Immutable ability definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilityDef {
    pub id: String,
    pub name: String,
    /// Ticks of cooldown entered when the ability resolves (actives only)
    #[serde(default)]
    pub cooldown_ticks: u64,
    /// Percent chance for the resolution to critically strike (actives
    /// only)
    #[serde(default)]
    pub crit_chance: f64,
    pub behavior: AbilityBehavior,
}

impl AbilityDef {
    pub fn kind(&self) -> AbilityKind {
        self.behavior.kind()
    }

    pub fn is_active(&self) -> bool {
        self.kind() == AbilityKind::Active
    }

    pub fn is_passive(&self) -> bool {
        self.kind() == AbilityKind::Passive
    }

    /// Cooldown with the actor's power level applied: stronger actors
    /// cycle faster, but never below the configured floor.
    pub fn adjusted_cooldown(&self, stat_multiplier: f64, min_cooldown_ticks: u64) -> u64 {
        let scaled = (self.cooldown_ticks as f64 / stat_multiplier.max(1.0)).round() as u64;
        scaled.max(min_cooldown_ticks)
    }
}

/// The closed set of ability behaviors.
///
/// Three active archetypes (instant strike, traveling projectile,
/// charge-and-release) and the passive roster. Every passive names the
/// hooks it handles in `handles`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AbilityBehavior {
    /// Instant single-target hit, resolved synchronously on activation
    Strike {
        base_damage: f64,
        #[serde(default = "default_range")]
        range: f64,
    },
    /// Cast, travel for `travel_ticks`, then impact. A lost target falls
    /// back to an area burst around the source.
    Projectile {
        base_damage: f64,
        travel_ticks: u64,
        radius: f64,
        #[serde(default = "default_range")]
        range: f64,
    },
    /// Block a share of incoming damage for `window_ticks`, then release
    /// the stored amount back, multiplied, as a burst around the actor
    ChargeRelease {
        window_ticks: u64,
        /// Share of each incoming composed amount absorbed into the
        /// accumulator while charging
        block_factor: f64,
        release_multiplier: f64,
        #[serde(default = "default_release_radius")]
        radius: f64,
    },

    /// Flat outgoing damage bonus
    DamageAmp { factor: f64 },
    /// Hits stack a mark on the target; existing marks boost each hit
    MarkPrey {
        effect_id: String,
        per_stack_bonus: f64,
        max_stacks: u32,
        duration_ticks: u64,
    },
    /// Attack counter that fires a self-buff at an adjustable threshold,
    /// then resets to zero
    ThresholdSurge {
        base_threshold: u32,
        /// Ticks the counter survives between attacks
        counter_window_ticks: u64,
        bonus_effect: String,
        bonus_value: f64,
        bonus_duration_ticks: u64,
    },
    /// Flat incoming damage reduction
    DamageWard { reduction: f64 },
    /// Kills grant stacks; stacks boost outgoing hits
    FrenzyOnKill {
        effect_id: String,
        per_stack_bonus: f64,
        max_stacks: u32,
        duration_ticks: u64,
    },
    /// Keeps a self-aura refreshed while equipped
    Attunement {
        effect_id: String,
        value: f64,
        duration_ticks: u64,
        refresh_every_ticks: u64,
    },
}

fn default_range() -> f64 {
    20.0
}

fn default_release_radius() -> f64 {
    6.0
}

impl AbilityBehavior {
    pub fn kind(&self) -> AbilityKind {
        match self {
            AbilityBehavior::Strike { .. }
            | AbilityBehavior::Projectile { .. }
            | AbilityBehavior::ChargeRelease { .. } => AbilityKind::Active,
            _ => AbilityKind::Passive,
        }
    }

    /// Which hooks this passive handles. Actives handle none; their
    /// lifecycle runs through the state machine instead.
    pub fn handles(&self, hook: PassiveHook) -> bool {
        use PassiveHook::*;
        match self {
            AbilityBehavior::DamageAmp { .. } => matches!(hook, DamageDealt),
            AbilityBehavior::MarkPrey { .. } => matches!(hook, DamageDealt),
            AbilityBehavior::ThresholdSurge { .. } => matches!(hook, DamageDealt | Unequip),
            AbilityBehavior::DamageWard { .. } => matches!(hook, DamageReceived),
            AbilityBehavior::FrenzyOnKill { .. } => matches!(hook, DamageDealt | Kill | Unequip),
            AbilityBehavior::Attunement { .. } => matches!(hook, Equip | Tick | Unequip),
            AbilityBehavior::Strike { .. }
            | AbilityBehavior::Projectile { .. }
            | AbilityBehavior::ChargeRelease { .. } => false,
        }
    }
}
