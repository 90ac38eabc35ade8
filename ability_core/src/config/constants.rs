//! Engine constants configuration

use crate::scaling::ScalingConstants;
use serde::{Deserialize, Serialize};

/// Tunable engine constants
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EngineConstants {
    #[serde(default)]
    pub momentum: MomentumConstants,
    #[serde(default)]
    pub proximity: ProximityConstants,
    #[serde(default)]
    pub execute: ExecuteConstants,
    #[serde(default)]
    pub crit: CritConstants,
    #[serde(default)]
    pub floors: FloorConstants,
    #[serde(default)]
    pub sweep: SweepConstants,
    #[serde(default)]
    pub scaling: ScalingConstants,
}

/// Combo/streak/fever tuning.
///
/// All timing here is wall-clock seconds, not ticks, so momentum behaves
/// the same under any host tick rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentumConstants {
    /// Seconds without a qualifying event before the combo counter resets
    #[serde(default = "default_combo_timeout")]
    pub combo_timeout_secs: f64,
    /// Seconds without a qualifying event before the streak counter resets
    #[serde(default = "default_streak_timeout")]
    pub streak_timeout_secs: f64,
    /// Additive bonus per combo count
    #[serde(default = "default_combo_bonus")]
    pub combo_bonus_per_event: f64,
    /// Cap on the combo portion of the momentum contribution
    #[serde(default = "default_momentum_cap")]
    pub combo_bonus_cap: f64,
    /// Additive bonus per streak count
    #[serde(default = "default_streak_bonus")]
    pub streak_bonus_per_event: f64,
    /// Cap on the streak portion of the momentum contribution
    #[serde(default = "default_momentum_cap")]
    pub streak_bonus_cap: f64,
    /// Streak count that activates fever
    #[serde(default = "default_fever_threshold")]
    pub fever_threshold: u32,
    /// Multiplier applied as its own pipeline stage while fever is active
    #[serde(default = "default_fever_multiplier")]
    pub fever_multiplier: f64,
    /// Seconds fever stays active once triggered
    #[serde(default = "default_fever_duration")]
    pub fever_duration_secs: f64,
}

impl Default for MomentumConstants {
    fn default() -> Self {
        MomentumConstants {
            combo_timeout_secs: 5.0,
            streak_timeout_secs: 30.0,
            combo_bonus_per_event: 0.01,
            combo_bonus_cap: 0.25,
            streak_bonus_per_event: 0.005,
            streak_bonus_cap: 0.25,
            fever_threshold: 50,
            fever_multiplier: 2.0,
            fever_duration_secs: 15.0,
        }
    }
}

fn default_combo_timeout() -> f64 {
    5.0
}
fn default_streak_timeout() -> f64 {
    30.0
}
fn default_combo_bonus() -> f64 {
    0.01
}
fn default_streak_bonus() -> f64 {
    0.005
}
fn default_momentum_cap() -> f64 {
    0.25
}
fn default_fever_threshold() -> u32 {
    50
}
fn default_fever_multiplier() -> f64 {
    2.0
}
fn default_fever_duration() -> f64 {
    15.0
}

/// Group proximity bonus table.
///
/// A step function of nearby cooperating actor count, not a formula.
/// Index 0 is a lone actor; counts past the table clamp to the last entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProximityConstants {
    #[serde(default = "default_group_bonuses")]
    pub group_bonuses: Vec<f64>,
    /// Radius used when counting nearby cooperating actors
    #[serde(default = "default_group_radius")]
    pub group_radius: f64,
}

impl Default for ProximityConstants {
    fn default() -> Self {
        ProximityConstants {
            group_bonuses: default_group_bonuses(),
            group_radius: 12.0,
        }
    }
}

impl ProximityConstants {
    /// Bonus for a group of `size` actors (the actor itself included).
    /// Sizes outside [1, table len] clamp to the nearest table entry.
    pub fn bonus_for_group(&self, size: usize) -> f64 {
        if self.group_bonuses.is_empty() {
            return 0.0;
        }
        let index = size.clamp(1, self.group_bonuses.len()) - 1;
        self.group_bonuses[index]
    }
}

fn default_group_bonuses() -> Vec<f64> {
    vec![0.0, 0.15, 0.35, 0.60]
}
fn default_group_radius() -> f64 {
    12.0
}

/// Execute-override tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteConstants {
    /// Health fraction at or below which the override triggers
    #[serde(default = "default_execute_threshold")]
    pub health_fraction_threshold: f64,
    /// Margin added on top of the target's current health to guarantee
    /// lethality
    #[serde(default = "default_execute_epsilon")]
    pub epsilon: f64,
}

impl Default for ExecuteConstants {
    fn default() -> Self {
        ExecuteConstants {
            health_fraction_threshold: 0.15,
            epsilon: 1.0,
        }
    }
}

fn default_execute_threshold() -> f64 {
    0.15
}
fn default_execute_epsilon() -> f64 {
    1.0
}

/// Critical strike tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CritConstants {
    /// Base critical strike multiplier (1.5 = 150%)
    #[serde(default = "default_crit_multiplier")]
    pub base_multiplier: f64,
}

impl Default for CritConstants {
    fn default() -> Self {
        CritConstants {
            base_multiplier: 1.5,
        }
    }
}

fn default_crit_multiplier() -> f64 {
    1.5
}

/// Empirically tuned floors.
///
/// Power-level scaling shrinks trigger thresholds and cooldowns; these
/// floors bound how far that shrinking can go.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloorConstants {
    /// A threshold-trigger passive never needs fewer attacks than this
    #[serde(default = "default_min_trigger_attacks")]
    pub min_trigger_attacks: u32,
    /// No ability cooldown shrinks below this many ticks
    #[serde(default = "default_min_cooldown_ticks")]
    pub min_cooldown_ticks: u64,
    /// A charge release never resolves below this stored amount
    #[serde(default = "default_min_release_damage")]
    pub min_release_damage: f64,
}

impl Default for FloorConstants {
    fn default() -> Self {
        FloorConstants {
            min_trigger_attacks: 6,
            min_cooldown_ticks: 20,
            min_release_damage: 10.0,
        }
    }
}

fn default_min_trigger_attacks() -> u32 {
    6
}
fn default_min_cooldown_ticks() -> u64 {
    20
}
fn default_min_release_damage() -> f64 {
    10.0
}

/// Periodic sweep cadence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConstants {
    /// Ticks between effect-registry expiry sweeps
    #[serde(default = "default_effect_sweep")]
    pub effect_sweep_interval_ticks: u64,
    /// Ticks between momentum/fever sweeps
    #[serde(default = "default_momentum_sweep")]
    pub momentum_sweep_interval_ticks: u64,
}

impl Default for SweepConstants {
    fn default() -> Self {
        SweepConstants {
            effect_sweep_interval_ticks: 5,
            momentum_sweep_interval_ticks: 1,
        }
    }
}

fn default_effect_sweep() -> u64 {
    5
}
fn default_momentum_sweep() -> u64 {
    1
}
