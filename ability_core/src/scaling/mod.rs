//! Content-tier scaling curves
//!
//! Maps an ordinal content-tier index to deterministic multipliers. Each
//! value category (base stats, affix values, ability damage, effect size)
//! gets its own independently tuned curve; letting one category ride
//! another's growth rate is how balance breaks, so the separation stays.

use serde::{Deserialize, Serialize};

/// Curve shape for a scaling category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveKind {
    /// `1 + rate * (tier - 1)`
    Linear,
    /// `base ^ (tier - 1)`
    Exponential,
    /// `(1 + rate * (tier - 1)) * base ^ (tier - 1)` — linear early,
    /// exponential late
    Hybrid,
}

/// Tunable parameters for one scaling curve
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CurveParams {
    pub kind: CurveKind,
    /// Per-tier additive growth for linear/hybrid curves
    #[serde(default = "default_linear_rate")]
    pub linear_rate: f64,
    /// Per-tier multiplicative growth for exponential/hybrid curves
    #[serde(default = "default_exp_base")]
    pub exp_base: f64,
}

fn default_linear_rate() -> f64 {
    0.10
}
fn default_exp_base() -> f64 {
    1.10
}

impl CurveParams {
    pub fn linear(rate: f64) -> Self {
        CurveParams {
            kind: CurveKind::Linear,
            linear_rate: rate,
            exp_base: 1.0,
        }
    }

    pub fn exponential(base: f64) -> Self {
        CurveParams {
            kind: CurveKind::Exponential,
            linear_rate: 0.0,
            exp_base: base,
        }
    }

    pub fn hybrid(rate: f64, base: f64) -> Self {
        CurveParams {
            kind: CurveKind::Hybrid,
            linear_rate: rate,
            exp_base: base,
        }
    }

    /// Multiplier at `tier`, with the tier clamped to `[1, max_tier]`.
    /// Always at least 1.0, whatever the configured rates.
    pub fn multiplier(&self, tier: u32, max_tier: u32) -> f64 {
        let clamped = tier.clamp(1, max_tier.max(1));
        let steps = (clamped - 1) as f64;
        let raw = match self.kind {
            CurveKind::Linear => 1.0 + self.linear_rate * steps,
            CurveKind::Exponential => self.exp_base.powf(steps),
            CurveKind::Hybrid => (1.0 + self.linear_rate * steps) * self.exp_base.powf(steps),
        };
        raw.max(1.0)
    }
}

/// The value category being scaled.
///
/// Which curve applies depends on what is scaled, not where the call
/// comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleCategory {
    BaseStats,
    AffixValues,
    AbilityDamage,
    EffectSize,
}

/// Per-category curve configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalingConstants {
    /// Highest valid tier index; tiers past this clamp
    #[serde(default = "default_max_tier")]
    pub max_tier: u32,
    #[serde(default = "default_base_stats_curve")]
    pub base_stats: CurveParams,
    #[serde(default = "default_affix_values_curve")]
    pub affix_values: CurveParams,
    #[serde(default = "default_ability_damage_curve")]
    pub ability_damage: CurveParams,
    #[serde(default = "default_effect_size_curve")]
    pub effect_size: CurveParams,
}

impl Default for ScalingConstants {
    fn default() -> Self {
        ScalingConstants {
            max_tier: default_max_tier(),
            base_stats: default_base_stats_curve(),
            affix_values: default_affix_values_curve(),
            ability_damage: default_ability_damage_curve(),
            effect_size: default_effect_size_curve(),
        }
    }
}

fn default_max_tier() -> u32 {
    10
}
fn default_base_stats_curve() -> CurveParams {
    CurveParams::linear(0.12)
}
fn default_affix_values_curve() -> CurveParams {
    CurveParams::linear(0.08)
}
fn default_ability_damage_curve() -> CurveParams {
    CurveParams::exponential(1.15)
}
fn default_effect_size_curve() -> CurveParams {
    CurveParams::hybrid(0.05, 1.03)
}

/// Resolves tier multipliers from the per-category curve table
#[derive(Debug, Clone)]
pub struct ScalingResolver {
    constants: ScalingConstants,
}

impl ScalingResolver {
    pub fn new(constants: ScalingConstants) -> Self {
        ScalingResolver { constants }
    }

    /// Multiplier for `category` at `tier` (clamped)
    pub fn multiplier(&self, category: ScaleCategory, tier: u32) -> f64 {
        let params = match category {
            ScaleCategory::BaseStats => &self.constants.base_stats,
            ScaleCategory::AffixValues => &self.constants.affix_values,
            ScaleCategory::AbilityDamage => &self.constants.ability_damage,
            ScaleCategory::EffectSize => &self.constants.effect_size,
        };
        params.multiplier(tier, self.constants.max_tier)
    }
}
