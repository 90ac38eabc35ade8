//! Modifier contributions feeding the composition pipeline

use serde::{Deserialize, Serialize};

/// How a contribution combines into the final amount.
///
/// The pipeline applies stages in a fixed order regardless of list order;
/// the kind decides the stage, the tag only labels the source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionKind {
    /// Joins the single shared `1 + Σ` term (passives and momentum).
    /// Negative values are reductions.
    Additive(f64),
    /// Fever's own multiplicative stage, applied after the additive term
    FeverMultiplier(f64),
    /// Group proximity stage, applied as `amount *= 1 + bonus`
    GroupMultiplier(f64),
    /// Content-tier stage, applied as `amount *= multiplier` (already
    /// >= 1.0 from the scaling resolver)
    TierMultiplier(f64),
}

/// One named modifier contribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    /// Source tag, for breakdown reporting ("passive:honed_edge",
    /// "momentum", "proximity", "tier")
    pub source: String,
    pub kind: ContributionKind,
}

impl Contribution {
    pub fn additive(source: &str, factor: f64) -> Self {
        Contribution {
            source: source.to_string(),
            kind: ContributionKind::Additive(factor),
        }
    }

    pub fn fever(source: &str, multiplier: f64) -> Self {
        Contribution {
            source: source.to_string(),
            kind: ContributionKind::FeverMultiplier(multiplier),
        }
    }

    pub fn group(source: &str, bonus: f64) -> Self {
        Contribution {
            source: source.to_string(),
            kind: ContributionKind::GroupMultiplier(bonus),
        }
    }

    pub fn tier(source: &str, multiplier: f64) -> Self {
        Contribution {
            source: source.to_string(),
            kind: ContributionKind::TierMultiplier(multiplier),
        }
    }
}
