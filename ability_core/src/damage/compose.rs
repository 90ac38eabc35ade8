//! Damage composition - applying an ordered contribution list to a base
//! amount

use super::{Contribution, ContributionKind};
use crate::types::{DamageFlags, TargetVitals};
use serde::{Deserialize, Serialize};

/// Execute-stage inputs. Present only when the caller has a health
/// snapshot for the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecuteCheck {
    pub vitals: TargetVitals,
    /// Health fraction at or below which the override triggers
    pub threshold: f64,
    /// Margin added on top of current health to guarantee lethality
    pub epsilon: f64,
}

/// Per-stage accounting for a composed amount
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageBreakdown {
    pub base: f64,
    /// Sum of every additive contribution (passives + momentum)
    pub additive_sum: f64,
    pub fever_multiplier: f64,
    pub group_multiplier: f64,
    pub tier_multiplier: f64,
}

/// The pipeline's result: final amount, flags, and the stage accounting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageOutcome {
    /// Final amount, never negative
    pub amount: f64,
    pub flags: DamageFlags,
    pub breakdown: DamageBreakdown,
}

/// Compose a base amount with a list of contributions.
///
/// Stage order is fixed and significant:
/// 1. one shared additive term `1 + Σ additive`
/// 2. fever multiplier
/// 3. group proximity multiplier
/// 4. content-tier multiplier
/// 5. execute override (replaces the amount outright)
///
/// Pure function: same inputs, same outcome. Contributions of the same
/// kind combine commutatively, so their list order never matters. A zero
/// (or negative) base yields zero regardless of modifiers, execute
/// included, and the result is never negative.
pub fn compose(
    base: f64,
    contributions: &[Contribution],
    execute: Option<ExecuteCheck>,
) -> DamageOutcome {
    let mut additive_sum = 0.0;
    let mut fever_multiplier = 1.0;
    let mut group_multiplier = 1.0;
    let mut tier_multiplier = 1.0;

    for contribution in contributions {
        match contribution.kind {
            ContributionKind::Additive(factor) => additive_sum += factor,
            ContributionKind::FeverMultiplier(mult) => fever_multiplier *= mult,
            ContributionKind::GroupMultiplier(bonus) => group_multiplier *= 1.0 + bonus,
            ContributionKind::TierMultiplier(mult) => tier_multiplier *= mult,
        }
    }

    let breakdown = DamageBreakdown {
        base,
        additive_sum,
        fever_multiplier,
        group_multiplier,
        tier_multiplier,
    };
    let mut flags = DamageFlags::default();

    if base <= 0.0 {
        return DamageOutcome {
            amount: 0.0,
            flags,
            breakdown,
        };
    }

    // Wards can push the additive term negative; it floors at zero
    // rather than healing the target.
    let additive_term = (1.0 + additive_sum).max(0.0);
    let mut amount = base * additive_term * fever_multiplier * group_multiplier * tier_multiplier;

    if let Some(check) = execute {
        if check.vitals.health_fraction() <= check.threshold {
            amount = check.vitals.current_health + check.epsilon;
            flags.execute = true;
        }
    }

    DamageOutcome {
        amount: amount.max(0.0),
        flags,
        breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_shared_additive_term() {
        let contributions = vec![
            Contribution::additive("passive:honed_edge", 0.25),
            Contribution::additive("momentum", 0.10),
        ];
        let outcome = compose(100.0, &contributions, None);
        // 100 * (1 + 0.25 + 0.10) = 135, not 100 * 1.25 * 1.10
        assert!((outcome.amount - 135.0).abs() < 0.001);
    }

    #[test]
    fn test_same_stage_order_irrelevant() {
        let forward = vec![
            Contribution::additive("a", 0.25),
            Contribution::additive("b", 0.10),
        ];
        let backward = vec![
            Contribution::additive("b", 0.10),
            Contribution::additive("a", 0.25),
        ];
        let one = compose(100.0, &forward, None);
        let two = compose(100.0, &backward, None);
        assert!((one.amount - two.amount).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fever_is_its_own_stage() {
        let contributions = vec![
            Contribution::additive("passive", 0.25),
            Contribution::fever("fever", 2.0),
        ];
        let outcome = compose(10.0, &contributions, None);
        // 10 * 1.25 * 2 = 25
        assert!((outcome.amount - 25.0).abs() < 0.001);
    }

    #[test]
    fn test_all_stages_stack_multiplicatively() {
        let contributions = vec![
            Contribution::additive("passive", 0.25),
            Contribution::fever("fever", 2.0),
            Contribution::group("proximity", 0.15),
            Contribution::tier("tier", 1.5),
        ];
        let outcome = compose(100.0, &contributions, None);
        let expected = 100.0 * 1.25 * 2.0 * 1.15 * 1.5;
        assert!((outcome.amount - expected).abs() < 0.001);
        assert!((outcome.breakdown.group_multiplier - 1.15).abs() < f64::EPSILON);
        assert!((outcome.breakdown.tier_multiplier - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_execute_overrides_all_prior_stages() {
        let contributions = vec![
            Contribution::additive("passive", 3.0),
            Contribution::fever("fever", 2.0),
            Contribution::tier("tier", 4.0),
        ];
        let check = ExecuteCheck {
            vitals: TargetVitals::new(5.0, 100.0),
            threshold: 0.15,
            epsilon: 1.0,
        };
        let outcome = compose(100.0, &contributions, Some(check));
        assert!((outcome.amount - 6.0).abs() < f64::EPSILON);
        assert!(outcome.flags.execute);
    }

    #[test]
    fn test_execute_not_triggered_above_threshold() {
        let check = ExecuteCheck {
            vitals: TargetVitals::new(50.0, 100.0),
            threshold: 0.15,
            epsilon: 1.0,
        };
        let outcome = compose(100.0, &[], Some(check));
        assert!((outcome.amount - 100.0).abs() < f64::EPSILON);
        assert!(!outcome.flags.execute);
    }

    #[test]
    fn test_zero_base_stays_zero_even_with_execute() {
        let check = ExecuteCheck {
            vitals: TargetVitals::new(5.0, 100.0),
            threshold: 0.15,
            epsilon: 1.0,
        };
        let outcome = compose(0.0, &[Contribution::additive("x", 5.0)], Some(check));
        assert!((outcome.amount - 0.0).abs() < f64::EPSILON);
        assert!(!outcome.flags.execute);
    }

    #[test]
    fn test_heavy_reduction_floors_at_zero() {
        let contributions = vec![
            Contribution::additive("ward_one", -0.8),
            Contribution::additive("ward_two", -0.8),
        ];
        let outcome = compose(100.0, &contributions, None);
        assert!((outcome.amount - 0.0).abs() < f64::EPSILON);
    }

    proptest! {
        #[test]
        fn prop_amount_never_negative(
            base in -500.0..500.0f64,
            factors in proptest::collection::vec(-2.0..2.0f64, 0..8),
        ) {
            let contributions: Vec<Contribution> = factors
                .iter()
                .map(|f| Contribution::additive("prop", *f))
                .collect();
            let outcome = compose(base, &contributions, None);
            prop_assert!(outcome.amount >= 0.0);
        }

        #[test]
        fn prop_zero_in_zero_out(
            factors in proptest::collection::vec(-3.0..3.0f64, 0..8),
            mult in 0.5..4.0f64,
        ) {
            let mut contributions: Vec<Contribution> = factors
                .iter()
                .map(|f| Contribution::additive("prop", *f))
                .collect();
            contributions.push(Contribution::tier("tier", mult));
            let outcome = compose(0.0, &contributions, None);
            prop_assert!(outcome.amount == 0.0);
        }

        #[test]
        fn prop_list_order_irrelevant(
            base in 1.0..500.0f64,
            factors in proptest::collection::vec(0.0..1.0f64, 1..6),
        ) {
            let forward: Vec<Contribution> = factors
                .iter()
                .map(|f| Contribution::additive("prop", *f))
                .collect();
            let mut backward = forward.clone();
            backward.reverse();
            let one = compose(base, &forward, None);
            let two = compose(base, &backward, None);
            prop_assert!((one.amount - two.amount).abs() < 1e-9);
        }
    }
}
