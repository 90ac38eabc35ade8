//! Damage composition pipeline

mod compose;
mod contribution;

pub use compose::{compose, DamageBreakdown, DamageOutcome, ExecuteCheck};
pub use contribution::{Contribution, ContributionKind};
