//! Ability definitions, per-actor runtime state, and passive behaviors

mod definition;
pub mod passive;
mod state;

pub use definition::{AbilityBehavior, AbilityDef, PassiveHook};
pub use state::{AbilityPhase, AbilityState};

use thiserror::Error;

/// Expected activation failures. All of these are recoverable and are
/// reported to the caller; none of them mutate actor state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActivationError {
    #[error("ability is still on cooldown ({remaining} ticks left)")]
    OnCooldown { remaining: u64 },
    #[error("ability cannot activate from the {phase:?} phase")]
    InvalidState { phase: AbilityPhase },
    #[error("no eligible target in range")]
    NoEligibleTarget,
    #[error("unknown ability '{0}'")]
    UnknownAbility(String),
    #[error("actor is not registered with the engine")]
    UnknownActor,
    #[error("'{0}' is a passive ability and cannot be activated")]
    NotActivatable(String),
}
