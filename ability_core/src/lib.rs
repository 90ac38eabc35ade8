//! ability_core - Ability, effect, and damage-composition engine
//!
//! This library provides:
//! - CombatEngine: tick-driven orchestrator for per-actor combat state
//! - TickScheduler: delayed and repeating tasks with cancellation handles
//! - EffectRegistry: timed stacking state (marks, buffs, counters)
//! - compose: the deterministic layered damage pipeline
//! - MomentumTracker / ScalingResolver: combo-streak and content-tier
//!   contributions

pub mod ability;
pub mod clock;
pub mod config;
pub mod damage;
pub mod effect;
pub mod engine;
pub mod momentum;
pub mod prelude;
pub mod scaling;
pub mod traits;
pub mod types;

// Re-export core types for convenience
pub use ability::{
    AbilityBehavior, AbilityDef, AbilityPhase, AbilityState, ActivationError, PassiveHook,
};
pub use clock::{DueTask, TaskHandle, TickScheduler};
pub use config::{default_abilities, ConfigError, EngineConstants};
pub use damage::{compose, Contribution, ContributionKind, DamageOutcome, ExecuteCheck};
pub use effect::{ActiveEffect, EffectRegistry, ExpireHook};
pub use engine::{CombatEngine, EngineEvent};
pub use momentum::{ComboState, MomentumContribution, MomentumTracker};
pub use scaling::{CurveKind, CurveParams, ScaleCategory, ScalingResolver};
pub use traits::{FeedbackSink, NullSink, PowerProfile, SpatialQuery};
pub use types::{AbilityKind, ActorId, DamageFlags, TargetVitals, Tick};
