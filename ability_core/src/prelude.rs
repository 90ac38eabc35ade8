//! Prelude module for convenient imports
//!
//! ```rust
//! use ability_core::prelude::*;
//! ```

// Engine
pub use crate::engine::{CombatEngine, EngineEvent};

// Core types
pub use crate::types::{AbilityKind, ActorId, DamageFlags, TargetVitals, Tick};

// Abilities
pub use crate::ability::{AbilityBehavior, AbilityDef, AbilityPhase, ActivationError};

// Damage pipeline
pub use crate::damage::{compose, Contribution, DamageOutcome};

// Effects and momentum
pub use crate::effect::{EffectRegistry, ExpireHook};
pub use crate::momentum::MomentumTracker;

// Scaling
pub use crate::scaling::{ScaleCategory, ScalingResolver};

// Collaborator seams
pub use crate::traits::{FeedbackSink, NullSink, PowerProfile, SpatialQuery};

// Config
pub use crate::config::{default_abilities, EngineConstants};
