//! Core types shared across the engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete engine time. All engine-internal durations are integer ticks.
pub type Tick = u64;

/// Stable handle for an engine-tracked actor.
///
/// Handles are issued by the host and stay valid until `remove_actor`
/// purges the actor's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

/// Ability classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityKind {
    /// Event-driven modifier, always equipped, no cooldown or phases
    Passive,
    /// Explicitly invoked, has a cooldown and optionally multiple phases
    Active,
}

/// Flags attached to a resolved damage amount
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageFlags {
    /// The base amount was multiplied by the critical multiplier
    pub critical: bool,
    /// The execute override replaced the composed amount
    pub execute: bool,
    /// This hit came from a scheduled resolution (projectile impact,
    /// charge release) rather than a direct report
    pub secondary_hit: bool,
}

/// Snapshot of a target's health, supplied by the combat resolver.
///
/// The engine never stores health; the resolver passes a snapshot with
/// every inbound damage report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetVitals {
    pub current_health: f64,
    pub max_health: f64,
}

impl TargetVitals {
    pub fn new(current_health: f64, max_health: f64) -> Self {
        TargetVitals {
            current_health,
            max_health,
        }
    }

    /// Remaining health as a fraction of max, clamped to [0, 1]
    pub fn health_fraction(&self) -> f64 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.current_health / self.max_health).clamp(0.0, 1.0)
    }
}
