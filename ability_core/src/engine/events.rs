//! Semantic events emitted to the feedback sink

use crate::types::{ActorId, DamageFlags};
use serde::{Deserialize, Serialize};

/// Everything user-visible the engine does, as data.
///
/// The sink decides how (and whether) to render each event; the engine
/// never waits on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    AbilityActivated {
        actor: ActorId,
        ability_id: String,
        target: Option<ActorId>,
    },
    ActivationFailed {
        actor: ActorId,
        ability_id: String,
        reason: String,
    },
    /// An active ability finished executing. `fallback` marks a
    /// resolution that lost its target and burst at the source instead.
    AbilityResolved {
        actor: ActorId,
        ability_id: String,
        targets: Vec<ActorId>,
        amount: f64,
        flags: DamageFlags,
        fallback: bool,
    },
    EffectApplied {
        actor: ActorId,
        effect_id: String,
        value: f64,
    },
    EffectExpired {
        actor: ActorId,
        effect_id: String,
    },
    DamageResolved {
        source: Option<ActorId>,
        target: ActorId,
        amount: f64,
        flags: DamageFlags,
    },
    /// A charging ability absorbed part of an incoming hit
    ChargeAbsorbed {
        actor: ActorId,
        ability_id: String,
        blocked: f64,
        stored_total: f64,
    },
    FeverStarted {
        actor: ActorId,
    },
    FeverEnded {
        actor: ActorId,
    },
}
