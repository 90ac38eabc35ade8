//! ActiveEffect - a timed keyed value attached to an actor

use crate::types::Tick;
use serde::{Deserialize, Serialize};

/// What happens when an effect expires out of the registry.
///
/// A closed tag set, resolved by the engine when the sweep reports the
/// expiry; the registry itself never runs behavior.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpireHook {
    #[default]
    None,
    /// Notify the passive ability that owns this effect
    NotifyOwner { ability_id: String },
}

/// An active timed entry: stack counter, mark, or flat bonus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    /// Stack count or flat bonus, depending on the owning ability
    pub value: f64,
    pub applied_at: Tick,
    pub expires_at: Tick,
    pub on_expire: ExpireHook,
}

impl ActiveEffect {
    pub fn new(value: f64, applied_at: Tick, expires_at: Tick, on_expire: ExpireHook) -> Self {
        ActiveEffect {
            value,
            applied_at,
            expires_at,
            on_expire,
        }
    }

    /// An effect whose expiry tick has arrived is logically absent, even
    /// while it is still waiting for the sweep to remove it.
    pub fn is_expired(&self, now: Tick) -> bool {
        now >= self.expires_at
    }

    /// Ticks left before expiry
    pub fn remaining(&self, now: Tick) -> u64 {
        self.expires_at.saturating_sub(now)
    }
}
