//! Per-actor ability runtime state

use super::ActivationError;
use crate::clock::TaskHandle;
use crate::types::{ActorId, Tick};
use serde::{Deserialize, Serialize};

/// Lifecycle phase of an active ability slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityPhase {
    #[default]
    Idle,
    /// Accumulating (charge-release window)
    Charging,
    /// Resolution in flight (projectile travel, release in progress)
    Executing,
    /// Resolved, waiting out the cooldown
    OnCooldown,
}

/// Mutable state for one actor × ability slot.
///
/// Phase transitions are monotonic within one activation:
/// Idle → Charging → Executing → OnCooldown → Idle, with Charging
/// optional. The cooldown decays lazily: a slot stored as OnCooldown
/// reads as Idle once the expiry tick arrives.
#[derive(Debug, Clone, Default)]
pub struct AbilityState {
    phase: AbilityPhase,
    pub cooldown_expires_at: Option<Tick>,
    /// Phase-local accumulator (stored blocked damage during a charge
    /// window)
    pub accumulator: f64,
    /// Handle for the pending phase-advance task, so a removal or a
    /// superseding activation can cancel the stale phase
    pub pending_task: Option<TaskHandle>,
    /// Target resolved at activation
    pub target: Option<ActorId>,
}

impl AbilityState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Effective phase at `now`, with lazy cooldown decay applied
    pub fn phase_at(&self, now: Tick) -> AbilityPhase {
        match self.phase {
            AbilityPhase::OnCooldown => match self.cooldown_expires_at {
                Some(expires) if now < expires => AbilityPhase::OnCooldown,
                _ => AbilityPhase::Idle,
            },
            other => other,
        }
    }

    /// Gate for `activate`: only an Idle, off-cooldown slot may start
    pub fn check_activation(&self, now: Tick) -> Result<(), ActivationError> {
        match self.phase_at(now) {
            AbilityPhase::Idle => Ok(()),
            AbilityPhase::OnCooldown => {
                let expires = self.cooldown_expires_at.unwrap_or(now);
                Err(ActivationError::OnCooldown {
                    remaining: expires.saturating_sub(now),
                })
            }
            phase => Err(ActivationError::InvalidState { phase }),
        }
    }

    /// Enter the charge window
    pub fn begin_charging(&mut self, target: Option<ActorId>, pending: TaskHandle) {
        self.phase = AbilityPhase::Charging;
        self.accumulator = 0.0;
        self.pending_task = Some(pending);
        self.target = target;
    }

    /// Enter execution (projectile in flight, or release resolving)
    pub fn begin_executing(&mut self, target: Option<ActorId>, pending: Option<TaskHandle>) {
        self.phase = AbilityPhase::Executing;
        self.pending_task = pending;
        self.target = target;
    }

    pub fn is_charging(&self) -> bool {
        self.phase == AbilityPhase::Charging
    }

    /// Complete the activation: clear phase-local state and start the
    /// cooldown
    pub fn resolve(&mut self, now: Tick, cooldown_ticks: u64) {
        self.phase = AbilityPhase::OnCooldown;
        self.cooldown_expires_at = Some(now + cooldown_ticks);
        self.accumulator = 0.0;
        self.pending_task = None;
        self.target = None;
    }

    /// Abandon any in-flight activation, returning the pending task
    /// handle so the caller can cancel it. Cooldown state is preserved.
    pub fn abandon(&mut self) -> Option<TaskHandle> {
        if matches!(self.phase, AbilityPhase::Charging | AbilityPhase::Executing) {
            self.phase = AbilityPhase::Idle;
        }
        self.accumulator = 0.0;
        self.target = None;
        self.pending_task.take()
    }
}
