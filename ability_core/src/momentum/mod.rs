//! Momentum tracker - time-decaying combo/streak counters and fever state
//!
//! All timing in this module is wall-clock seconds fed in by the host, so
//! decay behaves identically under any tick rate. Counter decay is applied
//! lazily on read and again on write; the periodic sweep only exists to
//! end fever (and emit the event) independently of new events.

use crate::config::MomentumConstants;
use crate::types::ActorId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-actor combo bookkeeping
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComboState {
    pub combo_count: u32,
    pub streak_count: u32,
    pub last_event_at: f64,
    pub fever_active: bool,
    pub fever_started_at: f64,
}

/// The tracker's answer when the pipeline asks for its contribution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MomentumContribution {
    /// Capped combo bonus + capped streak bonus
    pub additive: f64,
    pub combo_bonus: f64,
    pub streak_bonus: f64,
    pub fever_active: bool,
}

/// Derives momentum state from kill/hit events
#[derive(Debug, Clone)]
pub struct MomentumTracker {
    constants: MomentumConstants,
    states: HashMap<ActorId, ComboState>,
}

impl MomentumTracker {
    pub fn new(constants: MomentumConstants) -> Self {
        MomentumTracker {
            constants,
            states: HashMap::new(),
        }
    }

    /// Record a qualifying event (hit or kill). Returns true when this
    /// event activated fever.
    pub fn register_event(&mut self, actor: ActorId, now: f64) -> bool {
        let constants = &self.constants;
        let state = self.states.entry(actor).or_default();

        let since_last = now - state.last_event_at;
        if state.combo_count > 0 && since_last > constants.combo_timeout_secs {
            state.combo_count = 0;
        }
        if state.streak_count > 0 && since_last > constants.streak_timeout_secs {
            state.streak_count = 0;
        }

        let before = state.streak_count;
        state.combo_count += 1;
        state.streak_count += 1;
        state.last_event_at = now;

        // Activation happens exactly once, on crossing the threshold from
        // below. Reaching it again while fever is already running neither
        // re-triggers nor extends.
        let crossed =
            before < constants.fever_threshold && state.streak_count >= constants.fever_threshold;
        if crossed && !state.fever_active {
            state.fever_active = true;
            state.fever_started_at = now;
            return true;
        }
        false
    }

    /// Zero combo, streak, and fever immediately (actor defeated)
    pub fn register_reset(&mut self, actor: ActorId) {
        if let Some(state) = self.states.get_mut(&actor) {
            *state = ComboState::default();
        }
    }

    /// Forget an actor entirely
    pub fn remove_actor(&mut self, actor: ActorId) {
        self.states.remove(&actor);
    }

    /// End fever for every actor whose duration has elapsed. Returns the
    /// affected actors, sorted, so the caller can emit events.
    pub fn sweep(&mut self, now: f64) -> Vec<ActorId> {
        let duration = self.constants.fever_duration_secs;
        let mut ended = Vec::new();
        for (&actor, state) in self.states.iter_mut() {
            if state.fever_active && now - state.fever_started_at >= duration {
                state.fever_active = false;
                ended.push(actor);
            }
        }
        ended.sort();
        ended
    }

    /// The tracker's pipeline contribution for an actor
    pub fn contribution(&self, actor: ActorId, now: f64) -> MomentumContribution {
        let constants = &self.constants;
        let combo = self.combo_count(actor, now) as f64;
        let streak = self.streak_count(actor, now) as f64;

        let combo_bonus = (combo * constants.combo_bonus_per_event).min(constants.combo_bonus_cap);
        let streak_bonus =
            (streak * constants.streak_bonus_per_event).min(constants.streak_bonus_cap);

        MomentumContribution {
            additive: combo_bonus + streak_bonus,
            combo_bonus,
            streak_bonus,
            fever_active: self.fever_active(actor, now),
        }
    }

    /// Combo count with lazy timeout decay applied
    pub fn combo_count(&self, actor: ActorId, now: f64) -> u32 {
        match self.states.get(&actor) {
            Some(state) if now - state.last_event_at <= self.constants.combo_timeout_secs => {
                state.combo_count
            }
            _ => 0,
        }
    }

    /// Streak count with lazy timeout decay applied
    pub fn streak_count(&self, actor: ActorId, now: f64) -> u32 {
        match self.states.get(&actor) {
            Some(state) if now - state.last_event_at <= self.constants.streak_timeout_secs => {
                state.streak_count
            }
            _ => 0,
        }
    }

    /// Fever state with the duration checked lazily, so reads between
    /// sweeps stay exact
    pub fn fever_active(&self, actor: ActorId, now: f64) -> bool {
        match self.states.get(&actor) {
            Some(state) => {
                state.fever_active
                    && now - state.fever_started_at < self.constants.fever_duration_secs
            }
            None => false,
        }
    }
}
