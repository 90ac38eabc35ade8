//! Effect registry - per-actor timed state (stacks, marks, buffs)

mod active;

pub use active::{ActiveEffect, ExpireHook};

use crate::types::{ActorId, Tick};
use std::collections::HashMap;

/// An entry the sweep removed, reported exactly once
#[derive(Debug, Clone, PartialEq)]
pub struct ExpiredEffect {
    pub actor: ActorId,
    pub effect_id: String,
    pub value: f64,
    pub hook: ExpireHook,
}

/// Per-actor keyed store of timed effects.
///
/// Reads are lazy-expiring: an entry whose expiry tick has arrived is
/// absent to every reader even before the periodic sweep removes it.
#[derive(Debug, Clone, Default)]
pub struct EffectRegistry {
    effects: HashMap<ActorId, HashMap<String, ActiveEffect>>,
}

impl EffectRegistry {
    pub fn new() -> Self {
        EffectRegistry {
            effects: HashMap::new(),
        }
    }

    /// Create or overwrite an entry, resetting its expiry to
    /// `now + duration`. Overwriting is refresh, not stack: callers that
    /// want stacking use `increment_stack`.
    pub fn set_or_refresh(
        &mut self,
        actor: ActorId,
        effect_id: &str,
        value: f64,
        duration: u64,
        now: Tick,
        hook: ExpireHook,
    ) {
        self.effects.entry(actor).or_default().insert(
            effect_id.to_string(),
            ActiveEffect::new(value, now, now + duration, hook),
        );
    }

    /// Add one stack, clamped at `max_stack`, refreshing expiry on every
    /// call whether or not the clamp was hit. Returns the new count.
    ///
    /// Expiry wins over a same-tick increment: an entry already due to
    /// expire at `now` cannot be refreshed and the increment starts a
    /// fresh entry at count 1.
    pub fn increment_stack(
        &mut self,
        actor: ActorId,
        effect_id: &str,
        max_stack: u32,
        duration: u64,
        now: Tick,
        hook: ExpireHook,
    ) -> u32 {
        let entries = self.effects.entry(actor).or_default();
        if let Some(entry) = entries.get_mut(effect_id) {
            if !entry.is_expired(now) {
                let next = ((entry.value as u32) + 1).min(max_stack.max(1));
                entry.value = next as f64;
                entry.applied_at = now;
                entry.expires_at = now + duration;
                entry.on_expire = hook;
                return next;
            }
        }

        entries.insert(
            effect_id.to_string(),
            ActiveEffect::new(1.0, now, now + duration, hook),
        );
        1
    }

    /// Lazy-expiry read: absent once `now >= expires_at`
    pub fn get(&self, actor: ActorId, effect_id: &str, now: Tick) -> Option<f64> {
        self.effects
            .get(&actor)
            .and_then(|entries| entries.get(effect_id))
            .filter(|effect| !effect.is_expired(now))
            .map(|effect| effect.value)
    }

    /// Current stack count, 0 if absent or expired
    pub fn stacks(&self, actor: ActorId, effect_id: &str, now: Tick) -> u32 {
        self.get(actor, effect_id, now).map(|v| v as u32).unwrap_or(0)
    }

    /// Remove one entry. Returns true if a live or unswept entry existed.
    pub fn clear(&mut self, actor: ActorId, effect_id: &str) -> bool {
        self.effects
            .get_mut(&actor)
            .map(|entries| entries.remove(effect_id).is_some())
            .unwrap_or(false)
    }

    /// Purge every entry for an actor
    pub fn clear_all(&mut self, actor: ActorId) {
        self.effects.remove(&actor);
    }

    /// Remove expired entries and report each exactly once, with its hook
    /// tag. Report order is sorted by (actor, effect id) so sweeps are
    /// reproducible.
    pub fn sweep(&mut self, now: Tick) -> Vec<ExpiredEffect> {
        let mut expired = Vec::new();
        for (&actor, entries) in self.effects.iter_mut() {
            entries.retain(|effect_id, effect| {
                if effect.is_expired(now) {
                    expired.push(ExpiredEffect {
                        actor,
                        effect_id: effect_id.clone(),
                        value: effect.value,
                        hook: effect.on_expire.clone(),
                    });
                    false
                } else {
                    true
                }
            });
        }
        self.effects.retain(|_, entries| !entries.is_empty());
        expired.sort_by(|a, b| (a.actor, &a.effect_id).cmp(&(b.actor, &b.effect_id)));
        expired
    }

    /// Live entry count for an actor
    pub fn active_count(&self, actor: ActorId, now: Tick) -> usize {
        self.effects
            .get(&actor)
            .map(|entries| entries.values().filter(|e| !e.is_expired(now)).count())
            .unwrap_or(0)
    }
}
