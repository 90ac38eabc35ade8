//! Collaborator seams - interfaces the engine consumes but never
//! implements
//!
//! Spatial storage, power profiles, and feedback rendering live in the
//! host. The engine treats every query result as a snapshot valid only
//! within the current call.

use crate::engine::EngineEvent;
use crate::types::ActorId;

/// World-position queries, answered by the host's spatial store
pub trait SpatialQuery {
    /// Cooperating actors within `radius` of `origin`, the origin itself
    /// excluded
    fn nearby_allies(&self, origin: ActorId, radius: f64) -> Vec<ActorId>;

    /// Hostile actors within `radius` of `origin`
    fn nearby_enemies(&self, origin: ActorId, radius: f64) -> Vec<ActorId>;

    /// Distance between two entities, or None when either has left the
    /// world
    fn distance(&self, a: ActorId, b: ActorId) -> Option<f64>;
}

/// Read-only actor power data. The engine never mutates this profile.
pub trait PowerProfile {
    /// Power-level multiplier, at least 1.0
    fn stat_multiplier(&self, actor: ActorId) -> f64;

    /// Content-tier index the actor is currently rated for
    fn power_tier(&self, actor: ActorId) -> u32;
}

/// Write-only channel for user-facing notifications.
///
/// The engine emits semantic events and moves on; rendering (text,
/// sound, particles) is entirely the sink's business and must never
/// block the tick loop.
pub trait FeedbackSink {
    fn notify(&mut self, event: &EngineEvent);
}

/// A sink that drops everything, for hosts that render nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl FeedbackSink for NullSink {
    fn notify(&mut self, _event: &EngineEvent) {}
}
