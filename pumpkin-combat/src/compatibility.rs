//! Legacy-client metadata/health suppression (C9). These filters shape what a given connection
//! observes; they never alter authoritative server state.

use dashmap::DashMap;

use crate::entity::{EntityId, ProtocolClass};

/// Cosmetic pose values the metadata filter distinguishes. Any other pose passes through
/// unfiltered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pose {
    Standing,
    FallFlying,
    Other,
}

/// How long after a player's self-metadata last reported `FallFlying` a landing transition is
/// still accepted as the matching elytra stop, rather than filtered as unrelated noise.
pub const ELYTRA_LANDING_WINDOW_MS: u64 = 1_000;

/// Tracks, per player, the last time their self-viewed metadata reported `FallFlying`. Pruned
/// on disconnect by [`ElytraTracker::clear`].
#[derive(Default)]
pub struct ElytraTracker {
    last_flying_ms: DashMap<EntityId, u64>,
}

impl ElytraTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn mark_flying(&self, player: EntityId, now_ms: u64) {
        self.last_flying_ms.insert(player, now_ms);
    }

    #[must_use]
    fn recently_flying(&self, player: EntityId, now_ms: u64) -> bool {
        self.last_flying_ms
            .get(&player)
            .is_some_and(|t| now_ms.saturating_sub(*t) <= ELYTRA_LANDING_WINDOW_MS)
    }

    pub fn clear(&self, player: EntityId) {
        self.last_flying_ms.remove(&player);
    }
}

/// Decides whether an outgoing self-metadata packet for `viewer` should be dropped on a MODERN
/// connection (§4.9). `entity_flags_bit7` is the elytra-flapping flag carried in the same
/// packet; `pose`/`on_ground` describe the state the packet would otherwise report.
#[must_use]
pub fn should_suppress_self_metadata(
    tracker: &ElytraTracker,
    viewer: EntityId,
    packet_entity_id: EntityId,
    pose: Pose,
    entity_flags_bit7: bool,
    on_ground: bool,
    now_ms: u64,
) -> bool {
    if packet_entity_id != viewer {
        return false;
    }

    // Elytra start: always let it through, and remember it for the landing check below.
    if pose == Pose::FallFlying || entity_flags_bit7 {
        tracker.mark_flying(viewer, now_ms);
        return false;
    }

    // Elytra landing: let through if we recently saw this player start flying.
    if (pose == Pose::Standing || !entity_flags_bit7) && on_ground && tracker.recently_flying(viewer, now_ms) {
        return false;
    }

    true
}

/// Per-player one-shot suppression flags for LEGACY clients: armed when the damage system must
/// set health silently (a metadata-only heal/damage), consumed by the packet layer for that
/// single frame (§4.9).
#[derive(Default)]
pub struct LegacyHealthSuppressor {
    pending: DashMap<EntityId, ()>,
}

impl LegacyHealthSuppressor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms suppression of `player`'s next health-update/attribute packet. Callers should gate
    /// this on the connection actually being LEGACY; arming on a MODERN connection is harmless
    /// but pointless.
    pub fn arm(&self, player: EntityId) {
        self.pending.insert(player, ());
    }

    /// Consumes the armed flag, if any, returning whether this frame's health/attribute packet
    /// should be suppressed.
    #[must_use]
    pub fn take(&self, player: EntityId) -> bool {
        self.pending.remove(&player).is_some()
    }

    pub fn clear(&self, player: EntityId) {
        self.pending.remove(&player);
    }
}

#[must_use]
pub fn is_legacy(protocol: ProtocolClass) -> bool {
    matches!(protocol, ProtocolClass::Legacy)
}
