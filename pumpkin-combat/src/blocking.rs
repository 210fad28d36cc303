//! Input-driven blocking state machine (C7).

use dashmap::DashMap;

use pumpkin_config::BlockingConfig;

use crate::entity::{EntityId, ItemRef};

/// Multiplicative attenuation blocking applies to knockback strength, resolved once per hit
/// from the owning player's [`BlockingConfig`] (itself subject to C2 layering upstream).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockingAttenuation {
    pub horizontal_multiplier: f64,
    pub vertical_multiplier: f64,
}

impl From<&BlockingConfig> for BlockingAttenuation {
    fn from(config: &BlockingConfig) -> Self {
        Self {
            horizontal_multiplier: config.knockback_horizontal_multiplier,
            vertical_multiplier: config.knockback_vertical_multiplier,
        }
    }
}

/// Per-player blocking state (§3). `started_tick` exists for observers (duration-based
/// cosmetics); the engine's own attenuation contract doesn't consult it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BlockingRecord {
    original_offhand_item: Option<ItemRef>,
    started_tick: u64,
}

/// `IDLE <-> BLOCKING` state machine for every player currently known to the engine.
/// Transitions are driven only by client packets and are idempotent: entering BLOCKING while
/// already BLOCKING, or leaving IDLE while already IDLE, is a no-op.
#[derive(Default)]
pub struct BlockingTracker {
    states: DashMap<EntityId, BlockingRecord>,
}

impl BlockingTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_blocking(&self, player: EntityId) -> bool {
        self.states.contains_key(&player)
    }

    /// Enters BLOCKING, snapshotting `current_offhand`. No-op if already blocking.
    pub fn start_blocking(&self, player: EntityId, current_offhand: Option<ItemRef>, tick: u64) {
        self.states.entry(player).or_insert(BlockingRecord {
            original_offhand_item: current_offhand,
            started_tick: tick,
        });
    }

    /// Leaves BLOCKING, returning the off-hand item that should be restored. No-op (returns
    /// `None`) if not currently blocking.
    pub fn stop_blocking(&self, player: EntityId) -> Option<Option<ItemRef>> {
        self.states.remove(&player).map(|(_, record)| record.original_offhand_item)
    }

    /// Called on death/disconnect/instance-change: forces IDLE without restoring offhand
    /// (the player's inventory is being torn down anyway by the owning world).
    pub fn clear(&self, player: EntityId) {
        self.states.remove(&player);
    }
}

/// Resolves the attenuation a blocking victim applies to an incoming damage/knockback event,
/// or `None` if the victim isn't blocking or the damage type isn't blockable.
#[must_use]
pub fn resolve_attenuation(
    tracker: &BlockingTracker,
    victim: EntityId,
    damage_type_blockable: bool,
    config: &BlockingConfig,
) -> Option<BlockingAttenuation> {
    if !config.enabled || !damage_type_blockable || !tracker.is_blocking(victim) {
        return None;
    }
    Some(BlockingAttenuation::from(config))
}

/// Applies damage attenuation (§4.7: `final = raw * (1 - damageReduction)`).
#[must_use]
pub fn attenuate_damage(raw_damage: f64, config: &BlockingConfig) -> f64 {
    raw_damage * (1.0 - config.damage_reduction)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn start_stop_restores_offhand_item() {
        let tracker = BlockingTracker::new();
        let item = Some(ItemRef(42));
        tracker.start_blocking(1, item, 100);
        assert!(tracker.is_blocking(1));
        let restored = tracker.stop_blocking(1);
        assert_eq!(restored, Some(item));
        assert!(!tracker.is_blocking(1));
    }

    #[test]
    fn start_blocking_twice_is_idempotent() {
        let tracker = BlockingTracker::new();
        tracker.start_blocking(1, Some(ItemRef(1)), 10);
        tracker.start_blocking(1, Some(ItemRef(2)), 20);
        let restored = tracker.stop_blocking(1);
        assert_eq!(restored, Some(Some(ItemRef(1))), "second start should be a no-op");
    }

    #[test]
    fn stop_blocking_when_idle_is_a_no_op() {
        let tracker = BlockingTracker::new();
        assert_eq!(tracker.stop_blocking(1), None);
    }

    #[test]
    fn damage_attenuation_reduces_blockable_hit_by_configured_factor() {
        let config = BlockingConfig {
            damage_reduction: 0.5,
            ..BlockingConfig::default()
        };
        assert!((attenuate_damage(10.0, &config) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn non_blockable_damage_type_skips_attenuation() {
        let tracker = BlockingTracker::new();
        tracker.start_blocking(1, None, 0);
        let config = BlockingConfig::default();
        assert!(resolve_attenuation(&tracker, 1, false, &config).is_none());
    }
}
