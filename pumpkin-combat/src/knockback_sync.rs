//! Position history, ping tracking, and ping-compensated knockback direction rewind (C5).

use std::collections::VecDeque;
use std::sync::Mutex;

use dashmap::DashMap;

use pumpkin_util::math::vector3::Vector3;

use crate::entity::EntityId;

pub const MAX_POSITION_SNAPSHOTS: usize = 30;
pub const MAX_PING_SAMPLES: usize = 10;

pub const DEFAULT_INTERPOLATION_FACTOR: f64 = 0.75;
pub const DEFAULT_MAX_REWIND_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSnapshot {
    pub pos: Vector3<f64>,
    pub on_ground: bool,
    pub timestamp_ms: u64,
}

/// Append-only, bounded-by-eviction ring of recent positions for one player, owned by that
/// player's network session. Readers only ever copy out a pair of snapshots (§5).
#[derive(Default)]
pub struct PositionRing {
    snapshots: Mutex<VecDeque<PositionSnapshot>>,
}

impl PositionRing {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a snapshot, dropping the oldest once the ring exceeds
    /// [`MAX_POSITION_SNAPSHOTS`]. Duplicate positions (identical to the previous snapshot)
    /// are dropped per §3's strict-time-ordering invariant.
    pub fn push(&self, snapshot: PositionSnapshot) {
        let mut ring = self.snapshots.lock().unwrap();
        if let Some(last) = ring.back() {
            if last.pos == snapshot.pos && last.on_ground == snapshot.on_ground {
                return;
            }
            if snapshot.timestamp_ms <= last.timestamp_ms {
                return;
            }
        }
        ring.push_back(snapshot);
        if ring.len() > MAX_POSITION_SNAPSHOTS {
            ring.pop_front();
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.lock().unwrap().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Locates the pair of snapshots straddling `target_ms` and linearly interpolates
    /// position between them. Returns `None` if the ring is empty; clamps to the oldest/
    /// newest snapshot if `target_ms` is out of range.
    #[must_use]
    pub fn interpolate_at(&self, target_ms: u64) -> Option<Vector3<f64>> {
        let ring = self.snapshots.lock().unwrap();
        if ring.is_empty() {
            return None;
        }
        if ring.len() == 1 {
            return Some(ring[0].pos);
        }

        if target_ms <= ring.front().unwrap().timestamp_ms {
            return Some(ring.front().unwrap().pos);
        }
        if target_ms >= ring.back().unwrap().timestamp_ms {
            return Some(ring.back().unwrap().pos);
        }

        for i in 0..ring.len() - 1 {
            let a = &ring[i];
            let b = &ring[i + 1];
            if target_ms >= a.timestamp_ms && target_ms <= b.timestamp_ms {
                let span = (b.timestamp_ms - a.timestamp_ms) as f64;
                let t = if span <= 0.0 { 0.0 } else { (target_ms - a.timestamp_ms) as f64 / span };
                return Some(Vector3::new(
                    a.pos.x + (b.pos.x - a.pos.x) * t,
                    a.pos.y + (b.pos.y - a.pos.y) * t,
                    a.pos.z + (b.pos.z - a.pos.z) * t,
                ));
            }
        }
        Some(ring.back().unwrap().pos)
    }
}

/// Per-player ring of recent ping samples, polled once per second by the owning session.
#[derive(Default)]
pub struct PingTracker {
    samples: DashMap<EntityId, Mutex<VecDeque<u32>>>,
}

impl PingTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_sample(&self, player: EntityId, ping_ms: u32) {
        let entry = self.samples.entry(player).or_insert_with(|| Mutex::new(VecDeque::new()));
        let mut ring = entry.lock().unwrap();
        ring.push_back(ping_ms);
        if ring.len() > MAX_PING_SAMPLES {
            ring.pop_front();
        }
    }

    /// Most recent ping sample for `player`, or `0` if none has been recorded yet.
    #[must_use]
    pub fn latest(&self, player: EntityId) -> u32 {
        self.samples
            .get(&player)
            .and_then(|ring| ring.lock().unwrap().back().copied())
            .unwrap_or(0)
    }

    pub fn clear(&self, player: EntityId) {
        self.samples.remove(&player);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncConfig {
    pub interpolation_factor: f64,
    pub max_rewind_ms: u64,
    pub off_ground_sync_enabled: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interpolation_factor: DEFAULT_INTERPOLATION_FACTOR,
            max_rewind_ms: DEFAULT_MAX_REWIND_MS,
            off_ground_sync_enabled: true,
        }
    }
}

/// Computes the rewind offset, in milliseconds, for a hit victim<-attacker, clamped to
/// `[0, max_rewind_ms]`.
#[must_use]
pub fn rewind_ms(ping_victim: u32, ping_attacker: Option<u32>, config: &SyncConfig) -> u64 {
    let total = f64::from(ping_victim) + f64::from(ping_attacker.unwrap_or(0));
    let rewind = total * config.interpolation_factor;
    (rewind.max(0.0) as u64).min(config.max_rewind_ms)
}

/// Rewinds the victim's position, then recomputes the XZ knockback direction from
/// `rewound_victim_pos - attacker_current_pos`, preserving the Y component and the horizontal
/// *magnitude* of `base_knockback` — only the direction is rotated (§4.5, invariant #4 of
/// §8).
#[must_use]
pub fn compensate_direction(
    base_knockback: Vector3<f64>,
    rewound_victim_pos: Vector3<f64>,
    attacker_current_pos: Vector3<f64>,
) -> Vector3<f64> {
    let magnitude = base_knockback.horizontal_length();
    if magnitude <= f64::EPSILON {
        return base_knockback;
    }
    let dx = rewound_victim_pos.x - attacker_current_pos.x;
    let dz = rewound_victim_pos.z - attacker_current_pos.z;
    let dir = Vector3::new(dx, 0.0, dz).normalize();
    Vector3::new(dir.x * magnitude, base_knockback.y, dir.z * magnitude)
}

/// Full sync pipeline: returns `None` if compensation should be skipped (victim airborne with
/// sync disabled for that case, or rewind out of `(0, max]`).
#[must_use]
pub fn compensated_knockback(
    base_knockback: Vector3<f64>,
    victim_ring: &PositionRing,
    victim_on_ground: bool,
    attacker_current_pos: Vector3<f64>,
    now_ms: u64,
    ping_victim: u32,
    ping_attacker: Option<u32>,
    config: &SyncConfig,
) -> Option<Vector3<f64>> {
    if !victim_on_ground && !config.off_ground_sync_enabled {
        return None;
    }

    let rewind = rewind_ms(ping_victim, ping_attacker, config);
    if rewind == 0 || rewind > config.max_rewind_ms {
        return None;
    }

    let target_ms = now_ms.saturating_sub(rewind);
    let rewound_pos = victim_ring.interpolate_at(target_ms)?;
    Some(compensate_direction(base_knockback, rewound_pos, attacker_current_pos))
}
