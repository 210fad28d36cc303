//! `CombatEngine`: the single explicit entry point a host constructs once, owning every
//! per-player/per-victim map the rest of this crate's modules describe in isolation, and
//! exposing C1-C9 as plain methods called from the host's tick loop and packet threads.

use std::collections::HashMap;

use dashmap::DashMap;

use pumpkin_config::{CombatConfig, KnockbackConfig};
use pumpkin_data::{DamageType, DamageTypeProperties};
use pumpkin_util::math::vector3::Vector3;

use crate::blocking::{self, BlockingAttenuation, BlockingTracker};
use crate::compatibility::{ElytraTracker, LegacyHealthSuppressor};
use crate::damage::{self, DamageEvent, DamageOutcome, InvulnerabilityTracker};
use crate::entity::{Entity, EntityId, ItemRef, Player};
use crate::error::EngineError;
use crate::hit_detection::{self, HitSnapshot};
use crate::knockback::{self, AttackResult, KnockbackContext, KnockbackKind};
use crate::knockback_sync::{self, PingTracker, PositionRing, PositionSnapshot, SyncConfig};
use crate::projectile::{Projectile, ProjectileDamageKind, ProjectileOriginMode, projectile_damage_amount};
use crate::tags::{self, Layer, Resolvable, TagLayer};
use crate::world::CombatWorld;

/// Dispatches the velocity packet a knockback resolution produces. The network layer is an
/// external collaborator (§1); this crate only ever calls through this trait.
pub trait KnockbackSink {
    fn send_velocity(&self, entity: EntityId, velocity: Vector3<f64>);
}

/// Observer-only side effects of the blocking state machine (particles, action bar, anvil
/// sound). These must never influence the numeric contracts in [`crate::blocking`].
pub trait BlockEffectSink {
    fn on_start_blocking(&self, player: EntityId);
    fn on_stop_blocking(&self, player: EntityId);
}

/// Entity-metadata packets driven by combat state: the block/unblock animation to interested
/// viewers.
pub trait MetadataSink {
    fn send_blocking_animation(&self, player: EntityId, blocking: bool);
}

/// No-op implementation of all three sink traits, for tests and hosts that don't care about
/// wire effects.
pub struct NoopSinks;

impl KnockbackSink for NoopSinks {
    fn send_velocity(&self, _entity: EntityId, _velocity: Vector3<f64>) {}
}

impl BlockEffectSink for NoopSinks {
    fn on_start_blocking(&self, _player: EntityId) {}
    fn on_stop_blocking(&self, _player: EntityId) {}
}

impl MetadataSink for NoopSinks {
    fn send_blocking_animation(&self, _player: EntityId, _blocking: bool) {}
}

/// Lets a [`KnockbackConfig`] flow through the C2 tag resolver. Multiplier/modify layers only
/// touch the numeric fields; `modern`/`knockback_sync_supported` are carried unchanged unless
/// a layer supplies a `custom` override of the whole record.
impl Resolvable for KnockbackConfig {
    fn apply_multiplier(&mut self, factor: &Self) {
        self.horizontal *= factor.horizontal;
        self.vertical *= factor.vertical;
        self.vertical_limit *= factor.vertical_limit;
        self.sprint_bonus_h *= factor.sprint_bonus_h;
        self.sprint_bonus_v *= factor.sprint_bonus_v;
        self.air_multiplier_h *= factor.air_multiplier_h;
        self.air_multiplier_v *= factor.air_multiplier_v;
        self.look_weight *= factor.look_weight;
    }

    fn apply_modify(&mut self, delta: &Self) {
        self.horizontal += delta.horizontal;
        self.vertical += delta.vertical;
        self.vertical_limit += delta.vertical_limit;
        self.sprint_bonus_h += delta.sprint_bonus_h;
        self.sprint_bonus_v += delta.sprint_bonus_v;
        self.air_multiplier_h += delta.air_multiplier_h;
        self.air_multiplier_v += delta.air_multiplier_v;
        self.look_weight += delta.look_weight;
    }

    fn clamp_to_valid_range(&mut self) {
        self.look_weight = self.look_weight.clamp(0.0, 1.0);
        if self.vertical_limit < 0.0 {
            self.vertical_limit = 0.0;
        }
    }
}

/// Lets [`DamageTypeProperties`] flow through the C2 resolver. Only `multiplier` and
/// `replacement_cutoff` are numeric components; every boolean/enum field is carried unchanged
/// unless replaced outright by a `custom` layer.
impl Resolvable for DamageTypeProperties {
    fn apply_multiplier(&mut self, factor: &Self) {
        self.multiplier *= factor.multiplier;
    }

    fn apply_modify(&mut self, delta: &Self) {
        self.multiplier += delta.multiplier;
        self.replacement_cutoff += delta.replacement_cutoff;
    }

    fn clamp_to_valid_range(&mut self) {
        self.multiplier = self.multiplier.max(0.0);
        self.replacement_cutoff = self.replacement_cutoff.max(0.0);
    }
}

/// Owns every per-player/per-victim map this crate's modules describe, plus the validated
/// config bundle they're resolved against. Constructed once by the host; lifecycle
/// `init -> tick loop -> shutdown` (§9 "engine handle").
pub struct CombatEngine {
    config: CombatConfig,
    invulnerability: InvulnerabilityTracker,
    blocking: BlockingTracker,
    position_rings: DashMap<EntityId, PositionRing>,
    ping: PingTracker,
    hit_snapshots: DashMap<EntityId, HitSnapshot>,
    elytra: ElytraTracker,
    legacy_health: LegacyHealthSuppressor,
    sync_config: SyncConfig,
}

impl CombatEngine {
    /// Validates `config` and constructs an engine with empty per-entity state. The only
    /// fallible operation in this crate (§7).
    pub fn new(config: CombatConfig) -> Result<Self, EngineError> {
        config.validate()?;
        log::info!(
            "Combat engine initialized (pvp: {}, knockback-sync: {})",
            config.pvp.enabled,
            config.pvp.base_knockback.knockback_sync_supported,
        );
        Ok(Self {
            config,
            invulnerability: InvulnerabilityTracker::new(),
            blocking: BlockingTracker::new(),
            position_rings: DashMap::new(),
            ping: PingTracker::new(),
            hit_snapshots: DashMap::new(),
            elytra: ElytraTracker::new(),
            legacy_health: LegacyHealthSuppressor::new(),
            sync_config: SyncConfig::default(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    /// Drops every trace of `id` from this engine's per-entity maps. Called on disconnect,
    /// death, or instance change (§5/§9).
    pub fn remove_entity(&self, id: EntityId) {
        self.invulnerability.clear(id);
        self.blocking.clear(id);
        self.position_rings.remove(&id);
        self.ping.clear(id);
        self.hit_snapshots.remove(&id);
        self.elytra.clear(id);
        self.legacy_health.clear(id);
    }

    /// Appends a position sample to `player`'s sync ring, creating the ring on first use.
    pub fn record_position(&self, player: EntityId, snapshot: PositionSnapshot) {
        self.position_rings.entry(player).or_insert_with(PositionRing::new).push(snapshot);
    }

    pub fn record_ping(&self, player: EntityId, ping_ms: u32) {
        self.ping.record_sample(player, ping_ms);
    }

    #[must_use]
    pub fn latest_ping(&self, player: EntityId) -> u32 {
        self.ping.latest(player)
    }

    /// C3 server-side swing search.
    #[must_use]
    pub fn find_swing_target(&self, attacker: EntityId, world: &dyn CombatWorld) -> Option<EntityId> {
        hit_detection::find_swing_target(attacker, world, &self.config.hit_detection)
    }

    /// C3 client-packet reach/angle validation. Retains the resulting snapshot against
    /// `victim` only if `track_hit_snapshots` is enabled.
    pub fn validate_client_attack(
        &self,
        attacker: EntityId,
        victim: EntityId,
        world: &dyn CombatWorld,
    ) -> Option<HitSnapshot> {
        let snapshot = hit_detection::validate_client_attack(attacker, victim, world, &self.config.hit_detection)?;
        if self.config.hit_detection.track_hit_snapshots {
            self.hit_snapshots.insert(victim, snapshot);
        }
        Some(snapshot)
    }

    #[must_use]
    pub fn hit_snapshot(&self, victim: EntityId) -> Option<HitSnapshot> {
        self.hit_snapshots.get(&victim).map(|s| *s)
    }

    #[must_use]
    pub fn is_blocking(&self, player: EntityId) -> bool {
        self.blocking.is_blocking(player)
    }

    /// C7: enter BLOCKING, snapshotting the current off-hand item. No-op if already blocking.
    pub fn start_blocking(
        &self,
        player: EntityId,
        current_offhand: Option<ItemRef>,
        tick: u64,
        block_sink: &dyn BlockEffectSink,
        metadata_sink: &dyn MetadataSink,
    ) {
        let was_blocking = self.blocking.is_blocking(player);
        self.blocking.start_blocking(player, current_offhand, tick);
        if !was_blocking {
            block_sink.on_start_blocking(player);
            metadata_sink.send_blocking_animation(player, true);
        }
    }

    /// C7: leave BLOCKING, returning the off-hand item that should be restored. No-op
    /// (returns `None`) if not currently blocking.
    pub fn stop_blocking(
        &self,
        player: EntityId,
        block_sink: &dyn BlockEffectSink,
        metadata_sink: &dyn MetadataSink,
    ) -> Option<Option<ItemRef>> {
        let restored = self.blocking.stop_blocking(player)?;
        block_sink.on_stop_blocking(player);
        metadata_sink.send_blocking_animation(player, false);
        Some(restored)
    }

    #[must_use]
    fn blocking_attenuation(&self, victim: EntityId, damage_type_blockable: bool) -> Option<BlockingAttenuation> {
        blocking::resolve_attenuation(&self.blocking, victim, damage_type_blockable, &self.config.blocking)
    }

    /// C2: resolves a final [`KnockbackConfig`] from the server default plus whatever
    /// per-hit layers the caller assembled from item/attacker/victim/world tags.
    #[must_use]
    pub fn resolve_knockback_config(&self, layers: &HashMap<Layer, TagLayer<KnockbackConfig>>) -> KnockbackConfig {
        tags::resolve(&self.config.pvp.base_knockback, layers)
    }

    /// C2: resolves final [`DamageTypeProperties`] from the crate-wide default table plus
    /// per-hit layers.
    #[must_use]
    pub fn resolve_damage_properties(
        &self,
        damage_type: DamageType,
        layers: &HashMap<Layer, TagLayer<DamageTypeProperties>>,
    ) -> DamageTypeProperties {
        tags::resolve(&DamageTypeProperties::default_for(damage_type), layers)
    }

    /// C6 (plus the C7 attenuation hook): attenuates `event.amount` if the victim is
    /// currently blocking a blockable hit, scales the resolved invulnerability window by the
    /// configured [`pumpkin_config::TickScalingMode`], then runs the damage pipeline.
    pub fn apply_damage(
        &self,
        victim: &Entity,
        mut event: DamageEvent,
        properties: &DamageTypeProperties,
        current_tick: u64,
        current_tps: f64,
    ) -> Option<DamageOutcome> {
        if self.blocking_attenuation(event.victim, properties.blockable).is_some() {
            event.amount = blocking::attenuate_damage(event.amount, &self.config.blocking);
        }

        let mut scaled_properties = *properties;
        scaled_properties.invulnerability_buffer_ticks = self
            .config
            .tick_scaling
            .scale_ticks(properties.invulnerability_buffer_ticks, current_tps);

        damage::apply_damage(&self.invulnerability, victim, &event, &scaled_properties, current_tick)
    }

    /// Rewinds `victim`'s position ring and rotates `base_velocity`'s direction to match, if
    /// the resolved knockback config supports sync and a ring exists for the victim (C5).
    /// Falls back to `base_velocity` unchanged otherwise.
    #[must_use]
    fn compensate_if_supported(
        &self,
        knockback_config: &KnockbackConfig,
        base_velocity: Vector3<f64>,
        victim_id: EntityId,
        victim_on_ground: bool,
        attacker_pos: Vector3<f64>,
        now_ms: u64,
        ping_victim: u32,
        ping_attacker: Option<u32>,
    ) -> Vector3<f64> {
        if !knockback_config.knockback_sync_supported {
            return base_velocity;
        }
        let Some(ring) = self.position_rings.get(&victim_id) else {
            return base_velocity;
        };
        knockback_sync::compensated_knockback(
            base_velocity,
            &ring,
            victim_on_ground,
            attacker_pos,
            now_ms,
            ping_victim,
            ping_attacker,
            &self.sync_config,
        )
        .unwrap_or(base_velocity)
    }

    /// Full melee knockback pipeline (C4 + C5 + emission): computes direction/strength from
    /// `attacker`/`victim` state, applies sync compensation if supported, writes the result
    /// onto the victim's velocity cell, and dispatches it through `sink`.
    pub fn apply_melee_hit(
        &self,
        attacker: &Player,
        victim: &Player,
        attack: &AttackResult,
        knockback_config: &KnockbackConfig,
        world: &dyn CombatWorld,
        sink: &dyn KnockbackSink,
    ) {
        let blocking = self.blocking_attenuation(victim.id(), true);
        let ctx = KnockbackContext {
            victim_on_ground: victim.entity.on_ground.load(),
            victim_velocity: victim.entity.velocity.load(),
            victim_knockback_resistance: victim.entity.knockback_resistance(),
            blocking,
        };
        let tick_rate = world.current_tps();
        let base_velocity = knockback::resolve_melee_knockback(
            &attacker.entity,
            &victim.entity,
            knockback_config,
            attack,
            &ctx,
            tick_rate,
            self.config.pvp.friction,
        );

        let velocity = self.compensate_if_supported(
            knockback_config,
            base_velocity,
            victim.id(),
            ctx.victim_on_ground,
            attacker.entity.pos.load(),
            world.now_ms(),
            victim.ping_ms.load(),
            Some(attacker.ping_ms.load()),
        );

        victim.entity.velocity.store(velocity);
        sink.send_velocity(victim.id(), velocity);
    }

    /// C8: routes a projectile's impact against `victim` through the damage pipeline and,
    /// if the hit should still impart knockback, through C4/C5. Returns `None` if the
    /// collision is ignored (shooter inside its own collision-delay window) or the damage
    /// event is cancelled.
    #[allow(clippy::too_many_arguments)]
    pub fn apply_projectile_hit(
        &self,
        projectile: &Projectile,
        current_pos: Vector3<f64>,
        victim: &Player,
        world: &dyn CombatWorld,
        damage_kind: ProjectileDamageKind,
        velocity_magnitude: f64,
        damage_type: DamageType,
        damage_props: &DamageTypeProperties,
        knockback_config: &KnockbackConfig,
        origin_mode: ProjectileOriginMode,
        bobber_landing_pos: Option<Vector3<f64>>,
        sink: &dyn KnockbackSink,
    ) -> Option<DamageOutcome> {
        if projectile.ignores_collision_with(victim.id(), world.current_tick()) {
            return None;
        }

        let amount = projectile_damage_amount(damage_kind, velocity_magnitude);
        let event = DamageEvent {
            victim: victim.id(),
            source: projectile.shooter_id,
            damage_type,
            amount,
            weapon: None,
        };
        let outcome = self.apply_damage(&victim.entity, event, damage_props, world.current_tick(), world.current_tps())?;

        if outcome.should_apply_knockback {
            let attack = AttackResult {
                kind: KnockbackKind::Projectile,
                attacker_was_sprinting: false,
                knockback_enchant_level: 0,
                attacker_look_xz: None,
            };
            let blocking = self.blocking_attenuation(victim.id(), damage_props.blockable);
            let ctx = KnockbackContext {
                victim_on_ground: victim.entity.on_ground.load(),
                victim_velocity: victim.entity.velocity.load(),
                victim_knockback_resistance: victim.entity.knockback_resistance(),
                blocking,
            };
            let origin = projectile.direction_origin(origin_mode, current_pos, bobber_landing_pos);
            let origin_pos = origin.origin();
            let tick_rate = world.current_tps();
            let base_velocity = knockback::resolve_projectile_knockback(
                origin,
                victim.entity.pos.load(),
                knockback_config,
                &attack,
                &ctx,
                tick_rate,
                self.config.pvp.friction,
            );

            let shooter_ping = projectile.shooter_id.and_then(|id| world.player(id)).map(|p| p.ping_ms.load());
            let velocity = self.compensate_if_supported(
                knockback_config,
                base_velocity,
                victim.id(),
                ctx.victim_on_ground,
                origin_pos,
                world.now_ms(),
                victim.ping_ms.load(),
                shooter_ping,
            );

            victim.entity.velocity.store(velocity);
            sink.send_velocity(victim.id(), velocity);
        }

        Some(outcome)
    }

    /// C9: whether an outgoing self-metadata packet for `viewer` on a MODERN connection
    /// should be suppressed. See [`crate::compatibility::should_suppress_self_metadata`].
    #[must_use]
    pub fn should_suppress_self_metadata(
        &self,
        viewer: EntityId,
        packet_entity_id: EntityId,
        pose: crate::compatibility::Pose,
        entity_flags_bit7: bool,
        on_ground: bool,
        now_ms: u64,
    ) -> bool {
        crate::compatibility::should_suppress_self_metadata(
            &self.elytra,
            viewer,
            packet_entity_id,
            pose,
            entity_flags_bit7,
            on_ground,
            now_ms,
        )
    }

    /// C9: arms one-shot health/attribute suppression for a LEGACY connection.
    pub fn arm_legacy_health_suppression(&self, player: EntityId) {
        self.legacy_health.arm(player);
    }

    /// C9: consumes this frame's armed suppression flag, if any.
    #[must_use]
    pub fn take_legacy_health_suppression(&self, player: EntityId) -> bool {
        self.legacy_health.take(player)
    }
}
