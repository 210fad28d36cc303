//! Server-side target search and client-packet reach validation (C3).

use pumpkin_config::HitDetectionConfig;
use pumpkin_util::math::boundingbox::BoundingBox;
use pumpkin_util::math::vector3::Vector3;

use crate::entity::EntityId;
use crate::geometry::{block_raycast_hits, Ray};
use crate::world::CombatWorld;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Primary,
    Limit,
    Fallback,
}

/// Per-victim, last-one-wins record of a validated hit. Never reconsulted by logic; kept only
/// for post-hoc analysis when `track_hit_snapshots` is enabled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitSnapshot {
    pub ray_distance: f64,
    pub tier: Tier,
    pub attacker_eye_pos: Vector3<f64>,
    pub victim_pos: Vector3<f64>,
    pub timestamp_ms: u64,
}

/// Server-side swing search: no client-declared target, so the engine must find one.
///
/// Rejects immediately if a solid block occludes the line of sight closer than any
/// candidate entity. Among entities whose PRIMARY-expanded AABB the look ray intersects
/// within `server_side_reach`, returns the one with the smallest ray parameter `t`.
pub fn find_swing_target(
    attacker: EntityId,
    world: &dyn CombatWorld,
    config: &HitDetectionConfig,
) -> Option<EntityId> {
    let attacker_entity = world.entity(attacker)?;
    let eye = attacker_entity.eye_pos();
    let ray = Ray::new(eye, attacker_entity.look_direction());

    let mut best: Option<(EntityId, f64)> = None;
    for candidate in world.living_entities_near(attacker) {
        if candidate == attacker {
            continue;
        }
        let Some(target) = world.entity(candidate) else {
            continue;
        };
        let expanded = target.bounding_box().expand(config.hitbox_expansion_primary);
        let Some((_, t)) = ray.intersect_aabb(&expanded) else {
            continue;
        };
        if t > config.server_side_reach {
            continue;
        }
        if block_raycast_hits(&ray, t, world) {
            continue;
        }
        if best.is_none_or(|(_, best_t)| t < best_t) {
            best = Some((candidate, t));
        }
    }

    best.map(|(id, _)| id)
}

/// Tries PRIMARY, then LIMIT, then a direct eye-to-center FALLBACK (no raycast at all), and
/// returns the first snapshot that succeeds. Always succeeds — FALLBACK never misses.
fn precise_snapshot(
    eye: Vector3<f64>,
    ray: &Ray,
    victim_box: &BoundingBox,
    config: &HitDetectionConfig,
) -> HitSnapshot {
    for (tier, expansion) in [
        (Tier::Primary, config.hitbox_expansion_primary),
        (Tier::Limit, config.hitbox_expansion_limit),
    ] {
        let expanded = victim_box.expand(expansion);
        if let Some((_, t)) = ray.intersect_aabb(&expanded) {
            return HitSnapshot {
                ray_distance: t,
                tier,
                attacker_eye_pos: eye,
                victim_pos: victim_box.center(),
                timestamp_ms: 0,
            };
        }
    }

    HitSnapshot {
        ray_distance: victim_box.center().distance_to(&eye),
        tier: Tier::Fallback,
        attacker_eye_pos: eye,
        victim_pos: victim_box.center(),
        timestamp_ms: 0,
    }
}

/// Validates a client-declared attack `attacker -> victim`. On success, returns the computed
/// [`HitSnapshot`] (with `timestamp_ms` filled in from the world clock); on failure, returns
/// `None` — a silent reject per §4.3/§7, never an error.
pub fn validate_client_attack(
    attacker: EntityId,
    victim: EntityId,
    world: &dyn CombatWorld,
    config: &HitDetectionConfig,
) -> Option<HitSnapshot> {
    let attacker_entity = world.entity(attacker)?;
    let victim_entity = world.entity(victim)?;

    let eye = attacker_entity.eye_pos();
    let victim_box = victim_entity.bounding_box();
    let limit_box = victim_box.expand(config.hitbox_expansion_limit);

    let distance = limit_box.closest_point(&eye).distance_to(&eye);
    if distance > config.attack_packet_reach {
        return None;
    }

    if config.enable_angle_validation {
        let look = attacker_entity.look_direction();
        let to_victim = (victim_box.center() - eye).normalize();
        let cos_angle = look.dot(&to_victim).clamp(-1.0, 1.0);
        let angle_degrees = cos_angle.acos().to_degrees();
        if angle_degrees > config.angle_threshold {
            return None;
        }
    }

    let ray = Ray::new(eye, attacker_entity.look_direction());
    let mut snapshot = precise_snapshot(eye, &ray, &victim_box, config);
    snapshot.timestamp_ms = world.now_ms();
    Some(snapshot)
}

#[cfg(test)]
mod test {
    use super::*;
    use pumpkin_util::math::boundingbox::EntityDimensions;
    use std::collections::HashMap;

    use crate::entity::Entity;

    struct TestWorld {
        entities: HashMap<EntityId, Entity>,
    }

    impl crate::geometry::BlockOccluder for TestWorld {
        fn is_solid_at(&self, _pos: Vector3<f64>) -> bool {
            false
        }
    }

    impl CombatWorld for TestWorld {
        fn living_entities_near(&self, viewer: EntityId) -> Vec<EntityId> {
            self.entities.keys().copied().filter(|id| *id != viewer).collect()
        }
        fn entity(&self, id: EntityId) -> Option<&Entity> {
            self.entities.get(&id)
        }
        fn player(&self, _id: EntityId) -> Option<&crate::entity::Player> {
            None
        }
        fn current_tick(&self) -> u64 {
            0
        }
        fn now_ms(&self) -> u64 {
            1_000
        }
    }

    fn make_world(victim_pos: Vector3<f64>) -> TestWorld {
        let mut entities = HashMap::new();
        entities.insert(1, Entity::new(1, Vector3::new(0.0, 1.0, 0.0), EntityDimensions::new(0.6, 1.8)));
        entities.insert(2, Entity::new(2, victim_pos, EntityDimensions::new(0.6, 1.8)));
        TestWorld { entities }
    }

    #[test]
    fn swing_search_finds_entity_dead_ahead() {
        let world = make_world(Vector3::new(2.0, 1.0, 0.0));
        world.entities[&1].yaw.store(-90.0);
        let config = HitDetectionConfig::default();
        let target = find_swing_target(1, &world, &config);
        assert_eq!(target, Some(2));
    }

    #[test]
    fn reach_fail_rejects_distant_victim() {
        let world = make_world(Vector3::new(5.0, 0.0, 0.0));
        let config = HitDetectionConfig {
            attack_packet_reach: 4.0,
            ..HitDetectionConfig::default()
        };
        let result = validate_client_attack(1, 2, &world, &config);
        assert!(result.is_none());
    }

    #[test]
    fn close_attack_validates_with_primary_tier() {
        let world = make_world(Vector3::new(1.2, 1.0, 0.0));
        world.entities[&1].yaw.store(-90.0);
        let config = HitDetectionConfig::default();
        let snapshot = validate_client_attack(1, 2, &world, &config).unwrap();
        assert_eq!(snapshot.tier, Tier::Primary);
    }
}
