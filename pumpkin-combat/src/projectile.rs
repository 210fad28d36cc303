//! Shooter attribution, collision delay, and damage/knockback routing for projectile impacts
//! (C8). Velocity scaling, gravity, and drag belong to the world/physics collaborator (§4.8);
//! this module only carries what the impact accounting itself needs.

use pumpkin_util::math::vector3::Vector3;

use crate::entity::EntityId;
use crate::knockback::ProjectileOrigin;

/// Ticks after spawn during which a projectile ignores collisions against its own shooter, so
/// an arrow doesn't register a hit on the player who just fired it.
pub const SHOOTER_COLLISION_DELAY_TICKS: u64 = 5;

/// Which point a projectile's knockback direction is measured from (§4.4/§4.8), resolved
/// per-shot through the C2 projectile tag family alongside the rest of the projectile velocity
/// config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileOriginMode {
    /// The shooter's position snapshot taken at spawn time.
    ShooterOrigin,
    /// The projectile's own current position.
    AttackerPosition,
    /// A fishing bobber's landing position.
    BobberRelative,
}

/// A projectile's attribution data: who fired it, from where, and when. The projectile
/// *references* its shooter by id rather than owning it (§9 "arena + id"); a disconnected
/// shooter simply makes `shooter_id` resolve to `None` downstream.
#[derive(Debug, Clone, Copy)]
pub struct Projectile {
    pub id: EntityId,
    pub shooter_id: Option<EntityId>,
    pub shooter_origin_pos: Vector3<f64>,
    pub spawn_tick: u64,
}

impl Projectile {
    #[must_use]
    pub fn new(
        id: EntityId,
        shooter_id: Option<EntityId>,
        shooter_origin_pos: Vector3<f64>,
        spawn_tick: u64,
    ) -> Self {
        Self {
            id,
            shooter_id,
            shooter_origin_pos,
            spawn_tick,
        }
    }

    /// Whether a collision against `candidate` should be ignored because the projectile is
    /// still inside its own shooter's collision-delay window.
    #[must_use]
    pub fn ignores_collision_with(&self, candidate: EntityId, current_tick: u64) -> bool {
        self.shooter_id == Some(candidate)
            && current_tick.saturating_sub(self.spawn_tick) < SHOOTER_COLLISION_DELAY_TICKS
    }

    /// Resolves the direction origin for knockback, given the configured mode. `current_pos`
    /// is the projectile's own position at impact; `bobber_landing_pos` is only consulted for
    /// `BobberRelative` and falls back to `current_pos` if absent.
    #[must_use]
    pub fn direction_origin(
        &self,
        mode: ProjectileOriginMode,
        current_pos: Vector3<f64>,
        bobber_landing_pos: Option<Vector3<f64>>,
    ) -> ProjectileOrigin {
        match mode {
            ProjectileOriginMode::ShooterOrigin => ProjectileOrigin::ShooterOrigin(self.shooter_origin_pos),
            ProjectileOriginMode::AttackerPosition => ProjectileOrigin::AttackerPosition(current_pos),
            ProjectileOriginMode::BobberRelative => {
                ProjectileOrigin::BobberRelative(bobber_landing_pos.unwrap_or(current_pos))
            }
        }
    }
}

/// How a projectile's impact damage amount is computed (§4.8 step 2): arrows scale with impact
/// velocity, thrown items and bobbers carry a flat configured amount.
#[derive(Debug, Clone, Copy)]
pub enum ProjectileDamageKind {
    Arrow { base_damage: f64 },
    Thrown { amount: f64 },
}

#[must_use]
pub fn projectile_damage_amount(kind: ProjectileDamageKind, velocity_magnitude: f64) -> f64 {
    match kind {
        ProjectileDamageKind::Arrow { base_damage } => base_damage * velocity_magnitude,
        ProjectileDamageKind::Thrown { amount } => amount,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn projectile() -> Projectile {
        Projectile::new(10, Some(1), Vector3::new(10.0, 0.0, 0.0), 100)
    }

    #[test]
    fn ignores_shooter_within_delay_window() {
        let p = projectile();
        assert!(p.ignores_collision_with(1, 104));
        assert!(!p.ignores_collision_with(1, 105));
    }

    #[test]
    fn does_not_ignore_other_entities() {
        let p = projectile();
        assert!(!p.ignores_collision_with(2, 100));
    }

    #[test]
    fn missing_shooter_never_ignores_collisions() {
        let p = Projectile::new(10, None, Vector3::ZERO, 100);
        assert!(!p.ignores_collision_with(1, 100));
    }

    #[test]
    fn shooter_origin_mode_uses_spawn_snapshot() {
        let p = projectile();
        let origin = p.direction_origin(ProjectileOriginMode::ShooterOrigin, Vector3::new(5.0, 0.0, 0.0), None);
        match origin {
            ProjectileOrigin::ShooterOrigin(pos) => assert_eq!(pos, p.shooter_origin_pos),
            _ => panic!("wrong origin variant"),
        }
    }

    #[test]
    fn bobber_relative_falls_back_to_current_pos_when_unset() {
        let p = projectile();
        let current = Vector3::new(1.0, 2.0, 3.0);
        let origin = p.direction_origin(ProjectileOriginMode::BobberRelative, current, None);
        match origin {
            ProjectileOrigin::BobberRelative(pos) => assert_eq!(pos, current),
            _ => panic!("wrong origin variant"),
        }
    }

    #[test]
    fn arrow_damage_scales_with_velocity() {
        let amount = projectile_damage_amount(ProjectileDamageKind::Arrow { base_damage: 2.0 }, 3.0);
        assert!((amount - 6.0).abs() < 1e-9);
    }

    #[test]
    fn thrown_damage_is_flat() {
        let amount = projectile_damage_amount(ProjectileDamageKind::Thrown { amount: 4.5 }, 10.0);
        assert!((amount - 4.5).abs() < 1e-9);
    }
}
