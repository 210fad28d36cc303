//! Direction, strength, modifiers, and final velocity composition (C4).

use rand::Rng;

use pumpkin_config::KnockbackConfig;
use pumpkin_util::math::vector3::Vector3;

use crate::blocking::BlockingAttenuation;
use crate::entity::Entity;

/// Below this horizontal separation, direction is unstable enough that a jitter is injected
/// before normalizing — breaks symmetry when entities are stacked exactly on top of each
/// other.
pub const MIN_KNOCKBACK_DISTANCE: f64 = 1e-4;

/// Below this Y-velocity, a victim is considered "falling" rather than merely airborne.
pub const FALLING_VELOCITY_THRESHOLD: f64 = -0.1;

/// The floor applied to vertical knockback for an airborne, falling victim.
pub const MIN_FALLING_KNOCKBACK: f64 = 0.1;

/// One level of the knockback enchantment adds this much horizontal/vertical strength, melee
/// only.
pub const KNOCKBACK_ENCHANT_BONUS: (f64, f64) = (0.6, 0.1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnockbackKind {
    Attack,
    Damage,
    Sweeping,
    Projectile,
}

/// Everything the knockback calculator needs about the hit that isn't already on the
/// attacker/victim entities themselves. Captured once at packet ingest, per §4.4's note that
/// the sprint flag "is captured into the AttackResult at packet ingest, not re-read here".
#[derive(Debug, Clone, Copy)]
pub struct AttackResult {
    pub kind: KnockbackKind,
    pub attacker_was_sprinting: bool,
    pub knockback_enchant_level: u32,
    /// `None` for a non-melee source (explosion, generic damage); present for player attacks.
    pub attacker_look_xz: Option<Vector3<f64>>,
}

/// Computes the melee/explosion direction vector (normalized, XZ-only with `y = 0`) from
/// attacker feet to victim feet, blending in look direction if `look_weight > 0`.
fn melee_direction(attacker_pos: Vector3<f64>, victim_pos: Vector3<f64>, config: &KnockbackConfig, look_xz: Option<Vector3<f64>>) -> Vector3<f64> {
    let mut dx = victim_pos.x - attacker_pos.x;
    let mut dz = victim_pos.z - attacker_pos.z;

    if (dx * dx + dz * dz).sqrt() < MIN_KNOCKBACK_DISTANCE {
        let mut rng = rand::rng();
        dx = rng.random_range(-0.02..0.02);
        dz = rng.random_range(-0.02..0.02);
    }

    let mut dir = Vector3::new(dx, 0.0, dz).normalize();

    if config.look_weight > 0.0 {
        if let Some(look) = look_xz {
            let look_flat = Vector3::new(look.x, 0.0, look.z).normalize();
            let blended = dir * (1.0 - config.look_weight) + look_flat * config.look_weight;
            dir = blended.normalize();
        }
    }

    dir
}

/// Direction origin for a projectile hit (§4.4/§4.8).
#[derive(Debug, Clone, Copy)]
pub enum ProjectileOrigin {
    /// Vector from the shooter's snapshot position at spawn time.
    ShooterOrigin(Vector3<f64>),
    /// Vector from the projectile's current position.
    AttackerPosition(Vector3<f64>),
    /// Vector from a fishing bobber's landing position.
    BobberRelative(Vector3<f64>),
}

impl ProjectileOrigin {
    #[must_use]
    pub(crate) fn origin(self) -> Vector3<f64> {
        match self {
            Self::ShooterOrigin(pos) | Self::AttackerPosition(pos) | Self::BobberRelative(pos) => pos,
        }
    }
}

fn projectile_direction(origin: ProjectileOrigin, victim_pos: Vector3<f64>) -> Vector3<f64> {
    let from = origin.origin();
    let dx = victim_pos.x - from.x;
    let dz = victim_pos.z - from.z;
    Vector3::new(dx, 0.0, dz).normalize()
}

/// The `(horizontal, vertical)` strength pair before direction is applied, after every
/// modifier (sprint bonus, enchant, air multiplier, resistance, blocking) but before the
/// vertical clamp/falling floor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnockbackStrength {
    pub horizontal: f64,
    pub vertical: f64,
}

/// Parameters describing the hit, independent of the attacker/victim entity objects
/// themselves (so this function is trivially unit-testable).
#[derive(Debug, Clone, Copy)]
pub struct KnockbackContext {
    pub victim_on_ground: bool,
    pub victim_velocity: Vector3<f64>,
    pub victim_knockback_resistance: f64,
    pub blocking: Option<BlockingAttenuation>,
}

/// Computes final `(horizontal, vertical)` strength, applying every modifier in the order
/// §4.4 specifies: sprint bonus -> sweeping halving -> enchant bonus -> air multiplier ->
/// resistance -> blocking attenuation -> falling floor/vertical clamp.
#[must_use]
pub fn compute_strength(
    config: &KnockbackConfig,
    attack: &AttackResult,
    ctx: &KnockbackContext,
) -> KnockbackStrength {
    let mut h = config.horizontal;
    let mut v = config.vertical;

    if attack.attacker_was_sprinting && matches!(attack.kind, KnockbackKind::Attack | KnockbackKind::Damage) {
        h += config.sprint_bonus_h;
        v += config.sprint_bonus_v;
    }

    if attack.kind == KnockbackKind::Sweeping {
        h *= 0.5;
        v *= 0.5;
    }

    if attack.kind != KnockbackKind::Projectile && attack.knockback_enchant_level > 0 {
        let (eh, ev) = KNOCKBACK_ENCHANT_BONUS;
        h += eh * f64::from(attack.knockback_enchant_level);
        v += ev * f64::from(attack.knockback_enchant_level);
    }

    if !ctx.victim_on_ground {
        h *= config.air_multiplier_h;
        v *= config.air_multiplier_v;
    }

    let resistance = ctx.victim_knockback_resistance.clamp(0.0, 1.0);
    h *= 1.0 - resistance;
    v *= 1.0 - resistance;

    if let Some(block) = ctx.blocking {
        h *= block.horizontal_multiplier;
        v *= block.vertical_multiplier;
    }

    let falling = !ctx.victim_on_ground && ctx.victim_velocity.y < FALLING_VELOCITY_THRESHOLD;
    if falling && v.abs() < MIN_FALLING_KNOCKBACK {
        v = MIN_FALLING_KNOCKBACK;
    }
    v = v.min(config.vertical_limit);

    KnockbackStrength { horizontal: h, vertical: v }
}

/// The legacy velocity-composition formula (§4.4 step 6), per-tick rate `tick_rate` (20.0 at
/// vanilla TPS). `old_velocity.y` has already had the ground-correction step applied by the
/// caller. `friction` is the divisor applied to the surviving old velocity (2.0 by default,
/// `PvpConfig::friction`).
#[must_use]
pub fn compose_velocity(
    old_velocity: Vector3<f64>,
    direction: Vector3<f64>,
    strength: KnockbackStrength,
    on_ground: bool,
    tick_rate: f64,
    friction: f64,
) -> Vector3<f64> {
    let falling = old_velocity.y < FALLING_VELOCITY_THRESHOLD;

    let new_x = old_velocity.x / friction + direction.x * strength.horizontal * tick_rate;
    let new_z = old_velocity.z / friction + direction.z * strength.horizontal * tick_rate;
    let new_y = if on_ground {
        old_velocity.y / friction + strength.vertical * tick_rate
    } else if falling {
        (strength.vertical * tick_rate).max(MIN_FALLING_KNOCKBACK)
    } else {
        old_velocity.y / friction + strength.vertical * tick_rate
    };

    Vector3::new(new_x, new_y, new_z)
}

/// Applies the ground-correction rule that precedes velocity composition: if on ground and
/// the existing Y velocity is meaningfully positive, preserve it; otherwise clamp a negative Y
/// velocity to zero.
#[must_use]
pub fn ground_corrected_velocity(velocity: Vector3<f64>, on_ground: bool) -> Vector3<f64> {
    if on_ground && velocity.y > 0.1 {
        return velocity;
    }
    if velocity.y < 0.0 {
        return Vector3::new(velocity.x, 0.0, velocity.z);
    }
    velocity
}

/// Full melee knockback computation, tying direction + strength + composition together.
/// Returns the new velocity to set on the victim. This does not itself read or write entity
/// state — callers (the engine) own that.
#[must_use]
pub fn resolve_melee_knockback(
    attacker: &Entity,
    victim: &Entity,
    config: &KnockbackConfig,
    attack: &AttackResult,
    ctx: &KnockbackContext,
    tick_rate: f64,
    friction: f64,
) -> Vector3<f64> {
    let direction = melee_direction(attacker.pos.load(), victim.pos.load(), config, attack.attacker_look_xz);
    let strength = compute_strength(config, attack, ctx);
    let corrected = ground_corrected_velocity(ctx.victim_velocity, ctx.victim_on_ground);
    compose_velocity(corrected, direction, strength, ctx.victim_on_ground, tick_rate, friction)
}

#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn resolve_projectile_knockback(
    origin: ProjectileOrigin,
    victim_pos: Vector3<f64>,
    config: &KnockbackConfig,
    attack: &AttackResult,
    ctx: &KnockbackContext,
    tick_rate: f64,
    friction: f64,
) -> Vector3<f64> {
    let direction = projectile_direction(origin, victim_pos);
    let strength = compute_strength(config, attack, ctx);
    let corrected = ground_corrected_velocity(ctx.victim_velocity, ctx.victim_on_ground);
    compose_velocity(corrected, direction, strength, ctx.victim_on_ground, tick_rate, friction)
}
