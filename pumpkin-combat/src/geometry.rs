//! Ray-AABB intersection and block-step raycasting. The only two primitives the rest of the
//! engine needs out of "real" world geometry; everything upstream of these (chunk storage,
//! block shapes) is an external collaborator reached only through [`BlockOccluder`].

use pumpkin_util::math::boundingbox::BoundingBox;
use pumpkin_util::math::vector3::Vector3;

/// A ray starting inside the target box is clamped to this minimum `t` so that downstream
/// distance math never sees an exact zero.
pub const MIN_RAY_T: f64 = 1e-3;

/// Block-step raycast granularity, in blocks.
pub const BLOCK_STEP: f64 = 0.1;

/// A normalized ray: `origin + t * direction` for `t in [0, max_t]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vector3<f64>,
    pub direction: Vector3<f64>,
}

impl Ray {
    #[must_use]
    pub fn new(origin: Vector3<f64>, direction: Vector3<f64>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    #[must_use]
    pub fn point_at(&self, t: f64) -> Vector3<f64> {
        self.origin + self.direction * t
    }

    /// Slab-method ray-AABB intersection. Returns `(hit_point, t)` for the nearest entry point
    /// at or beyond `t = 0`, or `None` if the ray misses entirely.
    #[must_use]
    pub fn intersect_aabb(&self, aabb: &BoundingBox) -> Option<(Vector3<f64>, f64)> {
        let mut t_min = f64::NEG_INFINITY;
        let mut t_max = f64::INFINITY;

        for axis in 0..3 {
            let (origin, dir, min, max) = match axis {
                0 => (self.origin.x, self.direction.x, aabb.min.x, aabb.max.x),
                1 => (self.origin.y, self.direction.y, aabb.min.y, aabb.max.y),
                _ => (self.origin.z, self.direction.z, aabb.min.z, aabb.max.z),
            };

            if dir.abs() < f64::EPSILON {
                if origin < min || origin > max {
                    return None;
                }
                continue;
            }

            let inv_dir = 1.0 / dir;
            let mut t1 = (min - origin) * inv_dir;
            let mut t2 = (max - origin) * inv_dir;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_min = t_min.max(t1);
            t_max = t_max.min(t2);
            if t_min > t_max {
                return None;
            }
        }

        if t_max < 0.0 {
            return None;
        }

        let t = if t_min < 0.0 { MIN_RAY_T } else { t_min.max(MIN_RAY_T) };
        Some((self.point_at(t), t))
    }
}

/// External collaborator: answers whether a solid, occluding block exists at a point. Block
/// shape/chunk storage live entirely outside this crate; the engine only ever asks this
/// step-and-sample question.
pub trait BlockOccluder {
    fn is_solid_at(&self, pos: Vector3<f64>) -> bool;
}

/// Steps `ray` forward in [`BLOCK_STEP`] increments up to `max_distance`, returning `true` at
/// the first solid block encountered. Used only to reject swings aimed at geometry behind the
/// apparent target; never to find the target itself.
pub fn block_raycast_hits(ray: &Ray, max_distance: f64, occluder: &dyn BlockOccluder) -> bool {
    let mut travelled = 0.0;
    while travelled < max_distance {
        if occluder.is_solid_at(ray.point_at(travelled)) {
            return true;
        }
        travelled += BLOCK_STEP;
    }
    false
}

/// Eye-height offsets. Standing is the vanilla 1.62 block default; sneaking lowers it.
#[must_use]
pub fn eye_height(sneaking: bool) -> f64 {
    if sneaking { 1.27 } else { 1.62 }
}

#[must_use]
pub fn eye_position(feet: Vector3<f64>, sneaking: bool) -> Vector3<f64> {
    Vector3::new(feet.x, feet.y + eye_height(sneaking), feet.z)
}

/// Look direction from yaw/pitch, in degrees, using the standard convention.
#[must_use]
pub fn look_direction(yaw_degrees: f64, pitch_degrees: f64) -> Vector3<f64> {
    let yaw = yaw_degrees.to_radians();
    let pitch = pitch_degrees.to_radians();
    Vector3::new(-yaw.sin() * pitch.cos(), -pitch.sin(), yaw.cos() * pitch.cos())
}

#[cfg(test)]
mod test {
    use super::*;
    use pumpkin_util::math::boundingbox::EntityDimensions;

    struct NeverSolid;
    impl BlockOccluder for NeverSolid {
        fn is_solid_at(&self, _pos: Vector3<f64>) -> bool {
            false
        }
    }

    struct SolidAtX(f64);
    impl BlockOccluder for SolidAtX {
        fn is_solid_at(&self, pos: Vector3<f64>) -> bool {
            pos.x >= self.0
        }
    }

    #[test]
    fn ray_hits_box_dead_ahead() {
        let ray = Ray::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
        let aabb = BoundingBox::new_from_pos(Vector3::new(5.0, 0.0, 0.0), &EntityDimensions::new(0.6, 1.8));
        let hit = ray.intersect_aabb(&aabb);
        assert!(hit.is_some());
        let (_, t) = hit.unwrap();
        assert!(t > 0.0 && t < 5.0);
    }

    #[test]
    fn ray_misses_box_to_the_side() {
        let ray = Ray::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
        let aabb = BoundingBox::new_from_pos(Vector3::new(5.0, 10.0, 0.0), &EntityDimensions::new(0.6, 1.8));
        assert!(ray.intersect_aabb(&aabb).is_none());
    }

    #[test]
    fn ray_starting_inside_box_clamps_t_to_minimum() {
        let aabb = BoundingBox::new_from_pos(Vector3::new(0.0, 0.0, 0.0), &EntityDimensions::new(2.0, 2.0));
        let ray = Ray::new(Vector3::new(0.0, 1.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
        let (_, t) = ray.intersect_aabb(&aabb).unwrap();
        assert!(t >= MIN_RAY_T);
    }

    #[test]
    fn block_raycast_detects_first_solid_block() {
        let ray = Ray::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
        assert!(block_raycast_hits(&ray, 10.0, &SolidAtX(2.0)));
        assert!(!block_raycast_hits(&ray, 10.0, &NeverSolid));
    }

    #[test]
    fn eye_position_is_lower_while_sneaking() {
        let feet = Vector3::new(0.0, 64.0, 0.0);
        assert!(eye_position(feet, true).y < eye_position(feet, false).y);
    }
}
