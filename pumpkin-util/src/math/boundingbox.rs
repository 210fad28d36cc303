use serde::{Deserialize, Serialize};

use super::vector3::Vector3;

/// The width/height pair vanilla calls an entity's "dimensions"; every pose (standing,
/// sneaking, swimming, ...) has its own value, looked up by the entity definition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntityDimensions {
    pub width: f32,
    pub height: f32,
}

impl EntityDimensions {
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vector3<f64>,
    pub max: Vector3<f64>,
}

impl BoundingBox {
    #[must_use]
    pub const fn new(min: Vector3<f64>, max: Vector3<f64>) -> Self {
        Self { min, max }
    }

    /// Builds the box a feet-anchored entity of the given dimensions occupies at `pos`.
    #[must_use]
    pub fn new_from_pos(pos: Vector3<f64>, dimensions: &EntityDimensions) -> Self {
        let half_width = f64::from(dimensions.width) / 2.0;
        Self {
            min: Vector3::new(pos.x - half_width, pos.y, pos.z - half_width),
            max: Vector3::new(
                pos.x + half_width,
                pos.y + f64::from(dimensions.height),
                pos.z + half_width,
            ),
        }
    }

    #[must_use]
    pub fn center(&self) -> Vector3<f64> {
        Vector3::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
            (self.min.z + self.max.z) / 2.0,
        )
    }

    /// Pads the box outward by `amount` on every axis; this is how hitbox-expansion tiers
    /// compensate for attacker/victim latency.
    #[must_use]
    pub fn expand(&self, amount: f64) -> Self {
        Self {
            min: Vector3::new(self.min.x - amount, self.min.y - amount, self.min.z - amount),
            max: Vector3::new(self.max.x + amount, self.max.y + amount, self.max.z + amount),
        }
    }

    #[must_use]
    pub fn contains(&self, point: &Vector3<f64>) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    #[must_use]
    pub fn closest_point(&self, point: &Vector3<f64>) -> Vector3<f64> {
        Vector3::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
            point.z.clamp(self.min.z, self.max.z),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn new_from_pos_centers_on_feet() {
        let dims = EntityDimensions::new(0.6, 1.8);
        let bb = BoundingBox::new_from_pos(Vector3::new(0.0, 0.0, 0.0), &dims);
        assert!((bb.min.x - (-0.3)).abs() < 1e-9);
        assert!((bb.max.x - 0.3).abs() < 1e-9);
        assert!((bb.min.y - 0.0).abs() < 1e-9);
        assert!((bb.max.y - 1.8).abs() < 1e-9);
    }

    #[test]
    fn expand_grows_every_axis() {
        let dims = EntityDimensions::new(1.0, 1.0);
        let bb = BoundingBox::new_from_pos(Vector3::ZERO, &dims).expand(0.1);
        assert!((bb.min.x - (-0.6)).abs() < 1e-9);
        assert!((bb.max.x - 0.6).abs() < 1e-9);
        assert!((bb.min.y - (-0.1)).abs() < 1e-9);
    }

    #[test]
    fn contains_respects_boundaries() {
        let bb = BoundingBox::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0));
        assert!(bb.contains(&Vector3::new(0.5, 0.5, 0.5)));
        assert!(bb.contains(&Vector3::new(0.0, 0.0, 0.0)));
        assert!(!bb.contains(&Vector3::new(1.1, 0.5, 0.5)));
    }
}
