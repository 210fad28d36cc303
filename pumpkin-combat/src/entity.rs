//! Entity and player data model (§3). Positions, velocity, and orientation are read far more
//! often than written — every hit resolution on the tick thread reads several entities'
//! state — so each scalar field is a [`crossbeam::atomic::AtomicCell`]: lock-free reads, a
//! single authoritative writer (the tick thread), exactly the pattern the reference server
//! uses for its own `Entity` struct fields.

use std::collections::HashMap;
use std::sync::Mutex;

use crossbeam::atomic::AtomicCell;
use pumpkin_util::math::boundingbox::{BoundingBox, EntityDimensions};
use pumpkin_util::math::vector3::Vector3;

/// Opaque arena index. The engine never stores entity references directly, only ids, looked
/// up weakly through [`crate::world::CombatWorld`] — this is how cyclic attacker/projectile/
/// victim references are avoided.
pub type EntityId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolClass {
    Legacy,
    Modern,
}

/// A single typed value a tag store can carry. Kept intentionally small; the resolver
/// (`tags::resolve`) only ever needs numeric vectors, never arbitrary blobs.
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

/// Per-entity transient tag store. Single-writer (tick thread) per §3's invariant; reads may
/// happen concurrently from packet-handling threads and must observe a consistent snapshot,
/// which a `Mutex`-guarded `HashMap` satisfies for the modest read/write volume here (the
/// resolver is invoked once per hit, not per tick).
#[derive(Debug, Default)]
pub struct TagStore {
    values: Mutex<HashMap<String, TagValue>>,
}

impl TagStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: impl Into<String>, value: TagValue) {
        self.values.lock().unwrap().insert(key.into(), value);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<TagValue> {
        self.values.lock().unwrap().get(key).cloned()
    }

    pub fn remove(&self, key: &str) {
        self.values.lock().unwrap().remove(key);
    }
}

/// Attribute keys the combat pipeline reads off an entity's attribute map.
pub mod attribute {
    pub const KNOCKBACK_RESISTANCE: &str = "knockback_resistance";
    pub const ARMOR: &str = "armor";
    pub const ARMOR_TOUGHNESS: &str = "armor_toughness";
}

/// Core entity state shared by every combat participant.
pub struct Entity {
    pub id: EntityId,
    pub pos: AtomicCell<Vector3<f64>>,
    pub velocity: AtomicCell<Vector3<f64>>,
    pub yaw: AtomicCell<f64>,
    pub pitch: AtomicCell<f64>,
    pub on_ground: AtomicCell<bool>,
    pub sneaking: AtomicCell<bool>,
    pub dead: AtomicCell<bool>,
    pub dimensions: EntityDimensions,
    attributes: Mutex<HashMap<&'static str, f64>>,
    pub tags: TagStore,
}

impl Entity {
    #[must_use]
    pub fn new(id: EntityId, pos: Vector3<f64>, dimensions: EntityDimensions) -> Self {
        Self {
            id,
            pos: AtomicCell::new(pos),
            velocity: AtomicCell::new(Vector3::ZERO),
            yaw: AtomicCell::new(0.0),
            pitch: AtomicCell::new(0.0),
            on_ground: AtomicCell::new(true),
            sneaking: AtomicCell::new(false),
            dead: AtomicCell::new(false),
            dimensions,
            attributes: Mutex::new(HashMap::new()),
            tags: TagStore::new(),
        }
    }

    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::new_from_pos(self.pos.load(), &self.dimensions)
    }

    #[must_use]
    pub fn eye_pos(&self) -> Vector3<f64> {
        crate::geometry::eye_position(self.pos.load(), self.sneaking.load())
    }

    #[must_use]
    pub fn look_direction(&self) -> Vector3<f64> {
        crate::geometry::look_direction(self.yaw.load(), self.pitch.load())
    }

    pub fn set_attribute(&self, key: &'static str, value: f64) {
        self.attributes.lock().unwrap().insert(key, value);
    }

    /// Attributes absent from the map are treated as `0.0` (§7: "Attribute absent -> treat
    /// as 0"), never as an error.
    #[must_use]
    pub fn attribute(&self, key: &str) -> f64 {
        self.attributes
            .lock()
            .unwrap()
            .get(key)
            .copied()
            .unwrap_or(0.0)
    }

    #[must_use]
    pub fn knockback_resistance(&self) -> f64 {
        self.attribute(attribute::KNOCKBACK_RESISTANCE).clamp(0.0, 1.0)
    }
}

/// A stable identifier for an equipped item, used only for identity comparisons (the
/// same-item replacement lockout in §4.6); this engine never inspects item contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemRef(pub u64);

/// Player-specific state layered on top of [`Entity`].
pub struct Player {
    pub entity: Entity,
    pub protocol: ProtocolClass,
    /// Milliseconds; updated from periodic ping samples, read by knockback sync.
    pub ping_ms: AtomicCell<u32>,
    pub sprinting: AtomicCell<bool>,
    pub main_hand_item: AtomicCell<Option<ItemRef>>,
}

impl Player {
    #[must_use]
    pub fn new(id: EntityId, pos: Vector3<f64>, protocol: ProtocolClass) -> Self {
        Self {
            entity: Entity::new(id, pos, EntityDimensions::new(0.6, 1.8)),
            protocol,
            ping_ms: AtomicCell::new(0),
            sprinting: AtomicCell::new(false),
            main_hand_item: AtomicCell::new(None),
        }
    }

    #[must_use]
    pub fn id(&self) -> EntityId {
        self.entity.id
    }

    /// Captures and clears the sprint flag in one step, matching §4.4's "the sprint flag is
    /// captured into the AttackResult at packet ingest, not re-read [during knockback
    /// computation]".
    pub fn take_sprinting(&self) -> bool {
        self.sprinting.swap(false)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn missing_attribute_defaults_to_zero() {
        let entity = Entity::new(1, Vector3::ZERO, EntityDimensions::new(0.6, 1.8));
        assert_eq!(entity.attribute(attribute::ARMOR), 0.0);
    }

    #[test]
    fn knockback_resistance_is_clamped() {
        let entity = Entity::new(1, Vector3::ZERO, EntityDimensions::new(0.6, 1.8));
        entity.set_attribute(attribute::KNOCKBACK_RESISTANCE, 5.0);
        assert_eq!(entity.knockback_resistance(), 1.0);
    }

    #[test]
    fn take_sprinting_clears_flag() {
        let player = Player::new(1, Vector3::ZERO, ProtocolClass::Modern);
        player.sprinting.store(true);
        assert!(player.take_sprinting());
        assert!(!player.take_sprinting());
    }

    #[test]
    fn tag_store_roundtrips_values() {
        let tags = TagStore::new();
        tags.set("knockback_multiplier", TagValue::Number(2.0));
        assert_eq!(tags.get("knockback_multiplier"), Some(TagValue::Number(2.0)));
        tags.remove("knockback_multiplier");
        assert_eq!(tags.get("knockback_multiplier"), None);
    }
}
