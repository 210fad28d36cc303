//! Server-authoritative hit validation, knockback, damage, and blocking for instance-hosted
//! combat. See [`engine::CombatEngine`] for the entry point a host constructs once and drives
//! from its tick loop and packet-handling threads.

pub mod blocking;
pub mod compatibility;
pub mod damage;
pub mod engine;
pub mod entity;
pub mod error;
pub mod geometry;
pub mod hit_detection;
pub mod knockback;
pub mod knockback_sync;
pub mod projectile;
pub mod tags;
pub mod world;

pub use engine::CombatEngine;
pub use error::EngineError;
