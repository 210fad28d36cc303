pub mod damage;

pub use damage::{DamageType, DamageTypeProperties};
