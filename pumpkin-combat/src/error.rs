//! Construction-time failures. Everything on the hot path (C3-C9) is infallible by design
//! (§7: "nothing in the damage/knockback hot path is surfaced to the player as an error"); the
//! only place this crate can fail is at startup, validating the config bundle handed to
//! [`crate::engine::CombatEngine::new`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid combat config: {0}")]
    Config(#[from] pumpkin_config::ConfigError),
}
