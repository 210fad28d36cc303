use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// The ten tunables a single knockback resolution produces. Every field here is validated
/// once at construction; the tag resolver in `pumpkin-combat` only ever *derives* new
/// instances of this record from an already-valid base, so invalid configs can never reach
/// the hot path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnockbackConfig {
    pub horizontal: f64,
    pub vertical: f64,
    pub vertical_limit: f64,
    pub sprint_bonus_h: f64,
    pub sprint_bonus_v: f64,
    pub air_multiplier_h: f64,
    pub air_multiplier_v: f64,
    /// How much of the attacker's look direction is blended into melee knockback direction.
    pub look_weight: f64,
    /// Whether this config describes modern (post-combat-update) knockback semantics.
    pub modern: bool,
    /// Whether the owning player's client understands knockback-sync rewinding.
    pub knockback_sync_supported: bool,
}

impl Default for KnockbackConfig {
    fn default() -> Self {
        Self {
            horizontal: 0.4,
            vertical: 0.4,
            vertical_limit: 0.400_000_005_960_464_5,
            sprint_bonus_h: 0.5,
            sprint_bonus_v: 0.1,
            air_multiplier_h: 1.0,
            air_multiplier_v: 1.0,
            look_weight: 0.0,
            modern: true,
            knockback_sync_supported: true,
        }
    }
}

impl KnockbackConfig {
    /// Validates a fully-formed record. Called at startup for presets and whenever the
    /// embedding application hands the engine a new base config; never on the hot path.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.look_weight) {
            return Err(ConfigError::OutOfRange {
                field: "look_weight",
                value: self.look_weight,
                min: 0.0,
                max: 1.0,
            });
        }
        if self.vertical_limit < 0.0 {
            return Err(ConfigError::MustBePositive {
                field: "vertical_limit",
                value: self.vertical_limit,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn clamped(mut self) -> Self {
        self.look_weight = self.look_weight.clamp(0.0, 1.0);
        if self.vertical_limit < 0.0 {
            self.vertical_limit = 0.0;
        }
        self
    }
}

/// Top-level server PVP toggle settings, distinct from the per-hit-resolved
/// [`KnockbackConfig`]: this is the server-default layer the tag resolver starts from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PvpConfig {
    /// Whether PVP is enabled at all.
    pub enabled: bool,
    /// Whether to use the red hurt animation and FOV bobbing.
    pub hurt_animation: bool,
    /// Whether players in creative mode are protected against PVP.
    pub protect_creative: bool,
    /// Whether PVP knockback is enabled.
    pub knockback: bool,
    /// Whether players swing when attacking.
    pub swing: bool,
    /// The server-default knockback resolution; item/entity/world tags layer on top of this.
    pub base_knockback: KnockbackConfig,
    /// 2.0 by default; how much of the victim's existing velocity survives a hit.
    pub friction: f64,
}

impl Default for PvpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            hurt_animation: true,
            protect_creative: true,
            knockback: true,
            swing: true,
            base_knockback: KnockbackConfig::default(),
            friction: 2.0,
        }
    }
}

impl PvpConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.friction <= 0.0 {
            return Err(ConfigError::MustBePositive {
                field: "friction",
                value: self.friction,
            });
        }
        self.base_knockback.validate()
    }
}
