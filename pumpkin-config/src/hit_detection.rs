use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Server-side reach and hitbox-expansion tunables. Resolved once per world/gamemode, not
/// per hit, but still validated through [`ConfigError`] the same way [`crate::combat::KnockbackConfig`] is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitDetectionConfig {
    /// Maximum eye-to-hitbox distance the server accepts for a melee attack, in blocks.
    pub server_side_reach: f64,
    /// Maximum reach the server will tolerate when validating the client's attack packet
    /// against its own last-known position, before falling back to hitbox expansion.
    pub attack_packet_reach: f64,
    /// Primary hitbox expansion applied before re-testing a near-miss swing.
    pub hitbox_expansion_primary: f64,
    /// Wider fallback expansion, applied only if the primary tier still misses.
    pub hitbox_expansion_limit: f64,
    /// Maximum angle, in degrees, between look direction and victim direction to accept.
    pub angle_threshold: f64,
    pub enable_angle_validation: bool,
    /// Whether to retain recent hit snapshots for replay/anti-cheat style auditing.
    pub track_hit_snapshots: bool,
}

impl Default for HitDetectionConfig {
    fn default() -> Self {
        Self {
            server_side_reach: 3.0,
            attack_packet_reach: 6.0,
            hitbox_expansion_primary: 0.1,
            hitbox_expansion_limit: 0.3,
            angle_threshold: 90.0,
            enable_angle_validation: true,
            track_hit_snapshots: false,
        }
    }
}

impl HitDetectionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server_side_reach <= 0.0 || self.server_side_reach > 6.0 {
            return Err(ConfigError::OutOfRange {
                field: "server_side_reach",
                value: self.server_side_reach,
                min: 0.0,
                max: 6.0,
            });
        }
        if self.attack_packet_reach < self.server_side_reach {
            return Err(ConfigError::MustBeAtLeast {
                greater: "attack_packet_reach",
                greater_value: self.attack_packet_reach,
                lesser: "server_side_reach",
                lesser_value: self.server_side_reach,
            });
        }
        if !(0.0..=0.5).contains(&self.hitbox_expansion_primary) {
            return Err(ConfigError::OutOfRange {
                field: "hitbox_expansion_primary",
                value: self.hitbox_expansion_primary,
                min: 0.0,
                max: 0.5,
            });
        }
        if self.hitbox_expansion_limit < self.hitbox_expansion_primary {
            return Err(ConfigError::MustBeAtLeast {
                greater: "hitbox_expansion_limit",
                greater_value: self.hitbox_expansion_limit,
                lesser: "hitbox_expansion_primary",
                lesser_value: self.hitbox_expansion_primary,
            });
        }
        if !(0.0..=180.0).contains(&self.angle_threshold) {
            return Err(ConfigError::OutOfRange {
                field: "angle_threshold",
                value: self.angle_threshold,
                min: 0.0,
                max: 180.0,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        HitDetectionConfig::default().validate().unwrap();
    }

    #[test]
    fn expansion_limit_below_primary_is_rejected() {
        let cfg = HitDetectionConfig {
            hitbox_expansion_primary: 0.5,
            hitbox_expansion_limit: 0.1,
            ..HitDetectionConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn packet_reach_below_server_reach_is_rejected() {
        let cfg = HitDetectionConfig {
            server_side_reach: 5.0,
            attack_packet_reach: 3.0,
            ..HitDetectionConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn server_side_reach_above_six_is_rejected() {
        let cfg = HitDetectionConfig {
            server_side_reach: 100.0,
            attack_packet_reach: 100.0,
            ..HitDetectionConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn hitbox_expansion_primary_above_half_is_rejected() {
        let cfg = HitDetectionConfig {
            hitbox_expansion_primary: 9.0,
            hitbox_expansion_limit: 9.0,
            ..HitDetectionConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
