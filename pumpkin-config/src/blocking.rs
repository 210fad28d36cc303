use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Shield/blocking attenuation tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockingConfig {
    pub enabled: bool,
    /// Fraction of incoming damage absorbed by a successful block, in `[0, 1]`.
    pub damage_reduction: f64,
    pub knockback_horizontal_multiplier: f64,
    pub knockback_vertical_multiplier: f64,
}

impl Default for BlockingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            damage_reduction: 0.5,
            knockback_horizontal_multiplier: 0.4,
            knockback_vertical_multiplier: 0.4,
        }
    }
}

impl BlockingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.damage_reduction) {
            return Err(ConfigError::OutOfRange {
                field: "damage_reduction",
                value: self.damage_reduction,
                min: 0.0,
                max: 1.0,
            });
        }
        if self.knockback_horizontal_multiplier < 0.0 {
            return Err(ConfigError::MustBePositive {
                field: "knockback_horizontal_multiplier",
                value: self.knockback_horizontal_multiplier,
            });
        }
        if self.knockback_vertical_multiplier < 0.0 {
            return Err(ConfigError::MustBePositive {
                field: "knockback_vertical_multiplier",
                value: self.knockback_vertical_multiplier,
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
        BlockingConfig::default().validate().unwrap();
    }

    #[test]
    fn damage_reduction_above_one_is_rejected() {
        let cfg = BlockingConfig {
            damage_reduction: 1.5,
            ..BlockingConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
