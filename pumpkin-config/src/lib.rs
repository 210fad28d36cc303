pub mod blocking;
pub mod combat;
pub mod error;
pub mod hit_detection;
pub mod tick_scaling;

pub use blocking::BlockingConfig;
pub use combat::{KnockbackConfig, PvpConfig};
pub use error::ConfigError;
pub use hit_detection::HitDetectionConfig;
pub use tick_scaling::TickScalingMode;

use serde::{Deserialize, Serialize};

/// The full set of validated combat tunables a world hands to `pumpkin_combat::CombatEngine`
/// at construction. Bundling these together (rather than passing four separate configs
/// through every call) mirrors how the reference server bundles its top-level `*Config`
/// structs under a single `AdvancedConfig`/`BasicConfig` root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub pvp: PvpConfig,
    pub hit_detection: HitDetectionConfig,
    pub blocking: BlockingConfig,
    pub tick_scaling: TickScalingMode,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            pvp: PvpConfig::default(),
            hit_detection: HitDetectionConfig::default(),
            blocking: BlockingConfig::default(),
            tick_scaling: TickScalingMode::default(),
        }
    }
}

impl CombatConfig {
    /// Validates every nested config. Run once at startup (or in tests); never on the hot
    /// path of a hit resolution.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pvp.validate()?;
        self.hit_detection.validate()?;
        self.blocking.validate()?;
        Ok(())
    }

    /// Parses a full combat config from a TOML document, then validates it.
    pub fn from_toml_str(text: &str) -> Result<Self, LoadError> {
        let config: Self = toml::from_str(text).map_err(LoadError::Parse)?;
        if let Err(err) = config.validate() {
            log::warn!("combat config failed validation: {err}");
            return Err(LoadError::Invalid(err));
        }
        Ok(config)
    }
}

/// Failures that can occur while loading a [`CombatConfig`] from disk/string, distinct from
/// the per-field [`ConfigError`] the nested configs raise.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to parse combat config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("combat config failed validation: {0}")]
    Invalid(ConfigError),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_combat_config_is_valid() {
        CombatConfig::default().validate().unwrap();
    }

    #[test]
    fn empty_toml_document_falls_back_to_defaults() {
        let config = CombatConfig::from_toml_str("").unwrap();
        assert_eq!(config, CombatConfig::default());
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let text = r#"
            [pvp]
            enabled = false
        "#;
        let config = CombatConfig::from_toml_str(text).unwrap();
        assert!(!config.pvp.enabled);
        assert_eq!(
            config.hit_detection,
            HitDetectionConfig::default(),
            "unrelated sections should stay at default"
        );
    }

    #[test]
    fn invalid_nested_config_fails_to_load() {
        let text = r#"
            [blocking]
            damage_reduction = 5.0
        "#;
        assert!(matches!(
            CombatConfig::from_toml_str(text),
            Err(LoadError::Invalid(_))
        ));
    }

    #[test]
    fn non_default_tick_scaling_round_trips_through_toml() {
        let config = CombatConfig {
            tick_scaling: TickScalingMode::Scaled,
            ..CombatConfig::default()
        };
        let text = toml::to_string(&config).unwrap();
        let parsed = CombatConfig::from_toml_str(&text).unwrap();
        assert_eq!(config, parsed);
    }
}
