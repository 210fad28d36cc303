//! Damage kinds and their default tunables.
//!
//! Vanilla expresses damage-source variation through a class hierarchy; this crate instead
//! keeps a single tagged enum plus a const lookup table, the same shape the reference server
//! uses for its other data tables (see `Particle`'s `from_name`/`to_name` pair).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageType {
    Fall,
    Fire,
    Lava,
    Cactus,
    Projectile,
    Melee,
    Generic,
    Void,
    Drown,
    Starve,
    Magic,
    Wither,
    SonicBoom,
    Explosion,
}

impl DamageType {
    pub const ALL: [Self; 14] = [
        Self::Fall,
        Self::Fire,
        Self::Lava,
        Self::Cactus,
        Self::Projectile,
        Self::Melee,
        Self::Generic,
        Self::Void,
        Self::Starve,
        Self::Drown,
        Self::Magic,
        Self::Wither,
        Self::SonicBoom,
        Self::Explosion,
    ];

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        NAME_TO_TYPE.get(name).copied()
    }

    #[must_use]
    pub const fn to_name(self) -> &'static str {
        match self {
            Self::Fall => "fall",
            Self::Fire => "fire",
            Self::Lava => "lava",
            Self::Cactus => "cactus",
            Self::Projectile => "projectile",
            Self::Melee => "melee",
            Self::Generic => "generic",
            Self::Void => "void",
            Self::Drown => "drown",
            Self::Starve => "starve",
            Self::Magic => "magic",
            Self::Wither => "wither",
            Self::SonicBoom => "sonic_boom",
            Self::Explosion => "explosion",
        }
    }

    /// Damage types vanilla always lets through a victim's armor, regardless of the
    /// per-type `penetrates_armor` override.
    #[must_use]
    pub const fn always_bypasses_armor(self) -> bool {
        matches!(
            self,
            Self::Void | Self::Starve | Self::Magic | Self::Wither | Self::SonicBoom
        )
    }
}

static NAME_TO_TYPE: phf::Map<&'static str, DamageType> = phf::phf_map! {
    "fall" => DamageType::Fall,
    "fire" => DamageType::Fire,
    "lava" => DamageType::Lava,
    "cactus" => DamageType::Cactus,
    "projectile" => DamageType::Projectile,
    "melee" => DamageType::Melee,
    "generic" => DamageType::Generic,
    "void" => DamageType::Void,
    "drown" => DamageType::Drown,
    "starve" => DamageType::Starve,
    "magic" => DamageType::Magic,
    "wither" => DamageType::Wither,
    "sonic_boom" => DamageType::SonicBoom,
    "explosion" => DamageType::Explosion,
};

/// Cosmetic hint for the hurt animation/sound the host should play; carries no numeric
/// weight of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum HurtEffect {
    #[default]
    Normal,
    Burning,
    Drowning,
    None,
}

/// Per-damage-kind tunables, resolved fresh per hit through the tag resolver in
/// `pumpkin-combat`. This struct is the "base" layer of that resolution chain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageTypeProperties {
    pub enabled: bool,
    pub multiplier: f64,
    pub blockable: bool,
    pub penetrates_armor: bool,
    pub bypass_invulnerability: bool,
    pub bypass_creative: bool,
    pub damage_replacement: bool,
    pub knockback_on_replacement: bool,
    pub replacement_cutoff: f64,
    pub hurt_effect: HurtEffect,
    pub invulnerability_buffer_ticks: u32,
    pub no_replacement_same_item: bool,
}

impl DamageTypeProperties {
    #[must_use]
    pub const fn default_for(kind: DamageType) -> Self {
        const BASE: DamageTypeProperties = DamageTypeProperties {
            enabled: true,
            multiplier: 1.0,
            blockable: true,
            penetrates_armor: false,
            bypass_invulnerability: false,
            bypass_creative: false,
            damage_replacement: true,
            knockback_on_replacement: false,
            replacement_cutoff: 0.0,
            hurt_effect: HurtEffect::Normal,
            invulnerability_buffer_ticks: 10,
            no_replacement_same_item: false,
        };

        match kind {
            DamageType::Melee | DamageType::Generic => BASE,
            DamageType::Projectile => DamageTypeProperties {
                blockable: true,
                ..BASE
            },
            DamageType::Fall => DamageTypeProperties {
                blockable: false,
                bypass_invulnerability: false,
                ..BASE
            },
            DamageType::Fire | DamageType::Lava => DamageTypeProperties {
                blockable: false,
                hurt_effect: HurtEffect::Burning,
                ..BASE
            },
            DamageType::Cactus => DamageTypeProperties {
                blockable: false,
                ..BASE
            },
            DamageType::Drown => DamageTypeProperties {
                blockable: false,
                hurt_effect: HurtEffect::Drowning,
                ..BASE
            },
            DamageType::Void => DamageTypeProperties {
                blockable: false,
                penetrates_armor: true,
                bypass_invulnerability: true,
                bypass_creative: true,
                damage_replacement: false,
                hurt_effect: HurtEffect::None,
                ..BASE
            },
            DamageType::Starve => DamageTypeProperties {
                blockable: false,
                penetrates_armor: true,
                hurt_effect: HurtEffect::None,
                ..BASE
            },
            DamageType::Magic => DamageTypeProperties {
                penetrates_armor: true,
                ..BASE
            },
            DamageType::Wither => DamageTypeProperties {
                blockable: false,
                penetrates_armor: true,
                hurt_effect: HurtEffect::None,
                ..BASE
            },
            DamageType::SonicBoom => DamageTypeProperties {
                blockable: false,
                penetrates_armor: true,
                bypass_invulnerability: true,
                ..BASE
            },
            DamageType::Explosion => DamageTypeProperties {
                knockback_on_replacement: true,
                ..BASE
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn every_variant_has_a_default_table_entry() {
        for kind in DamageType::ALL {
            let props = DamageTypeProperties::default_for(kind);
            assert!(props.multiplier > 0.0);
        }
    }

    #[test]
    fn name_roundtrips() {
        for kind in DamageType::ALL {
            let name = kind.to_name();
            assert_eq!(DamageType::from_name(name), Some(kind));
        }
    }

    #[test]
    fn armor_blacklist_matches_always_bypasses() {
        assert!(DamageType::Void.always_bypasses_armor());
        assert!(DamageType::Starve.always_bypasses_armor());
        assert!(DamageType::Magic.always_bypasses_armor());
        assert!(DamageType::Wither.always_bypasses_armor());
        assert!(DamageType::SonicBoom.always_bypasses_armor());
        assert!(!DamageType::Melee.always_bypasses_armor());
    }
}
