//! Generic layered config resolver (C2): item -> attacker -> victim -> world -> server default.
//!
//! The resolver is deliberately ignorant of *what* it resolves — knockback, damage-type
//! properties, and invulnerability overrides all flow through the same [`resolve`] entry
//! point, parameterized over a component vector type `V` that knows how to combine and clamp
//! itself. This mirrors how a single lookup-table pattern in the reference data crates
//! (see `pumpkin-data`'s `DamageTypeProperties` table) stands in for what the original
//! expressed through a class hierarchy.

use std::collections::HashMap;

/// One configurable family's contribution at a single layer.
#[derive(Debug, Clone, Default)]
pub struct TagLayer<V> {
    /// Per-component multiplicative factors; stack multiplicatively across layers.
    pub multiplier: Option<V>,
    /// Per-component additive deltas; stack additively across layers.
    pub modify: Option<V>,
    /// A complete override. First non-null in priority order wins outright and all
    /// lower-priority layers (multiplier/modify or custom) are ignored.
    pub custom: Option<V>,
}

impl<V> TagLayer<V> {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            multiplier: None,
            modify: None,
            custom: None,
        }
    }
}

/// Priority order, highest first, matching §4.2 exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Item,
    Attacker,
    Victim,
    World,
    ServerDefault,
}

pub const PRIORITY_ORDER: [Layer; 5] = [
    Layer::Item,
    Layer::Attacker,
    Layer::Victim,
    Layer::World,
    Layer::ServerDefault,
];

/// The operations a resolvable component vector must support. Implemented once per family
/// (knockback components, damage multipliers, ...).
pub trait Resolvable: Clone {
    fn apply_multiplier(&mut self, factor: &Self);
    fn apply_modify(&mut self, delta: &Self);
    /// Clamps every component to its field's validity range. Called once, after all layers
    /// have been applied.
    fn clamp_to_valid_range(&mut self);
}

/// Resolves a final value from `base` plus whatever layers are present in `layers`.
///
/// Algorithm (verbatim from the layered-resolution contract): walk layers highest-priority
/// first looking for a `custom` override; the first one found replaces `base` and all
/// lower-priority customs are ignored. Then walk the *remaining* layers (the ones at or below
/// the custom, or all of them if no custom was found) in **reverse** (lowest-priority first),
/// applying each one's multiplier then modify. This ordering is safe because multipliers
/// commute with multipliers and modifies commute with modifies, so a fixed layer set always
/// produces the same result regardless of application order.
#[must_use]
pub fn resolve<V: Resolvable>(base: &V, layers: &HashMap<Layer, TagLayer<V>>) -> V {
    let mut result = base.clone();
    let mut custom_found_at: Option<usize> = None;

    for (i, layer) in PRIORITY_ORDER.iter().enumerate() {
        if let Some(entry) = layers.get(layer) {
            if let Some(custom) = &entry.custom {
                result = custom.clone();
                custom_found_at = Some(i);
                break;
            }
        }
    }

    let start = custom_found_at.unwrap_or(0);
    for layer in PRIORITY_ORDER[start..].iter().rev() {
        if let Some(entry) = layers.get(layer) {
            if let Some(multiplier) = &entry.multiplier {
                result.apply_multiplier(multiplier);
            }
            if let Some(modify) = &entry.modify {
                result.apply_modify(modify);
            }
        }
    }

    result.clamp_to_valid_range();
    result
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Scalar(f64);

    impl Resolvable for Scalar {
        fn apply_multiplier(&mut self, factor: &Self) {
            self.0 *= factor.0;
        }
        fn apply_modify(&mut self, delta: &Self) {
            self.0 += delta.0;
        }
        fn clamp_to_valid_range(&mut self) {
            self.0 = self.0.clamp(0.0, 100.0);
        }
    }

    #[test]
    fn no_layers_returns_base_unchanged() {
        let base = Scalar(1.0);
        let layers = HashMap::new();
        assert_eq!(resolve(&base, &layers).0, 1.0);
    }

    #[test]
    fn multiplier_layers_commute() {
        let base = Scalar(2.0);
        let mut layers = HashMap::new();
        layers.insert(
            Layer::Item,
            TagLayer {
                multiplier: Some(Scalar(2.0)),
                modify: None,
                custom: None,
            },
        );
        layers.insert(
            Layer::World,
            TagLayer {
                multiplier: Some(Scalar(3.0)),
                modify: None,
                custom: None,
            },
        );
        assert_eq!(resolve(&base, &layers).0, 12.0);

        let mut swapped = HashMap::new();
        swapped.insert(
            Layer::World,
            TagLayer {
                multiplier: Some(Scalar(2.0)),
                modify: None,
                custom: None,
            },
        );
        swapped.insert(
            Layer::Item,
            TagLayer {
                multiplier: Some(Scalar(3.0)),
                modify: None,
                custom: None,
            },
        );
        assert_eq!(resolve(&base, &swapped).0, 12.0);
    }

    #[test]
    fn custom_overrides_base_and_ignores_lower_priority_custom() {
        let base = Scalar(1.0);
        let mut layers = HashMap::new();
        layers.insert(
            Layer::Attacker,
            TagLayer {
                multiplier: None,
                modify: None,
                custom: Some(Scalar(50.0)),
            },
        );
        layers.insert(
            Layer::World,
            TagLayer {
                multiplier: None,
                modify: None,
                custom: Some(Scalar(5.0)),
            },
        );
        assert_eq!(resolve(&base, &layers).0, 50.0);
    }

    #[test]
    fn custom_still_receives_lower_priority_multipliers() {
        let base = Scalar(1.0);
        let mut layers = HashMap::new();
        layers.insert(
            Layer::Attacker,
            TagLayer {
                multiplier: None,
                modify: None,
                custom: Some(Scalar(10.0)),
            },
        );
        layers.insert(
            Layer::World,
            TagLayer {
                multiplier: Some(Scalar(2.0)),
                modify: None,
                custom: None,
            },
        );
        assert_eq!(resolve(&base, &layers).0, 20.0);
    }

    #[test]
    fn result_is_clamped() {
        let base = Scalar(1.0);
        let mut layers = HashMap::new();
        layers.insert(
            Layer::Item,
            TagLayer {
                multiplier: Some(Scalar(1000.0)),
                modify: None,
                custom: None,
            },
        );
        assert_eq!(resolve(&base, &layers).0, 100.0);
    }
}
