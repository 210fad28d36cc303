//! Invulnerability windows, damage replacement, armor reduction, bypass rules (C6).

use dashmap::DashMap;

use pumpkin_data::{DamageType, DamageTypeProperties};

use crate::entity::{attribute, Entity, EntityId, ItemRef};

/// Per-victim invulnerability bookkeeping (§3). Absent state (first hit ever) is treated as
/// "never damaged" per §7, not as an error.
#[derive(Debug, Clone, Copy, PartialEq)]
struct InvulnerabilityState {
    last_damage_tick: u64,
    last_damage_amount: f64,
    last_damage_was_replacement: bool,
    last_weapon_item: Option<ItemRef>,
}

impl InvulnerabilityState {
    const fn never_damaged() -> Self {
        Self {
            last_damage_tick: 0,
            last_damage_amount: 0.0,
            last_damage_was_replacement: false,
            last_weapon_item: None,
        }
    }
}

#[derive(Default)]
pub struct InvulnerabilityTracker {
    states: DashMap<EntityId, InvulnerabilityState>,
}

impl InvulnerabilityTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&self, victim: EntityId) {
        self.states.remove(&victim);
    }

    fn state(&self, victim: EntityId) -> InvulnerabilityState {
        self.states.get(&victim).map(|s| *s).unwrap_or_else(InvulnerabilityState::never_damaged)
    }
}

/// Input to the damage pipeline. `source` is `None` for environmental damage (fall, void).
#[derive(Debug, Clone, Copy)]
pub struct DamageEvent {
    pub victim: EntityId,
    pub source: Option<EntityId>,
    pub damage_type: DamageType,
    pub amount: f64,
    pub weapon: Option<ItemRef>,
}

/// Outcome of [`apply_damage`]. `None` means the event was silently cancelled: no health
/// change, no knockback-on-replacement, no error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageOutcome {
    /// The amount actually subtracted from health, after armor reduction.
    pub health_delta: f64,
    pub was_replacement: bool,
    /// Whether the type's `knockback_on_replacement` rule says knockback should still fire.
    pub should_apply_knockback: bool,
}

/// `reducedDmg = dmg * (1 - effective / 25)`, `effective = clamp(max(armor/5, armor -
/// dmg/(2 + toughness/4)), 0, 20)` — the vanilla two-branch armor formula (§4.6).
#[must_use]
pub fn apply_armor_reduction(damage: f64, armor: f64, toughness: f64) -> f64 {
    let f = 2.0 + toughness / 4.0;
    let effective = (armor / 5.0).max(armor - damage / f).clamp(0.0, 20.0);
    damage * (1.0 - effective / 25.0)
}

fn armor_adjusted(damage: f64, victim: &Entity, damage_type: DamageType, properties: &DamageTypeProperties) -> f64 {
    if properties.penetrates_armor || damage_type.always_bypasses_armor() {
        return damage;
    }
    let armor = victim.attribute(attribute::ARMOR);
    let toughness = victim.attribute(attribute::ARMOR_TOUGHNESS);
    apply_armor_reduction(damage, armor, toughness).max(0.0)
}

/// Applies one damage event against the tracker's current invulnerability state for the
/// victim, following the bypass -> window -> replacement -> same-item-lockout -> reject chain
/// of §4.6 exactly. Returns `None` for a silently-cancelled hit.
#[must_use]
pub fn apply_damage(
    tracker: &InvulnerabilityTracker,
    victim: &Entity,
    event: &DamageEvent,
    properties: &DamageTypeProperties,
    current_tick: u64,
) -> Option<DamageOutcome> {
    if !properties.enabled {
        return None;
    }

    let state = tracker.state(event.victim);
    let reduced = armor_adjusted(event.amount, victim, event.damage_type, properties);

    // Bypass: proceed unconditionally, no replacement bookkeeping consulted.
    if properties.bypass_invulnerability {
        tracker.states.insert(
            event.victim,
            InvulnerabilityState {
                last_damage_tick: current_tick,
                last_damage_amount: event.amount,
                last_damage_was_replacement: false,
                last_weapon_item: event.weapon,
            },
        );
        return Some(DamageOutcome {
            health_delta: reduced,
            was_replacement: false,
            should_apply_knockback: true,
        });
    }

    let delta_ticks = current_tick.saturating_sub(state.last_damage_tick);

    // Outside the window: normal hit.
    if state.last_damage_tick == 0 || delta_ticks >= u64::from(properties.invulnerability_buffer_ticks) {
        tracker.states.insert(
            event.victim,
            InvulnerabilityState {
                last_damage_tick: current_tick,
                last_damage_amount: event.amount,
                last_damage_was_replacement: false,
                last_weapon_item: event.weapon,
            },
        );
        return Some(DamageOutcome {
            health_delta: reduced,
            was_replacement: false,
            should_apply_knockback: true,
        });
    }

    // Inside the window: consider replacement.
    let is_larger = event.amount > state.last_damage_amount + properties.replacement_cutoff;
    if properties.damage_replacement && is_larger {
        if properties.no_replacement_same_item
            && event.weapon.is_some()
            && event.weapon == state.last_weapon_item
        {
            return None;
        }

        let raw_delta = event.amount - state.last_damage_amount;
        let reduced_delta = armor_adjusted(raw_delta, victim, event.damage_type, properties);

        tracker.states.insert(
            event.victim,
            InvulnerabilityState {
                // the window itself does not restart on replacement
                last_damage_tick: state.last_damage_tick,
                last_damage_amount: event.amount,
                last_damage_was_replacement: true,
                last_weapon_item: event.weapon,
            },
        );
        return Some(DamageOutcome {
            health_delta: reduced_delta,
            was_replacement: true,
            should_apply_knockback: properties.knockback_on_replacement,
        });
    }

    // Weaker (or equal) hit inside the window: silently cancelled.
    None
}

#[cfg(test)]
mod test {
    use super::*;
    use pumpkin_util::math::boundingbox::EntityDimensions;
    use pumpkin_util::math::vector3::Vector3;

    fn victim() -> Entity {
        Entity::new(1, Vector3::ZERO, EntityDimensions::new(0.6, 1.8))
    }

    fn melee_props() -> DamageTypeProperties {
        DamageTypeProperties::default_for(DamageType::Melee)
    }

    #[test]
    fn armor_formula_matches_vanilla_reference() {
        let reduced = apply_armor_reduction(10.0, 10.0, 0.0);
        assert!((reduced - 5.0).abs() < 1e-9);
    }

    #[test]
    fn replacement_hit_applies_only_delta() {
        let tracker = InvulnerabilityTracker::new();
        let victim = victim();
        let props = melee_props();

        let first = apply_damage(
            &tracker,
            &victim,
            &DamageEvent { victim: 1, source: None, damage_type: DamageType::Melee, amount: 2.0, weapon: None },
            &props,
            1000,
        )
        .unwrap();
        assert!((first.health_delta - 2.0).abs() < 1e-9);

        let second = apply_damage(
            &tracker,
            &victim,
            &DamageEvent { victim: 1, source: None, damage_type: DamageType::Melee, amount: 5.0, weapon: None },
            &props,
            1004,
        )
        .unwrap();
        assert!((second.health_delta - 3.0).abs() < 1e-9);
        assert!(second.was_replacement);
    }

    #[test]
    fn weaker_hit_inside_window_is_silently_cancelled() {
        let tracker = InvulnerabilityTracker::new();
        let victim = victim();
        let props = melee_props();

        apply_damage(
            &tracker,
            &victim,
            &DamageEvent { victim: 1, source: None, damage_type: DamageType::Melee, amount: 5.0, weapon: None },
            &props,
            1000,
        );
        let second = apply_damage(
            &tracker,
            &victim,
            &DamageEvent { victim: 1, source: None, damage_type: DamageType::Melee, amount: 2.0, weapon: None },
            &props,
            1002,
        );
        assert!(second.is_none());
    }

    #[test]
    fn window_does_not_restart_on_replacement() {
        let tracker = InvulnerabilityTracker::new();
        let victim = victim();
        let props = melee_props();

        apply_damage(
            &tracker,
            &victim,
            &DamageEvent { victim: 1, source: None, damage_type: DamageType::Melee, amount: 2.0, weapon: None },
            &props,
            1000,
        );
        apply_damage(
            &tracker,
            &victim,
            &DamageEvent { victim: 1, source: None, damage_type: DamageType::Melee, amount: 5.0, weapon: None },
            &props,
            1004,
        );
        // Still inside the *original* window (1000 + 10 = 1010), so a third weaker hit is cancelled.
        let third = apply_damage(
            &tracker,
            &victim,
            &DamageEvent { victim: 1, source: None, damage_type: DamageType::Melee, amount: 3.0, weapon: None },
            &props,
            1009,
        );
        assert!(third.is_none());
    }

    #[test]
    fn always_bypasses_armor_types_ignore_armor() {
        let mut victim = victim();
        victim.set_attribute(attribute::ARMOR, 20.0);
        victim.set_attribute(attribute::ARMOR_TOUGHNESS, 20.0);
        let tracker = InvulnerabilityTracker::new();
        let props = DamageTypeProperties::default_for(DamageType::Magic);
        let outcome = apply_damage(
            &tracker,
            &victim,
            &DamageEvent { victim: 1, source: None, damage_type: DamageType::Magic, amount: 10.0, weapon: None },
            &props,
            1,
        )
        .unwrap();
        assert!((outcome.health_delta - 10.0).abs() < 1e-9);
    }

    #[test]
    fn same_item_lockout_rejects_replacement() {
        let tracker = InvulnerabilityTracker::new();
        let victim = victim();
        let mut props = melee_props();
        props.no_replacement_same_item = true;
        let weapon = Some(ItemRef(7));

        apply_damage(
            &tracker,
            &victim,
            &DamageEvent { victim: 1, source: None, damage_type: DamageType::Melee, amount: 2.0, weapon },
            &props,
            1000,
        );
        let second = apply_damage(
            &tracker,
            &victim,
            &DamageEvent { victim: 1, source: None, damage_type: DamageType::Melee, amount: 5.0, weapon },
            &props,
            1002,
        );
        assert!(second.is_none());
    }
}
