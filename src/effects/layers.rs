//! The characteristic recomputation pipeline.
//!
//! `recompute` rebuilds one object's computed snapshot from its base
//! snapshot plus the global modification list, one layer at a time.
//! Within a layer, modifications apply in list order; the list order is
//! the collection order (continuous effects first, then battlefield
//! static abilities), standing in for a full timestamp system.
//!
//! Recomputation is idempotent and touches nothing but the object's own
//! computed snapshot: running it twice with the same inputs yields the
//! same result, and it never mutates zones, counters, or other objects.

use crate::core::{GameObject, ObjectId};

use super::modification::{Layer, Modification};

/// Rebuild one object's computed characteristics.
pub fn recompute(object: &mut GameObject, oid: ObjectId, modifications: &[Modification]) {
    object.reset_characteristics();

    for layer in Layer::ALL {
        for modification in modifications {
            if modification.layer() != layer {
                continue;
            }
            if !modification.applies_to(oid, &object.computed) {
                continue;
            }
            modification.apply(&mut object.computed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BaseAttributes, CardType, PlayerId};
    use crate::effects::modification::{ModCondition, ModKind, Operation};

    fn bear(power: i32, toughness: i32) -> GameObject {
        GameObject::card(BaseAttributes {
            name: "Bear".to_string(),
            power,
            toughness,
            card_types: [CardType::Creature].into_iter().collect(),
            owner: PlayerId::new(0),
            ..BaseAttributes::default()
        })
    }

    #[test]
    fn test_no_modifications_is_base() {
        let mut obj = bear(2, 2);
        obj.computed.power = 99;

        recompute(&mut obj, ObjectId::new(1), &[]);

        assert_eq!(obj.computed.power, 2);
        assert_eq!(obj.computed.toughness, 2);
    }

    #[test]
    fn test_deltas_stack_in_list_order() {
        let mut obj = bear(4, 2);
        let mods = vec![
            Modification::power_delta(2).when(ModCondition::IsCardType(CardType::Creature)),
            Modification::toughness_delta(-1).when(ModCondition::IsCardType(CardType::Creature)),
        ];

        recompute(&mut obj, ObjectId::new(1), &mods);

        assert_eq!(obj.computed.power, 6);
        assert_eq!(obj.computed.toughness, 1);
    }

    #[test]
    fn test_set_runs_before_adjust() {
        // A base-setting effect listed after a delta still applies first,
        // because overrides live in the earlier layer.
        let mut obj = bear(2, 2);
        let mods = vec![
            Modification::power_delta(1),
            Modification::new(ModKind::Power {
                op: Operation::Override,
                value: 5,
            }),
        ];

        recompute(&mut obj, ObjectId::new(1), &mods);

        assert_eq!(obj.computed.power, 6);
    }

    #[test]
    fn test_type_change_gates_later_condition() {
        // Losing Creature in the type layer disables creature-conditioned
        // P/T mods in later layers.
        let mut obj = bear(2, 2);
        let mods = vec![
            Modification::new(ModKind::CardTypes {
                add: vec![],
                remove: vec![CardType::Creature],
            }),
            Modification::power_delta(3).when(ModCondition::IsCardType(CardType::Creature)),
        ];

        recompute(&mut obj, ObjectId::new(1), &mods);

        assert_eq!(obj.computed.power, 2);
    }

    #[test]
    fn test_idempotent() {
        let mut obj = bear(4, 2);
        let mods = vec![
            Modification::power_delta(2),
            Modification::toughness_delta(-1),
        ];

        recompute(&mut obj, ObjectId::new(1), &mods);
        let first = obj.computed.clone();

        recompute(&mut obj, ObjectId::new(1), &mods);
        assert_eq!(obj.computed, first);
    }
}
