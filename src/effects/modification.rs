//! Modifications: typed deltas to one characteristic.
//!
//! A modification changes exactly one characteristic of the objects it
//! applies to. Integer characteristics combine arithmetically, type sets
//! by union/difference, and colors bitwise. An optional specific-object
//! filter and an optional condition restrict which objects are affected;
//! both are evaluated against the *partially computed* object, so a
//! condition sees the results of earlier layers, not base values.

use serde::{Deserialize, Serialize};

use crate::core::{CardType, Characteristics, Color, ObjectId, PlayerId, SubType, SuperType};

/// How a value-typed modification combines with the current value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Override,
    Add,
    Subtract,
}

impl Operation {
    fn combine(self, current: i32, value: i32) -> i32 {
        match self {
            Operation::Override => value,
            Operation::Add => current + value,
            Operation::Subtract => current - value,
        }
    }
}

/// One stage of the recomputation pipeline.
///
/// Applied strictly in declaration order. Power/toughness overrides run
/// in their own stage before power/toughness arithmetic so that a "set
/// base" effect never clobbers an earlier bonus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Layer {
    Controller,
    Types,
    Color,
    PowerToughnessSet,
    PowerToughnessAdjust,
}

impl Layer {
    /// The full pipeline, in application order.
    pub const ALL: [Layer; 5] = [
        Layer::Controller,
        Layer::Types,
        Layer::Color,
        Layer::PowerToughnessSet,
        Layer::PowerToughnessAdjust,
    ];
}

/// The typed delta itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ModKind {
    /// Change who controls the object. Always an override.
    Controller(PlayerId),
    /// Add/remove card types.
    CardTypes {
        add: Vec<CardType>,
        remove: Vec<CardType>,
    },
    /// Add/remove supertypes.
    SuperTypes {
        add: Vec<SuperType>,
        remove: Vec<SuperType>,
    },
    /// Add/remove subtypes.
    SubTypes {
        add: Vec<SubType>,
        remove: Vec<SubType>,
    },
    /// Change the object's color. `Add` unions, `Subtract` masks out.
    Color { op: Operation, value: Color },
    /// Change power.
    Power { op: Operation, value: i32 },
    /// Change toughness.
    Toughness { op: Operation, value: i32 },
}

/// Condition over the partially computed object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ModCondition {
    /// The object currently has this card type.
    IsCardType(CardType),
    /// The object currently has this subtype.
    HasSubType(SubType),
    /// The object is currently controlled by this player.
    ControlledBy(PlayerId),
}

impl ModCondition {
    /// Evaluate against a partially computed snapshot.
    #[must_use]
    pub fn matches(&self, computed: &Characteristics) -> bool {
        match self {
            ModCondition::IsCardType(t) => computed.card_types.contains(t),
            ModCondition::HasSubType(t) => computed.sub_types.contains(t),
            ModCondition::ControlledBy(p) => computed.controller == *p,
        }
    }
}

/// A modification: one typed delta plus its applicability filters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Modification {
    pub kind: ModKind,
    /// Restrict to a single object.
    pub only: Option<ObjectId>,
    /// Restrict by predicate over the partially computed object.
    pub condition: Option<ModCondition>,
}

impl Modification {
    /// Create an unconditional modification.
    #[must_use]
    pub fn new(kind: ModKind) -> Self {
        Self {
            kind,
            only: None,
            condition: None,
        }
    }

    /// `+value/+0` style power delta.
    #[must_use]
    pub fn power_delta(value: i32) -> Self {
        let (op, value) = if value < 0 {
            (Operation::Subtract, -value)
        } else {
            (Operation::Add, value)
        };
        Self::new(ModKind::Power { op, value })
    }

    /// `+0/+value` style toughness delta.
    #[must_use]
    pub fn toughness_delta(value: i32) -> Self {
        let (op, value) = if value < 0 {
            (Operation::Subtract, -value)
        } else {
            (Operation::Add, value)
        };
        Self::new(ModKind::Toughness { op, value })
    }

    /// Restrict to one object (builder pattern).
    #[must_use]
    pub fn only_for(mut self, object: ObjectId) -> Self {
        self.only = Some(object);
        self
    }

    /// Restrict by condition (builder pattern).
    #[must_use]
    pub fn when(mut self, condition: ModCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// The pipeline stage this modification runs in.
    #[must_use]
    pub fn layer(&self) -> Layer {
        match &self.kind {
            ModKind::Controller(_) => Layer::Controller,
            ModKind::CardTypes { .. } | ModKind::SuperTypes { .. } | ModKind::SubTypes { .. } => {
                Layer::Types
            }
            ModKind::Color { .. } => Layer::Color,
            ModKind::Power { op, .. } | ModKind::Toughness { op, .. } => match op {
                Operation::Override => Layer::PowerToughnessSet,
                Operation::Add | Operation::Subtract => Layer::PowerToughnessAdjust,
            },
        }
    }

    /// Does this modification apply to the object in its current
    /// partially-computed state?
    #[must_use]
    pub fn applies_to(&self, object: ObjectId, computed: &Characteristics) -> bool {
        if let Some(only) = self.only {
            if only != object {
                return false;
            }
        }
        match &self.condition {
            Some(condition) => condition.matches(computed),
            None => true,
        }
    }

    /// Apply the delta to a computed snapshot.
    pub fn apply(&self, computed: &mut Characteristics) {
        match &self.kind {
            ModKind::Controller(player) => computed.controller = *player,
            ModKind::CardTypes { add, remove } => {
                for t in add {
                    computed.card_types.insert(*t);
                }
                for t in remove {
                    computed.card_types.remove(t);
                }
            }
            ModKind::SuperTypes { add, remove } => {
                for t in add {
                    computed.super_types.insert(*t);
                }
                for t in remove {
                    computed.super_types.remove(t);
                }
            }
            ModKind::SubTypes { add, remove } => {
                for t in add {
                    computed.sub_types.insert(*t);
                }
                for t in remove {
                    computed.sub_types.remove(t);
                }
            }
            ModKind::Color { op, value } => {
                computed.color = match op {
                    Operation::Override => *value,
                    Operation::Add => computed.color.union(*value),
                    Operation::Subtract => computed.color.difference(*value),
                };
            }
            ModKind::Power { op, value } => {
                computed.power = op.combine(computed.power, *value);
            }
            ModKind::Toughness { op, value } => {
                computed.toughness = op.combine(computed.toughness, *value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BaseAttributes;

    fn creature() -> Characteristics {
        let base = BaseAttributes {
            name: "Test".to_string(),
            power: 2,
            toughness: 3,
            card_types: [CardType::Creature].into_iter().collect(),
            ..BaseAttributes::default()
        };
        Characteristics::from_base(&base)
    }

    #[test]
    fn test_power_delta() {
        let mut computed = creature();
        Modification::power_delta(2).apply(&mut computed);
        assert_eq!(computed.power, 4);

        Modification::power_delta(-1).apply(&mut computed);
        assert_eq!(computed.power, 3);
    }

    #[test]
    fn test_override_layer() {
        let set = Modification::new(ModKind::Power {
            op: Operation::Override,
            value: 7,
        });
        assert_eq!(set.layer(), Layer::PowerToughnessSet);

        let add = Modification::power_delta(1);
        assert_eq!(add.layer(), Layer::PowerToughnessAdjust);
    }

    #[test]
    fn test_type_mod() {
        let mut computed = creature();
        Modification::new(ModKind::CardTypes {
            add: vec![CardType::Artifact],
            remove: vec![CardType::Creature],
        })
        .apply(&mut computed);

        assert!(computed.card_types.contains(&CardType::Artifact));
        assert!(!computed.is_creature());
    }

    #[test]
    fn test_color_mod() {
        let mut computed = creature();
        Modification::new(ModKind::Color {
            op: Operation::Add,
            value: Color::RED,
        })
        .apply(&mut computed);
        assert!(computed.color.contains(Color::RED));

        Modification::new(ModKind::Color {
            op: Operation::Subtract,
            value: Color::RED,
        })
        .apply(&mut computed);
        assert!(!computed.color.contains(Color::RED));
    }

    #[test]
    fn test_specific_object_filter() {
        let m = Modification::power_delta(2).only_for(ObjectId::new(7));
        let computed = creature();

        assert!(m.applies_to(ObjectId::new(7), &computed));
        assert!(!m.applies_to(ObjectId::new(8), &computed));
    }

    #[test]
    fn test_condition_sees_partial_state() {
        // Condition on creature-ness evaluated after a type-removing mod
        // has already run.
        let mut computed = creature();
        let condition = Modification::power_delta(2).when(ModCondition::IsCardType(CardType::Creature));

        assert!(condition.applies_to(ObjectId::new(1), &computed));

        Modification::new(ModKind::CardTypes {
            add: vec![],
            remove: vec![CardType::Creature],
        })
        .apply(&mut computed);

        assert!(!condition.applies_to(ObjectId::new(1), &computed));
    }

    #[test]
    fn test_controller_mod() {
        let mut computed = creature();
        Modification::new(ModKind::Controller(PlayerId::new(1))).apply(&mut computed);
        assert_eq!(computed.controller, PlayerId::new(1));
    }

    #[test]
    fn test_serde_roundtrip() {
        let m = Modification::power_delta(2).when(ModCondition::IsCardType(CardType::Creature));
        let json = serde_json::to_string(&m).unwrap();
        let back: Modification = serde_json::from_str(&json).unwrap();
        assert_eq!(m, back);
    }
}
