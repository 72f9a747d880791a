//! Targets: declared bindings between an ability/spell and recipients.
//!
//! A `TargetSpec` describes what may be targeted (a predicate) and how
//! many recipients to bind (min/max). Declaration happens while the
//! spell or ability object sits on the stack: the engine computes the
//! legal set, asks the controller to choose, and stores the result in a
//! `DeclaredTarget` slot on the stack object.

use serde::{Deserialize, Serialize};

use crate::core::{ObjectId, PlayerId};
use crate::game::state::GameState;
use crate::zones::ZoneId;

/// A player or an object: anything that can be targeted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetRef {
    Player(PlayerId),
    Object(ObjectId),
}

impl TargetRef {
    /// The player, if this references one.
    #[must_use]
    pub fn player(self) -> Option<PlayerId> {
        match self {
            TargetRef::Player(p) => Some(p),
            TargetRef::Object(_) => None,
        }
    }

    /// The object, if this references one.
    #[must_use]
    pub fn object(self) -> Option<ObjectId> {
        match self {
            TargetRef::Object(o) => Some(o),
            TargetRef::Player(_) => None,
        }
    }
}

impl std::fmt::Display for TargetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetRef::Player(p) => write!(f, "{}", p),
            TargetRef::Object(o) => write!(f, "{}", o),
        }
    }
}

/// What a target slot accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetPredicate {
    /// "Any target": a player, or a creature or planeswalker on the
    /// battlefield.
    AnyTarget,
    /// Any player.
    AnyPlayer,
    /// A creature on the battlefield.
    CreatureOnBattlefield,
    /// Any permanent on the battlefield.
    PermanentOnBattlefield,
}

impl TargetPredicate {
    /// Is `target` a legal recipient right now?
    #[must_use]
    pub fn matches(self, state: &GameState, target: TargetRef) -> bool {
        match (self, target) {
            (TargetPredicate::AnyPlayer, TargetRef::Player(_)) => true,
            (TargetPredicate::AnyPlayer, TargetRef::Object(_)) => false,
            (TargetPredicate::AnyTarget, TargetRef::Player(_)) => true,
            (TargetPredicate::AnyTarget, TargetRef::Object(oid)) => {
                state.zones.is_in(oid, ZoneId::Battlefield)
                    && state.object(oid).is_some_and(|o| {
                        o.computed.is_creature()
                            || o.computed
                                .card_types
                                .contains(&crate::core::CardType::Planeswalker)
                    })
            }
            (TargetPredicate::CreatureOnBattlefield, TargetRef::Object(oid)) => {
                state.zones.is_in(oid, ZoneId::Battlefield)
                    && state.object(oid).is_some_and(|o| o.computed.is_creature())
            }
            (TargetPredicate::CreatureOnBattlefield, TargetRef::Player(_)) => false,
            (TargetPredicate::PermanentOnBattlefield, TargetRef::Object(oid)) => {
                state.zones.is_in(oid, ZoneId::Battlefield)
            }
            (TargetPredicate::PermanentOnBattlefield, TargetRef::Player(_)) => false,
        }
    }
}

/// One target slot: predicate plus cardinality bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    pub predicate: TargetPredicate,
    pub min: usize,
    pub max: usize,
}

impl TargetSpec {
    /// Exactly one recipient.
    #[must_use]
    pub fn one(predicate: TargetPredicate) -> Self {
        Self {
            predicate,
            min: 1,
            max: 1,
        }
    }

    /// "Any target", exactly one recipient.
    #[must_use]
    pub fn any_target() -> Self {
        Self::one(TargetPredicate::AnyTarget)
    }

    /// Between `min` and `max` recipients (builder pattern).
    #[must_use]
    pub fn with_bounds(mut self, min: usize, max: usize) -> Self {
        self.min = min;
        self.max = max;
        self
    }
}

/// The declared state of one target slot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredTarget {
    pub chosen: Vec<TargetRef>,
    pub declared: bool,
}

impl DeclaredTarget {
    /// The first chosen recipient, if any.
    #[must_use]
    pub fn first(&self) -> Option<TargetRef> {
        self.chosen.first().copied()
    }

    /// Clear the slot back to undeclared.
    pub fn reset(&mut self) {
        self.chosen.clear();
        self.declared = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BaseAttributes, CardType, GameObject};

    fn state_with_creature() -> (GameState, ObjectId) {
        let mut state = GameState::new(2, 42);
        let oid = state.create_object(GameObject::card(BaseAttributes {
            name: "Bear".to_string(),
            power: 2,
            toughness: 2,
            card_types: [CardType::Creature].into_iter().collect(),
            ..BaseAttributes::default()
        }));
        state.zones.insert(oid, ZoneId::Battlefield);
        state.recompute_characteristics();
        (state, oid)
    }

    #[test]
    fn test_any_target() {
        let (state, oid) = state_with_creature();

        assert!(TargetPredicate::AnyTarget.matches(&state, TargetRef::Player(PlayerId::new(1))));
        assert!(TargetPredicate::AnyTarget.matches(&state, TargetRef::Object(oid)));
    }

    #[test]
    fn test_creature_not_targetable_off_battlefield() {
        let (mut state, oid) = state_with_creature();
        state
            .zones
            .transfer(oid, ZoneId::Battlefield, ZoneId::Exile)
            .unwrap();

        assert!(!TargetPredicate::AnyTarget.matches(&state, TargetRef::Object(oid)));
        assert!(!TargetPredicate::CreatureOnBattlefield.matches(&state, TargetRef::Object(oid)));
    }

    #[test]
    fn test_any_player_rejects_objects() {
        let (state, oid) = state_with_creature();

        assert!(TargetPredicate::AnyPlayer.matches(&state, TargetRef::Player(PlayerId::new(0))));
        assert!(!TargetPredicate::AnyPlayer.matches(&state, TargetRef::Object(oid)));
    }

    #[test]
    fn test_declared_target_reset() {
        let mut slot = DeclaredTarget {
            chosen: vec![TargetRef::Player(PlayerId::new(0))],
            declared: true,
        };

        assert_eq!(slot.first(), Some(TargetRef::Player(PlayerId::new(0))));

        slot.reset();
        assert!(!slot.declared);
        assert_eq!(slot.first(), None);
    }

    #[test]
    fn test_spec_bounds() {
        let spec = TargetSpec::one(TargetPredicate::AnyTarget).with_bounds(0, 3);
        assert_eq!(spec.min, 0);
        assert_eq!(spec.max, 3);
    }
}
