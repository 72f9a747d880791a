//! The ability model.
//!
//! Abilities never mutate game state directly; they *generate* events:
//!
//! - `StaticAbility`: a conditionally-active bundle of modifications,
//!   collected by the recomputation pipeline.
//! - `ActivatedAbility`: costs + activation condition + resolution. A
//!   mana ability is an activated ability that skips the stack.
//! - `TriggeredAbility`: watches one event class; when its condition
//!   holds at detection time it is enqueued as a pending trigger and
//!   converted to a stack object at the next state check.
//!
//! A `Resolution` pairs the effect closures supplied by card content
//! with the target slots they consume. Effect closures receive an
//! `EffectRun` and push child events through it; the engine never
//! inspects card-specific logic beyond invoking the closures.

pub mod target;

use std::sync::Arc;

use crate::core::{ObjectId, PlayerId};
use crate::events::{Cost, EventClass, EventKind};
use crate::game::engine::EffectRun;
use crate::game::state::GameState;
use crate::zones::ZoneId;

use crate::effects::Modification;

pub use target::{DeclaredTarget, TargetPredicate, TargetRef, TargetSpec};

/// A card-content effect closure. Runs inside an event; pushes child
/// events through the `EffectRun`.
pub type EffectFn = Arc<dyn Fn(&mut EffectRun<'_>) + Send + Sync>;

/// What an ability or spell does when it resolves: effect closures plus
/// the target slots they consume.
#[derive(Clone, Default)]
pub struct Resolution {
    pub effects: Vec<EffectFn>,
    pub targets: Vec<TargetSpec>,
}

impl Resolution {
    /// A resolution with effects and no targets.
    #[must_use]
    pub fn new(effects: Vec<EffectFn>) -> Self {
        Self {
            effects,
            targets: Vec::new(),
        }
    }

    /// Add a target slot (builder pattern).
    #[must_use]
    pub fn with_target(mut self, spec: TargetSpec) -> Self {
        self.targets.push(spec);
        self
    }
}

/// When an ability contributes at all (static and triggered abilities).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ActivityCondition {
    /// Active while the owning object is on the battlefield.
    #[default]
    OnBattlefield,
    /// Always active, regardless of zone.
    Always,
}

impl ActivityCondition {
    /// Evaluate for the ability's owning object.
    #[must_use]
    pub fn matches(self, state: &GameState, source: ObjectId) -> bool {
        match self {
            ActivityCondition::OnBattlefield => state.zones.is_in(source, ZoneId::Battlefield),
            ActivityCondition::Always => true,
        }
    }
}

/// A static ability: modifications that apply while active.
#[derive(Clone)]
pub struct StaticAbility {
    pub active: ActivityCondition,
    pub modifications: Vec<Modification>,
}

impl StaticAbility {
    /// A battlefield-active static ability.
    #[must_use]
    pub fn new(modifications: Vec<Modification>) -> Self {
        Self {
            active: ActivityCondition::default(),
            modifications,
        }
    }
}

/// When an activated ability may legally be activated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ActivationCondition {
    /// On the battlefield, by its controller. The default.
    #[default]
    BattlefieldController,
    /// As the default, but only at sorcery speed.
    BattlefieldControllerSorcery,
}

impl ActivationCondition {
    /// Evaluate for `player` trying to activate `source`'s ability.
    #[must_use]
    pub fn matches(self, state: &GameState, source: ObjectId, player: PlayerId) -> bool {
        let on_battlefield = state.zones.is_in(source, ZoneId::Battlefield);
        let controls = state
            .object(source)
            .is_some_and(|o| o.controller() == player);

        match self {
            ActivationCondition::BattlefieldController => on_battlefield && controls,
            ActivationCondition::BattlefieldControllerSorcery => {
                on_battlefield && controls && state.sorcery_speed_for(player)
            }
        }
    }
}

/// An activated ability: pay the costs, get the resolution.
///
/// Mana abilities (`mana == true`) never use the stack: activation pays
/// the costs and runs the resolution in the same event tree, which is
/// what lets them interleave with cost payment.
#[derive(Clone)]
pub struct ActivatedAbility {
    pub costs: Vec<Cost>,
    pub condition: ActivationCondition,
    pub resolution: Resolution,
    pub mana: bool,
}

impl ActivatedAbility {
    /// A normal (stack-using) activated ability.
    #[must_use]
    pub fn new(costs: Vec<Cost>, resolution: Resolution) -> Self {
        Self {
            costs,
            condition: ActivationCondition::default(),
            resolution,
            mana: false,
        }
    }

    /// A mana ability. Mana abilities cannot target.
    #[must_use]
    pub fn mana(costs: Vec<Cost>, effects: Vec<EffectFn>) -> Self {
        Self {
            costs,
            condition: ActivationCondition::default(),
            resolution: Resolution::new(effects),
            mana: true,
        }
    }

    /// Override the activation condition (builder pattern).
    #[must_use]
    pub fn with_condition(mut self, condition: ActivationCondition) -> Self {
        self.condition = condition;
        self
    }

    /// Side-effect-free legality check: condition holds and every cost
    /// reports itself payable.
    #[must_use]
    pub fn can_be_activated(&self, state: &GameState, source: ObjectId, player: PlayerId) -> bool {
        if !self.condition.matches(state, source, player) {
            return false;
        }
        self.costs.iter().all(|c| c.can_pay(state, source))
    }
}

/// Condition a triggered ability checks against the concrete event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerCondition {
    /// Fire on every event of the watched class.
    Always,
    /// Fire when any object moves into the given zone.
    MovedTo(ZoneId),
    /// Fire when the ability's own source moves into the given zone.
    SelfMovedTo(ZoneId),
    /// Fire when the ability's own source becomes tapped.
    SelfTapped,
}

impl TriggerCondition {
    /// Does the condition hold for this event?
    #[must_use]
    pub fn matches(self, source: ObjectId, event: &EventKind) -> bool {
        match (self, event) {
            (TriggerCondition::Always, _) => true,
            (TriggerCondition::MovedTo(zone), EventKind::MoveZone { to, .. }) => *to == zone,
            (TriggerCondition::SelfMovedTo(zone), EventKind::MoveZone { object, to, .. }) => {
                *object == source && *to == zone
            }
            (TriggerCondition::SelfTapped, EventKind::Tap { object }) => *object == source,
            _ => false,
        }
    }
}

/// A triggered ability: watch one event class, enqueue when matched.
#[derive(Clone)]
pub struct TriggeredAbility {
    /// The runtime event class this trigger is registered for.
    pub watch: EventClass,
    /// Activity predicate, checked at detection time.
    pub active: ActivityCondition,
    pub condition: TriggerCondition,
    pub resolution: Resolution,
}

impl TriggeredAbility {
    /// A battlefield-active trigger.
    #[must_use]
    pub fn new(watch: EventClass, condition: TriggerCondition, resolution: Resolution) -> Self {
        Self {
            watch,
            active: ActivityCondition::default(),
            condition,
            resolution,
        }
    }

    /// Override the activity condition (builder pattern).
    #[must_use]
    pub fn with_activity(mut self, active: ActivityCondition) -> Self {
        self.active = active;
        self
    }

    /// Does this trigger fire for `event`, given its source?
    #[must_use]
    pub fn does_trigger(&self, state: &GameState, source: ObjectId, event: &EventKind) -> bool {
        if event.class() != self.watch {
            return false;
        }
        if !self.active.matches(state, source) {
            return false;
        }
        self.condition.matches(source, event)
    }
}

/// The abilities printed on one object.
#[derive(Clone, Default)]
pub struct AbilitySet {
    pub statics: Vec<StaticAbility>,
    pub activated: Vec<ActivatedAbility>,
    pub triggered: Vec<TriggeredAbility>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BaseAttributes, GameObject};

    fn state_with_object() -> (GameState, ObjectId) {
        let mut state = GameState::new(2, 42);
        let oid = state.create_object(GameObject::card(BaseAttributes {
            name: "Rock".to_string(),
            owner: PlayerId::new(0),
            ..BaseAttributes::default()
        }));
        state.zones.insert(oid, ZoneId::Battlefield);
        (state, oid)
    }

    #[test]
    fn test_activity_condition() {
        let (mut state, oid) = state_with_object();

        assert!(ActivityCondition::OnBattlefield.matches(&state, oid));
        assert!(ActivityCondition::Always.matches(&state, oid));

        state
            .zones
            .transfer(oid, ZoneId::Battlefield, ZoneId::Exile)
            .unwrap();

        assert!(!ActivityCondition::OnBattlefield.matches(&state, oid));
        assert!(ActivityCondition::Always.matches(&state, oid));
    }

    #[test]
    fn test_activation_requires_controller() {
        let (state, oid) = state_with_object();
        let ability = ActivatedAbility::mana(vec![Cost::tap_self()], vec![]);

        assert!(ability.can_be_activated(&state, oid, PlayerId::new(0)));
        assert!(!ability.can_be_activated(&state, oid, PlayerId::new(1)));
    }

    #[test]
    fn test_activation_blocked_by_unpayable_cost() {
        let (mut state, oid) = state_with_object();
        let ability = ActivatedAbility::mana(vec![Cost::tap_self()], vec![]);

        state.object_mut(oid).unwrap().status.tapped = true;
        assert!(!ability.can_be_activated(&state, oid, PlayerId::new(0)));
    }

    #[test]
    fn test_trigger_condition_moved_to() {
        let source = ObjectId::new(1);
        let moved = EventKind::MoveZone {
            object: ObjectId::new(2),
            from: ZoneId::Stack,
            to: ZoneId::Battlefield,
        };

        assert!(TriggerCondition::MovedTo(ZoneId::Battlefield).matches(source, &moved));
        assert!(!TriggerCondition::SelfMovedTo(ZoneId::Battlefield).matches(source, &moved));
        assert!(
            !TriggerCondition::MovedTo(ZoneId::Exile).matches(source, &moved)
        );
    }

    #[test]
    fn test_does_trigger_checks_activity() {
        let (mut state, oid) = state_with_object();
        let trigger = TriggeredAbility::new(
            EventClass::MoveZone,
            TriggerCondition::MovedTo(ZoneId::Battlefield),
            Resolution::default(),
        );

        let event = EventKind::MoveZone {
            object: ObjectId::new(9),
            from: ZoneId::Stack,
            to: ZoneId::Battlefield,
        };

        assert!(trigger.does_trigger(&state, oid, &event));

        // Source leaves the battlefield: activity predicate now fails.
        state
            .zones
            .transfer(oid, ZoneId::Battlefield, ZoneId::Exile)
            .unwrap();
        assert!(!trigger.does_trigger(&state, oid, &event));
    }
}
