//! Game state: the object arena, zones, players, and live effects.
//!
//! There is no global engine instance; every operation runs against an
//! explicit `GameState` (usually through the `Game` controller, which
//! adds the decision source and trace on top).

use crate::abilities::Resolution;
use crate::core::{GameObject, GameRng, ManaPool, ObjectId, PlayerId, PlayerMap};
use crate::effects::{recompute, Modification};
use crate::events::{PendingTrigger, TriggerOrigin};
use crate::game::turn::Turn;
use crate::zones::{ZoneId, ZoneSet};

/// Per-player state.
#[derive(Clone, Debug)]
pub struct Player {
    pub life: i32,
    pub has_lost: bool,
    pub mana_pool: ManaPool,
    pub max_hand_size: usize,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            life: 20,
            has_lost: false,
            mana_pool: ManaPool::new(),
            max_hand_size: 7,
        }
    }
}

/// The complete mutable state of one game.
///
/// The object table is an arena: ids index into `objects`, deleted slots
/// become `None`, and slots are never reused.
pub struct GameState {
    pub players: PlayerMap<Player>,
    pub zones: ZoneSet,
    pub effects: Vec<crate::effects::ContinuousEffect>,
    pub pending_triggers: Vec<PendingTrigger>,
    pub turn: Turn,
    pub rng: GameRng,
    objects: Vec<Option<GameObject>>,
}

impl GameState {
    /// Create an empty state for `player_count` players.
    #[must_use]
    pub fn new(player_count: usize, seed: u64) -> Self {
        Self {
            players: PlayerMap::with_default(player_count),
            zones: ZoneSet::new(player_count),
            effects: Vec::new(),
            pending_triggers: Vec::new(),
            turn: Turn::new(),
            rng: GameRng::new(seed),
            objects: Vec::new(),
        }
    }

    /// Number of players.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.player_count()
    }

    // === Object arena ===

    /// Add an object to the arena, returning its never-reused id.
    pub fn create_object(&mut self, object: GameObject) -> ObjectId {
        let oid = ObjectId::new(self.objects.len() as u32);
        self.objects.push(Some(object));
        oid
    }

    /// Delete an object: removed from its zone (if any) and its arena
    /// slot cleared. The slot is never reused.
    ///
    /// Panics if the object does not exist: deleting twice is a defect.
    pub fn delete_object(&mut self, oid: ObjectId) {
        let slot = self
            .objects
            .get_mut(oid.raw() as usize)
            .unwrap_or_else(|| panic!("{} was never allocated", oid));
        if slot.is_none() {
            panic!("{} deleted twice", oid);
        }
        *slot = None;
        let _ = self.zones.remove(oid);
    }

    /// Borrow an object.
    #[must_use]
    pub fn object(&self, oid: ObjectId) -> Option<&GameObject> {
        self.objects.get(oid.raw() as usize)?.as_ref()
    }

    /// Borrow an object mutably.
    pub fn object_mut(&mut self, oid: ObjectId) -> Option<&mut GameObject> {
        self.objects.get_mut(oid.raw() as usize)?.as_mut()
    }

    /// Iterate live objects in arena (creation) order.
    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &GameObject)> {
        self.objects
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|o| (ObjectId::new(i as u32), o)))
    }

    /// The current controller of an object.
    #[must_use]
    pub fn controller_of(&self, oid: ObjectId) -> Option<PlayerId> {
        self.object(oid).map(GameObject::controller)
    }

    // === Timing ===

    /// May `player` take sorcery-speed actions right now?
    ///
    /// Active player, empty stack, main phase.
    #[must_use]
    pub fn sorcery_speed_for(&self, player: PlayerId) -> bool {
        player == self.turn.active_player
            && self.zones.zone(ZoneId::Stack).is_empty()
            && self.turn.phase.is_main()
    }

    // === Recomputation ===

    /// The global modification list: every active continuous effect's
    /// modifications, then every active static ability's, in that order.
    /// Within each group, collection order stands in for timestamps.
    #[must_use]
    pub fn collect_active_modifications(&self) -> Vec<Modification> {
        let mut mods = Vec::new();

        for effect in &self.effects {
            if effect.is_active(self) {
                mods.extend(effect.modifications.iter().cloned());
            }
        }

        for oid in self.zones.zone(ZoneId::Battlefield).iter() {
            let Some(object) = self.object(oid) else {
                continue;
            };
            for ability in &object.abilities.statics {
                if ability.active.matches(self, oid) {
                    mods.extend(ability.modifications.iter().cloned());
                }
            }
        }

        mods
    }

    /// Rebuild every object's computed characteristics from base plus
    /// the active modification list.
    pub fn recompute_characteristics(&mut self) {
        let mods = self.collect_active_modifications();
        for index in 0..self.objects.len() {
            let oid = ObjectId::new(index as u32);
            if let Some(object) = self.objects[index].as_mut() {
                recompute(object, oid, &mods);
            }
        }
    }

    // === Triggers ===

    /// Look up the controller and resolution a pending trigger converts
    /// into. Returns `None` if the origin no longer exists.
    #[must_use]
    pub fn trigger_resolution(&self, trigger: &PendingTrigger) -> Option<(PlayerId, Resolution)> {
        match trigger.origin {
            TriggerOrigin::Printed { index } => {
                let object = self.object(trigger.source)?;
                let ability = object.abilities.triggered.get(index)?;
                Some((object.controller(), ability.resolution.clone()))
            }
            TriggerOrigin::Granted { effect, index } => {
                let effect = self.effects.get(effect)?;
                let ability = effect.granted_triggers.get(index)?;
                let controller = self.controller_of(trigger.source)?;
                Some((controller, ability.resolution.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BaseAttributes, CardType};
    use crate::effects::{ContinuousEffect, Duration, ModCondition, Modification};

    fn creature(name: &str, power: i32, toughness: i32) -> GameObject {
        GameObject::card(BaseAttributes {
            name: name.to_string(),
            power,
            toughness,
            card_types: [CardType::Creature].into_iter().collect(),
            ..BaseAttributes::default()
        })
    }

    #[test]
    fn test_arena_ids_never_reused() {
        let mut state = GameState::new(2, 42);
        let a = state.create_object(creature("A", 1, 1));
        state.delete_object(a);
        let b = state.create_object(creature("B", 1, 1));

        assert_ne!(a, b);
        assert!(state.object(a).is_none());
        assert!(state.object(b).is_some());
    }

    #[test]
    #[should_panic(expected = "deleted twice")]
    fn test_double_delete_panics() {
        let mut state = GameState::new(2, 42);
        let a = state.create_object(creature("A", 1, 1));
        state.delete_object(a);
        state.delete_object(a);
    }

    #[test]
    fn test_delete_removes_from_zone() {
        let mut state = GameState::new(2, 42);
        let a = state.create_object(creature("A", 1, 1));
        state.zones.insert(a, ZoneId::Battlefield);

        state.delete_object(a);
        assert_eq!(state.zones.find(a), None);
    }

    #[test]
    fn test_sorcery_speed() {
        let mut state = GameState::new(2, 42);
        state.turn.phase = crate::game::turn::Phase::Main1;

        assert!(state.sorcery_speed_for(PlayerId::new(0)));
        assert!(!state.sorcery_speed_for(PlayerId::new(1)));

        state.turn.phase = crate::game::turn::Phase::Upkeep;
        assert!(!state.sorcery_speed_for(PlayerId::new(0)));
    }

    #[test]
    fn test_recompute_applies_active_effects() {
        let mut state = GameState::new(2, 42);
        let oid = state.create_object(creature("Bear", 4, 2));
        state.zones.insert(oid, ZoneId::Battlefield);

        state.effects.push(
            ContinuousEffect::new(oid, Duration::Infinite).with_modification(
                Modification::power_delta(2).when(ModCondition::IsCardType(CardType::Creature)),
            ),
        );

        state.recompute_characteristics();
        assert_eq!(state.object(oid).unwrap().computed.power, 6);

        // Layer determinism: a second pass changes nothing.
        state.recompute_characteristics();
        assert_eq!(state.object(oid).unwrap().computed.power, 6);
    }

    #[test]
    fn test_static_abilities_collected_on_battlefield_only() {
        use crate::abilities::StaticAbility;

        let mut state = GameState::new(2, 42);
        let mut object = creature("Anthem Bearer", 2, 2);
        object
            .abilities
            .statics
            .push(StaticAbility::new(vec![Modification::power_delta(1)]));
        let oid = state.create_object(object);
        state.zones.insert(oid, ZoneId::Hand(PlayerId::new(0)));

        assert!(state.collect_active_modifications().is_empty());

        state
            .zones
            .transfer(oid, ZoneId::Hand(PlayerId::new(0)), ZoneId::Battlefield)
            .unwrap();
        assert_eq!(state.collect_active_modifications().len(), 1);
    }
}
