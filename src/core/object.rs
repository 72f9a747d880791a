//! Game objects and their characteristics.
//!
//! Every object carries two characteristic snapshots:
//!
//! - `base`: immutable, set at creation from the card (or synthesized for
//!   transient ability objects).
//! - `computed`: rebuilt on every state check from `base` plus all active
//!   modifications, in layer order. Reads of an object's "current" name,
//!   types, power, or controller always go through `computed`.
//!
//! Objects also own permanent status (tapped, face-down, marked damage),
//! a counter store, and their ability lists. Transient ability objects
//! (activated/triggered abilities waiting on the stack) carry an
//! `AbilityPart` holding the resolution to run.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use super::ids::{ObjectId, PlayerId};
use super::mana::{Color, ManaCost};
use crate::abilities::{AbilitySet, DeclaredTarget, Resolution};
use crate::events::Cost;

/// Card types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    Artifact,
    Creature,
    Enchantment,
    Instant,
    Land,
    Planeswalker,
    Sorcery,
}

impl CardType {
    /// Can an object with this type exist on the battlefield?
    #[must_use]
    pub fn is_permanent(self) -> bool {
        !matches!(self, CardType::Instant | CardType::Sorcery)
    }
}

/// Supertypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SuperType {
    Legendary,
    Basic,
    Token,
}

/// Creature and land subtypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubType {
    Ogre,
    Warrior,
    Crab,
    Island,
    Mountain,
}

/// Immutable printed characteristics, set at object creation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseAttributes {
    pub name: String,
    pub mana_cost: ManaCost,
    pub power: i32,
    pub toughness: i32,
    pub loyalty: i32,
    pub card_types: FxHashSet<CardType>,
    pub super_types: FxHashSet<SuperType>,
    pub sub_types: FxHashSet<SubType>,
    pub owner: PlayerId,
}

/// The live, recomputed characteristics of an object.
///
/// Reset to `BaseAttributes` and rebuilt by the modification pipeline on
/// every state check. Never mutated outside recomputation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Characteristics {
    pub name: String,
    pub mana_cost: ManaCost,
    pub power: i32,
    pub toughness: i32,
    pub controller: PlayerId,
    pub color: Color,
    pub card_types: FxHashSet<CardType>,
    pub super_types: FxHashSet<SuperType>,
    pub sub_types: FxHashSet<SubType>,
}

impl Characteristics {
    /// Derive the starting snapshot from base attributes.
    ///
    /// The controller starts as the owner and the color as the mana
    /// cost's identity; modifications may change both.
    #[must_use]
    pub fn from_base(base: &BaseAttributes) -> Self {
        Self {
            name: base.name.clone(),
            mana_cost: base.mana_cost.clone(),
            power: base.power,
            toughness: base.toughness,
            controller: base.owner,
            color: base.mana_cost.identity(),
            card_types: base.card_types.clone(),
            super_types: base.super_types.clone(),
            sub_types: base.sub_types.clone(),
        }
    }

    /// True if any of the object's current types is a permanent type.
    #[must_use]
    pub fn is_permanent(&self) -> bool {
        self.card_types.iter().any(|t| t.is_permanent())
    }

    /// True if the object is currently a creature.
    #[must_use]
    pub fn is_creature(&self) -> bool {
        self.card_types.contains(&CardType::Creature)
    }

    /// True if the object is currently a land.
    #[must_use]
    pub fn is_land(&self) -> bool {
        self.card_types.contains(&CardType::Land)
    }

    /// True if the object can be cast at instant speed.
    #[must_use]
    pub fn is_instant_speed(&self) -> bool {
        self.card_types.contains(&CardType::Instant)
    }
}

/// Battlefield status flags plus marked damage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermanentStatus {
    pub tapped: bool,
    pub flipped: bool,
    pub face_down: bool,
    pub phased_out: bool,
    pub damage: i32,
}

impl PermanentStatus {
    /// Reset all flags and marked damage.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// String-keyed counter store (+1/+1, loyalty, charge, ...).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterStore {
    counters: FxHashMap<String, u32>,
}

impl CounterStore {
    /// Add `count` counters of the given kind.
    pub fn add(&mut self, kind: impl Into<String>, count: u32) {
        *self.counters.entry(kind.into()).or_insert(0) += count;
    }

    /// Remove up to `count` counters; returns how many were removed.
    pub fn remove(&mut self, kind: &str, count: u32) -> u32 {
        match self.counters.get_mut(kind) {
            Some(current) => {
                let removed = count.min(*current);
                *current -= removed;
                if *current == 0 {
                    self.counters.remove(kind);
                }
                removed
            }
            None => 0,
        }
    }

    /// Number of counters of the given kind.
    #[must_use]
    pub fn count(&self, kind: &str) -> u32 {
        self.counters.get(kind).copied().unwrap_or(0)
    }

    /// Remove all counters.
    pub fn clear(&mut self) {
        self.counters.clear();
    }
}

/// Which kind of transient ability object this is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbilityObjectKind {
    Activated,
    Triggered,
}

/// The transient part of an ability object on the stack.
#[derive(Clone)]
pub struct AbilityPart {
    /// The object whose ability generated this.
    pub source: ObjectId,
    /// Activated or triggered.
    pub kind: AbilityObjectKind,
    /// The resolution to run when this leaves the stack.
    pub resolution: Resolution,
}

/// A game object: a card anywhere in the game, or a transient ability
/// object on the stack.
#[derive(Clone)]
pub struct GameObject {
    pub base: BaseAttributes,
    pub computed: Characteristics,
    pub status: PermanentStatus,
    pub counters: CounterStore,
    /// Static / activated / triggered abilities printed on the object.
    pub abilities: AbilitySet,
    /// Casting costs (cards only).
    pub costs: Vec<Cost>,
    /// Spell resolution run when the card resolves from the stack.
    pub spell: Resolution,
    /// Target slots declared while this object waits on the stack.
    pub declared_targets: Vec<DeclaredTarget>,
    /// Present for transient ability objects.
    pub ability_part: Option<AbilityPart>,
}

impl GameObject {
    /// Create a card object from base attributes.
    #[must_use]
    pub fn card(base: BaseAttributes) -> Self {
        let computed = Characteristics::from_base(&base);
        Self {
            base,
            computed,
            status: PermanentStatus::default(),
            counters: CounterStore::default(),
            abilities: AbilitySet::default(),
            costs: Vec::new(),
            spell: Resolution::default(),
            declared_targets: Vec::new(),
            ability_part: None,
        }
    }

    /// Create a transient ability object.
    ///
    /// Ability objects have no printed characteristics of their own; the
    /// base is synthesized so the pipeline can still run over them. The
    /// controller is inherited via `owner`.
    #[must_use]
    pub fn ability(
        source: ObjectId,
        controller: PlayerId,
        kind: AbilityObjectKind,
        resolution: Resolution,
    ) -> Self {
        let base = BaseAttributes {
            name: String::from("Ability"),
            owner: controller,
            ..BaseAttributes::default()
        };
        let computed = Characteristics::from_base(&base);
        let target_count = resolution.targets.len();
        Self {
            base,
            computed,
            status: PermanentStatus::default(),
            counters: CounterStore::default(),
            abilities: AbilitySet::default(),
            costs: Vec::new(),
            spell: Resolution::default(),
            declared_targets: vec![DeclaredTarget::default(); target_count],
            ability_part: Some(AbilityPart {
                source,
                kind,
                resolution,
            }),
        }
    }

    /// True if this is a transient ability object.
    #[must_use]
    pub fn is_ability_object(&self) -> bool {
        self.ability_part.is_some()
    }

    /// The object's current controller.
    #[must_use]
    pub fn controller(&self) -> PlayerId {
        self.computed.controller
    }

    /// The target spec for one declaration slot: the ability's targets
    /// for ability objects, the spell's otherwise.
    #[must_use]
    pub fn target_spec(&self, slot: usize) -> Option<crate::abilities::TargetSpec> {
        match &self.ability_part {
            Some(part) => part.resolution.targets.get(slot).copied(),
            None => self.spell.targets.get(slot).copied(),
        }
    }

    /// Reset computed characteristics to the base snapshot.
    pub fn reset_characteristics(&mut self) {
        self.computed = Characteristics::from_base(&self.base);
    }

    /// Clear status, counters, and declared targets (on zone change).
    pub fn reset_transient_state(&mut self) {
        self.status.reset();
        self.counters.clear();
        for target in &mut self.declared_targets {
            target.reset();
        }
    }
}
