//! Card definitions: the card-content boundary.
//!
//! A `CardDefinition` is a declarative descriptor: base characteristics,
//! cost generators, effect closures, target specifications, and ability
//! lists. The engine never looks inside card-specific logic; it
//! instantiates definitions into `GameObject`s and invokes the closures
//! inside events.
//!
//! The free functions at the bottom are stock effect closures covering
//! the common cases (produce mana, draw, damage, life, until-end-of-turn
//! modifications); bespoke cards supply their own closures.

use std::sync::Arc;

use crate::abilities::{
    AbilitySet, ActivatedAbility, DeclaredTarget, EffectFn, Resolution, StaticAbility, TargetSpec,
    TriggeredAbility,
};
use crate::core::{
    BaseAttributes, CardType, GameObject, ManaCost, ManaSymbol, PlayerId, SubType, SuperType,
};
use crate::effects::{ContinuousEffect, Duration, Modification};
use crate::events::{Cost, Event, EventKind};
use crate::game::engine::EffectRun;

/// A declarative card descriptor.
#[derive(Clone, Default)]
pub struct CardDefinition {
    pub name: String,
    pub mana_cost: ManaCost,
    pub power: i32,
    pub toughness: i32,
    pub card_types: Vec<CardType>,
    pub super_types: Vec<SuperType>,
    pub sub_types: Vec<SubType>,
    /// Costs beyond the mana cost.
    pub extra_costs: Vec<Cost>,
    /// What the card does when it resolves as a spell.
    pub spell: Resolution,
    pub abilities: AbilitySet,
}

impl CardDefinition {
    /// Start a definition with just a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the mana cost (builder pattern).
    #[must_use]
    pub fn mana_cost(mut self, cost: ManaCost) -> Self {
        self.mana_cost = cost;
        self
    }

    /// Set power and toughness (builder pattern).
    #[must_use]
    pub fn power_toughness(mut self, power: i32, toughness: i32) -> Self {
        self.power = power;
        self.toughness = toughness;
        self
    }

    /// Add a card type (builder pattern).
    #[must_use]
    pub fn card_type(mut self, t: CardType) -> Self {
        self.card_types.push(t);
        self
    }

    /// Add a supertype (builder pattern).
    #[must_use]
    pub fn super_type(mut self, t: SuperType) -> Self {
        self.super_types.push(t);
        self
    }

    /// Add a subtype (builder pattern).
    #[must_use]
    pub fn sub_type(mut self, t: SubType) -> Self {
        self.sub_types.push(t);
        self
    }

    /// Add a non-mana casting cost (builder pattern).
    #[must_use]
    pub fn extra_cost(mut self, cost: Cost) -> Self {
        self.extra_costs.push(cost);
        self
    }

    /// Add a spell resolution effect (builder pattern).
    #[must_use]
    pub fn effect(mut self, effect: EffectFn) -> Self {
        self.spell.effects.push(effect);
        self
    }

    /// Add a spell target slot (builder pattern).
    #[must_use]
    pub fn target(mut self, spec: TargetSpec) -> Self {
        self.spell.targets.push(spec);
        self
    }

    /// Add a static ability (builder pattern).
    #[must_use]
    pub fn static_ability(mut self, ability: StaticAbility) -> Self {
        self.abilities.statics.push(ability);
        self
    }

    /// Add an activated ability (builder pattern).
    #[must_use]
    pub fn activated_ability(mut self, ability: ActivatedAbility) -> Self {
        self.abilities.activated.push(ability);
        self
    }

    /// Add a triggered ability (builder pattern).
    #[must_use]
    pub fn triggered_ability(mut self, ability: TriggeredAbility) -> Self {
        self.abilities.triggered.push(ability);
        self
    }

    /// Instantiate into a game object owned by `owner`.
    ///
    /// The casting-cost list starts with the mana cost (when there is
    /// one) followed by any extra costs.
    #[must_use]
    pub fn instantiate(&self, owner: PlayerId) -> GameObject {
        let base = BaseAttributes {
            name: self.name.clone(),
            mana_cost: self.mana_cost.clone(),
            power: self.power,
            toughness: self.toughness,
            loyalty: 0,
            card_types: self.card_types.iter().copied().collect(),
            super_types: self.super_types.iter().copied().collect(),
            sub_types: self.sub_types.iter().copied().collect(),
            owner,
        };
        let mut object = GameObject::card(base);
        if !self.mana_cost.is_empty() {
            object.costs.push(Cost::mana(self.mana_cost.clone()));
        }
        object.costs.extend(self.extra_costs.iter().cloned());
        object.spell = self.spell.clone();
        object.abilities = self.abilities.clone();
        object
    }
}

/// A basic land that taps for one symbol.
#[must_use]
pub fn basic_land(name: impl Into<String>, sub_type: SubType, produces: ManaSymbol) -> CardDefinition {
    CardDefinition::new(name)
        .card_type(CardType::Land)
        .super_type(SuperType::Basic)
        .sub_type(sub_type)
        .activated_ability(ActivatedAbility::mana(
            vec![Cost::tap_self()],
            vec![add_mana(produces)],
        ))
}

// === Stock effect closures ===

/// Add one mana of the given symbol to the controller's pool.
#[must_use]
pub fn add_mana(symbol: ManaSymbol) -> EffectFn {
    Arc::new(move |run: &mut EffectRun| {
        let Some(source) = run.source() else {
            return;
        };
        let Some(player) = run.state().controller_of(source) else {
            return;
        };
        run.push(Event::new(EventKind::AddMana {
            player,
            mana: symbol,
        }));
    })
}

/// The controller draws `count` cards.
#[must_use]
pub fn draw_cards(count: usize) -> EffectFn {
    Arc::new(move |run: &mut EffectRun| {
        let Some(source) = run.source() else {
            return;
        };
        let Some(player) = run.state().controller_of(source) else {
            return;
        };
        run.push(Event::draw_many(player, count));
    })
}

/// Deal `amount` damage to the first declared target.
#[must_use]
pub fn deal_damage(amount: i32) -> EffectFn {
    Arc::new(move |run: &mut EffectRun| {
        let Some(target) = run.target(0).and_then(DeclaredTarget::first) else {
            return;
        };
        run.push(Event::new(EventKind::DealDamage { target, amount }));
    })
}

/// The controller gains `amount` life.
#[must_use]
pub fn gain_life(amount: i32) -> EffectFn {
    Arc::new(move |run: &mut EffectRun| {
        let Some(source) = run.source() else {
            return;
        };
        let Some(player) = run.state().controller_of(source) else {
            return;
        };
        run.push(Event::new(EventKind::GainLife { player, amount }));
    })
}

/// Apply modifications to the first declared target until end of turn.
#[must_use]
pub fn modify_target_until_end_of_turn(modifications: Vec<Modification>) -> EffectFn {
    Arc::new(move |run: &mut EffectRun| {
        let Some(source) = run.source() else {
            return;
        };
        let Some(target) = run
            .target(0)
            .and_then(DeclaredTarget::first)
            .and_then(|t| t.object())
        else {
            return;
        };
        let turn = run.state().turn.turn_count;
        let mut effect = ContinuousEffect::new(source, Duration::EndOfTurn { turn });
        for modification in &modifications {
            effect = effect.with_modification(modification.clone().only_for(target));
        }
        run.push(Event::new(EventKind::AddContinuousEffect { effect }));
    })
}
