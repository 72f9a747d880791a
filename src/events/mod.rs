//! Events: the reversible unit of game state change.
//!
//! Every mutation of the game goes through an `Event`. Applying an event
//! either succeeds (its own action committed, spawned children recorded
//! on the node) or fails with no partial effects: a composite that has
//! already applied some children unwinds them before reporting failure,
//! so callers can always re-obtain a choice and retry.
//!
//! Events form a tree. A node is revertible only if its own action is
//! revertible *and* every descendant is; `Event::revertible` is that
//! AND-fold. Reverting walks children in reverse order, then undoes the
//! node's own action.
//!
//! Cost events are special twice over: their source is bound only at
//! payment time (`Cost::set_source`), and they revert under the *forced*
//! policy — each child is asked to revert and irreversible subtrees are
//! left in place rather than blocking the whole unwind. That forced
//! policy is what produces the documented partial-revert behavior when a
//! payment is cancelled after an irreversible side effect.
//!
//! This module holds the event data model; application and revert logic
//! live on the `Game` controller.

use crate::abilities::{DeclaredTarget, Resolution};
use crate::core::{AbilityObjectKind, ManaCost, ManaSymbol, ObjectId, PlayerId};
use crate::effects::ContinuousEffect;
use crate::zones::ZoneId;

/// A payment obligation, bindable to a source at payment time.
#[derive(Clone, Debug)]
pub enum CostKind {
    /// Tap the source object.
    TapSelf,
    /// Pay mana symbols from the controller's pool.
    Mana(ManaCost),
}

/// A cost: kind plus the (late-bound) source it is paid by.
#[derive(Clone, Debug)]
pub struct Cost {
    pub kind: CostKind,
    pub source: Option<ObjectId>,
}

impl Cost {
    /// Tap-the-source cost.
    #[must_use]
    pub fn tap_self() -> Self {
        Self {
            kind: CostKind::TapSelf,
            source: None,
        }
    }

    /// Mana cost.
    #[must_use]
    pub fn mana(cost: ManaCost) -> Self {
        Self {
            kind: CostKind::Mana(cost),
            source: None,
        }
    }

    /// Bind the source this cost will be paid by.
    pub fn set_source(&mut self, source: ObjectId) {
        self.source = Some(source);
    }

    /// Side-effect-free affordability check.
    ///
    /// Mana costs always report payable: payment may activate mana
    /// abilities mid-stream, so affordability cannot be decided up
    /// front — you can always *try*.
    #[must_use]
    pub fn can_pay(&self, state: &crate::game::state::GameState, source: ObjectId) -> bool {
        match &self.kind {
            CostKind::TapSelf => {
                state.zones.is_in(source, ZoneId::Battlefield)
                    && state.object(source).is_some_and(|o| !o.status.tapped)
            }
            CostKind::Mana(_) => true,
        }
    }
}

/// Where a pending trigger's resolution comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerOrigin {
    /// The `index`-th triggered ability printed on the source object.
    Printed { index: usize },
    /// The `index`-th granted trigger of the `effect`-th continuous
    /// effect.
    Granted { effect: usize, index: usize },
}

/// A trigger detected but not yet converted to a stack object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingTrigger {
    pub source: ObjectId,
    pub origin: TriggerOrigin,
}

/// The closed set of event kinds.
#[derive(Clone)]
pub enum EventKind {
    // === Leaves ===
    Tap {
        object: ObjectId,
    },
    Untap {
        object: ObjectId,
    },
    AddMana {
        player: PlayerId,
        mana: ManaSymbol,
    },
    RemoveMana {
        player: PlayerId,
        mana: ManaSymbol,
    },
    MoveZone {
        object: ObjectId,
        from: ZoneId,
        to: ZoneId,
    },
    GainLife {
        player: PlayerId,
        amount: i32,
    },
    LoseLife {
        player: PlayerId,
        amount: i32,
    },
    MarkDamage {
        object: ObjectId,
        amount: i32,
    },
    DeclareTarget {
        holder: ObjectId,
        slot: usize,
    },
    PushPendingTrigger {
        trigger: PendingTrigger,
    },
    GenerateAbilityObject {
        kind: AbilityObjectKind,
        controller: PlayerId,
        resolution: Resolution,
    },
    AddContinuousEffect {
        effect: ContinuousEffect,
    },

    // === Composites ===
    Draw {
        player: PlayerId,
    },
    DrawMany {
        player: PlayerId,
        count: usize,
    },
    Discard {
        object: ObjectId,
    },
    DiscardMany {
        player: PlayerId,
        count: usize,
    },
    DealDamage {
        target: crate::abilities::TargetRef,
        amount: i32,
    },
    PlayLand,
    CastSpell,
    ActivateAbility {
        index: usize,
    },
    StackTriggeredAbility {
        controller: PlayerId,
        resolution: Resolution,
    },
    PayCost {
        cost: Cost,
    },
    PayManaSymbol {
        player: PlayerId,
        symbol: ManaSymbol,
    },
    ResolveEffect {
        resolution: Resolution,
        targets: Vec<DeclaredTarget>,
    },
}

/// Runtime classification of events, used to key trigger registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventClass {
    Tap,
    Untap,
    AddMana,
    RemoveMana,
    MoveZone,
    GainLife,
    LoseLife,
    MarkDamage,
    DeclareTarget,
    PushPendingTrigger,
    GenerateAbilityObject,
    AddContinuousEffect,
    Draw,
    DrawMany,
    Discard,
    DiscardMany,
    DealDamage,
    PlayLand,
    CastSpell,
    ActivateAbility,
    StackTriggeredAbility,
    PayCost,
    PayManaSymbol,
    ResolveEffect,
}

impl EventKind {
    /// The runtime class of this event.
    #[must_use]
    pub fn class(&self) -> EventClass {
        match self {
            EventKind::Tap { .. } => EventClass::Tap,
            EventKind::Untap { .. } => EventClass::Untap,
            EventKind::AddMana { .. } => EventClass::AddMana,
            EventKind::RemoveMana { .. } => EventClass::RemoveMana,
            EventKind::MoveZone { .. } => EventClass::MoveZone,
            EventKind::GainLife { .. } => EventClass::GainLife,
            EventKind::LoseLife { .. } => EventClass::LoseLife,
            EventKind::MarkDamage { .. } => EventClass::MarkDamage,
            EventKind::DeclareTarget { .. } => EventClass::DeclareTarget,
            EventKind::PushPendingTrigger { .. } => EventClass::PushPendingTrigger,
            EventKind::GenerateAbilityObject { .. } => EventClass::GenerateAbilityObject,
            EventKind::AddContinuousEffect { .. } => EventClass::AddContinuousEffect,
            EventKind::Draw { .. } => EventClass::Draw,
            EventKind::DrawMany { .. } => EventClass::DrawMany,
            EventKind::Discard { .. } => EventClass::Discard,
            EventKind::DiscardMany { .. } => EventClass::DiscardMany,
            EventKind::DealDamage { .. } => EventClass::DealDamage,
            EventKind::PlayLand => EventClass::PlayLand,
            EventKind::CastSpell => EventClass::CastSpell,
            EventKind::ActivateAbility { .. } => EventClass::ActivateAbility,
            EventKind::StackTriggeredAbility { .. } => EventClass::StackTriggeredAbility,
            EventKind::PayCost { .. } => EventClass::PayCost,
            EventKind::PayManaSymbol { .. } => EventClass::PayManaSymbol,
            EventKind::ResolveEffect { .. } => EventClass::ResolveEffect,
        }
    }

    /// Short name for tracing.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Tap { .. } => "Tap",
            EventKind::Untap { .. } => "Untap",
            EventKind::AddMana { .. } => "AddMana",
            EventKind::RemoveMana { .. } => "RemoveMana",
            EventKind::MoveZone { .. } => "MoveZone",
            EventKind::GainLife { .. } => "GainLife",
            EventKind::LoseLife { .. } => "LoseLife",
            EventKind::MarkDamage { .. } => "MarkDamage",
            EventKind::DeclareTarget { .. } => "DeclareTarget",
            EventKind::PushPendingTrigger { .. } => "PushPendingTrigger",
            EventKind::GenerateAbilityObject { .. } => "GenerateAbilityObject",
            EventKind::AddContinuousEffect { .. } => "AddContinuousEffect",
            EventKind::Draw { .. } => "Draw",
            EventKind::DrawMany { .. } => "DrawMany",
            EventKind::Discard { .. } => "Discard",
            EventKind::DiscardMany { .. } => "DiscardMany",
            EventKind::DealDamage { .. } => "DealDamage",
            EventKind::PlayLand => "PlayLand",
            EventKind::CastSpell => "CastSpell",
            EventKind::ActivateAbility { .. } => "ActivateAbility",
            EventKind::StackTriggeredAbility { .. } => "StackTriggeredAbility",
            EventKind::PayCost { .. } => "PayCost",
            EventKind::PayManaSymbol { .. } => "PayManaSymbol",
            EventKind::ResolveEffect { .. } => "ResolveEffect",
        }
    }
}

/// Undo payload recorded by a successful apply, when the kind alone is
/// not enough to reverse the action.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum Undo {
    #[default]
    None,
    /// The zone move actually happened.
    Moved,
    /// The zone move was silently denied (non-permanent into the
    /// battlefield); nothing to undo.
    MoveDenied,
    /// An object was created in the arena.
    Created(ObjectId),
    /// A target slot was filled.
    Declared,
    /// A continuous effect was appended at this index.
    EffectAdded(usize),
}

/// How a node unwinds its subtree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevertPolicy {
    /// Revert only if the whole subtree is revertible; otherwise refuse
    /// and leave state as-is.
    Strict,
    /// Best effort: ask every child to revert, tolerate refusals. Used
    /// by cost payments.
    Forced,
}

/// One node of the event tree.
pub struct Event {
    pub kind: EventKind,
    /// The object on whose behalf this event runs, if any.
    pub source: Option<ObjectId>,
    /// Children spawned by a successful apply, in application order.
    pub children: Vec<Event>,
    pub(crate) undo: Undo,
}

impl Event {
    /// Create an event with no source.
    #[must_use]
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            source: None,
            children: Vec::new(),
            undo: Undo::default(),
        }
    }

    /// Set the source object (builder pattern).
    #[must_use]
    pub fn with_source(mut self, source: ObjectId) -> Self {
        self.source = Some(source);
        self
    }

    /// Tap an object.
    #[must_use]
    pub fn tap(object: ObjectId) -> Self {
        Self::new(EventKind::Tap { object })
    }

    /// Untap an object.
    #[must_use]
    pub fn untap(object: ObjectId) -> Self {
        Self::new(EventKind::Untap { object })
    }

    /// Move an object between zones.
    #[must_use]
    pub fn move_zone(object: ObjectId, from: ZoneId, to: ZoneId) -> Self {
        Self::new(EventKind::MoveZone { object, from, to })
    }

    /// Draw one card.
    #[must_use]
    pub fn draw(player: PlayerId) -> Self {
        Self::new(EventKind::Draw { player })
    }

    /// Draw several cards.
    #[must_use]
    pub fn draw_many(player: PlayerId, count: usize) -> Self {
        Self::new(EventKind::DrawMany { player, count })
    }

    /// Cast a spell from wherever it currently is.
    #[must_use]
    pub fn cast_spell(card: ObjectId) -> Self {
        Self::new(EventKind::CastSpell).with_source(card)
    }

    /// Activate the `index`-th activated ability of an object.
    #[must_use]
    pub fn activate_ability(object: ObjectId, index: usize) -> Self {
        Self::new(EventKind::ActivateAbility { index }).with_source(object)
    }

    /// Play a land.
    #[must_use]
    pub fn play_land(land: ObjectId) -> Self {
        Self::new(EventKind::PlayLand).with_source(land)
    }

    /// Is this node's own action revertible (children not considered)?
    #[must_use]
    pub fn self_revertible(&self) -> bool {
        match &self.kind {
            // Damage is observable the moment it lands.
            EventKind::DealDamage { .. } | EventKind::MarkDamage { .. } => false,
            // Moves through a hidden zone cannot be taken back.
            EventKind::MoveZone { from, to, .. } => {
                if self.undo == Undo::MoveDenied {
                    return true;
                }
                !from.is_hidden() && !to.is_hidden()
            }
            _ => true,
        }
    }

    /// Is the whole subtree revertible?
    #[must_use]
    pub fn revertible(&self) -> bool {
        self.self_revertible() && self.children.iter().all(Event::revertible)
    }

    /// How this node unwinds.
    #[must_use]
    pub fn revert_policy(&self) -> RevertPolicy {
        match &self.kind {
            EventKind::PayCost { .. } | EventKind::PayManaSymbol { .. } => RevertPolicy::Forced,
            _ => RevertPolicy::Strict,
        }
    }
}
