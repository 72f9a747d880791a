//! # manastack
//!
//! A rules-accurate simulation engine for turn-based trading card games
//! with a shared board, priority passing, and a LIFO resolution stack.
//!
//! ## Design Principles
//!
//! 1. **Events are the only mutation path**: every state change is a
//!    reversible `Event` node in a parent/child tree. Failures unwind;
//!    successes scan for triggers.
//!
//! 2. **Continuous recomputation**: an object's current characteristics
//!    are rebuilt from base values plus all active modifications, in a
//!    fixed layer order, on every state check.
//!
//! 3. **No global engine**: all operations run against an explicit
//!    `Game`/`GameState` context.
//!
//! 4. **Blocking choices**: the engine suspends on exactly one
//!    outstanding `ChoiceRequest` at a time; decisions arrive from an
//!    in-process script or a channel-connected decision thread.
//!
//! ## Modules
//!
//! - `core`: identifiers, mana, game objects, RNG, errors
//! - `zones`: ordered membership-indexed containers and the zone set
//! - `effects`: modifications, the layer pipeline, continuous effects
//! - `abilities`: static/activated/triggered abilities and targeting
//! - `events`: the reversible event tree and costs
//! - `cards`: declarative card definitions
//! - `game`: state, turn/priority/stack machine, choices, trace

pub mod abilities;
pub mod cards;
pub mod core;
pub mod effects;
pub mod events;
pub mod game;
pub mod zones;

// Re-export commonly used types
pub use crate::core::{
    ActionError, BaseAttributes, CardType, Characteristics, Color, CounterStore, GameObject,
    GameRng, ManaCost, ManaPool, ManaSymbol, ObjectId, PermanentStatus, PlayerId, PlayerMap,
    SubType, SuperType, ZoneError,
};

pub use crate::zones::{Zone, ZoneId, ZoneSet};

pub use crate::effects::{
    ContinuousEffect, Duration, Layer, ModCondition, ModKind, Modification, Operation,
};

pub use crate::abilities::{
    AbilitySet, ActivatedAbility, ActivityCondition, DeclaredTarget, EffectFn, Resolution,
    StaticAbility, TargetPredicate, TargetRef, TargetSpec, TriggerCondition, TriggeredAbility,
};

pub use crate::events::{Cost, CostKind, Event, EventClass, EventKind, PendingTrigger};

pub use crate::cards::CardDefinition;

pub use crate::game::{
    ChannelSource, ChoiceItem, ChoiceReply, ChoiceRequest, DecisionSource, Game, GameState,
    ManaPaymentOption, PassiveSource, Phase, Player, PriorityAction, ScriptedSource, TraceBus,
    TraceEntry, Turn,
};
