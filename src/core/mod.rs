//! Core engine types: identifiers, mana, game objects, RNG, errors.

pub mod error;
pub mod ids;
pub mod mana;
pub mod object;
pub mod rng;

pub use error::{ActionError, ZoneError};
pub use ids::{ObjectId, PlayerId, PlayerMap};
pub use mana::{Color, ManaCost, ManaPool, ManaSymbol};
pub use object::{
    AbilityObjectKind, AbilityPart, BaseAttributes, CardType, Characteristics, CounterStore,
    GameObject, PermanentStatus, SubType, SuperType,
};
pub use rng::{GameRng, GameRngState};
