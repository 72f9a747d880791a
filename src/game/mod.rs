//! The game controller: state, turn machine, choices, trace, engine.

pub mod choice;
pub mod engine;
pub mod state;
pub mod trace;
pub mod turn;

pub use choice::{
    ChannelSource, ChoiceItem, ChoiceReply, ChoiceRequest, DecisionEndpoint, DecisionSource,
    ManaPaymentOption, PassiveSource, PriorityAction, ScriptedSource,
};
pub use engine::{EffectRun, Game};
pub use state::{GameState, Player};
pub use trace::{TraceBus, TraceEntry};
pub use turn::{Phase, Turn};
