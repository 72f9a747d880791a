//! Continuous effects and the characteristic recomputation pipeline.

pub mod continuous;
pub mod layers;
pub mod modification;

pub use continuous::{ContinuousEffect, Duration};
pub use layers::recompute;
pub use modification::{Layer, ModCondition, ModKind, Modification, Operation};
