//! Error taxonomy.
//!
//! Two classes of failure, handled differently:
//!
//! - **Illegal actions** (unpayable cost, undeclared target, bad zone
//!   move) are recoverable: the responsible event returns failure, its
//!   ancestors unwind, and the decision source is asked again. These are
//!   `Result` errors.
//! - **Invariant violations** (duplicate arena insert, re-entrant choice,
//!   already-pending trigger) indicate a defect in the engine or a
//!   collaborator misusing a boundary contract. These are panics.

use thiserror::Error;

/// Recoverable zone operation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ZoneError {
    /// The object is not a member of the zone.
    #[error("object is not in this zone")]
    NotPresent,
}

/// Recoverable action failures surfaced at the engine boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ActionError {
    /// An event's precondition failed; state is unchanged.
    #[error("the action's preconditions were not met")]
    IllegalState,
    /// A cost could not be paid; the action tree was unwound.
    #[error("a cost could not be paid")]
    CostNotPaid,
    /// A required target was not declared; the action tree was unwound.
    #[error("a target was not declared")]
    TargetNotDeclared,
    /// The player cancelled a choice the action depended on.
    #[error("the player cancelled the action")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(format!("{}", ZoneError::NotPresent), "object is not in this zone");
        assert_eq!(
            format!("{}", ActionError::CostNotPaid),
            "a cost could not be paid"
        );
    }
}
