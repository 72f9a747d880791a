//! Continuous effects: duration-scoped modification bundles.
//!
//! A continuous effect contributes its modifications (and any triggered
//! abilities it grants) to every recomputation pass while `is_active`
//! holds. Inactive effects are filtered out at collection time rather
//! than deleted, so an effect whose duration condition becomes true
//! again resumes applying.

use serde::{Deserialize, Serialize};

use crate::abilities::TriggeredAbility;
use crate::core::{ObjectId, PlayerId};
use crate::game::state::GameState;
use crate::game::turn::Phase;
use crate::zones::ZoneId;

use super::modification::Modification;

/// How long a continuous effect lasts. Duration-specific data lives in
/// the variant, so an effect cannot be built with missing data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Duration {
    /// Until the end of the given turn.
    EndOfTurn { turn: u32 },
    /// Until the end of the given phase of the given turn.
    EndOfPhase { turn: u32, phase: Phase },
    /// While an object remains in a zone.
    ObjectInZone { object: ObjectId, zone: ZoneId },
    /// While an object remains tapped.
    ObjectTapped { object: ObjectId },
    /// While an object is controlled by a player.
    ObjectControlledBy { object: ObjectId, player: PlayerId },
    /// Forever.
    Infinite,
}

/// A duration-scoped bundle of modifications and granted triggers.
#[derive(Clone)]
pub struct ContinuousEffect {
    /// The object whose resolution created this effect.
    pub source: ObjectId,
    pub duration: Duration,
    pub modifications: Vec<Modification>,
    /// Triggered abilities active while this effect is.
    pub granted_triggers: Vec<TriggeredAbility>,
}

impl ContinuousEffect {
    /// Create an effect with no modifications yet.
    #[must_use]
    pub fn new(source: ObjectId, duration: Duration) -> Self {
        Self {
            source,
            duration,
            modifications: Vec::new(),
            granted_triggers: Vec::new(),
        }
    }

    /// Add a modification (builder pattern).
    #[must_use]
    pub fn with_modification(mut self, modification: Modification) -> Self {
        self.modifications.push(modification);
        self
    }

    /// Grant a triggered ability (builder pattern).
    #[must_use]
    pub fn with_trigger(mut self, trigger: TriggeredAbility) -> Self {
        self.granted_triggers.push(trigger);
        self
    }

    /// Is the effect contributing to recomputation right now?
    #[must_use]
    pub fn is_active(&self, state: &GameState) -> bool {
        match &self.duration {
            Duration::EndOfTurn { turn } => state.turn.turn_count <= *turn,
            Duration::EndOfPhase { turn, phase } => {
                if state.turn.turn_count > *turn {
                    return false;
                }
                state.turn.turn_count < *turn || state.turn.phase <= *phase
            }
            Duration::ObjectInZone { object, zone } => state.zones.is_in(*object, *zone),
            Duration::ObjectTapped { object } => state
                .object(*object)
                .is_some_and(|o| o.status.tapped),
            Duration::ObjectControlledBy { object, player } => state
                .object(*object)
                .is_some_and(|o| o.controller() == *player),
            Duration::Infinite => true,
        }
    }
}
