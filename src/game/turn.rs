//! The turn structure: phases, active player, priority.

use serde::{Deserialize, Serialize};

use crate::core::PlayerId;

/// The phases of a turn, in cycle order.
///
/// `Untap` and `Cleanup` never give priority; the two main phases are
/// the only sorcery-speed windows.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Phase {
    Untap,
    Upkeep,
    Draw,
    Main1,
    CombatStart,
    CombatAttackers,
    CombatBlockers,
    CombatDamage,
    CombatEnd,
    Main2,
    End,
    Cleanup,
}

impl Phase {
    pub const FIRST: Phase = Phase::Untap;
    pub const LAST: Phase = Phase::Cleanup;

    /// The next phase in the cycle (wrapping from Cleanup to Untap).
    #[must_use]
    pub fn next(self) -> Phase {
        match self {
            Phase::Untap => Phase::Upkeep,
            Phase::Upkeep => Phase::Draw,
            Phase::Draw => Phase::Main1,
            Phase::Main1 => Phase::CombatStart,
            Phase::CombatStart => Phase::CombatAttackers,
            Phase::CombatAttackers => Phase::CombatBlockers,
            Phase::CombatBlockers => Phase::CombatDamage,
            Phase::CombatDamage => Phase::CombatEnd,
            Phase::CombatEnd => Phase::Main2,
            Phase::Main2 => Phase::End,
            Phase::End => Phase::Cleanup,
            Phase::Cleanup => Phase::Untap,
        }
    }

    /// Does this phase open priority windows?
    #[must_use]
    pub fn gives_priority(self) -> bool {
        !matches!(self, Phase::Untap | Phase::Cleanup)
    }

    /// Is this a main phase?
    #[must_use]
    pub fn is_main(self) -> bool {
        matches!(self, Phase::Main1 | Phase::Main2)
    }
}

/// Turn counters: whose turn, who holds priority, which phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Counts player turns (not full table rounds), starting at 0.
    pub turn_count: u32,
    pub active_player: PlayerId,
    pub priority_player: PlayerId,
    pub phase: Phase,
}

impl Turn {
    /// Turn zero, player 0 active and holding priority, first phase.
    #[must_use]
    pub fn new() -> Self {
        Self {
            turn_count: 0,
            active_player: PlayerId::new(0),
            priority_player: PlayerId::new(0),
            phase: Phase::FIRST,
        }
    }

    /// Hand priority back to the active player.
    pub fn reset_priority(&mut self) {
        self.priority_player = self.active_player;
    }

    /// Pass priority to the next player in seat order.
    pub fn advance_priority(&mut self, player_count: usize) {
        self.priority_player = self.priority_player.next(player_count);
    }

    /// Move to the next phase. Returns true when the cycle wrapped
    /// (the turn is over). Does not advance the turn itself.
    pub fn advance_phase(&mut self) -> bool {
        let wrapped = self.phase == Phase::LAST;
        self.phase = self.phase.next();
        wrapped
    }

    /// Advance to the next player's turn. Returns true when the table
    /// wrapped back to player 0.
    pub fn advance_turn(&mut self, player_count: usize) -> bool {
        self.turn_count += 1;
        self.active_player = self.active_player.next(player_count);
        self.active_player == PlayerId::new(0)
    }
}

impl Default for Turn {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_cycle() {
        let mut phase = Phase::FIRST;
        let mut seen = 1;
        while phase != Phase::LAST {
            phase = phase.next();
            seen += 1;
        }
        assert_eq!(seen, 12);
        assert_eq!(Phase::LAST.next(), Phase::FIRST);
    }

    #[test]
    fn test_priority_phases() {
        assert!(!Phase::Untap.gives_priority());
        assert!(!Phase::Cleanup.gives_priority());
        assert!(Phase::Upkeep.gives_priority());
        assert!(Phase::Main1.gives_priority());
    }

    #[test]
    fn test_main_phases() {
        assert!(Phase::Main1.is_main());
        assert!(Phase::Main2.is_main());
        assert!(!Phase::CombatDamage.is_main());
    }

    #[test]
    fn test_phase_ordering() {
        assert!(Phase::Untap < Phase::Main1);
        assert!(Phase::Main1 < Phase::Cleanup);
    }

    #[test]
    fn test_turn_advancement() {
        let mut turn = Turn::new();

        assert!(!turn.advance_turn(2));
        assert_eq!(turn.turn_count, 1);
        assert_eq!(turn.active_player, PlayerId::new(1));

        assert!(turn.advance_turn(2));
        assert_eq!(turn.active_player, PlayerId::new(0));
    }

    #[test]
    fn test_phase_advancement_wraps() {
        let mut turn = Turn::new();
        turn.phase = Phase::Cleanup;

        assert!(turn.advance_phase());
        assert_eq!(turn.phase, Phase::Untap);

        assert!(!turn.advance_phase());
        assert_eq!(turn.phase, Phase::Upkeep);
    }

    #[test]
    fn test_priority_reset() {
        let mut turn = Turn::new();
        turn.active_player = PlayerId::new(1);
        turn.priority_player = PlayerId::new(0);

        turn.reset_priority();
        assert_eq!(turn.priority_player, PlayerId::new(1));
    }
}
