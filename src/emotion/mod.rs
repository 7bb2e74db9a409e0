//! Emotional engine
//!
//! Per-round upkeep runs in a fixed order driven by the match orchestrator:
//! bonding -> trust decay -> random dysregulation -> contagion -> storm tick
//! -> natural recovery -> breakthroughs -> trauma processing -> defection.
//! Only player pieces that have not defected take part.

pub mod bonding;
pub mod breakthrough;
pub mod contagion;
pub mod defection;
pub mod dysregulation;
pub mod recovery;
pub mod trauma;

use std::collections::BTreeSet;

use crate::board::Board;
use crate::core::config::SimulationConfig;
use crate::core::rng::GameRng;
use crate::core::types::{PieceId, Position, Team, Turn};
use crate::game::events::EventLog;
use crate::piece::Roster;

/// Shared context for one resolution pass
pub struct RoundContext<'a> {
    pub turn: Turn,
    pub config: &'a SimulationConfig,
    pub rng: &'a mut dyn GameRng,
    pub events: &'a mut EventLog,
    /// Pieces whose state already changed during this pass
    pub changed: BTreeSet<PieceId>,
}

impl<'a> RoundContext<'a> {
    pub fn new(
        turn: Turn,
        config: &'a SimulationConfig,
        rng: &'a mut dyn GameRng,
        events: &'a mut EventLog,
    ) -> Self {
        Self {
            turn,
            config,
            rng,
            events,
            changed: BTreeSet::new(),
        }
    }
}

/// Active pieces of `team` on the diagonal squares around `pos`
pub fn adjacent_teammates(board: &Board, roster: &Roster, pos: Position, team: Team) -> Vec<PieceId> {
    pos.diagonal_neighbors()
        .filter_map(|n| board.get(n))
        .filter(|id| {
            roster
                .get(*id)
                .map(|p| p.team == team && p.is_active())
                .unwrap_or(false)
        })
        .collect()
}

/// Ids of every piece taking part in the emotional simulation
pub fn emotional_ids(roster: &Roster) -> Vec<PieceId> {
    roster.iter().filter(|p| p.is_emotional()).map(|p| p.id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::moves::tests::layout;

    #[test]
    fn test_adjacent_teammates_only_same_team() {
        let (board, roster) = layout(&[
            (1, Team::Player, 5, 2, false),
            (2, Team::Player, 4, 1, false),
            (3, Team::Opponent, 4, 3, false),
            (4, Team::Player, 7, 2, false),
        ]);
        let adj = adjacent_teammates(&board, &roster, Position::new(5, 2), Team::Player);
        assert_eq!(adj, vec![PieceId(2)]);
    }
}
