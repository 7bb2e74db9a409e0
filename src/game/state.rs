//! Match state
//!
//! Everything a match needs to resume lives here, including the config and
//! the team storm weights, so a snapshot is self-contained. Morale is derived
//! on demand and never stored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::board::moves::piece_moves;
use crate::board::{Board, Move};
use crate::content::TeamDefinition;
use crate::core::config::SimulationConfig;
use crate::core::error::{GameError, Result};
use crate::core::types::{MatchId, PieceId, Position, Team, Turn};
use crate::empathy::EmpathySystem;
use crate::piece::{Piece, Roster};
use crate::storm::{RoundSignals, StormSystem, StormType};

/// Rows each side starts on
const PLAYER_ROWS: [u8; 3] = [7, 6, 5];
const OPPONENT_ROWS: [u8; 3] = [0, 1, 2];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinReason {
    /// The losing side has no pieces left on the board
    NoPieces,
    /// The losing side cannot make any move at all
    NoMoves,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum MatchOutcome {
    Winner { team: Team, reason: WinReason },
    /// Turn limit reached
    Draw,
}

/// A capture chain in progress: the same piece must keep jumping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingChain {
    pub piece: PieceId,
    /// Square the chain started from
    pub from: Position,
    /// Jumps already taken
    pub steps: usize,
    /// Full chains from the original square still consistent with the steps taken
    pub remaining: Vec<Move>,
}

/// Derived team mood
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Morale {
    pub average_trust: f32,
    pub regulated_ratio: f32,
    pub pieces: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub match_id: MatchId,
    pub turn: Turn,
    pub side_to_move: Team,
    pub board: Board,
    pub roster: Roster,
    /// Captured pieces in capture order
    pub captured: Vec<PieceId>,
    pub storm: StormSystem,
    pub empathy: EmpathySystem,
    pub pending_chain: Option<PendingChain>,
    pub outcome: Option<MatchOutcome>,
    pub config: SimulationConfig,
    /// Storm flavour of the player team, used for unprompted storms
    pub storm_weights: BTreeMap<StormType, f32>,
    /// What happened this round, consumed by the storm trigger check
    pub signals: RoundSignals,
    pub team_names: BTreeMap<Team, String>,
}

fn starting_squares(rows: &[u8]) -> Vec<Position> {
    let mut squares = Vec::new();
    for &row in rows {
        squares.extend(Position::all_dark().filter(|p| p.row == row));
    }
    squares
}

impl GameState {
    /// An empty board with no pieces
    pub fn empty(config: SimulationConfig) -> Self {
        Self {
            match_id: MatchId::new(),
            turn: 1,
            side_to_move: Team::Player,
            board: Board::new(),
            roster: Roster::new(),
            captured: Vec::new(),
            storm: StormSystem::new(),
            empathy: EmpathySystem::new(),
            pending_chain: None,
            outcome: None,
            config,
            storm_weights: BTreeMap::new(),
            signals: RoundSignals::default(),
            team_names: BTreeMap::new(),
        }
    }

    /// Lay out both teams on their starting rows
    pub fn setup(player: &TeamDefinition, opponent: &TeamDefinition, config: SimulationConfig) -> Result<Self> {
        config.validate().map_err(GameError::Config)?;
        player.validate()?;
        opponent.validate()?;

        let mut state = Self::empty(config);
        state.storm_weights = player.storm_weights.clone();
        state.team_names.insert(Team::Player, player.name.clone());
        state.team_names.insert(Team::Opponent, opponent.name.clone());

        let mut next_id = 1;
        for (team, def, rows) in [
            (Team::Player, player, &PLAYER_ROWS),
            (Team::Opponent, opponent, &OPPONENT_ROWS),
        ] {
            for (piece_def, square) in def.pieces.iter().zip(starting_squares(rows)) {
                let personality = def.personality_for(piece_def)?;
                let mut piece = Piece::new(
                    PieceId(next_id),
                    piece_def.name.clone(),
                    team,
                    personality,
                    def.starting_trust,
                    state.config.memory_capacity,
                );
                next_id += 1;
                piece.position = Some(square);
                state.board.place(piece.id, square);
                state.roster.insert(piece);
            }
        }

        info!(
            match_id = %state.match_id.0,
            player = %player.name,
            opponent = %opponent.name,
            pieces = state.roster.len(),
            "Match set up"
        );
        Ok(state)
    }

    /// Place a piece by hand; used for custom positions and tests
    pub fn add_piece(&mut self, mut piece: Piece, square: Position) -> Result<()> {
        if !square.is_dark() || !self.board.is_empty(square) {
            return Err(GameError::Content(format!("square {:?} is not a free dark square", square)));
        }
        piece.position = Some(square);
        piece.captured = false;
        self.board.place(piece.id, square);
        self.roster.insert(piece);
        Ok(())
    }

    pub fn piece(&self, id: PieceId) -> Result<&Piece> {
        self.roster.get(id).ok_or(GameError::PieceNotFound(id))
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Average trust and regulated share over a side's active pieces
    pub fn morale(&self, team: Team) -> Morale {
        let pieces: Vec<&Piece> = self.roster.active(team).collect();
        if pieces.is_empty() {
            return Morale {
                average_trust: 0.0,
                regulated_ratio: 0.0,
                pieces: 0,
            };
        }
        let n = pieces.len() as f32;
        Morale {
            average_trust: pieces.iter().map(|p| p.trust.value()).sum::<f32>() / n,
            regulated_ratio: pieces.iter().filter(|p| p.is_regulated()).count() as f32 / n,
            pieces: pieces.len(),
        }
    }

    /// Whether any piece of `team` could physically move, ignoring emotional blocks
    pub fn has_any_move(&self, team: Team) -> bool {
        self.roster
            .active(team)
            .any(|p| !piece_moves(&self.board, &self.roster, p.id).is_empty())
    }

    /// Win/loss check for the side about to move
    pub fn evaluate_outcome(&self) -> Option<MatchOutcome> {
        for team in [Team::Player, Team::Opponent] {
            if self.roster.count_active(team) == 0 {
                return Some(MatchOutcome::Winner {
                    team: team.opposite(),
                    reason: WinReason::NoPieces,
                });
            }
        }
        if !self.has_any_move(self.side_to_move) {
            return Some(MatchOutcome::Winner {
                team: self.side_to_move.opposite(),
                reason: WinReason::NoMoves,
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::TeamRegistry;

    fn standard() -> GameState {
        let registry = TeamRegistry::with_builtins().unwrap();
        GameState::setup(
            registry.get("hearthside").unwrap(),
            registry.get("ironclad").unwrap(),
            SimulationConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_setup_places_both_sides() {
        let state = standard();
        assert_eq!(state.roster.count_active(Team::Player), 12);
        assert_eq!(state.roster.count_active(Team::Opponent), 12);
        assert_eq!(state.board.piece_count(), 24);
        for piece in state.roster.iter() {
            let pos = piece.position.unwrap();
            assert!(pos.is_dark());
            match piece.team {
                Team::Player => assert!(pos.row >= 5),
                Team::Opponent => assert!(pos.row <= 2),
            }
        }
        assert!(crate::board::integrity::check(&state.board, &state.roster).is_empty());
    }

    #[test]
    fn test_setup_uses_team_trust() {
        let state = standard();
        assert!(state.roster.active(Team::Opponent).all(|p| p.trust.value() == 4.0));
        assert!(state.roster.active(Team::Player).all(|p| p.trust.value() == 5.0));
    }

    #[test]
    fn test_morale_is_derived() {
        let mut state = standard();
        let before = state.morale(Team::Player);
        assert_eq!(before.regulated_ratio, 1.0);
        let id = state.roster.active_ids(Team::Player)[0];
        state.roster.get_mut(id).unwrap().adjust_trust(-5.0, 1);
        let after = state.morale(Team::Player);
        assert!(after.average_trust < before.average_trust);
    }

    #[test]
    fn test_outcome_when_a_side_is_empty() {
        let mut state = GameState::empty(SimulationConfig::default());
        let piece = Piece::new(PieceId(1), "Ada", Team::Player, Default::default(), 5.0, 20);
        state.add_piece(piece, Position::new(5, 0)).unwrap();
        assert_eq!(
            state.evaluate_outcome(),
            Some(MatchOutcome::Winner {
                team: Team::Player,
                reason: WinReason::NoPieces
            })
        );
    }
}
