//! Move generation
//!
//! Regular pieces step and jump diagonally forward; kings in all four
//! directions. Captures chain recursively and every maximal chain is a
//! separate move carrying the full list of captured pieces. A regular piece
//! that reaches its promotion row ends the chain there.

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::core::types::{PieceId, Position, Team, DIAGONALS};
use crate::piece::Roster;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub piece: PieceId,
    pub from: Position,
    /// Squares landed on in order; the last one is the destination
    pub path: Vec<Position>,
    /// Pieces jumped, in the order they are taken
    pub captured: Vec<PieceId>,
}

impl Move {
    pub fn to(&self) -> Position {
        self.path.last().copied().unwrap_or(self.from)
    }

    pub fn is_capture(&self) -> bool {
        !self.captured.is_empty()
    }

    /// The first jump of a capture chain as a move of its own
    pub fn first_jump(&self) -> Option<Move> {
        let landing = *self.path.first()?;
        let victim = *self.captured.first()?;
        Some(Move {
            piece: self.piece,
            from: self.from,
            path: vec![landing],
            captured: vec![victim],
        })
    }
}

fn directions(team: Team, is_king: bool) -> impl Iterator<Item = (i8, i8)> {
    let forward = team.forward();
    DIAGONALS
        .into_iter()
        .filter(move |(dr, _)| is_king || *dr == forward)
}

struct ChainSearch<'a> {
    board: &'a Board,
    roster: &'a Roster,
    team: Team,
    is_king: bool,
    origin: Position,
    chains: Vec<(Vec<Position>, Vec<PieceId>)>,
}

impl ChainSearch<'_> {
    fn landing_free(&self, pos: Position) -> bool {
        pos == self.origin || self.board.is_empty(pos)
    }

    fn extend(&mut self, current: Position, path: &mut Vec<Position>, captured: &mut Vec<PieceId>) {
        let mut extended = false;
        for (dr, dc) in directions(self.team, self.is_king) {
            let (Some(over), Some(land)) = (current.offset(dr, dc), current.offset(dr * 2, dc * 2)) else {
                continue;
            };
            let Some(victim) = self.board.get(over) else {
                continue;
            };
            // Jumped pieces stay on the board until the chain resolves
            if captured.contains(&victim) || !self.landing_free(land) {
                continue;
            }
            match self.roster.team_of(victim) {
                Some(team) if team != self.team => {}
                _ => continue,
            }

            extended = true;
            path.push(land);
            captured.push(victim);
            if !self.is_king && land.row == self.team.promotion_row() {
                self.chains.push((path.clone(), captured.clone()));
            } else {
                self.extend(land, path, captured);
            }
            path.pop();
            captured.pop();
        }

        if !extended && !captured.is_empty() {
            self.chains.push((path.clone(), captured.clone()));
        }
    }
}

/// Every move the piece could physically make, captures first
///
/// Ignores selection rules and the forced-capture filter.
pub fn piece_moves(board: &Board, roster: &Roster, id: PieceId) -> Vec<Move> {
    let Some(piece) = roster.get(id) else {
        return Vec::new();
    };
    let Some(from) = board.position_of(id) else {
        return Vec::new();
    };

    let mut search = ChainSearch {
        board,
        roster,
        team: piece.team,
        is_king: piece.is_king(),
        origin: from,
        chains: Vec::new(),
    };
    search.extend(from, &mut Vec::new(), &mut Vec::new());

    let mut moves: Vec<Move> = search
        .chains
        .into_iter()
        .map(|(path, captured)| Move {
            piece: id,
            from,
            path,
            captured,
        })
        .collect();

    for (dr, dc) in directions(piece.team, piece.is_king()) {
        if let Some(to) = from.offset(dr, dc) {
            if board.is_empty(to) {
                moves.push(Move {
                    piece: id,
                    from,
                    path: vec![to],
                    captured: Vec::new(),
                });
            }
        }
    }
    moves
}

/// Only captures available to the piece from where it stands
pub fn capture_moves(board: &Board, roster: &Roster, id: PieceId) -> Vec<Move> {
    let mut moves = piece_moves(board, roster, id);
    moves.retain(Move::is_capture);
    moves
}

/// Active pieces of `team` that may be selected this turn
///
/// Frozen pieces and pieces still waiting for empathy are left out.
pub fn movable_pieces(roster: &Roster, team: Team) -> Vec<PieceId> {
    roster
        .active(team)
        .filter(|p| p.check_selectable().is_ok())
        .map(|p| p.id)
        .collect()
}

/// The complete legal move set for a side
///
/// With `forced_capture`, any available capture removes every non-capture.
pub fn legal_moves_for_side(board: &Board, roster: &Roster, team: Team, forced_capture: bool) -> Vec<Move> {
    let mut moves: Vec<Move> = movable_pieces(roster, team)
        .into_iter()
        .flat_map(|id| piece_moves(board, roster, id))
        .collect();
    if forced_capture && moves.iter().any(Move::is_capture) {
        moves.retain(Move::is_capture);
    }
    moves
}

/// Legal moves for one piece, in the context of its whole side
pub fn legal_moves_for_piece(board: &Board, roster: &Roster, id: PieceId, forced_capture: bool) -> Vec<Move> {
    let Some(team) = roster.team_of(id) else {
        return Vec::new();
    };
    legal_moves_for_side(board, roster, team, forced_capture)
        .into_iter()
        .filter(|m| m.piece == id)
        .collect()
}
