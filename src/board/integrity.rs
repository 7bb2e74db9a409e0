//! Board/roster consistency checks
//!
//! Violations are bugs. The normal move path asserts in debug builds; restore
//! and release builds rebuild cached positions from the board instead.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::warn;

use crate::board::Board;
use crate::core::types::{PieceId, Position};
use crate::piece::Roster;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "violation", rename_all = "snake_case")]
pub enum Violation {
    /// Cached position disagrees with the board
    PositionMismatch {
        piece: PieceId,
        board: Option<Position>,
        cached: Option<Position>,
    },
    /// A captured piece still occupies a square
    CapturedOnBoard { piece: PieceId, square: Position },
    /// A square holds an id the roster does not know
    UnknownOccupant { piece: PieceId, square: Position },
    /// The same piece appears on more than one square
    DuplicateOccupant { piece: PieceId, square: Position },
    /// A piece sits on a light square
    LightSquare { piece: PieceId, square: Position },
}

pub fn check(board: &Board, roster: &Roster) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut seen = BTreeSet::new();

    for (square, id) in board.occupied() {
        if !seen.insert(id) {
            violations.push(Violation::DuplicateOccupant { piece: id, square });
            continue;
        }
        match roster.get(id) {
            None => violations.push(Violation::UnknownOccupant { piece: id, square }),
            Some(p) if p.captured => violations.push(Violation::CapturedOnBoard { piece: id, square }),
            Some(_) if !square.is_dark() => violations.push(Violation::LightSquare { piece: id, square }),
            Some(_) => {}
        }
    }

    for piece in roster.iter() {
        let on_board = board.position_of(piece.id);
        if on_board != piece.position && !(piece.captured && piece.position.is_none()) {
            violations.push(Violation::PositionMismatch {
                piece: piece.id,
                board: on_board,
                cached: piece.position,
            });
        }
    }
    violations
}

/// Rebuild consistency with the board as the authority
///
/// Captured flags win over stray occupancy; pieces missing from the board
/// are treated as captured.
pub fn repair(board: &mut Board, roster: &mut Roster) -> Vec<Violation> {
    let violations = check(board, roster);
    if violations.is_empty() {
        return violations;
    }
    warn!(count = violations.len(), "Repairing board integrity");

    let mut seen = BTreeSet::new();
    let squares: Vec<_> = board.occupied().collect();
    for (square, id) in squares {
        let keep = seen.insert(id)
            && square.is_dark()
            && roster.get(id).map(|p| !p.captured).unwrap_or(false);
        if !keep {
            board.remove(square);
        }
    }

    for piece in roster.iter_mut() {
        piece.position = board.position_of(piece.id);
        if piece.position.is_none() {
            piece.captured = true;
        }
    }
    violations
}

/// Debug-assert on the live path, repair in release
pub fn verify(board: &mut Board, roster: &mut Roster) {
    let violations = check(board, roster);
    debug_assert!(violations.is_empty(), "board integrity violated: {:?}", violations);
    if !violations.is_empty() {
        repair(board, roster);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::moves::tests::layout;
    use crate::core::types::Team;

    #[test]
    fn test_consistent_layout_passes() {
        let (board, roster) = layout(&[(1, Team::Player, 5, 0, false), (2, Team::Opponent, 2, 1, false)]);
        assert!(check(&board, &roster).is_empty());
    }

    #[test]
    fn test_stale_cache_repaired_from_board() {
        let (mut board, mut roster) = layout(&[(1, Team::Player, 5, 0, false)]);
        roster.get_mut(PieceId(1)).unwrap().position = Some(Position::new(4, 1));
        let found = repair(&mut board, &mut roster);
        assert_eq!(found.len(), 1);
        assert_eq!(roster.get(PieceId(1)).unwrap().position, Some(Position::new(5, 0)));
        assert!(check(&board, &roster).is_empty());
    }

    #[test]
    fn test_duplicate_occupant_removed() {
        let (mut board, mut roster) = layout(&[(1, Team::Player, 5, 0, false)]);
        board.place(PieceId(1), Position::new(5, 2));
        assert!(matches!(
            check(&board, &roster).as_slice(),
            [Violation::DuplicateOccupant { .. }, ..]
        ));
        repair(&mut board, &mut roster);
        assert_eq!(board.piece_count(), 1);
        assert!(check(&board, &roster).is_empty());
    }

    #[test]
    fn test_captured_piece_cleared_from_board() {
        let (mut board, mut roster) = layout(&[(1, Team::Player, 5, 0, false)]);
        roster.get_mut(PieceId(1)).unwrap().captured = true;
        repair(&mut board, &mut roster);
        assert_eq!(board.piece_count(), 0);
        assert_eq!(roster.get(PieceId(1)).unwrap().position, None);
    }
}
