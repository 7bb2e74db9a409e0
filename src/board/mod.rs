//! Board occupancy and move engine
//!
//! The grid is the authority for where pieces stand; `Piece::position` is a
//! cached view kept in step by `execute` and rebuilt by `integrity::repair`.

pub mod execute;
pub mod integrity;
pub mod moves;

pub use execute::{execute, MoveOutcome};
pub use integrity::Violation;
pub use moves::{legal_moves_for_piece, legal_moves_for_side, movable_pieces, Move};

use serde::{Deserialize, Serialize};

use crate::core::types::{PieceId, Position, BOARD_SIZE};

const N: usize = BOARD_SIZE as usize;

/// 8x8 occupancy grid
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Board {
    squares: [[Option<PieceId>; N]; N],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, pos: Position) -> Option<PieceId> {
        if !pos.in_bounds() {
            return None;
        }
        self.squares[pos.row as usize][pos.col as usize]
    }

    pub fn is_empty(&self, pos: Position) -> bool {
        pos.in_bounds() && self.get(pos).is_none()
    }

    /// Put a piece on a square, returning whatever was there
    pub fn place(&mut self, id: PieceId, pos: Position) -> Option<PieceId> {
        if !pos.in_bounds() {
            return None;
        }
        self.squares[pos.row as usize][pos.col as usize].replace(id)
    }

    pub fn remove(&mut self, pos: Position) -> Option<PieceId> {
        if !pos.in_bounds() {
            return None;
        }
        self.squares[pos.row as usize][pos.col as usize].take()
    }

    /// Every occupied square, row-major
    pub fn occupied(&self) -> impl Iterator<Item = (Position, PieceId)> + '_ {
        self.squares.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(c, cell)| cell.map(|id| (Position::new(r as u8, c as u8), id)))
        })
    }

    /// Linear scan; the board holds at most 24 pieces
    pub fn position_of(&self, id: PieceId) -> Option<Position> {
        self.occupied().find(|(_, occupant)| *occupant == id).map(|(pos, _)| pos)
    }

    pub fn piece_count(&self) -> usize {
        self.occupied().count()
    }

    pub fn clear(&mut self) {
        self.squares = [[None; N]; N];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_and_remove() {
        let mut board = Board::new();
        let pos = Position::new(5, 0);
        assert!(board.place(PieceId(1), pos).is_none());
        assert_eq!(board.get(pos), Some(PieceId(1)));
        assert_eq!(board.position_of(PieceId(1)), Some(pos));
        assert_eq!(board.remove(pos), Some(PieceId(1)));
        assert!(board.is_empty(pos));
    }

    #[test]
    fn test_out_of_bounds_is_not_empty() {
        let board = Board::new();
        assert!(!board.is_empty(Position::new(8, 1)));
        assert_eq!(board.get(Position::new(9, 9)), None);
    }

    #[test]
    fn test_occupied_row_major() {
        let mut board = Board::new();
        board.place(PieceId(2), Position::new(3, 2));
        board.place(PieceId(1), Position::new(0, 1));
        let ids: Vec<_> = board.occupied().map(|(_, id)| id).collect();
        assert_eq!(ids, vec![PieceId(1), PieceId(2)]);
    }
}
