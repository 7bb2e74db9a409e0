//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Board dimension (8x8 checkers board)
pub const BOARD_SIZE: u8 = 8;

/// Unique identifier for pieces
///
/// Stable for the whole match: defection reassigns the team, never the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PieceId(pub u32);

impl std::fmt::Display for PieceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier for a single match instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchId(pub Uuid);

impl MatchId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MatchId {
    fn default() -> Self {
        Self::new()
    }
}

/// Turn counter (one turn = player move + opponent move)
pub type Turn = u32;

/// Side of the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    Player,
    Opponent,
}

impl Team {
    pub fn opposite(&self) -> Team {
        match self {
            Team::Player => Team::Opponent,
            Team::Opponent => Team::Player,
        }
    }

    /// Row direction this side advances in
    pub fn forward(&self) -> i8 {
        match self {
            Team::Player => -1,
            Team::Opponent => 1,
        }
    }

    /// Farthest row for this side (promotion row)
    pub fn promotion_row(&self) -> u8 {
        match self {
            Team::Player => 0,
            Team::Opponent => BOARD_SIZE - 1,
        }
    }

    /// Row this side starts nearest to
    pub fn home_row(&self) -> u8 {
        self.opposite().promotion_row()
    }
}

/// A square on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    pub fn in_bounds(&self) -> bool {
        self.row < BOARD_SIZE && self.col < BOARD_SIZE
    }

    /// Playable squares follow the dark-square convention
    pub fn is_dark(&self) -> bool {
        (self.row + self.col) % 2 == 1
    }

    pub fn offset(&self, dr: i8, dc: i8) -> Option<Position> {
        let row = self.row as i8 + dr;
        let col = self.col as i8 + dc;
        if (0..BOARD_SIZE as i8).contains(&row) && (0..BOARD_SIZE as i8).contains(&col) {
            Some(Position::new(row as u8, col as u8))
        } else {
            None
        }
    }

    /// The four diagonal neighbours that exist on the board
    pub fn diagonal_neighbors(&self) -> impl Iterator<Item = Position> + '_ {
        DIAGONALS
            .iter()
            .filter_map(move |&(dr, dc)| self.offset(dr, dc))
    }

    /// Chebyshev distance (diagonal steps)
    pub fn distance(&self, other: &Position) -> u8 {
        let dr = (self.row as i8 - other.row as i8).unsigned_abs();
        let dc = (self.col as i8 - other.col as i8).unsigned_abs();
        dr.max(dc)
    }

    pub fn is_adjacent(&self, other: &Position) -> bool {
        self.row != other.row
            && self.col != other.col
            && self.distance(other) == 1
    }

    /// Iterate every dark square, row-major
    pub fn all_dark() -> impl Iterator<Item = Position> {
        (0..BOARD_SIZE).flat_map(|row| {
            (0..BOARD_SIZE)
                .map(move |col| Position::new(row, col))
                .filter(|p| p.is_dark())
        })
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// Diagonal step directions (row delta, col delta)
pub const DIAGONALS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_directions() {
        assert_eq!(Team::Player.forward(), -1);
        assert_eq!(Team::Opponent.forward(), 1);
        assert_eq!(Team::Player.promotion_row(), 0);
        assert_eq!(Team::Opponent.promotion_row(), 7);
        assert_eq!(Team::Player.home_row(), 7);
        assert_eq!(Team::Player.opposite(), Team::Opponent);
    }

    #[test]
    fn test_offset_bounds() {
        let corner = Position::new(0, 1);
        assert_eq!(corner.offset(-1, 1), None);
        assert_eq!(corner.offset(1, 1), Some(Position::new(1, 2)));
        assert_eq!(corner.diagonal_neighbors().count(), 2);
    }

    #[test]
    fn test_dark_squares() {
        assert_eq!(Position::all_dark().count(), 32);
        assert!(Position::new(0, 1).is_dark());
        assert!(!Position::new(0, 0).is_dark());
    }

    #[test]
    fn test_adjacency_is_diagonal_only() {
        let p = Position::new(3, 2);
        assert!(p.is_adjacent(&Position::new(4, 3)));
        assert!(!p.is_adjacent(&Position::new(3, 3)));
        assert!(!p.is_adjacent(&Position::new(5, 4)));
    }

    #[test]
    fn test_piece_id_serializes_as_number() {
        let json = serde_json::to_string(&PieceId(7)).unwrap();
        assert_eq!(json, "7");
    }
}
