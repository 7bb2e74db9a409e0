//! Ordered collection of every piece in a match

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::types::{PieceId, Team};
use crate::piece::Piece;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    pieces: BTreeMap<PieceId, Piece>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, piece: Piece) {
        self.pieces.insert(piece.id, piece);
    }

    pub fn get(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(&id)
    }

    pub fn get_mut(&mut self, id: PieceId) -> Option<&mut Piece> {
        self.pieces.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Piece> {
        self.pieces.values_mut()
    }

    pub fn ids(&self) -> Vec<PieceId> {
        self.pieces.keys().copied().collect()
    }

    /// Active pieces currently on `team`, in id order
    pub fn active(&self, team: Team) -> impl Iterator<Item = &Piece> {
        self.pieces
            .values()
            .filter(move |p| p.team == team && p.is_active())
    }

    pub fn active_ids(&self, team: Team) -> Vec<PieceId> {
        self.active(team).map(|p| p.id).collect()
    }

    pub fn count_active(&self, team: Team) -> usize {
        self.active(team).count()
    }

    pub fn team_of(&self, id: PieceId) -> Option<Team> {
        self.get(id).map(|p| p.team)
    }
}
