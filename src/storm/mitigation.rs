//! Mitigation actions available while a storm approaches

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::core::types::PieceId;
use crate::emotion::adjacent_teammates;
use crate::piece::Roster;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MitigationAction {
    /// Half or more of the team is regulated
    GroundTogether,
    /// Someone trusts the player deeply enough to steady the rest
    AnchorPiece,
    /// Enough mutually warm neighbours
    CircleOfSupport,
    /// The whole team stands in one connected group
    UnitedFront,
}

pub const ANCHOR_TRUST: f32 = 8.0;
pub const CIRCLE_MIN_PAIRS: usize = 3;
/// Trust granted to every piece when a storm is prevented outright
pub const PREVENTION_TRUST: f32 = 0.5;
pub const PREVENTION_RESILIENCE: f32 = 0.05;

impl MitigationAction {
    pub const ALL: [MitigationAction; 4] = [
        MitigationAction::GroundTogether,
        MitigationAction::AnchorPiece,
        MitigationAction::CircleOfSupport,
        MitigationAction::UnitedFront,
    ];

    /// Intensity multiplier applied on success
    pub fn factor(&self) -> f32 {
        match self {
            MitigationAction::GroundTogether => 0.6,
            MitigationAction::AnchorPiece => 0.7,
            MitigationAction::CircleOfSupport => 0.5,
            MitigationAction::UnitedFront => 0.4,
        }
    }

    pub fn success_chance(&self) -> f32 {
        match self {
            MitigationAction::GroundTogether => 0.9,
            MitigationAction::AnchorPiece => 0.8,
            MitigationAction::CircleOfSupport => 0.75,
            MitigationAction::UnitedFront => 0.7,
        }
    }

    /// Whether the team currently meets this action's requirement
    pub fn is_available(&self, board: &Board, roster: &Roster) -> bool {
        let pieces: Vec<_> = roster.iter().filter(|p| p.is_emotional()).collect();
        if pieces.is_empty() {
            return false;
        }
        match self {
            MitigationAction::GroundTogether => {
                let regulated = pieces.iter().filter(|p| p.is_regulated()).count();
                regulated * 2 >= pieces.len()
            }
            MitigationAction::AnchorPiece => pieces.iter().any(|p| p.trust.value() >= ANCHOR_TRUST),
            MitigationAction::CircleOfSupport => supportive_pairs(board, roster) >= CIRCLE_MIN_PAIRS,
            MitigationAction::UnitedFront => pieces.len() >= 2 && components(board, roster) == 1,
        }
    }
}

fn emotional_neighbors(board: &Board, roster: &Roster, id: PieceId) -> Vec<PieceId> {
    let Some(piece) = roster.get(id) else {
        return Vec::new();
    };
    let Some(pos) = piece.position else {
        return Vec::new();
    };
    adjacent_teammates(board, roster, pos, piece.team)
        .into_iter()
        .filter(|n| roster.get(*n).map(|p| p.is_emotional()).unwrap_or(false))
        .collect()
}

/// Adjacent emotional pairs where each side regards the other positively
pub fn supportive_pairs(board: &Board, roster: &Roster) -> usize {
    let mut count = 0;
    for a in roster.iter().filter(|p| p.is_emotional()) {
        for b in emotional_neighbors(board, roster, a.id) {
            if a.id >= b {
                continue;
            }
            let Some(other) = roster.get(b) else {
                continue;
            };
            if a.relationships.toward(b) > 0.0 && other.relationships.toward(a.id) > 0.0 {
                count += 1;
            }
        }
    }
    count
}

/// Number of adjacency-connected groups among emotional pieces
pub fn components(board: &Board, roster: &Roster) -> usize {
    let mut unvisited: BTreeSet<PieceId> = roster.iter().filter(|p| p.is_emotional()).map(|p| p.id).collect();
    let mut groups = 0;
    while let Some(start) = unvisited.pop_first() {
        groups += 1;
        let mut queue = VecDeque::from([start]);
        while let Some(id) = queue.pop_front() {
            for n in emotional_neighbors(board, roster, id) {
                if unvisited.remove(&n) {
                    queue.push_back(n);
                }
            }
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::moves::tests::layout;
    use crate::core::types::Team;
    use crate::piece::{DysregulationKind, TransitionCause, Trust};

    #[test]
    fn test_ground_together_needs_half_regulated() {
        let (board, mut roster) = layout(&[(1, Team::Player, 5, 0, false), (2, Team::Player, 5, 4, false)]);
        assert!(MitigationAction::GroundTogether.is_available(&board, &roster));
        for id in [PieceId(1), PieceId(2)] {
            roster
                .get_mut(id)
                .unwrap()
                .dysregulate(DysregulationKind::Anxious, TransitionCause::Storm, 1);
        }
        assert!(!MitigationAction::GroundTogether.is_available(&board, &roster));
    }

    #[test]
    fn test_anchor_needs_deep_trust() {
        let (board, mut roster) = layout(&[(1, Team::Player, 5, 0, false)]);
        assert!(!MitigationAction::AnchorPiece.is_available(&board, &roster));
        roster.get_mut(PieceId(1)).unwrap().trust = Trust::new(8.0);
        assert!(MitigationAction::AnchorPiece.is_available(&board, &roster));
    }

    #[test]
    fn test_united_front_connectivity() {
        let (board, roster) = layout(&[
            (1, Team::Player, 5, 0, false),
            (2, Team::Player, 4, 1, false),
            (3, Team::Player, 5, 2, false),
        ]);
        assert_eq!(components(&board, &roster), 1);
        assert!(MitigationAction::UnitedFront.is_available(&board, &roster));

        let (board, roster) = layout(&[(1, Team::Player, 5, 0, false), (2, Team::Player, 7, 6, false)]);
        assert_eq!(components(&board, &roster), 2);
        assert!(!MitigationAction::UnitedFront.is_available(&board, &roster));
    }

    #[test]
    fn test_supportive_pairs_need_mutual_regard() {
        let (board, mut roster) = layout(&[
            (1, Team::Player, 5, 0, false),
            (2, Team::Player, 4, 1, false),
            (3, Team::Player, 5, 2, false),
            (4, Team::Player, 6, 1, false),
        ]);
        let links = [(1, 2), (2, 3), (3, 4), (4, 1)];
        for (a, b) in links {
            roster.get_mut(PieceId(a)).unwrap().relationships.set(PieceId(b), 1.0);
            roster.get_mut(PieceId(b)).unwrap().relationships.set(PieceId(a), 1.0);
        }
        assert_eq!(supportive_pairs(&board, &roster), 4);
        assert!(MitigationAction::CircleOfSupport.is_available(&board, &roster));

        roster.get_mut(PieceId(1)).unwrap().relationships.set(PieceId(2), -1.0);
        roster.get_mut(PieceId(3)).unwrap().relationships.set(PieceId(4), -1.0);
        assert_eq!(supportive_pairs(&board, &roster), 2);
        assert!(!MitigationAction::CircleOfSupport.is_available(&board, &roster));
    }
}
