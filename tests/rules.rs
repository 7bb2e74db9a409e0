//! Move rules over arbitrary positions

use std::collections::BTreeSet;

use empathy_checkers::board::moves::piece_moves;
use empathy_checkers::board::{legal_moves_for_side, Move};
use empathy_checkers::core::config::SimulationConfig;
use empathy_checkers::core::types::{PieceId, Position, Team};
use empathy_checkers::game::GameState;
use empathy_checkers::piece::{DysregulationKind, Personality, Piece, PieceKind, TransitionCause};
use proptest::prelude::*;

/// (dark square index, is player, is king, frozen)
type Layout = (usize, bool, bool, bool);

fn build(layout: &[Layout]) -> GameState {
    let squares: Vec<Position> = Position::all_dark().collect();
    let mut state = GameState::empty(SimulationConfig::default());
    let mut used = BTreeSet::new();
    for (i, &(square, is_player, king, frozen)) in layout.iter().enumerate() {
        if !used.insert(square) {
            continue;
        }
        let team = if is_player { Team::Player } else { Team::Opponent };
        let mut piece = Piece::new(PieceId(i as u32 + 1), format!("P{}", i + 1), team, Personality::default(), 5.0, 20);
        if king {
            piece.kind = PieceKind::King;
        }
        if frozen && is_player {
            piece.dysregulate(DysregulationKind::Freeze, TransitionCause::Storm, 1);
        }
        state.add_piece(piece, squares[square]).unwrap();
    }
    state
}

fn position_strategy() -> impl Strategy<Value = Vec<Layout>> {
    prop::collection::vec((0usize..32, any::<bool>(), prop::bool::weighted(0.2), prop::bool::weighted(0.3)), 2..20)
}

fn is_prefix(short: &Move, long: &Move) -> bool {
    short.piece == long.piece && short.path.len() < long.path.len() && long.path.starts_with(&short.path)
}

proptest! {
    #[test]
    fn forced_capture_removes_every_simple_move(layout in position_strategy()) {
        let state = build(&layout);
        for team in [Team::Player, Team::Opponent] {
            let moves = legal_moves_for_side(&state.board, &state.roster, team, true);
            if moves.iter().any(Move::is_capture) {
                prop_assert!(moves.iter().all(Move::is_capture));
            }
        }
    }

    #[test]
    fn frozen_pieces_never_move(layout in position_strategy()) {
        let state = build(&layout);
        let frozen: BTreeSet<PieceId> = state
            .roster
            .iter()
            .filter(|p| p.emotional_state.is_frozen())
            .map(|p| p.id)
            .collect();
        for forced in [true, false] {
            let moves = legal_moves_for_side(&state.board, &state.roster, Team::Player, forced);
            prop_assert!(moves.iter().all(|m| !frozen.contains(&m.piece)));
        }
    }

    #[test]
    fn capture_chains_are_complete(layout in position_strategy()) {
        let state = build(&layout);
        for piece in state.roster.iter() {
            let captures: Vec<Move> = piece_moves(&state.board, &state.roster, piece.id)
                .into_iter()
                .filter(Move::is_capture)
                .collect();
            for mv in &captures {
                prop_assert_eq!(mv.path.len(), mv.captured.len());
                let distinct: BTreeSet<_> = mv.captured.iter().collect();
                prop_assert_eq!(distinct.len(), mv.captured.len());
                for victim in &mv.captured {
                    prop_assert_ne!(state.roster.team_of(*victim), Some(piece.team));
                }
                let mut at = mv.from;
                for step in &mv.path {
                    prop_assert_eq!(at.distance(step), 2);
                    at = *step;
                }
                prop_assert!(captures.iter().all(|other| !is_prefix(mv, other)));
            }
        }
    }
}

#[test]
fn test_opening_position_has_seven_moves_each() {
    let state = {
        let registry = empathy_checkers::content::TeamRegistry::with_builtins().unwrap();
        GameState::setup(
            registry.get("hearthside").unwrap(),
            registry.get("ironclad").unwrap(),
            SimulationConfig::default(),
        )
        .unwrap()
    };
    for team in [Team::Player, Team::Opponent] {
        let moves = legal_moves_for_side(&state.board, &state.roster, team, true);
        assert_eq!(moves.len(), 7);
        assert!(moves.iter().all(|m| !m.is_capture()));
    }
}

#[test]
fn test_double_jump_is_one_move() {
    let mut state = build(&[]);
    for (id, team, row, col) in [
        (1, Team::Player, 6, 1),
        (10, Team::Opponent, 5, 2),
        (11, Team::Opponent, 3, 4),
        (12, Team::Opponent, 0, 7),
    ] {
        let piece = Piece::new(PieceId(id), format!("P{}", id), team, Personality::default(), 5.0, 20);
        state.add_piece(piece, Position::new(row, col)).unwrap();
    }
    let moves = legal_moves_for_side(&state.board, &state.roster, Team::Player, true);
    assert_eq!(moves.len(), 1);
    assert_eq!(moves[0].path, vec![Position::new(4, 3), Position::new(2, 5)]);
    assert_eq!(moves[0].captured, vec![PieceId(10), PieceId(11)]);
}
