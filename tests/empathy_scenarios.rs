//! Empathy, trust and defection played through the public API

use empathy_checkers::ai::{AiOpponent, AiPersonality, Difficulty};
use empathy_checkers::core::config::SimulationConfig;
use empathy_checkers::core::RejectReason;
use empathy_checkers::core::rng::{ScriptedRng, SeededRng};
use empathy_checkers::core::types::{PieceId, Position, Team};
use empathy_checkers::empathy::{CommandId, Outcome};
use empathy_checkers::game::{GameEvent, GameState, Match};
use empathy_checkers::piece::trust::{TRUST_MAX, TRUST_MIN};
use empathy_checkers::piece::{DysregulationKind, Personality, Piece, TransitionCause, Trust};
use proptest::prelude::*;

fn piece(id: u32, team: Team, trust: f32) -> Piece {
    Piece::new(PieceId(id), format!("P{}", id), team, Personality::default(), trust, 20)
}

#[test]
fn test_three_critical_successes_reach_full_trust() {
    let mut state = GameState::empty(SimulationConfig::default());
    state.add_piece(piece(1, Team::Player, 5.0), Position::new(7, 0)).unwrap();
    state.add_piece(piece(2, Team::Player, 5.0), Position::new(7, 4)).unwrap();
    state.add_piece(piece(10, Team::Opponent, 5.0), Position::new(0, 7)).unwrap();
    state.side_to_move = Team::Opponent;
    let mut game = Match::new(state, ScriptedRng::new(std::iter::empty()));

    let opponent_path = [Position::new(1, 6), Position::new(2, 7), Position::new(3, 6)];
    let player_path = [Position::new(6, 3), Position::new(5, 2), Position::new(4, 1)];
    for round in 0..3 {
        let turn = game.state().turn;
        game.state_mut()
            .roster
            .get_mut(PieceId(1))
            .unwrap()
            .dysregulate(DysregulationKind::Shutdown, TransitionCause::RandomCheck, turn);

        // Every upkeep gate misses, so the shutdown survives into the player turn
        *game.rng_mut() = ScriptedRng::new(std::iter::repeat(0.999).take(64));
        game.move_piece(PieceId(10), opponent_path[round]).unwrap();
        assert_eq!(game.state().side_to_move, Team::Player);

        let ada = game.state().roster.get(PieceId(1)).unwrap();
        assert!(!ada.is_regulated());
        assert!(ada.needs_empathy_first);
        assert_eq!(
            game.move_piece(PieceId(1), Position::new(6, 1)),
            Err(RejectReason::NeedsEmpathy)
        );

        *game.rng_mut() = ScriptedRng::new([0.0]);
        let events = game.apply_empathy(PieceId(1), CommandId::Listen).unwrap();
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::EmpathyResolved {
                outcome: Outcome::CriticalSuccess,
                ..
            }
        )));
        assert!(game.state().roster.get(PieceId(1)).unwrap().is_regulated());
        assert!(game.selectable_pieces().contains(&PieceId(1)));

        game.move_piece(PieceId(2), player_path[round]).unwrap();
    }

    let ada = game.state().roster.get(PieceId(1)).unwrap();
    assert_eq!(ada.trust.value(), TRUST_MAX);
    assert!(ada.breakthrough_ready);
    // Shut down again before every upkeep, so the breakthrough never fired
    assert!(!ada.has_breakthrough);
    assert_eq!(game.state().empathy.history.len(), 3);
    assert_eq!(game.state().turn, 4);
}

#[test]
fn test_critical_failure_at_low_trust_defects() {
    let mut state = GameState::empty(SimulationConfig::default());
    state.add_piece(piece(1, Team::Player, -4.0), Position::new(5, 0)).unwrap();
    state.add_piece(piece(2, Team::Player, 5.0), Position::new(5, 4)).unwrap();
    state.add_piece(piece(10, Team::Opponent, 5.0), Position::new(0, 1)).unwrap();
    state
        .roster
        .get_mut(PieceId(1))
        .unwrap()
        .dysregulate(DysregulationKind::Anxious, TransitionCause::RandomCheck, 1);

    // First roll lands in the critical failure band, second skips the state switch
    let mut game = Match::new(state, ScriptedRng::new([0.99, 0.99]));
    let events = game.apply_empathy(PieceId(1), CommandId::Listen).unwrap();

    assert!(events.iter().any(|e| matches!(
        e,
        GameEvent::EmpathyResolved {
            outcome: Outcome::CriticalFailure,
            ..
        }
    )));
    assert!(events
        .iter()
        .any(|e| matches!(e, GameEvent::Defection { piece, .. } if *piece == PieceId(1))));

    let defector = game.state().roster.get(PieceId(1)).unwrap();
    assert_eq!(defector.team, Team::Opponent);
    assert!(defector.defected);
    assert_eq!(defector.trust.value(), TRUST_MIN);
    assert!(!defector.is_emotional());

    let mate = game.state().roster.get(PieceId(2)).unwrap();
    assert_eq!(mate.trust.value(), 4.0);
    assert!(game.state().outcome.is_none());
}

#[test]
fn test_defector_no_longer_takes_empathy() {
    let mut state = GameState::empty(SimulationConfig::default());
    state.add_piece(piece(1, Team::Player, -4.0), Position::new(5, 0)).unwrap();
    state.add_piece(piece(2, Team::Player, 5.0), Position::new(5, 4)).unwrap();
    state.add_piece(piece(10, Team::Opponent, 5.0), Position::new(0, 1)).unwrap();
    state
        .roster
        .get_mut(PieceId(1))
        .unwrap()
        .dysregulate(DysregulationKind::Anxious, TransitionCause::RandomCheck, 1);

    let mut game = Match::new(state, ScriptedRng::new([0.99, 0.99]));
    game.apply_empathy(PieceId(1), CommandId::Listen).unwrap();
    assert!(game.apply_empathy(PieceId(1), CommandId::Listen).is_err());
}

#[test]
fn test_same_seed_same_match() {
    let registry = empathy_checkers::content::TeamRegistry::with_builtins().unwrap();
    let state = GameState::setup(
        registry.get("hearthside").unwrap(),
        registry.get("ironclad").unwrap(),
        SimulationConfig::default(),
    )
    .unwrap();
    let ai = AiOpponent::new(AiPersonality::default(), Difficulty::Cunning);

    let run = |state: GameState| {
        let mut game = Match::new(state, SeededRng::with_seed(99));
        let mut events = Vec::new();
        for _ in 0..40 {
            if game.state().is_over() {
                break;
            }
            events.extend(game.ai_turn(&ai).unwrap());
        }
        (game.state().clone(), events)
    };

    let (state_a, events_a) = run(state.clone());
    let (state_b, events_b) = run(state);
    assert_eq!(events_a, events_b);
    assert_eq!(state_a, state_b);
}

proptest! {
    #[test]
    fn trust_stays_in_range(start in -5.0f32..=10.0, deltas in prop::collection::vec(-20.0f32..20.0, 1..50)) {
        let mut trust = Trust::new(start);
        for delta in deltas {
            let change = trust.adjust(delta);
            prop_assert!(change.after >= TRUST_MIN && change.after <= TRUST_MAX);
            prop_assert_eq!(change.after, trust.value());
        }
    }
}
