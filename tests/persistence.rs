//! Save and restore mid-match

use empathy_checkers::ai::{AiOpponent, AiPersonality, Difficulty};
use empathy_checkers::content::TeamRegistry;
use empathy_checkers::core::config::SimulationConfig;
use empathy_checkers::core::rng::SeededRng;
use empathy_checkers::game::{GameState, Match, Snapshot};

fn played(seed: u64, half_turns: usize) -> Match<SeededRng> {
    let registry = TeamRegistry::with_builtins().unwrap();
    let state = GameState::setup(
        registry.get("hearthside").unwrap(),
        registry.get("ironclad").unwrap(),
        SimulationConfig::default(),
    )
    .unwrap();
    let mut game = Match::new(state, SeededRng::with_seed(seed));
    let ai = AiOpponent::new(AiPersonality::default(), Difficulty::Balanced);
    for _ in 0..half_turns {
        if game.state().is_over() {
            break;
        }
        game.ai_turn(&ai).unwrap();
    }
    game
}

#[test]
fn test_snapshot_round_trip_is_stable() {
    let game = played(7, 30);
    let json = Snapshot::capture(&game).to_json().unwrap();
    let restored = Snapshot::from_json(&json).unwrap();
    assert_eq!(restored.to_json().unwrap(), json);
    assert_eq!(&restored.state, game.state());
}

#[test]
fn test_restored_match_continues_identically() {
    let mut original = played(11, 20);
    let mut restored = Snapshot::from_json(&Snapshot::capture(&original).to_json().unwrap())
        .unwrap()
        .into_match();
    let ai = AiOpponent::new(AiPersonality::default(), Difficulty::Cunning);

    for _ in 0..20 {
        if original.state().is_over() {
            break;
        }
        let a = original.ai_turn(&ai).unwrap();
        let b = restored.ai_turn(&ai).unwrap();
        assert_eq!(a, b);
    }
    assert_eq!(original.state(), restored.state());
}

#[test]
fn test_save_and_load_file() {
    let game = played(3, 10);
    let path = std::env::temp_dir().join(format!("empathy-checkers-{}.json", game.state().match_id.0));
    Snapshot::capture(&game).save(&path).unwrap();
    let (loaded, fixes) = Snapshot::load(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert!(fixes.is_empty());
    assert_eq!(&loaded.state, game.state());
}
