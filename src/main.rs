//! Headless match runner
//!
//! Plays AI against AI and prints a report. The player side behaves like a
//! careful human: it tries to calm an approaching storm and offers the best
//! empathy option to any piece that will not move without it.

use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use empathy_checkers::ai::{load_personality, AiOpponent, AiPersonality, Difficulty};
use empathy_checkers::content::TeamRegistry;
use empathy_checkers::core::error::{GameError, Result};
use empathy_checkers::core::rng::SeededRng;
use empathy_checkers::core::types::Team;
use empathy_checkers::core::SimulationConfig;
use empathy_checkers::game::{GameEvent, GameState, Match, MatchOutcome, Morale, Snapshot};

/// Headless Empathy Checkers - AI vs AI matches
#[derive(Parser, Debug)]
#[command(name = "empathy-checkers")]
#[command(about = "Run an AI vs AI match and report what happened to the pieces")]
struct Args {
    /// Team id for the player side
    #[arg(long, default_value = "hearthside")]
    player_team: String,

    /// Team id for the opponent side
    #[arg(long, default_value = "ironclad")]
    opponent_team: String,

    /// Extra directory of team TOML files
    #[arg(long)]
    teams_dir: Option<PathBuf>,

    /// AI personality steering the player side
    #[arg(long, default_value = "empathetic")]
    player_ai: String,

    /// AI personality steering the opponent side
    #[arg(long, default_value = "balanced")]
    opponent_ai: String,

    /// Difficulty of both AIs
    #[arg(long, default_value = "balanced")]
    difficulty: Difficulty,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Turn limit before the match is drawn
    #[arg(long)]
    max_turns: Option<u32>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Write a snapshot of the final state here
    #[arg(long)]
    save: Option<PathBuf>,

    /// Debug-level logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Debug, Default, Serialize)]
struct Tally {
    captures_by_player: usize,
    captures_by_opponent: usize,
    promotions: usize,
    dysregulations: usize,
    empathy_attempts: usize,
    empathy_successes: usize,
    storms: usize,
    storms_prevented: usize,
    breakthroughs: usize,
    defections: usize,
}

#[derive(Debug, Serialize)]
struct MatchReport {
    outcome: Option<MatchOutcome>,
    turns: u32,
    seed: u64,
    player_team: String,
    opponent_team: String,
    player_ai: String,
    opponent_ai: String,
    difficulty: Difficulty,
    player_pieces: usize,
    opponent_pieces: usize,
    player_morale: Morale,
    events: usize,
    tally: Tally,
}

fn personality(name: &str) -> AiPersonality {
    load_personality(name).unwrap_or_else(|e| {
        warn!(personality = name, error = %e, "Falling back to the balanced personality");
        AiPersonality::default()
    })
}

fn tally(events: &[GameEvent]) -> Tally {
    let mut t = Tally::default();
    for event in events {
        match event {
            GameEvent::PieceCaptured { team, .. } => match team {
                Team::Opponent => t.captures_by_player += 1,
                Team::Player => t.captures_by_opponent += 1,
            },
            GameEvent::PiecePromoted { .. } => t.promotions += 1,
            GameEvent::StateChanged { to, .. } if !to.is_regulated() => t.dysregulations += 1,
            GameEvent::EmpathyResolved { outcome, .. } => {
                t.empathy_attempts += 1;
                if outcome.is_success() {
                    t.empathy_successes += 1;
                }
            }
            GameEvent::StormPhaseChanged { from: None, .. } => t.storms += 1,
            GameEvent::StormMitigated { prevented: true, .. } => t.storms_prevented += 1,
            GameEvent::Breakthrough { .. } => t.breakthroughs += 1,
            GameEvent::Defection { .. } => t.defections += 1,
            _ => {}
        }
    }
    t
}

/// Mitigation and empathy the player side attempts before moving
fn player_support(game: &mut Match<SeededRng>, events: &mut Vec<GameEvent>) {
    if let Some(action) = game.mitigation_options().first().copied() {
        if let Ok(e) = game.mitigate_storm(action) {
            events.extend(e);
        }
    }

    let blocked: Vec<_> = game
        .state()
        .roster
        .active(Team::Player)
        .filter(|p| p.is_emotional() && !p.is_regulated())
        .filter(|p| p.emotional_state.is_frozen() || (p.needs_empathy_first && !p.empathy_provided))
        .map(|p| p.id)
        .collect();
    for id in blocked {
        let Ok(options) = game.empathy_options(id) else {
            continue;
        };
        if let Some(best) = options.first() {
            if let Ok(e) = game.apply_empathy(id, best.command) {
                events.extend(e);
            }
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "empathy_checkers=debug"
    } else {
        "empathy_checkers=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let seed = args.seed.unwrap_or_else(rand::random);

    let mut registry = TeamRegistry::with_builtins()?;
    if let Some(dir) = &args.teams_dir {
        let loaded = registry.load_dir(dir)?;
        info!(dir = %dir.display(), loaded, "Loaded extra teams");
    }
    let team = |id: &str| {
        registry
            .get(id)
            .ok_or_else(|| GameError::Content(format!("unknown team '{}' (have: {})", id, registry.ids().join(", "))))
    };

    let mut config = SimulationConfig::default();
    if let Some(max) = args.max_turns {
        config.max_turns = max;
    }
    let state = GameState::setup(team(&args.player_team)?, team(&args.opponent_team)?, config)?;
    let mut game = Match::new(state, SeededRng::with_seed(seed));

    let player_ai = AiOpponent::new(personality(&args.player_ai), args.difficulty);
    let opponent_ai = AiOpponent::new(personality(&args.opponent_ai), args.difficulty);

    let mut events = Vec::new();
    while !game.state().is_over() {
        let result = match game.state().side_to_move {
            Team::Player => {
                player_support(&mut game, &mut events);
                if game.state().is_over() {
                    break;
                }
                game.ai_turn(&player_ai)
            }
            Team::Opponent => game.ai_turn(&opponent_ai),
        };
        match result {
            Ok(e) => events.extend(e),
            Err(reason) => {
                warn!(reason = reason.code(), "Runner action rejected; stopping");
                break;
            }
        }
    }

    let state = game.state();
    let report = MatchReport {
        outcome: state.outcome,
        turns: state.turn,
        seed,
        player_team: args.player_team.clone(),
        opponent_team: args.opponent_team.clone(),
        player_ai: player_ai.personality.name.clone(),
        opponent_ai: opponent_ai.personality.name.clone(),
        difficulty: args.difficulty,
        player_pieces: state.roster.count_active(Team::Player),
        opponent_pieces: state.roster.count_active(Team::Opponent),
        player_morale: state.morale(Team::Player),
        events: events.len(),
        tally: tally(&events),
    };

    if let Some(path) = &args.save {
        Snapshot::capture(&game).save(path)?;
        info!(path = %path.display(), "Saved final snapshot");
    }

    if args.format == "text" {
        println!("=== Empathy Checkers ===");
        println!("Seed: {}  Turns: {}", report.seed, report.turns);
        println!("Outcome: {:?}", report.outcome);
        println!(
            "Pieces left: {} {} / {} {}",
            report.player_team, report.player_pieces, report.opponent_team, report.opponent_pieces
        );
        println!(
            "Player morale: trust {:.2}, regulated {:.0}%",
            report.player_morale.average_trust,
            report.player_morale.regulated_ratio * 100.0
        );
        println!("{:#?}", report.tally);
    } else {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}
