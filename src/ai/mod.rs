//! Opponent AI
//!
//! Architecture: trait + data hybrid
//! - `Opponent` trait is the seam the match loop drives
//! - `AiPersonality` holds TOML-loaded tendencies
//! - `Difficulty` fixes depth, mistakes and emotional awareness

pub mod difficulty;
pub mod personality;
pub mod search;
pub mod strategies;

pub use difficulty::{Difficulty, DifficultyParams};
pub use personality::{load_personality, AiPersonality, AiStyle, StrategyWeights};

use std::cmp::Reverse;

use ordered_float::OrderedFloat;
use tracing::debug;

use crate::board::{legal_moves_for_side, Board, Move};
use crate::core::rng::GameRng;
use crate::core::types::Team;
use crate::piece::Roster;
use strategies::{score_all, ScoringContext, StrategyScores};

/// Candidates that get the full lookahead
pub const LOOKAHEAD_CANDIDATES: usize = 4;
/// Weight of material swing found by the lookahead
pub const LOOKAHEAD_WEIGHT: f32 = 3.0;
const CHAOS_MIN: f32 = 0.5;
const CHAOS_MAX: f32 = 1.5;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMove {
    pub mv: Move,
    pub strategies: StrategyScores,
    pub score: f32,
}

/// Anything that can pick a move for a side
pub trait Opponent {
    fn choose_move(
        &self,
        board: &Board,
        roster: &Roster,
        team: Team,
        forced_capture: bool,
        rng: &mut dyn GameRng,
    ) -> Option<Move>;

    fn personality(&self) -> &AiPersonality;
}

#[derive(Debug, Clone, PartialEq)]
pub struct AiOpponent {
    pub personality: AiPersonality,
    pub difficulty: Difficulty,
}

fn sort_ranked(ranked: &mut [ScoredMove]) {
    ranked.sort_by_key(|s| Reverse(OrderedFloat(s.score)));
}

/// Order after a deeper search of the first `searched` moves
///
/// Unsearched moves keep their shallow order but never outrank a searched
/// one: their shallow scores are capped at the lowest searched score.
fn settle_deep_pass(ranked: &mut [ScoredMove], searched: usize) {
    if searched == 0 {
        return;
    }
    let (deep, shallow) = ranked.split_at_mut(searched);
    sort_ranked(deep);
    let floor = deep[searched - 1].score;
    for scored in shallow {
        scored.score = scored.score.min(floor);
    }
}

impl AiOpponent {
    pub fn new(personality: AiPersonality, difficulty: Difficulty) -> Self {
        Self {
            personality,
            difficulty,
        }
    }

    /// Every legal move with its blended score, best first
    pub fn rank_moves(&self, board: &Board, roster: &Roster, team: Team, forced_capture: bool) -> Vec<ScoredMove> {
        let params = self.difficulty.params();
        let weights = self.personality.weights();
        let ctx = ScoringContext {
            board,
            roster,
            team,
            params,
        };
        let now = search::material(board, roster, team);

        let mut ranked: Vec<ScoredMove> = legal_moves_for_side(board, roster, team, forced_capture)
            .into_iter()
            .map(|mv| {
                let strategies = score_all(&ctx, &mv);
                let swing = search::lookahead(board, roster, &mv, team, 1, forced_capture) - now;
                let score = strategies.blend(&weights) + swing * LOOKAHEAD_WEIGHT;
                ScoredMove { mv, strategies, score }
            })
            .collect();
        sort_ranked(&mut ranked);

        if params.depth > 1 {
            let depth = if self.personality.style == AiStyle::Calculating {
                params.depth.saturating_add(1).min(3)
            } else {
                params.depth
            };
            let searched = ranked.len().min(LOOKAHEAD_CANDIDATES);
            for scored in ranked.iter_mut().take(searched) {
                let swing = search::lookahead(board, roster, &scored.mv, team, depth, forced_capture) - now;
                scored.score = scored.strategies.blend(&weights) + swing * LOOKAHEAD_WEIGHT;
            }
            settle_deep_pass(&mut ranked, searched);
        }
        ranked
    }

    fn reluctance(&self) -> f32 {
        let base = self.difficulty.params().capture_reluctance;
        if self.personality.style == AiStyle::Empathetic {
            (base + self.personality.empathy * 0.3).min(1.0)
        } else {
            base
        }
    }
}

/// The gentlest alternative to a capture: a quiet move if one exists, else the smallest capture
fn least_harmful(ranked: &[ScoredMove], roster: &Roster) -> Option<usize> {
    if let Some(i) = ranked.iter().position(|s| !s.mv.is_capture()) {
        return Some(i);
    }
    let harm = |s: &ScoredMove| {
        let fragile = s
            .mv
            .captured
            .iter()
            .filter(|id| roster.get(**id).map(|p| !p.is_regulated()).unwrap_or(false))
            .count();
        (s.mv.captured.len(), fragile)
    };
    ranked
        .iter()
        .enumerate()
        .min_by_key(|(_, s)| harm(s))
        .map(|(i, _)| i)
}

impl Opponent for AiOpponent {
    fn choose_move(
        &self,
        board: &Board,
        roster: &Roster,
        team: Team,
        forced_capture: bool,
        rng: &mut dyn GameRng,
    ) -> Option<Move> {
        let mut ranked = self.rank_moves(board, roster, team, forced_capture);
        if ranked.is_empty() {
            return None;
        }

        if self.personality.style == AiStyle::Chaotic {
            for scored in ranked.iter_mut() {
                scored.score *= rng.between(CHAOS_MIN, CHAOS_MAX);
            }
            sort_ranked(&mut ranked);
        }

        let reluctance = self.reluctance();
        if ranked[0].mv.is_capture() && reluctance > 0.0 && rng.chance(reluctance) {
            if let Some(i) = least_harmful(&ranked, roster) {
                debug!(personality = %self.personality.name, "Held back from the strongest capture");
                return Some(ranked.swap_remove(i).mv);
            }
        }

        let mistake = self.difficulty.params().mistake_chance;
        let pick = if ranked.len() > 1 && mistake > 0.0 && rng.chance(mistake) {
            debug!(personality = %self.personality.name, "Mistake: playing a mid-ranked move");
            ranked.len() / 2
        } else {
            0
        };
        Some(ranked.swap_remove(pick).mv)
    }

    fn personality(&self) -> &AiPersonality {
        &self.personality
    }
}
