//! The five move-scoring strategies
//!
//! Each strategy scores a move on its own scale; the personality's weights
//! blend them. Difficulty decides how much of the emotional picture the
//! opponent actually sees.

use crate::ai::difficulty::DifficultyParams;
use crate::ai::personality::StrategyWeights;
use crate::board::{Board, Move};
use crate::core::types::{Position, Team};
use crate::piece::relationships::STRONG_BOND;
use crate::piece::Roster;

const CAPTURE_VALUE: f32 = 10.0;
const KING_CAPTURE_BONUS: f32 = 5.0;
const PROMOTION_VALUE: f32 = 8.0;
const ESCAPE_VALUE: f32 = 6.0;
const EXPOSED_PENALTY: f32 = 8.0;
const LEFT_BEHIND_PENALTY: f32 = 3.0;

pub struct ScoringContext<'a> {
    pub board: &'a Board,
    pub roster: &'a Roster,
    pub team: Team,
    pub params: DifficultyParams,
}

/// Per-strategy scores for one move
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StrategyScores {
    pub aggressive: f32,
    pub defensive: f32,
    pub emotional: f32,
    pub disruption: f32,
    pub positional: f32,
}

impl StrategyScores {
    pub fn blend(&self, w: &StrategyWeights) -> f32 {
        self.aggressive * w.aggressive
            + self.defensive * w.defensive
            + self.emotional * w.emotional
            + self.disruption * w.disruption
            + self.positional * w.positional
    }
}

/// Board as it would stand right after `mv`; roster positions are left stale
pub fn board_after(board: &Board, mv: &Move) -> Board {
    let mut next = board.clone();
    for &victim in &mv.captured {
        if let Some(square) = next.position_of(victim) {
            next.remove(square);
        }
    }
    next.remove(mv.from);
    next.place(mv.piece, mv.to());
    next
}

/// Whether an enemy could jump the `team` piece standing on `pos`
pub fn can_be_jumped(board: &Board, roster: &Roster, pos: Position, team: Team) -> bool {
    for (dr, dc) in crate::core::types::DIAGONALS {
        // attacker sits behind pos along (dr, dc) and lands in front
        let (Some(attacker_sq), Some(landing)) = (pos.offset(-dr, -dc), pos.offset(dr, dc)) else {
            continue;
        };
        if !board.is_empty(landing) {
            continue;
        }
        let Some(attacker) = board.get(attacker_sq).and_then(|id| roster.get(id)) else {
            continue;
        };
        if attacker.team != team && !attacker.captured && (attacker.is_king() || attacker.team.forward() == dr) {
            return true;
        }
    }
    false
}

fn promotes(ctx: &ScoringContext, mv: &Move) -> bool {
    ctx.roster
        .get(mv.piece)
        .map(|p| !p.is_king() && mv.to().row == p.team.promotion_row())
        .unwrap_or(false)
}

pub fn aggressive(ctx: &ScoringContext, mv: &Move) -> f32 {
    let mut score = mv.captured.len() as f32 * CAPTURE_VALUE;
    score += mv
        .captured
        .iter()
        .filter(|id| ctx.roster.get(**id).map(|p| p.is_king()).unwrap_or(false))
        .count() as f32
        * KING_CAPTURE_BONUS;
    if promotes(ctx, mv) {
        score += PROMOTION_VALUE;
    }
    score
}

pub fn defensive(ctx: &ScoringContext, mv: &Move) -> f32 {
    let after = board_after(ctx.board, mv);
    let mut score = 0.0;
    let was_threatened = can_be_jumped(ctx.board, ctx.roster, mv.from, ctx.team);
    let is_threatened = can_be_jumped(&after, ctx.roster, mv.to(), ctx.team);
    if was_threatened && !is_threatened {
        score += ESCAPE_VALUE;
    }
    if is_threatened {
        score -= EXPOSED_PENALTY;
    }
    for n in mv.from.diagonal_neighbors() {
        let Some(friend) = ctx.board.get(n) else {
            continue;
        };
        if friend == mv.piece || ctx.roster.team_of(friend) != Some(ctx.team) {
            continue;
        }
        if !can_be_jumped(ctx.board, ctx.roster, n, ctx.team) && can_be_jumped(&after, ctx.roster, n, ctx.team) {
            score -= LEFT_BEHIND_PENALTY;
        }
    }
    score * ctx.params.recognition
}

fn isolated(ctx: &ScoringContext, pos: Position, team: Team) -> bool {
    !pos.diagonal_neighbors()
        .filter_map(|n| ctx.board.get(n))
        .any(|id| ctx.roster.team_of(id) == Some(team))
}

pub fn emotional(ctx: &ScoringContext, mv: &Move) -> f32 {
    let mut score = 0.0;
    for victim in mv.captured.iter().filter_map(|id| ctx.roster.get(*id)) {
        if !victim.is_regulated() {
            score += 3.0;
        }
        let trust = victim.trust.value();
        if trust < 0.0 {
            score += 2.0;
        }
        if victim.defection_risk {
            score += 1.0;
        }
        if let Some(pos) = victim.position {
            if isolated(ctx, pos, victim.team) {
                score += 2.0;
            }
        }
    }
    // pressure on fragile pieces next to the landing square
    let enemy = ctx.team.opposite();
    score += mv
        .to()
        .diagonal_neighbors()
        .filter_map(|n| ctx.board.get(n))
        .filter_map(|id| ctx.roster.get(id))
        .filter(|p| p.team == enemy && !p.is_regulated() && !mv.captured.contains(&p.id))
        .count() as f32;
    score * ctx.params.exploitation
}

pub fn disruption(ctx: &ScoringContext, mv: &Move) -> f32 {
    let enemy = ctx.team.opposite();
    let mut score = 0.0;
    for &victim in &mv.captured {
        let mourners = ctx
            .roster
            .active(enemy)
            .filter(|p| p.id != victim && p.relationships.toward(victim) > STRONG_BOND)
            .count();
        score += mourners as f32 * 1.5;
    }
    // wedging between two bonded enemy pieces
    let around: Vec<_> = mv
        .to()
        .diagonal_neighbors()
        .filter_map(|n| ctx.board.get(n))
        .filter_map(|id| ctx.roster.get(id))
        .filter(|p| p.team == enemy && !mv.captured.contains(&p.id))
        .collect();
    for (i, a) in around.iter().enumerate() {
        for b in &around[i + 1..] {
            if a.relationships.is_strong(b.id) || b.relationships.is_strong(a.id) {
                score += 1.0;
            }
        }
    }
    score * ctx.params.recognition
}

pub fn positional(ctx: &ScoringContext, mv: &Move) -> f32 {
    let Some(piece) = ctx.roster.get(mv.piece) else {
        return 0.0;
    };
    let to = mv.to();
    let mut score = 0.0;
    if (2..=5).contains(&to.col) {
        score += 0.5;
    }
    if !piece.is_king() {
        score += (to.row as f32 - mv.from.row as f32).abs() * 0.5;
        if mv.from.row == piece.team.home_row() {
            score -= 0.5;
        }
    }
    score
}

pub fn score_all(ctx: &ScoringContext, mv: &Move) -> StrategyScores {
    StrategyScores {
        aggressive: aggressive(ctx, mv),
        defensive: defensive(ctx, mv),
        emotional: emotional(ctx, mv),
        disruption: disruption(ctx, mv),
        positional: positional(ctx, mv),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::difficulty::Difficulty;
    use crate::board::legal_moves_for_side;
    use crate::board::moves::tests::layout;
    use crate::core::types::PieceId;
    use crate::piece::{DysregulationKind, TransitionCause};

    fn ctx<'a>(board: &'a Board, roster: &'a Roster, difficulty: Difficulty) -> ScoringContext<'a> {
        ScoringContext {
            board,
            roster,
            team: Team::Opponent,
            params: difficulty.params(),
        }
    }

    #[test]
    fn test_jump_detection_respects_direction() {
        // opponent regular at (2,1) moves down; player at (3,2) with (4,3) empty
        let (board, roster) = layout(&[(1, Team::Opponent, 2, 1, false), (2, Team::Player, 3, 2, false)]);
        assert!(can_be_jumped(&board, &roster, Position::new(3, 2), Team::Player));

        // a regular player piece behind an opponent cannot jump backwards
        let (board, roster) = layout(&[(1, Team::Player, 1, 0, false), (2, Team::Opponent, 2, 1, false)]);
        assert!(!can_be_jumped(&board, &roster, Position::new(2, 1), Team::Opponent));
    }

    #[test]
    fn test_exploitation_scales_emotional_targeting() {
        let (board, mut roster) = layout(&[(1, Team::Opponent, 2, 1, false), (2, Team::Player, 3, 2, false)]);
        roster
            .get_mut(PieceId(2))
            .unwrap()
            .dysregulate(DysregulationKind::Shutdown, TransitionCause::Storm, 1);
        let mv = legal_moves_for_side(&board, &roster, Team::Opponent, true).remove(0);
        assert!(mv.is_capture());

        assert_eq!(emotional(&ctx(&board, &roster, Difficulty::Gentle), &mv), 0.0);
        // dysregulated 3 + isolated 2
        assert!((emotional(&ctx(&board, &roster, Difficulty::Ruthless), &mv) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_disruption_counts_mourners() {
        let (board, mut roster) = layout(&[
            (1, Team::Opponent, 2, 1, false),
            (2, Team::Player, 3, 2, false),
            (3, Team::Player, 6, 5, false),
        ]);
        roster.get_mut(PieceId(3)).unwrap().relationships.set(PieceId(2), 7.0);
        let mv = legal_moves_for_side(&board, &roster, Team::Opponent, true).remove(0);
        assert!((disruption(&ctx(&board, &roster, Difficulty::Ruthless), &mv) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_defensive_penalises_walking_into_a_jump() {
        // opponent at (1,2) stepping to (2,3) lands next to player at (3,4) with (1,2) vacated
        let (board, roster) = layout(&[(1, Team::Opponent, 1, 2, false), (2, Team::Player, 3, 4, false)]);
        let moves = legal_moves_for_side(&board, &roster, Team::Opponent, true);
        let into = moves.iter().find(|m| m.to() == Position::new(2, 3)).unwrap();
        let away = moves.iter().find(|m| m.to() == Position::new(2, 1)).unwrap();
        let c = ctx(&board, &roster, Difficulty::Ruthless);
        assert!(defensive(&c, into) < defensive(&c, away));
    }
}
