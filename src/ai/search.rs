//! Shallow material lookahead with alpha-beta pruning

use crate::board::{execute, legal_moves_for_side, Board, Move};
use crate::core::types::Team;
use crate::piece::Roster;

pub const KING_VALUE: f32 = 1.6;
pub const MAN_VALUE: f32 = 1.0;
/// Value of a position where the side to move has no move left
pub const WIN_VALUE: f32 = 100.0;

/// Material balance from `me`'s point of view
pub fn material(board: &Board, roster: &Roster, me: Team) -> f32 {
    board
        .occupied()
        .filter_map(|(_, id)| roster.get(id))
        .map(|p| {
            let value = if p.is_king() { KING_VALUE } else { MAN_VALUE };
            if p.team == me {
                value
            } else {
                -value
            }
        })
        .sum()
}

fn apply(board: &Board, roster: &Roster, mv: &Move) -> Option<(Board, Roster)> {
    let mut board = board.clone();
    let mut roster = roster.clone();
    execute(&mut board, &mut roster, mv).ok()?;
    Some((board, roster))
}

#[allow(clippy::too_many_arguments)]
fn minimax(
    board: &Board,
    roster: &Roster,
    to_move: Team,
    me: Team,
    depth: u8,
    mut alpha: f32,
    mut beta: f32,
    forced_capture: bool,
) -> f32 {
    if depth == 0 {
        return material(board, roster, me);
    }
    let moves = legal_moves_for_side(board, roster, to_move, forced_capture);
    if moves.is_empty() {
        return if to_move == me { -WIN_VALUE } else { WIN_VALUE };
    }

    let maximizing = to_move == me;
    let mut best = if maximizing { f32::NEG_INFINITY } else { f32::INFINITY };
    for mv in &moves {
        let Some((next_board, next_roster)) = apply(board, roster, mv) else {
            continue;
        };
        let value = minimax(
            &next_board,
            &next_roster,
            to_move.opposite(),
            me,
            depth - 1,
            alpha,
            beta,
            forced_capture,
        );
        if maximizing {
            best = best.max(value);
            alpha = alpha.max(value);
        } else {
            best = best.min(value);
            beta = beta.min(value);
        }
        if beta <= alpha {
            break;
        }
    }
    if best.is_finite() {
        best
    } else {
        material(board, roster, me)
    }
}

/// Worst-case material after playing `mv` and searching `depth` plies in total
///
/// Depth 1 only looks at the position right after the move.
pub fn lookahead(board: &Board, roster: &Roster, mv: &Move, me: Team, depth: u8, forced_capture: bool) -> f32 {
    let Some((next_board, next_roster)) = apply(board, roster, mv) else {
        return material(board, roster, me);
    };
    minimax(
        &next_board,
        &next_roster,
        me.opposite(),
        me,
        depth.saturating_sub(1),
        f32::NEG_INFINITY,
        f32::INFINITY,
        forced_capture,
    )
}
