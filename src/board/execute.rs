//! Atomic move execution
//!
//! Everything is validated before the first write, so a rejected move leaves
//! both board and roster untouched.

use tracing::debug;

use crate::board::{Board, Move};
use crate::core::error::RejectReason;
use crate::core::types::{PieceId, Position};
use crate::piece::{PieceKind, Roster};

#[derive(Debug, Clone, PartialEq)]
pub struct MoveOutcome {
    pub piece: PieceId,
    pub from: Position,
    pub to: Position,
    /// Captured pieces with the square each was taken on
    pub captured: Vec<(PieceId, Position)>,
    pub promoted: bool,
}

fn validate(board: &Board, roster: &Roster, mv: &Move) -> Result<Vec<(PieceId, Position)>, RejectReason> {
    let piece = roster.get(mv.piece).ok_or(RejectReason::UnknownPiece)?;
    if !piece.is_active() {
        return Err(RejectReason::PieceCaptured);
    }
    if board.get(mv.from) != Some(mv.piece) || mv.path.is_empty() {
        return Err(RejectReason::IllegalDestination);
    }
    let to = mv.to();
    if to != mv.from && !board.is_empty(to) {
        return Err(RejectReason::IllegalDestination);
    }

    let mut taken = Vec::with_capacity(mv.captured.len());
    for &victim in &mv.captured {
        let square = board.position_of(victim).ok_or(RejectReason::IllegalDestination)?;
        match roster.get(victim) {
            Some(v) if v.team != piece.team && !v.captured => taken.push((victim, square)),
            _ => return Err(RejectReason::IllegalDestination),
        }
    }
    Ok(taken)
}

/// Apply a move: occupancy, captures, cached positions, promotion
pub fn execute(board: &mut Board, roster: &mut Roster, mv: &Move) -> Result<MoveOutcome, RejectReason> {
    let taken = validate(board, roster, mv)?;
    let to = mv.to();

    for &(victim, square) in &taken {
        board.remove(square);
        if let Some(v) = roster.get_mut(victim) {
            v.captured = true;
            v.position = None;
        }
    }

    board.remove(mv.from);
    board.place(mv.piece, to);

    let mut promoted = false;
    if let Some(piece) = roster.get_mut(mv.piece) {
        piece.position = Some(to);
        if piece.kind == PieceKind::Regular && to.row == piece.team.promotion_row() {
            piece.kind = PieceKind::King;
            promoted = true;
        }
    }

    debug!(
        piece = %mv.piece,
        from = %mv.from,
        to = %to,
        captured = taken.len(),
        promoted,
        "Move executed"
    );

    Ok(MoveOutcome {
        piece: mv.piece,
        from: mv.from,
        to,
        captured: taken,
        promoted,
    })
}
