use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::PieceId;

/// Why a player or AI action was refused
///
/// Rejections leave the match state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    #[error("piece is frozen and cannot move")]
    Frozen,
    #[error("piece needs empathy before it will move")]
    NeedsEmpathy,
    #[error("piece belongs to the other side")]
    OpponentPiece,
    #[error("it is not this side's turn")]
    NotYourTurn,
    #[error("destination is not a legal move")]
    IllegalDestination,
    #[error("piece has been captured")]
    PieceCaptured,
    #[error("a capture chain must be finished first")]
    MustContinueCapture,
    #[error("piece is already regulated")]
    NotDysregulated,
    #[error("the match is over")]
    MatchOver,
    #[error("no storm is approaching")]
    StormNotMitigatable,
    #[error("mitigation is not available right now")]
    MitigationUnavailable,
    #[error("unknown empathy command")]
    UnknownCommand,
    #[error("no such piece")]
    UnknownPiece,
    #[error("a legal move is still available")]
    MovesAvailable,
}

impl RejectReason {
    /// Stable reason code for presentation layers
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::Frozen => "frozen",
            RejectReason::NeedsEmpathy => "needs_empathy",
            RejectReason::OpponentPiece => "opponent_piece",
            RejectReason::NotYourTurn => "not_your_turn",
            RejectReason::IllegalDestination => "illegal_destination",
            RejectReason::PieceCaptured => "piece_captured",
            RejectReason::MustContinueCapture => "must_continue_capture",
            RejectReason::NotDysregulated => "not_dysregulated",
            RejectReason::MatchOver => "match_over",
            RejectReason::StormNotMitigatable => "storm_not_mitigatable",
            RejectReason::MitigationUnavailable => "mitigation_unavailable",
            RejectReason::UnknownCommand => "unknown_command",
            RejectReason::UnknownPiece => "unknown_piece",
            RejectReason::MovesAvailable => "moves_available",
        }
    }
}

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Piece not found: {0}")]
    PieceNotFound(PieceId),

    #[error("Action rejected: {0}")]
    Rejected(#[from] RejectReason),

    #[error("Content error: {0}")]
    Content(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes_match_serde_names() {
        for reason in [
            RejectReason::Frozen,
            RejectReason::NeedsEmpathy,
            RejectReason::OpponentPiece,
            RejectReason::NotYourTurn,
            RejectReason::IllegalDestination,
        ] {
            let json = serde_json::to_string(&reason).unwrap();
            assert_eq!(json, format!("\"{}\"", reason.code()));
        }
    }

    #[test]
    fn test_rejection_converts_into_game_error() {
        let err: GameError = RejectReason::Frozen.into();
        assert!(matches!(err, GameError::Rejected(RejectReason::Frozen)));
    }
}
