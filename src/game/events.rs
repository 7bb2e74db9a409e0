//! Typed match events
//!
//! Every event describes itself fully so presentation, analytics or save
//! layers never need to query back into the core. Sinks are fire-and-forget.

use serde::Serialize;
use tracing::debug;

use crate::core::types::{PieceId, Position, Team, Turn};
use crate::empathy::{CommandId, ComboId, Outcome};
use crate::game::state::MatchOutcome;
use crate::piece::{EmotionalState, Piece, StateTransition, TransitionCause};
use crate::storm::{MitigationAction, StormPhase, StormType};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    MoveCompleted {
        turn: Turn,
        team: Team,
        piece: PieceId,
        name: String,
        from: Position,
        to: Position,
        captured: Vec<PieceId>,
    },
    /// A capture chain continues; the same piece must jump again
    ChainContinues {
        turn: Turn,
        piece: PieceId,
        at: Position,
    },
    PieceCaptured {
        turn: Turn,
        piece: PieceId,
        name: String,
        team: Team,
        by: PieceId,
        square: Position,
    },
    PiecePromoted {
        turn: Turn,
        piece: PieceId,
        name: String,
        square: Position,
    },
    StateChanged {
        turn: Turn,
        piece: PieceId,
        name: String,
        from: EmotionalState,
        to: EmotionalState,
        cause: TransitionCause,
    },
    EmpathyResolved {
        turn: Turn,
        piece: PieceId,
        name: String,
        command: CommandId,
        outcome: Outcome,
        trust_before: f32,
        trust_after: f32,
        state_before: EmotionalState,
        state_after: EmotionalState,
        combo: Option<ComboId>,
    },
    StormPhaseChanged {
        turn: Turn,
        storm: StormType,
        /// None when the storm has just formed
        from: Option<StormPhase>,
        /// None when the storm has ended
        to: Option<StormPhase>,
        intensity: f32,
    },
    StormMitigated {
        turn: Turn,
        storm: StormType,
        action: MitigationAction,
        success: bool,
        intensity: f32,
        prevented: bool,
    },
    Breakthrough {
        turn: Turn,
        piece: PieceId,
        name: String,
        inspired: Vec<PieceId>,
    },
    Defection {
        turn: Turn,
        piece: PieceId,
        name: String,
        trust: f32,
    },
    TurnPassed {
        turn: Turn,
        team: Team,
    },
    MatchEnded {
        turn: Turn,
        outcome: MatchOutcome,
    },
}

impl GameEvent {
    pub fn state_changed(piece: &Piece, transition: &StateTransition) -> GameEvent {
        GameEvent::StateChanged {
            turn: transition.turn,
            piece: piece.id,
            name: piece.name.clone(),
            from: transition.from,
            to: transition.to,
            cause: transition.cause,
        }
    }

    pub fn turn(&self) -> Turn {
        match self {
            GameEvent::MoveCompleted { turn, .. }
            | GameEvent::ChainContinues { turn, .. }
            | GameEvent::PieceCaptured { turn, .. }
            | GameEvent::PiecePromoted { turn, .. }
            | GameEvent::StateChanged { turn, .. }
            | GameEvent::EmpathyResolved { turn, .. }
            | GameEvent::StormPhaseChanged { turn, .. }
            | GameEvent::StormMitigated { turn, .. }
            | GameEvent::Breakthrough { turn, .. }
            | GameEvent::Defection { turn, .. }
            | GameEvent::TurnPassed { turn, .. }
            | GameEvent::MatchEnded { turn, .. } => *turn,
        }
    }
}

/// Events produced by one action, in order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventLog {
    pub events: Vec<GameEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Record a state transition on `piece`, if one happened
    pub fn transition(&mut self, piece: &Piece, transition: Option<&StateTransition>) {
        if let Some(t) = transition {
            self.push(GameEvent::state_changed(piece, t));
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter()
    }

    pub fn take(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Passive consumer of match events
pub trait EventSink {
    fn emit(&mut self, event: &GameEvent);
}

/// Logs every event at debug level
#[derive(Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&mut self, event: &GameEvent) {
        debug!(turn = event.turn(), ?event, "Game event");
    }
}

/// Keeps every event it sees; handy for reports and tests
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub events: Vec<GameEvent>,
}

impl EventSink for CollectingSink {
    fn emit(&mut self, event: &GameEvent) {
        self.events.push(event.clone());
    }
}
