//! Empathy command catalog
//!
//! Base commands work in any state; state commands target one kind of
//! dysregulation. Each command carries an effectiveness coefficient per state.

use serde::{Deserialize, Serialize};

use crate::piece::{DysregulationKind, EmotionalState};

/// Descriptive tags matched against personality preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandTag {
    Listening,
    Validation,
    Space,
    Body,
    Safety,
    Presence,
    Encouragement,
    Boundaries,
    Naming,
    Warmth,
    Autonomy,
    Structure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandId {
    Listen,
    Validate,
    OfferSpace,
    BreatheTogether,
    GroundSenses,
    ReassureSafety,
    GentlePresence,
    InviteSmallStep,
    NameTheAnger,
    HoldBoundary,
    SlowCount,
    WarmOrient,
    AffirmNeeds,
    ReleasePleasing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmpathyCommand {
    pub id: CommandId,
    pub label: &'static str,
    pub tags: &'static [CommandTag],
    /// None for base commands
    pub target: Option<DysregulationKind>,
    /// Regulated, then each kind in `DysregulationKind::ALL` order
    effectiveness: [f32; 6],
    /// A plain failure still lets the piece move this turn
    pub moves_anyway: bool,
}

impl EmpathyCommand {
    pub fn effectiveness(&self, state: EmotionalState) -> f32 {
        let idx = match state {
            EmotionalState::Regulated => 0,
            EmotionalState::Dysregulated(kind) => kind.index() + 1,
        };
        self.effectiveness[idx]
    }

    pub fn is_base(&self) -> bool {
        self.target.is_none()
    }

    /// Offered to a piece in `state`
    pub fn available_for(&self, state: EmotionalState) -> bool {
        match self.target {
            None => true,
            Some(kind) => state.kind() == Some(kind),
        }
    }
}

use CommandTag as T;
use DysregulationKind as K;

pub static CATALOG: [EmpathyCommand; 14] = [
    EmpathyCommand {
        id: CommandId::Listen,
        label: "Listen without fixing",
        tags: &[T::Listening, T::Presence],
        target: None,
        effectiveness: [0.6, 0.55, 0.5, 0.5, 0.45, 0.55],
        moves_anyway: false,
    },
    EmpathyCommand {
        id: CommandId::Validate,
        label: "Validate the feeling",
        tags: &[T::Validation, T::Naming],
        target: None,
        effectiveness: [0.6, 0.6, 0.45, 0.6, 0.4, 0.6],
        moves_anyway: false,
    },
    EmpathyCommand {
        id: CommandId::OfferSpace,
        label: "Offer some space",
        tags: &[T::Space, T::Autonomy],
        target: None,
        effectiveness: [0.5, 0.35, 0.55, 0.65, 0.35, 0.3],
        moves_anyway: true,
    },
    EmpathyCommand {
        id: CommandId::BreatheTogether,
        label: "Breathe together",
        tags: &[T::Body, T::Presence],
        target: None,
        effectiveness: [0.6, 0.65, 0.4, 0.45, 0.55, 0.45],
        moves_anyway: false,
    },
    EmpathyCommand {
        id: CommandId::GroundSenses,
        label: "Name five things you can see",
        tags: &[T::Body, T::Structure],
        target: Some(K::Anxious),
        effectiveness: [0.0, 0.85, 0.0, 0.0, 0.0, 0.0],
        moves_anyway: false,
    },
    EmpathyCommand {
        id: CommandId::ReassureSafety,
        label: "Reassure them they are safe",
        tags: &[T::Safety, T::Warmth],
        target: Some(K::Anxious),
        effectiveness: [0.0, 0.75, 0.0, 0.0, 0.0, 0.0],
        moves_anyway: false,
    },
    EmpathyCommand {
        id: CommandId::GentlePresence,
        label: "Sit quietly nearby",
        tags: &[T::Presence, T::Warmth],
        target: Some(K::Shutdown),
        effectiveness: [0.0, 0.0, 0.8, 0.0, 0.0, 0.0],
        moves_anyway: false,
    },
    EmpathyCommand {
        id: CommandId::InviteSmallStep,
        label: "Invite one small step",
        tags: &[T::Encouragement, T::Autonomy],
        target: Some(K::Shutdown),
        effectiveness: [0.0, 0.0, 0.7, 0.0, 0.0, 0.0],
        moves_anyway: true,
    },
    EmpathyCommand {
        id: CommandId::NameTheAnger,
        label: "Name the anger out loud",
        tags: &[T::Naming, T::Validation],
        target: Some(K::Fight),
        effectiveness: [0.0, 0.0, 0.0, 0.8, 0.0, 0.0],
        moves_anyway: false,
    },
    EmpathyCommand {
        id: CommandId::HoldBoundary,
        label: "Hold a calm boundary",
        tags: &[T::Boundaries, T::Structure],
        target: Some(K::Fight),
        effectiveness: [0.0, 0.0, 0.0, 0.7, 0.0, 0.0],
        moves_anyway: false,
    },
    EmpathyCommand {
        id: CommandId::SlowCount,
        label: "Count slowly to ten",
        tags: &[T::Structure, T::Body],
        target: Some(K::Freeze),
        effectiveness: [0.0, 0.0, 0.0, 0.0, 0.8, 0.0],
        moves_anyway: false,
    },
    EmpathyCommand {
        id: CommandId::WarmOrient,
        label: "Help them notice the room",
        tags: &[T::Warmth, T::Safety],
        target: Some(K::Freeze),
        effectiveness: [0.0, 0.0, 0.0, 0.0, 0.75, 0.0],
        moves_anyway: false,
    },
    EmpathyCommand {
        id: CommandId::AffirmNeeds,
        label: "Affirm their needs matter",
        tags: &[T::Validation, T::Autonomy],
        target: Some(K::Fawn),
        effectiveness: [0.0, 0.0, 0.0, 0.0, 0.0, 0.85],
        moves_anyway: false,
    },
    EmpathyCommand {
        id: CommandId::ReleasePleasing,
        label: "Release them from pleasing",
        tags: &[T::Boundaries, T::Warmth],
        target: Some(K::Fawn),
        effectiveness: [0.0, 0.0, 0.0, 0.0, 0.0, 0.7],
        moves_anyway: false,
    },
];

pub fn command(id: CommandId) -> &'static EmpathyCommand {
    // CATALOG is declared in CommandId order
    &CATALOG[id as usize]
}

/// Commands offered for a state: every base command plus that state's own
pub fn available(state: EmotionalState) -> impl Iterator<Item = &'static EmpathyCommand> {
    CATALOG.iter().filter(move |c| c.available_for(state))
}
