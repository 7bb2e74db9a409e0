//! Emotional state machine for a single piece
//!
//! A piece is either `Regulated` or in one of five dysregulated crisis modes.

use serde::{Deserialize, Serialize};

use crate::core::types::Turn;

/// Transitions kept per piece before the oldest are dropped
pub const STATE_HISTORY_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DysregulationKind {
    Anxious,
    Shutdown,
    Fight,
    Freeze,
    Fawn,
}

impl DysregulationKind {
    pub const ALL: [DysregulationKind; 5] = [
        DysregulationKind::Anxious,
        DysregulationKind::Shutdown,
        DysregulationKind::Fight,
        DysregulationKind::Freeze,
        DysregulationKind::Fawn,
    ];

    pub fn index(&self) -> usize {
        match self {
            DysregulationKind::Anxious => 0,
            DysregulationKind::Shutdown => 1,
            DysregulationKind::Fight => 2,
            DysregulationKind::Freeze => 3,
            DysregulationKind::Fawn => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DysregulationKind::Anxious => "anxious",
            DysregulationKind::Shutdown => "shutdown",
            DysregulationKind::Fight => "fight",
            DysregulationKind::Freeze => "freeze",
            DysregulationKind::Fawn => "fawn",
        }
    }

    /// States in which the piece will not move until empathy is offered
    pub fn needs_empathy_first(&self) -> bool {
        matches!(
            self,
            DysregulationKind::Shutdown | DysregulationKind::Fawn | DysregulationKind::Freeze
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "kind", rename_all = "snake_case")]
pub enum EmotionalState {
    #[default]
    Regulated,
    Dysregulated(DysregulationKind),
}

impl EmotionalState {
    pub fn is_regulated(&self) -> bool {
        matches!(self, EmotionalState::Regulated)
    }

    pub fn kind(&self) -> Option<DysregulationKind> {
        match self {
            EmotionalState::Regulated => None,
            EmotionalState::Dysregulated(kind) => Some(*kind),
        }
    }

    pub fn is_frozen(&self) -> bool {
        matches!(self, EmotionalState::Dysregulated(DysregulationKind::Freeze))
    }

    pub fn label(&self) -> &'static str {
        match self {
            EmotionalState::Regulated => "regulated",
            EmotionalState::Dysregulated(kind) => kind.label(),
        }
    }
}

/// Compact set of emotional states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StateSet(u8);

impl StateSet {
    pub const EMPTY: StateSet = StateSet(0);

    const REGULATED_BIT: u8 = 1 << 5;

    pub const fn with_kind(self, kind: DysregulationKind) -> StateSet {
        let bit = match kind {
            DysregulationKind::Anxious => 1,
            DysregulationKind::Shutdown => 1 << 1,
            DysregulationKind::Fight => 1 << 2,
            DysregulationKind::Freeze => 1 << 3,
            DysregulationKind::Fawn => 1 << 4,
        };
        StateSet(self.0 | bit)
    }

    pub const fn with_regulated(self) -> StateSet {
        StateSet(self.0 | Self::REGULATED_BIT)
    }

    pub fn contains(&self, state: EmotionalState) -> bool {
        match state {
            EmotionalState::Regulated => self.0 & Self::REGULATED_BIT != 0,
            EmotionalState::Dysregulated(kind) => self.0 & (1 << kind.index()) != 0,
        }
    }
}

/// How a state relates to a given pressure (storm type, contagion source)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Susceptibility {
    Vulnerable,
    Resistant,
    Neutral,
}

/// Single authority for "is this state susceptible to X"
///
/// Callers describe X as a pair of sets and keep their own numeric weights.
pub fn susceptibility(state: EmotionalState, vulnerable: StateSet, resistant: StateSet) -> Susceptibility {
    if vulnerable.contains(state) {
        Susceptibility::Vulnerable
    } else if resistant.contains(state) {
        Susceptibility::Resistant
    } else {
        Susceptibility::Neutral
    }
}

/// What caused a state transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionCause {
    Storm,
    Contagion,
    RandomCheck,
    WitnessedTrauma,
    PromotionAnxiety,
    EmpathySuccess,
    EmpathyFailure,
    EmpathyCriticalFailure,
    Combo,
    NaturalRecovery,
    Breakthrough,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    pub turn: Turn,
    pub from: EmotionalState,
    pub to: EmotionalState,
    pub cause: TransitionCause,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_set_membership() {
        let set = StateSet::EMPTY
            .with_kind(DysregulationKind::Anxious)
            .with_kind(DysregulationKind::Freeze);
        assert!(set.contains(EmotionalState::Dysregulated(DysregulationKind::Anxious)));
        assert!(set.contains(EmotionalState::Dysregulated(DysregulationKind::Freeze)));
        assert!(!set.contains(EmotionalState::Dysregulated(DysregulationKind::Fight)));
        assert!(!set.contains(EmotionalState::Regulated));
        assert!(StateSet::EMPTY.with_regulated().contains(EmotionalState::Regulated));
    }

    #[test]
    fn test_vulnerable_wins_over_resistant() {
        let both = StateSet::EMPTY.with_kind(DysregulationKind::Fight);
        let state = EmotionalState::Dysregulated(DysregulationKind::Fight);
        assert_eq!(susceptibility(state, both, both), Susceptibility::Vulnerable);
        assert_eq!(
            susceptibility(EmotionalState::Regulated, both, both),
            Susceptibility::Neutral
        );
    }

    #[test]
    fn test_state_serde_shape() {
        let json = serde_json::to_string(&EmotionalState::Dysregulated(DysregulationKind::Fawn)).unwrap();
        assert_eq!(json, r#"{"state":"dysregulated","kind":"fawn"}"#);
        let json = serde_json::to_string(&EmotionalState::Regulated).unwrap();
        assert_eq!(json, r#"{"state":"regulated"}"#);
    }
}
