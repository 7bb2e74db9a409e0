//! Piece model: identity, personality, emotional state, trust, memory, relationships

pub mod emotion;
pub mod memory;
pub mod personality;
pub mod relationships;
pub mod roster;
pub mod trust;

pub use emotion::{DysregulationKind, EmotionalState, StateTransition, TransitionCause};
pub use memory::{Memory, MemoryKind, MemoryLog};
pub use personality::{DysregulationWeights, Personality, TraitVector};
pub use relationships::Relationships;
pub use roster::Roster;
pub use trust::{Trust, TrustChange, TrustMilestone};

use serde::{Deserialize, Serialize};

use crate::core::error::RejectReason;
use crate::core::types::{PieceId, Position, Team, Turn};
use emotion::STATE_HISTORY_CAPACITY;
use trust::{DEFECTION_RISK_TRUST, PLANNING_DEFECTION_TRUST};

pub const RESILIENCE_MAX: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceKind {
    Regular,
    King,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    pub id: PieceId,
    pub name: String,
    pub team: Team,
    /// Team at match setup; differs from `team` after defection
    pub original_team: Team,
    pub kind: PieceKind,
    /// Cached view of the board; None once captured
    pub position: Option<Position>,
    pub personality: Personality,
    #[serde(default)]
    pub emotional_state: EmotionalState,
    #[serde(default)]
    pub state_history: Vec<StateTransition>,
    #[serde(default)]
    pub trust: Trust,
    pub resilience: f32,
    pub memories: MemoryLog,
    #[serde(default)]
    pub relationships: Relationships,
    #[serde(default)]
    pub dysregulation_turns: u32,
    #[serde(default)]
    pub defection_risk: bool,
    #[serde(default)]
    pub planning_defection: bool,
    #[serde(default)]
    pub defected: bool,
    #[serde(default)]
    pub has_breakthrough: bool,
    #[serde(default)]
    pub breakthrough_ready: bool,
    #[serde(default)]
    pub captured: bool,
    #[serde(default)]
    pub needs_empathy_first: bool,
    #[serde(default)]
    pub empathy_provided: bool,
    #[serde(default)]
    pub contagion_susceptible: bool,
}

impl Piece {
    pub fn new(
        id: PieceId,
        name: impl Into<String>,
        team: Team,
        personality: Personality,
        starting_trust: f32,
        memory_capacity: usize,
    ) -> Self {
        let resilience = personality.traits.base_resilience.clamp(0.0, RESILIENCE_MAX);
        Self {
            id,
            name: name.into(),
            team,
            original_team: team,
            kind: PieceKind::Regular,
            position: None,
            personality,
            emotional_state: EmotionalState::Regulated,
            state_history: Vec::new(),
            trust: Trust::new(starting_trust),
            resilience,
            memories: MemoryLog::new(memory_capacity),
            relationships: Relationships::new(),
            dysregulation_turns: 0,
            defection_risk: false,
            planning_defection: false,
            defected: false,
            has_breakthrough: false,
            breakthrough_ready: false,
            captured: false,
            needs_empathy_first: false,
            empathy_provided: false,
            contagion_susceptible: false,
        }
    }

    /// On the board and still in play
    pub fn is_active(&self) -> bool {
        !self.captured && self.position.is_some()
    }

    /// Takes part in the emotional simulation (player pieces that never defected)
    pub fn is_emotional(&self) -> bool {
        self.is_active() && self.team == Team::Player && !self.defected
    }

    pub fn is_king(&self) -> bool {
        self.kind == PieceKind::King
    }

    pub fn is_regulated(&self) -> bool {
        self.emotional_state.is_regulated()
    }

    /// Whether the piece may be picked up this turn (side-to-move checked elsewhere)
    pub fn check_selectable(&self) -> Result<(), RejectReason> {
        if !self.is_active() {
            return Err(RejectReason::PieceCaptured);
        }
        if self.emotional_state.is_frozen() {
            return Err(RejectReason::Frozen);
        }
        if self.needs_empathy_first && !self.empathy_provided {
            return Err(RejectReason::NeedsEmpathy);
        }
        Ok(())
    }

    /// Change emotional state, recording the transition; no-op if unchanged
    pub fn set_state(&mut self, to: EmotionalState, cause: TransitionCause, turn: Turn) -> Option<StateTransition> {
        let from = self.emotional_state;
        if from == to {
            return None;
        }
        let transition = StateTransition { turn, from, to, cause };
        self.emotional_state = to;
        if to.is_regulated() {
            self.dysregulation_turns = 0;
            self.needs_empathy_first = false;
        } else if from.is_regulated() {
            self.dysregulation_turns = 0;
        }
        self.state_history.push(transition.clone());
        if self.state_history.len() > STATE_HISTORY_CAPACITY {
            let excess = self.state_history.len() - STATE_HISTORY_CAPACITY;
            self.state_history.drain(..excess);
        }
        Some(transition)
    }

    pub fn dysregulate(&mut self, kind: DysregulationKind, cause: TransitionCause, turn: Turn) -> Option<StateTransition> {
        self.set_state(EmotionalState::Dysregulated(kind), cause, turn)
    }

    pub fn regulate(&mut self, cause: TransitionCause, turn: Turn) -> Option<StateTransition> {
        self.set_state(EmotionalState::Regulated, cause, turn)
    }

    /// Apply a raw trust delta, recording milestone memories and risk flags
    pub fn adjust_trust(&mut self, delta: f32, turn: Turn) -> TrustChange {
        let change = self.trust.adjust(delta);
        for milestone in change.milestones() {
            let (description, impact) = match milestone {
                TrustMilestone::EnteredDeepTrust => ("Came to trust the player deeply", 1.0),
                TrustMilestone::LeftDeepTrust => ("Lost the deep trust it once had", -1.0),
                TrustMilestone::FellBelowZero => ("Stopped trusting the player", -1.0),
            };
            self.remember(MemoryKind::TrustMilestone, description, impact, turn);
        }
        self.refresh_defection_flags();
        change
    }

    /// Trust gain scaled by the personality's gain rate
    pub fn gain_trust(&mut self, amount: f32, turn: Turn) -> TrustChange {
        let rate = self.personality.traits.trust_gain_rate;
        self.adjust_trust(amount.abs() * rate, turn)
    }

    /// Trust loss scaled by the personality's loss rate
    pub fn lose_trust(&mut self, amount: f32, turn: Turn) -> TrustChange {
        let rate = self.personality.traits.trust_loss_rate;
        self.adjust_trust(-amount.abs() * rate, turn)
    }

    pub fn refresh_defection_flags(&mut self) {
        if self.defected {
            self.defection_risk = false;
            self.planning_defection = false;
            return;
        }
        let trust = self.trust.value();
        self.defection_risk = trust <= DEFECTION_RISK_TRUST;
        self.planning_defection = trust <= PLANNING_DEFECTION_TRUST;
    }

    pub fn remember(&mut self, kind: MemoryKind, description: impl Into<String>, impact: f32, turn: Turn) {
        self.memories.record(Memory {
            kind,
            description: description.into(),
            impact,
            turn,
            emotional_state: self.emotional_state,
            trust: self.trust.value(),
        });
    }

    pub fn add_resilience(&mut self, delta: f32) {
        self.resilience = (self.resilience + delta).clamp(0.0, RESILIENCE_MAX);
    }

    /// Resistance used by contagion and storm rolls
    pub fn storm_resistance(&self) -> f32 {
        let bonus = if self.has_breakthrough { 1.0 } else { 0.0 };
        self.personality.traits.storm_resistance + bonus
    }

    /// Switch sides; the piece keeps its square and id
    pub fn defect(&mut self, turn: Turn) {
        self.team = self.team.opposite();
        self.defected = true;
        self.needs_empathy_first = false;
        self.empathy_provided = false;
        self.remember(MemoryKind::Defection, "Left for the other side", -3.0, turn);
        self.refresh_defection_flags();
    }
}
