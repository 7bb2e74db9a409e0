//! Prediction and resolution of empathy commands
//!
//! One roll decides the outcome band; follow-up rolls (regulation, state
//! switch, susceptibility) are drawn only on the branch that needs them, so
//! a scripted sequence maps to a fixed outcome.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::error::RejectReason;
use crate::core::rng::GameRng;
use crate::core::types::{PieceId, Turn};
use crate::empathy::catalog::{self, CommandId, EmpathyCommand};
use crate::empathy::combos::{self, ComboEffect, ComboId, ComboTracker};
use crate::empathy::history::{EmpathyHistory, InteractionRecord};
use crate::piece::{EmotionalState, MemoryKind, Piece, StateTransition, TransitionCause};

pub const MAX_OPTIONS: usize = 4;
pub const MIN_SUCCESS: f32 = 0.1;
pub const MAX_SUCCESS: f32 = 0.95;

/// Fraction of the success threshold that counts as a critical success
pub const CRITICAL_SUCCESS_BAND: f32 = 0.3;
/// Rolls above this are critical failures
pub const CRITICAL_FAILURE_ROLL: f32 = 0.95;

const PREFERRED_MULTIPLIER: f32 = 1.25;
const AVOIDED_MULTIPLIER: f32 = 0.7;
const FATIGUE_TURNS: u32 = 5;
const FATIGUE_MULTIPLIER: f32 = 0.8;

const CRITICAL_SUCCESS_TRUST: f32 = 2.5;
const SUCCESS_TRUST: f32 = 1.0;
const FAILURE_TRUST: f32 = 0.5;
const CRITICAL_FAILURE_TRUST: f32 = 2.0;
const SUCCESS_REGULATE_CHANCE: f32 = 0.7;
const CRITICAL_FAILURE_SWITCH_CHANCE: f32 = 0.5;
const FAILURE_SUSCEPTIBLE_CHANCE: f32 = 0.15;
const CRITICAL_SUCCESS_RESILIENCE: f32 = 0.1;
/// Trust at which a critical success readies a breakthrough
pub const BREAKTHROUGH_READY_TRUST: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    CriticalSuccess,
    Success,
    Failure,
    CriticalFailure,
}

impl Outcome {
    /// Classify a roll against a success threshold
    pub fn classify(roll: f32, threshold: f32) -> Outcome {
        if roll < threshold * CRITICAL_SUCCESS_BAND {
            Outcome::CriticalSuccess
        } else if roll < threshold {
            Outcome::Success
        } else if roll > CRITICAL_FAILURE_ROLL {
            Outcome::CriticalFailure
        } else {
            Outcome::Failure
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::CriticalSuccess | Outcome::Success)
    }

    pub fn is_critical(&self) -> bool {
        matches!(self, Outcome::CriticalSuccess | Outcome::CriticalFailure)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CommandOption {
    pub command: CommandId,
    pub label: &'static str,
    pub predicted_success: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub piece: PieceId,
    pub command: CommandId,
    pub outcome: Outcome,
    pub roll: f32,
    pub threshold: f32,
    pub initial_state: EmotionalState,
    pub final_state: EmotionalState,
    pub initial_trust: f32,
    pub final_trust: f32,
    pub combo: Option<ComboId>,
    pub transitions: Vec<StateTransition>,
    /// The piece may move this turn
    pub empathy_provided: bool,
}

/// Owns the interaction history and combo progress for a match
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmpathySystem {
    pub history: EmpathyHistory,
    pub combos: ComboTracker,
}

impl EmpathySystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Predicted success probability of `command` on `piece`
    pub fn predict(&self, piece: &Piece, command: &EmpathyCommand) -> f32 {
        let mut p = command.effectiveness(piece.emotional_state);

        if piece.personality.prefers(command.tags) {
            p *= PREFERRED_MULTIPLIER;
        }
        if piece.personality.avoids(command.tags) {
            p *= AVOIDED_MULTIPLIER;
        }

        p *= 0.25 + piece.trust.normalized() * 0.75;
        p *= self.history.pattern_multiplier(piece.id, command.id);
        if piece.dysregulation_turns > FATIGUE_TURNS {
            p *= FATIGUE_MULTIPLIER;
        }
        p *= self.history.adaptive_multiplier();

        p.clamp(MIN_SUCCESS, MAX_SUCCESS)
    }

    /// Up to four commands for the piece's current state, best first
    pub fn options(&self, piece: &Piece) -> Vec<CommandOption> {
        let mut options: Vec<CommandOption> = catalog::available(piece.emotional_state)
            .map(|c| CommandOption {
                command: c.id,
                label: c.label,
                predicted_success: self.predict(piece, c),
            })
            .collect();
        options.sort_by_key(|o| std::cmp::Reverse(OrderedFloat(o.predicted_success)));
        options.truncate(MAX_OPTIONS);
        options
    }

    /// Resolve a command against a piece
    ///
    /// Mutates only the piece and this system. Defection and events are the
    /// caller's concern.
    pub fn resolve(
        &mut self,
        piece: &mut Piece,
        command_id: CommandId,
        turn: Turn,
        rng: &mut dyn GameRng,
    ) -> Result<Resolution, RejectReason> {
        let command = catalog::command(command_id);
        if !command.available_for(piece.emotional_state) {
            return Err(RejectReason::UnknownCommand);
        }

        let initial_state = piece.emotional_state;
        let initial_trust = piece.trust.value();
        let threshold = self.predict(piece, command);
        let roll = rng.roll();
        let outcome = Outcome::classify(roll, threshold);
        let mut transitions = Vec::new();

        match outcome {
            Outcome::CriticalSuccess => {
                piece.gain_trust(CRITICAL_SUCCESS_TRUST, turn);
                transitions.extend(piece.regulate(TransitionCause::EmpathySuccess, turn));
                piece.add_resilience(CRITICAL_SUCCESS_RESILIENCE);
                piece.contagion_susceptible = false;
                if piece.trust.value() >= BREAKTHROUGH_READY_TRUST && !piece.has_breakthrough {
                    piece.breakthrough_ready = true;
                }
                piece.remember(
                    MemoryKind::CriticalSuccess,
                    format!("{} reached me", command.label),
                    2.0,
                    turn,
                );
            }
            Outcome::Success => {
                piece.gain_trust(SUCCESS_TRUST, turn);
                if rng.chance(SUCCESS_REGULATE_CHANCE) {
                    transitions.extend(piece.regulate(TransitionCause::EmpathySuccess, turn));
                }
                piece.contagion_susceptible = false;
                piece.remember(MemoryKind::EmpathySuccess, format!("{} helped", command.label), 1.0, turn);
            }
            Outcome::Failure => {
                piece.lose_trust(FAILURE_TRUST, turn);
                if !piece.is_regulated() {
                    piece.dysregulation_turns += 1;
                }
                if rng.chance(FAILURE_SUSCEPTIBLE_CHANCE) {
                    piece.contagion_susceptible = true;
                }
                piece.remember(
                    MemoryKind::EmpathyFailure,
                    format!("{} did not land", command.label),
                    -0.5,
                    turn,
                );
            }
            Outcome::CriticalFailure => {
                piece.lose_trust(CRITICAL_FAILURE_TRUST, turn);
                if rng.chance(CRITICAL_FAILURE_SWITCH_CHANCE) {
                    let mut weights = piece.personality.dysregulation_weights().as_array();
                    if let Some(current) = piece.emotional_state.kind() {
                        weights[current.index()] = 0.0;
                    }
                    if let Some(i) = rng.weighted_index(&weights) {
                        let kind = crate::piece::DysregulationKind::ALL[i];
                        transitions.extend(piece.dysregulate(kind, TransitionCause::EmpathyCriticalFailure, turn));
                    }
                }
                piece.remember(
                    MemoryKind::CriticalFailure,
                    format!("{} made it worse", command.label),
                    -2.0,
                    turn,
                );
            }
        }

        let mut combo_done = None;
        if outcome == Outcome::CriticalFailure {
            self.combos.reset(piece.id);
        } else if let Some(id) = self.combos.advance(piece.id, initial_state.kind(), command_id) {
            let c = combos::combo(id);
            piece.gain_trust(c.trust_bonus, turn);
            match c.effect {
                ComboEffect::Regulate => {
                    transitions.extend(piece.regulate(TransitionCause::Combo, turn));
                }
                ComboEffect::Strengthen(amount) => piece.add_resilience(amount),
                ComboEffect::Shield => {
                    transitions.extend(piece.regulate(TransitionCause::Combo, turn));
                    piece.contagion_susceptible = false;
                }
            }
            piece.remember(MemoryKind::Combo, c.name, 1.5, turn);
            combo_done = Some(id);
        }

        let empathy_provided = outcome.is_success()
            || (outcome == Outcome::Failure && command.moves_anyway)
            || combo_done.is_some();
        if empathy_provided {
            piece.empathy_provided = true;
        }

        let resolution = Resolution {
            piece: piece.id,
            command: command_id,
            outcome,
            roll,
            threshold,
            initial_state,
            final_state: piece.emotional_state,
            initial_trust,
            final_trust: piece.trust.value(),
            combo: combo_done,
            transitions,
            empathy_provided,
        };

        self.history.record(InteractionRecord {
            turn,
            piece: piece.id,
            command: command_id,
            initial_state,
            final_state: resolution.final_state,
            initial_trust,
            final_trust: resolution.final_trust,
            outcome,
        });

        debug!(
            piece = %piece.id,
            command = ?command_id,
            outcome = ?outcome,
            roll,
            threshold,
            trust = resolution.final_trust,
            "Empathy resolved"
        );
        Ok(resolution)
    }
}
