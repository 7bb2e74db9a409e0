//! Simulation configuration with documented constants
//!
//! Tunables for the emotional layer live here. Thresholds that define the
//! rules themselves (trust bounds, defection floor, contagion modifiers) are
//! constants next to the code that applies them.

use serde::{Deserialize, Serialize};

use crate::core::types::Turn;

/// Number of turns each storm phase lasts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseDurations {
    pub approaching: u32,
    pub active: u32,
    pub peak: u32,
    pub passing: u32,
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self {
            approaching: 2,
            active: 3,
            peak: 2,
            passing: 2,
        }
    }
}

/// Configuration for a single match
///
/// Owned by the match state and saved with it, so a restored match computes
/// the same probabilities as the original.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    // === RULES ===
    /// Exclude non-capture moves whenever a capture exists for the side to move
    pub forced_capture: bool,

    /// Turns before the match is declared a draw
    pub max_turns: Turn,

    // === PIECE MODEL ===
    /// Maximum memories kept per piece
    ///
    /// When full, the oldest unimportant memory is dropped first.
    pub memory_capacity: usize,

    /// How many turns a trauma memory counts as "recent"
    ///
    /// Recent trauma raises storm vulnerability.
    pub recent_trauma_window: Turn,

    // === EMOTIONAL ENGINE ===
    /// Base contagion probability before relationship/trust adjustments
    pub contagion_base_chance: f32,

    /// Ceiling for a single contagion roll
    pub contagion_max_chance: f32,

    /// Per-turn chance that a regulated piece dysregulates on its own
    ///
    /// Scaled by the piece's anxiety tendency and trust band.
    pub random_dysregulation_chance: f32,

    /// Base per-turn chance that a dysregulated piece recovers unaided
    pub natural_recovery_base: f32,

    /// Trust lost each turn once a piece has stayed dysregulated past the grace period
    pub trust_decay_per_turn: f32,

    /// Turns a piece may stay dysregulated before trust starts to decay
    pub trust_decay_grace_turns: u32,

    /// Relationship gained per turn between adjacent teammates
    ///
    /// Doubled when both share the same non-regulated state.
    pub proximity_relationship_gain: f32,

    /// Trust gained per turn by regulated pieces with a regulated neighbour
    pub proximity_trust_gain: f32,

    /// Squares within which a capture is witnessed by teammates
    pub witness_radius: u8,

    // === STORMS ===
    /// Minimum turns between the end of one storm and the next trigger check
    pub storm_cooldown_turns: Turn,

    /// Base per-turn storm probability before team-state scaling
    pub storm_base_chance: f32,

    /// Ceiling for the scaled storm probability
    pub storm_max_chance: f32,

    /// Duration of each storm phase
    pub storm_phase_durations: PhaseDurations,

    /// Intensity below which a mitigated storm is prevented entirely
    pub storm_prevention_threshold: f32,

    /// Storm records kept for recency weighting
    pub storm_history_len: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            forced_capture: true,
            max_turns: 150,

            memory_capacity: 20,
            recent_trauma_window: 5,

            contagion_base_chance: 0.5,
            contagion_max_chance: 0.8,
            random_dysregulation_chance: 0.04,
            natural_recovery_base: 0.05,
            trust_decay_per_turn: 0.1,
            trust_decay_grace_turns: 3,
            proximity_relationship_gain: 0.2,
            proximity_trust_gain: 0.05,
            witness_radius: 2,

            storm_cooldown_turns: 10,
            storm_base_chance: 0.10,
            storm_max_chance: 0.5,
            storm_phase_durations: PhaseDurations::default(),
            storm_prevention_threshold: 0.3,
            storm_history_len: 10,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.memory_capacity == 0 {
            return Err("memory_capacity must be at least 1".into());
        }

        if !(0.0..=1.0).contains(&self.contagion_base_chance)
            || !(0.0..=1.0).contains(&self.contagion_max_chance)
        {
            return Err("contagion chances must be within [0, 1]".into());
        }

        if self.contagion_base_chance > self.contagion_max_chance {
            return Err(format!(
                "contagion_base_chance ({}) should be <= contagion_max_chance ({})",
                self.contagion_base_chance, self.contagion_max_chance
            ));
        }

        if self.storm_base_chance > self.storm_max_chance {
            return Err(format!(
                "storm_base_chance ({}) should be <= storm_max_chance ({})",
                self.storm_base_chance, self.storm_max_chance
            ));
        }

        let d = &self.storm_phase_durations;
        if d.approaching == 0 || d.active == 0 || d.peak == 0 || d.passing == 0 {
            return Err("storm phases must last at least one turn".into());
        }

        if self.max_turns == 0 {
            return Err("max_turns must be positive".into());
        }

        Ok(())
    }
}
