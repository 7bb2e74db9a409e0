//! Emotional storms
//!
//! At most one storm is active. It forms after the cooldown, approaches,
//! turns active, peaks and passes, strictly in that order. Pieces are only
//! acted on in the active and peak phases; mitigation is only possible while
//! the storm approaches.

pub mod mitigation;
pub mod trigger;
pub mod types;
pub mod vulnerability;

pub use mitigation::MitigationAction;
pub use trigger::RoundSignals;
pub use types::{StormEffect, StormPhase, StormTrigger, StormType};

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::board::Board;
use crate::core::config::SimulationConfig;
use crate::core::error::RejectReason;
use crate::core::rng::GameRng;
use crate::core::types::{PieceId, Turn};
use crate::emotion::{adjacent_teammates, breakthrough, contagion, RoundContext};
use crate::game::events::{EventLog, GameEvent};
use crate::piece::{MemoryKind, Roster, TransitionCause};

/// Chance of a peak-phase breakthrough for a steady, trusting piece
pub const PEAK_BREAKTHROUGH_CHANCE: f32 = 0.3;
pub const PEAK_BREAKTHROUGH_MAX_VULNERABILITY: f32 = 0.4;
pub const PEAK_BREAKTHROUGH_MIN_TRUST: f32 = 6.0;
/// Resilience for pieces that stay regulated through a whole storm
pub const WEATHERED_RESILIENCE: f32 = 0.05;
const BURST_SCALE: f32 = 0.3;
const SCATTER_RATE: f32 = 0.1;
const DECAY_RATE: f32 = 0.2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveStorm {
    pub kind: StormType,
    pub phase: StormPhase,
    pub turns_in_phase: u32,
    pub intensity: f32,
    pub environmental_modifier: f32,
    /// Product of every successful mitigation factor
    pub mitigation_factor: f32,
    pub vulnerability: BTreeMap<PieceId, f32>,
    pub started_turn: Turn,
    pub trigger: StormTrigger,
    pub mitigations_used: Vec<MitigationAction>,
    pub phases_seen: Vec<StormPhase>,
    /// Pieces that have not dysregulated since the storm formed
    pub stayed_regulated: BTreeSet<PieceId>,
    pub peak_intensity: f32,
}

impl ActiveStorm {
    fn intensity_at(&self, phase: StormPhase) -> f32 {
        self.kind.profile().base_intensity * phase.multiplier() * self.environmental_modifier * self.mitigation_factor
    }

    fn recompute(&mut self) {
        self.intensity = self.intensity_at(self.phase);
        self.peak_intensity = self.peak_intensity.max(self.intensity);
    }

    /// Intensity the storm would reach at its peak with current mitigation
    pub fn projected_peak(&self) -> f32 {
        self.intensity_at(StormPhase::Peak)
    }

    pub fn vulnerability_of(&self, id: PieceId) -> f32 {
        self.vulnerability.get(&id).copied().unwrap_or(vulnerability::MIN_VULNERABILITY)
    }
}

/// Summary of a finished storm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StormRecord {
    pub kind: StormType,
    pub trigger: StormTrigger,
    pub started_turn: Turn,
    pub ended_turn: Turn,
    pub peak_intensity: f32,
    pub phases: Vec<StormPhase>,
    pub mitigations: Vec<MitigationAction>,
    pub prevented: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MitigationResult {
    pub action: MitigationAction,
    pub success: bool,
    pub intensity: f32,
    pub prevented: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StormSystem {
    pub active: Option<ActiveStorm>,
    pub history: VecDeque<StormRecord>,
    pub last_storm_end: Option<Turn>,
}

impl StormSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Option<StormPhase> {
        self.active.as_ref().map(|s| s.phase)
    }

    /// Past the cooldown and no storm running
    pub fn can_trigger(&self, turn: Turn, config: &SimulationConfig) -> bool {
        self.active.is_none() && turn.saturating_sub(self.last_storm_end.unwrap_or(0)) >= config.storm_cooldown_turns
    }

    fn recent_types(&self) -> Vec<StormType> {
        self.history.iter().rev().take(trigger::RECENT_TYPES).map(|r| r.kind).collect()
    }

    /// Roll for a new storm and start it if one forms
    #[allow(clippy::too_many_arguments)]
    pub fn check_trigger(
        &mut self,
        roster: &Roster,
        signals: &RoundSignals,
        team_weights: &BTreeMap<StormType, f32>,
        turn: Turn,
        config: &SimulationConfig,
        rng: &mut dyn GameRng,
        events: &mut EventLog,
    ) -> Option<StormType> {
        if !self.can_trigger(turn, config) {
            return None;
        }
        let (kind, cause) = trigger::roll(roster, signals, team_weights, &self.recent_types(), config, rng)?;
        self.begin(kind, cause, roster, turn, config, events);
        Some(kind)
    }

    /// Start a storm in its approaching phase
    pub fn begin(
        &mut self,
        kind: StormType,
        cause: StormTrigger,
        roster: &Roster,
        turn: Turn,
        config: &SimulationConfig,
        events: &mut EventLog,
    ) {
        let mut storm = ActiveStorm {
            kind,
            phase: StormPhase::Approaching,
            turns_in_phase: 0,
            intensity: 0.0,
            environmental_modifier: vulnerability::environmental_modifier(roster, &self.history, turn),
            mitigation_factor: 1.0,
            vulnerability: vulnerability::compute_all(kind, roster, turn, config.recent_trauma_window),
            started_turn: turn,
            trigger: cause,
            mitigations_used: Vec::new(),
            phases_seen: vec![StormPhase::Approaching],
            stayed_regulated: roster
                .iter()
                .filter(|p| p.is_emotional() && p.is_regulated())
                .map(|p| p.id)
                .collect(),
            peak_intensity: 0.0,
        };
        storm.recompute();
        info!(
            storm = kind.label(),
            trigger = ?cause,
            intensity = storm.intensity,
            environment = storm.environmental_modifier,
            "Storm approaching"
        );
        events.push(GameEvent::StormPhaseChanged {
            turn,
            storm: kind,
            from: None,
            to: Some(StormPhase::Approaching),
            intensity: storm.intensity,
        });
        self.active = Some(storm);
    }

    /// One round of storm activity, then phase bookkeeping
    pub fn tick(&mut self, board: &Board, roster: &mut Roster, ctx: &mut RoundContext) {
        let Some(storm) = self.active.as_mut() else {
            return;
        };
        if storm.phase.is_turbulent() {
            apply_turbulence(storm, board, roster, ctx);
        }
        storm
            .stayed_regulated
            .retain(|id| roster.get(*id).map(|p| p.is_emotional() && p.is_regulated()).unwrap_or(false));

        storm.turns_in_phase += 1;
        if storm.turns_in_phase < storm.phase.duration(&ctx.config.storm_phase_durations) {
            return;
        }
        let from = storm.phase;
        match from.next() {
            Some(next) => {
                storm.phase = next;
                storm.turns_in_phase = 0;
                storm.phases_seen.push(next);
                storm.recompute();
                debug!(storm = storm.kind.label(), phase = ?next, intensity = storm.intensity, "Storm phase changed");
                ctx.events.push(GameEvent::StormPhaseChanged {
                    turn: ctx.turn,
                    storm: storm.kind,
                    from: Some(from),
                    to: Some(next),
                    intensity: storm.intensity,
                });
            }
            None => self.end(roster, ctx.turn, false, ctx.config, ctx.events),
        }
    }

    /// Finish the active storm by any path
    pub fn end(&mut self, roster: &mut Roster, turn: Turn, prevented: bool, config: &SimulationConfig, events: &mut EventLog) {
        let Some(storm) = self.active.take() else {
            return;
        };
        for id in &storm.stayed_regulated {
            if let Some(piece) = roster.get_mut(*id) {
                if piece.is_emotional() && piece.is_regulated() {
                    piece.add_resilience(WEATHERED_RESILIENCE);
                    piece.remember(
                        MemoryKind::StormWeathered,
                        format!("Weathered the {} storm", storm.kind.label()),
                        0.5,
                        turn,
                    );
                }
            }
        }
        info!(storm = storm.kind.label(), prevented, peak = storm.peak_intensity, "Storm ended");
        events.push(GameEvent::StormPhaseChanged {
            turn,
            storm: storm.kind,
            from: Some(storm.phase),
            to: None,
            intensity: storm.intensity,
        });

        self.history.push_back(StormRecord {
            kind: storm.kind,
            trigger: storm.trigger,
            started_turn: storm.started_turn,
            ended_turn: turn,
            peak_intensity: storm.peak_intensity,
            phases: storm.phases_seen,
            mitigations: storm.mitigations_used,
            prevented,
        });
        while self.history.len() > config.storm_history_len {
            self.history.pop_front();
        }
        self.last_storm_end = Some(turn);
    }

    /// Actions the team could attempt right now
    pub fn available_mitigations(&self, board: &Board, roster: &Roster) -> Vec<MitigationAction> {
        let Some(storm) = &self.active else {
            return Vec::new();
        };
        if storm.phase != StormPhase::Approaching {
            return Vec::new();
        }
        MitigationAction::ALL
            .into_iter()
            .filter(|a| !storm.mitigations_used.contains(a) && a.is_available(board, roster))
            .collect()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn mitigate(
        &mut self,
        action: MitigationAction,
        board: &Board,
        roster: &mut Roster,
        turn: Turn,
        config: &SimulationConfig,
        rng: &mut dyn GameRng,
        events: &mut EventLog,
    ) -> Result<MitigationResult, RejectReason> {
        let storm = match self.active.as_mut() {
            Some(s) if s.phase == StormPhase::Approaching => s,
            _ => return Err(RejectReason::StormNotMitigatable),
        };
        if storm.mitigations_used.contains(&action) || !action.is_available(board, roster) {
            return Err(RejectReason::MitigationUnavailable);
        }
        storm.mitigations_used.push(action);

        let success = rng.chance(action.success_chance());
        if success {
            storm.mitigation_factor *= action.factor();
            storm.recompute();
        }
        let prevented = success && storm.projected_peak() < config.storm_prevention_threshold;
        let result = MitigationResult {
            action,
            success,
            intensity: storm.intensity,
            prevented,
        };
        let kind = storm.kind;
        info!(storm = kind.label(), ?action, success, prevented, "Storm mitigation");
        events.push(GameEvent::StormMitigated {
            turn,
            storm: kind,
            action,
            success,
            intensity: result.intensity,
            prevented,
        });

        if prevented {
            for piece in roster.iter_mut().filter(|p| p.is_emotional()) {
                piece.adjust_trust(mitigation::PREVENTION_TRUST, turn);
                piece.add_resilience(mitigation::PREVENTION_RESILIENCE);
            }
            self.end(roster, turn, true, config, events);
        }
        Ok(result)
    }
}

fn apply_turbulence(storm: &mut ActiveStorm, board: &Board, roster: &mut Roster, ctx: &mut RoundContext) {
    let profile = storm.kind.profile();
    let intensity = storm.intensity;
    let at_peak = storm.phase == StormPhase::Peak;

    for id in roster.ids() {
        let vulnerability = storm.vulnerability_of(id);
        let Some(piece) = roster.get_mut(id) else {
            continue;
        };
        if !piece.is_emotional() {
            continue;
        }
        piece.lose_trust(profile.trust_delta * intensity, ctx.turn);

        if piece.is_regulated() && !ctx.changed.contains(&id) {
            let chance = profile.dysregulation_chance * vulnerability * intensity;
            if ctx.rng.chance(chance) {
                let transition = piece.dysregulate(profile.induces, TransitionCause::Storm, ctx.turn);
                if transition.is_some() {
                    debug!(piece = %id, storm = profile.name, "Storm dysregulated piece");
                    ctx.changed.insert(id);
                }
                ctx.events.transition(piece, transition.as_ref());
            }
        }

        if at_peak
            && !piece.has_breakthrough
            && vulnerability < PEAK_BREAKTHROUGH_MAX_VULNERABILITY
            && piece.trust.value() > PEAK_BREAKTHROUGH_MIN_TRUST
            && ctx.rng.chance(PEAK_BREAKTHROUGH_CHANCE)
        {
            breakthrough::achieve(roster, id, ctx.turn, ctx.events);
        }
    }

    match profile.effect {
        StormEffect::ContagionBurst => {
            let sources: Vec<_> = roster
                .iter()
                .filter(|p| p.is_emotional())
                .filter_map(|p| Some((p.id, p.emotional_state.kind()?, p.position?, p.team)))
                .collect();
            for (source, kind, pos, team) in sources {
                for target in adjacent_teammates(board, roster, pos, team) {
                    contagion::try_infect(roster, source, kind, target, BURST_SCALE * intensity, ctx);
                }
            }
        }
        StormEffect::RelationshipScatter => {
            let factor = 1.0 - SCATTER_RATE * intensity;
            for piece in roster.iter_mut().filter(|p| p.is_emotional()) {
                piece.relationships.scale_all(factor);
            }
        }
        StormEffect::ConnectionDecay => {
            let mut decays = Vec::new();
            for piece in roster.iter().filter(|p| p.is_emotional()) {
                let Some(pos) = piece.position else {
                    continue;
                };
                let near = adjacent_teammates(board, roster, pos, piece.team);
                for (other, _) in piece.relationships.iter() {
                    let teammate = roster.get(other).map(|o| o.team == piece.team && o.is_active()).unwrap_or(false);
                    if teammate && !near.contains(&other) {
                        decays.push((piece.id, other));
                    }
                }
            }
            for (id, other) in decays {
                if let Some(piece) = roster.get_mut(id) {
                    piece.relationships.adjust(other, -DECAY_RATE * intensity);
                }
            }
        }
    }
}
