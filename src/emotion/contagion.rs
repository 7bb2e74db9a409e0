//! Emotional contagion between adjacent teammates
//!
//! Sources are the pieces dysregulated when the pass starts. A piece infected
//! during the pass does not spread further until the next round.

use tracing::debug;

use crate::board::Board;
use crate::core::config::SimulationConfig;
use crate::core::rng::GameRng;
use crate::core::types::PieceId;
use crate::emotion::{adjacent_teammates, RoundContext};
use crate::piece::emotion::{susceptibility, StateSet, Susceptibility};
use crate::piece::relationships::{STRAINED_BOND, STRONG_BOND};
use crate::piece::{DysregulationKind, Piece, Roster, TransitionCause};

/// Only regulated pieces can catch a state
pub const CONTAGION_TARGETS: StateSet = StateSet::EMPTY.with_regulated();

const STRONG_BOND_BONUS: f32 = 0.2;
const STRAINED_BOND_PENALTY: f32 = 0.1;
const HIGH_TRUST: f32 = 7.0;
const HIGH_TRUST_PENALTY: f32 = 0.3;
const LOW_TRUST: f32 = 3.0;
const LOW_TRUST_BONUS: f32 = 0.2;
const SUSCEPTIBLE_BONUS: f32 = 0.1;
const RESISTANCE_FACTOR: f32 = 0.05;

/// How a source state reappears in the piece that catches it
pub fn transform(kind: DysregulationKind) -> [(DysregulationKind, f32); 2] {
    use DysregulationKind::*;
    match kind {
        Anxious => [(Anxious, 0.7), (Freeze, 0.3)],
        Fight => [(Fight, 0.6), (Anxious, 0.4)],
        Shutdown => [(Shutdown, 0.6), (Freeze, 0.4)],
        Freeze => [(Freeze, 0.5), (Shutdown, 0.5)],
        Fawn => [(Fawn, 0.6), (Anxious, 0.4)],
    }
}

pub fn transformed_kind(source: DysregulationKind, rng: &mut dyn GameRng) -> DysregulationKind {
    let table = transform(source);
    let weights = [table[0].1, table[1].1];
    rng.weighted_index(&weights)
        .map(|i| table[i].0)
        .unwrap_or(source)
}

/// Probability that `neighbor` catches the state of `source`
pub fn chance(source: PieceId, neighbor: &Piece, config: &SimulationConfig) -> f32 {
    if susceptibility(neighbor.emotional_state, CONTAGION_TARGETS, StateSet::EMPTY) != Susceptibility::Vulnerable {
        return 0.0;
    }

    let mut p = config.contagion_base_chance;

    let bond = neighbor.relationships.toward(source);
    if bond > STRONG_BOND {
        p += STRONG_BOND_BONUS;
    } else if bond < STRAINED_BOND {
        p -= STRAINED_BOND_PENALTY;
    }

    let trust = neighbor.trust.value();
    if trust > HIGH_TRUST {
        p -= HIGH_TRUST_PENALTY;
    } else if trust < LOW_TRUST {
        p += LOW_TRUST_BONUS;
    }

    if neighbor.contagion_susceptible {
        p += SUSCEPTIBLE_BONUS;
    }
    p -= neighbor.storm_resistance() * RESISTANCE_FACTOR;

    p.clamp(0.0, config.contagion_max_chance)
}

/// Try to pass `source`'s state to one neighbour
///
/// Returns true if the neighbour changed.
pub fn try_infect(
    roster: &mut Roster,
    source: PieceId,
    kind: DysregulationKind,
    target: PieceId,
    probability_scale: f32,
    ctx: &mut RoundContext,
) -> bool {
    if ctx.changed.contains(&target) {
        return false;
    }
    let Some(neighbor) = roster.get_mut(target) else {
        return false;
    };
    if !neighbor.is_emotional() {
        return false;
    }
    let p = chance(source, neighbor, ctx.config) * probability_scale;
    if p <= 0.0 || !ctx.rng.chance(p) {
        return false;
    }
    let caught = transformed_kind(kind, ctx.rng);
    let transition = neighbor.dysregulate(caught, TransitionCause::Contagion, ctx.turn);
    ctx.events.transition(neighbor, transition.as_ref());
    if transition.is_some() {
        debug!(source = %source, target = %target, kind = caught.label(), "Contagion spread");
        ctx.changed.insert(target);
        true
    } else {
        false
    }
}

/// One contagion pass over the whole team
pub fn spread(board: &Board, roster: &mut Roster, ctx: &mut RoundContext) -> usize {
    let sources: Vec<(PieceId, DysregulationKind)> = roster
        .iter()
        .filter(|p| p.is_emotional() && !ctx.changed.contains(&p.id))
        .filter_map(|p| p.emotional_state.kind().map(|k| (p.id, k)))
        .collect();

    let mut infected = 0;
    for (source, kind) in sources {
        let Some((pos, team)) = roster.get(source).and_then(|p| p.position.map(|pos| (pos, p.team))) else {
            continue;
        };
        for target in adjacent_teammates(board, roster, pos, team) {
            if try_infect(roster, source, kind, target, 1.0, ctx) {
                infected += 1;
            }
        }
    }
    infected
}
