//! Natural recovery and trust decay for dysregulated pieces

use tracing::debug;

use crate::core::config::SimulationConfig;
use crate::emotion::RoundContext;
use crate::piece::{MemoryKind, Piece, Roster, TransitionCause};

const RECOVERY_TRUST_WEIGHT: f32 = 0.15;
const RECOVERY_PER_TURN: f32 = 0.02;
const RECOVERY_TURN_CAP: u32 = 10;
const RECOVERY_MAX: f32 = 0.5;

/// Per-round chance a dysregulated piece settles on its own
pub fn recovery_chance(piece: &Piece, config: &SimulationConfig) -> f32 {
    let turns = piece.dysregulation_turns.min(RECOVERY_TURN_CAP) as f32;
    let chance = config.natural_recovery_base
        + piece.trust.normalized() * RECOVERY_TRUST_WEIGHT
        + turns * RECOVERY_PER_TURN;
    chance.min(RECOVERY_MAX)
}

/// Count another round dysregulated and bleed trust past the grace period
pub fn decay_trust(roster: &mut Roster, ctx: &mut RoundContext) {
    for piece in roster.iter_mut().filter(|p| p.is_emotional() && !p.is_regulated()) {
        piece.dysregulation_turns += 1;
        if piece.dysregulation_turns > ctx.config.trust_decay_grace_turns {
            piece.lose_trust(ctx.config.trust_decay_per_turn, ctx.turn);
        }
    }
}

pub fn natural_recovery(roster: &mut Roster, ctx: &mut RoundContext) {
    for id in roster.ids() {
        let Some(piece) = roster.get_mut(id) else {
            continue;
        };
        if !piece.is_emotional() || piece.is_regulated() || ctx.changed.contains(&id) {
            continue;
        }
        if !ctx.rng.chance(recovery_chance(piece, ctx.config)) {
            continue;
        }
        let transition = piece.regulate(TransitionCause::NaturalRecovery, ctx.turn);
        if transition.is_some() {
            debug!(piece = %id, "Natural recovery");
            piece.remember(MemoryKind::Recovery, "Found calm again", 0.5, ctx.turn);
            ctx.changed.insert(id);
        }
        ctx.events.transition(piece, transition.as_ref());
    }
}
