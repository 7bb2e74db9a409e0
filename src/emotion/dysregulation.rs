//! Dysregulation assignment
//!
//! The kind is always drawn from the piece's own tendency weights.

use tracing::debug;

use crate::core::config::SimulationConfig;
use crate::core::rng::GameRng;
use crate::core::types::Turn;
use crate::emotion::RoundContext;
use crate::piece::{DysregulationKind, Piece, Roster, StateTransition, TransitionCause};

/// Trust below this makes random dysregulation more likely
pub const LOW_TRUST_BAND: f32 = 3.0;
/// Trust above this makes random dysregulation less likely
pub const HIGH_TRUST_BAND: f32 = 7.0;

/// Fraction of anxiety tendency rolled as promotion anxiety
pub const PROMOTION_ANXIETY_FACTOR: f32 = 0.4;

pub fn choose_kind(piece: &Piece, rng: &mut dyn GameRng) -> DysregulationKind {
    piece.personality.dysregulation_weights().choose(rng)
}

/// Dysregulate with a personality-weighted kind
pub fn dysregulate_weighted(
    piece: &mut Piece,
    cause: TransitionCause,
    turn: Turn,
    rng: &mut dyn GameRng,
) -> Option<StateTransition> {
    let kind = choose_kind(piece, rng);
    piece.dysregulate(kind, cause, turn)
}

/// Per-round chance that a regulated piece dysregulates unprompted
pub fn random_chance(piece: &Piece, config: &SimulationConfig) -> f32 {
    let mut chance = config.random_dysregulation_chance * piece.personality.traits.anxiety_tendency * 2.0;
    let trust = piece.trust.value();
    if trust < LOW_TRUST_BAND {
        chance *= 1.5;
    } else if trust > HIGH_TRUST_BAND {
        chance *= 0.5;
    }
    chance.clamp(0.0, 1.0)
}

pub fn random_checks(roster: &mut Roster, ctx: &mut RoundContext) {
    for id in roster.ids() {
        let Some(piece) = roster.get_mut(id) else {
            continue;
        };
        if !piece.is_emotional() || !piece.is_regulated() || ctx.changed.contains(&id) {
            continue;
        }
        if !ctx.rng.chance(random_chance(piece, ctx.config)) {
            continue;
        }
        let transition = dysregulate_weighted(piece, TransitionCause::RandomCheck, ctx.turn, ctx.rng);
        if let Some(t) = &transition {
            debug!(piece = %id, to = t.to.label(), "Random dysregulation");
            ctx.changed.insert(id);
        }
        ctx.events.transition(piece, transition.as_ref());
    }
}

/// Roll promotion anxiety for a freshly crowned piece
///
/// Promotion itself has already happened; this only affects the mood.
pub fn promotion_anxiety(piece: &mut Piece, turn: Turn, rng: &mut dyn GameRng) -> Option<StateTransition> {
    if !piece.is_emotional() {
        return None;
    }
    piece.remember(crate::piece::MemoryKind::Promotion, "Crowned on the far row", 1.0, turn);
    if !piece.is_regulated() {
        return None;
    }
    let chance = piece.personality.traits.anxiety_tendency * PROMOTION_ANXIETY_FACTOR;
    if rng.chance(chance) {
        piece.dysregulate(DysregulationKind::Anxious, TransitionCause::PromotionAnxiety, turn)
    } else {
        None
    }
}
