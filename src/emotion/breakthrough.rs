//! Breakthroughs: permanent upgrades for pieces that found their footing

use tracing::info;

use crate::core::types::{PieceId, Turn};
use crate::emotion::RoundContext;
use crate::game::events::{EventLog, GameEvent};
use crate::piece::relationships::STRONG_BOND;
use crate::piece::{MemoryKind, Roster, TransitionCause};

pub const BREAKTHROUGH_RESILIENCE: f32 = 0.3;
pub const BREAKTHROUGH_TRUST: f32 = 1.0;
/// Trust granted to teammates bonded to the piece
pub const INSPIRATION_TRUST: f32 = 0.5;

/// Grant a breakthrough to `id`; false if it already has one or is gone
pub fn achieve(roster: &mut Roster, id: PieceId, turn: Turn, events: &mut EventLog) -> bool {
    let Some(piece) = roster.get_mut(id) else {
        return false;
    };
    if piece.has_breakthrough || !piece.is_emotional() {
        return false;
    }
    piece.has_breakthrough = true;
    piece.breakthrough_ready = false;
    piece.add_resilience(BREAKTHROUGH_RESILIENCE);
    piece.adjust_trust(BREAKTHROUGH_TRUST, turn);
    let transition = piece.regulate(TransitionCause::Breakthrough, turn);
    events.transition(piece, transition.as_ref());
    piece.remember(MemoryKind::Breakthrough, "Broke through", 3.0, turn);
    let name = piece.name.clone();
    let team = piece.team;

    let mut inspired = Vec::new();
    for mate in roster.iter_mut() {
        if mate.id == id || mate.team != team || !mate.is_emotional() {
            continue;
        }
        if mate.relationships.toward(id) > STRONG_BOND {
            mate.adjust_trust(INSPIRATION_TRUST, turn);
            mate.remember(MemoryKind::Inspired, format!("Inspired by {}", name), 1.0, turn);
            inspired.push(mate.id);
        }
    }

    info!(piece = %id, name = %name, inspired = inspired.len(), "Breakthrough");
    events.push(GameEvent::Breakthrough {
        turn,
        piece: id,
        name,
        inspired,
    });
    true
}

/// Ready pieces break through once they are regulated at round end
pub fn process_ready(roster: &mut Roster, ctx: &mut RoundContext) -> Vec<PieceId> {
    let ready: Vec<PieceId> = roster
        .iter()
        .filter(|p| p.is_emotional() && p.breakthrough_ready && !p.has_breakthrough && p.is_regulated())
        .map(|p| p.id)
        .collect();
    let mut achieved = Vec::new();
    for id in ready {
        if achieve(roster, id, ctx.turn, ctx.events) {
            achieved.push(id);
        }
    }
    achieved
}
