//! Proximity bonding between adjacent teammates

use crate::board::Board;
use crate::emotion::{adjacent_teammates, RoundContext};
use crate::piece::relationships::STRONG_BOND;
use crate::piece::{MemoryKind, Roster};

/// Bond gain multiplier when both pieces share the same dysregulated state
pub const SHARED_STATE_MULTIPLIER: f32 = 2.0;

/// Each piece updates its own view of every adjacent teammate
pub fn apply(board: &Board, roster: &mut Roster, ctx: &mut RoundContext) {
    let mut updates = Vec::new();
    for piece in roster.iter().filter(|p| p.is_emotional()) {
        let Some(pos) = piece.position else {
            continue;
        };
        let neighbors: Vec<_> = adjacent_teammates(board, roster, pos, piece.team)
            .into_iter()
            .filter_map(|id| roster.get(id))
            .filter(|n| n.is_emotional())
            .collect();

        let mut regulated_company = false;
        for n in &neighbors {
            let shared = !piece.is_regulated() && piece.emotional_state == n.emotional_state;
            let mut gain = ctx.config.proximity_relationship_gain * (0.5 + piece.personality.traits.sociability);
            if shared {
                gain *= SHARED_STATE_MULTIPLIER;
            }
            updates.push((piece.id, Some(n.id), gain));
            regulated_company |= n.is_regulated();
        }
        if piece.is_regulated() && regulated_company {
            updates.push((piece.id, None, ctx.config.proximity_trust_gain));
        }
    }

    for (id, other, amount) in updates {
        let Some(piece) = roster.get_mut(id) else {
            continue;
        };
        match other {
            Some(other) => {
                let before = piece.relationships.toward(other);
                let after = piece.relationships.adjust(other, amount);
                if before <= STRONG_BOND && after > STRONG_BOND {
                    piece.remember(MemoryKind::Bonding, format!("Grew close to {}", other), 0.5, ctx.turn);
                }
            }
            None => {
                piece.gain_trust(amount, ctx.turn);
            }
        }
    }
}
