//! Forced defection at the trust floor

use tracing::info;

use crate::core::types::{PieceId, Team, Turn};
use crate::game::events::{EventLog, GameEvent};
use crate::piece::{MemoryKind, Roster};

/// Flat trust hit for every surviving teammate of a defector
pub const WITNESS_TRUST_PENALTY: f32 = 1.0;
/// Relationship every former teammate holds toward the defector afterwards
pub const BETRAYAL_RELATIONSHIP: f32 = -5.0;

/// Flip every emotional piece sitting at the trust floor
///
/// Witness penalties can push another piece to the floor, so the check
/// repeats until nothing changes.
pub fn check(roster: &mut Roster, turn: Turn, events: &mut EventLog) -> Vec<PieceId> {
    let mut defected = Vec::new();
    loop {
        let Some(id) = roster
            .iter()
            .find(|p| p.is_emotional() && p.trust.at_defection_floor())
            .map(|p| p.id)
        else {
            break;
        };
        defect(roster, id, turn, events);
        defected.push(id);
    }
    defected
}

fn defect(roster: &mut Roster, id: PieceId, turn: Turn, events: &mut EventLog) {
    let Some(piece) = roster.get_mut(id) else {
        return;
    };
    piece.defect(turn);
    let name = piece.name.clone();
    let trust = piece.trust.value();
    info!(piece = %id, name = %name, trust, "Piece defected");

    for mate in roster.iter_mut() {
        if mate.id == id || mate.team != Team::Player || !mate.is_active() {
            continue;
        }
        mate.adjust_trust(-WITNESS_TRUST_PENALTY, turn);
        mate.relationships.set(id, BETRAYAL_RELATIONSHIP);
        mate.remember(MemoryKind::WitnessedDefection, format!("Watched {} walk away", name), -2.0, turn);
    }

    events.push(GameEvent::Defection {
        turn,
        piece: id,
        name,
        trust,
    });
}
