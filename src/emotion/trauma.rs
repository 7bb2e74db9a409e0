//! Witnessed captures and post-traumatic growth

use tracing::debug;

use crate::board::Board;
use crate::core::types::{PieceId, Position};
use crate::emotion::dysregulation::dysregulate_weighted;
use crate::emotion::RoundContext;
use crate::piece::{MemoryKind, Piece, Roster, TransitionCause};

const BASE_TRUST_LOSS: f32 = 0.3;
const BOND_TRUST_LOSS: f32 = 0.1;
const BASE_DYSREGULATION: f32 = 0.25;
const BOND_DYSREGULATION: f32 = 0.05;
const RESILIENCE_SHIELD: f32 = 0.03;
const MAX_DYSREGULATION: f32 = 0.9;

/// Trust a piece needs before it can grow from an old trauma
pub const GROWTH_TRUST: f32 = 5.0;
pub const GROWTH_RESILIENCE: f32 = 0.1;

/// Chance a regulated witness dysregulates, given its bond to the victim
pub fn witness_chance(witness: &Piece, bond: f32) -> f32 {
    let bond = bond.max(0.0);
    let raw = (BASE_DYSREGULATION + bond * BOND_DYSREGULATION) * witness.personality.traits.anxiety_tendency * 2.0
        - witness.resilience * RESILIENCE_SHIELD;
    raw.clamp(0.0, MAX_DYSREGULATION)
}

/// Teammates of a captured piece react to seeing it taken
///
/// `square` is where the victim stood; the board no longer holds it.
pub fn witness_capture(
    board: &Board,
    roster: &mut Roster,
    captured: PieceId,
    square: Position,
    ctx: &mut RoundContext,
) -> usize {
    let Some(victim) = roster.get(captured) else {
        return 0;
    };
    // Former teammates do not mourn a defector
    if victim.defected {
        return 0;
    }
    let team = victim.team;
    let name = victim.name.clone();
    let radius = ctx.config.witness_radius;

    let witnesses: Vec<PieceId> = board
        .occupied()
        .into_iter()
        .filter(|(pos, id)| *id != captured && pos.distance(&square) <= radius)
        .map(|(_, id)| id)
        .collect();

    let mut affected = 0;
    for id in witnesses {
        let Some(witness) = roster.get_mut(id) else {
            continue;
        };
        if !witness.is_emotional() || witness.team != team {
            continue;
        }
        let Some(pos) = witness.position else {
            continue;
        };
        let bond = witness.relationships.toward(captured);
        let (kind, impact) = if pos.is_adjacent(&square) {
            (MemoryKind::Trauma, -2.0)
        } else {
            (MemoryKind::WitnessedCapture, -1.0)
        };
        witness.remember(kind, format!("Saw {} captured", name), impact, ctx.turn);
        witness.lose_trust(BASE_TRUST_LOSS + bond.max(0.0) * BOND_TRUST_LOSS, ctx.turn);
        affected += 1;

        if !witness.is_regulated() || ctx.changed.contains(&id) {
            continue;
        }
        if !ctx.rng.chance(witness_chance(witness, bond)) {
            continue;
        }
        let transition = dysregulate_weighted(witness, TransitionCause::WitnessedTrauma, ctx.turn, ctx.rng);
        if transition.is_some() {
            debug!(witness = %id, victim = %captured, "Witnessed capture dysregulated piece");
            ctx.changed.insert(id);
        }
        ctx.events.transition(witness, transition.as_ref());
    }
    affected
}

/// Regulated, trusting pieces work through their oldest trauma
pub fn process(roster: &mut Roster, ctx: &mut RoundContext) -> usize {
    let mut grown = 0;
    for piece in roster.iter_mut() {
        if !piece.is_emotional() || !piece.is_regulated() || piece.trust.value() < GROWTH_TRUST {
            continue;
        }
        let Some(trauma) = piece.memories.take_oldest_trauma() else {
            continue;
        };
        piece.add_resilience(GROWTH_RESILIENCE);
        piece.remember(
            MemoryKind::Growth,
            format!("Made peace with: {}", trauma.description),
            1.0,
            ctx.turn,
        );
        grown += 1;
    }
    grown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::moves::tests::layout;
    use crate::core::config::SimulationConfig;
    use crate::core::rng::ScriptedRng;
    use crate::core::types::Team;
    use crate::game::events::EventLog;

    #[test]
    fn test_witness_chance_bounds() {
        let (_, roster) = layout(&[(1, Team::Player, 5, 0, false)]);
        let w = roster.get(PieceId(1)).unwrap();
        // (0.25) * 0.5 * 2 - 1.0 * 0.03
        assert!((witness_chance(w, 0.0) - 0.22).abs() < 1e-6);
        assert!((witness_chance(w, 10.0) - 0.72).abs() < 1e-6);
        assert!((witness_chance(w, -8.0) - 0.22).abs() < 1e-6);
    }

    #[test]
    fn test_adjacent_witness_gets_trauma() {
        // victim stood at (4,1); 2 adjacent, 3 two squares away, 4 out of range
        let (mut board, mut roster) = layout(&[
            (1, Team::Player, 4, 1, false),
            (2, Team::Player, 5, 2, false),
            (3, Team::Player, 6, 3, false),
            (4, Team::Player, 7, 6, false),
        ]);
        board.remove(Position::new(4, 1));
        {
            let victim = roster.get_mut(PieceId(1)).unwrap();
            victim.captured = true;
            victim.position = None;
        }

        let config = SimulationConfig::default();
        let mut rng = ScriptedRng::new([0.99, 0.99]);
        let mut events = EventLog::new();
        let affected = {
            let mut ctx = RoundContext::new(3, &config, &mut rng, &mut events);
            witness_capture(&board, &mut roster, PieceId(1), Position::new(4, 1), &mut ctx)
        };

        assert_eq!(affected, 2);
        let near = roster.get(PieceId(2)).unwrap();
        assert_eq!(near.memories.of_kind(MemoryKind::Trauma).count(), 1);
        assert!((near.trust.value() - 4.7).abs() < 1e-5);
        let far = roster.get(PieceId(3)).unwrap();
        assert_eq!(far.memories.of_kind(MemoryKind::WitnessedCapture).count(), 1);
        assert_eq!(roster.get(PieceId(4)).unwrap().trust.value(), 5.0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_captured_defector_leaves_old_team_calm() {
        let (mut board, mut roster) = layout(&[(1, Team::Player, 4, 1, false), (2, Team::Player, 5, 2, false)]);
        board.remove(Position::new(4, 1));
        {
            let defector = roster.get_mut(PieceId(1)).unwrap();
            defector.defect(2);
            defector.captured = true;
            defector.position = None;
        }

        let config = SimulationConfig::default();
        let mut rng = ScriptedRng::new([0.0]);
        let mut events = EventLog::new();
        let affected = {
            let mut ctx = RoundContext::new(3, &config, &mut rng, &mut events);
            witness_capture(&board, &mut roster, PieceId(1), Position::new(4, 1), &mut ctx)
        };

        assert_eq!(affected, 0);
        let mate = roster.get(PieceId(2)).unwrap();
        assert_eq!(mate.trust.value(), 5.0);
        assert!(mate.is_regulated());
        assert_eq!(mate.memories.of_kind(MemoryKind::WitnessedCapture).count(), 0);
        assert_eq!(mate.memories.of_kind(MemoryKind::Trauma).count(), 0);
    }

    #[test]
    fn test_growth_consumes_trauma() {
        let (_, mut roster) = layout(&[(1, Team::Player, 5, 0, false)]);
        roster
            .get_mut(PieceId(1))
            .unwrap()
            .remember(MemoryKind::Trauma, "Saw Bo captured", -2.0, 1);

        let config = SimulationConfig::default();
        let mut rng = ScriptedRng::new([]);
        let mut events = EventLog::new();
        let grown = {
            let mut ctx = RoundContext::new(4, &config, &mut rng, &mut events);
            process(&mut roster, &mut ctx)
        };
        assert_eq!(grown, 1);
        let p = roster.get(PieceId(1)).unwrap();
        assert_eq!(p.memories.of_kind(MemoryKind::Trauma).count(), 0);
        assert_eq!(p.memories.of_kind(MemoryKind::Growth).count(), 1);
        assert!((p.resilience - 1.1).abs() < 1e-6);
    }
}
