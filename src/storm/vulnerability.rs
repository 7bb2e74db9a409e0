//! Per-piece vulnerability and the team-wide environmental modifier

use std::collections::{BTreeMap, VecDeque};

use crate::core::types::{PieceId, Turn};
use crate::piece::emotion::{susceptibility, Susceptibility};
use crate::piece::{Piece, Roster};
use crate::storm::types::StormType;
use crate::storm::StormRecord;

const BASE: f32 = 0.5;
const VULNERABLE_STATE: f32 = 0.3;
const RESISTANT_STATE: f32 = 0.2;
const PER_TRUST: f32 = 0.05;
const PER_RESILIENCE: f32 = 0.03;
const PER_STRONG_BOND: f32 = 0.1;
const PER_RECENT_TRAUMA: f32 = 0.1;
pub const MIN_VULNERABILITY: f32 = 0.1;
pub const MAX_VULNERABILITY: f32 = 0.95;

/// Storms ending within this many turns count toward the environmental modifier
pub const RECENT_STORM_WINDOW: Turn = 30;

pub fn piece_vulnerability(piece: &Piece, kind: StormType, roster: &Roster, turn: Turn, trauma_window: Turn) -> f32 {
    let profile = kind.profile();
    let mut v = BASE;
    match susceptibility(piece.emotional_state, profile.vulnerable, profile.resistant) {
        Susceptibility::Vulnerable => v += VULNERABLE_STATE,
        Susceptibility::Resistant => v -= RESISTANT_STATE,
        Susceptibility::Neutral => {}
    }
    v -= piece.trust.value() * PER_TRUST;
    v -= piece.resilience * PER_RESILIENCE;

    let team = piece.team;
    let bonds = piece
        .relationships
        .strong_bonds(move |other| roster.get(other).map(|o| o.team == team && o.is_active()).unwrap_or(false))
        .count();
    v -= bonds as f32 * PER_STRONG_BOND;
    v += piece.memories.recent_trauma(turn, trauma_window) as f32 * PER_RECENT_TRAUMA;

    v.clamp(MIN_VULNERABILITY, MAX_VULNERABILITY)
}

/// Vulnerability of every emotional piece at storm start
pub fn compute_all(kind: StormType, roster: &Roster, turn: Turn, trauma_window: Turn) -> BTreeMap<PieceId, f32> {
    roster
        .iter()
        .filter(|p| p.is_emotional())
        .map(|p| (p.id, piece_vulnerability(p, kind, roster, turn, trauma_window)))
        .collect()
}

/// Average positive regard between emotional teammates, in [0, 1]
pub fn cohesion(roster: &Roster) -> f32 {
    let pieces: Vec<&Piece> = roster.iter().filter(|p| p.is_emotional()).collect();
    if pieces.len() < 2 {
        return 0.0;
    }
    let mut total = 0.0;
    let mut pairs = 0;
    for a in &pieces {
        for b in &pieces {
            if a.id != b.id {
                total += a.relationships.toward(b.id).max(0.0);
                pairs += 1;
            }
        }
    }
    (total / pairs as f32 / 10.0).clamp(0.0, 1.0)
}

/// Modifier composed into storm intensity; calmer, closer teams weather storms better
pub fn environmental_modifier(roster: &Roster, history: &VecDeque<StormRecord>, turn: Turn) -> f32 {
    let pieces: Vec<&Piece> = roster.iter().filter(|p| p.is_emotional()).collect();
    let avg_resilience = if pieces.is_empty() {
        1.0
    } else {
        pieces.iter().map(|p| p.resilience).sum::<f32>() / pieces.len() as f32
    };
    let recent = history
        .iter()
        .filter(|r| r.ended_turn + RECENT_STORM_WINDOW >= turn)
        .count();

    let modifier = 1.0 - cohesion(roster) * 0.2 - (avg_resilience - 1.0) * 0.1 + recent as f32 * 0.1;
    modifier.clamp(0.5, 1.5)
}
