//! Named three-command sequences
//!
//! Progress is tracked per piece and combo. A command that does not continue
//! a sequence resets it (or restarts it if it is that combo's opening step).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::types::PieceId;
use crate::empathy::catalog::CommandId;
use crate::piece::DysregulationKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComboId {
    SafeHarbor,
    GentleReturn,
    SteadyGround,
    Thaw,
    TrueVoice,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComboEffect {
    /// Return the piece to Regulated
    Regulate,
    /// Permanent resilience gain
    Strengthen(f32),
    /// Regulate and clear contagion susceptibility
    Shield,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Combo {
    pub id: ComboId,
    pub name: &'static str,
    pub state: DysregulationKind,
    pub steps: [CommandId; 3],
    pub trust_bonus: f32,
    pub effect: ComboEffect,
}

pub static COMBOS: [Combo; 5] = [
    Combo {
        id: ComboId::SafeHarbor,
        name: "Safe Harbor",
        state: DysregulationKind::Anxious,
        steps: [CommandId::Listen, CommandId::ReassureSafety, CommandId::GroundSenses],
        trust_bonus: 1.5,
        effect: ComboEffect::Regulate,
    },
    Combo {
        id: ComboId::GentleReturn,
        name: "Gentle Return",
        state: DysregulationKind::Shutdown,
        steps: [CommandId::OfferSpace, CommandId::GentlePresence, CommandId::InviteSmallStep],
        trust_bonus: 1.0,
        effect: ComboEffect::Shield,
    },
    Combo {
        id: ComboId::SteadyGround,
        name: "Steady Ground",
        state: DysregulationKind::Fight,
        steps: [CommandId::Validate, CommandId::NameTheAnger, CommandId::HoldBoundary],
        trust_bonus: 1.0,
        effect: ComboEffect::Strengthen(0.2),
    },
    Combo {
        id: ComboId::Thaw,
        name: "Thaw",
        state: DysregulationKind::Freeze,
        steps: [CommandId::SlowCount, CommandId::BreatheTogether, CommandId::WarmOrient],
        trust_bonus: 1.5,
        effect: ComboEffect::Regulate,
    },
    Combo {
        id: ComboId::TrueVoice,
        name: "True Voice",
        state: DysregulationKind::Fawn,
        steps: [CommandId::Validate, CommandId::AffirmNeeds, CommandId::ReleasePleasing],
        trust_bonus: 1.5,
        effect: ComboEffect::Strengthen(0.15),
    },
];

pub fn combo(id: ComboId) -> &'static Combo {
    &COMBOS[id as usize]
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComboTracker {
    progress: BTreeMap<PieceId, BTreeMap<ComboId, u8>>,
}

impl ComboTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn progress(&self, piece: PieceId, combo: ComboId) -> u8 {
        self.progress
            .get(&piece)
            .and_then(|m| m.get(&combo))
            .copied()
            .unwrap_or(0)
    }

    /// Advance every combo for the piece's state; returns a combo completed by `command`
    pub fn advance(&mut self, piece: PieceId, state: Option<DysregulationKind>, command: CommandId) -> Option<ComboId> {
        let entry = self.progress.entry(piece).or_default();
        let mut completed = None;
        for c in COMBOS.iter() {
            let slot = entry.entry(c.id).or_insert(0);
            if state != Some(c.state) {
                *slot = 0;
                continue;
            }
            if c.steps[*slot as usize] == command {
                *slot += 1;
            } else {
                *slot = u8::from(c.steps[0] == command);
            }
            if *slot as usize == c.steps.len() {
                *slot = 0;
                completed = completed.or(Some(c.id));
            }
        }
        entry.retain(|_, v| *v > 0);
        completed
    }

    pub fn reset(&mut self, piece: PieceId) {
        self.progress.remove(&piece);
    }
}
