//! Interaction history
//!
//! Feeds the per-piece pattern multiplier and the global adaptive difficulty
//! multiplier.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::core::types::{PieceId, Turn};
use crate::empathy::catalog::CommandId;
use crate::empathy::resolution::Outcome;
use crate::piece::EmotionalState;

/// Interaction records retained for inspection and adaptive difficulty
pub const RECORD_CAPACITY: usize = 100;

/// Attempts with one piece and command before history affects prediction
pub const PATTERN_MIN_ATTEMPTS: u32 = 3;

/// Window of recent interactions used for adaptive difficulty
pub const ADAPTIVE_WINDOW: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub turn: Turn,
    pub piece: PieceId,
    pub command: CommandId,
    pub initial_state: EmotionalState,
    pub final_state: EmotionalState,
    pub initial_trust: f32,
    pub final_trust: f32,
    pub outcome: Outcome,
}

impl InteractionRecord {
    pub fn succeeded(&self) -> bool {
        self.outcome.is_success()
    }

    pub fn critical(&self) -> bool {
        self.outcome.is_critical()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Tally {
    pub attempts: u32,
    pub successes: u32,
}

impl Tally {
    pub fn rate(&self) -> f32 {
        if self.attempts == 0 {
            0.0
        } else {
            self.successes as f32 / self.attempts as f32
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmpathyHistory {
    records: VecDeque<InteractionRecord>,
    tallies: BTreeMap<PieceId, BTreeMap<CommandId, Tally>>,
}

impl EmpathyHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: InteractionRecord) {
        let tally = self
            .tallies
            .entry(record.piece)
            .or_default()
            .entry(record.command)
            .or_default();
        tally.attempts += 1;
        if record.succeeded() {
            tally.successes += 1;
        }

        self.records.push_back(record);
        while self.records.len() > RECORD_CAPACITY {
            self.records.pop_front();
        }
    }

    pub fn tally(&self, piece: PieceId, command: CommandId) -> Tally {
        self.tallies
            .get(&piece)
            .and_then(|m| m.get(&command))
            .copied()
            .unwrap_or_default()
    }

    /// 1.2 for commands that keep working on this piece, 0.8 for ones that keep failing
    pub fn pattern_multiplier(&self, piece: PieceId, command: CommandId) -> f32 {
        let tally = self.tally(piece, command);
        if tally.attempts < PATTERN_MIN_ATTEMPTS {
            return 1.0;
        }
        let rate = tally.rate();
        if rate > 0.7 {
            1.2
        } else if rate < 0.3 {
            0.8
        } else {
            1.0
        }
    }

    /// Success rate over the most recent interactions; None until the window fills
    pub fn recent_success_rate(&self) -> Option<f32> {
        if self.records.len() < ADAPTIVE_WINDOW {
            return None;
        }
        let recent = self.records.iter().rev().take(ADAPTIVE_WINDOW);
        let successes = recent.filter(|r| r.succeeded()).count();
        Some(successes as f32 / ADAPTIVE_WINDOW as f32)
    }

    /// Eases up on a struggling player, tightens for one who rarely fails
    pub fn adaptive_multiplier(&self) -> f32 {
        match self.recent_success_rate() {
            Some(rate) if rate < 0.3 => 1.1,
            Some(rate) if rate > 0.8 => 0.95,
            _ => 1.0,
        }
    }

    pub fn records(&self) -> impl Iterator<Item = &InteractionRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Most recent commands used on `piece`, newest last
    pub fn recent_commands(&self, piece: PieceId, n: usize) -> Vec<CommandId> {
        let mut commands: Vec<_> = self
            .records
            .iter()
            .rev()
            .filter(|r| r.piece == piece)
            .take(n)
            .map(|r| r.command)
            .collect();
        commands.reverse();
        commands
    }
}
