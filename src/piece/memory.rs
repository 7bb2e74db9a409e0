//! Bounded memory log
//!
//! Memories are kept in the order they were formed. When the log is full the
//! oldest unimportant memory is evicted; important memories only go once
//! nothing else is left to drop.

use serde::{Deserialize, Serialize};

use crate::core::types::Turn;
use crate::piece::emotion::EmotionalState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryKind {
    WitnessedCapture,
    Trauma,
    EmpathySuccess,
    EmpathyFailure,
    CriticalSuccess,
    CriticalFailure,
    Combo,
    TrustMilestone,
    Breakthrough,
    Inspired,
    StormWeathered,
    WitnessedDefection,
    Defection,
    Promotion,
    Bonding,
    Recovery,
    Growth,
}

impl MemoryKind {
    /// Important memories survive pruning ahead of ordinary ones
    pub fn is_important(&self) -> bool {
        matches!(
            self,
            MemoryKind::Trauma
                | MemoryKind::CriticalSuccess
                | MemoryKind::CriticalFailure
                | MemoryKind::TrustMilestone
                | MemoryKind::Breakthrough
                | MemoryKind::WitnessedDefection
                | MemoryKind::Defection
        )
    }

    /// Memories that count towards storm vulnerability while recent
    pub fn is_traumatic(&self) -> bool {
        matches!(
            self,
            MemoryKind::Trauma | MemoryKind::WitnessedCapture | MemoryKind::CriticalFailure
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub kind: MemoryKind,
    pub description: String,
    /// Signed emotional weight of the event
    pub impact: f32,
    pub turn: Turn,
    /// State and trust at the moment the memory formed
    pub emotional_state: EmotionalState,
    pub trust: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryLog {
    entries: Vec<Memory>,
    capacity: usize,
}

impl MemoryLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn record(&mut self, memory: Memory) {
        self.entries.push(memory);
        self.prune();
    }

    fn prune(&mut self) {
        while self.entries.len() > self.capacity {
            let victim = self
                .entries
                .iter()
                .position(|m| !m.kind.is_important())
                .unwrap_or(0);
            self.entries.remove(victim);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Memory> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&Memory> {
        self.entries.last()
    }

    pub fn of_kind(&self, kind: MemoryKind) -> impl Iterator<Item = &Memory> {
        self.entries.iter().filter(move |m| m.kind == kind)
    }

    /// Traumatic memories formed within `window` turns of `now`
    pub fn recent_trauma(&self, now: Turn, window: Turn) -> usize {
        self.entries
            .iter()
            .filter(|m| m.kind.is_traumatic() && m.turn + window >= now)
            .count()
    }

    /// Oldest unprocessed trauma, if any (for post-traumatic growth)
    pub fn take_oldest_trauma(&mut self) -> Option<Memory> {
        let idx = self.entries.iter().position(|m| m.kind == MemoryKind::Trauma)?;
        Some(self.entries.remove(idx))
    }
}
