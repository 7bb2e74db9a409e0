//! One piece's view of its teammates
//!
//! Relationships are asymmetric: each piece owns its own map and nothing
//! keeps the two directions in sync.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::types::PieceId;

pub const RELATIONSHIP_MIN: f32 = -10.0;
pub const RELATIONSHIP_MAX: f32 = 10.0;

/// Above this a relationship counts as a strong bond
pub const STRONG_BOND: f32 = 5.0;

/// Below this a relationship counts as strained
pub const STRAINED_BOND: f32 = -3.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Relationships(BTreeMap<PieceId, f32>);

impl Relationships {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current view of `other` (0.0 if never met)
    pub fn toward(&self, other: PieceId) -> f32 {
        self.0.get(&other).copied().unwrap_or(0.0)
    }

    pub fn adjust(&mut self, other: PieceId, delta: f32) -> f32 {
        let entry = self.0.entry(other).or_insert(0.0);
        *entry = (*entry + delta).clamp(RELATIONSHIP_MIN, RELATIONSHIP_MAX);
        *entry
    }

    pub fn set(&mut self, other: PieceId, value: f32) {
        self.0
            .insert(other, value.clamp(RELATIONSHIP_MIN, RELATIONSHIP_MAX));
    }

    /// Multiply every relationship toward zero
    pub fn scale_all(&mut self, factor: f32) {
        for value in self.0.values_mut() {
            *value *= factor;
        }
    }

    pub fn forget(&mut self, other: PieceId) {
        self.0.remove(&other);
    }

    pub fn is_strong(&self, other: PieceId) -> bool {
        self.toward(other) > STRONG_BOND
    }

    /// Pieces this one is strongly bonded to, restricted by `filter`
    pub fn strong_bonds<'a>(&'a self, filter: impl Fn(PieceId) -> bool + 'a) -> impl Iterator<Item = PieceId> + 'a {
        self.0
            .iter()
            .filter(move |(id, v)| **v > STRONG_BOND && filter(**id))
            .map(|(id, _)| *id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PieceId, f32)> + '_ {
        self.0.iter().map(|(id, v)| (*id, *v))
    }
}
