//! Single seedable source of randomness
//!
//! Every probabilistic mechanic (dysregulation, contagion, empathy rolls,
//! storm triggers, AI mistakes) draws from a `GameRng` handed in by the
//! caller, so a seed fully determines a match.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

pub trait GameRng {
    /// Uniform roll in [0, 1)
    fn roll(&mut self) -> f32;

    /// True with probability `p`
    fn chance(&mut self, p: f32) -> bool {
        self.roll() < p
    }

    /// Uniform index in [0, n); n must be positive
    fn below(&mut self, n: usize) -> usize {
        ((self.roll() * n as f32) as usize).min(n.saturating_sub(1))
    }

    /// Uniform value in [lo, hi)
    fn between(&mut self, lo: f32, hi: f32) -> f32 {
        lo + self.roll() * (hi - lo)
    }

    /// Weighted draw; None if every weight is zero or the slice is empty
    fn weighted_index(&mut self, weights: &[f32]) -> Option<usize> {
        let total: f32 = weights.iter().map(|w| w.max(0.0)).sum();
        if total <= 0.0 {
            return None;
        }
        let target = self.roll() * total;
        let mut cumulative = 0.0;
        let mut last_positive = None;
        for (i, &w) in weights.iter().enumerate() {
            if w <= 0.0 {
                continue;
            }
            cumulative += w;
            last_positive = Some(i);
            if target < cumulative {
                return Some(i);
            }
        }
        last_positive
    }
}

/// Deterministic ChaCha stream; serializable so saves resume the same sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeededRng {
    inner: ChaCha8Rng,
}

impl SeededRng {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl GameRng for SeededRng {
    fn roll(&mut self) -> f32 {
        self.inner.gen::<f32>()
    }
}

/// Replays scripted rolls, then falls back to a seeded stream
///
/// Used to engineer specific outcomes in tests.
#[derive(Debug, Clone)]
pub struct ScriptedRng {
    script: VecDeque<f32>,
    fallback: SeededRng,
}

impl ScriptedRng {
    pub fn new(rolls: impl IntoIterator<Item = f32>) -> Self {
        Self {
            script: rolls.into_iter().collect(),
            fallback: SeededRng::with_seed(0),
        }
    }

    pub fn with_fallback(rolls: impl IntoIterator<Item = f32>, seed: u64) -> Self {
        Self {
            script: rolls.into_iter().collect(),
            fallback: SeededRng::with_seed(seed),
        }
    }

    /// Append more scripted rolls
    pub fn push(&mut self, roll: f32) {
        self.script.push_back(roll);
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl GameRng for ScriptedRng {
    fn roll(&mut self) -> f32 {
        match self.script.pop_front() {
            Some(r) => r.clamp(0.0, 0.999_999),
            None => self.fallback.roll(),
        }
    }
}
