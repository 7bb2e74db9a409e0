//! Personality content records
//!
//! Personalities are immutable once loaded. Trait modifiers written in content
//! files are resolved into plain numbers at load time.

use serde::{Deserialize, Serialize};

use crate::core::rng::GameRng;
use crate::empathy::catalog::CommandTag;
use crate::piece::emotion::DysregulationKind;

/// Numeric personality traits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraitVector {
    /// Multiplier on trust gains
    pub trust_gain_rate: f32,
    /// Multiplier on trust losses
    pub trust_loss_rate: f32,
    /// 0.0 (steady) to 1.0 (easily unsettled)
    pub anxiety_tendency: f32,
    /// Starting resilience
    pub base_resilience: f32,
    /// Resistance to storms and contagion
    pub storm_resistance: f32,
    /// How quickly the piece bonds with neighbours (0.0 to 1.0)
    pub sociability: f32,
}

impl Default for TraitVector {
    fn default() -> Self {
        Self {
            trust_gain_rate: 1.0,
            trust_loss_rate: 1.0,
            anxiety_tendency: 0.5,
            base_resilience: 1.0,
            storm_resistance: 1.0,
            sociability: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraitField {
    TrustGainRate,
    TrustLossRate,
    AnxietyTendency,
    BaseResilience,
    StormResistance,
    Sociability,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierOp {
    Add(f32),
    Multiply(f32),
}

/// A tagged trait modifier, e.g. `{ field = "trust_gain_rate", multiply = 1.2 }`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraitModifier {
    pub field: TraitField,
    #[serde(flatten)]
    pub op: ModifierOp,
}

impl TraitModifier {
    pub fn apply(&self, traits: &mut TraitVector) {
        let slot = match self.field {
            TraitField::TrustGainRate => &mut traits.trust_gain_rate,
            TraitField::TrustLossRate => &mut traits.trust_loss_rate,
            TraitField::AnxietyTendency => &mut traits.anxiety_tendency,
            TraitField::BaseResilience => &mut traits.base_resilience,
            TraitField::StormResistance => &mut traits.storm_resistance,
            TraitField::Sociability => &mut traits.sociability,
        };
        match self.op {
            ModifierOp::Add(v) => *slot += v,
            ModifierOp::Multiply(v) => *slot *= v,
        }
    }
}

/// Relative likelihood of each dysregulation kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DysregulationWeights {
    pub anxious: f32,
    pub shutdown: f32,
    pub fight: f32,
    pub freeze: f32,
    pub fawn: f32,
}

impl Default for DysregulationWeights {
    fn default() -> Self {
        Self {
            anxious: 0.30,
            shutdown: 0.20,
            fight: 0.20,
            freeze: 0.15,
            fawn: 0.15,
        }
    }
}

impl DysregulationWeights {
    /// Weights in `DysregulationKind::ALL` order
    pub fn as_array(&self) -> [f32; 5] {
        [self.anxious, self.shutdown, self.fight, self.freeze, self.fawn]
    }

    pub fn choose(&self, rng: &mut dyn GameRng) -> DysregulationKind {
        rng.weighted_index(&self.as_array())
            .map(|i| DysregulationKind::ALL[i])
            .unwrap_or(DysregulationKind::Anxious)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    /// Stable content id
    pub id: String,
    pub archetype: String,
    pub traits: TraitVector,
    #[serde(default)]
    pub dysregulation_weights: Option<DysregulationWeights>,
    #[serde(default)]
    pub preferred_tags: Vec<CommandTag>,
    #[serde(default)]
    pub avoided_tags: Vec<CommandTag>,
}

impl Personality {
    /// Build a personality, folding modifiers into the trait vector
    pub fn resolve(
        id: impl Into<String>,
        archetype: impl Into<String>,
        base: TraitVector,
        modifiers: &[TraitModifier],
    ) -> Self {
        let mut traits = base;
        for modifier in modifiers {
            modifier.apply(&mut traits);
        }
        traits.anxiety_tendency = traits.anxiety_tendency.clamp(0.0, 1.0);
        traits.sociability = traits.sociability.clamp(0.0, 1.0);
        traits.trust_gain_rate = traits.trust_gain_rate.max(0.0);
        traits.trust_loss_rate = traits.trust_loss_rate.max(0.0);

        Self {
            id: id.into(),
            archetype: archetype.into(),
            traits,
            dysregulation_weights: None,
            preferred_tags: Vec::new(),
            avoided_tags: Vec::new(),
        }
    }

    /// Personality's own tendencies, or the shared default table
    pub fn dysregulation_weights(&self) -> DysregulationWeights {
        self.dysregulation_weights.unwrap_or_default()
    }

    pub fn prefers(&self, tags: &[CommandTag]) -> bool {
        tags.iter().any(|t| self.preferred_tags.contains(t))
    }

    pub fn avoids(&self, tags: &[CommandTag]) -> bool {
        tags.iter().any(|t| self.avoided_tags.contains(t))
    }
}

impl Default for Personality {
    fn default() -> Self {
        Personality::resolve("steady", "Steady", TraitVector::default(), &[])
    }
}
