//! Team content schema
//!
//! A team file names its pieces, the archetypes they are built from and the
//! storm flavours the team is prone to. Modifiers are folded into plain trait
//! numbers when the piece personalities are built.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::error::{GameError, Result};
use crate::empathy::catalog::CommandTag;
use crate::piece::personality::TraitModifier;
use crate::piece::{DysregulationWeights, Personality, TraitVector};
use crate::storm::StormType;

/// Most pieces a side can field (three rows of four dark squares)
pub const MAX_PIECES: usize = 12;

fn default_trust() -> f32 {
    5.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieceDefinition {
    pub name: String,
    pub archetype: String,
    #[serde(default)]
    pub modifiers: Vec<TraitModifier>,
    #[serde(default)]
    pub dysregulation_weights: Option<DysregulationWeights>,
    #[serde(default)]
    pub preferred_tags: Vec<CommandTag>,
    #[serde(default)]
    pub avoided_tags: Vec<CommandTag>,
    /// Free-form dialogue hooks keyed by event name; passed through untouched
    #[serde(default)]
    pub dialogue: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamDefinition {
    pub id: String,
    pub name: String,
    #[serde(default = "default_trust")]
    pub starting_trust: f32,
    /// Relative weight of each storm type for unprompted storms
    #[serde(default)]
    pub storm_weights: BTreeMap<StormType, f32>,
    /// Base trait vectors by archetype id
    #[serde(default)]
    pub archetypes: BTreeMap<String, TraitVector>,
    pub pieces: Vec<PieceDefinition>,
}

impl TeamDefinition {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let team: TeamDefinition = toml::from_str(contents)?;
        team.validate()?;
        Ok(team)
    }

    /// Collect every problem instead of stopping at the first
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        if self.id.trim().is_empty() {
            errors.push("team id is empty".to_string());
        }
        if self.pieces.is_empty() || self.pieces.len() > MAX_PIECES {
            errors.push(format!("a team needs 1 to {} pieces, found {}", MAX_PIECES, self.pieces.len()));
        }
        if !(-5.0..=10.0).contains(&self.starting_trust) {
            errors.push(format!("starting_trust {} is outside [-5, 10]", self.starting_trust));
        }
        if self.storm_weights.values().any(|w| *w < 0.0) {
            errors.push("storm weights must not be negative".to_string());
        }
        for piece in &self.pieces {
            if !self.archetypes.contains_key(&piece.archetype) {
                errors.push(format!("piece '{}' uses unknown archetype '{}'", piece.name, piece.archetype));
            }
            if let Some(w) = &piece.dysregulation_weights {
                if w.as_array().iter().any(|v| *v < 0.0) || w.as_array().iter().sum::<f32>() <= 0.0 {
                    errors.push(format!("piece '{}' has unusable dysregulation weights", piece.name));
                }
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(GameError::Content(format!("team '{}': {}", self.id, errors.join("; "))))
        }
    }

    /// Resolved personality for one piece definition
    pub fn personality_for(&self, piece: &PieceDefinition) -> Result<Personality> {
        let base = self.archetypes.get(&piece.archetype).copied().ok_or_else(|| {
            GameError::Content(format!("unknown archetype '{}' in team '{}'", piece.archetype, self.id))
        })?;
        let mut personality = Personality::resolve(
            format!("{}/{}", self.id, piece.name.to_lowercase()),
            piece.archetype.clone(),
            base,
            &piece.modifiers,
        );
        personality.dysregulation_weights = piece.dysregulation_weights;
        personality.preferred_tags = piece.preferred_tags.clone();
        personality.avoided_tags = piece.avoided_tags.clone();
        Ok(personality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
id = "test"
name = "Test Team"

[archetypes.worrier]
anxiety_tendency = 0.8

[[pieces]]
name = "Ada"
archetype = "worrier"
modifiers = [{ field = "trust_gain_rate", multiply = 1.5 }]
preferred_tags = ["listening"]
"#;

    #[test]
    fn test_minimal_team_parses_with_defaults() {
        let team = TeamDefinition::from_toml_str(MINIMAL).unwrap();
        assert_eq!(team.starting_trust, 5.0);
        let p = team.personality_for(&team.pieces[0]).unwrap();
        assert_eq!(p.traits.anxiety_tendency, 0.8);
        assert_eq!(p.traits.trust_gain_rate, 1.5);
        // unspecified traits fall back to defaults
        assert_eq!(p.traits.storm_resistance, 1.0);
        assert!(p.prefers(&[CommandTag::Listening]));
    }

    #[test]
    fn test_unknown_archetype_rejected() {
        let bad = MINIMAL.replace("archetype = \"worrier\"", "archetype = \"ghost\"");
        assert!(TeamDefinition::from_toml_str(&bad).is_err());
    }
}
