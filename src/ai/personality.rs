//! AI personality configuration loaded from TOML
//!
//! Personalities set the opponent's taste for captures, its regard for the
//! other side's feelings and how far ahead it plans. Built-in personalities
//! are compiled in; custom ones are read from `data/ai_personalities/`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::{GameError, Result};

/// How the personality bends the final choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiStyle {
    #[default]
    Balanced,
    /// May pass up captures
    Empathetic,
    /// Scores are shaken by a wide random factor
    Chaotic,
    /// Leans on lookahead
    Calculating,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiPersonality {
    /// Set from the file name
    #[serde(default)]
    pub name: String,
    /// Taste for captures and pressure (0.0 to 1.0)
    #[serde(default = "half")]
    pub aggression: f32,
    /// Regard for the player's pieces (0.0 to 1.0)
    #[serde(default = "half")]
    pub empathy: f32,
    /// Planning and positional care (0.0 to 1.0)
    #[serde(default = "half")]
    pub strategy: f32,
    #[serde(default)]
    pub style: AiStyle,
}

fn half() -> f32 {
    0.5
}

impl Default for AiPersonality {
    fn default() -> Self {
        Self {
            name: "balanced".to_string(),
            aggression: 0.5,
            empathy: 0.5,
            strategy: 0.5,
            style: AiStyle::Balanced,
        }
    }
}

/// Relative weight of each scoring strategy
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StrategyWeights {
    pub aggressive: f32,
    pub defensive: f32,
    pub emotional: f32,
    pub disruption: f32,
    pub positional: f32,
}

impl AiPersonality {
    pub fn weights(&self) -> StrategyWeights {
        let a = self.aggression.clamp(0.0, 1.0);
        let e = self.empathy.clamp(0.0, 1.0);
        let s = self.strategy.clamp(0.0, 1.0);
        StrategyWeights {
            aggressive: 0.5 + a,
            defensive: 0.5 + (1.0 - a) * 0.5 + s * 0.3,
            emotional: 0.3 + (1.0 - e) * 0.5 + s * 0.2,
            disruption: 0.2 + s * 0.6,
            positional: 0.3 + s * 0.4,
        }
    }

    pub fn from_toml_str(name: &str, contents: &str) -> Result<Self> {
        let mut personality: AiPersonality = toml::from_str(contents)?;
        personality.name = name.to_string();
        personality.validate()?;
        Ok(personality)
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("aggression", self.aggression),
            ("empathy", self.empathy),
            ("strategy", self.strategy),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(GameError::Content(format!(
                    "personality '{}': {} must be within [0, 1], got {}",
                    self.name, field, value
                )));
            }
        }
        Ok(())
    }
}

const BUILTIN: [(&str, &str); 4] = [
    ("balanced", include_str!("../../data/ai_personalities/balanced.toml")),
    ("empathetic", include_str!("../../data/ai_personalities/empathetic.toml")),
    ("chaotic", include_str!("../../data/ai_personalities/chaotic.toml")),
    ("calculating", include_str!("../../data/ai_personalities/calculating.toml")),
];

pub fn builtin_names() -> impl Iterator<Item = &'static str> {
    BUILTIN.iter().map(|(name, _)| *name)
}

/// A compiled-in personality by name
pub fn builtin(name: &str) -> Result<AiPersonality> {
    let (_, contents) = BUILTIN
        .iter()
        .find(|(n, _)| *n == name)
        .ok_or_else(|| GameError::Content(format!("no built-in AI personality '{}'", name)))?;
    AiPersonality::from_toml_str(name, contents)
}

/// Load `{dir}/{name}.toml`
pub fn load_personality_from(dir: &Path, name: &str) -> Result<AiPersonality> {
    let path = dir.join(format!("{}.toml", name));
    let contents = fs::read_to_string(&path)?;
    AiPersonality::from_toml_str(name, &contents)
}

/// Load from `data/ai_personalities/{name}.toml`, falling back to the built-in copy
pub fn load_personality(name: &str) -> Result<AiPersonality> {
    let dir = PathBuf::from("data/ai_personalities");
    match load_personality_from(&dir, name) {
        Ok(p) => Ok(p),
        Err(GameError::IoError(_)) => builtin(name),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_parse() {
        for name in builtin_names() {
            let p = builtin(name).unwrap();
            assert_eq!(p.name, name);
        }
    }

    #[test]
    fn test_empathetic_style() {
        let p = builtin("empathetic").unwrap();
        assert_eq!(p.style, AiStyle::Empathetic);
        assert!(p.empathy > 0.5);
    }

    #[test]
    fn test_missing_fields_default() {
        let p = AiPersonality::from_toml_str("sparse", "aggression = 0.9").unwrap();
        assert_eq!(p.empathy, 0.5);
        assert_eq!(p.style, AiStyle::Balanced);
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(AiPersonality::from_toml_str("bad", "aggression = 1.5").is_err());
    }

    #[test]
    fn test_aggression_raises_capture_weight() {
        let meek = AiPersonality {
            aggression: 0.0,
            ..AiPersonality::default()
        };
        let fierce = AiPersonality {
            aggression: 1.0,
            ..AiPersonality::default()
        };
        assert!(fierce.weights().aggressive > meek.weights().aggressive);
        assert!(fierce.weights().defensive < meek.weights().defensive);
    }
}
