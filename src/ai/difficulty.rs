//! Difficulty presets

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Gentle,
    #[default]
    Balanced,
    Cunning,
    Ruthless,
}

/// Knobs the opponent reads from its difficulty
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyParams {
    /// Plies searched by the lookahead, counting the AI's own move
    pub depth: u8,
    /// Chance of playing a mid-ranked move instead of the best
    pub mistake_chance: f32,
    /// Weight on targeting emotionally vulnerable pieces
    pub exploitation: f32,
    /// Chance of shying away from the best capture
    pub capture_reluctance: f32,
    /// How reliably threats and support are noticed
    pub recognition: f32,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Gentle,
        Difficulty::Balanced,
        Difficulty::Cunning,
        Difficulty::Ruthless,
    ];

    pub fn params(&self) -> DifficultyParams {
        match self {
            Difficulty::Gentle => DifficultyParams {
                depth: 1,
                mistake_chance: 0.25,
                exploitation: 0.0,
                capture_reluctance: 0.3,
                recognition: 0.5,
            },
            Difficulty::Balanced => DifficultyParams {
                depth: 2,
                mistake_chance: 0.1,
                exploitation: 0.4,
                capture_reluctance: 0.1,
                recognition: 0.75,
            },
            Difficulty::Cunning => DifficultyParams {
                depth: 2,
                mistake_chance: 0.05,
                exploitation: 0.8,
                capture_reluctance: 0.0,
                recognition: 0.9,
            },
            Difficulty::Ruthless => DifficultyParams {
                depth: 3,
                mistake_chance: 0.0,
                exploitation: 1.0,
                capture_reluctance: 0.0,
                recognition: 1.0,
            },
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Gentle => "gentle",
            Difficulty::Balanced => "balanced",
            Difficulty::Cunning => "cunning",
            Difficulty::Ruthless => "ruthless",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown difficulty '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harder_means_deeper_and_sharper() {
        let gentle = Difficulty::Gentle.params();
        let ruthless = Difficulty::Ruthless.params();
        assert!(gentle.depth < ruthless.depth);
        assert!(gentle.mistake_chance > ruthless.mistake_chance);
        assert!(gentle.exploitation < ruthless.exploitation);
    }

    #[test]
    fn test_parse() {
        assert_eq!("Cunning".parse::<Difficulty>(), Ok(Difficulty::Cunning));
        assert!("impossible".parse::<Difficulty>().is_err());
    }
}
