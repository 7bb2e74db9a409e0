//! Save/restore of a whole match
//!
//! A snapshot carries the full state plus the random stream, so a restored
//! match continues with exactly the rolls the original would have seen.
//! `recover` accepts damaged saves: bad trust values and missing states are
//! repaired before parsing and each repair is reported.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::board::{integrity, Violation};
use crate::core::error::Result;
use crate::core::rng::SeededRng;
use crate::game::orchestrator::Match;
use crate::game::state::GameState;
use crate::piece::trust::{TRUST_MAX, TRUST_MIN};
use crate::piece::EmotionalState;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub state: GameState,
    pub rng: SeededRng,
}

/// One repair made while loading a damaged snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "recovered", rename_all = "snake_case")]
pub enum Recovery {
    /// Trust was missing or not a number; reset to 0
    TrustReset { piece: String },
    /// Trust was outside its range
    TrustClamped { piece: String, from: f64, to: f32 },
    /// Emotional state was missing or unreadable; set to Regulated
    StateDefaulted { piece: String },
    /// Board and roster disagreed and were rebuilt from the board
    Integrity { violation: Violation },
}

impl Snapshot {
    pub fn capture(game: &Match<SeededRng>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            state: game.state().clone(),
            rng: game.rng().clone(),
        }
    }

    pub fn into_match(self) -> Match<SeededRng> {
        Match::new(self.state, self.rng)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Strict parse; any damage is an error
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Lenient parse that repairs what it can
    pub fn recover(json: &str) -> Result<(Self, Vec<Recovery>)> {
        let mut value: Value = serde_json::from_str(json)?;
        let mut fixes = Vec::new();

        if let Some(roster) = value
            .get_mut("state")
            .and_then(|s| s.get_mut("roster"))
            .and_then(Value::as_object_mut)
        {
            for (key, piece) in roster.iter_mut() {
                if let Some(fields) = piece.as_object_mut() {
                    repair_piece(key, fields, &mut fixes);
                }
            }
        }

        let mut snapshot: Snapshot = serde_json::from_value(value)?;
        let state = &mut snapshot.state;
        for violation in integrity::repair(&mut state.board, &mut state.roster) {
            fixes.push(Recovery::Integrity { violation });
        }
        for fix in &fixes {
            warn!(?fix, "Recovered damaged snapshot");
        }
        Ok((snapshot, fixes))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<(Self, Vec<Recovery>)> {
        let json = fs::read_to_string(path)?;
        Self::recover(&json)
    }
}

fn repair_piece(key: &str, fields: &mut Map<String, Value>, fixes: &mut Vec<Recovery>) {
    let piece = key.to_string();

    match fields.get("trust").and_then(Value::as_f64) {
        Some(raw) if raw.is_finite() => {
            if raw < f64::from(TRUST_MIN) || raw > f64::from(TRUST_MAX) {
                let clamped = (raw as f32).clamp(TRUST_MIN, TRUST_MAX);
                fields.insert("trust".into(), Value::from(clamped));
                fixes.push(Recovery::TrustClamped {
                    piece: piece.clone(),
                    from: raw,
                    to: clamped,
                });
            }
        }
        _ => {
            fields.insert("trust".into(), Value::from(0.0_f32));
            fixes.push(Recovery::TrustReset { piece: piece.clone() });
        }
    }

    let readable = fields
        .get("emotional_state")
        .map(|v| serde_json::from_value::<EmotionalState>(v.clone()).is_ok())
        .unwrap_or(false);
    if !readable {
        if let Ok(regulated) = serde_json::to_value(EmotionalState::Regulated) {
            fields.insert("emotional_state".into(), regulated);
        }
        fixes.push(Recovery::StateDefaulted { piece });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::TeamRegistry;
    use crate::core::config::SimulationConfig;
    use crate::core::types::PieceId;

    fn game() -> Match<SeededRng> {
        let registry = TeamRegistry::with_builtins().unwrap();
        let state = GameState::setup(
            registry.get("hearthside").unwrap(),
            registry.get("ironclad").unwrap(),
            SimulationConfig::default(),
        )
        .unwrap();
        Match::new(state, SeededRng::with_seed(5))
    }

    #[test]
    fn test_clean_snapshot_needs_no_recovery() {
        let json = Snapshot::capture(&game()).to_json().unwrap();
        let (snapshot, fixes) = Snapshot::recover(&json).unwrap();
        assert!(fixes.is_empty());
        assert_eq!(snapshot.to_json().unwrap(), json);
    }

    #[test]
    fn test_damaged_trust_and_state_recovered() {
        let json = Snapshot::capture(&game()).to_json().unwrap();
        let mut value: Value = serde_json::from_str(&json).unwrap();
        let roster = value["state"]["roster"].as_object_mut().unwrap();
        roster["1"]["trust"] = Value::from("lots");
        roster["2"]["trust"] = Value::from(42.0);
        roster["3"].as_object_mut().unwrap().remove("emotional_state");

        let (snapshot, fixes) = Snapshot::recover(&value.to_string()).unwrap();
        assert_eq!(fixes.len(), 3);
        assert!(fixes.contains(&Recovery::TrustReset { piece: "1".into() }));
        assert!(fixes.contains(&Recovery::StateDefaulted { piece: "3".into() }));
        let roster = &snapshot.state.roster;
        assert_eq!(roster.get(PieceId(1)).unwrap().trust.value(), 0.0);
        assert_eq!(roster.get(PieceId(2)).unwrap().trust.value(), TRUST_MAX);
        assert!(roster.get(PieceId(3)).unwrap().is_regulated());
    }

    #[test]
    fn test_strict_parse_rejects_damage() {
        let json = Snapshot::capture(&game()).to_json().unwrap();
        let mut value: Value = serde_json::from_str(&json).unwrap();
        value["state"]["roster"]["1"]["trust"] = Value::from("lots");
        assert!(Snapshot::from_json(&value.to_string()).is_err());
    }
}
