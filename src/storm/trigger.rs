//! Storm formation
//!
//! Specific events (a defection, a trust collapse, an overwhelmed team, a
//! capture last round) are rolled first and pick the storm type by relevance.
//! Otherwise a scaled base chance rolls and the team's own storm weights pick
//! the type.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::rng::GameRng;
use crate::piece::Roster;
use crate::storm::types::{StormTrigger, StormType};

/// Things that happened during the round that can set off a storm
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSignals {
    pub capture: bool,
    pub defection: bool,
}

/// Average trust below which a trust collapse can trigger a storm
pub const TRUST_COLLAPSE_AVERAGE: f32 = 0.0;
/// Fraction of the team dysregulated that counts as overwhelmed
pub const OVERWHELM_RATIO: f32 = 0.5;
/// Weight discount for a storm type seen in recent history
pub const RECENCY_DISCOUNT: f32 = 0.3;
/// How many of the latest storms count as recent for type selection
pub const RECENT_TYPES: usize = 3;

impl StormTrigger {
    /// Chance this trigger produces a storm once its condition holds
    pub fn chance(&self) -> f32 {
        match self {
            StormTrigger::Betrayal => 1.0,
            StormTrigger::TrustCollapse => 0.5,
            StormTrigger::Overwhelm => 0.6,
            StormTrigger::Capture => 0.3,
            StormTrigger::Random => 0.0,
        }
    }

    /// How strongly each storm type answers this trigger
    pub fn relevance(&self) -> &'static [(StormType, f32)] {
        match self {
            StormTrigger::Betrayal => &[
                (StormType::Abandonment, 3.0),
                (StormType::Rage, 1.0),
                (StormType::Grief, 1.0),
            ],
            StormTrigger::TrustCollapse => &[
                (StormType::Abandonment, 2.0),
                (StormType::Dissociation, 2.0),
                (StormType::Grief, 1.0),
            ],
            StormTrigger::Overwhelm => &[
                (StormType::Panic, 3.0),
                (StormType::Dissociation, 1.0),
                (StormType::Rage, 1.0),
            ],
            StormTrigger::Capture => &[
                (StormType::Grief, 3.0),
                (StormType::Rage, 1.0),
                (StormType::Panic, 1.0),
            ],
            StormTrigger::Random => &[],
        }
    }
}

/// Team-level readings the trigger check works from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeamPulse {
    pub pieces: usize,
    pub average_trust: f32,
    pub dysregulated_ratio: f32,
}

impl TeamPulse {
    pub fn read(roster: &Roster) -> Self {
        let pieces: Vec<_> = roster.iter().filter(|p| p.is_emotional()).collect();
        if pieces.is_empty() {
            return Self {
                pieces: 0,
                average_trust: 0.0,
                dysregulated_ratio: 0.0,
            };
        }
        let n = pieces.len() as f32;
        Self {
            pieces: pieces.len(),
            average_trust: pieces.iter().map(|p| p.trust.value()).sum::<f32>() / n,
            dysregulated_ratio: pieces.iter().filter(|p| !p.is_regulated()).count() as f32 / n,
        }
    }
}

/// Specific triggers whose conditions hold this round, strongest first
pub fn specific_triggers(pulse: &TeamPulse, signals: &RoundSignals) -> Vec<StormTrigger> {
    let mut fired = Vec::new();
    if signals.defection {
        fired.push(StormTrigger::Betrayal);
    }
    if pulse.average_trust < TRUST_COLLAPSE_AVERAGE {
        fired.push(StormTrigger::TrustCollapse);
    }
    if pulse.dysregulated_ratio >= OVERWHELM_RATIO {
        fired.push(StormTrigger::Overwhelm);
    }
    if signals.capture {
        fired.push(StormTrigger::Capture);
    }
    fired
}

/// Chance of an unprompted storm this round
pub fn random_chance(pulse: &TeamPulse, signals: &RoundSignals, config: &SimulationConfig) -> f32 {
    let mut scale = 1.0;
    if pulse.average_trust < 3.0 {
        scale += (3.0 - pulse.average_trust) * 0.1;
    }
    scale += pulse.dysregulated_ratio * 0.5;
    if signals.capture {
        scale += 0.2;
    }
    (config.storm_base_chance * scale).min(config.storm_max_chance)
}

fn pick(weights: &BTreeMap<StormType, f32>, rng: &mut dyn GameRng) -> Option<StormType> {
    let types: Vec<StormType> = weights.keys().copied().collect();
    let values: Vec<f32> = types.iter().map(|t| weights[t]).collect();
    rng.weighted_index(&values).map(|i| types[i])
}

/// Choose a storm type answering the fired triggers, discounting recent types
pub fn type_for_triggers(triggers: &[StormTrigger], recent: &[StormType], rng: &mut dyn GameRng) -> Option<StormType> {
    let mut weights: BTreeMap<StormType, f32> = BTreeMap::new();
    for trigger in triggers {
        for (kind, w) in trigger.relevance() {
            *weights.entry(*kind).or_insert(0.0) += w;
        }
    }
    for (kind, w) in weights.iter_mut() {
        if recent.contains(kind) {
            *w *= RECENCY_DISCOUNT;
        }
    }
    pick(&weights, rng)
}

/// Choose from the team's flavour weights; an empty table weighs every type equally
pub fn type_from_team(team_weights: &BTreeMap<StormType, f32>, rng: &mut dyn GameRng) -> Option<StormType> {
    if team_weights.values().all(|w| *w <= 0.0) {
        let uniform: BTreeMap<StormType, f32> = StormType::ALL.iter().map(|t| (*t, 1.0)).collect();
        return pick(&uniform, rng);
    }
    pick(team_weights, rng)
}

/// Roll for a new storm; the caller has already checked cooldown and that no storm is active
pub fn roll(
    roster: &Roster,
    signals: &RoundSignals,
    team_weights: &BTreeMap<StormType, f32>,
    recent: &[StormType],
    config: &SimulationConfig,
    rng: &mut dyn GameRng,
) -> Option<(StormType, StormTrigger)> {
    let pulse = TeamPulse::read(roster);
    if pulse.pieces == 0 {
        return None;
    }

    let fired: Vec<StormTrigger> = specific_triggers(&pulse, signals)
        .into_iter()
        .filter(|t| rng.chance(t.chance()))
        .collect();
    if let Some(first) = fired.first().copied() {
        return type_for_triggers(&fired, recent, rng).map(|kind| (kind, first));
    }

    if rng.chance(random_chance(&pulse, signals, config)) {
        return type_from_team(team_weights, rng).map(|kind| (kind, StormTrigger::Random));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::moves::tests::layout;
    use crate::core::rng::ScriptedRng;
    use crate::core::types::{PieceId, Team};
    use crate::piece::Trust;

    #[test]
    fn test_betrayal_always_fires() {
        let (_, roster) = layout(&[(1, Team::Player, 5, 0, false)]);
        let signals = RoundSignals {
            capture: false,
            defection: true,
        };
        // betrayal chance roll, then type roll lands in the abandonment band
        let mut rng = ScriptedRng::new([0.99, 0.1]);
        let storm = roll(&roster, &signals, &BTreeMap::new(), &[], &SimulationConfig::default(), &mut rng);
        assert_eq!(storm, Some((StormType::Abandonment, StormTrigger::Betrayal)));
    }

    #[test]
    fn test_recent_type_discounted() {
        // Grief 3 vs Rage 1 vs Panic 1; a recent grief drops to 0.9 of 2.9
        let mut rng = ScriptedRng::new([0.5]);
        let kind = type_for_triggers(&[StormTrigger::Capture], &[StormType::Grief], &mut rng);
        // order: Rage(1.0), Grief(0.9), Panic(1.0); 0.5 * 2.9 = 1.45 falls in Grief
        assert_eq!(kind, Some(StormType::Grief));
        let mut rng = ScriptedRng::new([0.2]);
        let kind = type_for_triggers(&[StormTrigger::Capture], &[StormType::Grief], &mut rng);
        assert_eq!(kind, Some(StormType::Rage));
    }

    #[test]
    fn test_random_chance_scales_and_caps() {
        let config = SimulationConfig::default();
        let calm = TeamPulse {
            pieces: 4,
            average_trust: 5.0,
            dysregulated_ratio: 0.0,
        };
        assert!((random_chance(&calm, &RoundSignals::default(), &config) - 0.1).abs() < 1e-6);
        let rough = TeamPulse {
            pieces: 4,
            average_trust: -5.0,
            dysregulated_ratio: 1.0,
        };
        let capture = RoundSignals {
            capture: true,
            defection: false,
        };
        // 0.1 * (1 + 0.8 + 0.5 + 0.2)
        assert!((random_chance(&rough, &capture, &config) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_trust_collapse_detected() {
        let (_, mut roster) = layout(&[(1, Team::Player, 5, 0, false)]);
        roster.get_mut(PieceId(1)).unwrap().trust = Trust::new(-1.0);
        let pulse = TeamPulse::read(&roster);
        assert_eq!(
            specific_triggers(&pulse, &RoundSignals::default()),
            vec![StormTrigger::TrustCollapse]
        );
    }

    #[test]
    fn test_no_storm_without_player_pieces() {
        let roster = Roster::new();
        let mut rng = ScriptedRng::new([0.0, 0.0]);
        let signals = RoundSignals {
            capture: true,
            defection: true,
        };
        assert!(roll(&roster, &signals, &BTreeMap::new(), &[], &SimulationConfig::default(), &mut rng).is_none());
    }
}
