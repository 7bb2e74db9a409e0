//! Storm catalog and phases

use serde::{Deserialize, Serialize};

use crate::core::config::PhaseDurations;
use crate::piece::emotion::StateSet;
use crate::piece::DysregulationKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StormType {
    Abandonment,
    Rage,
    Grief,
    Panic,
    Dissociation,
}

impl StormType {
    pub const ALL: [StormType; 5] = [
        StormType::Abandonment,
        StormType::Rage,
        StormType::Grief,
        StormType::Panic,
        StormType::Dissociation,
    ];

    pub fn label(&self) -> &'static str {
        self.profile().name
    }

    pub fn profile(&self) -> &'static StormProfile {
        match self {
            StormType::Abandonment => &ABANDONMENT,
            StormType::Rage => &RAGE,
            StormType::Grief => &GRIEF,
            StormType::Panic => &PANIC,
            StormType::Dissociation => &DISSOCIATION,
        }
    }
}

/// Extra effect a storm applies on every active and peak tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StormEffect {
    /// Dysregulated pieces get an extra, weaker contagion pass
    ContagionBurst,
    /// All relationships shrink toward zero
    RelationshipScatter,
    /// Bonds to teammates that are not adjacent weaken
    ConnectionDecay,
}

#[derive(Debug)]
pub struct StormProfile {
    pub name: &'static str,
    pub base_intensity: f32,
    pub dysregulation_chance: f32,
    /// State the storm pushes pieces into
    pub induces: DysregulationKind,
    pub vulnerable: StateSet,
    pub resistant: StateSet,
    /// Trust change per tick at full intensity
    pub trust_delta: f32,
    pub effect: StormEffect,
}

static ABANDONMENT: StormProfile = StormProfile {
    name: "Abandonment",
    base_intensity: 0.8,
    dysregulation_chance: 0.5,
    induces: DysregulationKind::Fawn,
    vulnerable: StateSet::EMPTY
        .with_kind(DysregulationKind::Fawn)
        .with_kind(DysregulationKind::Shutdown),
    resistant: StateSet::EMPTY.with_kind(DysregulationKind::Fight),
    trust_delta: -0.3,
    effect: StormEffect::ConnectionDecay,
};

static RAGE: StormProfile = StormProfile {
    name: "Rage",
    base_intensity: 0.9,
    dysregulation_chance: 0.6,
    induces: DysregulationKind::Fight,
    vulnerable: StateSet::EMPTY
        .with_kind(DysregulationKind::Fight)
        .with_kind(DysregulationKind::Anxious),
    resistant: StateSet::EMPTY
        .with_kind(DysregulationKind::Shutdown)
        .with_kind(DysregulationKind::Freeze),
    trust_delta: -0.2,
    effect: StormEffect::RelationshipScatter,
};

static GRIEF: StormProfile = StormProfile {
    name: "Grief",
    base_intensity: 0.7,
    dysregulation_chance: 0.5,
    induces: DysregulationKind::Shutdown,
    vulnerable: StateSet::EMPTY
        .with_kind(DysregulationKind::Shutdown)
        .with_kind(DysregulationKind::Freeze),
    resistant: StateSet::EMPTY.with_kind(DysregulationKind::Fight),
    trust_delta: -0.2,
    effect: StormEffect::ConnectionDecay,
};

static PANIC: StormProfile = StormProfile {
    name: "Panic",
    base_intensity: 1.0,
    dysregulation_chance: 0.7,
    induces: DysregulationKind::Anxious,
    vulnerable: StateSet::EMPTY
        .with_kind(DysregulationKind::Anxious)
        .with_kind(DysregulationKind::Freeze),
    resistant: StateSet::EMPTY.with_kind(DysregulationKind::Shutdown),
    trust_delta: -0.2,
    effect: StormEffect::ContagionBurst,
};

static DISSOCIATION: StormProfile = StormProfile {
    name: "Dissociation",
    base_intensity: 0.75,
    dysregulation_chance: 0.55,
    induces: DysregulationKind::Freeze,
    vulnerable: StateSet::EMPTY
        .with_kind(DysregulationKind::Freeze)
        .with_kind(DysregulationKind::Shutdown),
    resistant: StateSet::EMPTY
        .with_kind(DysregulationKind::Anxious)
        .with_kind(DysregulationKind::Fight),
    trust_delta: -0.1,
    effect: StormEffect::RelationshipScatter,
};

/// Storm lifecycle phase; "no storm" is the absence of an active storm
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StormPhase {
    Approaching,
    Active,
    Peak,
    Passing,
}

impl StormPhase {
    pub const SEQUENCE: [StormPhase; 4] = [
        StormPhase::Approaching,
        StormPhase::Active,
        StormPhase::Peak,
        StormPhase::Passing,
    ];

    pub fn multiplier(&self) -> f32 {
        match self {
            StormPhase::Approaching => 0.3,
            StormPhase::Active => 0.7,
            StormPhase::Peak => 1.0,
            StormPhase::Passing => 0.4,
        }
    }

    /// Phases are strictly forward; Passing leads out of the storm
    pub fn next(&self) -> Option<StormPhase> {
        match self {
            StormPhase::Approaching => Some(StormPhase::Active),
            StormPhase::Active => Some(StormPhase::Peak),
            StormPhase::Peak => Some(StormPhase::Passing),
            StormPhase::Passing => None,
        }
    }

    pub fn duration(&self, durations: &PhaseDurations) -> u32 {
        match self {
            StormPhase::Approaching => durations.approaching,
            StormPhase::Active => durations.active,
            StormPhase::Peak => durations.peak,
            StormPhase::Passing => durations.passing,
        }
    }

    /// Phases in which the storm acts on pieces
    pub fn is_turbulent(&self) -> bool {
        matches!(self, StormPhase::Active | StormPhase::Peak)
    }
}

/// Why a storm formed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StormTrigger {
    Random,
    Capture,
    Betrayal,
    TrustCollapse,
    Overwhelm,
}
