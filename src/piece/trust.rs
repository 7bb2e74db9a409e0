//! Trust: bounded accumulator of a piece's confidence in the player

use serde::{Deserialize, Serialize};

pub const TRUST_MIN: f32 = -5.0;
pub const TRUST_MAX: f32 = 10.0;

/// Entering this band is a "deep trust" milestone
pub const DEEP_TRUST: f32 = 7.0;

/// At or below this, the piece is flagged as a defection risk
pub const DEFECTION_RISK_TRUST: f32 = -3.0;

/// At or below this, the piece starts planning to defect
pub const PLANNING_DEFECTION_TRUST: f32 = -4.0;

/// At or below this, defection is forced
pub const DEFECTION_TRUST: f32 = TRUST_MIN;

/// Trust value, always within [TRUST_MIN, TRUST_MAX]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct Trust(f32);

impl Trust {
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self(0.0);
        }
        Self(value.clamp(TRUST_MIN, TRUST_MAX))
    }

    pub fn value(&self) -> f32 {
        self.0
    }

    pub fn adjust(&mut self, delta: f32) -> TrustChange {
        let before = self.0;
        *self = Trust::new(before + delta);
        TrustChange {
            before,
            after: self.0,
        }
    }

    /// Linear position of trust inside its domain (0.0 at MIN, 1.0 at MAX)
    pub fn normalized(&self) -> f32 {
        (self.0 - TRUST_MIN) / (TRUST_MAX - TRUST_MIN)
    }

    pub fn is_deep(&self) -> bool {
        self.0 >= DEEP_TRUST
    }

    pub fn at_defection_floor(&self) -> bool {
        self.0 <= DEFECTION_TRUST
    }
}

impl Default for Trust {
    fn default() -> Self {
        Self(0.0)
    }
}

impl From<f32> for Trust {
    fn from(value: f32) -> Self {
        Trust::new(value)
    }
}

impl From<Trust> for f32 {
    fn from(trust: Trust) -> Self {
        trust.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustMilestone {
    EnteredDeepTrust,
    LeftDeepTrust,
    FellBelowZero,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrustChange {
    pub before: f32,
    pub after: f32,
}

impl TrustChange {
    pub fn delta(&self) -> f32 {
        self.after - self.before
    }

    pub fn milestones(&self) -> Vec<TrustMilestone> {
        let mut crossed = Vec::new();
        if self.before < DEEP_TRUST && self.after >= DEEP_TRUST {
            crossed.push(TrustMilestone::EnteredDeepTrust);
        }
        if self.before >= DEEP_TRUST && self.after < DEEP_TRUST {
            crossed.push(TrustMilestone::LeftDeepTrust);
        }
        if self.before >= 0.0 && self.after < 0.0 {
            crossed.push(TrustMilestone::FellBelowZero);
        }
        crossed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trust_clamps_both_ends() {
        let mut t = Trust::new(9.0);
        t.adjust(5.0);
        assert_eq!(t.value(), TRUST_MAX);
        t.adjust(-100.0);
        assert_eq!(t.value(), TRUST_MIN);
    }

    #[test]
    fn test_nan_recovers_to_zero() {
        assert_eq!(Trust::new(f32::NAN).value(), 0.0);
    }

    #[test]
    fn test_deserialize_clamps() {
        let t: Trust = serde_json::from_str("42.0").unwrap();
        assert_eq!(t.value(), TRUST_MAX);
    }

    #[test]
    fn test_milestones() {
        let mut t = Trust::new(6.5);
        let change = t.adjust(1.0);
        assert_eq!(change.milestones(), vec![TrustMilestone::EnteredDeepTrust]);

        let change = t.adjust(-8.0);
        assert_eq!(
            change.milestones(),
            vec![TrustMilestone::LeftDeepTrust, TrustMilestone::FellBelowZero]
        );
    }

    #[test]
    fn test_normalized() {
        assert_eq!(Trust::new(TRUST_MIN).normalized(), 0.0);
        assert_eq!(Trust::new(TRUST_MAX).normalized(), 1.0);
    }
}
