//! Peace Seal badge tiers.

use serde::{Deserialize, Serialize};

/// Certification tier derived from a company's final advisor-assigned score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTier {
    None,
    Bronze,
    Silver,
    Gold,
}

impl BadgeTier {
    /// Map a 0..=100 score to its badge tier.
    ///
    /// Boundaries are inclusive on the lower edge: 70 is already Bronze,
    /// 90 is already Silver, and only a full 100 earns Gold.
    pub fn from_score(score: f64) -> Self {
        if score >= 100.0 {
            BadgeTier::Gold
        } else if score >= 90.0 {
            BadgeTier::Silver
        } else if score >= 70.0 {
            BadgeTier::Bronze
        } else {
            BadgeTier::None
        }
    }
}

impl std::fmt::Display for BadgeTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BadgeTier::None => "none",
            BadgeTier::Bronze => "bronze",
            BadgeTier::Silver => "silver",
            BadgeTier::Gold => "gold",
        };
        f.write_str(s)
    }
}
