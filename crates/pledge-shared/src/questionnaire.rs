//! Size-tiered questionnaire section schema for Peace Seal applications.
//!
//! Each company-size tier has its own set of sections.  Required section
//! weights sum to exactly 100; optional sections add up to 5 bonus points
//! each.  The weights describe section importance to advisors and the UI --
//! the final score is advisor-assigned, not computed from answers.

use serde::{Deserialize, Serialize};

/// Company-size tier, derived from headcount at application time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CompanySizeTier {
    /// Up to 20 employees.
    Small,
    /// 21 to 50 employees.
    Medium,
    /// More than 50 employees.
    Large,
}

impl CompanySizeTier {
    pub fn from_employee_count(count: u32) -> Self {
        match count {
            0..=20 => CompanySizeTier::Small,
            21..=50 => CompanySizeTier::Medium,
            _ => CompanySizeTier::Large,
        }
    }
}

/// One questionnaire section as shown to the applicant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectionSchema {
    /// Stable identifier, also the foreign key of stored answers.
    pub id: &'static str,
    pub title: &'static str,
    /// Percentage contribution toward the 0..=100 score scale.
    pub weight: u32,
    /// Optional sections contribute bonus weight and do not gate completion.
    pub optional: bool,
}

const fn section(id: &'static str, title: &'static str, weight: u32) -> SectionSchema {
    SectionSchema {
        id,
        title,
        weight,
        optional: false,
    }
}

const fn bonus(id: &'static str, title: &'static str) -> SectionSchema {
    SectionSchema {
        id,
        title,
        weight: 5,
        optional: true,
    }
}

const SMALL_SECTIONS: &[SectionSchema] = &[
    section("workplace_culture", "Workplace Culture & Wellbeing", 30),
    section("ethical_governance", "Ethical Governance", 25),
    section("community_impact", "Community Impact", 25),
    section("conflict_resolution", "Conflict Resolution Practices", 20),
    bonus("supply_chain", "Supply Chain Transparency"),
];

const MEDIUM_SECTIONS: &[SectionSchema] = &[
    section("workplace_culture", "Workplace Culture & Wellbeing", 25),
    section("ethical_governance", "Ethical Governance", 20),
    section("community_impact", "Community Impact", 20),
    section("conflict_resolution", "Conflict Resolution Practices", 20),
    section("supply_chain", "Supply Chain Transparency", 15),
    bonus("peace_advocacy", "Public Peace Advocacy"),
];

const LARGE_SECTIONS: &[SectionSchema] = &[
    section("workplace_culture", "Workplace Culture & Wellbeing", 20),
    section("ethical_governance", "Ethical Governance", 20),
    section("community_impact", "Community Impact", 15),
    section("conflict_resolution", "Conflict Resolution Practices", 15),
    section("supply_chain", "Supply Chain Transparency", 15),
    section("global_operations", "Global Operations & Human Rights", 15),
    bonus("peace_advocacy", "Public Peace Advocacy"),
    bonus("industry_leadership", "Industry Peace Leadership"),
];

/// The section schema for a company-size tier.
pub fn sections_for(tier: CompanySizeTier) -> &'static [SectionSchema] {
    match tier {
        CompanySizeTier::Small => SMALL_SECTIONS,
        CompanySizeTier::Medium => MEDIUM_SECTIONS,
        CompanySizeTier::Large => LARGE_SECTIONS,
    }
}

/// Required (non-optional) section ids for a tier.
pub fn required_section_ids(tier: CompanySizeTier) -> impl Iterator<Item = &'static str> {
    sections_for(tier)
        .iter()
        .filter(|s| !s.optional)
        .map(|s| s.id)
}

/// Completion rate in percent, given the set of answered section ids.
///
/// Only required sections count; answering optional sections never raises
/// the rate above what the required sections yield.  Unknown section ids
/// are ignored.
pub fn completion_rate(tier: CompanySizeTier, answered: &[String]) -> f64 {
    let required: Vec<&str> = required_section_ids(tier).collect();
    if required.is_empty() {
        return 100.0;
    }
    let done = required
        .iter()
        .filter(|id| answered.iter().any(|a| a == *id))
        .count();
    (done as f64 / required.len() as f64) * 100.0
}
