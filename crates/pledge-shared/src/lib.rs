//! # pledge-shared
//!
//! Domain types shared between the Pledge4Peace store and API server:
//! status enums, caller roles, Peace Seal badge tiers, and the size-tiered
//! questionnaire section schema.

pub mod badge;
pub mod questionnaire;
pub mod types;

pub use badge::BadgeTier;
pub use questionnaire::{
    completion_rate, required_section_ids, sections_for, CompanySizeTier, SectionSchema,
};
pub use types::*;
