//! Domain model structs persisted in the SQLite database.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be handed
//! directly to the API layer as JSON; field names are camelCase on the
//! wire to match the rest of the API surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use pledge_shared::{
    ActivityStatus, CommentStatus, CompanyStatus, InteractionKind, PaymentStatus, Role,
    SolutionStatus,
};

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A registered platform user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Optional avatar URL.
    pub image: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Solution
// ---------------------------------------------------------------------------

/// A user-authored proposal attached to a campaign and a party.
///
/// Only `published` solutions count toward party/campaign caps and
/// analytics aggregates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Solution {
    pub id: Uuid,
    /// CMS campaign id (campaigns themselves are CMS-managed).
    pub campaign_id: String,
    pub user_id: Uuid,
    /// CMS party id within the campaign.
    pub party_id: String,
    pub title: String,
    pub description: String,
    pub status: SolutionStatus,
    /// Free-form JSON metadata.
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Interaction
// ---------------------------------------------------------------------------

/// A like/dislike/share action on a solution.  Immutable once created
/// except for the soft-removal status flip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub id: Uuid,
    pub solution_id: Uuid,
    pub user_id: Uuid,
    pub kind: InteractionKind,
    pub status: ActivityStatus,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Comment
// ---------------------------------------------------------------------------

/// A comment on a solution, threaded via `parent_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub solution_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub status: CommentStatus,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Pledge
// ---------------------------------------------------------------------------

/// A user's recorded commitment to a campaign.  One per (campaign, user).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pledge {
    pub id: Uuid,
    pub campaign_id: String,
    pub user_id: Uuid,
    pub agree_to_terms: bool,
    pub subscribe_to_updates: bool,
    pub status: ActivityStatus,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Company (Peace Seal)
// ---------------------------------------------------------------------------

/// A company applying for Peace Seal certification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub status: CompanyStatus,
    /// Advisor-assigned score on the 0..=100 scale, set at review time.
    pub score: Option<f64>,
    pub payment_status: PaymentStatus,
    pub employee_count: u32,
    pub advisor_user_id: Option<Uuid>,
    pub review_notes: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One answered questionnaire section for a company.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireAnswer {
    pub id: Uuid,
    pub company_id: Uuid,
    pub section_id: String,
    /// JSON blob of per-field answers; opaque to the store.
    pub answers: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Row-mapping helpers shared by the per-table modules
// ---------------------------------------------------------------------------

pub(crate) fn uuid_col(idx: usize, s: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

pub(crate) fn ts_col(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

pub(crate) fn status_col<T>(
    idx: usize,
    s: &str,
    parse: fn(&str) -> Result<T, pledge_shared::ParseStatusError>,
) -> rusqlite::Result<T> {
    parse(s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

pub(crate) fn json_col(idx: usize, s: &str) -> rusqlite::Result<serde_json::Value> {
    serde_json::from_str(s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
