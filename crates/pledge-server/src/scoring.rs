//! Peace Seal scoring workflow.
//!
//! Scores are advisor-assigned on a 0..=100 scale; section weights describe
//! importance to reviewers but are never summed automatically.  The engine
//! validates preconditions in a fixed order, persists the review, and
//! reports the resulting badge tier.

use serde::Serialize;
use uuid::Uuid;

use pledge_store::{Database, StoreError};

use pledge_shared::{BadgeTier, CompanyStatus, PaymentStatus};

use crate::error::ApiError;

/// The persisted result of an advisor review.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    pub company_id: Uuid,
    pub score: f64,
    pub status: CompanyStatus,
    pub badge: BadgeTier,
    pub reviewed_by: Uuid,
}

/// Assign an advisor score to a company.
///
/// Preconditions, checked in order, each with its own failure:
/// 1. the questionnaire must be 100% complete for the company's size tier;
/// 2. the application fee must be paid;
/// 3. `manual_score` must be a finite number in `[0, 100]`.
///
/// The target `status` is the advisor's judgment; the engine does not
/// second-guess it.
pub fn score_company(
    db: &Database,
    company_id: Uuid,
    manual_score: f64,
    status: CompanyStatus,
    reviewed_by: Uuid,
    notes: Option<&str>,
) -> Result<ReviewOutcome, ApiError> {
    let company = db.get_company(company_id).map_err(|e| match e {
        StoreError::NotFound => ApiError::NotFound(format!("company {company_id}")),
        other => other.into(),
    })?;

    let completion = db.company_completion_rate(&company)?;
    if completion < 100.0 {
        return Err(ApiError::IncompleteQuestionnaire { completion });
    }

    if company.payment_status != PaymentStatus::Paid {
        return Err(ApiError::PaymentRequired);
    }

    if !manual_score.is_finite() || !(0.0..=100.0).contains(&manual_score) {
        return Err(ApiError::InvalidScore(manual_score));
    }

    db.apply_company_review(company_id, manual_score, status, reviewed_by, notes)?;

    let badge = BadgeTier::from_score(manual_score);
    tracing::info!(
        company = %company_id,
        score = manual_score,
        status = %status,
        badge = %badge,
        reviewer = %reviewed_by,
        "Company scored"
    );

    Ok(ReviewOutcome {
        company_id,
        score: manual_score,
        status,
        badge,
        reviewed_by,
    })
}
