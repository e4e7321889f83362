//! Point-in-time summary counts for the admin dashboard.

use chrono::{DateTime, Utc};
use serde::Serialize;

use pledge_store::{Database, StoreError};

use pledge_shared::InteractionKind;

/// Interaction tallies by type.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct InteractionCounts {
    pub likes: u64,
    pub dislikes: u64,
    pub shares: u64,
}

/// Summary counts, scoped globally or to one campaign.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub solutions_published: u64,
    pub interactions: InteractionCounts,
    pub comments: u64,
    pub pledges: u64,
    pub updated_at: DateTime<Utc>,
}

/// Compute summary counts.  `campaign_id: None` means global scope.
///
/// A campaign with zero published solutions short-circuits the
/// interaction/comment reads to zero without issuing them.  Pledges attach
/// to the campaign directly, so they are counted either way.  An unknown
/// campaign id is simply a zero-result scope, not an error.
pub fn summarize(db: &Database, campaign_id: Option<&str>) -> Result<Summary, StoreError> {
    let solution_ids = db.published_solution_ids(campaign_id)?;

    let (interactions, comments) = if solution_ids.is_empty() {
        (InteractionCounts::default(), 0)
    } else {
        let mut counts = InteractionCounts::default();
        for interaction in db.active_interactions(Some(&solution_ids), None, None)? {
            match interaction.kind {
                InteractionKind::Like => counts.likes += 1,
                InteractionKind::Dislike => counts.dislikes += 1,
                InteractionKind::Share => counts.shares += 1,
            }
        }
        let comments = db.active_comments(Some(&solution_ids), None, None)?.len() as u64;
        (counts, comments)
    };

    let pledges = u64::from(db.count_active_pledges(campaign_id)?);

    Ok(Summary {
        solutions_published: solution_ids.len() as u64,
        interactions,
        comments,
        pledges,
        updated_at: Utc::now(),
    })
}
