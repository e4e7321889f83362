//! Merged recent-activity feed for the admin dashboard.
//!
//! Three heterogeneous streams (interactions, comments, pledges) are fetched
//! independently, merged newest-first, truncated, and then enriched with
//! user/solution metadata via batch lookups -- never one query per item.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use pledge_store::{Database, StoreError};

use pledge_shared::InteractionKind;

/// Feed size bounds.
pub const MIN_LIMIT: u32 = 1;
pub const MAX_LIMIT: u32 = 200;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Interaction,
    Comment,
    Pledge,
}

/// Per-item metadata.  Enrichment fields stay `None` when the referenced
/// user or solution no longer resolves; a gap never fails the feed.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityMeta {
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution_campaign_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interaction_kind: Option<InteractionKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityItem {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub created_at: DateTime<Utc>,
    pub meta: ActivityMeta,
}

impl Default for ActivityMeta {
    fn default() -> Self {
        Self {
            user_id: Uuid::nil(),
            user_name: None,
            user_email: None,
            user_image: None,
            solution_id: None,
            solution_title: None,
            solution_campaign_id: None,
            interaction_kind: None,
            campaign_id: None,
        }
    }
}

/// Build the merged feed, newest first.
///
/// When `campaign_id` is given, interactions and comments are scoped to
/// that campaign's published solutions; a campaign with none yields empty
/// streams rather than falling back to global.  `limit` is clamped to
/// `[1, 200]`.
pub fn recent_activity(
    db: &Database,
    campaign_id: Option<&str>,
    since: Option<DateTime<Utc>>,
    limit: u32,
) -> Result<Vec<ActivityItem>, StoreError> {
    let limit = limit.clamp(MIN_LIMIT, MAX_LIMIT);

    let solution_ids = campaign_id
        .map(|campaign| db.published_solution_ids(Some(campaign)))
        .transpose()?;
    let scope = solution_ids.as_deref();

    let mut items: Vec<ActivityItem> = Vec::new();

    for interaction in db.active_interactions(scope, since, Some(limit))? {
        items.push(ActivityItem {
            kind: ActivityKind::Interaction,
            created_at: interaction.created_at,
            meta: ActivityMeta {
                user_id: interaction.user_id,
                solution_id: Some(interaction.solution_id),
                interaction_kind: Some(interaction.kind),
                ..Default::default()
            },
        });
    }
    for comment in db.active_comments(scope, since, Some(limit))? {
        items.push(ActivityItem {
            kind: ActivityKind::Comment,
            created_at: comment.created_at,
            meta: ActivityMeta {
                user_id: comment.user_id,
                solution_id: Some(comment.solution_id),
                ..Default::default()
            },
        });
    }
    for pledge in db.active_pledges(campaign_id, since, Some(limit))? {
        items.push(ActivityItem {
            kind: ActivityKind::Pledge,
            created_at: pledge.created_at,
            meta: ActivityMeta {
                user_id: pledge.user_id,
                campaign_id: Some(pledge.campaign_id),
                ..Default::default()
            },
        });
    }

    // Each stream arrives pre-sorted; a single stable sort over at most
    // 3 * limit items is plenty at this scale.
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    items.truncate(limit as usize);

    enrich(db, &mut items)?;
    Ok(items)
}

/// Splice user and solution metadata into the merged items using at most
/// one batch query per entity type.
fn enrich(db: &Database, items: &mut [ActivityItem]) -> Result<(), StoreError> {
    let user_ids: Vec<Uuid> = items
        .iter()
        .map(|item| item.meta.user_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let solution_ids: Vec<Uuid> = items
        .iter()
        .filter_map(|item| item.meta.solution_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let users = db.get_users_by_ids(&user_ids)?;
    let solutions = db.get_solutions_by_ids(&solution_ids)?;

    for item in items.iter_mut() {
        if let Some(user) = users.get(&item.meta.user_id) {
            item.meta.user_name = Some(user.name.clone());
            item.meta.user_email = Some(user.email.clone());
            item.meta.user_image = user.image.clone();
        }
        if let Some(solution) = item
            .meta
            .solution_id
            .and_then(|id| solutions.get(&id))
        {
            item.meta.solution_title = Some(solution.title.clone());
            item.meta.solution_campaign_id = Some(solution.campaign_id.clone());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::params;

    use pledge_shared::{ActivityStatus, Role, SolutionStatus};
    use pledge_store::{Solution, User};

    fn user(db: &Database, name: &str) -> Uuid {
        let u = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{name}-{}@example.org", Uuid::new_v4()),
            image: Some(format!("https://img.example/{name}.png")),
            role: Role::User,
            created_at: Utc::now(),
        };
        db.insert_user(&u).unwrap();
        u.id
    }

    fn solution(db: &Database, campaign: &str) -> Solution {
        let now = Utc::now();
        let s = Solution {
            id: Uuid::new_v4(),
            campaign_id: campaign.to_string(),
            user_id: user(db, "author"),
            party_id: "a".to_string(),
            title: "Open the crossing".to_string(),
            description: "d".to_string(),
            status: SolutionStatus::Published,
            metadata: None,
            created_at: now,
            updated_at: now,
        };
        db.insert_solution(&s).unwrap();
        s
    }

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn raw_interaction(db: &Database, solution: Uuid, user: Uuid, ts: DateTime<Utc>) {
        db.conn()
            .execute(
                "INSERT INTO solution_interactions (id, solution_id, user_id, type, status, created_at)
                 VALUES (?1, ?2, ?3, 'like', ?4, ?5)",
                params![
                    Uuid::new_v4().to_string(),
                    solution.to_string(),
                    user.to_string(),
                    ActivityStatus::Active.as_str(),
                    ts.to_rfc3339(),
                ],
            )
            .unwrap();
    }

    fn raw_comment(db: &Database, solution: Uuid, user: Uuid, ts: DateTime<Utc>) {
        db.conn()
            .execute(
                "INSERT INTO comments (id, solution_id, user_id, content, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, 'c', 'active', ?4, ?4)",
                params![
                    Uuid::new_v4().to_string(),
                    solution.to_string(),
                    user.to_string(),
                    ts.to_rfc3339(),
                ],
            )
            .unwrap();
    }

    fn raw_pledge(db: &Database, campaign: &str, user: Uuid, ts: DateTime<Utc>) {
        db.conn()
            .execute(
                "INSERT INTO pledges (id, campaign_id, user_id, agree_to_terms, subscribe_to_updates, status, created_at)
                 VALUES (?1, ?2, ?3, 1, 0, 'active', ?4)",
                params![
                    Uuid::new_v4().to_string(),
                    campaign,
                    user.to_string(),
                    ts.to_rfc3339(),
                ],
            )
            .unwrap();
    }

    #[test]
    fn merged_feed_is_newest_first() {
        let db = Database::open_in_memory().unwrap();
        let s = solution(&db, "gaza");
        let u = user(&db, "amina");

        raw_interaction(&db, s.id, u, at("2026-08-20T00:00:05Z"));
        raw_comment(&db, s.id, u, at("2026-08-20T00:00:03Z"));
        raw_comment(&db, s.id, u, at("2026-08-20T00:00:07Z"));
        raw_pledge(&db, "gaza", u, at("2026-08-20T00:00:01Z"));

        let feed = recent_activity(&db, None, None, 10).unwrap();
        let kinds: Vec<ActivityKind> = feed.iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            [
                ActivityKind::Comment,     // t=7
                ActivityKind::Interaction, // t=5
                ActivityKind::Comment,     // t=3
                ActivityKind::Pledge,      // t=1
            ]
        );
        let times: Vec<_> = feed.iter().map(|i| i.created_at).collect();
        assert!(times.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn limit_truncates_after_merge() {
        let db = Database::open_in_memory().unwrap();
        let s = solution(&db, "gaza");
        let u = user(&db, "ben");

        for i in 0..5 {
            raw_interaction(&db, s.id, u, at(&format!("2026-08-20T00:00:0{i}Z")));
            raw_comment(&db, s.id, u, at(&format!("2026-08-21T00:00:0{i}Z")));
        }

        let feed = recent_activity(&db, None, None, 3).unwrap();
        assert_eq!(feed.len(), 3);
        // All newest items are comments from the 21st.
        assert!(feed.iter().all(|i| i.kind == ActivityKind::Comment));
    }

    #[test]
    fn enrichment_splices_user_and_solution() {
        let db = Database::open_in_memory().unwrap();
        let s = solution(&db, "gaza");
        let u = user(&db, "amina");
        raw_interaction(&db, s.id, u, at("2026-08-20T00:00:05Z"));

        let feed = recent_activity(&db, None, None, 10).unwrap();
        let meta = &feed[0].meta;
        assert_eq!(meta.user_name.as_deref(), Some("amina"));
        assert!(meta.user_email.is_some());
        assert_eq!(meta.solution_title.as_deref(), Some("Open the crossing"));
        assert_eq!(meta.solution_campaign_id.as_deref(), Some("gaza"));
    }

    #[test]
    fn missing_user_leaves_meta_unset() {
        let db = Database::open_in_memory().unwrap();
        let u = user(&db, "ghost");
        raw_pledge(&db, "gaza", u, at("2026-08-20T00:00:05Z"));
        // Leave the pledge row dangling to simulate an upstream user purge.
        db.conn()
            .pragma_update(None, "foreign_keys", "OFF")
            .unwrap();
        db.conn()
            .execute("DELETE FROM users WHERE id = ?1", params![u.to_string()])
            .unwrap();

        let feed = recent_activity(&db, None, None, 10).unwrap();
        assert_eq!(feed.len(), 1);
        assert!(feed[0].meta.user_name.is_none());
        assert_eq!(feed[0].meta.campaign_id.as_deref(), Some("gaza"));
    }

    #[test]
    fn scoped_feed_never_falls_back_to_global() {
        let db = Database::open_in_memory().unwrap();
        let s = solution(&db, "gaza");
        let u = user(&db, "amina");
        raw_interaction(&db, s.id, u, at("2026-08-20T00:00:05Z"));
        raw_pledge(&db, "kashmir", u, at("2026-08-20T00:00:06Z"));

        // "kashmir" has no published solutions: interactions/comments empty,
        // but its own pledges still appear.
        let feed = recent_activity(&db, Some("kashmir"), None, 10).unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].kind, ActivityKind::Pledge);
    }

    #[test]
    fn since_cursor_is_exclusive() {
        let db = Database::open_in_memory().unwrap();
        let s = solution(&db, "gaza");
        let u = user(&db, "amina");
        raw_interaction(&db, s.id, u, at("2026-08-20T00:00:05Z"));
        raw_interaction(&db, s.id, u, at("2026-08-20T00:00:09Z"));

        let feed =
            recent_activity(&db, None, Some(at("2026-08-20T00:00:05Z")), 10).unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].created_at, at("2026-08-20T00:00:09Z"));
    }
}
