use chrono::{DateTime, Utc};
use rusqlite::params;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::Database;
use crate::error::Result;
use crate::models::{status_col, ts_col, uuid_col, Pledge};
use crate::query::Predicate;

use pledge_shared::ActivityStatus;

/// A pledge joined with its pledger for the admin pledge listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PledgeWithUser {
    #[serde(flatten)]
    pub pledge: Pledge,
    pub user_name: String,
    pub user_email: String,
}

impl Database {
    /// Record a pledge and refresh the denormalized per-campaign total.
    pub fn add_pledge(
        &self,
        campaign_id: &str,
        user_id: Uuid,
        agree_to_terms: bool,
        subscribe_to_updates: bool,
    ) -> Result<Pledge> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        self.conn().execute(
            "INSERT INTO pledges (id, campaign_id, user_id, agree_to_terms, subscribe_to_updates, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id.to_string(),
                campaign_id,
                user_id.to_string(),
                agree_to_terms,
                subscribe_to_updates,
                ActivityStatus::Active.as_str(),
                now.to_rfc3339(),
            ],
        )?;

        self.refresh_campaign_pledge_count(campaign_id)?;

        Ok(Pledge {
            id,
            campaign_id: campaign_id.to_string(),
            user_id,
            agree_to_terms,
            subscribe_to_updates,
            status: ActivityStatus::Active,
            created_at: now,
        })
    }

    /// Soft-remove a pledge and refresh the cached total.
    pub fn remove_pledge(&self, id: Uuid) -> Result<bool> {
        let campaign: Option<String> = self
            .conn()
            .query_row(
                "SELECT campaign_id FROM pledges WHERE id = ?1",
                params![id.to_string()],
                |row| row.get(0),
            )
            .ok();

        let affected = self.conn().execute(
            "UPDATE pledges SET status = ?1 WHERE id = ?2",
            params![ActivityStatus::Removed.as_str(), id.to_string()],
        )?;

        if let Some(campaign) = campaign {
            self.refresh_campaign_pledge_count(&campaign)?;
        }
        Ok(affected > 0)
    }

    /// Count active pledges, optionally scoped to one campaign.
    pub fn count_active_pledges(&self, campaign_id: Option<&str>) -> Result<u32> {
        let mut parts = vec![Predicate::Eq(
            "status",
            ActivityStatus::Active.as_str().to_string(),
        )];
        if let Some(campaign) = campaign_id {
            parts.push(Predicate::Eq("campaign_id", campaign.to_string()));
        }
        let (where_sql, where_params) = Predicate::All(parts).to_sql();

        let count: u32 = self.conn().query_row(
            &format!("SELECT COUNT(*) FROM pledges WHERE {where_sql}"),
            rusqlite::params_from_iter(where_params),
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Active pledges, newest first, optionally scoped/cursored/limited.
    pub fn active_pledges(
        &self,
        campaign_id: Option<&str>,
        since: Option<DateTime<Utc>>,
        limit: Option<u32>,
    ) -> Result<Vec<Pledge>> {
        let mut parts = vec![Predicate::Eq(
            "status",
            ActivityStatus::Active.as_str().to_string(),
        )];
        if let Some(campaign) = campaign_id {
            parts.push(Predicate::Eq("campaign_id", campaign.to_string()));
        }
        if let Some(cursor) = since {
            parts.push(Predicate::Gt("created_at", cursor.to_rfc3339()));
        }
        let (where_sql, where_params) = Predicate::All(parts).to_sql();

        let mut sql = format!(
            "SELECT id, campaign_id, user_id, agree_to_terms, subscribe_to_updates, status, created_at
             FROM pledges
             WHERE {where_sql}
             ORDER BY created_at DESC"
        );
        if let Some(n) = limit {
            sql.push_str(&format!(" LIMIT {n}"));
        }

        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(where_params), row_to_pledge)?;

        let mut pledges = Vec::new();
        for row in rows {
            pledges.push(row?);
        }
        Ok(pledges)
    }

    /// Paginated pledge listing for the admin dashboard, joined with the
    /// pledger and optionally filtered by a case-insensitive substring match
    /// over pledger name/email.  Returns `(page_rows, total_matching)`.
    pub fn search_pledges(
        &self,
        campaign_id: &str,
        search: Option<&str>,
        page: u32,
        per_page: u32,
    ) -> Result<(Vec<PledgeWithUser>, u32)> {
        let mut parts = vec![
            Predicate::Eq("p.campaign_id", campaign_id.to_string()),
            Predicate::Eq("p.status", ActivityStatus::Active.as_str().to_string()),
        ];
        if let Some(q) = search.filter(|q| !q.is_empty()) {
            let pattern = format!("%{}%", q.to_lowercase());
            parts.push(Predicate::Any(vec![
                Predicate::Like("LOWER(u.name)", pattern.clone()),
                Predicate::Like("LOWER(u.email)", pattern),
            ]));
        }
        let (where_sql, where_params) = Predicate::All(parts).to_sql();

        let total: u32 = self.conn().query_row(
            &format!(
                "SELECT COUNT(*) FROM pledges p JOIN users u ON u.id = p.user_id
                 WHERE {where_sql}"
            ),
            rusqlite::params_from_iter(where_params.clone()),
            |row| row.get(0),
        )?;

        let offset = u64::from(page.saturating_sub(1)) * u64::from(per_page);
        let sql = format!(
            "SELECT p.id, p.campaign_id, p.user_id, p.agree_to_terms, p.subscribe_to_updates,
                    p.status, p.created_at, u.name, u.email
             FROM pledges p JOIN users u ON u.id = p.user_id
             WHERE {where_sql}
             ORDER BY p.created_at DESC
             LIMIT {per_page} OFFSET {offset}"
        );

        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(where_params), |row| {
            let pledge = row_to_pledge(row)?;
            let user_name: String = row.get(7)?;
            let user_email: String = row.get(8)?;
            Ok(PledgeWithUser {
                pledge,
                user_name,
                user_email,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok((out, total))
    }

    /// Recompute the denormalized pledge total for a campaign.
    ///
    /// Called after every pledge write; dashboards read the cached value
    /// via [`Database::cached_pledge_count`] instead of re-counting.
    pub fn refresh_campaign_pledge_count(&self, campaign_id: &str) -> Result<u32> {
        let count = self.count_active_pledges(Some(campaign_id))?;
        self.conn().execute(
            "INSERT INTO campaign_pledge_counts (campaign_id, count, last_updated)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(campaign_id) DO UPDATE SET count = ?2, last_updated = ?3",
            params![campaign_id, count, Utc::now().to_rfc3339()],
        )?;
        Ok(count)
    }

    /// Read the cached pledge total for a campaign, if one has been
    /// materialized.
    pub fn cached_pledge_count(&self, campaign_id: &str) -> Result<Option<u32>> {
        let count = self
            .conn()
            .query_row(
                "SELECT count FROM campaign_pledge_counts WHERE campaign_id = ?1",
                params![campaign_id],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;
        Ok(count)
    }
}

fn row_to_pledge(row: &rusqlite::Row<'_>) -> rusqlite::Result<Pledge> {
    let id_str: String = row.get(0)?;
    let campaign_id: String = row.get(1)?;
    let user_id_str: String = row.get(2)?;
    let agree_to_terms: bool = row.get(3)?;
    let subscribe_to_updates: bool = row.get(4)?;
    let status_str: String = row.get(5)?;
    let ts_str: String = row.get(6)?;

    Ok(Pledge {
        id: uuid_col(0, &id_str)?,
        campaign_id,
        user_id: uuid_col(2, &user_id_str)?,
        agree_to_terms,
        subscribe_to_updates,
        status: status_col(5, &status_str, ActivityStatus::parse)?,
        created_at: ts_col(6, &ts_str)?,
    })
}
