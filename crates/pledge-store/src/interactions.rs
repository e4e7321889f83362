use chrono::{DateTime, Utc};
use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::error::Result;
use crate::models::{status_col, ts_col, uuid_col, Interaction};
use crate::query::Predicate;

use pledge_shared::{ActivityStatus, InteractionKind};

impl Database {
    pub fn add_interaction(
        &self,
        solution_id: Uuid,
        user_id: Uuid,
        kind: InteractionKind,
    ) -> Result<Interaction> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        self.conn().execute(
            "INSERT INTO solution_interactions (id, solution_id, user_id, type, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id.to_string(),
                solution_id.to_string(),
                user_id.to_string(),
                kind.as_str(),
                ActivityStatus::Active.as_str(),
                now.to_rfc3339(),
            ],
        )?;

        Ok(Interaction {
            id,
            solution_id,
            user_id,
            kind,
            status: ActivityStatus::Active,
            created_at: now,
        })
    }

    /// Soft-remove an interaction.  The row stays for audit; aggregates
    /// filter it out by status.
    pub fn remove_interaction(&self, id: Uuid) -> Result<bool> {
        let affected = self.conn().execute(
            "UPDATE solution_interactions SET status = ?1 WHERE id = ?2",
            params![ActivityStatus::Removed.as_str(), id.to_string()],
        )?;
        Ok(affected > 0)
    }

    /// Active interactions, newest first.
    ///
    /// `solution_ids: Some(..)` scopes the read to those solutions; an empty
    /// set matches nothing (a scoped query never falls back to global).
    pub fn active_interactions(
        &self,
        solution_ids: Option<&[Uuid]>,
        since: Option<DateTime<Utc>>,
        limit: Option<u32>,
    ) -> Result<Vec<Interaction>> {
        let mut parts = vec![Predicate::Eq(
            "status",
            ActivityStatus::Active.as_str().to_string(),
        )];
        if let Some(ids) = solution_ids {
            parts.push(Predicate::InSet(
                "solution_id",
                ids.iter().map(|id| id.to_string()).collect(),
            ));
        }
        if let Some(cursor) = since {
            parts.push(Predicate::Gt("created_at", cursor.to_rfc3339()));
        }
        let (where_sql, where_params) = Predicate::All(parts).to_sql();

        let mut sql = format!(
            "SELECT id, solution_id, user_id, type, status, created_at
             FROM solution_interactions
             WHERE {where_sql}
             ORDER BY created_at DESC"
        );
        if let Some(n) = limit {
            sql.push_str(&format!(" LIMIT {n}"));
        }

        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(where_params), row_to_interaction)?;

        let mut interactions = Vec::new();
        for row in rows {
            interactions.push(row?);
        }
        Ok(interactions)
    }
}

fn row_to_interaction(row: &rusqlite::Row<'_>) -> rusqlite::Result<Interaction> {
    let id_str: String = row.get(0)?;
    let solution_id_str: String = row.get(1)?;
    let user_id_str: String = row.get(2)?;
    let kind_str: String = row.get(3)?;
    let status_str: String = row.get(4)?;
    let ts_str: String = row.get(5)?;

    Ok(Interaction {
        id: uuid_col(0, &id_str)?,
        solution_id: uuid_col(1, &solution_id_str)?,
        user_id: uuid_col(2, &user_id_str)?,
        kind: status_col(3, &kind_str, InteractionKind::parse)?,
        status: status_col(4, &status_str, ActivityStatus::parse)?,
        created_at: ts_col(5, &ts_str)?,
    })
}
