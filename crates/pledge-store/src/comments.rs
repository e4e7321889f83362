use chrono::{DateTime, Utc};
use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{status_col, ts_col, uuid_col, Comment};
use crate::query::Predicate;

use pledge_shared::CommentStatus;

impl Database {
    pub fn add_comment(
        &self,
        solution_id: Uuid,
        user_id: Uuid,
        content: &str,
        parent_id: Option<Uuid>,
    ) -> Result<Comment> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        self.conn().execute(
            "INSERT INTO comments (id, solution_id, user_id, content, status, parent_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                id.to_string(),
                solution_id.to_string(),
                user_id.to_string(),
                content,
                CommentStatus::Active.as_str(),
                parent_id.map(|p| p.to_string()),
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )?;

        Ok(Comment {
            id,
            solution_id,
            user_id,
            content: content.to_string(),
            status: CommentStatus::Active,
            parent_id,
            created_at: now,
            updated_at: now,
        })
    }

    /// Soft-delete or hide a comment.
    pub fn set_comment_status(&self, id: Uuid, status: CommentStatus) -> Result<bool> {
        let affected = self.conn().execute(
            "UPDATE comments SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![
                status.as_str(),
                Utc::now().to_rfc3339(),
                id.to_string()
            ],
        )?;
        Ok(affected > 0)
    }

    pub fn get_comment(&self, id: Uuid) -> Result<Comment> {
        self.conn()
            .query_row(
                "SELECT id, solution_id, user_id, content, status, parent_id, created_at, updated_at
                 FROM comments WHERE id = ?1",
                params![id.to_string()],
                row_to_comment,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// Active comments, newest first.  Same scoping semantics as
    /// [`Database::active_interactions`]: an empty id set matches nothing.
    pub fn active_comments(
        &self,
        solution_ids: Option<&[Uuid]>,
        since: Option<DateTime<Utc>>,
        limit: Option<u32>,
    ) -> Result<Vec<Comment>> {
        let mut parts = vec![Predicate::Eq(
            "status",
            CommentStatus::Active.as_str().to_string(),
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
            "SELECT id, solution_id, user_id, content, status, parent_id, created_at, updated_at
             FROM comments
             WHERE {where_sql}
             ORDER BY created_at DESC"
        );
        if let Some(n) = limit {
            sql.push_str(&format!(" LIMIT {n}"));
        }

        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(where_params), row_to_comment)?;

        let mut comments = Vec::new();
        for row in rows {
            comments.push(row?);
        }
        Ok(comments)
    }
}

fn row_to_comment(row: &rusqlite::Row<'_>) -> rusqlite::Result<Comment> {
    let id_str: String = row.get(0)?;
    let solution_id_str: String = row.get(1)?;
    let user_id_str: String = row.get(2)?;
    let content: String = row.get(3)?;
    let status_str: String = row.get(4)?;
    let parent_str: Option<String> = row.get(5)?;
    let created_str: String = row.get(6)?;
    let updated_str: String = row.get(7)?;

    let parent_id = match parent_str {
        Some(s) => Some(uuid_col(5, &s)?),
        None => None,
    };

    Ok(Comment {
        id: uuid_col(0, &id_str)?,
        solution_id: uuid_col(1, &solution_id_str)?,
        user_id: uuid_col(2, &user_id_str)?,
        content,
        status: status_col(4, &status_str, CommentStatus::parse)?,
        parent_id,
        created_at: ts_col(6, &created_str)?,
        updated_at: ts_col(7, &updated_str)?,
    })
}
