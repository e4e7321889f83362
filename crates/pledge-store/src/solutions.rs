use std::collections::HashMap;

use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{json_col, status_col, ts_col, uuid_col, Solution};
use crate::query::Predicate;

use pledge_shared::SolutionStatus;

const SOLUTION_COLS: &str =
    "id, campaign_id, user_id, party_id, title, description, status, metadata, created_at, updated_at";

impl Database {
    pub fn insert_solution(&self, solution: &Solution) -> Result<()> {
        self.conn().execute(
            &format!(
                "INSERT INTO solutions ({SOLUTION_COLS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
            ),
            params![
                solution.id.to_string(),
                solution.campaign_id,
                solution.user_id.to_string(),
                solution.party_id,
                solution.title,
                solution.description,
                solution.status.as_str(),
                solution.metadata.as_ref().map(|m| m.to_string()),
                solution.created_at.to_rfc3339(),
                solution.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_solution(&self, id: Uuid) -> Result<Solution> {
        self.conn()
            .query_row(
                &format!("SELECT {SOLUTION_COLS} FROM solutions WHERE id = ?1"),
                params![id.to_string()],
                row_to_solution,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// Flip a solution's moderation status (draft -> published -> archived).
    pub fn set_solution_status(&self, id: Uuid, status: SolutionStatus) -> Result<bool> {
        let affected = self.conn().execute(
            "UPDATE solutions SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![
                status.as_str(),
                chrono::Utc::now().to_rfc3339(),
                id.to_string()
            ],
        )?;
        Ok(affected > 0)
    }

    /// Ids of all published solutions, optionally scoped to one campaign.
    pub fn published_solution_ids(&self, campaign_id: Option<&str>) -> Result<Vec<Uuid>> {
        let mut parts = vec![Predicate::Eq(
            "status",
            SolutionStatus::Published.as_str().to_string(),
        )];
        if let Some(campaign) = campaign_id {
            parts.push(Predicate::Eq("campaign_id", campaign.to_string()));
        }
        let (where_sql, where_params) = Predicate::All(parts).to_sql();

        let sql = format!("SELECT id FROM solutions WHERE {where_sql}");
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(where_params), |row| {
            let id_str: String = row.get(0)?;
            uuid_col(0, &id_str)
        })?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }

    /// Count published solutions for a campaign, optionally for one party.
    pub fn count_published_solutions(
        &self,
        campaign_id: &str,
        party_id: Option<&str>,
    ) -> Result<u32> {
        let mut parts = vec![
            Predicate::Eq("campaign_id", campaign_id.to_string()),
            Predicate::Eq("status", SolutionStatus::Published.as_str().to_string()),
        ];
        if let Some(party) = party_id {
            parts.push(Predicate::Eq("party_id", party.to_string()));
        }
        let (where_sql, where_params) = Predicate::All(parts).to_sql();

        let sql = format!("SELECT COUNT(*) FROM solutions WHERE {where_sql}");
        let count: u32 = self.conn().query_row(
            &sql,
            rusqlite::params_from_iter(where_params),
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Fetch several solutions in one query.  Absent ids are simply missing
    /// from the returned map.
    pub fn get_solutions_by_ids(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Solution>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let pred = Predicate::InSet("id", ids.iter().map(|id| id.to_string()).collect());
        let (where_sql, where_params) = pred.to_sql();

        let sql = format!("SELECT {SOLUTION_COLS} FROM solutions WHERE {where_sql}");
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(where_params), row_to_solution)?;

        let mut map = HashMap::new();
        for row in rows {
            let solution = row?;
            map.insert(solution.id, solution);
        }
        Ok(map)
    }
}

fn row_to_solution(row: &rusqlite::Row<'_>) -> rusqlite::Result<Solution> {
    let id_str: String = row.get(0)?;
    let campaign_id: String = row.get(1)?;
    let user_id_str: String = row.get(2)?;
    let party_id: String = row.get(3)?;
    let title: String = row.get(4)?;
    let description: String = row.get(5)?;
    let status_str: String = row.get(6)?;
    let metadata_str: Option<String> = row.get(7)?;
    let created_str: String = row.get(8)?;
    let updated_str: String = row.get(9)?;

    let metadata = match metadata_str {
        Some(s) => Some(json_col(7, &s)?),
        None => None,
    };

    Ok(Solution {
        id: uuid_col(0, &id_str)?,
        campaign_id,
        user_id: uuid_col(2, &user_id_str)?,
        party_id,
        title,
        description,
        status: status_col(6, &status_str, SolutionStatus::parse)?,
        metadata,
        created_at: ts_col(8, &created_str)?,
        updated_at: ts_col(9, &updated_str)?,
    })
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn only_published_solutions_counted() {
        let db = Database::open_in_memory().unwrap();
        for _ in 0..3 {
            seeded_solution(&db, "gaza", "a", SolutionStatus::Published);
        }
        seeded_solution(&db, "gaza", "a", SolutionStatus::Draft);
        seeded_solution(&db, "gaza", "a", SolutionStatus::Draft);
        seeded_solution(&db, "gaza", "a", SolutionStatus::Archived);

        assert_eq!(db.count_published_solutions("gaza", None).unwrap(), 3);
        assert_eq!(db.published_solution_ids(Some("gaza")).unwrap().len(), 3);
    }

    #[test]
    fn party_scoped_count() {
        let db = Database::open_in_memory().unwrap();
        seeded_solution(&db, "gaza", "a", SolutionStatus::Published);
        seeded_solution(&db, "gaza", "a", SolutionStatus::Published);
        seeded_solution(&db, "gaza", "b", SolutionStatus::Published);

        assert_eq!(db.count_published_solutions("gaza", Some("a")).unwrap(), 2);
        assert_eq!(db.count_published_solutions("gaza", Some("b")).unwrap(), 1);
        assert_eq!(db.count_published_solutions("gaza", Some("c")).unwrap(), 0);
    }

    #[test]
    fn status_transition() {
        let db = Database::open_in_memory().unwrap();
        let solution = seeded_solution(&db, "gaza", "a", SolutionStatus::Draft);

        assert!(db
            .set_solution_status(solution.id, SolutionStatus::Published)
            .unwrap());
        let got = db.get_solution(solution.id).unwrap();
        assert_eq!(got.status, SolutionStatus::Published);
    }

    #[test]
    fn batch_lookup() {
        let db = Database::open_in_memory().unwrap();
        let s1 = seeded_solution(&db, "gaza", "a", SolutionStatus::Published);
        let s2 = seeded_solution(&db, "kashmir", "x", SolutionStatus::Draft);

        let map = db
            .get_solutions_by_ids(&[s1.id, s2.id, Uuid::new_v4()])
            .unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map[&s1.id].campaign_id, "gaza");
    }
}
