use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{status_col, ts_col, uuid_col, User};
use crate::query::Predicate;

use pledge_shared::Role;

impl Database {
    pub fn insert_user(&self, user: &User) -> Result<()> {
        self.conn().execute(
            "INSERT INTO users (id, name, email, image, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user.id.to_string(),
                user.name,
                user.email,
                user.image,
                user.role.as_str(),
                user.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_user(&self, id: Uuid) -> Result<User> {
        self.conn()
            .query_row(
                "SELECT id, name, email, image, role, created_at
                 FROM users WHERE id = ?1",
                params![id.to_string()],
                row_to_user,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// Fetch several users in one query.  Absent ids are simply missing
    /// from the returned map.
    pub fn get_users_by_ids(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, User>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let pred = Predicate::InSet("id", ids.iter().map(|id| id.to_string()).collect());
        let (where_sql, where_params) = pred.to_sql();

        let sql = format!(
            "SELECT id, name, email, image, role, created_at FROM users WHERE {where_sql}"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(where_params), row_to_user)?;

        let mut map = HashMap::new();
        for row in rows {
            let user = row?;
            map.insert(user.id, user);
        }
        Ok(map)
    }

    /// Create a bearer session for a user and return its expiry.
    pub fn create_session(
        &self,
        user_id: Uuid,
        token: &str,
        ttl: Duration,
    ) -> Result<DateTime<Utc>> {
        let now = Utc::now();
        let expires_at = now + ttl;
        self.conn().execute(
            "INSERT INTO sessions (token, user_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                token,
                user_id.to_string(),
                now.to_rfc3339(),
                expires_at.to_rfc3339(),
            ],
        )?;
        Ok(expires_at)
    }

    /// Resolve a bearer token to its user, rejecting expired sessions.
    pub fn find_user_by_session(&self, token: &str) -> Result<User> {
        self.conn()
            .query_row(
                "SELECT u.id, u.name, u.email, u.image, u.role, u.created_at
                 FROM sessions s JOIN users u ON u.id = s.user_id
                 WHERE s.token = ?1 AND s.expires_at > ?2",
                params![token, Utc::now().to_rfc3339()],
                row_to_user,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let id_str: String = row.get(0)?;
    let name: String = row.get(1)?;
    let email: String = row.get(2)?;
    let image: Option<String> = row.get(3)?;
    let role_str: String = row.get(4)?;
    let ts_str: String = row.get(5)?;

    Ok(User {
        id: uuid_col(0, &id_str)?,
        name,
        email,
        image,
        role: status_col(4, &role_str, Role::parse)?,
        created_at: ts_col(5, &ts_str)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(name: &str, role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{name}@example.org"),
            image: None,
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn insert_and_get() {
        let db = Database::open_in_memory().unwrap();
        let user = sample_user("alice", Role::User);
        db.insert_user(&user).unwrap();

        let got = db.get_user(user.id).unwrap();
        assert_eq!(got.email, "alice@example.org");
        assert_eq!(got.role, Role::User);
    }

    #[test]
    fn batch_lookup_skips_missing() {
        let db = Database::open_in_memory().unwrap();
        let a = sample_user("a", Role::User);
        let b = sample_user("b", Role::Moderator);
        db.insert_user(&a).unwrap();
        db.insert_user(&b).unwrap();

        let missing = Uuid::new_v4();
        let map = db.get_users_by_ids(&[a.id, b.id, missing]).unwrap();
        assert_eq!(map.len(), 2);
        assert!(!map.contains_key(&missing));
    }

    #[test]
    fn session_resolution() {
        let db = Database::open_in_memory().unwrap();
        let user = sample_user("mod", Role::Moderator);
        db.insert_user(&user).unwrap();
        db.create_session(user.id, "tok-123", Duration::hours(1))
            .unwrap();

        let got = db.find_user_by_session("tok-123").unwrap();
        assert_eq!(got.id, user.id);

        assert!(matches!(
            db.find_user_by_session("bogus"),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn expired_session_rejected() {
        let db = Database::open_in_memory().unwrap();
        let user = sample_user("x", Role::Admin);
        db.insert_user(&user).unwrap();
        db.create_session(user.id, "tok-old", Duration::seconds(-10))
            .unwrap();

        assert!(matches!(
            db.find_user_by_session("tok-old"),
            Err(StoreError::NotFound)
        ));
    }
}
