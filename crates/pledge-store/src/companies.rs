use chrono::Utc;
use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{json_col, status_col, ts_col, uuid_col, Company};

use pledge_shared::{completion_rate, CompanySizeTier, CompanyStatus, PaymentStatus};

const COMPANY_COLS: &str = "id, slug, name, status, score, payment_status, employee_count, \
     advisor_user_id, review_notes, reviewed_by, created_at, updated_at";

impl Database {
    pub fn insert_company(&self, company: &Company) -> Result<()> {
        self.conn().execute(
            &format!(
                "INSERT INTO companies ({COMPANY_COLS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
            ),
            params![
                company.id.to_string(),
                company.slug,
                company.name,
                company.status.as_str(),
                company.score,
                company.payment_status.as_str(),
                company.employee_count,
                company.advisor_user_id.map(|id| id.to_string()),
                company.review_notes,
                company.reviewed_by.map(|id| id.to_string()),
                company.created_at.to_rfc3339(),
                company.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_company(&self, id: Uuid) -> Result<Company> {
        self.conn()
            .query_row(
                &format!("SELECT {COMPANY_COLS} FROM companies WHERE id = ?1"),
                params![id.to_string()],
                row_to_company,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    pub fn set_company_payment_status(&self, id: Uuid, status: PaymentStatus) -> Result<bool> {
        let affected = self.conn().execute(
            "UPDATE companies SET payment_status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.as_str(), Utc::now().to_rfc3339(), id.to_string()],
        )?;
        Ok(affected > 0)
    }

    pub fn set_company_status(&self, id: Uuid, status: CompanyStatus) -> Result<bool> {
        let affected = self.conn().execute(
            "UPDATE companies SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.as_str(), Utc::now().to_rfc3339(), id.to_string()],
        )?;
        Ok(affected > 0)
    }

    /// Persist an advisor review: score, chosen status, reviewer, notes.
    pub fn apply_company_review(
        &self,
        id: Uuid,
        score: f64,
        status: CompanyStatus,
        reviewed_by: Uuid,
        notes: Option<&str>,
    ) -> Result<bool> {
        let affected = self.conn().execute(
            "UPDATE companies
             SET score = ?1, status = ?2, reviewed_by = ?3, review_notes = ?4, updated_at = ?5
             WHERE id = ?6",
            params![
                score,
                status.as_str(),
                reviewed_by.to_string(),
                notes,
                Utc::now().to_rfc3339(),
                id.to_string(),
            ],
        )?;
        Ok(affected > 0)
    }

    /// Store (or replace) a company's answers for one questionnaire section.
    pub fn upsert_questionnaire_answer(
        &self,
        company_id: Uuid,
        section_id: &str,
        answers: &serde_json::Value,
    ) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn().execute(
            "INSERT INTO questionnaire_answers (id, company_id, section_id, answers, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             ON CONFLICT(company_id, section_id)
             DO UPDATE SET answers = ?4, updated_at = ?5",
            params![
                Uuid::new_v4().to_string(),
                company_id.to_string(),
                section_id,
                answers.to_string(),
                now,
            ],
        )?;
        Ok(())
    }

    /// Section ids this company has answered.
    pub fn answered_section_ids(&self, company_id: Uuid) -> Result<Vec<String>> {
        let mut stmt = self.conn().prepare(
            "SELECT section_id FROM questionnaire_answers WHERE company_id = ?1",
        )?;
        let rows = stmt.query_map(params![company_id.to_string()], |row| row.get(0))?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }

    /// The stored answers for one section, if any.
    pub fn questionnaire_answer(
        &self,
        company_id: Uuid,
        section_id: &str,
    ) -> Result<Option<serde_json::Value>> {
        let row: Option<String> = self
            .conn()
            .query_row(
                "SELECT answers FROM questionnaire_answers
                 WHERE company_id = ?1 AND section_id = ?2",
                params![company_id.to_string(), section_id],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;

        match row {
            Some(s) => Ok(Some(json_col(0, &s).map_err(StoreError::Sqlite)?)),
            None => Ok(None),
        }
    }

    /// Questionnaire completion rate in percent for a company, measured
    /// against the required sections of its size tier.
    pub fn company_completion_rate(&self, company: &Company) -> Result<f64> {
        let tier = CompanySizeTier::from_employee_count(company.employee_count);
        let answered = self.answered_section_ids(company.id)?;
        Ok(completion_rate(tier, &answered))
    }
}

fn row_to_company(row: &rusqlite::Row<'_>) -> rusqlite::Result<Company> {
    let id_str: String = row.get(0)?;
    let slug: String = row.get(1)?;
    let name: String = row.get(2)?;
    let status_str: String = row.get(3)?;
    let score: Option<f64> = row.get(4)?;
    let payment_str: String = row.get(5)?;
    let employee_count: u32 = row.get(6)?;
    let advisor_str: Option<String> = row.get(7)?;
    let review_notes: Option<String> = row.get(8)?;
    let reviewed_by_str: Option<String> = row.get(9)?;
    let created_str: String = row.get(10)?;
    let updated_str: String = row.get(11)?;

    let advisor_user_id = match advisor_str {
        Some(s) => Some(uuid_col(7, &s)?),
        None => None,
    };
    let reviewed_by = match reviewed_by_str {
        Some(s) => Some(uuid_col(9, &s)?),
        None => None,
    };

    Ok(Company {
        id: uuid_col(0, &id_str)?,
        slug,
        name,
        status: status_col(3, &status_str, CompanyStatus::parse)?,
        score,
        payment_status: status_col(5, &payment_str, PaymentStatus::parse)?,
        employee_count,
        advisor_user_id,
        review_notes,
        reviewed_by,
        created_at: ts_col(10, &created_str)?,
        updated_at: ts_col(11, &updated_str)?,
    })
}
