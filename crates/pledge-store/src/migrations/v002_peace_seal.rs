//! v002 -- Peace Seal certification tables.

use rusqlite::Connection;

const UP_SQL: &str = r#"
-- Companies applying for the Peace Seal
CREATE TABLE IF NOT EXISTS companies (
    id              TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    slug            TEXT NOT NULL UNIQUE,
    name            TEXT NOT NULL,
    status          TEXT NOT NULL DEFAULT 'application_submitted',
    score           REAL,                       -- advisor-assigned, 0..=100
    payment_status  TEXT NOT NULL DEFAULT 'unpaid',  -- unpaid | paid
    employee_count  INTEGER NOT NULL,
    advisor_user_id TEXT,                       -- nullable FK -> users(id)
    review_notes    TEXT,
    reviewed_by     TEXT,                       -- nullable FK -> users(id)
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL,

    FOREIGN KEY (advisor_user_id) REFERENCES users(id) ON DELETE SET NULL,
    FOREIGN KEY (reviewed_by) REFERENCES users(id) ON DELETE SET NULL
);

CREATE INDEX IF NOT EXISTS idx_companies_status ON companies(status);

-- One row per answered questionnaire section
CREATE TABLE IF NOT EXISTS questionnaire_answers (
    id         TEXT PRIMARY KEY NOT NULL,       -- UUID v4
    company_id TEXT NOT NULL,                   -- FK -> companies(id)
    section_id TEXT NOT NULL,                   -- schema section id
    answers    TEXT NOT NULL,                   -- JSON blob of field answers
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,

    FOREIGN KEY (company_id) REFERENCES companies(id) ON DELETE CASCADE
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_answers_company_section
    ON questionnaire_answers(company_id, section_id);
"#;

pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
