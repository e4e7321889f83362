//! v001 -- Initial schema creation.
//!
//! Creates the engagement tables: `users`, `sessions`, `solutions`,
//! `solution_interactions`, `comments`, `pledges`, and the denormalized
//! `campaign_pledge_counts` cache.
//!
//! Campaigns themselves live in the CMS; tables reference them by slug-like
//! TEXT ids only.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Users
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users (
    id         TEXT PRIMARY KEY NOT NULL,   -- UUID v4
    name       TEXT NOT NULL,
    email      TEXT NOT NULL UNIQUE,
    image      TEXT,                        -- avatar URL
    role       TEXT NOT NULL DEFAULT 'user',
    created_at TEXT NOT NULL                -- ISO-8601 / RFC-3339
);

-- ----------------------------------------------------------------
-- Sessions (bearer tokens)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS sessions (
    token      TEXT PRIMARY KEY NOT NULL,
    user_id    TEXT NOT NULL,               -- FK -> users(id)
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL,

    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);

-- ----------------------------------------------------------------
-- Solutions
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS solutions (
    id          TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    campaign_id TEXT NOT NULL,              -- CMS campaign id
    user_id     TEXT NOT NULL,              -- FK -> users(id)
    party_id    TEXT NOT NULL,              -- CMS party id within the campaign
    title       TEXT NOT NULL,
    description TEXT NOT NULL,
    status      TEXT NOT NULL DEFAULT 'draft',  -- draft | published | archived
    metadata    TEXT,                       -- JSON blob, optional
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,

    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_solutions_campaign_status
    ON solutions(campaign_id, status);
CREATE INDEX IF NOT EXISTS idx_solutions_campaign_party
    ON solutions(campaign_id, party_id, status);

-- ----------------------------------------------------------------
-- Solution interactions (like / dislike / share)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS solution_interactions (
    id          TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    solution_id TEXT NOT NULL,              -- FK -> solutions(id)
    user_id     TEXT NOT NULL,              -- FK -> users(id)
    type        TEXT NOT NULL,              -- like | dislike | share
    status      TEXT NOT NULL DEFAULT 'active',  -- active | removed
    created_at  TEXT NOT NULL,

    FOREIGN KEY (solution_id) REFERENCES solutions(id) ON DELETE CASCADE,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_interactions_solution
    ON solution_interactions(solution_id, status);
CREATE INDEX IF NOT EXISTS idx_interactions_created
    ON solution_interactions(created_at DESC);

-- ----------------------------------------------------------------
-- Comments (threaded via parent_id)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS comments (
    id          TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    solution_id TEXT NOT NULL,              -- FK -> solutions(id)
    user_id     TEXT NOT NULL,              -- FK -> users(id)
    content     TEXT NOT NULL,
    status      TEXT NOT NULL DEFAULT 'active',  -- active | deleted | hidden
    parent_id   TEXT,                       -- nullable FK -> comments(id)
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,

    FOREIGN KEY (solution_id) REFERENCES solutions(id) ON DELETE CASCADE,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (parent_id) REFERENCES comments(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_comments_solution ON comments(solution_id, status);
CREATE INDEX IF NOT EXISTS idx_comments_created ON comments(created_at DESC);

-- ----------------------------------------------------------------
-- Pledges
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS pledges (
    id                   TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    campaign_id          TEXT NOT NULL,
    user_id              TEXT NOT NULL,              -- FK -> users(id)
    agree_to_terms       INTEGER NOT NULL DEFAULT 1, -- boolean 0/1
    subscribe_to_updates INTEGER NOT NULL DEFAULT 0, -- boolean 0/1
    status               TEXT NOT NULL DEFAULT 'active',  -- active | removed
    created_at           TEXT NOT NULL,

    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_pledges_campaign ON pledges(campaign_id, status);
CREATE INDEX IF NOT EXISTS idx_pledges_created ON pledges(created_at DESC);
CREATE UNIQUE INDEX IF NOT EXISTS idx_pledges_unique_user
    ON pledges(campaign_id, user_id);

-- ----------------------------------------------------------------
-- Denormalized pledge totals per campaign
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS campaign_pledge_counts (
    campaign_id  TEXT PRIMARY KEY NOT NULL,
    count        INTEGER NOT NULL DEFAULT 0,
    last_updated TEXT NOT NULL
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
