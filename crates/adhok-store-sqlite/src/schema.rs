//! SQL schema for the Adhok SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    role          TEXT NOT NULL,   -- 'client' | 'talent'
    display_name  TEXT NOT NULL,
    badge         TEXT NOT NULL DEFAULT 'none',
    created_at    TEXT NOT NULL
);

-- One row per client; replaced wholesale when the payment provider reports
-- a change.
CREATE TABLE IF NOT EXISTS client_tiers (
    client_id       TEXT PRIMARY KEY REFERENCES users(user_id),
    tier            TEXT NOT NULL,
    features        TEXT NOT NULL DEFAULT '[]',   -- JSON array of feature keys
    tier_expires_at TEXT                           -- NULL = never expires
);

CREATE TABLE IF NOT EXISTS projects (
    project_id         TEXT PRIMARY KEY,
    title              TEXT NOT NULL,
    status             TEXT NOT NULL,
    client_id          TEXT NOT NULL REFERENCES users(user_id),
    talent_id          TEXT REFERENCES users(user_id),
    min_badge          TEXT NOT NULL DEFAULT 'none',
    accept_bid_enabled INTEGER NOT NULL DEFAULT 0,
    metadata           TEXT NOT NULL DEFAULT '{}',
    created_at         TEXT NOT NULL,
    updated_at         TEXT NOT NULL,
    CHECK ((talent_id IS NULL) = (status IN ('draft', 'open')))
);

CREATE TABLE IF NOT EXISTS project_bids (
    bid_id            TEXT PRIMARY KEY,
    project_id        TEXT NOT NULL REFERENCES projects(project_id),
    talent_id         TEXT NOT NULL REFERENCES users(user_id),
    hourly_rate_cents INTEGER NOT NULL CHECK (hourly_rate_cents > 0),
    status            TEXT NOT NULL DEFAULT 'pending',
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL,
    UNIQUE (project_id, talent_id)
);

-- At most one accepted bid per project.
CREATE UNIQUE INDEX IF NOT EXISTS project_bids_one_accepted_idx
    ON project_bids(project_id) WHERE status = 'accepted';

-- Append-only apart from the read flag.
CREATE TABLE IF NOT EXISTS notifications (
    notification_id TEXT PRIMARY KEY,
    user_id         TEXT NOT NULL REFERENCES users(user_id),
    kind            TEXT NOT NULL,
    message         TEXT NOT NULL,
    payload         TEXT NOT NULL,
    read            INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS projects_client_idx      ON projects(client_id);
CREATE INDEX IF NOT EXISTS projects_status_idx      ON projects(status);
CREATE INDEX IF NOT EXISTS project_bids_project_idx ON project_bids(project_id);
CREATE INDEX IF NOT EXISTS notifications_user_idx   ON notifications(user_id, read);

PRAGMA user_version = 1;
";
