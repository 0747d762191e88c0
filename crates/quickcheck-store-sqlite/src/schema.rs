//! SQL schema for the QuickCheck SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Lists are returned in `rowid` order, which is insertion order.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id TEXT PRIMARY KEY,
    name    TEXT NOT NULL,
    role    TEXT NOT NULL    -- 'admin' | 'guard' | 'host'
);

CREATE TABLE IF NOT EXISTS hosts (
    host_id    TEXT PRIMARY KEY,
    name       TEXT NOT NULL,
    department TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS guests (
    guest_id   TEXT PRIMARY KEY,
    name       TEXT NOT NULL,
    id_number  TEXT NOT NULL,
    phone      TEXT NOT NULL,
    email      TEXT NOT NULL,
    consent    INTEGER NOT NULL,
    created_at TEXT NOT NULL
);

-- guest_id and checked_in_by are deliberately not foreign keys: a visit
-- outlives whatever it points at.
CREATE TABLE IF NOT EXISTS visits (
    visit_id            TEXT PRIMARY KEY,
    guest_id            TEXT NOT NULL,
    check_in_ts         TEXT NOT NULL,
    check_out_ts        TEXT,            -- NULL while the visit is active
    host                TEXT NOT NULL,   -- free text, not a hosts reference
    reason              TEXT NOT NULL,
    device_info         TEXT NOT NULL,
    custom_fields       TEXT NOT NULL DEFAULT '{}',
    checked_in_by       TEXT NOT NULL,
    approval_status     TEXT NOT NULL DEFAULT 'pending',
    review_request_sent INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS appointments (
    appointment_id  TEXT PRIMARY KEY,
    guest_name      TEXT NOT NULL,
    guest_id_number TEXT NOT NULL,
    host_id         TEXT NOT NULL,
    created_at      TEXT NOT NULL,
    status          TEXT NOT NULL DEFAULT 'scheduled'
);

CREATE TABLE IF NOT EXISTS custom_fields (
    field_id TEXT PRIMARY KEY,
    name     TEXT NOT NULL,
    label    TEXT NOT NULL,
    kind     TEXT NOT NULL    -- 'text' | 'number' | 'checkbox'
);

-- Singleton row, always id = 1.
CREATE TABLE IF NOT EXISTS notification_settings (
    id                    INTEGER PRIMARY KEY CHECK (id = 1),
    auto_send_on_checkout INTEGER NOT NULL,
    email_template        TEXT NOT NULL,
    sms_template          TEXT NOT NULL
);

-- Append-only; at most one request per visit.
CREATE TABLE IF NOT EXISTS review_requests (
    request_id TEXT PRIMARY KEY,
    visit_id   TEXT NOT NULL REFERENCES visits(visit_id),
    guest_name TEXT NOT NULL,
    channel    TEXT NOT NULL,    -- 'email' | 'sms'
    sent_at    TEXT NOT NULL,
    UNIQUE (visit_id)
);

CREATE TABLE IF NOT EXISTS reviews (
    visit_id     TEXT NOT NULL REFERENCES visits(visit_id),
    rating       INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
    comment      TEXT NOT NULL,
    submitted_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS visits_host_idx         ON visits(host);
CREATE INDEX IF NOT EXISTS appointments_host_idx   ON appointments(host_id);

PRAGMA user_version = 1;
";
