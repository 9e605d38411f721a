//! DDL statements and migrations for the SQLite schema.
//!
//! Timestamps are stored as TEXT in ISO 8601 format (SQLite has no native
//! datetime type). Booleans are stored as INTEGER (0/1). The rule stage set
//! is a JSON array in TEXT.

/// Current schema version. Bumped whenever DDL or migrations change.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Core DDL statements executed during `init_schema`.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    // -- Leads table ---------------------------------------------------------
    r#"
    CREATE TABLE IF NOT EXISTS leads (
        id               TEXT PRIMARY KEY,
        name             TEXT NOT NULL,
        handle           TEXT NOT NULL DEFAULT '',
        notes            TEXT NOT NULL DEFAULT '',
        stage            TEXT NOT NULL,
        stage_entered_at TEXT NOT NULL,
        client_id        TEXT,
        converted        INTEGER NOT NULL DEFAULT 0,
        created_at       TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        updated_at       TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_leads_stage ON leads(stage)",
    "CREATE INDEX IF NOT EXISTS idx_leads_converted ON leads(converted)",
    // -- Calls table ---------------------------------------------------------
    r#"
    CREATE TABLE IF NOT EXISTS calls (
        id            TEXT PRIMARY KEY,
        lead_id       TEXT REFERENCES leads(id) ON DELETE SET NULL,
        client_id     TEXT,
        scheduled_at  TEXT NOT NULL,
        recording_url TEXT NOT NULL DEFAULT '',
        notes         TEXT NOT NULL DEFAULT '',
        outcome       TEXT NOT NULL DEFAULT 'pending',
        created_at    TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_calls_lead ON calls(lead_id)",
    "CREATE INDEX IF NOT EXISTS idx_calls_scheduled_at ON calls(scheduled_at)",
    // -- Clients table -------------------------------------------------------
    r#"
    CREATE TABLE IF NOT EXISTS clients (
        id             TEXT PRIMARY KEY,
        name           TEXT NOT NULL,
        email          TEXT NOT NULL DEFAULT '',
        phone          TEXT NOT NULL DEFAULT '',
        handle         TEXT NOT NULL DEFAULT '',
        source_lead_id TEXT NOT NULL DEFAULT '',
        created_at     TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
    )
    "#,
    // -- Follow-up rules table -----------------------------------------------
    r#"
    CREATE TABLE IF NOT EXISTS followup_rules (
        id          TEXT PRIMARY KEY,
        message     TEXT NOT NULL,
        delay_hours INTEGER NOT NULL,
        active      INTEGER NOT NULL DEFAULT 1,
        stages      TEXT NOT NULL DEFAULT '[]',
        created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
    )
    "#,
    // -- Dispatch acknowledgements -------------------------------------------
    // The composite key carries the lead's stage_entered_at: an ack only
    // suppresses a rule for that exact stage-entry instant. No FK on
    // lead_id/rule_id; superseded acks are simply never matched again.
    r#"
    CREATE TABLE IF NOT EXISTS dispatch_acks (
        rule_id          TEXT NOT NULL,
        lead_id          TEXT NOT NULL,
        stage_entered_at TEXT NOT NULL,
        created_at       TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        PRIMARY KEY (rule_id, lead_id, stage_entered_at)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_dispatch_acks_lead ON dispatch_acks(lead_id)",
    // -- Config / metadata ---------------------------------------------------
    r#"
    CREATE TABLE IF NOT EXISTS config (
        key   TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS metadata (
        key   TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )
    "#,
];

/// Default config values inserted on first init (INSERT OR IGNORE).
pub const DEFAULT_CONFIG: &[(&str, &str)] = &[("id_prefix_style", "hash")];

/// Named migrations applied after the base DDL, tracked in `metadata`.
pub const MIGRATIONS: &[(&str, &str)] = &[];
