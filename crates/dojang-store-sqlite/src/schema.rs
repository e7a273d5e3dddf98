//! SQL schema for the Dojang SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS identities (
    identity_id   TEXT PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,   -- argon2 PHC string
    first_name    TEXT NOT NULL DEFAULT '',
    last_name     TEXT NOT NULL DEFAULT '',
    role          TEXT NOT NULL,   -- 'admin' | 'judge' | 'trainee'
    created_at    TEXT NOT NULL    -- ISO 8601 UTC; server-assigned
);

CREATE TABLE IF NOT EXISTS belts (
    belt_id TEXT PRIMARY KEY,
    name    TEXT NOT NULL,
    color   TEXT NOT NULL DEFAULT '#000000',
    rank    INTEGER NOT NULL UNIQUE  -- the sole ranking key
);

-- One profile per identity. Deactivation clears is_active; rows are never
-- removed, so match/payment/promotion history stays referencable.
CREATE TABLE IF NOT EXISTS trainees (
    trainee_id        TEXT PRIMARY KEY,
    identity_id       TEXT NOT NULL UNIQUE
                        REFERENCES identities(identity_id) ON DELETE CASCADE,
    date_of_birth     TEXT NOT NULL,
    belt_id           TEXT REFERENCES belts(belt_id) ON DELETE SET NULL,
    contact_number    TEXT NOT NULL,
    address           TEXT NOT NULL,
    emergency_contact TEXT,
    emergency_phone   TEXT,
    join_date         TEXT NOT NULL,
    is_active         INTEGER NOT NULL DEFAULT 0,
    is_approved       INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS events (
    event_id              TEXT PRIMARY KEY,
    name                  TEXT NOT NULL,
    description           TEXT NOT NULL DEFAULT '',
    start_at              TEXT NOT NULL,
    end_at                TEXT NOT NULL,
    location              TEXT NOT NULL,
    kind                  TEXT NOT NULL DEFAULT 'training',
    max_participants      INTEGER,
    registration_deadline TEXT,
    is_published          INTEGER NOT NULL DEFAULT 0
);

-- Matches go down with their event; a deleted winner or judge is nulled
-- out so the result row itself survives.
CREATE TABLE IF NOT EXISTS matches (
    match_id    TEXT PRIMARY KEY,
    event_id    TEXT NOT NULL REFERENCES events(event_id) ON DELETE CASCADE,
    trainee1_id TEXT NOT NULL REFERENCES trainees(trainee_id) ON DELETE CASCADE,
    trainee2_id TEXT NOT NULL REFERENCES trainees(trainee_id) ON DELETE CASCADE,
    winner_id   TEXT REFERENCES trainees(trainee_id) ON DELETE SET NULL,
    score1      INTEGER NOT NULL DEFAULT 0,
    score2      INTEGER NOT NULL DEFAULT 0,
    judge_id    TEXT REFERENCES identities(identity_id) ON DELETE SET NULL,
    match_time  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS payments (
    payment_id  TEXT PRIMARY KEY,
    trainee_id  TEXT NOT NULL REFERENCES trainees(trainee_id) ON DELETE CASCADE,
    amount      TEXT NOT NULL,   -- decimal in its natural string form
    due_date    TEXT NOT NULL,
    description TEXT NOT NULL,
    paid        INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS promotions (
    promotion_id TEXT PRIMARY KEY,
    trainee_id   TEXT NOT NULL REFERENCES trainees(trainee_id) ON DELETE CASCADE,
    belt_from    TEXT REFERENCES belts(belt_id) ON DELETE SET NULL,
    belt_to      TEXT REFERENCES belts(belt_id) ON DELETE SET NULL,
    awarded_on   TEXT NOT NULL
);

-- Immutable once created except for is_read.
CREATE TABLE IF NOT EXISTS notifications (
    notification_id TEXT PRIMARY KEY,
    recipient_id    TEXT NOT NULL
                      REFERENCES identities(identity_id) ON DELETE CASCADE,
    title           TEXT NOT NULL,
    message         TEXT NOT NULL,
    kind            TEXT NOT NULL,  -- 'match' | 'payment' | 'promotion' | 'event'
    is_read         INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL,
    link            TEXT
);

-- Single row per stat_type; last-write-wins, always derivable.
CREATE TABLE IF NOT EXISTS dashboard_stats (
    stat_type  TEXT PRIMARY KEY,
    value_json TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS trainees_identity_idx     ON trainees(identity_id);
CREATE INDEX IF NOT EXISTS matches_event_idx         ON matches(event_id);
CREATE INDEX IF NOT EXISTS matches_judge_idx         ON matches(judge_id);
CREATE INDEX IF NOT EXISTS matches_trainee1_idx      ON matches(trainee1_id);
CREATE INDEX IF NOT EXISTS matches_trainee2_idx      ON matches(trainee2_id);
CREATE INDEX IF NOT EXISTS payments_trainee_idx      ON payments(trainee_id);
CREATE INDEX IF NOT EXISTS promotions_trainee_idx    ON promotions(trainee_id);
CREATE INDEX IF NOT EXISTS notifications_recipient_idx
    ON notifications(recipient_id);

PRAGMA user_version = 1;
";
