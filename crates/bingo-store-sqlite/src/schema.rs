//! SQL schema for the bingo SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
PRAGMA busy_timeout = 5000;

CREATE TABLE IF NOT EXISTS rooms (
    room_id     TEXT PRIMARY KEY,
    code        TEXT NOT NULL UNIQUE,   -- 'XXX-999'
    created_by  TEXT NOT NULL,
    is_closed   INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL
);

-- One row per user: a user is in at most one room at a time.
CREATE TABLE IF NOT EXISTS participants (
    user_id     TEXT PRIMARY KEY,
    room_id     TEXT NOT NULL REFERENCES rooms(room_id),
    joined_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS cards (
    card_id      TEXT PRIMARY KEY,
    room_id      TEXT NOT NULL REFERENCES rooms(room_id),
    owner_id     TEXT NOT NULL,
    numbers      TEXT NOT NULL,         -- JSON, 5 rows of 5
    content_hash TEXT NOT NULL UNIQUE,
    created_at   TEXT NOT NULL,
    UNIQUE (room_id, owner_id)
);

CREATE TABLE IF NOT EXISTS sessions (
    session_id       TEXT PRIMARY KEY,
    room_id          TEXT NOT NULL UNIQUE REFERENCES rooms(room_id),
    is_active        INTEGER NOT NULL DEFAULT 1,
    winner_id        TEXT,
    winning_card_id  TEXT REFERENCES cards(card_id),
    created_at       TEXT NOT NULL,
    ended_at         TEXT,
    CHECK (winner_id IS NULL OR is_active = 0)
);

-- The sequence column is the draw order.
CREATE TABLE IF NOT EXISTS drawn_numbers (
    session_id  TEXT NOT NULL REFERENCES sessions(session_id),
    number      INTEGER NOT NULL CHECK (number BETWEEN 1 AND 75),
    sequence    INTEGER NOT NULL CHECK (sequence BETWEEN 1 AND 75),
    drawn_at    TEXT NOT NULL,
    PRIMARY KEY (session_id, number),
    UNIQUE (session_id, sequence)
);

-- Strictly append-only.
CREATE TABLE IF NOT EXISTS audit_log (
    entry_id    TEXT PRIMARY KEY,
    actor_id    TEXT NOT NULL,
    action      TEXT NOT NULL,
    target_id   TEXT,
    timestamp   TEXT NOT NULL
);

-- No foreign keys: history outlives the rooms and sessions it describes.
CREATE TABLE IF NOT EXISTS history (
    history_id        TEXT PRIMARY KEY,
    session_id        TEXT NOT NULL UNIQUE,
    room_code         TEXT NOT NULL,
    winner_id         TEXT,
    winning_card_hash TEXT,
    drawn_numbers     TEXT NOT NULL,    -- JSON array in draw order
    started_at        TEXT NOT NULL,
    ended_at          TEXT NOT NULL,
    is_completed      INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS participants_room_idx ON participants(room_id);
CREATE INDEX IF NOT EXISTS cards_room_idx        ON cards(room_id);
CREATE INDEX IF NOT EXISTS audit_timestamp_idx   ON audit_log(timestamp);
CREATE INDEX IF NOT EXISTS history_ended_idx     ON history(ended_at);

PRAGMA user_version = 1;
";
