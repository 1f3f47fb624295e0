//! SQL schema for the Daypart ledger.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per minted token. Rows are never updated or deleted, and ids are
-- dense: token_id = (row count at mint time) + 1.
CREATE TABLE IF NOT EXISTS tokens (
    token_id       INTEGER PRIMARY KEY CHECK (token_id > 0),
    owner          TEXT    NOT NULL,   -- lowercase account id
    offset_minutes INTEGER NOT NULL CHECK (offset_minutes BETWEEN -720 AND 840),
    minted_at      INTEGER NOT NULL    -- unix seconds, UTC
);

CREATE INDEX IF NOT EXISTS tokens_owner_idx ON tokens(owner);

PRAGMA user_version = 1;
";
