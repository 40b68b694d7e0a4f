use rusqlite::Connection;

use crate::error::Result;

/// Initialise the mailflow schema in `conn`. Idempotent — safe to call on
/// every startup. The `next_due_at` index keeps the due scan cheap even with
/// many dispatches.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS recipients (
            id          TEXT    NOT NULL PRIMARY KEY,
            email       TEXT    NOT NULL UNIQUE,
            name        TEXT,
            active      INTEGER NOT NULL DEFAULT 1,
            created_at  TEXT    NOT NULL,
            updated_at  TEXT    NOT NULL
        );

        CREATE TABLE IF NOT EXISTS send_lists (
            id     TEXT NOT NULL PRIMARY KEY,
            title  TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS send_list_members (
            list_id       TEXT NOT NULL REFERENCES send_lists(id) ON DELETE CASCADE,
            recipient_id  TEXT NOT NULL REFERENCES recipients(id) ON DELETE CASCADE,
            UNIQUE(list_id, recipient_id)
        );
        CREATE INDEX IF NOT EXISTS idx_members_list
            ON send_list_members (list_id);

        CREATE TABLE IF NOT EXISTS footers (
            id     TEXT NOT NULL PRIMARY KEY,
            title  TEXT NOT NULL UNIQUE,   -- identifier, never mailed
            text   TEXT
        );

        CREATE TABLE IF NOT EXISTS recurrences (
            id           TEXT NOT NULL PRIMARY KEY,
            frequency    TEXT NOT NULL,    -- daily | weekly | monthly
            time_of_day  TEXT NOT NULL     -- HH:MM:SS, UTC wall clock
        );

        CREATE TABLE IF NOT EXISTS dispatches (
            id                      TEXT    NOT NULL PRIMARY KEY,
            title                   TEXT    NOT NULL UNIQUE,
            send_list_id            TEXT    REFERENCES send_lists(id)  ON DELETE SET NULL,
            subject                 TEXT    NOT NULL,
            body                    TEXT    NOT NULL,
            footer_id               TEXT    REFERENCES footers(id)     ON DELETE SET NULL,
            recurrence_id           TEXT    REFERENCES recurrences(id) ON DELETE SET NULL,
            created_at              TEXT    NOT NULL,
            updated_at              TEXT    NOT NULL,
            last_sent_at            TEXT,               -- RFC 3339 or NULL
            next_due_at             TEXT,               -- RFC 3339 or NULL
            total_recipients_sent   INTEGER NOT NULL DEFAULT 0
        );

        -- Due scan: SELECT ... WHERE next_due_at IS NOT NULL AND next_due_at <= ?
        CREATE INDEX IF NOT EXISTS idx_dispatches_next_due
            ON dispatches (next_due_at);
        ",
    )?;
    Ok(())
}
