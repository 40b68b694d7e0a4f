use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;
use uuid::Uuid;

use mailflow_recurrence::Recurrence;

use crate::{
    db::init_db,
    error::{Result, StoreError},
    types::{Dispatch, Footer, NewDispatch, Recipient, RecurrenceRecord, SendList, UpdateDispatch},
};

/// Shared handle over a single SQLite connection.
///
/// HTTP handlers and the runner each hold a clone; the inner mutex serialises
/// access the same way the rest of the system serialises runs.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    pub fn new(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        init_db(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open(path: &str) -> Result<Self> {
        Self::new(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::new(Connection::open_in_memory()?)
    }

    // --- recipients --------------------------------------------------------

    pub fn create_recipient(
        &self,
        email: &str,
        name: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Recipient> {
        let conn = self.conn.lock().unwrap();
        let id = Uuid::new_v4().to_string();
        let now_str = now.to_rfc3339();
        conn.execute(
            "INSERT INTO recipients (id, email, name, active, created_at, updated_at)
             VALUES (?1, ?2, ?3, 1, ?4, ?4)",
            params![id, email, name, now_str],
        )?;
        Ok(Recipient {
            id,
            email: email.to_string(),
            name: name.map(String::from),
            active: true,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn list_recipients(&self) -> Result<Vec<Recipient>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, email, name, active, created_at, updated_at
             FROM recipients ORDER BY created_at DESC",
        )?;
        let rows: Vec<RawRecipient> = stmt
            .query_map([], raw_recipient)?
            .collect::<rusqlite::Result<_>>()?;
        rows.into_iter().map(Recipient::try_from).collect()
    }

    pub fn set_recipient_active(&self, id: &str, active: bool, now: DateTime<Utc>) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute(
            "UPDATE recipients SET active = ?1, updated_at = ?2 WHERE id = ?3",
            params![active as i32, now.to_rfc3339(), id],
        )?;
        if n == 0 {
            return Err(StoreError::NotFound {
                entity: "recipient",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    pub fn delete_recipient(&self, id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute("DELETE FROM recipients WHERE id = ?1", [id])?;
        if n == 0 {
            return Err(StoreError::NotFound {
                entity: "recipient",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    // --- send lists --------------------------------------------------------

    pub fn create_send_list(&self, title: &str) -> Result<SendList> {
        let conn = self.conn.lock().unwrap();
        let id = Uuid::new_v4().to_string();
        conn.execute(
            "INSERT INTO send_lists (id, title) VALUES (?1, ?2)",
            params![id, title],
        )?;
        Ok(SendList {
            id,
            title: title.to_string(),
        })
    }

    pub fn list_send_lists(&self) -> Result<Vec<SendList>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT id, title FROM send_lists ORDER BY title")?;
        let lists = stmt
            .query_map([], |row| {
                Ok(SendList {
                    id: row.get(0)?,
                    title: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<_>>()?;
        Ok(lists)
    }

    pub fn add_list_member(&self, list_id: &str, recipient_id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO send_list_members (list_id, recipient_id) VALUES (?1, ?2)",
            params![list_id, recipient_id],
        )?;
        Ok(())
    }

    pub fn remove_list_member(&self, list_id: &str, recipient_id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM send_list_members WHERE list_id = ?1 AND recipient_id = ?2",
            params![list_id, recipient_id],
        )?;
        Ok(())
    }

    pub fn delete_send_list(&self, id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute("DELETE FROM send_lists WHERE id = ?1", [id])?;
        if n == 0 {
            return Err(StoreError::NotFound {
                entity: "send list",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// Active members of a send list — the set that actually receives mail.
    pub fn active_recipients(&self, list_id: &str) -> Result<Vec<Recipient>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT r.id, r.email, r.name, r.active, r.created_at, r.updated_at
             FROM recipients r
             JOIN send_list_members m ON m.recipient_id = r.id
             WHERE m.list_id = ?1 AND r.active = 1",
        )?;
        let rows: Vec<RawRecipient> = stmt
            .query_map([list_id], raw_recipient)?
            .collect::<rusqlite::Result<_>>()?;
        rows.into_iter().map(Recipient::try_from).collect()
    }

    /// `None` when the dispatch has no send list configured; otherwise the
    /// exact count of active members (0 for a configured-but-empty list).
    pub fn recipient_count(&self, dispatch: &Dispatch) -> Result<Option<u64>> {
        let Some(ref list_id) = dispatch.send_list_id else {
            return Ok(None);
        };
        let conn = self.conn.lock().unwrap();
        let count: u64 = conn.query_row(
            "SELECT COUNT(*)
             FROM send_list_members m
             JOIN recipients r ON r.id = m.recipient_id
             WHERE m.list_id = ?1 AND r.active = 1",
            [list_id],
            |row| row.get(0),
        )?;
        Ok(Some(count))
    }

    // --- footers -----------------------------------------------------------

    pub fn create_footer(&self, title: &str, text: Option<&str>) -> Result<Footer> {
        let conn = self.conn.lock().unwrap();
        let id = Uuid::new_v4().to_string();
        conn.execute(
            "INSERT INTO footers (id, title, text) VALUES (?1, ?2, ?3)",
            params![id, title, text],
        )?;
        Ok(Footer {
            id,
            title: title.to_string(),
            text: text.map(String::from),
        })
    }

    pub fn get_footer(&self, id: &str) -> Result<Option<Footer>> {
        let conn = self.conn.lock().unwrap();
        let footer = conn
            .query_row(
                "SELECT id, title, text FROM footers WHERE id = ?1",
                [id],
                |row| {
                    Ok(Footer {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        text: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(footer)
    }

    pub fn list_footers(&self) -> Result<Vec<Footer>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT id, title, text FROM footers ORDER BY title")?;
        let footers = stmt
            .query_map([], |row| {
                Ok(Footer {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    text: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<_>>()?;
        Ok(footers)
    }

    // --- recurrences -------------------------------------------------------

    pub fn create_recurrence(&self, rule: Recurrence) -> Result<RecurrenceRecord> {
        let conn = self.conn.lock().unwrap();
        let id = Uuid::new_v4().to_string();
        conn.execute(
            "INSERT INTO recurrences (id, frequency, time_of_day) VALUES (?1, ?2, ?3)",
            params![
                id,
                rule.frequency.to_string(),
                rule.time_of_day.format("%H:%M:%S").to_string()
            ],
        )?;
        info!(recurrence_id = %id, frequency = %rule.frequency, "recurrence created");
        Ok(RecurrenceRecord { id, rule })
    }

    pub fn get_recurrence(&self, id: &str) -> Result<Option<RecurrenceRecord>> {
        let conn = self.conn.lock().unwrap();
        let raw = conn
            .query_row(
                "SELECT id, frequency, time_of_day FROM recurrences WHERE id = ?1",
                [id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;
        raw.map(parse_recurrence).transpose()
    }

    pub fn list_recurrences(&self) -> Result<Vec<RecurrenceRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT id, frequency, time_of_day FROM recurrences")?;
        let rows: Vec<(String, String, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
            .collect::<rusqlite::Result<_>>()?;
        rows.into_iter().map(parse_recurrence).collect()
    }

    pub fn delete_recurrence(&self, id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute("DELETE FROM recurrences WHERE id = ?1", [id])?;
        if n == 0 {
            return Err(StoreError::NotFound {
                entity: "recurrence",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    // --- dispatches --------------------------------------------------------

    pub fn create_dispatch(&self, new: &NewDispatch, now: DateTime<Utc>) -> Result<Dispatch> {
        let conn = self.conn.lock().unwrap();
        let id = Uuid::new_v4().to_string();
        let now_str = now.to_rfc3339();
        conn.execute(
            "INSERT INTO dispatches
             (id, title, send_list_id, subject, body, footer_id, recurrence_id,
              created_at, updated_at, last_sent_at, next_due_at, total_recipients_sent)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8, NULL, NULL, 0)",
            params![
                id,
                new.title,
                new.send_list_id,
                new.subject,
                new.body,
                new.footer_id,
                new.recurrence_id,
                now_str
            ],
        )?;
        info!(dispatch_id = %id, title = %new.title, "dispatch created");
        Ok(Dispatch {
            id,
            title: new.title.clone(),
            send_list_id: new.send_list_id.clone(),
            subject: new.subject.clone(),
            body: new.body.clone(),
            footer_id: new.footer_id.clone(),
            recurrence_id: new.recurrence_id.clone(),
            created_at: now,
            updated_at: now,
            last_sent_at: None,
            next_due_at: None,
            total_recipients_sent: 0,
        })
    }

    pub fn get_dispatch(&self, id: &str) -> Result<Dispatch> {
        let conn = self.conn.lock().unwrap();
        let raw = conn
            .query_row(
                &format!("{DISPATCH_SELECT} WHERE id = ?1"),
                [id],
                raw_dispatch,
            )
            .optional()?;
        match raw {
            Some(r) => Dispatch::try_from(r),
            None => Err(StoreError::NotFound {
                entity: "dispatch",
                id: id.to_string(),
            }),
        }
    }

    pub fn list_dispatches(&self) -> Result<Vec<Dispatch>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!("{DISPATCH_SELECT} ORDER BY created_at DESC"))?;
        let rows: Vec<RawDispatch> = stmt
            .query_map([], raw_dispatch)?
            .collect::<rusqlite::Result<_>>()?;
        rows.into_iter().map(Dispatch::try_from).collect()
    }

    /// Apply a partial field update. Does NOT touch `next_due_at` — the
    /// scheduler owns that field and reacts to rule-change events separately.
    pub fn update_dispatch(
        &self,
        id: &str,
        update: &UpdateDispatch,
        now: DateTime<Utc>,
    ) -> Result<Dispatch> {
        let mut current = self.get_dispatch(id)?;
        if let Some(ref title) = update.title {
            current.title = title.clone();
        }
        if let Some(ref subject) = update.subject {
            current.subject = subject.clone();
        }
        if let Some(ref body) = update.body {
            current.body = body.clone();
        }
        if let Some(ref send_list_id) = update.send_list_id {
            current.send_list_id = send_list_id.clone();
        }
        if let Some(ref footer_id) = update.footer_id {
            current.footer_id = footer_id.clone();
        }
        if let Some(ref recurrence_id) = update.recurrence_id {
            current.recurrence_id = recurrence_id.clone();
        }
        current.updated_at = now;

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE dispatches SET title = ?1, subject = ?2, body = ?3,
                 send_list_id = ?4, footer_id = ?5, recurrence_id = ?6, updated_at = ?7
             WHERE id = ?8",
            params![
                current.title,
                current.subject,
                current.body,
                current.send_list_id,
                current.footer_id,
                current.recurrence_id,
                now.to_rfc3339(),
                id
            ],
        )?;
        Ok(current)
    }

    pub fn delete_dispatch(&self, id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute("DELETE FROM dispatches WHERE id = ?1", [id])?;
        if n == 0 {
            return Err(StoreError::NotFound {
                entity: "dispatch",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    pub fn set_next_due_at(
        &self,
        id: &str,
        next_due_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute(
            "UPDATE dispatches SET next_due_at = ?1, updated_at = ?2 WHERE id = ?3",
            params![next_due_at.map(|d| d.to_rfc3339()), now.to_rfc3339(), id],
        )?;
        if n == 0 {
            return Err(StoreError::NotFound {
                entity: "dispatch",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// Commit the outcome of a successful send cycle in one write, so a crash
    /// can never leave `last_sent_at` advanced without `next_due_at` (or the
    /// counter) — the split would cause duplicate or skipped sends.
    pub fn record_send_cycle(
        &self,
        id: &str,
        sent_at: DateTime<Utc>,
        next_due_at: Option<DateTime<Utc>>,
        recipients_sent: u64,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute(
            "UPDATE dispatches
             SET last_sent_at = ?1,
                 next_due_at = ?2,
                 total_recipients_sent = total_recipients_sent + ?3,
                 updated_at = ?1
             WHERE id = ?4",
            params![
                sent_at.to_rfc3339(),
                next_due_at.map(|d| d.to_rfc3339()),
                recipients_sent,
                id
            ],
        )?;
        if n == 0 {
            return Err(StoreError::NotFound {
                entity: "dispatch",
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

const DISPATCH_SELECT: &str = "SELECT id, title, send_list_id, subject, body, footer_id,
        recurrence_id, created_at, updated_at, last_sent_at, next_due_at,
        total_recipients_sent
 FROM dispatches";

type RawRecipient = (String, String, Option<String>, i32, String, String);

fn raw_recipient(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRecipient> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

impl TryFrom<RawRecipient> for Recipient {
    type Error = StoreError;

    fn try_from(raw: RawRecipient) -> Result<Self> {
        let (id, email, name, active, created_at, updated_at) = raw;
        Ok(Recipient {
            id,
            email,
            name,
            active: active != 0,
            created_at: parse_ts(&created_at)?,
            updated_at: parse_ts(&updated_at)?,
        })
    }
}

type RawDispatch = (
    String,         // id
    String,         // title
    Option<String>, // send_list_id
    String,         // subject
    String,         // body
    Option<String>, // footer_id
    Option<String>, // recurrence_id
    String,         // created_at
    String,         // updated_at
    Option<String>, // last_sent_at
    Option<String>, // next_due_at
    u64,            // total_recipients_sent
);

fn raw_dispatch(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawDispatch> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
        row.get(10)?,
        row.get(11)?,
    ))
}

impl TryFrom<RawDispatch> for Dispatch {
    type Error = StoreError;

    fn try_from(raw: RawDispatch) -> Result<Self> {
        let (
            id,
            title,
            send_list_id,
            subject,
            body,
            footer_id,
            recurrence_id,
            created_at,
            updated_at,
            last_sent_at,
            next_due_at,
            total_recipients_sent,
        ) = raw;
        Ok(Dispatch {
            id,
            title,
            send_list_id,
            subject,
            body,
            footer_id,
            recurrence_id,
            created_at: parse_ts(&created_at)?,
            updated_at: parse_ts(&updated_at)?,
            last_sent_at: last_sent_at.as_deref().map(parse_ts).transpose()?,
            next_due_at: next_due_at.as_deref().map(parse_ts).transpose()?,
            total_recipients_sent,
        })
    }
}

fn parse_ts(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| StoreError::InvalidData(format!("timestamp {s:?}: {e}")))
}

fn parse_recurrence(raw: (String, String, String)) -> Result<RecurrenceRecord> {
    let (id, frequency, time_of_day) = raw;
    let frequency = frequency
        .parse()
        .map_err(|e| StoreError::InvalidData(format!("recurrence {id}: {e}")))?;
    let time_of_day = NaiveTime::parse_from_str(&time_of_day, "%H:%M:%S")
        .map_err(|e| StoreError::InvalidData(format!("recurrence {id}: bad time_of_day: {e}")))?;
    Ok(RecurrenceRecord {
        id,
        rule: Recurrence::new(frequency, time_of_day),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mailflow_recurrence::Frequency;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap()
    }

    fn dispatch_with_list(store: &Store) -> Dispatch {
        let list = store.create_send_list("Weekly digest").unwrap();
        store
            .create_dispatch(
                &NewDispatch {
                    title: "Digest".into(),
                    subject: "News".into(),
                    body: "Hello".into(),
                    send_list_id: Some(list.id),
                    footer_id: None,
                    recurrence_id: None,
                },
                now(),
            )
            .unwrap()
    }

    #[test]
    fn recipient_count_without_list_is_none() {
        let store = Store::in_memory().unwrap();
        let dispatch = store
            .create_dispatch(
                &NewDispatch {
                    title: "No list".into(),
                    subject: "s".into(),
                    body: "b".into(),
                    send_list_id: None,
                    footer_id: None,
                    recurrence_id: None,
                },
                now(),
            )
            .unwrap();
        assert_eq!(store.recipient_count(&dispatch).unwrap(), None);
    }

    #[test]
    fn recipient_count_is_exact_active_cardinality() {
        let store = Store::in_memory().unwrap();
        let dispatch = dispatch_with_list(&store);
        let list_id = dispatch.send_list_id.clone().unwrap();

        for i in 0..5 {
            let r = store
                .create_recipient(&format!("user{i}@example.com"), None, now())
                .unwrap();
            store.add_list_member(&list_id, &r.id).unwrap();
        }
        assert_eq!(store.recipient_count(&dispatch).unwrap(), Some(5));
    }

    #[test]
    fn empty_configured_list_counts_zero_not_none() {
        let store = Store::in_memory().unwrap();
        let dispatch = dispatch_with_list(&store);
        assert_eq!(store.recipient_count(&dispatch).unwrap(), Some(0));
    }

    #[test]
    fn inactive_recipients_are_excluded() {
        let store = Store::in_memory().unwrap();
        let dispatch = dispatch_with_list(&store);
        let list_id = dispatch.send_list_id.clone().unwrap();

        let active = store
            .create_recipient("active@example.com", None, now())
            .unwrap();
        let inactive = store
            .create_recipient("inactive@example.com", None, now())
            .unwrap();
        store.add_list_member(&list_id, &active.id).unwrap();
        store.add_list_member(&list_id, &inactive.id).unwrap();
        store
            .set_recipient_active(&inactive.id, false, now())
            .unwrap();

        assert_eq!(store.recipient_count(&dispatch).unwrap(), Some(1));
        let members = store.active_recipients(&list_id).unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].email, "active@example.com");
    }

    #[test]
    fn record_send_cycle_commits_all_fields_together() {
        let store = Store::in_memory().unwrap();
        let dispatch = dispatch_with_list(&store);
        let sent_at = now();
        let next = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();

        store
            .record_send_cycle(&dispatch.id, sent_at, Some(next), 5)
            .unwrap();
        store
            .record_send_cycle(&dispatch.id, sent_at, Some(next), 3)
            .unwrap();

        let reloaded = store.get_dispatch(&dispatch.id).unwrap();
        assert_eq!(reloaded.last_sent_at, Some(sent_at));
        assert_eq!(reloaded.next_due_at, Some(next));
        assert_eq!(reloaded.total_recipients_sent, 8);
    }

    #[test]
    fn deleting_recurrence_nulls_dispatch_reference() {
        let store = Store::in_memory().unwrap();
        let rec = store
            .create_recurrence(Recurrence::new(
                Frequency::Daily,
                NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            ))
            .unwrap();
        let dispatch = store
            .create_dispatch(
                &NewDispatch {
                    title: "With rule".into(),
                    subject: "s".into(),
                    body: "b".into(),
                    send_list_id: None,
                    footer_id: None,
                    recurrence_id: Some(rec.id.clone()),
                },
                now(),
            )
            .unwrap();

        store.delete_recurrence(&rec.id).unwrap();
        let reloaded = store.get_dispatch(&dispatch.id).unwrap();
        assert_eq!(reloaded.recurrence_id, None);
        assert_eq!(store.get_recurrence(&rec.id).unwrap().map(|r| r.id), None);
    }

    #[test]
    fn recurrence_round_trips_through_sqlite() {
        let store = Store::in_memory().unwrap();
        let rule = Recurrence::new(
            Frequency::Monthly,
            NaiveTime::from_hms_opt(23, 30, 15).unwrap(),
        );
        let rec = store.create_recurrence(rule).unwrap();
        let loaded = store.get_recurrence(&rec.id).unwrap().unwrap();
        assert_eq!(loaded.rule, rule);
    }

    #[test]
    fn corrupt_frequency_surfaces_as_invalid_data() {
        let store = Store::in_memory().unwrap();
        {
            let conn = store.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO recurrences (id, frequency, time_of_day)
                 VALUES ('bad', 'fortnightly', '09:00:00')",
                [],
            )
            .unwrap();
        }
        let err = store.get_recurrence("bad").unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));
    }

    #[test]
    fn update_does_not_touch_next_due_at() {
        let store = Store::in_memory().unwrap();
        let dispatch = dispatch_with_list(&store);
        let due = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        store
            .set_next_due_at(&dispatch.id, Some(due), now())
            .unwrap();

        let update = UpdateDispatch {
            subject: Some("New subject".into()),
            ..Default::default()
        };
        let updated = store.update_dispatch(&dispatch.id, &update, now()).unwrap();
        assert_eq!(updated.subject, "New subject");
        assert_eq!(updated.next_due_at, Some(due));
    }

    #[test]
    fn update_can_clear_the_recurrence_reference() {
        let store = Store::in_memory().unwrap();
        let rec = store
            .create_recurrence(Recurrence::new(
                Frequency::Daily,
                NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            ))
            .unwrap();
        let dispatch = store
            .create_dispatch(
                &NewDispatch {
                    title: "Clearable".into(),
                    subject: "s".into(),
                    body: "b".into(),
                    send_list_id: None,
                    footer_id: None,
                    recurrence_id: Some(rec.id),
                },
                now(),
            )
            .unwrap();

        let update = UpdateDispatch {
            recurrence_id: Some(None),
            ..Default::default()
        };
        let updated = store.update_dispatch(&dispatch.id, &update, now()).unwrap();
        assert_eq!(updated.recurrence_id, None);
    }

    #[test]
    fn missing_dispatch_is_not_found() {
        let store = Store::in_memory().unwrap();
        let err = store.get_dispatch("nope").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
