use chrono::{DateTime, Utc};
use mailflow_recurrence::Recurrence;
use serde::{Deserialize, Serialize};

/// A single email address that can belong to any number of send lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    /// Inactive recipients stay on their lists but receive no mail.
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A named set of recipients. Membership is many-to-many, order irrelevant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendList {
    pub id: String,
    pub title: String,
}

/// Footer text appended to a dispatch body after a blank line. The title is
/// an identifier only and is never included in the email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Footer {
    pub id: String,
    pub title: String,
    pub text: Option<String>,
}

/// A persisted recurrence rule. The rule itself is immutable; dispatches
/// reference it by id and never mutate it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurrenceRecord {
    pub id: String,
    #[serde(flatten)]
    pub rule: Recurrence,
}

/// A schedulable bulk-email job.
///
/// `next_due_at` is derived state, owned exclusively by this record: present
/// iff a recurrence is attached and the dispatch is active. `last_sent_at`
/// is set only by a successful send cycle; `total_recipients_sent` only ever
/// grows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dispatch {
    pub id: String,
    pub title: String,
    pub send_list_id: Option<String>,
    pub subject: String,
    pub body: String,
    pub footer_id: Option<String>,
    pub recurrence_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_sent_at: Option<DateTime<Utc>>,
    pub next_due_at: Option<DateTime<Utc>>,
    pub total_recipients_sent: u64,
}

impl Dispatch {
    /// Active means "will be considered by the due scan".
    pub fn is_active(&self) -> bool {
        self.next_due_at.is_some()
    }
}

/// Fields for creating a dispatch. `next_due_at` is not accepted here — it
/// is derived by the scheduler after creation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDispatch {
    pub title: String,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub send_list_id: Option<String>,
    #[serde(default)]
    pub footer_id: Option<String>,
    #[serde(default)]
    pub recurrence_id: Option<String>,
}

/// Partial update of dispatch fields. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDispatch {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    /// `Some(None)` clears the reference, `Some(Some(id))` replaces it.
    #[serde(default, with = "double_option")]
    pub send_list_id: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    pub footer_id: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    pub recurrence_id: Option<Option<String>>,
}

/// Distinguishes "field absent from the JSON" from "field present and null".
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(de).map(Some)
    }
}
