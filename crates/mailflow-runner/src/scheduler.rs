use chrono::{DateTime, Utc};
use tracing::info;

use mailflow_recurrence::{next_due, Recurrence};
use mailflow_store::{Dispatch, Store};

use crate::error::Result;

/// Why the scheduler is being asked to recompute.
///
/// Emitted explicitly by the write path: `Created` for a fresh record,
/// `RuleChanged` exactly when the persisted recurrence reference differs
/// from the incoming one. Edits to any other field emit nothing, so they
/// can never perturb `next_due_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchEvent {
    Created,
    RuleChanged,
}

/// Owns every mutation of a dispatch's derived scheduling state.
#[derive(Clone)]
pub struct DispatchScheduler {
    store: Store,
}

impl DispatchScheduler {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// React to a creation or rule-change event: recompute `next_due_at`
    /// from `now` with no last-occurrence — a changed rule starts a fresh
    /// cycle, so any prior `last_sent_at` is deliberately ignored.
    ///
    /// Idempotent: the same dispatch, rule, and `now` always produce the
    /// same instant.
    pub fn handle(
        &self,
        event: DispatchEvent,
        dispatch: &Dispatch,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>> {
        let next = self.compute_fresh(dispatch, now)?;
        self.store.set_next_due_at(&dispatch.id, next, now)?;
        info!(
            dispatch_id = %dispatch.id,
            event = ?event,
            next_due_at = ?next,
            "next due recomputed"
        );
        Ok(next)
    }

    /// Flip the activation state. Active (a `next_due_at` is present) →
    /// deactivate by clearing it. Inactive → recompute from `now` as if
    /// freshly scheduled; without a rule the dispatch simply stays inactive.
    pub fn toggle_activation(
        &self,
        dispatch: &Dispatch,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>> {
        let next = if dispatch.next_due_at.is_some() {
            None
        } else {
            self.compute_fresh(dispatch, now)?
        };
        self.store.set_next_due_at(&dispatch.id, next, now)?;
        info!(
            dispatch_id = %dispatch.id,
            active = next.is_some(),
            "dispatch activation toggled"
        );
        Ok(next)
    }

    /// Commit a finished send cycle: `last_sent_at = now`, the cumulative
    /// counter grows by `recipients_sent`, and `next_due_at` is recomputed
    /// with `now` as the last occurrence. One store write for all three.
    pub fn on_successful_send(
        &self,
        dispatch: &Dispatch,
        rule: Option<&Recurrence>,
        recipients_sent: u64,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>> {
        let next = match rule {
            Some(rule) => Some(next_due(rule, now, Some(now))?),
            None => None,
        };
        self.store
            .record_send_cycle(&dispatch.id, now, next, recipients_sent)?;
        Ok(next)
    }

    /// `next_due_at` for a dispatch treated as freshly scheduled. `None`
    /// when no rule is attached or the referenced rule has been deleted.
    fn compute_fresh(
        &self,
        dispatch: &Dispatch,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>> {
        let Some(ref recurrence_id) = dispatch.recurrence_id else {
            return Ok(None);
        };
        match self.store.get_recurrence(recurrence_id)? {
            Some(record) => Ok(Some(next_due(&record.rule, now, None)?)),
            None => Ok(None),
        }
    }
}
