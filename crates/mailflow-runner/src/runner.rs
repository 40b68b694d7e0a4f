use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use mailflow_mailer::{compose_body, EmailMessage, Mailer};
use mailflow_recurrence::DuePolicy;
use mailflow_store::{Dispatch, Store};

use crate::error::{Result, RunnerError};
use crate::scheduler::DispatchScheduler;

/// Outcome of one completed send cycle.
#[derive(Debug, Clone, Serialize)]
pub struct SentDispatch {
    pub dispatch_id: String,
    pub title: String,
    pub recipients_sent: u64,
    pub recipients_failed: u64,
}

/// A dispatch whose cycle failed as a whole.
#[derive(Debug, Clone, Serialize)]
pub struct FailedDispatch {
    pub dispatch_id: String,
    pub title: String,
    pub error: String,
}

/// Log-style summary of one runner invocation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub sent: Vec<SentDispatch>,
    pub failed: Vec<FailedDispatch>,
    /// Due dispatches skipped silently because no send list is configured.
    pub skipped: usize,
}

/// Sends all currently-due dispatches once per invocation.
///
/// The periodic invoker polls this on a fixed cadence; the poll interval is
/// what bounds how late a dispatch may fire. Runs are serialised with a
/// `try_lock` guard: if the previous run is still in progress the tick is
/// skipped rather than risking a double send.
pub struct DispatchRunner {
    store: Store,
    scheduler: DispatchScheduler,
    mailer: Arc<dyn Mailer>,
    policy: DuePolicy,
    run_guard: Mutex<()>,
}

impl DispatchRunner {
    pub fn new(store: Store, mailer: Arc<dyn Mailer>, policy: DuePolicy) -> Self {
        let scheduler = DispatchScheduler::new(store.clone());
        Self {
            store,
            scheduler,
            mailer,
            policy,
            run_guard: Mutex::new(()),
        }
    }

    pub fn scheduler(&self) -> &DispatchScheduler {
        &self.scheduler
    }

    /// Run every due dispatch. Failures are isolated per dispatch: each is
    /// recorded in the summary and never aborts the rest of the batch.
    pub fn run_due(&self, now: DateTime<Utc>) -> Result<RunSummary> {
        let Ok(_guard) = self.run_guard.try_lock() else {
            warn!("previous run still in progress, skipping this tick");
            return Ok(RunSummary::default());
        };

        let mut summary = RunSummary::default();
        let dispatches = self.store.list_dispatches()?;
        let due: Vec<&Dispatch> = dispatches
            .iter()
            .filter(|d| self.policy.is_due(d.next_due_at, now))
            .collect();

        if due.is_empty() {
            debug!("no dispatches are due");
            return Ok(summary);
        }

        for dispatch in due {
            match self.send_cycle(dispatch, now) {
                Ok(Some(outcome)) => {
                    info!(
                        dispatch_id = %outcome.dispatch_id,
                        title = %outcome.title,
                        sent = outcome.recipients_sent,
                        failed = outcome.recipients_failed,
                        "dispatch sent"
                    );
                    summary.sent.push(outcome);
                }
                Ok(None) => {
                    debug!(
                        dispatch_id = %dispatch.id,
                        title = %dispatch.title,
                        "no send list configured, skipping"
                    );
                    summary.skipped += 1;
                }
                Err(e) => {
                    error!(
                        dispatch_id = %dispatch.id,
                        title = %dispatch.title,
                        error = %e,
                        "dispatch failed"
                    );
                    summary.failed.push(FailedDispatch {
                        dispatch_id: dispatch.id.clone(),
                        title: dispatch.title.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            sent = summary.sent.len(),
            failed = summary.failed.len(),
            skipped = summary.skipped,
            "run complete"
        );
        Ok(summary)
    }

    /// Manual trigger: send one dispatch immediately, bypassing the due
    /// check. Shares the cycle path with `run_due`, including the skip for
    /// a missing send list.
    pub fn send_now(&self, dispatch_id: &str, now: DateTime<Utc>) -> Result<Option<SentDispatch>> {
        let dispatch = self.store.get_dispatch(dispatch_id)?;
        self.send_cycle(&dispatch, now)
    }

    /// One full cycle for one dispatch.
    ///
    /// `Ok(None)` means "no send list configured" — skipped silently with no
    /// state change. Recipient-level delivery failures are tallied and do
    /// not stop delivery to the rest of the list; only a cycle where every
    /// recipient of a non-empty list fails is treated as a dispatch-level
    /// failure (nothing recorded, so the dispatch stays due and retries).
    fn send_cycle(&self, dispatch: &Dispatch, now: DateTime<Utc>) -> Result<Option<SentDispatch>> {
        let Some(ref list_id) = dispatch.send_list_id else {
            return Ok(None);
        };

        // Resolve the rule before touching the transport: a corrupt
        // frequency must abort this dispatch without sending anything.
        let rule = match dispatch.recurrence_id {
            Some(ref recurrence_id) => self
                .store
                .get_recurrence(recurrence_id)?
                .map(|record| record.rule),
            None => None,
        };

        let recipients = self.store.active_recipients(list_id)?;
        let footer_text = match dispatch.footer_id {
            Some(ref footer_id) => self.store.get_footer(footer_id)?.and_then(|f| f.text),
            None => None,
        };
        let body = compose_body(&dispatch.body, footer_text.as_deref());

        let mut sent = 0u64;
        let mut failed = 0u64;
        for recipient in &recipients {
            let message = EmailMessage {
                to: recipient.email.clone(),
                subject: dispatch.subject.clone(),
                body: body.clone(),
            };
            match self.mailer.send(&message) {
                Ok(()) => sent += 1,
                Err(e) => {
                    failed += 1;
                    warn!(
                        dispatch_id = %dispatch.id,
                        recipient = %recipient.email,
                        error = %e,
                        "recipient delivery failed"
                    );
                }
            }
        }

        if !recipients.is_empty() && sent == 0 {
            return Err(RunnerError::AllRecipientsFailed { failed });
        }

        self.scheduler
            .on_successful_send(dispatch, rule.as_ref(), sent, now)?;

        Ok(Some(SentDispatch {
            dispatch_id: dispatch.id.clone(),
            title: dispatch.title.clone(),
            recipients_sent: sent,
            recipients_failed: failed,
        }))
    }
}
