use thiserror::Error;

/// Errors surfaced by the scheduler and runner.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Store(#[from] mailflow_store::StoreError),

    #[error(transparent)]
    Recurrence(#[from] mailflow_recurrence::RecurrenceError),

    #[error(transparent)]
    Mailer(#[from] mailflow_mailer::MailerError),

    /// Every recipient in a non-empty list failed — the cycle is not
    /// recorded so the dispatch stays due and retries on the next tick.
    #[error("All {failed} recipient deliveries failed")]
    AllRecipientsFailed { failed: u64 },
}

pub type Result<T> = std::result::Result<T, RunnerError>;
