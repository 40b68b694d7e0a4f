use thiserror::Error;

/// Errors that can occur in recurrence parsing or next-due computation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecurrenceError {
    /// The frequency string is not one of `daily`, `weekly`, `monthly`.
    /// Raised at rule construction time — never deferred or defaulted.
    #[error("Unknown recurrence frequency: {0}")]
    InvalidFrequency(String),

    /// The computed date fell outside chrono's representable range.
    #[error("Next-due computation out of range: {0}")]
    OutOfRange(String),
}

pub type Result<T> = std::result::Result<T, RecurrenceError>;
