//! `mailflow-runner` — orchestration of due-date state and send cycles.
//!
//! [`scheduler::DispatchScheduler`] owns every mutation of `next_due_at`:
//! recomputation on creation or rule change, the activation toggle, and the
//! atomic commit of a finished send cycle. [`runner::DispatchRunner`] is what
//! the periodic invoker calls — it scans all dispatches, selects the due
//! ones, sends to each recipient, and isolates per-dispatch failures so one
//! broken dispatch never stalls the batch.

pub mod error;
pub mod runner;
pub mod scheduler;

pub use error::{Result, RunnerError};
pub use runner::{DispatchRunner, FailedDispatch, RunSummary, SentDispatch};
pub use scheduler::{DispatchEvent, DispatchScheduler};
