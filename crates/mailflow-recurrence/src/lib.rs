//! `mailflow-recurrence` — pure scheduling math for recurring dispatches.
//!
//! # Overview
//!
//! Given a recurrence rule (frequency + wall-clock time of day) and an
//! optional last-occurrence instant, [`schedule::next_due`] computes the next
//! UTC instant a dispatch should fire. [`due::DuePolicy`] then decides whether
//! a precomputed instant has been crossed. Both are deterministic functions of
//! their arguments — "now" is always injected, never read from the system
//! clock — and perform no I/O.
//!
//! # Frequency variants
//!
//! | Variant   | Behaviour                                               |
//! |-----------|---------------------------------------------------------|
//! | `Daily`   | Fire at HH:MM:SS UTC every day                          |
//! | `Weekly`  | Fire at HH:MM:SS UTC every 7 days                       |
//! | `Monthly` | Same day-of-month next month, clamped to month length   |

pub mod due;
pub mod error;
pub mod schedule;
pub mod types;

pub use due::{DuePolicy, DueTolerance};
pub use error::{RecurrenceError, Result};
pub use schedule::next_due;
pub use types::{Frequency, Recurrence};
