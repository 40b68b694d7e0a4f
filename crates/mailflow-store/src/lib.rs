//! `mailflow-store` — SQLite persistence for dispatches and their collaborators.
//!
//! One `dispatches` table plus the referenced `recipients`, `send_lists`,
//! `footers`, and `recurrences` tables. All timestamps are RFC 3339 UTC text;
//! deleting a referenced recurrence or send list nulls the reference
//! (`ON DELETE SET NULL`) so the absence surfaces as `None`, never an error.

pub mod db;
pub mod error;
pub mod store;
pub mod types;

pub use error::{Result, StoreError};
pub use store::Store;
pub use types::{
    Dispatch, Footer, NewDispatch, Recipient, RecurrenceRecord, SendList, UpdateDispatch,
};
