//! `mailflow-mailer` — the mail transport boundary.
//!
//! The runner talks to a [`Mailer`]; which backend sits behind it is a config
//! choice: [`SmtpMailer`] for real delivery, [`FileMailer`] to drop `.eml`
//! files into a directory during development, [`MemoryMailer`] for tests.
//! The transport is a black box that either delivers a message or fails —
//! retry policy lives with the operator, not here.

pub mod error;
pub mod file;
pub mod memory;
pub mod message;
pub mod smtp;

pub use error::MailerError;
pub use file::FileMailer;
pub use memory::MemoryMailer;
pub use message::{compose_body, EmailMessage};
pub use smtp::SmtpMailer;

/// Blocking, per-message mail delivery. One call per recipient.
pub trait Mailer: Send + Sync {
    /// Stable lowercase identifier for logs (e.g. `"smtp"`, `"file"`).
    fn name(&self) -> &str;

    /// Deliver a single message or fail.
    fn send(&self, message: &EmailMessage) -> Result<(), MailerError>;
}
