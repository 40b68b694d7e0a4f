pub mod config;
pub mod error;

pub use config::MailflowConfig;
pub use error::{MailflowError, Result};
