use thiserror::Error;

/// Errors that can occur within any mail transport backend.
#[derive(Debug, Error)]
pub enum MailerError {
    /// The transport could not be constructed from configuration.
    #[error("Transport configuration error: {0}")]
    Config(String),

    /// A recipient or sender address failed to parse.
    #[error("Invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    /// The message could not be assembled.
    #[error("Message build error: {0}")]
    Build(String),

    /// Delivery to the remote endpoint failed.
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// File backend I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
