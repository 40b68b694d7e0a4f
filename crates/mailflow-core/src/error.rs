use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailflowError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown recurrence frequency: {0}")]
    InvalidFrequency(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Mail transport error: {0}")]
    Transport(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MailflowError {
    /// Short error code string included in HTTP error payloads.
    pub fn code(&self) -> &'static str {
        match self {
            MailflowError::Config(_) => "CONFIG_ERROR",
            MailflowError::InvalidFrequency(_) => "INVALID_FREQUENCY",
            MailflowError::NotFound { .. } => "NOT_FOUND",
            MailflowError::Database(_) => "DATABASE_ERROR",
            MailflowError::Transport(_) => "TRANSPORT_ERROR",
            MailflowError::Serialization(_) => "SERIALIZATION_ERROR",
            MailflowError::Io(_) => "IO_ERROR",
            MailflowError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, MailflowError>;
