use thiserror::Error;

/// Errors that can occur within the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying SQLite / rusqlite error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// No row with the given ID exists.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A persisted value failed to parse (corrupt timestamp or frequency).
    #[error("Invalid stored value: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
