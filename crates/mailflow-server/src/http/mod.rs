//! HTTP handlers, one module per resource.
//!
//! Error payloads carry a stable `code` string alongside the human-readable
//! message; domain errors from the lower crates are translated into
//! [`MailflowError`] here so the codes stay uniform across endpoints.

pub mod dispatches;
pub mod footers;
pub mod health;
pub mod recipients;
pub mod recurrences;
pub mod send_lists;

use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

use mailflow_core::MailflowError;
use mailflow_recurrence::RecurrenceError;
use mailflow_runner::RunnerError;
use mailflow_store::StoreError;

pub type ApiError = (StatusCode, Json<Value>);
pub type ApiResult<T> = Result<T, ApiError>;

pub fn api_error(status: StatusCode, e: MailflowError) -> ApiError {
    (
        status,
        Json(json!({ "error": e.to_string(), "code": e.code() })),
    )
}

pub fn store_error(e: StoreError) -> ApiError {
    match e {
        StoreError::NotFound { entity, id } => api_error(
            StatusCode::NOT_FOUND,
            MailflowError::NotFound {
                entity: entity.to_string(),
                id,
            },
        ),
        StoreError::InvalidData(msg) => api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            MailflowError::Internal(msg),
        ),
        e @ StoreError::Database(_) => api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            MailflowError::Database(e.to_string()),
        ),
    }
}

pub fn runner_error(e: RunnerError) -> ApiError {
    match e {
        RunnerError::Store(inner) => store_error(inner),
        RunnerError::Recurrence(RecurrenceError::InvalidFrequency(f)) => api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            MailflowError::InvalidFrequency(f),
        ),
        RunnerError::Recurrence(inner) => api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            MailflowError::Internal(inner.to_string()),
        ),
        RunnerError::Mailer(inner) => api_error(
            StatusCode::BAD_GATEWAY,
            MailflowError::Transport(inner.to_string()),
        ),
        e @ RunnerError::AllRecipientsFailed { .. } => api_error(
            StatusCode::BAD_GATEWAY,
            MailflowError::Transport(e.to_string()),
        ),
    }
}
