//! Recurrence rules are immutable: create, list, delete. Frequency is parsed
//! strictly at this boundary — an unknown value is a 422, never a silent
//! fallback.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveTime;
use serde::Deserialize;

use mailflow_core::MailflowError;
use mailflow_recurrence::{Frequency, Recurrence};
use mailflow_store::RecurrenceRecord;

use crate::app::AppState;

use super::{api_error, store_error, ApiResult};

#[derive(Debug, Deserialize)]
pub struct NewRecurrence {
    pub frequency: String,
    /// Wall-clock UTC time, `HH:MM:SS`.
    pub time_of_day: String,
}

/// GET /recurrences
pub async fn list(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<RecurrenceRecord>>> {
    let rules = state.store.list_recurrences().map_err(store_error)?;
    Ok(Json(rules))
}

/// POST /recurrences
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewRecurrence>,
) -> ApiResult<(StatusCode, Json<RecurrenceRecord>)> {
    let frequency: Frequency = new.frequency.parse().map_err(|_| {
        api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            MailflowError::InvalidFrequency(new.frequency.clone()),
        )
    })?;
    let time_of_day = NaiveTime::parse_from_str(&new.time_of_day, "%H:%M:%S").map_err(|e| {
        api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            MailflowError::Config(format!("time_of_day {:?}: {e}", new.time_of_day)),
        )
    })?;

    let record = state
        .store
        .create_recurrence(Recurrence::new(frequency, time_of_day))
        .map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// DELETE /recurrences/{id} — dispatches referencing the rule keep running
/// without a schedule (`next_due_at` drops to null on their next recompute).
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.store.delete_recurrence(&id).map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}
