use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use mailflow_store::Recipient;

use crate::app::AppState;

use super::{store_error, ApiResult};

#[derive(Debug, Deserialize)]
pub struct NewRecipient {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecipientUpdate {
    pub active: bool,
}

/// GET /recipients
pub async fn list(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Recipient>>> {
    let recipients = state.store.list_recipients().map_err(store_error)?;
    Ok(Json(recipients))
}

/// POST /recipients
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewRecipient>,
) -> ApiResult<(StatusCode, Json<Recipient>)> {
    let recipient = state
        .store
        .create_recipient(&new.email, new.name.as_deref(), Utc::now())
        .map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(recipient)))
}

/// PUT /recipients/{id} — flip the active flag. Inactive recipients stay on
/// their lists but receive no mail.
pub async fn set_active(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<RecipientUpdate>,
) -> ApiResult<StatusCode> {
    state
        .store
        .set_recipient_active(&id, update.active, Utc::now())
        .map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /recipients/{id}
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.store.delete_recipient(&id).map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}
