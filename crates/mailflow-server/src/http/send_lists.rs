use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use mailflow_store::SendList;

use crate::app::AppState;

use super::{store_error, ApiResult};

#[derive(Debug, Deserialize)]
pub struct NewSendList {
    pub title: String,
}

/// GET /send-lists
pub async fn list(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<SendList>>> {
    let lists = state.store.list_send_lists().map_err(store_error)?;
    Ok(Json(lists))
}

/// POST /send-lists
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewSendList>,
) -> ApiResult<(StatusCode, Json<SendList>)> {
    let list = state.store.create_send_list(&new.title).map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(list)))
}

/// DELETE /send-lists/{id} — dispatches referencing the list fall back to
/// "no list configured" via the FK.
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.store.delete_send_list(&id).map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /send-lists/{id}/members/{recipient_id} — idempotent add.
pub async fn add_member(
    State(state): State<Arc<AppState>>,
    Path((id, recipient_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state
        .store
        .add_list_member(&id, &recipient_id)
        .map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /send-lists/{id}/members/{recipient_id}
pub async fn remove_member(
    State(state): State<Arc<AppState>>,
    Path((id, recipient_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state
        .store
        .remove_list_member(&id, &recipient_id)
        .map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}
