//! Dispatch CRUD, admin actions, and the stats endpoint.
//!
//! The write path is where scheduling events originate: `POST /dispatches`
//! emits `Created`, and `PUT /dispatches/{id}` emits `RuleChanged` exactly
//! when the persisted recurrence reference differs from the incoming one.
//! Editing the subject or body never perturbs `next_due_at`.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use mailflow_core::MailflowError;
use mailflow_runner::DispatchEvent;
use mailflow_store::{Dispatch, NewDispatch, UpdateDispatch};

use crate::app::AppState;

use super::{api_error, runner_error, store_error, ApiResult};

/// GET /dispatches
pub async fn list(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Dispatch>>> {
    let dispatches = state.store.list_dispatches().map_err(store_error)?;
    Ok(Json(dispatches))
}

/// POST /dispatches
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewDispatch>,
) -> ApiResult<(StatusCode, Json<Dispatch>)> {
    let now = Utc::now();
    let dispatch = state
        .store
        .create_dispatch(&new, now)
        .map_err(store_error)?;
    state
        .runner
        .scheduler()
        .handle(DispatchEvent::Created, &dispatch, now)
        .map_err(runner_error)?;
    // reload to pick up the derived next_due_at
    let dispatch = state.store.get_dispatch(&dispatch.id).map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(dispatch)))
}

/// GET /dispatches/{id}
pub async fn get_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Dispatch>> {
    let dispatch = state.store.get_dispatch(&id).map_err(store_error)?;
    Ok(Json(dispatch))
}

/// PUT /dispatches/{id} — partial field update.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<UpdateDispatch>,
) -> ApiResult<Json<Dispatch>> {
    let now = Utc::now();
    let before = state.store.get_dispatch(&id).map_err(store_error)?;
    let updated = state
        .store
        .update_dispatch(&id, &update, now)
        .map_err(store_error)?;

    if updated.recurrence_id != before.recurrence_id {
        state
            .runner
            .scheduler()
            .handle(DispatchEvent::RuleChanged, &updated, now)
            .map_err(runner_error)?;
        let reloaded = state.store.get_dispatch(&id).map_err(store_error)?;
        return Ok(Json(reloaded));
    }
    Ok(Json(updated))
}

/// DELETE /dispatches/{id}
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.store.delete_dispatch(&id).map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DispatchAction {
    SendNow,
    ToggleActivation,
}

/// POST /dispatches/{id}/actions
pub async fn actions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(action): Json<DispatchAction>,
) -> ApiResult<Json<Value>> {
    let now = Utc::now();
    match action {
        DispatchAction::SendNow => {
            // SMTP is blocking, keep it off the async workers
            let runner = Arc::clone(&state.runner);
            let dispatch_id = id.clone();
            let outcome =
                tokio::task::spawn_blocking(move || runner.send_now(&dispatch_id, now))
                    .await
                    .map_err(|e| {
                        api_error(
                            StatusCode::INTERNAL_SERVER_ERROR,
                            MailflowError::Internal(e.to_string()),
                        )
                    })?
                    .map_err(runner_error)?;
            match outcome {
                Some(sent) => Ok(Json(json!({
                    "status": "sent",
                    "recipients_sent": sent.recipients_sent,
                    "recipients_failed": sent.recipients_failed,
                }))),
                None => Ok(Json(json!({
                    "status": "skipped",
                    "reason": "no send list configured",
                }))),
            }
        }
        DispatchAction::ToggleActivation => {
            let dispatch = state.store.get_dispatch(&id).map_err(store_error)?;
            let next = state
                .runner
                .scheduler()
                .toggle_activation(&dispatch, now)
                .map_err(runner_error)?;
            Ok(Json(json!({
                "status": "ok",
                "active": next.is_some(),
                "next_due_at": next,
            })))
        }
    }
}

/// GET /dispatches/{id}/stats — live numbers, not a snapshot:
/// `recipients_count` is null when no send list is configured.
pub async fn stats(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let dispatch = state.store.get_dispatch(&id).map_err(store_error)?;
    let recipients_count = state
        .store
        .recipient_count(&dispatch)
        .map_err(store_error)?;
    Ok(Json(json!({
        "recipients_count": recipients_count,
        "total_sent": dispatch.total_recipients_sent,
    })))
}
