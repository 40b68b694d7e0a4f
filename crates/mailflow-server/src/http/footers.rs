use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use mailflow_store::Footer;

use crate::app::AppState;

use super::{store_error, ApiResult};

#[derive(Debug, Deserialize)]
pub struct NewFooter {
    pub title: String,
    #[serde(default)]
    pub text: Option<String>,
}

/// GET /footers
pub async fn list(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Footer>>> {
    let footers = state.store.list_footers().map_err(store_error)?;
    Ok(Json(footers))
}

/// POST /footers
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewFooter>,
) -> ApiResult<(StatusCode, Json<Footer>)> {
    let footer = state
        .store
        .create_footer(&new.title, new.text.as_deref())
        .map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(footer)))
}
