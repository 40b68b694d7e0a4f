use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use mailflow_core::config::MailflowConfig;
use mailflow_runner::DispatchRunner;
use mailflow_store::Store;

use crate::http;

/// Central shared state — passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub config: MailflowConfig,
    pub store: Store,
    pub runner: Arc<DispatchRunner>,
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(http::health::health_handler))
        .route(
            "/dispatches",
            get(http::dispatches::list).post(http::dispatches::create),
        )
        .route(
            "/dispatches/{id}",
            get(http::dispatches::get_one)
                .put(http::dispatches::update)
                .delete(http::dispatches::remove),
        )
        .route("/dispatches/{id}/actions", post(http::dispatches::actions))
        .route("/dispatches/{id}/stats", get(http::dispatches::stats))
        .route(
            "/recipients",
            get(http::recipients::list).post(http::recipients::create),
        )
        .route(
            "/recipients/{id}",
            put(http::recipients::set_active).delete(http::recipients::remove),
        )
        .route(
            "/send-lists",
            get(http::send_lists::list).post(http::send_lists::create),
        )
        .route(
            "/send-lists/{id}",
            delete(http::send_lists::remove),
        )
        .route(
            "/send-lists/{id}/members/{recipient_id}",
            put(http::send_lists::add_member)
                .delete(http::send_lists::remove_member),
        )
        .route(
            "/footers",
            get(http::footers::list).post(http::footers::create),
        )
        .route(
            "/recurrences",
            get(http::recurrences::list).post(http::recurrences::create),
        )
        .route(
            "/recurrences/{id}",
            delete(http::recurrences::remove),
        )
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
