pub(crate) mod api_error;
pub(crate) mod handlers;
pub(crate) mod state;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use handlers::{readiness_handler, validate_handler};
use state::ApiServerState;

pub(crate) fn router(state: Arc<ApiServerState>) -> Router {
    Router::new()
        .route("/validate", post(validate_handler))
        .route("/healthz", get(readiness_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
