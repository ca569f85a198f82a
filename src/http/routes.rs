use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Session control
        .route("/sessions", post(handlers::start_session))
        .route("/sessions/:session_id", get(handlers::get_session))
        .route(
            "/sessions/:session_id/cancel",
            post(handlers::cancel_session),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
