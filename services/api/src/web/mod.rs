pub mod middleware;
pub mod rest;
pub mod state;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use middleware::resolve_user;
pub use rest::{
    adaptive_params_handler, get_progress_handler, get_rewards_handler, health_handler,
    record_session_handler, record_study_handler, session_history_handler,
};
pub use state::{AppState, UserId};

/// Builds the API routes. CORS and the Swagger UI are layered on by the binary.
pub fn api_router(app_state: Arc<AppState>) -> Router {
    // Routes acting on a user's records.
    let user_routes = Router::new()
        .route("/guppies", get(get_rewards_handler).post(record_study_handler))
        .route("/progress", get(get_progress_handler).post(record_session_handler))
        .route("/progress/history", get(session_history_handler))
        .route("/quiz/adaptive-params", post(adaptive_params_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            resolve_user,
        ));

    Router::new()
        .route("/health", get(health_handler))
        .merge(user_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
