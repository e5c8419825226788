//! services/api/src/web/middleware.rs
//!
//! Resolves which user a request belongs to.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::warn;

use crate::web::state::{AppState, UserId};

pub const USER_ID_HEADER: &str = "x-user-id";

// User ids end up inside storage keys.
static USER_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("user id pattern is valid"));

pub fn is_valid_user_id(user_id: &str) -> bool {
    USER_ID_PATTERN.is_match(user_id)
}

/// Middleware that reads the `x-user-id` header, falling back to the configured
/// default user, and inserts a `UserId` into request extensions.
///
/// Malformed ids are rejected with 400 before reaching a handler.
pub async fn resolve_user(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, (StatusCode, String)> {
    let user_id = match req.headers().get(USER_ID_HEADER) {
        Some(value) => value
            .to_str()
            .map(|v| v.trim().to_string())
            .map_err(|_| {
                (
                    StatusCode::BAD_REQUEST,
                    "x-user-id header must be visible ASCII".to_string(),
                )
            })?,
        None => state.config.default_user_id.clone(),
    };

    if !is_valid_user_id(&user_id) {
        warn!("Rejected malformed user id {:?}", user_id);
        return Err((
            StatusCode::BAD_REQUEST,
            "Invalid x-user-id format".to_string(),
        ));
    }

    req.extensions_mut().insert(UserId(user_id));
    Ok(next.run(req).await)
}
