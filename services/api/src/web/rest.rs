//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::state::{AppState, UserId};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use study_core::domain::{
    AdaptiveParams, Collectible, Difficulty, ProgressAnalytics, ProgressState, RewardState,
    SessionResult,
};
use study_core::ports::PortError;
use tracing::error;
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        get_rewards_handler,
        record_study_handler,
        get_progress_handler,
        record_session_handler,
        session_history_handler,
        adaptive_params_handler,
    ),
    components(
        schemas(
            HealthResponse,
            RewardsResponse,
            RecordStudyRequest,
            RecordStudyResponse,
            ProgressResponse,
            RecordSessionRequest,
            RecordSessionResponse,
            SessionHistoryResponse,
            AdaptiveParamsRequest,
        )
    ),
    tags(
        (name = "Study Tracker API", description = "Study-time rewards and quiz progress tracking.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// The user's reward record.
#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RewardsResponse {
    pub success: bool,
    #[schema(value_type = Object)]
    pub data: RewardState,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordStudyRequest {
    /// Minutes studied since the last report. Must be positive.
    pub study_minutes: i64,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordStudyResponse {
    pub success: bool,
    #[schema(value_type = Object)]
    pub data: RewardState,
    #[schema(value_type = Vec<Object>)]
    pub new_guppies: Vec<Collectible>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    #[schema(value_type = Object)]
    pub user_progress: ProgressState,
    #[schema(value_type = Object)]
    pub analytics: ProgressAnalytics,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordSessionRequest {
    #[schema(value_type = Object)]
    pub session_result: SessionResult,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordSessionResponse {
    pub success: bool,
    #[schema(value_type = Object)]
    pub updated_progress: ProgressState,
    pub new_achievements: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionHistoryResponse {
    #[schema(value_type = Vec<Object>)]
    pub sessions: Vec<SessionResult>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdaptiveParamsRequest {
    /// One of `easy`, `medium`, `hard`.
    #[schema(value_type = String)]
    pub difficulty: Difficulty,
    pub count: u32,
}

type HandlerError = (StatusCode, String);

/// Invalid input becomes a 400 with the reason; anything else is logged and
/// reported as a generic failure.
fn port_failure(action: &str, e: PortError) -> HandlerError {
    match e {
        PortError::Invalid(reason) => (StatusCode::BAD_REQUEST, reason),
        other => {
            error!("Failed to {}: {:?}", action, other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to {}. Please try again.", action),
            )
        }
    }
}

/// Malformed or mistyped bodies are validation failures like any other.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, HandlerError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| (StatusCode::BAD_REQUEST, rejection.body_text()))
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Fetch the user's reward record, creating an empty one on first access.
#[utoipa::path(
    get,
    path = "/guppies",
    responses(
        (status = 200, description = "Current reward record", body = RewardsResponse),
        (status = 400, description = "Malformed user id"),
        (status = 500, description = "Storage failure")
    ),
    params(("x-user-id" = Option<String>, Header, description = "User id; defaults to the configured user."))
)]
pub async fn get_rewards_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(UserId(user_id)): Extension<UserId>,
) -> Result<Json<RewardsResponse>, HandlerError> {
    let data = app_state
        .tracker
        .load_or_init_rewards(&user_id)
        .await
        .map_err(|e| port_failure("get guppy data", e))?;

    Ok(Json(RewardsResponse {
        success: true,
        data,
        timestamp: Utc::now(),
    }))
}

/// Report study minutes and receive any newly earned collectibles.
#[utoipa::path(
    post,
    path = "/guppies",
    request_body = RecordStudyRequest,
    responses(
        (status = 200, description = "Minutes applied", body = RecordStudyResponse),
        (status = 400, description = "studyMinutes is not a positive number"),
        (status = 500, description = "Storage failure")
    ),
    params(("x-user-id" = Option<String>, Header, description = "User id; defaults to the configured user."))
)]
pub async fn record_study_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(UserId(user_id)): Extension<UserId>,
    payload: Result<Json<RecordStudyRequest>, JsonRejection>,
) -> Result<Json<RecordStudyResponse>, HandlerError> {
    let payload = body(payload)?;
    let minutes = u32::try_from(payload.study_minutes)
        .ok()
        .filter(|m| *m > 0)
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                "studyMinutes must be a positive number".to_string(),
            )
        })?;

    let outcome = app_state
        .tracker
        .apply_study_minutes(&user_id, minutes)
        .await
        .map_err(|e| port_failure("update guppy data", e))?;

    Ok(Json(RecordStudyResponse {
        success: true,
        data: outcome.state,
        new_guppies: outcome.new_collectibles,
        timestamp: Utc::now(),
    }))
}

/// Fetch the user's progress record together with derived analytics.
#[utoipa::path(
    get,
    path = "/progress",
    responses(
        (status = 200, description = "Progress and analytics", body = ProgressResponse),
        (status = 500, description = "Storage failure")
    ),
    params(("x-user-id" = Option<String>, Header, description = "User id; defaults to the configured user."))
)]
pub async fn get_progress_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(UserId(user_id)): Extension<UserId>,
) -> Result<Json<ProgressResponse>, HandlerError> {
    let overview = app_state
        .tracker
        .progress_overview(&user_id)
        .await
        .map_err(|e| port_failure("get progress", e))?;

    Ok(Json(ProgressResponse {
        user_progress: overview.progress,
        analytics: overview.analytics,
        timestamp: Utc::now(),
    }))
}

/// Fold a completed quiz or flashcard session into the user's progress.
#[utoipa::path(
    post,
    path = "/progress",
    request_body = RecordSessionRequest,
    responses(
        (status = 200, description = "Progress updated", body = RecordSessionResponse),
        (status = 400, description = "Malformed session result"),
        (status = 500, description = "Storage failure")
    ),
    params(("x-user-id" = Option<String>, Header, description = "User id; defaults to the configured user."))
)]
pub async fn record_session_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(UserId(user_id)): Extension<UserId>,
    payload: Result<Json<RecordSessionRequest>, JsonRejection>,
) -> Result<Json<RecordSessionResponse>, HandlerError> {
    let payload = body(payload)?;
    let update = app_state
        .tracker
        .record_session(&user_id, &payload.session_result)
        .await
        .map_err(|e| port_failure("update progress", e))?;

    Ok(Json(RecordSessionResponse {
        success: true,
        updated_progress: update.progress,
        new_achievements: update.new_achievements,
        timestamp: Utc::now(),
    }))
}

/// The most recent sessions, oldest first.
#[utoipa::path(
    get,
    path = "/progress/history",
    responses(
        (status = 200, description = "Session history", body = SessionHistoryResponse),
        (status = 500, description = "Storage failure")
    ),
    params(("x-user-id" = Option<String>, Header, description = "User id; defaults to the configured user."))
)]
pub async fn session_history_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(UserId(user_id)): Extension<UserId>,
) -> Result<Json<SessionHistoryResponse>, HandlerError> {
    let sessions = app_state
        .tracker
        .session_history(&user_id)
        .await
        .map_err(|e| port_failure("get session history", e))?;

    Ok(Json(SessionHistoryResponse {
        sessions,
        timestamp: Utc::now(),
    }))
}

/// Recommend focus chapters and a difficulty mix for the next quiz.
#[utoipa::path(
    post,
    path = "/quiz/adaptive-params",
    request_body = AdaptiveParamsRequest,
    responses(
        (status = 200, description = "Adaptive quiz parameters"),
        (status = 400, description = "Malformed body or count below 1"),
        (status = 500, description = "Storage failure")
    ),
    params(("x-user-id" = Option<String>, Header, description = "User id; defaults to the configured user."))
)]
pub async fn adaptive_params_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(UserId(user_id)): Extension<UserId>,
    payload: Result<Json<AdaptiveParamsRequest>, JsonRejection>,
) -> Result<Json<AdaptiveParams>, HandlerError> {
    let payload = body(payload)?;
    let params = app_state
        .tracker
        .adaptive_params(&user_id, payload.difficulty, payload.count)
        .await
        .map_err(|e| port_failure("compute adaptive parameters", e))?;

    Ok(Json(params))
}
