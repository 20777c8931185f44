// src/handlers/activity.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermSystemHealth, RequirePermission},
    },
    models::activity::{ActivityLog, NewActivity},
};

const ACTIVITY_FEED_LIMIT: i64 = 50;

// POST /api/admin/activity
#[utoipa::path(
    post,
    path = "/api/admin/activity",
    tag = "Activity",
    request_body = NewActivity,
    responses(
        (status = 204, description = "Recorded"),
        (status = 400, description = "Invalid data")
    ),
    security(("api_jwt" = []))
)]
pub async fn record_activity(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(admin): AuthenticatedUser,
    Json(payload): Json<NewActivity>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .activity_repo
        .record(&app_state.db_pool, &admin.email, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/admin/activity
#[utoipa::path(
    get,
    path = "/api/admin/activity",
    tag = "Activity",
    responses((status = 200, description = "Latest admin activity", body = Vec<ActivityLog>)),
    security(("api_jwt" = []))
)]
pub async fn list_activity(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermSystemHealth>,
) -> Result<impl IntoResponse, ApiError> {
    let logs = app_state
        .activity_repo
        .recent(ACTIVITY_FEED_LIMIT)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(logs))
}
