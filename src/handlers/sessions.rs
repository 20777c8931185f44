// src/handlers/sessions.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermSettings, RequirePermission},
    },
    models::session::SessionView,
};

// GET /api/admin/sessions
#[utoipa::path(
    get,
    path = "/api/admin/sessions",
    tag = "Sessions",
    responses((status = 200, description = "Latest active sessions", body = Vec<SessionView>)),
    security(("api_jwt" = []))
)]
pub async fn list_sessions(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermSettings>,
    AuthenticatedUser(admin): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let sessions = app_state
        .session_service
        .list(&admin)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(sessions))
}

// POST /api/admin/sessions/{id}/revoke
#[utoipa::path(
    post,
    path = "/api/admin/sessions/{id}/revoke",
    tag = "Sessions",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 204, description = "Session revoked"),
        (status = 400, description = "The caller's own session (use logout)"),
        (status = 404, description = "Unknown or already revoked session")
    ),
    security(("api_jwt" = []))
)]
pub async fn revoke_session(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermSettings>,
    AuthenticatedUser(admin): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .session_service
        .revoke(&admin, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
