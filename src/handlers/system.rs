// src/handlers/system.rs

use axum::{extract::State, response::IntoResponse, Json};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermSystemHealth, RequirePermission},
    },
    models::{
        dashboard::SystemHealthReport,
        security::{SecuritySettings, UpdateSecuritySettingsPayload},
    },
};

// GET /api/admin/system/health
#[utoipa::path(
    get,
    path = "/api/admin/system/health",
    tag = "System",
    responses((status = 200, description = "Database status, latency grade, visits, counts and recent logs", body = SystemHealthReport)),
    security(("api_jwt" = []))
)]
pub async fn get_health(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermSystemHealth>,
) -> Result<impl IntoResponse, ApiError> {
    let report = app_state
        .dashboard_service
        .system_health()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(report))
}

// GET /api/admin/system/security
#[utoipa::path(
    get,
    path = "/api/admin/system/security",
    tag = "System",
    responses((status = 200, description = "Security settings (created with defaults on first read)", body = SecuritySettings)),
    security(("api_jwt" = []))
)]
pub async fn get_security(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermSystemHealth>,
) -> Result<impl IntoResponse, ApiError> {
    let settings = app_state
        .security_repo
        .get_or_init_settings()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(settings))
}

// PUT /api/admin/system/security
#[utoipa::path(
    put,
    path = "/api/admin/system/security",
    tag = "System",
    request_body = UpdateSecuritySettingsPayload,
    responses((status = 200, description = "Security settings saved", body = SecuritySettings)),
    security(("api_jwt" = []))
)]
pub async fn update_security(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermSystemHealth>,
    AuthenticatedUser(admin): AuthenticatedUser,
    Json(payload): Json<UpdateSecuritySettingsPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let settings = app_state
        .security_repo
        .update_settings(payload.is_active, payload.config)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tracing::info!(updated_by = %admin.email, is_active = settings.is_active, "Security settings updated");
    Ok(Json(settings))
}

// POST /api/admin/system/security/toggle
#[utoipa::path(
    post,
    path = "/api/admin/system/security/toggle",
    tag = "System",
    responses((status = 200, description = "Protection switched on or off", body = SecuritySettings)),
    security(("api_jwt" = []))
)]
pub async fn toggle_security(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermSystemHealth>,
    AuthenticatedUser(admin): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let settings = app_state
        .security_repo
        .toggle()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let state = if settings.is_active { "enabled" } else { "disabled" };
    let message = format!("Security protection {} by {}", state, admin.email);
    if let Err(e) = app_state.security_repo.log("info", "security", &message).await {
        tracing::warn!("Failed to write system log: {}", e);
    }

    Ok(Json(settings))
}
