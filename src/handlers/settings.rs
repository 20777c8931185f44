// src/handlers/settings.rs

use axum::{extract::State, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{PermSettings, PermVisibility, RequirePermission},
    },
    models::settings::{SiteSettings, UpdateSiteSettingsPayload, UpdateVisibilityPayload, VisibilityResponse},
};

// GET /api/admin/settings
#[utoipa::path(
    get,
    path = "/api/admin/settings",
    tag = "Settings",
    responses((status = 200, description = "Site settings", body = SiteSettings)),
    security(("api_jwt" = []))
)]
pub async fn get_settings(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermSettings>,
) -> Result<impl IntoResponse, ApiError> {
    let settings = app_state
        .settings_repo
        .get()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(settings))
}

// PUT /api/admin/settings
#[utoipa::path(
    put,
    path = "/api/admin/settings",
    tag = "Settings",
    request_body = UpdateSiteSettingsPayload,
    responses(
        (status = 200, description = "Settings saved", body = SiteSettings),
        (status = 400, description = "Invalid data")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_settings(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermSettings>,
    Json(payload): Json<UpdateSiteSettingsPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let result = async {
        let mut settings = app_state.settings_repo.get().await?;
        settings.apply(payload);
        app_state.settings_repo.save(&settings).await
    }
    .await;

    let updated = result.map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    tracing::info!(maintenance_mode = updated.maintenance_mode, "Site settings updated");
    Ok(Json(updated))
}

// GET /api/admin/visibility
#[utoipa::path(
    get,
    path = "/api/admin/visibility",
    tag = "Settings",
    responses((status = 200, description = "Every home page section and whether it is shown", body = VisibilityResponse)),
    security(("api_jwt" = []))
)]
pub async fn get_visibility(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermVisibility>,
) -> Result<impl IntoResponse, ApiError> {
    let settings = app_state
        .settings_repo
        .get()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(VisibilityResponse { sections: settings.visibility() }))
}

// PUT /api/admin/visibility
#[utoipa::path(
    put,
    path = "/api/admin/visibility",
    tag = "Settings",
    request_body = UpdateVisibilityPayload,
    responses(
        (status = 200, description = "Flags merged", body = VisibilityResponse),
        (status = 400, description = "Unknown section")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_visibility(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermVisibility>,
    Json(payload): Json<UpdateVisibilityPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let result = async {
        let flags = payload.validated()?;
        app_state.settings_repo.merge_visibility(flags).await
    }
    .await;

    let settings = result.map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(VisibilityResponse { sections: settings.visibility() }))
}
