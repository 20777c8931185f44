// src/handlers/public.rs

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
    models::settings::PublicSiteResponse,
};

// GET /api/public/site
#[utoipa::path(
    get,
    path = "/api/public/site",
    tag = "Public",
    responses((status = 200, description = "Settings, section visibility and maintenance flag", body = PublicSiteResponse))
)]
pub async fn get_site(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let settings = app_state
        .settings_repo
        .get()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(PublicSiteResponse {
        sections: settings.visibility(),
        maintenance_mode: settings.maintenance_mode,
        settings,
    }))
}

// POST /api/public/visit
#[utoipa::path(
    post,
    path = "/api/public/visit",
    tag = "Public",
    responses((status = 200, description = "Visit counted; returns the new total"))
)]
pub async fn record_visit(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let total = app_state
        .dashboard_service
        .record_visit()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(json!({ "totalVisits": total })))
}
