// src/handlers/dashboard.rs

use axum::{extract::State, response::IntoResponse, Json};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{PermDashboard, RequirePermission},
    },
    models::dashboard::DashboardSummary,
};

// GET /api/admin/dashboard
#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    tag = "Dashboard",
    responses((status = 200, description = "Counts and the latest events and news", body = DashboardSummary)),
    security(("api_jwt" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermDashboard>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = app_state
        .dashboard_service
        .summary()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(summary))
}
