// src/handlers/users.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermUserManagement, RequirePermission},
    },
    models::auth::{AdminProfile, CreateAdminPayload, UpdateAdminPayload},
};

// GET /api/admin/users
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "Users",
    responses((status = 200, description = "Admin profiles", body = Vec<AdminProfile>)),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermUserManagement>,
) -> Result<impl IntoResponse, ApiError> {
    let users = app_state
        .user_service
        .list()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(users))
}

// POST /api/admin/users
#[utoipa::path(
    post,
    path = "/api/admin/users",
    tag = "Users",
    request_body = CreateAdminPayload,
    responses(
        (status = 201, description = "Account and profile created", body = AdminProfile),
        (status = 400, description = "Invalid data"),
        (status = 403, description = "Only a super admin may grant super admin"),
        (status = 409, description = "E-mail already exists")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermUserManagement>,
    AuthenticatedUser(admin): AuthenticatedUser,
    Json(payload): Json<CreateAdminPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let profile = app_state
        .user_service
        .create(&admin, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(profile)))
}

// PUT /api/admin/users/{id}
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}",
    tag = "Users",
    request_body = UpdateAdminPayload,
    params(("id" = Uuid, Path, description = "Account id")),
    responses(
        (status = 200, description = "Profile updated", body = AdminProfile),
        (status = 400, description = "Unknown permission"),
        (status = 404, description = "No such profile")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermUserManagement>,
    AuthenticatedUser(admin): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAdminPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = app_state
        .user_service
        .update(&admin, id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(profile))
}

// DELETE /api/admin/users/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "Account id")),
    responses(
        (status = 204, description = "Profile removed"),
        (status = 400, description = "Cannot delete yourself"),
        (status = 404, description = "No such profile")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_user(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermUserManagement>,
    AuthenticatedUser(admin): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .user_service
        .delete(&admin, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/admin/users/restore-profile
#[utoipa::path(
    post,
    path = "/api/admin/users/restore-profile",
    tag = "Users",
    responses(
        (status = 200, description = "Super admin profile recreated", body = AdminProfile),
        (status = 403, description = "Not in migration mode")
    ),
    security(("api_jwt" = []))
)]
pub async fn restore_profile(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermUserManagement>,
    AuthenticatedUser(admin): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let profile = app_state
        .user_service
        .restore_own_profile(&admin)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(profile))
}
