// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        auth::{AuthResponse, LoginUserPayload, MeResponse},
        security::LockoutStatus,
        session::{ClientInfo, SessionStatusResponse},
    },
};

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 400, description = "Invalid data"),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "E-mail not verified"),
        (status = 404, description = "No admin profile for this account"),
        (status = 423, description = "Client blocked")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    client: ClientInfo,
    Json(payload): Json<LoginUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let response = app_state
        .auth_service
        .login(payload, &client)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(response)))
}

// POST /api/auth/logout
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses((status = 204, description = "Session closed")),
    security(("api_jwt" = []))
)]
pub async fn logout(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(admin): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .auth_service
        .logout(&admin)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/auth/me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses((status = 200, description = "Current admin and visible menu", body = MeResponse)),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedUser(admin): AuthenticatedUser) -> Json<MeResponse> {
    let menu = admin.access.menu();
    Json(MeResponse { user: admin, menu })
}

// GET /api/auth/session
#[utoipa::path(
    get,
    path = "/api/auth/session",
    tag = "Auth",
    responses(
        (status = 200, description = "Current session", body = SessionStatusResponse),
        (status = 401, description = "Session revoked or profile removed")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_session(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(admin): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let status = app_state
        .auth_service
        .session_status(&admin)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(status))
}

// GET /api/auth/lockout
#[utoipa::path(
    get,
    path = "/api/auth/lockout",
    tag = "Auth",
    responses((status = 200, description = "Lockout state of the calling client", body = LockoutStatus))
)]
pub async fn get_lockout(
    State(app_state): State<AppState>,
    locale: Locale,
    client: ClientInfo,
) -> Result<impl IntoResponse, ApiError> {
    let status = app_state
        .auth_service
        .lockout_status(&client)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(status))
}
