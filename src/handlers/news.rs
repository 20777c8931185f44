// src/handlers/news.rs

use axum::{
    extract::{Path, Query, State},
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
        rbac::{PermNews, RequirePermission},
    },
    models::{
        auth::CurrentAdmin,
        news::{
            ModerationAction, News, NewsFormPayload, NewsStatusQuery, PublicNewsQuery, RestoreLegacyResponse,
            SubmitNewsPayload,
        },
        session::ClientInfo,
    },
};

// =============================================================================
//  PUBLIC
// =============================================================================

// POST /api/public/news
#[utoipa::path(
    post,
    path = "/api/public/news",
    tag = "Public",
    request_body = SubmitNewsPayload,
    responses(
        (status = 201, description = "Submitted for moderation", body = News),
        (status = 400, description = "Invalid data"),
        (status = 423, description = "Client blocked")
    )
)]
pub async fn submit_news(
    State(app_state): State<AppState>,
    locale: Locale,
    client: ClientInfo,
    Json(payload): Json<SubmitNewsPayload>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.security_check.as_deref().is_some_and(|v| !v.is_empty()) {
        let err = app_state.auth_service.trip_honeypot(&client).await;
        return Err(err.to_api_error(&locale, &app_state.i18n_store));
    }

    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let news = app_state
        .news_service
        .submit(payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(news)))
}

// GET /api/public/news
#[utoipa::path(
    get,
    path = "/api/public/news",
    tag = "Public",
    params(
        ("category" = Option<String>, Query, description = "Exact category"),
        ("limit" = Option<i64>, Query, description = "At most 50")
    ),
    responses((status = 200, description = "Approved news, newest first", body = Vec<News>))
)]
pub async fn list_public_news(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<PublicNewsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let news = app_state
        .news_service
        .list_published(query.category.as_deref(), query.limit)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(news))
}

// GET /api/public/news/{id}
#[utoipa::path(
    get,
    path = "/api/public/news/{id}",
    tag = "Public",
    params(("id" = Uuid, Path, description = "News id")),
    responses(
        (status = 200, description = "Approved article", body = News),
        (status = 404, description = "Missing or not approved")
    )
)]
pub async fn get_public_news(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let news = app_state
        .news_service
        .get_published(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(news))
}

// =============================================================================
//  ADMIN
// =============================================================================

// GET /api/admin/news
#[utoipa::path(
    get,
    path = "/api/admin/news",
    tag = "News",
    params(("status" = Option<String>, Query, description = "pending (default), approved or rejected")),
    responses((status = 200, description = "News in the given state", body = Vec<News>)),
    security(("api_jwt" = []))
)]
pub async fn list_news(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermNews>,
    Query(query): Query<NewsStatusQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let news = app_state
        .news_service
        .list_by_status(query.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(news))
}

// POST /api/admin/news
#[utoipa::path(
    post,
    path = "/api/admin/news",
    tag = "News",
    request_body = NewsFormPayload,
    responses(
        (status = 201, description = "Published", body = News),
        (status = 400, description = "Invalid data")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_news(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermNews>,
    AuthenticatedUser(admin): AuthenticatedUser,
    Json(payload): Json<NewsFormPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let news = app_state
        .news_service
        .create_approved(&admin, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(news)))
}

// PUT /api/admin/news/{id}
#[utoipa::path(
    put,
    path = "/api/admin/news/{id}",
    tag = "News",
    request_body = NewsFormPayload,
    params(("id" = Uuid, Path, description = "News id")),
    responses(
        (status = 200, description = "Updated", body = News),
        (status = 404, description = "Not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_news(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermNews>,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewsFormPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let news = app_state
        .news_service
        .update(id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(news))
}

async fn moderate(
    app_state: &AppState,
    locale: &Locale,
    admin: &CurrentAdmin,
    id: Uuid,
    action: ModerationAction,
) -> Result<Json<News>, ApiError> {
    let news = app_state
        .news_service
        .moderate(admin, id, action)
        .await
        .map_err(|e| e.to_api_error(locale, app_state.i18n_store))?;

    Ok(Json(news))
}

// POST /api/admin/news/{id}/approve
#[utoipa::path(
    post,
    path = "/api/admin/news/{id}/approve",
    tag = "News",
    params(("id" = Uuid, Path, description = "News id")),
    responses(
        (status = 200, description = "Approved", body = News),
        (status = 404, description = "Not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_news(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermNews>,
    AuthenticatedUser(admin): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    moderate(&app_state, &locale, &admin, id, ModerationAction::Approve).await
}

// POST /api/admin/news/{id}/reject
#[utoipa::path(
    post,
    path = "/api/admin/news/{id}/reject",
    tag = "News",
    params(("id" = Uuid, Path, description = "News id")),
    responses(
        (status = 200, description = "Rejected", body = News),
        (status = 404, description = "Not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn reject_news(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermNews>,
    AuthenticatedUser(admin): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    moderate(&app_state, &locale, &admin, id, ModerationAction::Reject).await
}

// DELETE /api/admin/news/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/news/{id}",
    tag = "News",
    params(("id" = Uuid, Path, description = "News id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_news(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermNews>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .news_service
        .delete(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/admin/news/restore-legacy
#[utoipa::path(
    post,
    path = "/api/admin/news/restore-legacy",
    tag = "News",
    responses((status = 200, description = "Rows without a status were approved", body = RestoreLegacyResponse)),
    security(("api_jwt" = []))
)]
pub async fn restore_legacy_news(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermNews>,
) -> Result<impl IntoResponse, ApiError> {
    let restored = app_state
        .news_service
        .restore_legacy()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(RestoreLegacyResponse { restored }))
}
