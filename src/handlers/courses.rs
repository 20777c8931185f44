// src/handlers/courses.rs

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
        i18n::Locale,
        rbac::{PermCourses, RequirePermission},
    },
    models::course::{Course, CoursePayload, CourseSearchQuery},
};

// GET /api/admin/courses  (also served publicly at /api/public/courses)
#[utoipa::path(
    get,
    path = "/api/admin/courses",
    tag = "Courses",
    params(("search" = Option<String>, Query, description = "Case-insensitive match on name or code")),
    responses((status = 200, description = "Courses, newest first", body = Vec<Course>)),
    security(("api_jwt" = []))
)]
pub async fn list_courses(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCourses>,
    query: Query<CourseSearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    list_public_courses(State(app_state), locale, query).await
}

// GET /api/public/courses
#[utoipa::path(
    get,
    path = "/api/public/courses",
    tag = "Public",
    params(("search" = Option<String>, Query, description = "Case-insensitive match on name or code")),
    responses((status = 200, description = "Courses, newest first", body = Vec<Course>))
)]
pub async fn list_public_courses(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<CourseSearchQuery>,
) -> Result<Json<Vec<Course>>, ApiError> {
    let courses = app_state
        .course_repo
        .list(query.pattern().as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(courses))
}

// POST /api/admin/courses
#[utoipa::path(
    post,
    path = "/api/admin/courses",
    tag = "Courses",
    request_body = CoursePayload,
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 400, description = "Invalid data")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_course(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCourses>,
    Json(payload): Json<CoursePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let course = app_state
        .course_repo
        .create(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tracing::info!(course_id = %course.id, "Course created");
    Ok((StatusCode::CREATED, Json(course)))
}

// PUT /api/admin/courses/{id}
#[utoipa::path(
    put,
    path = "/api/admin/courses/{id}",
    tag = "Courses",
    request_body = CoursePayload,
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course updated", body = Course),
        (status = 404, description = "Not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_course(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCourses>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CoursePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let course = app_state
        .course_repo
        .update(id, &payload)
        .await
        .and_then(|c| c.ok_or(AppError::ResourceNotFound("course")))
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(course))
}

// DELETE /api/admin/courses/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/courses/{id}",
    tag = "Courses",
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_course(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCourses>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = app_state
        .course_repo
        .delete(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    if !deleted {
        return Err(AppError::ResourceNotFound("course").to_api_error(&locale, &app_state.i18n_store));
    }
    Ok(StatusCode::NO_CONTENT)
}
