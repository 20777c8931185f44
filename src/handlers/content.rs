// src/handlers/content.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, rbac::ensure_any},
    models::{
        auth::CurrentAdmin,
        content::{
            Collection, CollectionQuery, CollectionScope, ContentDocument, DocumentPayload, InquiryPayload,
            SubscriberPayload,
        },
    },
};

const HIGHLIGHTS_LIMIT: i64 = 10;

/// Parses the path segment and checks the caller may edit that collection.
fn authorize(admin: &CurrentAdmin, collection: &str) -> Result<(Collection, CollectionScope), AppError> {
    let collection: Collection = collection.parse()?;
    ensure_any(admin, collection.permissions())?;
    Ok((collection, collection.scope_for(&admin.access)))
}

/// Rejects a body whose `category` falls outside the caller's scope.
fn ensure_writable(collection: Collection, scope: &CollectionScope, payload: &DocumentPayload) -> Result<(), AppError> {
    payload.ensure_object()?;
    if !scope.admits(&payload.data) {
        return Err(AppError::PermissionDenied(collection.as_str().to_string()));
    }
    Ok(())
}

// =============================================================================
//  ADMIN CRUD
// =============================================================================

// GET /api/admin/collections/{collection}
#[utoipa::path(
    get,
    path = "/api/admin/collections/{collection}",
    tag = "Content",
    params(
        ("collection" = Collection, Path, description = "Collection name"),
        ("category" = Option<String>, Query, description = "Exact match on the document's category")
    ),
    responses(
        (status = 200, description = "Documents, newest first", body = Vec<ContentDocument>),
        (status = 404, description = "Unknown collection")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_documents(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(admin): AuthenticatedUser,
    Path(collection): Path<String>,
    Query(query): Query<CollectionQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let category = query.category.as_deref().map(str::trim).filter(|c| !c.is_empty());

    let result = async {
        let (collection, scope) = authorize(&admin, &collection)?;
        app_state.content_repo.list(collection, &scope, category).await
    }
    .await;

    let documents = result.map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(documents))
}

// GET /api/admin/collections/{collection}/{id}
#[utoipa::path(
    get,
    path = "/api/admin/collections/{collection}/{id}",
    tag = "Content",
    params(
        ("collection" = Collection, Path, description = "Collection name"),
        ("id" = Uuid, Path, description = "Document id")
    ),
    responses(
        (status = 200, description = "Document", body = ContentDocument),
        (status = 404, description = "Not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_document(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(admin): AuthenticatedUser,
    Path((collection, id)): Path<(String, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let result = async {
        let (collection, scope) = authorize(&admin, &collection)?;
        app_state
            .content_repo
            .find(collection, &scope, id)
            .await?
            .ok_or(AppError::ResourceNotFound("document"))
    }
    .await;

    let document = result.map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(document))
}

// POST /api/admin/collections/{collection}
#[utoipa::path(
    post,
    path = "/api/admin/collections/{collection}",
    tag = "Content",
    request_body = DocumentPayload,
    params(("collection" = Collection, Path, description = "Collection name")),
    responses(
        (status = 201, description = "Document created", body = ContentDocument),
        (status = 400, description = "Data is not a JSON object")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_document(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(admin): AuthenticatedUser,
    Path(collection): Path<String>,
    Json(payload): Json<DocumentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let result = async {
        let (collection, scope) = authorize(&admin, &collection)?;
        ensure_writable(collection, &scope, &payload)?;
        app_state.content_repo.create(collection, payload.data).await
    }
    .await;

    let document = result.map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    tracing::info!(collection = %document.collection, document_id = %document.id, "Document created");
    Ok((StatusCode::CREATED, Json(document)))
}

// PUT /api/admin/collections/{collection}/{id}
#[utoipa::path(
    put,
    path = "/api/admin/collections/{collection}/{id}",
    tag = "Content",
    request_body = DocumentPayload,
    params(
        ("collection" = Collection, Path, description = "Collection name"),
        ("id" = Uuid, Path, description = "Document id")
    ),
    responses(
        (status = 200, description = "Document replaced", body = ContentDocument),
        (status = 404, description = "Not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_document(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(admin): AuthenticatedUser,
    Path((collection, id)): Path<(String, Uuid)>,
    Json(payload): Json<DocumentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let result = async {
        let (collection, scope) = authorize(&admin, &collection)?;
        ensure_writable(collection, &scope, &payload)?;
        app_state
            .content_repo
            .update(collection, &scope, id, payload.data)
            .await?
            .ok_or(AppError::ResourceNotFound("document"))
    }
    .await;

    let document = result.map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(document))
}

// DELETE /api/admin/collections/{collection}/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/collections/{collection}/{id}",
    tag = "Content",
    params(
        ("collection" = Collection, Path, description = "Collection name"),
        ("id" = Uuid, Path, description = "Document id")
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_document(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(admin): AuthenticatedUser,
    Path((collection, id)): Path<(String, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let result = async {
        let (collection, scope) = authorize(&admin, &collection)?;
        if !app_state.content_repo.delete(collection, &scope, id).await? {
            return Err(AppError::ResourceNotFound("document"));
        }
        Ok(())
    }
    .await;

    result.map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  PUBLIC
// =============================================================================

// GET /api/public/highlights
#[utoipa::path(
    get,
    path = "/api/public/highlights",
    tag = "Public",
    responses((status = 200, description = "Latest events by date", body = Vec<ContentDocument>))
)]
pub async fn list_highlights(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let events = app_state
        .content_repo
        .latest_by_date(Collection::Events, HIGHLIGHTS_LIMIT)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(events))
}

// POST /api/public/inquiries
#[utoipa::path(
    post,
    path = "/api/public/inquiries",
    tag = "Public",
    request_body = InquiryPayload,
    responses(
        (status = 201, description = "Inquiry received"),
        (status = 400, description = "Invalid data")
    )
)]
pub async fn submit_inquiry(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<InquiryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let data = json!({
        "name": payload.name.trim(),
        "email": payload.email.trim().to_lowercase(),
        "phone": payload.phone,
        "subject": payload.subject,
        "message": payload.message,
    });

    let document = app_state
        .content_repo
        .create(Collection::Inquiries, data)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(json!({ "id": document.id }))))
}

// POST /api/public/subscribers
#[utoipa::path(
    post,
    path = "/api/public/subscribers",
    tag = "Public",
    request_body = SubscriberPayload,
    responses(
        (status = 201, description = "Subscribed"),
        (status = 400, description = "Invalid e-mail")
    )
)]
pub async fn subscribe(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<SubscriberPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let document = app_state
        .content_repo
        .create(Collection::Subscribers, json!({ "email": payload.email.trim().to_lowercase() }))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(json!({ "id": document.id }))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rbac::{AccessProfile, Permission, Role};

    fn admin(permissions: &[Permission]) -> CurrentAdmin {
        CurrentAdmin {
            uid: Uuid::new_v4(),
            email: "editor@college.edu".into(),
            session_id: Uuid::new_v4(),
            access: AccessProfile { role: Role::ChildAdmin, permissions: permissions.to_vec() },
        }
    }

    #[test]
    fn workshop_editors_reach_only_workshop_events() {
        let (collection, scope) = authorize(&admin(&[Permission::Workshops]), "events").unwrap();
        assert_eq!(collection, Collection::Events);
        assert_eq!(scope, CollectionScope::Categories(vec!["Workshop"]));
    }

    #[test]
    fn writes_outside_the_scope_are_denied() {
        let (collection, scope) = authorize(&admin(&[Permission::Sports]), "events").unwrap();

        let general = DocumentPayload { data: json!({ "title": "Convocation", "category": "General" }) };
        assert!(matches!(
            ensure_writable(collection, &scope, &general),
            Err(AppError::PermissionDenied(p)) if p == "events"
        ));

        let match_day = DocumentPayload { data: json!({ "title": "Football final", "category": "Sports" }) };
        assert!(ensure_writable(collection, &scope, &match_day).is_ok());

        let (collection, scope) = authorize(&admin(&[Permission::Events]), "events").unwrap();
        assert!(ensure_writable(collection, &scope, &general).is_ok());
    }

    #[test]
    fn collection_permission_is_enforced() {
        assert!(matches!(
            authorize(&admin(&[Permission::Events]), "placements"),
            Err(AppError::PermissionDenied(_))
        ));
    }

    #[test]
    fn unknown_collection_is_reported_before_permissions() {
        assert!(matches!(
            authorize(&admin(&[]), "payroll"),
            Err(AppError::UnknownCollection(c)) if c == "payroll"
        ));
    }
}
