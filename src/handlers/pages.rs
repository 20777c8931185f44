// src/handlers/pages.rs

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::{Map, Value};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermPages, RequirePermission},
    },
    models::{
        activity::{NewActivity, EDIT_PAGE},
        page::{find_page, shallow_merge, PageContentResponse, PageDefinition, PAGES},
    },
};

// GET /api/admin/pages
#[utoipa::path(
    get,
    path = "/api/admin/pages",
    tag = "Pages",
    responses((status = 200, description = "Editable pages and their fields", body = Vec<PageDefinition>)),
    security(("api_jwt" = []))
)]
pub async fn list_pages(_perm: RequirePermission<PermPages>) -> Json<&'static [PageDefinition]> {
    Json(PAGES)
}

// GET /api/admin/pages/{page_id}
#[utoipa::path(
    get,
    path = "/api/admin/pages/{page_id}",
    tag = "Pages",
    params(("page_id" = String, Path, description = "e.g. page_home")),
    responses(
        (status = 200, description = "Stored content, or the defaults when nothing is stored", body = PageContentResponse),
        (status = 404, description = "Unknown page")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_page(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermPages>,
    Path(page_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let result = async {
        let page = find_page(&page_id)?;
        let response = match app_state.page_repo.find(page.id).await? {
            Some(stored) => PageContentResponse {
                page_id: stored.page_id,
                content: stored.content.0,
                stored: true,
                updated_at: Some(stored.updated_at),
            },
            None => PageContentResponse {
                page_id: page.id.to_string(),
                content: page.defaults(),
                stored: false,
                updated_at: None,
            },
        };
        Ok::<_, AppError>(response)
    }
    .await;

    let response = result.map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(response))
}

// PUT /api/admin/pages/{page_id}
#[utoipa::path(
    put,
    path = "/api/admin/pages/{page_id}",
    tag = "Pages",
    params(("page_id" = String, Path, description = "e.g. page_home")),
    request_body(content = Object, description = "Top-level keys replace the stored ones"),
    responses(
        (status = 200, description = "Merged content", body = PageContentResponse),
        (status = 404, description = "Unknown page")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_page(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermPages>,
    AuthenticatedUser(admin): AuthenticatedUser,
    Path(page_id): Path<String>,
    Json(patch): Json<Map<String, Value>>,
) -> Result<impl IntoResponse, ApiError> {
    let result = async {
        let page = find_page(&page_id)?;
        app_state.page_repo.merge(page.id, patch).await
    }
    .await;

    let stored = result.map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .activity_repo
        .record_quietly(&admin.email, NewActivity::new(EDIT_PAGE, Some(stored.page_id.clone()), "Page content saved"))
        .await;

    Ok(Json(PageContentResponse {
        page_id: stored.page_id,
        content: stored.content.0,
        stored: true,
        updated_at: Some(stored.updated_at),
    }))
}

// GET /api/public/pages/{page_id}
#[utoipa::path(
    get,
    path = "/api/public/pages/{page_id}",
    tag = "Public",
    params(("page_id" = String, Path, description = "e.g. page_home")),
    responses(
        (status = 200, description = "Stored content over the defaults", body = PageContentResponse),
        (status = 404, description = "Unknown page")
    )
)]
pub async fn get_public_page(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(page_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let result = async {
        let page = find_page(&page_id)?;
        let stored = app_state.page_repo.find(page.id).await?;

        let response = match stored {
            Some(stored) => {
                let patch = match stored.content.0 {
                    Value::Object(map) => map,
                    _ => Map::new(),
                };
                PageContentResponse {
                    page_id: stored.page_id,
                    content: shallow_merge(page.defaults(), patch),
                    stored: true,
                    updated_at: Some(stored.updated_at),
                }
            }
            None => PageContentResponse {
                page_id: page.id.to_string(),
                content: page.defaults(),
                stored: false,
                updated_at: None,
            },
        };
        Ok::<_, AppError>(response)
    }
    .await;

    let response = result.map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(response))
}
