// src/handlers/access.rs

use axum::{extract::Query, Json};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    middleware::auth::AuthenticatedUser,
    models::rbac::{MenuItem, RouteAccess},
};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct RouteQuery {
    /// Back-office path about to be rendered, e.g. `/admin/news/42`.
    #[param(example = "/admin/news")]
    pub path: String,
}

// GET /api/admin/access/menu
#[utoipa::path(
    get,
    path = "/api/admin/access/menu",
    tag = "Access",
    responses((status = 200, description = "Menu entries visible to the caller", body = Vec<MenuItem>)),
    security(("api_jwt" = []))
)]
pub async fn get_menu(AuthenticatedUser(admin): AuthenticatedUser) -> Json<Vec<&'static MenuItem>> {
    Json(admin.access.menu())
}

// GET /api/admin/access/check
#[utoipa::path(
    get,
    path = "/api/admin/access/check",
    tag = "Access",
    params(RouteQuery),
    responses((status = 200, description = "Whether the caller may open the path, and where to go otherwise", body = RouteAccess)),
    security(("api_jwt" = []))
)]
pub async fn check_route(
    AuthenticatedUser(admin): AuthenticatedUser,
    Query(query): Query<RouteQuery>,
) -> Json<RouteAccess> {
    Json(admin.access.check_route(query.path.trim()))
}
