// src/main.rs

use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppConfig, AppState};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = AppConfig::from_env().context("Invalid configuration")?;
    let bind_addr = config.bind_addr.clone();

    let app_state = AppState::new(config).await?;

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("✅ Database migrations applied");

    let app = build_router(app_state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {bind_addr}"))?;
    tracing::info!("🚀 Listening on {}", listener.local_addr()?);

    // Peer address feeds the client IP fallback
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .context("Server error")?;

    Ok(())
}

fn build_router(app_state: AppState) -> Router {
    let guard = || axum_middleware::from_fn_with_state(app_state.clone(), auth_guard);

    // Login and lockout status are open; the rest needs a live session
    let auth_routes = Router::new()
        .route("/logout", post(handlers::auth::logout))
        .route("/me", get(handlers::auth::get_me))
        .route("/session", get(handlers::auth::get_session))
        .layer(guard())
        .route("/login", post(handlers::auth::login))
        .route("/lockout", get(handlers::auth::get_lockout));

    let admin_routes = Router::new()
        .route("/access/menu", get(handlers::access::get_menu))
        .route("/access/check", get(handlers::access::check_route))
        .route("/dashboard", get(handlers::dashboard::get_summary))
        // Sessions
        .route("/sessions", get(handlers::sessions::list_sessions))
        .route("/sessions/{id}/revoke", post(handlers::sessions::revoke_session))
        // Users
        .route(
            "/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route("/users/restore-profile", post(handlers::users::restore_profile))
        .route(
            "/users/{id}",
            put(handlers::users::update_user).delete(handlers::users::delete_user),
        )
        // News
        .route(
            "/news",
            get(handlers::news::list_news).post(handlers::news::create_news),
        )
        .route("/news/restore-legacy", post(handlers::news::restore_legacy_news))
        .route(
            "/news/{id}",
            put(handlers::news::update_news).delete(handlers::news::delete_news),
        )
        .route("/news/{id}/approve", post(handlers::news::approve_news))
        .route("/news/{id}/reject", post(handlers::news::reject_news))
        // Courses
        .route(
            "/courses",
            get(handlers::courses::list_courses).post(handlers::courses::create_course),
        )
        .route(
            "/courses/{id}",
            put(handlers::courses::update_course).delete(handlers::courses::delete_course),
        )
        // Collections
        .route(
            "/collections/{collection}",
            get(handlers::content::list_documents).post(handlers::content::create_document),
        )
        .route(
            "/collections/{collection}/{id}",
            get(handlers::content::get_document)
                .put(handlers::content::update_document)
                .delete(handlers::content::delete_document),
        )
        // Pages
        .route("/pages", get(handlers::pages::list_pages))
        .route(
            "/pages/{page_id}",
            get(handlers::pages::get_page).put(handlers::pages::update_page),
        )
        // Settings
        .route(
            "/settings",
            get(handlers::settings::get_settings).put(handlers::settings::update_settings),
        )
        .route(
            "/visibility",
            get(handlers::settings::get_visibility).put(handlers::settings::update_visibility),
        )
        // System
        .route("/system/health", get(handlers::system::get_health))
        .route(
            "/system/security",
            get(handlers::system::get_security).put(handlers::system::update_security),
        )
        .route("/system/security/toggle", post(handlers::system::toggle_security))
        .route(
            "/activity",
            get(handlers::activity::list_activity).post(handlers::activity::record_activity),
        )
        .layer(guard());

    let public_routes = Router::new()
        .route("/site", get(handlers::public::get_site))
        .route("/visit", post(handlers::public::record_visit))
        .route(
            "/news",
            get(handlers::news::list_public_news).post(handlers::news::submit_news),
        )
        .route("/news/{id}", get(handlers::news::get_public_news))
        .route("/courses", get(handlers::courses::list_public_courses))
        .route("/highlights", get(handlers::content::list_highlights))
        .route("/inquiries", post(handlers::content::submit_inquiry))
        .route("/subscribers", post(handlers::content::subscribe))
        .route("/pages/{page_id}", get(handlers::pages::get_public_page));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/admin", admin_routes)
        .nest("/api/public", public_routes)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::Value;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    // The pool never connects: every request below is answered before touching the database
    fn test_router() -> Router {
        let config = AppConfig::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgres://localhost/college_test".into()),
            "JWT_SECRET" => Some("test-secret".into()),
            "SUPER_ADMIN_EMAIL" => Some("principal@college.edu".into()),
            _ => None,
        })
        .unwrap();
        let pool = PgPoolOptions::new().connect_lazy(&config.database_url).unwrap();
        build_router(AppState::with_pool(pool, config))
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_check_is_open() {
        let response = test_router()
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn admin_routes_require_a_token() {
        let response = test_router()
            .oneshot(Request::get("/api/admin/dashboard").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["code"], "invalid_token");
    }

    #[tokio::test]
    async fn malformed_tokens_are_rejected() {
        let response = test_router()
            .oneshot(
                Request::get("/api/auth/me")
                    .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn login_validates_before_touching_the_database() {
        let response = test_router()
            .oneshot(
                Request::post("/api/auth/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(header::ACCEPT_LANGUAGE, "pt-BR")
                    .body(Body::from(r#"{"username":"","password":""}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json_body(response).await;
        assert_eq!(body["code"], "validation_failed");
        assert!(body["details"]["username"].is_array());
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let response = test_router()
            .oneshot(Request::get("/api-docs/openapi.json").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let doc = json_body(response).await;
        assert!(doc["paths"]["/api/admin/news/{id}/approve"].is_object());
    }
}
