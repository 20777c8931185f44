// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::get_me,
        handlers::auth::get_session,
        handlers::auth::get_lockout,

        // --- Access ---
        handlers::access::get_menu,
        handlers::access::check_route,

        // --- Sessions ---
        handlers::sessions::list_sessions,
        handlers::sessions::revoke_session,

        // --- Users ---
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::update_user,
        handlers::users::delete_user,
        handlers::users::restore_profile,

        // --- News ---
        handlers::news::list_news,
        handlers::news::create_news,
        handlers::news::update_news,
        handlers::news::approve_news,
        handlers::news::reject_news,
        handlers::news::delete_news,
        handlers::news::restore_legacy_news,

        // --- Courses ---
        handlers::courses::list_courses,
        handlers::courses::create_course,
        handlers::courses::update_course,
        handlers::courses::delete_course,

        // --- Content ---
        handlers::content::list_documents,
        handlers::content::get_document,
        handlers::content::create_document,
        handlers::content::update_document,
        handlers::content::delete_document,

        // --- Pages ---
        handlers::pages::list_pages,
        handlers::pages::get_page,
        handlers::pages::update_page,

        // --- Settings ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,
        handlers::settings::get_visibility,
        handlers::settings::update_visibility,

        // --- Dashboard / System ---
        handlers::dashboard::get_summary,
        handlers::system::get_health,
        handlers::system::get_security,
        handlers::system::update_security,
        handlers::system::toggle_security,
        handlers::activity::record_activity,
        handlers::activity::list_activity,

        // --- Public ---
        handlers::public::get_site,
        handlers::public::record_visit,
        handlers::news::submit_news,
        handlers::news::list_public_news,
        handlers::news::get_public_news,
        handlers::courses::list_public_courses,
        handlers::content::list_highlights,
        handlers::content::submit_inquiry,
        handlers::content::subscribe,
        handlers::pages::get_public_page,
    ),
    components(
        schemas(
            // --- Access ---
            models::rbac::Permission,
            models::rbac::Role,
            models::rbac::MenuItem,
            models::rbac::RouteAccess,
            models::rbac::AccessProfile,
            handlers::access::RouteQuery,

            // --- Auth ---
            models::auth::AdminProfile,
            models::auth::CurrentAdmin,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::MeResponse,
            models::auth::CreateAdminPayload,
            models::auth::UpdateAdminPayload,

            // --- Sessions / Security ---
            models::session::SessionStatus,
            models::session::AdminSession,
            models::session::SessionView,
            models::session::SessionStatusResponse,
            models::security::LockoutStatus,
            models::security::SecurityConfig,
            models::security::SecuritySettings,
            models::security::UpdateSecuritySettingsPayload,
            models::security::SystemLog,

            // --- News ---
            models::news::NewsStatus,
            models::news::Submitter,
            models::news::News,
            models::news::SubmitNewsPayload,
            models::news::NewsFormPayload,
            models::news::RestoreLegacyResponse,

            // --- Content ---
            models::content::Collection,
            models::content::ContentDocument,
            models::content::DocumentPayload,
            models::content::InquiryPayload,
            models::content::SubscriberPayload,
            models::course::Course,
            models::course::CoursePayload,
            models::page::FieldKind,
            models::page::PageField,
            models::page::PageSection,
            models::page::PageDefinition,
            models::page::PageContentResponse,
            models::settings::SiteSettings,
            models::settings::UpdateSiteSettingsPayload,
            models::settings::UpdateVisibilityPayload,
            models::settings::VisibilityResponse,
            models::settings::PublicSiteResponse,

            // --- Dashboard ---
            models::dashboard::DashboardCounts,
            models::dashboard::ActivityKind,
            models::dashboard::RecentActivity,
            models::dashboard::DashboardSummary,
            models::dashboard::HealthGrade,
            models::dashboard::DatabaseStatus,
            models::dashboard::SystemHealthReport,
            models::activity::ActivityLog,
            models::activity::NewActivity,
        )
    ),
    tags(
        (name = "Auth", description = "Login, logout and the current session"),
        (name = "Access", description = "Menu and route permissions"),
        (name = "Sessions", description = "Active admin sessions"),
        (name = "Users", description = "Admin accounts and their permissions"),
        (name = "News", description = "News moderation"),
        (name = "Courses", description = "Course catalog"),
        (name = "Content", description = "Document collections (events, faculty, placements...)"),
        (name = "Pages", description = "Editable page content"),
        (name = "Settings", description = "Site settings and section visibility"),
        (name = "Dashboard", description = "Back-office overview"),
        (name = "System", description = "Health and security settings"),
        (name = "Activity", description = "Admin activity log"),
        (name = "Public", description = "Endpoints used by the public website")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
