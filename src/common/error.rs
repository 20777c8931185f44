// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

// Domain errors. Handlers translate them with `to_api_error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail already exists")]
    EmailAlreadyExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Session revoked")]
    SessionRevoked,

    #[error("Admin profile removed")]
    ProfileRemoved,

    #[error("E-mail not verified: {0}")]
    EmailNotVerified(String),

    #[error("Admin profile not found")]
    ProfileNotFound,

    #[error("Client blocked until {until}: {reason}")]
    ClientBlocked { reason: String, until: DateTime<Utc> },

    #[error("Missing permission: {0}")]
    PermissionDenied(String),

    #[error("{0} not found")]
    ResourceNotFound(&'static str),

    #[error("Cannot revoke the current session")]
    CannotRevokeCurrentSession,

    #[error("Cannot delete own profile")]
    CannotDeleteSelf,

    #[error("Unknown permission: {0}")]
    UnknownPermission(String),

    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    #[error("Unknown page: {0}")]
    UnknownPage(String),

    #[error("Migration mode required")]
    MigrationModeRequired,

    #[error("Super admin grant denied")]
    SuperAdminGrantDenied,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Anything unexpected; `anyhow` carries the context
    #[error("Internal server error: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Bcrypt error: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

/// The error body that actually goes over the wire.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({ "error": self.error, "code": self.code });
        if let Some(details) = self.details {
            body["details"] = details;
        }
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    /// Single-field validation failure for checks the derive can't express.
    pub fn invalid_field(field: &'static str, code: &'static str, message: &'static str) -> Self {
        let mut err = validator::ValidationError::new(code);
        err.message = Some(message.into());
        let mut errors = validator::ValidationErrors::new();
        errors.add(field, err);
        AppError::ValidationError(errors)
    }

    /// Status code and stable machine-readable code for each variant.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "validation_failed"),
            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "email_already_exists"),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
            AppError::InvalidToken | AppError::JwtError(_) => (StatusCode::UNAUTHORIZED, "invalid_token"),
            AppError::SessionRevoked => (StatusCode::UNAUTHORIZED, "session_revoked"),
            AppError::ProfileRemoved => (StatusCode::UNAUTHORIZED, "profile_removed"),
            AppError::EmailNotVerified(_) => (StatusCode::FORBIDDEN, "email_not_verified"),
            AppError::ProfileNotFound => (StatusCode::NOT_FOUND, "profile_not_found"),
            AppError::ClientBlocked { .. } => (StatusCode::LOCKED, "client_blocked"),
            AppError::PermissionDenied(_) => (StatusCode::FORBIDDEN, "permission_denied"),
            AppError::ResourceNotFound(_) => (StatusCode::NOT_FOUND, "resource_not_found"),
            AppError::CannotRevokeCurrentSession => (StatusCode::BAD_REQUEST, "cannot_revoke_current_session"),
            AppError::CannotDeleteSelf => (StatusCode::BAD_REQUEST, "cannot_delete_self"),
            AppError::UnknownPermission(_) => (StatusCode::BAD_REQUEST, "unknown_permission"),
            AppError::UnknownCollection(_) => (StatusCode::NOT_FOUND, "unknown_collection"),
            AppError::UnknownPage(_) => (StatusCode::NOT_FOUND, "unknown_page"),
            AppError::MigrationModeRequired => (StatusCode::FORBIDDEN, "migration_mode_required"),
            AppError::SuperAdminGrantDenied => (StatusCode::FORBIDDEN, "super_admin_grant_denied"),
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }

    /// Translates the error into the caller's language.
    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let (status, code) = self.status_and_code();
        let lang = locale.0.as_str();

        let (error, details) = match self {
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), json!(messages));
                }
                (store.translate(lang, code, &[]), Some(Value::Object(details)))
            }
            AppError::EmailNotVerified(email) => (store.translate(lang, code, &[("email", email.as_str())]), None),
            AppError::ClientBlocked { reason, until } => (
                store.translate(lang, code, &[("reason", reason.as_str())]),
                Some(json!({ "reason": reason, "blockedUntil": until })),
            ),
            AppError::PermissionDenied(permission) | AppError::UnknownPermission(permission) => {
                (store.translate(lang, code, &[("permission", permission.as_str())]), None)
            }
            AppError::ResourceNotFound(resource) => {
                (store.translate(lang, code, &[("resource", *resource)]), None)
            }
            AppError::UnknownCollection(collection) => {
                (store.translate(lang, code, &[("collection", collection.as_str())]), None)
            }
            AppError::UnknownPage(page) => (store.translate(lang, code, &[("page", page.as_str())]), None),
            e if status == StatusCode::INTERNAL_SERVER_ERROR => {
                // The detailed message only goes to the log
                tracing::error!("Internal server error: {}", e);
                (store.translate(lang, code, &[]), None)
            }
            _ => (store.translate(lang, code, &[]), None),
        };

        ApiError { status, code, error, details }
    }
}

// Used by middleware, where no Locale extractor runs.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default(), I18nStore::shared()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Payload {
        #[validate(length(min = 1, message = "Title is required."))]
        title: String,
    }

    #[test]
    fn validation_errors_carry_field_details() {
        let err = Payload { title: String::new() }.validate().unwrap_err();
        let api = AppError::ValidationError(err).to_api_error(&Locale::default(), I18nStore::shared());

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.code, "validation_failed");
        assert_eq!(api.details.unwrap()["title"][0], "Title is required.");
    }

    #[test]
    fn blocked_client_exposes_reason_and_expiry() {
        let until = Utc::now();
        let api = AppError::ClientBlocked { reason: "Bot detected".into(), until }
            .to_api_error(&Locale("en".into()), I18nStore::shared());

        assert_eq!(api.status, StatusCode::LOCKED);
        assert_eq!(api.error, "Access temporarily blocked: Bot detected.");
        assert_eq!(api.details.unwrap()["reason"], "Bot detected");
    }

    #[test]
    fn internal_errors_are_not_leaked() {
        let api = AppError::InternalServerError(anyhow::anyhow!("connection string leaked"))
            .to_api_error(&Locale("pt".into()), I18nStore::shared());

        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.error, "Ocorreu um erro inesperado.");
        assert!(api.details.is_none());
    }

    #[test]
    fn revoked_session_has_its_own_code() {
        let (status, code) = AppError::SessionRevoked.status_and_code();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(code, "session_revoked");
    }
}
