// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::rbac::{AccessProfile, MenuItem, Permission, Role};

// Identity record (email + password), independent of the admin profile
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Admin profile document as stored
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    pub user_id: Uuid,
    #[schema(example = "coordinator@college.edu")]
    pub email: String,
    #[schema(example = "child_admin")]
    pub role: Option<String>,
    #[schema(example = json!(["news", "events"]))]
    pub permissions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdminProfile {
    pub fn access(&self) -> AccessProfile {
        AccessProfile::from_stored(self.role.as_deref(), &self.permissions)
    }
}

/// The authenticated admin behind a request.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentAdmin {
    pub uid: Uuid,
    pub email: String,
    pub session_id: Uuid,
    #[serde(flatten)]
    pub access: AccessProfile,
}

impl CurrentAdmin {
    pub fn is_migration(&self) -> bool {
        self.access.role == Role::Migration
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginUserPayload {
    /// An e-mail address, or the `admin` alias.
    #[validate(length(min = 1, message = "Username is required."))]
    #[schema(example = "admin")]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
    /// Hidden form field; humans leave it empty.
    #[serde(default)]
    #[schema(example = "")]
    pub security_check: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub session_id: Uuid,
    pub user: CurrentAdmin,
    #[schema(example = "/admin/dashboard")]
    pub landing_path: &'static str,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user: CurrentAdmin,
    #[schema(value_type = Vec<MenuItem>)]
    pub menu: Vec<&'static MenuItem>,
}

// Claims carried inside the JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,     // account id
    pub sid: Uuid,     // admin session id
    pub email: String,
    pub exp: usize,
    pub iat: usize,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdminPayload {
    #[validate(email(message = "The e-mail provided is invalid."))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must have at least 6 characters."))]
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    #[serde(default = "default_true")]
    pub email_verified: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAdminPayload {
    pub role: Option<Role>,
    #[schema(example = json!(["news", "courses"]))]
    pub permissions: Option<Vec<String>>,
}
