// src/models/activity.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

pub const AUTH_EVENT: &str = "AUTH_EVENT";
pub const SESSION_EVENT: &str = "SESSION_EVENT";
pub const USER_EVENT: &str = "USER_EVENT";
pub const EDIT_PAGE: &str = "EDIT_PAGE";

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: Uuid,
    pub admin_email: String,
    #[schema(example = "VIEW_PAGE")]
    pub action: String,
    #[schema(example = "/admin/news")]
    pub target: Option<String>,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One line for the activity log, built server-side or sent by the back-office.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewActivity {
    #[validate(length(min = 1, max = 64, message = "Action is required."))]
    pub action: String,
    #[validate(length(max = 512))]
    pub target: Option<String>,
    #[validate(length(max = 2000))]
    pub details: Option<String>,
}

impl NewActivity {
    pub fn new(action: &str, target: Option<String>, details: impl Into<String>) -> Self {
        Self {
            action: action.to_string(),
            target,
            details: Some(details.into()),
        }
    }
}
