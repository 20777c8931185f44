// src/models/news.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

pub const DEFAULT_CATEGORY: &str = "General";
/// Recorded as the approver when legacy rows are restored.
pub const SYSTEM_MIGRATION: &str = "system_migration";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "news_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NewsStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationAction {
    Approve,
    Reject,
}

impl ModerationAction {
    pub fn target_status(self) -> NewsStatus {
        match self {
            ModerationAction::Approve => NewsStatus::Approved,
            ModerationAction::Reject => NewsStatus::Rejected,
        }
    }

    pub fn verb(self) -> &'static str {
        match self {
            ModerationAction::Approve => "approve",
            ModerationAction::Reject => "reject",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Submitter {
    #[validate(custom(function = "not_blank", message = "Name is required."))]
    #[schema(example = "Asha Patel")]
    pub name: String,
    #[validate(email(message = "The e-mail provided is invalid."))]
    pub email: String,
    #[schema(example = "BCA-2023-041")]
    pub roll_number: String,
    pub role: Option<String>,
    pub department: Option<String>,
    pub designation: Option<String>,
}

impl Submitter {
    /// Identity used for news written by the admins themselves.
    pub fn college(site_name: &str, site_email: &str) -> Self {
        Self {
            name: site_name.to_string(),
            email: site_email.to_string(),
            roll_number: "ADMIN".to_string(),
            role: Some("admin".to_string()),
            department: None,
            designation: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct News {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    #[schema(example = "Events")]
    pub category: String,
    pub image_url: Option<String>,
    #[schema(value_type = Submitter)]
    pub submitted_by: Json<Submitter>,
    /// `None` for legacy rows created before moderation existed.
    pub status: Option<NewsStatus>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_by: Option<String>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Whitespace alone doesn't count as a value.
fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

fn trim_owned(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

// Public submission form
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitNewsPayload {
    #[validate(
        custom(function = "not_blank", message = "Title is required (max 200 characters)."),
        length(max = 200, message = "Title is required (max 200 characters).")
    )]
    pub title: String,
    #[validate(custom(function = "not_blank", message = "Content is required."))]
    pub content: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[validate(url(message = "Image URL is invalid."))]
    pub image_url: Option<String>,
    #[validate(nested)]
    pub submitted_by: Submitter,
    /// Hidden form field; humans leave it empty.
    #[serde(default)]
    pub security_check: Option<String>,
}

// Admin create/edit form
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewsFormPayload {
    #[validate(
        custom(function = "not_blank", message = "Title is required (max 200 characters)."),
        length(max = 200, message = "Title is required (max 200 characters).")
    )]
    pub title: String,
    #[validate(custom(function = "not_blank", message = "Content is required."))]
    pub content: String,
    #[serde(default = "default_category")]
    pub category: String,
    pub image_url: Option<String>,
}

impl SubmitNewsPayload {
    /// Strips the padding off the text that gets stored.
    pub fn normalize(&mut self) {
        trim_owned(&mut self.title);
        trim_owned(&mut self.content);
        trim_owned(&mut self.category);
        trim_owned(&mut self.submitted_by.name);
        trim_owned(&mut self.submitted_by.email);
    }
}

impl NewsFormPayload {
    pub fn normalize(&mut self) {
        trim_owned(&mut self.title);
        trim_owned(&mut self.content);
        trim_owned(&mut self.category);
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewsStatusQuery {
    pub status: Option<NewsStatus>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicNewsQuery {
    pub category: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RestoreLegacyResponse {
    pub restored: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn actions_map_to_terminal_statuses() {
        assert_eq!(ModerationAction::Approve.target_status(), NewsStatus::Approved);
        assert_eq!(ModerationAction::Reject.target_status(), NewsStatus::Rejected);
    }

    #[test]
    fn status_uses_lowercase_names() {
        assert_eq!(serde_json::to_value(NewsStatus::Pending).unwrap(), "pending");
        let parsed: NewsStatusQuery = serde_json::from_str(r#"{"status":"rejected"}"#).unwrap();
        assert_eq!(parsed.status, Some(NewsStatus::Rejected));
    }

    #[test]
    fn submission_defaults_category_and_validates_submitter() {
        let payload: SubmitNewsPayload = serde_json::from_value(serde_json::json!({
            "title": "Hackathon results",
            "content": "Team Alpha won.",
            "submittedBy": { "name": "Asha", "email": "not-an-email", "rollNumber": "12" }
        }))
        .unwrap();

        assert_eq!(payload.category, DEFAULT_CATEGORY);
        let errors = payload.validate().unwrap_err();
        assert!(errors.to_string().contains("email"));
    }

    #[test]
    fn blank_text_fails_validation() {
        let payload: SubmitNewsPayload = serde_json::from_value(serde_json::json!({
            "title": "   ",
            "content": "  \n ",
            "submittedBy": { "name": " ", "email": "asha@college.edu", "rollNumber": "12" }
        }))
        .unwrap();

        let errors = payload.validate().unwrap_err().to_string();
        assert!(errors.contains("title"));
        assert!(errors.contains("content"));
        assert!(errors.contains("name"));

        let form: NewsFormPayload = serde_json::from_value(serde_json::json!({ "title": "\t", "content": "Body" })).unwrap();
        assert!(form.validate().unwrap_err().field_errors().contains_key("title"));
    }

    #[test]
    fn normalize_trims_what_is_stored() {
        let mut payload: SubmitNewsPayload = serde_json::from_value(serde_json::json!({
            "title": "  Sports day  ",
            "content": " Results inside \n",
            "category": " Sports ",
            "submittedBy": { "name": " Asha ", "email": "asha@college.edu ", "rollNumber": "12" }
        }))
        .unwrap();
        payload.normalize();

        assert_eq!(payload.title, "Sports day");
        assert_eq!(payload.content, "Results inside");
        assert_eq!(payload.category, "Sports");
        assert_eq!(payload.submitted_by.name, "Asha");
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn college_submitter_is_marked_admin() {
        let s = Submitter::college("PVM BCA College", "info@college.edu");
        assert_eq!(s.roll_number, "ADMIN");
        assert_eq!(s.role.as_deref(), Some("admin"));
    }
}
