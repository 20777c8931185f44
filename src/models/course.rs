// src/models/course.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

pub const DEFAULT_SEATS: i32 = 60;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    #[schema(example = "Bachelor of Computer Applications")]
    pub name: String,
    #[schema(example = "BCA")]
    pub code: String,
    #[schema(example = "3 Years")]
    pub duration: String,
    #[schema(example = "10+2 in any stream")]
    pub eligibility: String,
    #[schema(example = 60)]
    pub seats: i32,
    #[schema(example = "₹45,000 per year")]
    pub fees: String,
    pub description: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_seats() -> i32 {
    DEFAULT_SEATS
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CoursePayload {
    #[validate(length(min = 1, message = "Course name is required."))]
    pub name: String,
    #[validate(length(min = 1, max = 20, message = "Course code is required (max 20 characters)."))]
    pub code: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub eligibility: String,
    #[serde(default = "default_seats")]
    #[validate(range(min = 0, message = "Seats cannot be negative."))]
    pub seats: i32,
    #[serde(default)]
    pub fees: String,
    #[serde(default)]
    pub description: String,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CourseSearchQuery {
    /// Case-insensitive match on name or code.
    pub search: Option<String>,
}

impl CourseSearchQuery {
    /// `ILIKE` pattern for the search term, `None` when blank.
    pub fn pattern(&self) -> Option<String> {
        let term = self.search.as_deref()?.trim();
        if term.is_empty() {
            return None;
        }
        let escaped = term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
        Some(format!("%{}%", escaped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seats_default_to_sixty() {
        let payload: CoursePayload = serde_json::from_str(r#"{"name":"BBA","code":"BBA"}"#).unwrap();
        assert_eq!(payload.seats, 60);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn blank_search_means_no_filter() {
        assert_eq!(CourseSearchQuery { search: None }.pattern(), None);
        assert_eq!(CourseSearchQuery { search: Some("   ".into()) }.pattern(), None);
    }

    #[test]
    fn search_pattern_escapes_wildcards() {
        let q = CourseSearchQuery { search: Some(" 100%_bca ".into()) };
        assert_eq!(q.pattern().as_deref(), Some("%100\\%\\_bca%"));
    }
}
