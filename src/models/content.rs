// src/models/content.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    models::rbac::{AccessProfile, Permission},
};

/// Free-form document collections edited from the back-office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Events,
    Students,
    Faculty,
    Achievements,
    Placements,
    Admissions,
    Inquiries,
    Subscribers,
}

impl Collection {
    pub const ALL: [Collection; 8] = [
        Collection::Events,
        Collection::Students,
        Collection::Faculty,
        Collection::Achievements,
        Collection::Placements,
        Collection::Admissions,
        Collection::Inquiries,
        Collection::Subscribers,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Events => "events",
            Collection::Students => "students",
            Collection::Faculty => "faculty",
            Collection::Achievements => "achievements",
            Collection::Placements => "placements",
            Collection::Admissions => "admissions",
            Collection::Inquiries => "inquiries",
            Collection::Subscribers => "subscribers",
        }
    }

    /// Any one of these grants access. Sports and workshops are event categories.
    pub fn permissions(self) -> &'static [Permission] {
        match self {
            Collection::Events => &[Permission::Events, Permission::Sports, Permission::Workshops],
            Collection::Students => &[Permission::Students],
            Collection::Faculty => &[Permission::Faculty],
            Collection::Achievements => &[Permission::Achievements],
            Collection::Placements => &[Permission::Placements],
            Collection::Admissions => &[Permission::Admissions],
            Collection::Inquiries => &[Permission::Inquiries],
            Collection::Subscribers => &[Permission::Subscribers],
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| AppError::UnknownCollection(s.to_string()))
    }
}

pub const CATEGORY_SPORTS: &str = "Sports";
pub const CATEGORY_WORKSHOP: &str = "Workshop";

// Event categories that have their own screen and permission
const EVENT_CATEGORY_PERMISSIONS: [(Permission, &str); 2] =
    [(Permission::Sports, CATEGORY_SPORTS), (Permission::Workshops, CATEGORY_WORKSHOP)];

/// The part of a collection an admin may read and edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionScope {
    Whole,
    /// Only documents whose `category` is one of these.
    Categories(Vec<&'static str>),
}

impl CollectionScope {
    pub fn categories(&self) -> Option<&[&'static str]> {
        match self {
            CollectionScope::Whole => None,
            CollectionScope::Categories(categories) => Some(categories),
        }
    }

    /// Whether a document body may be written under this scope.
    pub fn admits(&self, data: &Value) -> bool {
        match self {
            CollectionScope::Whole => true,
            CollectionScope::Categories(categories) => data
                .get("category")
                .and_then(Value::as_str)
                .is_some_and(|category| categories.contains(&category)),
        }
    }
}

impl Collection {
    /// Scope for an admin already holding one of `permissions()`. Sports and
    /// workshop editors only see their own category of events.
    pub fn scope_for(self, access: &AccessProfile) -> CollectionScope {
        if self != Collection::Events || access.allows(Permission::Events) {
            return CollectionScope::Whole;
        }

        let categories = EVENT_CATEGORY_PERMISSIONS
            .iter()
            .filter(|(permission, _)| access.allows(*permission))
            .map(|(_, category)| *category)
            .collect();
        CollectionScope::Categories(categories)
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContentDocument {
    pub id: Uuid,
    #[schema(example = "events")]
    pub collection: String,
    #[schema(value_type = Object)]
    pub data: Json<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DocumentPayload {
    /// Any JSON object; fields are owned by the editing screen.
    #[schema(value_type = Object)]
    pub data: Value,
}

impl DocumentPayload {
    pub fn ensure_object(&self) -> Result<(), AppError> {
        if self.data.is_object() {
            return Ok(());
        }
        Err(AppError::invalid_field("data", "object", "Must be a JSON object."))
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CollectionQuery {
    /// Matches the document's `category` field exactly.
    pub category: Option<String>,
}

// Public contact form
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InquiryPayload {
    #[validate(length(min = 1, message = "Name is required."))]
    pub name: String,
    #[validate(email(message = "The e-mail provided is invalid."))]
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    #[validate(length(min = 1, max = 5000, message = "Message is required."))]
    pub message: String,
}

// Public newsletter form
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubscriberPayload {
    #[validate(email(message = "The e-mail provided is invalid."))]
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn events_are_reachable_through_their_categories() {
        let perms = Collection::Events.permissions();
        assert!(perms.contains(&Permission::Sports));
        assert!(perms.contains(&Permission::Workshops));
        assert_eq!(Collection::Faculty.permissions(), &[Permission::Faculty]);
    }

    fn child(permissions: &[Permission]) -> AccessProfile {
        AccessProfile { role: crate::models::rbac::Role::ChildAdmin, permissions: permissions.to_vec() }
    }

    #[test]
    fn category_editors_are_scoped_to_their_events() {
        let sports = Collection::Events.scope_for(&child(&[Permission::Sports]));
        assert_eq!(sports, CollectionScope::Categories(vec![CATEGORY_SPORTS]));
        assert!(sports.admits(&json!({ "title": "Cricket finals", "category": "Sports" })));
        assert!(!sports.admits(&json!({ "title": "Annual day", "category": "Cultural" })));
        assert!(!sports.admits(&json!({ "title": "Rust 101", "category": "Workshop" })));
        assert!(!sports.admits(&json!({ "title": "No category" })));

        let both = Collection::Events.scope_for(&child(&[Permission::Sports, Permission::Workshops]));
        assert_eq!(both.categories(), Some(&[CATEGORY_SPORTS, CATEGORY_WORKSHOP][..]));
    }

    #[test]
    fn event_editors_see_every_event() {
        let events = Collection::Events.scope_for(&child(&[Permission::Events, Permission::Sports]));
        assert_eq!(events, CollectionScope::Whole);
        assert!(events.admits(&json!({ "category": "Cultural" })));
        assert_eq!(Collection::Faculty.scope_for(&child(&[Permission::Faculty])), CollectionScope::Whole);
        assert_eq!(Collection::Events.scope_for(&child(&[Permission::All])), CollectionScope::Whole);
    }

    #[test]
    fn collection_names_parse() {
        for c in Collection::ALL {
            assert_eq!(c.as_str().parse::<Collection>().unwrap(), c);
        }
        assert!(matches!(
            "users".parse::<Collection>(),
            Err(AppError::UnknownCollection(name)) if name == "users"
        ));
    }

    #[test]
    fn document_payload_must_be_an_object() {
        assert!(DocumentPayload { data: json!({"title": "Fest"}) }.ensure_object().is_ok());
        assert!(DocumentPayload { data: json!([1, 2]) }.ensure_object().is_err());
    }
}
