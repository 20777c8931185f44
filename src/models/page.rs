// src/models/page.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;

use crate::common::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Textarea,
    Image,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageField {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub default: Option<&'static str>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageSection {
    pub id: &'static str,
    pub title: &'static str,
    #[schema(value_type = Vec<PageField>)]
    pub fields: &'static [PageField],
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageDefinition {
    #[schema(example = "page_home")]
    pub id: &'static str,
    pub name: &'static str,
    /// Public route the page is rendered on.
    pub path: &'static str,
    pub description: &'static str,
    #[schema(value_type = Vec<PageSection>)]
    pub sections: &'static [PageSection],
}

const fn text(key: &'static str, label: &'static str, default: &'static str) -> PageField {
    PageField { key, label, kind: FieldKind::Text, default: Some(default) }
}

const fn textarea(key: &'static str, label: &'static str, default: &'static str) -> PageField {
    PageField { key, label, kind: FieldKind::Textarea, default: Some(default) }
}

const fn image(key: &'static str, label: &'static str) -> PageField {
    PageField { key, label, kind: FieldKind::Image, default: None }
}

pub static PAGES: &[PageDefinition] = &[
    PageDefinition {
        id: "page_home",
        name: "Home Page",
        path: "/",
        description: "Hero section, highlights, etc.",
        sections: &[
            PageSection {
                id: "hero",
                title: "Hero Section (Top)",
                fields: &[
                    text(
                        "hero_title",
                        "Main Headline",
                        "Education That Builds <span class=\"whitespace-nowrap\">Capable Professionals</span>",
                    ),
                    textarea(
                        "hero_desc",
                        "Description",
                        "Undergraduate Programs In Business Administration And Science Designed To Develop Practical Skills, Analytical Thinking, And Career Readiness.",
                    ),
                    image("hero_image", "Hero Image"),
                ],
            },
            PageSection {
                id: "about",
                title: "About Section",
                fields: &[
                    text("about_title", "Section Title", "About Institute"),
                    textarea(
                        "about_desc",
                        "Main Text",
                        "Our Institute Is Dedicated To Delivering Quality Education Through Well-Structured Academic Programs, Experienced Faculty, And A Student-Focused Learning Environment.",
                    ),
                ],
            },
            PageSection {
                id: "admission",
                title: "Admission Section",
                fields: &[
                    text("admission_title", "Section Title", "Your Admission Journey"),
                    image("admission_image", "Steps Image"),
                ],
            },
        ],
    },
    PageDefinition {
        id: "page_about",
        name: "About Us",
        path: "/about",
        description: "Mission, history, principal message.",
        sections: &[PageSection {
            id: "main",
            title: "Main Content",
            fields: &[
                text("title", "Page Title", "About Us"),
                textarea("description", "Description", "PVM College is..."),
            ],
        }],
    },
    PageDefinition {
        id: "page_contact",
        name: "Contact Page",
        path: "/contact",
        description: "Address, map link, emails.",
        sections: &[],
    },
    PageDefinition {
        id: "page_admissions",
        name: "Admissions",
        path: "/admissions",
        description: "Process, requirements.",
        sections: &[],
    },
    PageDefinition {
        id: "page_academics",
        name: "Academics",
        path: "/academics",
        description: "Course details overview.",
        sections: &[],
    },
];

pub fn find_page(page_id: &str) -> Result<&'static PageDefinition, AppError> {
    PAGES
        .iter()
        .find(|page| page.id == page_id)
        .ok_or_else(|| AppError::UnknownPage(page_id.to_string()))
}

impl PageDefinition {
    /// Text fields get their default (or ""); image fields share an empty `images` object.
    pub fn defaults(&self) -> Value {
        let mut doc = Map::new();
        for field in self.sections.iter().flat_map(|s| s.fields.iter()) {
            match field.kind {
                FieldKind::Image => {
                    doc.entry("images").or_insert_with(|| Value::Object(Map::new()));
                }
                FieldKind::Text | FieldKind::Textarea => {
                    doc.insert(field.key.to_string(), Value::String(field.default.unwrap_or_default().to_string()));
                }
            }
        }
        Value::Object(doc)
    }
}

/// Top-level merge: keys in `patch` replace keys in `base`, other keys are kept.
/// A non-object `base` is replaced outright.
pub fn shallow_merge(base: Value, patch: Map<String, Value>) -> Value {
    let mut merged = match base {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    merged.extend(patch);
    Value::Object(merged)
}

#[derive(Debug, Clone, FromRow)]
pub struct StoredPage {
    pub page_id: String,
    pub content: Json<Value>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageContentResponse {
    pub page_id: String,
    #[schema(value_type = Object)]
    pub content: Value,
    /// `false` when the content shown is the built-in defaults.
    pub stored: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn home_defaults_cover_text_fields_and_images() {
        let defaults = find_page("page_home").unwrap().defaults();
        assert_eq!(defaults["about_title"], "About Institute");
        assert_eq!(defaults["admission_title"], "Your Admission Journey");
        assert_eq!(defaults["images"], json!({}));
        assert!(defaults.get("hero_image").is_none());
    }

    #[test]
    fn pages_without_fields_default_to_empty_object() {
        assert_eq!(find_page("page_contact").unwrap().defaults(), json!({}));
    }

    #[test]
    fn unknown_page_is_rejected() {
        assert!(matches!(find_page("page_secret"), Err(AppError::UnknownPage(_))));
    }

    #[test]
    fn merge_replaces_only_submitted_keys() {
        let stored = json!({ "title": "About", "description": "Old", "images": { "hero": "a.png" } });
        let patch = json!({ "description": "New", "images": { "logo": "b.png" } });
        let Value::Object(patch) = patch else { unreachable!() };

        let merged = shallow_merge(stored, patch);
        assert_eq!(merged["title"], "About");
        assert_eq!(merged["description"], "New");
        // Shallow: nested objects are replaced whole
        assert_eq!(merged["images"], json!({ "logo": "b.png" }));
    }

    #[test]
    fn merge_onto_non_object_starts_fresh() {
        let Value::Object(patch) = json!({ "a": 1 }) else { unreachable!() };
        assert_eq!(shallow_merge(Value::Null, patch), json!({ "a": 1 }));
    }
}
