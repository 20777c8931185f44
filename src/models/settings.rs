// src/models/settings.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use validator::Validate;

use crate::common::error::AppError;

/// Home-page blocks that can be hidden from the public site.
pub const SECTIONS: &[&str] = &[
    "homeHero",
    "featureCards",
    "aboutSection",
    "academicsSnapshot",
    "admissionJourney",
    "eventHighlights",
    "topStudents",
];

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    #[schema(example = "PVM BCA College")]
    pub site_name: String,
    #[schema(example = "info@pvmbca.edu")]
    pub site_email: String,
    #[schema(example = "+91 1234567890")]
    pub site_phone: String,
    pub site_address: String,

    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub instagram: Option<String>,
    pub linkedin: Option<String>,
    pub youtube: Option<String>,

    #[schema(example = "Transform Your Future with Quality Education")]
    pub hero_title: String,
    pub hero_subtitle: String,
    #[schema(example = "Apply Now")]
    #[serde(rename = "heroCTA")]
    pub hero_cta: String,

    pub maintenance_mode: bool,
    #[serde(skip)]
    pub section_visibility: Json<BTreeMap<String, bool>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            site_name: "PVM BCA College".into(),
            site_email: "info@pvmbca.edu".into(),
            site_phone: "+91 1234567890".into(),
            site_address: "College Address, City, State - 123456".into(),
            facebook: Some("https://facebook.com/pvmbca".into()),
            twitter: Some("https://twitter.com/pvmbca".into()),
            instagram: Some("https://instagram.com/pvmbca".into()),
            linkedin: Some("https://linkedin.com/company/pvmbca".into()),
            youtube: Some("https://youtube.com/pvmbca".into()),
            hero_title: "Transform Your Future with Quality Education".into(),
            hero_subtitle: "Join India's Leading BCA College".into(),
            hero_cta: "Apply Now".into(),
            maintenance_mode: false,
            section_visibility: Json(BTreeMap::new()),
            updated_at: None,
        }
    }
}

impl SiteSettings {
    /// Every known section with its flag. Sections never toggled are visible.
    pub fn visibility(&self) -> BTreeMap<String, bool> {
        SECTIONS
            .iter()
            .map(|s| (s.to_string(), self.section_visibility.get(*s).copied().unwrap_or(true)))
            .collect()
    }

    /// Applies a form submission; absent fields keep their value.
    pub fn apply(&mut self, input: UpdateSiteSettingsPayload) {
        let UpdateSiteSettingsPayload {
            site_name,
            site_email,
            site_phone,
            site_address,
            facebook,
            twitter,
            instagram,
            linkedin,
            youtube,
            hero_title,
            hero_subtitle,
            hero_cta,
            maintenance_mode,
        } = input;

        if let Some(v) = site_name { self.site_name = v; }
        if let Some(v) = site_email { self.site_email = v; }
        if let Some(v) = site_phone { self.site_phone = v; }
        if let Some(v) = site_address { self.site_address = v; }
        if let Some(v) = hero_title { self.hero_title = v; }
        if let Some(v) = hero_subtitle { self.hero_subtitle = v; }
        if let Some(v) = hero_cta { self.hero_cta = v; }
        if let Some(v) = maintenance_mode { self.maintenance_mode = v; }

        // Social links: an empty string clears the link
        for (slot, value) in [
            (&mut self.facebook, facebook),
            (&mut self.twitter, twitter),
            (&mut self.instagram, instagram),
            (&mut self.linkedin, linkedin),
            (&mut self.youtube, youtube),
        ] {
            if let Some(v) = value {
                *slot = if v.trim().is_empty() { None } else { Some(v) };
            }
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSiteSettingsPayload {
    #[validate(length(min = 1, message = "Site name cannot be empty."))]
    pub site_name: Option<String>,
    #[validate(email(message = "The e-mail provided is invalid."))]
    pub site_email: Option<String>,
    pub site_phone: Option<String>,
    pub site_address: Option<String>,
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub instagram: Option<String>,
    pub linkedin: Option<String>,
    pub youtube: Option<String>,
    pub hero_title: Option<String>,
    pub hero_subtitle: Option<String>,
    #[serde(rename = "heroCTA")]
    pub hero_cta: Option<String>,
    pub maintenance_mode: Option<bool>,
}

/// Partial map of section flags; unknown section names are rejected.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateVisibilityPayload(pub BTreeMap<String, bool>);

impl UpdateVisibilityPayload {
    pub fn validated(self) -> Result<BTreeMap<String, bool>, AppError> {
        if let Some(unknown) = self.0.keys().find(|k| !SECTIONS.contains(&k.as_str())) {
            tracing::debug!("Rejecting visibility update for unknown section '{}'", unknown);
            return Err(AppError::invalid_field("sections", "unknown_section", "Unknown section name."));
        }
        Ok(self.0)
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityResponse {
    pub sections: BTreeMap<String, bool>,
}

/// What the public site needs before rendering anything.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicSiteResponse {
    pub settings: SiteSettings,
    pub sections: BTreeMap<String, bool>,
    pub maintenance_mode: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untouched_sections_are_visible() {
        let mut settings = SiteSettings::default();
        settings.section_visibility.0.insert("aboutSection".into(), false);

        let visibility = settings.visibility();
        assert_eq!(visibility.len(), SECTIONS.len());
        assert_eq!(visibility["aboutSection"], false);
        assert_eq!(visibility["homeHero"], true);
    }

    #[test]
    fn apply_keeps_absent_fields_and_clears_blank_links() {
        let mut settings = SiteSettings::default();
        settings.apply(UpdateSiteSettingsPayload {
            hero_cta: Some("Enquire".into()),
            twitter: Some("  ".into()),
            maintenance_mode: Some(true),
            ..Default::default()
        });

        assert_eq!(settings.hero_cta, "Enquire");
        assert_eq!(settings.site_name, "PVM BCA College");
        assert_eq!(settings.twitter, None);
        assert!(settings.facebook.is_some());
        assert!(settings.maintenance_mode);
    }

    #[test]
    fn unknown_sections_are_rejected() {
        let ok = UpdateVisibilityPayload(BTreeMap::from([("topStudents".to_string(), false)]));
        assert!(ok.validated().is_ok());

        let bad = UpdateVisibilityPayload(BTreeMap::from([("footer".to_string(), false)]));
        assert!(matches!(bad.validated(), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn hero_cta_keeps_its_public_name() {
        let json = serde_json::to_value(SiteSettings::default()).unwrap();
        assert_eq!(json["heroCTA"], "Apply Now");
        assert!(json.get("sectionVisibility").is_none());
    }
}
