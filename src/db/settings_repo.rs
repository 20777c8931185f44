// src/db/settings_repo.rs

use std::collections::BTreeMap;

use sqlx::{types::Json, PgPool};

use crate::{common::error::AppError, models::settings::SiteSettings};

const SETTINGS_COLUMNS: &str = "site_name, site_email, site_phone, site_address, facebook, twitter, \
                                instagram, linkedin, youtube, hero_title, hero_subtitle, hero_cta, \
                                maintenance_mode, section_visibility, updated_at";

#[derive(Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The stored settings, or the shipped defaults while nothing was saved.
    pub async fn get(&self) -> Result<SiteSettings, AppError> {
        let sql = format!("SELECT {SETTINGS_COLUMNS} FROM site_settings WHERE id = 1");
        let settings = sqlx::query_as::<_, SiteSettings>(&sql)
            .fetch_optional(&self.pool)
            .await?;
        Ok(settings.unwrap_or_default())
    }

    /// Writes the whole row (UPSERT).
    pub async fn save(&self, s: &SiteSettings) -> Result<SiteSettings, AppError> {
        let sql = format!(
            r#"
            INSERT INTO site_settings (id, site_name, site_email, site_phone, site_address,
                facebook, twitter, instagram, linkedin, youtube,
                hero_title, hero_subtitle, hero_cta, maintenance_mode, section_visibility)
            VALUES (1, $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (id) DO UPDATE SET
                site_name = EXCLUDED.site_name,
                site_email = EXCLUDED.site_email,
                site_phone = EXCLUDED.site_phone,
                site_address = EXCLUDED.site_address,
                facebook = EXCLUDED.facebook,
                twitter = EXCLUDED.twitter,
                instagram = EXCLUDED.instagram,
                linkedin = EXCLUDED.linkedin,
                youtube = EXCLUDED.youtube,
                hero_title = EXCLUDED.hero_title,
                hero_subtitle = EXCLUDED.hero_subtitle,
                hero_cta = EXCLUDED.hero_cta,
                maintenance_mode = EXCLUDED.maintenance_mode,
                section_visibility = EXCLUDED.section_visibility,
                updated_at = NOW()
            RETURNING {SETTINGS_COLUMNS}
            "#
        );
        let saved = sqlx::query_as::<_, SiteSettings>(&sql)
            .bind(&s.site_name)
            .bind(&s.site_email)
            .bind(&s.site_phone)
            .bind(&s.site_address)
            .bind(s.facebook.as_deref())
            .bind(s.twitter.as_deref())
            .bind(s.instagram.as_deref())
            .bind(s.linkedin.as_deref())
            .bind(s.youtube.as_deref())
            .bind(&s.hero_title)
            .bind(&s.hero_subtitle)
            .bind(&s.hero_cta)
            .bind(s.maintenance_mode)
            .bind(&s.section_visibility)
            .fetch_one(&self.pool)
            .await?;
        Ok(saved)
    }

    /// Merges section flags into the stored map, creating the row from defaults when needed.
    pub async fn merge_visibility(&self, flags: BTreeMap<String, bool>) -> Result<SiteSettings, AppError> {
        if self.exists().await? {
            let sql = format!(
                r#"
                UPDATE site_settings SET section_visibility = section_visibility || $1, updated_at = NOW()
                WHERE id = 1
                RETURNING {SETTINGS_COLUMNS}
                "#
            );
            let settings = sqlx::query_as::<_, SiteSettings>(&sql)
                .bind(Json(flags))
                .fetch_one(&self.pool)
                .await?;
            return Ok(settings);
        }

        let mut settings = SiteSettings::default();
        settings.section_visibility.0.extend(flags);
        self.save(&settings).await
    }

    async fn exists(&self) -> Result<bool, AppError> {
        let found: Option<i16> = sqlx::query_scalar("SELECT id FROM site_settings WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }
}
