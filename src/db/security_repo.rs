// src/db/security_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{types::Json, PgPool};

use crate::{
    common::error::AppError,
    models::security::{SecurityBlock, SecurityConfig, SecuritySettings, SystemLog},
};

#[derive(Clone)]
pub struct SecurityRepository {
    pool: PgPool,
}

impl SecurityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // --- Lockout state ---

    pub async fn find_block(&self, client_key: &str) -> Result<Option<SecurityBlock>, AppError> {
        let block = sqlx::query_as::<_, SecurityBlock>(
            "SELECT client_key, failures, blocked_until, reason, updated_at FROM security_blocks WHERE client_key = $1",
        )
        .bind(client_key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(block)
    }

    /// Counts one more failure in place and returns the new total. A block
    /// that has run out is dropped and the count starts again from one.
    pub async fn increment_failures(&self, client_key: &str) -> Result<i32, AppError> {
        let failures = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO security_blocks (client_key, failures)
            VALUES ($1, 1)
            ON CONFLICT (client_key) DO UPDATE SET
                failures = CASE
                    WHEN security_blocks.blocked_until IS NOT NULL AND security_blocks.blocked_until <= NOW() THEN 1
                    ELSE security_blocks.failures + 1
                END,
                blocked_until = CASE
                    WHEN security_blocks.blocked_until <= NOW() THEN NULL
                    ELSE security_blocks.blocked_until
                END,
                reason = CASE
                    WHEN security_blocks.blocked_until <= NOW() THEN NULL
                    ELSE security_blocks.reason
                END,
                updated_at = NOW()
            RETURNING failures
            "#,
        )
        .bind(client_key)
        .fetch_one(&self.pool)
        .await?;
        Ok(failures)
    }

    /// Sets the block on a client whose failures are already counted.
    pub async fn block(&self, client_key: &str, until: DateTime<Utc>, reason: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO security_blocks (client_key, failures, blocked_until, reason)
            VALUES ($1, 1, $2, $3)
            ON CONFLICT (client_key) DO UPDATE SET
                blocked_until = EXCLUDED.blocked_until,
                reason = EXCLUDED.reason,
                updated_at = NOW()
            "#,
        )
        .bind(client_key)
        .bind(until)
        .bind(reason)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn clear(&self, client_key: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM security_blocks WHERE client_key = $1")
            .bind(client_key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // --- Security settings document ---

    /// Reads the settings, creating the default document on first access.
    pub async fn get_or_init_settings(&self) -> Result<SecuritySettings, AppError> {
        sqlx::query("INSERT INTO security_settings (id, is_active, config) VALUES (1, FALSE, $1) ON CONFLICT (id) DO NOTHING")
            .bind(Json(SecurityConfig::default()))
            .execute(&self.pool)
            .await?;

        let settings = sqlx::query_as::<_, SecuritySettings>(
            "SELECT is_active, config, updated_at FROM security_settings WHERE id = 1",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(settings)
    }

    pub async fn update_settings(
        &self,
        is_active: Option<bool>,
        config: Option<SecurityConfig>,
    ) -> Result<SecuritySettings, AppError> {
        self.get_or_init_settings().await?;

        let settings = sqlx::query_as::<_, SecuritySettings>(
            r#"
            UPDATE security_settings SET
                is_active = COALESCE($1, is_active),
                config = COALESCE($2, config),
                updated_at = NOW()
            WHERE id = 1
            RETURNING is_active, config, updated_at
            "#,
        )
        .bind(is_active)
        .bind(config.map(Json))
        .fetch_one(&self.pool)
        .await?;
        Ok(settings)
    }

    /// Flips `is_active` atomically.
    pub async fn toggle(&self) -> Result<SecuritySettings, AppError> {
        self.get_or_init_settings().await?;

        let settings = sqlx::query_as::<_, SecuritySettings>(
            r#"
            UPDATE security_settings SET is_active = NOT is_active, updated_at = NOW()
            WHERE id = 1
            RETURNING is_active, config, updated_at
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(settings)
    }

    // --- System log ---

    pub async fn log(&self, level: &str, source: &str, message: &str) -> Result<(), AppError> {
        sqlx::query("INSERT INTO system_logs (level, source, message) VALUES ($1, $2, $3)")
            .bind(level)
            .bind(source)
            .bind(message)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn recent_logs(&self, limit: i64) -> Result<Vec<SystemLog>, AppError> {
        let logs = sqlx::query_as::<_, SystemLog>(
            "SELECT id, level, source, message, created_at FROM system_logs ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(logs)
    }
}
