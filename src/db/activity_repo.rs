// src/db/activity_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::activity::{ActivityLog, NewActivity},
};

#[derive(Clone)]
pub struct ActivityRepository {
    pool: PgPool,
}

impl ActivityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn record<'e, E>(&self, executor: E, admin_email: &str, entry: &NewActivity) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("INSERT INTO admin_activity_logs (admin_email, action, target, details) VALUES ($1, $2, $3, $4)")
            .bind(admin_email)
            .bind(&entry.action)
            .bind(entry.target.as_deref())
            .bind(entry.details.as_deref())
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Best-effort write from a flow that must not fail because of the log.
    pub async fn record_quietly(&self, admin_email: &str, entry: NewActivity) {
        if let Err(e) = self.record(&self.pool, admin_email, &entry).await {
            tracing::warn!(action = %entry.action, "Failed to write activity log: {}", e);
        }
    }

    pub async fn recent(&self, limit: i64) -> Result<Vec<ActivityLog>, AppError> {
        let logs = sqlx::query_as::<_, ActivityLog>(
            r#"
            SELECT id, admin_email, action, target, details, created_at
            FROM admin_activity_logs
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(logs)
    }
}
