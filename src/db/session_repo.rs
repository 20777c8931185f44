// src/db/session_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::session::{AdminSession, DeviceDescriptor, SessionStatus},
};

const SESSION_COLUMNS: &str = "id, user_id, email, device, browser, os, ip, location, user_agent, \
                               status, created_at, last_active, revoked_at, revoked_by";

/// Where a login came from.
pub struct NewSession<'a> {
    pub user_id: Uuid,
    pub email: &'a str,
    pub descriptor: DeviceDescriptor,
    pub ip: &'a str,
    pub location: &'a str,
    pub user_agent: Option<&'a str>,
}

#[derive(Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(&self, executor: E, new: NewSession<'_>) -> Result<AdminSession, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO admin_sessions (user_id, email, device, browser, os, ip, location, user_agent)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {SESSION_COLUMNS}
            "#
        );
        let session = sqlx::query_as::<_, AdminSession>(&sql)
            .bind(new.user_id)
            .bind(new.email)
            .bind(new.descriptor.device)
            .bind(new.descriptor.browser)
            .bind(new.descriptor.os)
            .bind(new.ip)
            .bind(new.location)
            .bind(new.user_agent)
            .fetch_one(executor)
            .await?;
        Ok(session)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<AdminSession>, AppError> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM admin_sessions WHERE id = $1");
        let session = sqlx::query_as::<_, AdminSession>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(session)
    }

    /// The latest sessions by creation time; revoked ones are dropped after the limit is applied.
    pub async fn list_recent_active(&self, limit: i64) -> Result<Vec<AdminSession>, AppError> {
        let sql = format!(
            r#"
            SELECT * FROM (
                SELECT {SESSION_COLUMNS} FROM admin_sessions
                ORDER BY created_at DESC
                LIMIT $1
            ) recent
            WHERE status = $2
            ORDER BY created_at DESC
            "#
        );
        let sessions = sqlx::query_as::<_, AdminSession>(&sql)
            .bind(limit)
            .bind(SessionStatus::Active)
            .fetch_all(&self.pool)
            .await?;
        Ok(sessions)
    }

    /// Marks an active session revoked. `false` when it was unknown or already revoked.
    pub async fn revoke(&self, id: Uuid, revoked_by: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE admin_sessions
            SET status = $2, revoked_at = NOW(), revoked_by = $3
            WHERE id = $1 AND status = $4
            "#,
        )
        .bind(id)
        .bind(SessionStatus::Revoked)
        .bind(revoked_by)
        .bind(SessionStatus::Active)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Heartbeat; only written when the stored value is older than `stale_before`.
    pub async fn touch(&self, id: Uuid, stale_before: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query("UPDATE admin_sessions SET last_active = NOW() WHERE id = $1 AND last_active < $2")
            .bind(id)
            .bind(stale_before)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
