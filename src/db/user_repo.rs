// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{Account, AdminProfile},
};

// Accounts (identity) and admin profiles (role + permissions)
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // --- Accounts ---

    pub async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, email, password_hash, email_verified, created_at, updated_at
            FROM accounts
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    pub async fn create_account<'e, E>(
        &self,
        executor: E,
        email: &str,
        password_hash: &str,
        email_verified: bool,
    ) -> Result<Account, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (email, password_hash, email_verified)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, email_verified, created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(email_verified)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() && db_err.constraint() == Some("accounts_email_key") {
                    return AppError::EmailAlreadyExists;
                }
            }
            e.into()
        })
    }

    // --- Profiles ---

    pub async fn find_profile(&self, user_id: Uuid) -> Result<Option<AdminProfile>, AppError> {
        let profile = sqlx::query_as::<_, AdminProfile>(
            r#"
            SELECT user_id, email, role, permissions, created_at, updated_at
            FROM admin_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    pub async fn list_profiles(&self) -> Result<Vec<AdminProfile>, AppError> {
        let profiles = sqlx::query_as::<_, AdminProfile>(
            r#"
            SELECT user_id, email, role, permissions, created_at, updated_at
            FROM admin_profiles
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(profiles)
    }

    /// Insert or replace the profile document for an account.
    pub async fn upsert_profile<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        email: &str,
        role: &str,
        permissions: &[String],
    ) -> Result<AdminProfile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let profile = sqlx::query_as::<_, AdminProfile>(
            r#"
            INSERT INTO admin_profiles (user_id, email, role, permissions)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE SET
                email = EXCLUDED.email,
                role = EXCLUDED.role,
                permissions = EXCLUDED.permissions,
                updated_at = NOW()
            RETURNING user_id, email, role, permissions, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(email)
        .bind(role)
        .bind(permissions)
        .fetch_one(executor)
        .await?;
        Ok(profile)
    }

    /// Partial update; `None` keeps the stored value.
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        role: Option<&str>,
        permissions: Option<&[String]>,
    ) -> Result<Option<AdminProfile>, AppError> {
        let profile = sqlx::query_as::<_, AdminProfile>(
            r#"
            UPDATE admin_profiles SET
                role = COALESCE($2, role),
                permissions = COALESCE($3, permissions),
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING user_id, email, role, permissions, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(role)
        .bind(permissions)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    /// Removes the profile only; the account stays so the holder can be restored.
    pub async fn delete_profile(&self, user_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM admin_profiles WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
