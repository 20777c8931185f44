// src/db/page_repo.rs

use serde_json::{Map, Value};
use sqlx::{types::Json, PgPool};

use crate::{common::error::AppError, models::page::StoredPage};

#[derive(Clone)]
pub struct PageRepository {
    pool: PgPool,
}

impl PageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, page_id: &str) -> Result<Option<StoredPage>, AppError> {
        let page = sqlx::query_as::<_, StoredPage>(
            "SELECT page_id, content, updated_at FROM page_content WHERE page_id = $1",
        )
        .bind(page_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(page)
    }

    /// Shallow merge in place: `jsonb || jsonb` replaces top-level keys only.
    pub async fn merge(&self, page_id: &str, patch: Map<String, Value>) -> Result<StoredPage, AppError> {
        let page = sqlx::query_as::<_, StoredPage>(
            r#"
            INSERT INTO page_content (page_id, content)
            VALUES ($1, $2)
            ON CONFLICT (page_id) DO UPDATE SET
                content = page_content.content || EXCLUDED.content,
                updated_at = NOW()
            RETURNING page_id, content, updated_at
            "#,
        )
        .bind(page_id)
        .bind(Json(Value::Object(patch)))
        .fetch_one(&self.pool)
        .await?;
        Ok(page)
    }
}
