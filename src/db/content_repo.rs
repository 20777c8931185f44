// src/db/content_repo.rs

use serde_json::Value;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::content::{Collection, CollectionScope, ContentDocument},
};

const DOCUMENT_COLUMNS: &str = "id, collection, data, created_at, updated_at";
// `$3` is the scope's category list, NULL for the whole collection
const SCOPE_CLAUSE_3: &str = "($3::TEXT[] IS NULL OR data->>'category' = ANY($3))";

#[derive(Clone)]
pub struct ContentRepository {
    pool: PgPool,
}

impl ContentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Newest first, optionally narrowed to one `category`.
    pub async fn list(
        &self,
        collection: Collection,
        scope: &CollectionScope,
        category: Option<&str>,
    ) -> Result<Vec<ContentDocument>, AppError> {
        let sql = format!(
            r#"
            SELECT {DOCUMENT_COLUMNS} FROM content_documents
            WHERE collection = $1 AND ($2::TEXT IS NULL OR data->>'category' = $2) AND {SCOPE_CLAUSE_3}
            ORDER BY created_at DESC
            "#
        );
        let docs = sqlx::query_as::<_, ContentDocument>(&sql)
            .bind(collection.as_str())
            .bind(category)
            .bind(scope.categories())
            .fetch_all(&self.pool)
            .await?;
        Ok(docs)
    }

    /// Events for the public highlights strip, ordered by their own `date` field.
    pub async fn latest_by_date(&self, collection: Collection, limit: i64) -> Result<Vec<ContentDocument>, AppError> {
        let sql = format!(
            r#"
            SELECT {DOCUMENT_COLUMNS} FROM content_documents
            WHERE collection = $1
            ORDER BY data->>'date' DESC NULLS LAST, created_at DESC
            LIMIT $2
            "#
        );
        let docs = sqlx::query_as::<_, ContentDocument>(&sql)
            .bind(collection.as_str())
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(docs)
    }

    pub async fn find(
        &self,
        collection: Collection,
        scope: &CollectionScope,
        id: Uuid,
    ) -> Result<Option<ContentDocument>, AppError> {
        let sql = format!(
            "SELECT {DOCUMENT_COLUMNS} FROM content_documents WHERE collection = $1 AND id = $2 AND {SCOPE_CLAUSE_3}"
        );
        let doc = sqlx::query_as::<_, ContentDocument>(&sql)
            .bind(collection.as_str())
            .bind(id)
            .bind(scope.categories())
            .fetch_optional(&self.pool)
            .await?;
        Ok(doc)
    }

    pub async fn create(&self, collection: Collection, data: Value) -> Result<ContentDocument, AppError> {
        let sql = format!(
            "INSERT INTO content_documents (collection, data) VALUES ($1, $2) RETURNING {DOCUMENT_COLUMNS}"
        );
        let doc = sqlx::query_as::<_, ContentDocument>(&sql)
            .bind(collection.as_str())
            .bind(Json(data))
            .fetch_one(&self.pool)
            .await?;
        Ok(doc)
    }

    /// Replaces the document body. Documents outside `scope` are left alone.
    pub async fn update(
        &self,
        collection: Collection,
        scope: &CollectionScope,
        id: Uuid,
        data: Value,
    ) -> Result<Option<ContentDocument>, AppError> {
        let sql = format!(
            r#"
            UPDATE content_documents SET data = $4, updated_at = NOW()
            WHERE collection = $1 AND id = $2 AND {SCOPE_CLAUSE_3}
            RETURNING {DOCUMENT_COLUMNS}
            "#
        );
        let doc = sqlx::query_as::<_, ContentDocument>(&sql)
            .bind(collection.as_str())
            .bind(id)
            .bind(scope.categories())
            .bind(Json(data))
            .fetch_optional(&self.pool)
            .await?;
        Ok(doc)
    }

    pub async fn delete(&self, collection: Collection, scope: &CollectionScope, id: Uuid) -> Result<bool, AppError> {
        let sql = format!("DELETE FROM content_documents WHERE collection = $1 AND id = $2 AND {SCOPE_CLAUSE_3}");
        let result = sqlx::query(&sql)
            .bind(collection.as_str())
            .bind(id)
            .bind(scope.categories())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
