// src/db/news_repo.rs

use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::news::{ModerationAction, News, NewsFormPayload, NewsStatus, Submitter, SYSTEM_MIGRATION},
};

const NEWS_COLUMNS: &str = "id, title, content, category, image_url, submitted_by, status, submitted_at, \
                            approved_by, approved_at, rejected_by, rejected_at, updated_at";

/// Everything needed to store a new article.
pub struct NewNews<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub category: &'a str,
    pub image_url: Option<&'a str>,
    pub submitted_by: Submitter,
    pub status: NewsStatus,
    /// Set for admin-authored articles, which skip the queue.
    pub approved_by: Option<&'a str>,
}

#[derive(Clone)]
pub struct NewsRepository {
    pool: PgPool,
}

impl NewsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: NewNews<'_>) -> Result<News, AppError> {
        let sql = format!(
            r#"
            INSERT INTO news (title, content, category, image_url, submitted_by, status, submitted_at,
                              approved_by, approved_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW(), $7, CASE WHEN $7::TEXT IS NULL THEN NULL ELSE NOW() END)
            RETURNING {NEWS_COLUMNS}
            "#
        );
        let news = sqlx::query_as::<_, News>(&sql)
            .bind(new.title)
            .bind(new.content)
            .bind(new.category)
            .bind(new.image_url)
            .bind(Json(new.submitted_by))
            .bind(new.status)
            .bind(new.approved_by)
            .fetch_one(&self.pool)
            .await?;
        Ok(news)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<News>, AppError> {
        let sql = format!("SELECT {NEWS_COLUMNS} FROM news WHERE id = $1");
        let news = sqlx::query_as::<_, News>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(news)
    }

    /// Moderation queue view; rows without a timestamp go last.
    pub async fn list_by_status(&self, status: NewsStatus) -> Result<Vec<News>, AppError> {
        let sql = format!(
            "SELECT {NEWS_COLUMNS} FROM news WHERE status = $1 ORDER BY submitted_at DESC NULLS LAST"
        );
        let news = sqlx::query_as::<_, News>(&sql)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;
        Ok(news)
    }

    /// Approved articles for the public site.
    pub async fn list_published(&self, category: Option<&str>, limit: i64) -> Result<Vec<News>, AppError> {
        let sql = format!(
            r#"
            SELECT {NEWS_COLUMNS} FROM news
            WHERE status = $1 AND ($2::TEXT IS NULL OR category = $2)
            ORDER BY COALESCE(approved_at, submitted_at) DESC NULLS LAST
            LIMIT $3
            "#
        );
        let news = sqlx::query_as::<_, News>(&sql)
            .bind(NewsStatus::Approved)
            .bind(category)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(news)
    }

    /// Edits the text fields only; moderation fields are untouched.
    pub async fn update(&self, id: Uuid, input: &NewsFormPayload) -> Result<Option<News>, AppError> {
        let sql = format!(
            r#"
            UPDATE news SET title = $2, content = $3, category = $4, image_url = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING {NEWS_COLUMNS}
            "#
        );
        let news = sqlx::query_as::<_, News>(&sql)
            .bind(id)
            .bind(&input.title)
            .bind(&input.content)
            .bind(&input.category)
            .bind(input.image_url.as_deref())
            .fetch_optional(&self.pool)
            .await?;
        Ok(news)
    }

    /// Sets the status from any current state, stamping who did it.
    pub async fn moderate(&self, id: Uuid, action: ModerationAction, moderator: &str) -> Result<Option<News>, AppError> {
        let sql = match action {
            ModerationAction::Approve => format!(
                "UPDATE news SET status = $2, approved_by = $3, approved_at = NOW(), updated_at = NOW() \
                 WHERE id = $1 RETURNING {NEWS_COLUMNS}"
            ),
            ModerationAction::Reject => format!(
                "UPDATE news SET status = $2, rejected_by = $3, rejected_at = NOW(), updated_at = NOW() \
                 WHERE id = $1 RETURNING {NEWS_COLUMNS}"
            ),
        };
        let news = sqlx::query_as::<_, News>(&sql)
            .bind(id)
            .bind(action.target_status())
            .bind(moderator)
            .fetch_optional(&self.pool)
            .await?;
        Ok(news)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM news WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Approves every legacy row that has no status.
    pub async fn restore_legacy(&self) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE news SET status = $1, approved_by = $2, approved_at = NOW(), updated_at = NOW()
            WHERE status IS NULL
            "#,
        )
        .bind(NewsStatus::Approved)
        .bind(SYSTEM_MIGRATION)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
