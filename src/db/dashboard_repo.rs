// src/db/dashboard_repo.rs

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::{
        content::{Collection, CATEGORY_SPORTS, CATEGORY_WORKSHOP},
        dashboard::{DashboardCounts, RecentActivity},
    },
};

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // 1. Cards (one statement, so the counts come from the same snapshot)
    pub async fn counts(&self) -> Result<DashboardCounts, AppError> {
        let counts = sqlx::query_as::<_, DashboardCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM content_documents WHERE collection = 'events') AS events,
                (SELECT COUNT(*) FROM content_documents
                    WHERE collection = 'events' AND data->>'category' = $1) AS sports,
                (SELECT COUNT(*) FROM content_documents
                    WHERE collection = 'events' AND data->>'category' = $2) AS workshops,
                (SELECT COUNT(*) FROM news) AS news,
                (SELECT COUNT(*) FROM content_documents WHERE collection = 'students') AS students,
                (SELECT COUNT(*) FROM admin_profiles) AS users
            "#,
        )
        .bind(CATEGORY_SPORTS)
        .bind(CATEGORY_WORKSHOP)
        .fetch_one(&self.pool)
        .await?;
        Ok(counts)
    }

    // 2. Latest events by creation time
    pub async fn recent_events(&self, limit: i64) -> Result<Vec<RecentActivity>, AppError> {
        let rows = sqlx::query_as::<_, RecentActivity>(
            r#"
            SELECT id, COALESCE(data->>'title', '(untitled)') AS title, created_at AS at
            FROM content_documents
            WHERE collection = 'events'
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // 3. Latest news by submission time
    pub async fn recent_news(&self, limit: i64) -> Result<Vec<RecentActivity>, AppError> {
        let rows = sqlx::query_as::<_, RecentActivity>(
            r#"
            SELECT id, title, submitted_at AS at
            FROM news
            ORDER BY submitted_at DESC NULLS LAST
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // --- System health ---

    /// Round-trip time of a trivial query. `None` when the database didn't answer.
    pub async fn ping(&self) -> Option<Duration> {
        let start = Instant::now();
        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => Some(start.elapsed()),
            Err(e) => {
                tracing::warn!("Database ping failed: {}", e);
                None
            }
        }
    }

    pub async fn collection_counts(&self) -> Result<BTreeMap<String, i64>, AppError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT collection, COUNT(*) FROM content_documents GROUP BY collection
            UNION ALL SELECT 'news', COUNT(*) FROM news
            UNION ALL SELECT 'courses', COUNT(*) FROM courses
            UNION ALL SELECT 'users', COUNT(*) FROM admin_profiles
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        // Empty collections don't show up in GROUP BY
        let mut counts: BTreeMap<String, i64> =
            Collection::ALL.iter().map(|c| (c.as_str().to_string(), 0)).collect();
        counts.extend(rows);
        Ok(counts)
    }

    // --- Visits ---

    pub async fn total_visits(&self) -> Result<i64, AppError> {
        let total: Option<i64> = sqlx::query_scalar("SELECT total_visits FROM analytics_aggregate WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(total.unwrap_or(0))
    }

    pub async fn increment_visits(&self) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO analytics_aggregate (id, total_visits) VALUES (1, 1)
            ON CONFLICT (id) DO UPDATE SET
                total_visits = analytics_aggregate.total_visits + 1,
                updated_at = NOW()
            RETURNING total_visits
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }
}
