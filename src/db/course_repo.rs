// src/db/course_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::course::{Course, CoursePayload},
};

const COURSE_COLUMNS: &str =
    "id, name, code, duration, eligibility, seats, fees, description, image, created_at, updated_at";

#[derive(Clone)]
pub struct CourseRepository {
    pool: PgPool,
}

impl CourseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Newest first. `pattern` is an `ILIKE` pattern matched on name or code.
    pub async fn list(&self, pattern: Option<&str>) -> Result<Vec<Course>, AppError> {
        let sql = format!(
            r#"
            SELECT {COURSE_COLUMNS} FROM courses
            WHERE $1::TEXT IS NULL OR name ILIKE $1 OR code ILIKE $1
            ORDER BY created_at DESC
            "#
        );
        let courses = sqlx::query_as::<_, Course>(&sql)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;
        Ok(courses)
    }

    pub async fn create(&self, input: &CoursePayload) -> Result<Course, AppError> {
        let sql = format!(
            r#"
            INSERT INTO courses (name, code, duration, eligibility, seats, fees, description, image)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {COURSE_COLUMNS}
            "#
        );
        let course = sqlx::query_as::<_, Course>(&sql)
            .bind(&input.name)
            .bind(&input.code)
            .bind(&input.duration)
            .bind(&input.eligibility)
            .bind(input.seats)
            .bind(&input.fees)
            .bind(&input.description)
            .bind(input.image.as_deref())
            .fetch_one(&self.pool)
            .await?;
        Ok(course)
    }

    pub async fn update(&self, id: Uuid, input: &CoursePayload) -> Result<Option<Course>, AppError> {
        let sql = format!(
            r#"
            UPDATE courses SET
                name = $2, code = $3, duration = $4, eligibility = $5, seats = $6,
                fees = $7, description = $8, image = $9, updated_at = NOW()
            WHERE id = $1
            RETURNING {COURSE_COLUMNS}
            "#
        );
        let course = sqlx::query_as::<_, Course>(&sql)
            .bind(id)
            .bind(&input.name)
            .bind(&input.code)
            .bind(&input.duration)
            .bind(&input.eligibility)
            .bind(input.seats)
            .bind(&input.fees)
            .bind(&input.description)
            .bind(input.image.as_deref())
            .fetch_optional(&self.pool)
            .await?;
        Ok(course)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
