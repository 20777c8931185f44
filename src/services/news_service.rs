// src/services/news_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{news_repo::NewNews, NewsRepository, SettingsRepository},
    models::{
        auth::CurrentAdmin,
        news::{ModerationAction, News, NewsFormPayload, NewsStatus, SubmitNewsPayload, Submitter},
    },
};

pub const PUBLIC_NEWS_MAX: i64 = 50;

/// Public list size: defaults to the maximum, never above it.
pub fn clamp_public_limit(requested: Option<i64>) -> i64 {
    requested.unwrap_or(PUBLIC_NEWS_MAX).clamp(1, PUBLIC_NEWS_MAX)
}

#[derive(Clone)]
pub struct NewsService {
    repo: NewsRepository,
    settings_repo: SettingsRepository,
}

impl NewsService {
    pub fn new(repo: NewsRepository, settings_repo: SettingsRepository) -> Self {
        Self { repo, settings_repo }
    }

    /// Public submission. Always lands in the moderation queue.
    pub async fn submit(&self, mut payload: SubmitNewsPayload) -> Result<News, AppError> {
        payload.normalize();
        let news = self
            .repo
            .create(NewNews {
                title: &payload.title,
                content: &payload.content,
                category: &payload.category,
                image_url: payload.image_url.as_deref(),
                submitted_by: payload.submitted_by,
                status: NewsStatus::Pending,
                approved_by: None,
            })
            .await?;

        tracing::info!(news_id = %news.id, "News submitted for moderation");
        Ok(news)
    }

    /// Admin-authored article, published straight away under the college's name.
    pub async fn create_approved(&self, admin: &CurrentAdmin, mut payload: NewsFormPayload) -> Result<News, AppError> {
        payload.normalize();
        let site = self.settings_repo.get().await?;

        self.repo
            .create(NewNews {
                title: &payload.title,
                content: &payload.content,
                category: &payload.category,
                image_url: payload.image_url.as_deref(),
                submitted_by: Submitter::college(&site.site_name, &site.site_email),
                status: NewsStatus::Approved,
                approved_by: Some(&admin.email),
            })
            .await
    }

    pub async fn list_by_status(&self, status: Option<NewsStatus>) -> Result<Vec<News>, AppError> {
        self.repo.list_by_status(status.unwrap_or(NewsStatus::Pending)).await
    }

    pub async fn list_published(&self, category: Option<&str>, limit: Option<i64>) -> Result<Vec<News>, AppError> {
        let category = category.map(str::trim).filter(|c| !c.is_empty());
        self.repo.list_published(category, clamp_public_limit(limit)).await
    }

    /// Only approved articles are visible to the public.
    pub async fn get_published(&self, id: Uuid) -> Result<News, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .filter(|n| n.status == Some(NewsStatus::Approved))
            .ok_or(AppError::ResourceNotFound("news"))
    }

    pub async fn update(&self, id: Uuid, mut payload: NewsFormPayload) -> Result<News, AppError> {
        payload.normalize();
        self.repo.update(id, &payload).await?.ok_or(AppError::ResourceNotFound("news"))
    }

    pub async fn moderate(&self, admin: &CurrentAdmin, id: Uuid, action: ModerationAction) -> Result<News, AppError> {
        let news = self
            .repo
            .moderate(id, action, &admin.email)
            .await?
            .ok_or(AppError::ResourceNotFound("news"))?;

        tracing::info!(news_id = %id, moderator = %admin.email, action = action.verb(), "News moderated");
        Ok(news)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(id).await? {
            return Err(AppError::ResourceNotFound("news"));
        }
        Ok(())
    }

    pub async fn restore_legacy(&self) -> Result<u64, AppError> {
        let restored = self.repo.restore_legacy().await?;
        tracing::info!("Restored {} legacy news rows", restored);
        Ok(restored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_limit_is_capped() {
        assert_eq!(clamp_public_limit(None), 50);
        assert_eq!(clamp_public_limit(Some(10)), 10);
        assert_eq!(clamp_public_limit(Some(500)), 50);
        assert_eq!(clamp_public_limit(Some(0)), 1);
    }
}
