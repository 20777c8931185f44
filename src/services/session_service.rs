// src/services/session_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ActivityRepository, SessionRepository},
    models::{
        activity::{NewActivity, SESSION_EVENT},
        auth::CurrentAdmin,
        session::SessionView,
    },
};

pub const SESSION_LIST_LIMIT: i64 = 10;

#[derive(Clone)]
pub struct SessionService {
    repo: SessionRepository,
    activity_repo: ActivityRepository,
}

impl SessionService {
    pub fn new(repo: SessionRepository, activity_repo: ActivityRepository) -> Self {
        Self { repo, activity_repo }
    }

    pub async fn list(&self, current: &CurrentAdmin) -> Result<Vec<SessionView>, AppError> {
        let sessions = self.repo.list_recent_active(SESSION_LIST_LIMIT).await?;
        Ok(sessions
            .into_iter()
            .map(|session| SessionView { is_current: session.id == current.session_id, session })
            .collect())
    }

    /// Revokes another session. The holder is logged out on their next request.
    pub async fn revoke(&self, current: &CurrentAdmin, session_id: Uuid) -> Result<(), AppError> {
        if session_id == current.session_id {
            return Err(AppError::CannotRevokeCurrentSession);
        }

        if !self.repo.revoke(session_id, &current.email).await? {
            return Err(AppError::ResourceNotFound("session"));
        }

        tracing::info!(session_id = %session_id, revoked_by = %current.email, "Session revoked");
        self.activity_repo
            .record_quietly(&current.email, NewActivity::new(SESSION_EVENT, Some(session_id.to_string()), "Revoked"))
            .await;
        Ok(())
    }
}
