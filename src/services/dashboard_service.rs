// src/services/dashboard_service.rs

use chrono::Utc;

use crate::{
    common::error::AppError,
    db::{DashboardRepository, SecurityRepository},
    models::dashboard::{
        merge_recent, DashboardSummary, DatabaseStatus, HealthGrade, SystemHealthReport, RECENT_ACTIVITY_LIMIT,
    },
};

const RECENT_LOGS_LIMIT: i64 = 10;

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
    security_repo: SecurityRepository,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository, security_repo: SecurityRepository) -> Self {
        Self { repo, security_repo }
    }

    pub async fn summary(&self) -> Result<DashboardSummary, AppError> {
        let per_feed = RECENT_ACTIVITY_LIMIT as i64;
        let (counts, events, news) = tokio::try_join!(
            self.repo.counts(),
            self.repo.recent_events(per_feed),
            self.repo.recent_news(per_feed),
        )?;

        Ok(DashboardSummary {
            counts,
            recent_activity: merge_recent(events, news, RECENT_ACTIVITY_LIMIT),
        })
    }

    /// Always answers; an unreachable database is reported, not raised.
    pub async fn system_health(&self) -> Result<SystemHealthReport, AppError> {
        let latency = self.repo.ping().await;
        let latency_ms = latency.map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));

        let report = match latency {
            None => SystemHealthReport {
                database: DatabaseStatus::Offline,
                latency_ms: None,
                grade: HealthGrade::Poor,
                total_visits: 0,
                counts: Default::default(),
                recent_logs: Vec::new(),
                security_enabled: false,
                checked_at: Utc::now(),
            },
            Some(_) => {
                let (total_visits, counts, recent_logs, security) = tokio::try_join!(
                    self.repo.total_visits(),
                    self.repo.collection_counts(),
                    self.security_repo.recent_logs(RECENT_LOGS_LIMIT),
                    self.security_repo.get_or_init_settings(),
                )?;

                SystemHealthReport {
                    database: DatabaseStatus::Online,
                    latency_ms,
                    grade: HealthGrade::from_latency(latency_ms),
                    total_visits,
                    counts,
                    recent_logs,
                    security_enabled: security.is_active,
                    checked_at: Utc::now(),
                }
            }
        };
        Ok(report)
    }

    pub async fn record_visit(&self) -> Result<i64, AppError> {
        self.repo.increment_visits().await
    }
}
