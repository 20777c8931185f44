// src/models/dashboard.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::security::SystemLog;

// 1. Cards at the top of the dashboard
#[derive(Debug, Default, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCounts {
    pub events: i64,
    pub sports: i64,
    pub workshops: i64,
    pub news: i64,
    pub students: i64,
    pub users: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Event,
    News,
}

// 2. Recent activity feed (events and news merged)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivity {
    pub id: uuid::Uuid,
    pub title: String,
    #[sqlx(skip)]
    pub kind: Option<ActivityKind>,
    pub at: Option<DateTime<Utc>>,
}

pub const RECENT_ACTIVITY_LIMIT: usize = 5;

/// Merges both feeds newest first and keeps the top entries. Undated items sink.
pub fn merge_recent(events: Vec<RecentActivity>, news: Vec<RecentActivity>, limit: usize) -> Vec<RecentActivity> {
    let mut merged: Vec<RecentActivity> = events
        .into_iter()
        .map(|a| RecentActivity { kind: Some(ActivityKind::Event), ..a })
        .chain(news.into_iter().map(|a| RecentActivity { kind: Some(ActivityKind::News), ..a }))
        .collect();

    // `None < Some`, so reversing the natural order puts undated items last
    merged.sort_by(|a, b| b.at.cmp(&a.at));
    merged.truncate(limit);
    merged
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub counts: DashboardCounts,
    pub recent_activity: Vec<RecentActivity>,
}

// --- System health ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthGrade {
    Good,
    Degraded,
    Poor,
}

impl HealthGrade {
    /// Below 200 ms is good, below 800 ms degraded. No measurement counts as poor.
    pub fn from_latency(latency_ms: Option<u64>) -> Self {
        match latency_ms {
            Some(ms) if ms < 200 => HealthGrade::Good,
            Some(ms) if ms < 800 => HealthGrade::Degraded,
            _ => HealthGrade::Poor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseStatus {
    Online,
    Offline,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SystemHealthReport {
    pub database: DatabaseStatus,
    pub latency_ms: Option<u64>,
    pub grade: HealthGrade,
    pub total_visits: i64,
    /// Item count per collection, plus `news`, `courses` and `users`.
    pub counts: BTreeMap<String, i64>,
    pub recent_logs: Vec<SystemLog>,
    pub security_enabled: bool,
    pub checked_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn entry(title: &str, at: Option<DateTime<Utc>>) -> RecentActivity {
        RecentActivity { id: Uuid::new_v4(), title: title.into(), kind: None, at }
    }

    #[test]
    fn latency_grades() {
        assert_eq!(HealthGrade::from_latency(Some(0)), HealthGrade::Good);
        assert_eq!(HealthGrade::from_latency(Some(199)), HealthGrade::Good);
        assert_eq!(HealthGrade::from_latency(Some(200)), HealthGrade::Degraded);
        assert_eq!(HealthGrade::from_latency(Some(799)), HealthGrade::Degraded);
        assert_eq!(HealthGrade::from_latency(Some(800)), HealthGrade::Poor);
        assert_eq!(HealthGrade::from_latency(None), HealthGrade::Poor);
    }

    #[test]
    fn recent_activity_is_merged_newest_first() {
        let now = Utc::now();
        let events = vec![entry("Fest", Some(now - Duration::days(1))), entry("Seminar", None)];
        let news = vec![entry("Results", Some(now)), entry("Old notice", Some(now - Duration::days(9)))];

        let merged = merge_recent(events, news, 3);
        let titles: Vec<&str> = merged.iter().map(|a| a.title.as_str()).collect();

        assert_eq!(titles, vec!["Results", "Fest", "Old notice"]);
        assert_eq!(merged[0].kind, Some(ActivityKind::News));
        assert_eq!(merged[1].kind, Some(ActivityKind::Event));
    }
}
