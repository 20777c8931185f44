// src/models/security.rs

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use uuid::Uuid;

pub const REASON_BOT: &str = "Automated Bot / Malicious Script Detected";
pub const REASON_FAILED_LOGINS: &str = "Multiple Failed Admin Access Attempts";

// Failed-login state for one client
#[derive(Debug, Clone, FromRow)]
pub struct SecurityBlock {
    pub client_key: String,
    pub failures: i32,
    pub blocked_until: Option<DateTime<Utc>>,
    pub reason: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl SecurityBlock {
    /// The active block, if any. Expired blocks count as clear.
    pub fn active_block(&self, now: DateTime<Utc>) -> Option<(DateTime<Utc>, &str)> {
        match self.blocked_until {
            Some(until) if until > now => Some((until, self.reason.as_deref().unwrap_or(REASON_FAILED_LOGINS))),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockoutDecision {
    /// Failure recorded; the client may keep trying.
    Counted { failures: i32 },
    /// The client is locked out until the given instant.
    Blocked { until: DateTime<Utc>, reason: &'static str },
}

#[derive(Debug, Clone, Copy)]
pub struct LockoutPolicy {
    pub max_failures: i32,
    pub block_duration: Duration,
}

impl LockoutPolicy {
    pub fn new(max_failures: u32, block_minutes: u64) -> Self {
        Self {
            max_failures: i32::try_from(max_failures).unwrap_or(i32::MAX).max(1),
            // Capped at a century so the duration can't overflow
            block_duration: Duration::minutes(block_minutes.min(52_560_000) as i64),
        }
    }

    /// Decides the outcome once a failed login brings the count to `failures`.
    pub fn after_failures(&self, failures: i32, now: DateTime<Utc>) -> LockoutDecision {
        if failures >= self.max_failures {
            LockoutDecision::Blocked {
                until: now + self.block_duration,
                reason: REASON_FAILED_LOGINS,
            }
        } else {
            LockoutDecision::Counted { failures }
        }
    }

    /// A filled honeypot field blocks straight away.
    pub fn honeypot_tripped(&self, now: DateTime<Utc>) -> LockoutDecision {
        LockoutDecision::Blocked {
            until: now + self.block_duration,
            reason: REASON_BOT,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LockoutStatus {
    pub blocked: bool,
    pub failures: i32,
    pub blocked_until: Option<DateTime<Utc>>,
    pub reason: Option<String>,
}

// --- Security settings document ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecurityConfig {
    #[schema(example = 5)]
    pub max_refreshes: i32,
    /// Seconds
    #[schema(example = 15)]
    pub refresh_window: i32,
    /// Minutes
    #[schema(example = 30)]
    pub block_duration: i32,
    pub enable_refresh_check: bool,
    pub enable_rate_limit: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_refreshes: 5,
            refresh_window: 15,
            block_duration: 30,
            enable_refresh_check: true,
            enable_rate_limit: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecuritySettings {
    pub is_active: bool,
    #[schema(value_type = SecurityConfig)]
    pub config: Json<SecurityConfig>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSecuritySettingsPayload {
    pub is_active: Option<bool>,
    pub config: Option<SecurityConfig>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SystemLog {
    pub id: Uuid,
    #[schema(example = "warn")]
    pub level: String,
    #[schema(example = "security")]
    pub source: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> LockoutPolicy {
        LockoutPolicy::new(5, 60)
    }

    #[test]
    fn fifth_failure_blocks_for_an_hour() {
        let now = Utc::now();
        assert_eq!(policy().after_failures(4, now), LockoutDecision::Counted { failures: 4 });
        assert_eq!(
            policy().after_failures(5, now),
            LockoutDecision::Blocked { until: now + Duration::hours(1), reason: REASON_FAILED_LOGINS }
        );
    }

    #[test]
    fn counted_failures_turn_into_a_block_at_the_limit() {
        let now = Utc::now();
        // Totals as handed back by the counter, one per failed attempt
        let decisions: Vec<_> = (1..=6).map(|total| policy().after_failures(total, now)).collect();

        for (i, decision) in decisions[..4].iter().enumerate() {
            assert_eq!(*decision, LockoutDecision::Counted { failures: i as i32 + 1 });
        }
        for decision in &decisions[4..] {
            assert!(matches!(decision, LockoutDecision::Blocked { reason: REASON_FAILED_LOGINS, .. }));
        }
    }

    #[test]
    fn concurrent_failures_each_see_their_own_total() {
        // Four parallel guesses after three failures land on 4, 5, 6 and 7: every one past the limit blocks
        let now = Utc::now();
        let blocked = (4..=7)
            .map(|total| policy().after_failures(total, now))
            .filter(|d| matches!(d, LockoutDecision::Blocked { .. }))
            .count();
        assert_eq!(blocked, 3);
    }

    #[test]
    fn honeypot_blocks_immediately() {
        let now = Utc::now();
        match policy().honeypot_tripped(now) {
            LockoutDecision::Blocked { until, reason } => {
                assert_eq!(reason, REASON_BOT);
                assert_eq!(until, now + Duration::hours(1));
            }
            other => panic!("expected a block, got {:?}", other),
        }
    }

    #[test]
    fn zero_max_failures_is_clamped() {
        let now = Utc::now();
        assert!(matches!(LockoutPolicy::new(0, 1).after_failures(1, now), LockoutDecision::Blocked { .. }));
    }

    #[test]
    fn expired_block_is_clear() {
        let now = Utc::now();
        let mut block = SecurityBlock {
            client_key: "203.0.113.7".into(),
            failures: 5,
            blocked_until: Some(now - Duration::minutes(1)),
            reason: Some(REASON_BOT.into()),
            updated_at: now,
        };
        assert!(block.active_block(now).is_none());

        block.blocked_until = Some(now + Duration::minutes(10));
        assert_eq!(block.active_block(now).map(|(_, r)| r), Some(REASON_BOT));
    }

    #[test]
    fn default_security_config_matches_the_shipped_values() {
        let json = serde_json::to_value(SecurityConfig::default()).unwrap();
        assert_eq!(json["maxRefreshes"], 5);
        assert_eq!(json["refreshWindow"], 15);
        assert_eq!(json["blockDuration"], 30);
    }
}
