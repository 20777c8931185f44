// src/models/session.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "session_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Revoked,
}

// One logged-in browser
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminSession {
    pub id: Uuid,
    #[schema(ignore)]
    pub user_id: Uuid,
    #[schema(example = "coordinator@college.edu")]
    pub email: String,
    #[schema(example = "Desktop")]
    pub device: String,
    #[schema(example = "Chrome")]
    pub browser: String,
    #[schema(example = "Windows")]
    pub os: String,
    #[schema(example = "203.0.113.7")]
    pub ip: String,
    #[schema(example = "Ahmedabad, IN")]
    pub location: String,
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub user_agent: Option<String>,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub revoked_by: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    #[serde(flatten)]
    pub session: AdminSession,
    pub is_current: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub session_id: Uuid,
    pub status: SessionStatus,
    pub last_active: DateTime<Utc>,
}

/// Where a request came from, as far as the headers tell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip: String,
    pub user_agent: Option<String>,
    pub location: String,
}

impl ClientInfo {
    /// Key for lockout bookkeeping.
    pub fn key(&self) -> &str {
        &self.ip
    }
}

/// What the login form tells us about the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub device: &'static str,
    pub browser: &'static str,
    pub os: &'static str,
}

impl DeviceDescriptor {
    pub fn from_user_agent(user_agent: Option<&str>) -> Self {
        let ua = user_agent.unwrap_or_default();

        let device = if ua.contains("iPad") || ua.contains("Tablet") {
            "Tablet"
        } else if ua.contains("Mobi") || ua.contains("Android") || ua.contains("iPhone") {
            "Mobile"
        } else {
            "Desktop"
        };

        // Order matters: Edge and Opera also announce Chrome, Chrome announces Safari
        let browser = if ua.contains("Edg/") {
            "Edge"
        } else if ua.contains("OPR/") || ua.contains("Opera") {
            "Opera"
        } else if ua.contains("Firefox/") {
            "Firefox"
        } else if ua.contains("Chrome/") || ua.contains("CriOS/") {
            "Chrome"
        } else if ua.contains("Safari/") {
            "Safari"
        } else {
            "Unknown"
        };

        let os = if ua.contains("Windows") {
            "Windows"
        } else if ua.contains("Android") {
            "Android"
        } else if ua.contains("iPhone") || ua.contains("iPad") || ua.contains("iOS") {
            "iOS"
        } else if ua.contains("Mac OS X") || ua.contains("Macintosh") {
            "macOS"
        } else if ua.contains("Linux") {
            "Linux"
        } else {
            "Unknown"
        };

        Self { device, browser, os }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desktop_chrome_on_windows() {
        let ua = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";
        let d = DeviceDescriptor::from_user_agent(Some(ua));
        assert_eq!(d, DeviceDescriptor { device: "Desktop", browser: "Chrome", os: "Windows" });
    }

    #[test]
    fn iphone_safari_is_mobile() {
        let ua = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
        let d = DeviceDescriptor::from_user_agent(Some(ua));
        assert_eq!(d.device, "Mobile");
        assert_eq!(d.browser, "Safari");
        assert_eq!(d.os, "iOS");
    }

    #[test]
    fn edge_is_not_reported_as_chrome() {
        let ua = "Mozilla/5.0 (Windows NT 10.0) AppleWebKit/537.36 Chrome/120.0 Safari/537.36 Edg/120.0";
        assert_eq!(DeviceDescriptor::from_user_agent(Some(ua)).browser, "Edge");
    }

    #[test]
    fn missing_user_agent() {
        let d = DeviceDescriptor::from_user_agent(None);
        assert_eq!(d, DeviceDescriptor { device: "Desktop", browser: "Unknown", os: "Unknown" });
    }
}
