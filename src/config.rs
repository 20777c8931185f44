// src/config.rs

use std::{env, net::IpAddr, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{
        ActivityRepository, ContentRepository, CourseRepository, DashboardRepository, NewsRepository,
        PageRepository, SecurityRepository, SessionRepository, SettingsRepository, UserRepository,
    },
    models::security::LockoutPolicy,
    services::{
        auth::AuthService, dashboard_service::DashboardService, news_service::NewsService,
        session_service::SessionService, user_service::UserService,
    },
};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    /// The one account that falls back to migration mode when its profile is missing.
    pub super_admin_email: String,
    pub login_max_failures: u32,
    pub lockout_minutes: u64,
    pub session_heartbeat_seconds: u64,
    pub db_max_connections: u32,
    /// Peers whose `X-Forwarded-For` / `X-Real-IP` headers are believed.
    pub trusted_proxies: Vec<IpAddr>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup (the process environment in production).
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let required = |key: &str| get(key).filter(|v| !v.trim().is_empty()).with_context(|| format!("{key} must be set"));

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            super_admin_email: required("SUPER_ADMIN_EMAIL")?.trim().to_lowercase(),
            login_max_failures: parse_or(&get, "LOGIN_MAX_FAILURES", 5)?,
            lockout_minutes: parse_or(&get, "LOCKOUT_MINUTES", 60)?,
            session_heartbeat_seconds: parse_or(&get, "SESSION_HEARTBEAT_SECONDS", 300)?,
            db_max_connections: parse_or(&get, "DB_MAX_CONNECTIONS", 5)?,
            trusted_proxies: parse_list(&get, "TRUSTED_PROXIES")?,
        })
    }

    pub fn is_super_admin_email(&self, email: &str) -> bool {
        email.trim().eq_ignore_ascii_case(&self.super_admin_email)
    }

    pub fn lockout_policy(&self) -> LockoutPolicy {
        LockoutPolicy::new(self.login_max_failures, self.lockout_minutes)
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}

/// Comma-separated list; missing or blank means empty.
fn parse_list<T>(get: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<Vec<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    get(key)
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| item.parse().with_context(|| format!("{key} has an invalid entry: '{item}'")))
        .collect()
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<AppConfig>,
    pub i18n_store: &'static I18nStore,

    pub content_repo: ContentRepository,
    pub course_repo: CourseRepository,
    pub page_repo: PageRepository,
    pub settings_repo: SettingsRepository,
    pub security_repo: SecurityRepository,
    pub activity_repo: ActivityRepository,

    pub auth_service: AuthService,
    pub session_service: SessionService,
    pub news_service: NewsService,
    pub user_service: UserService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Failed to connect to the database")?;

        tracing::info!("✅ Database connection established");

        Ok(Self::with_pool(db_pool, config))
    }

    // --- Dependency graph ---
    pub fn with_pool(db_pool: PgPool, config: AppConfig) -> Self {
        let config = Arc::new(config);

        let user_repo = UserRepository::new(db_pool.clone());
        let session_repo = SessionRepository::new(db_pool.clone());
        let security_repo = SecurityRepository::new(db_pool.clone());
        let news_repo = NewsRepository::new(db_pool.clone());
        let activity_repo = ActivityRepository::new(db_pool.clone());
        let settings_repo = SettingsRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            user_repo.clone(),
            session_repo.clone(),
            security_repo.clone(),
            activity_repo.clone(),
            config.clone(),
            db_pool.clone(),
        );
        let session_service = SessionService::new(session_repo, activity_repo.clone());
        let news_service = NewsService::new(news_repo, settings_repo.clone());
        let user_service = UserService::new(user_repo, activity_repo.clone(), config.clone(), db_pool.clone());
        let dashboard_service = DashboardService::new(dashboard_repo, security_repo.clone());

        Self {
            content_repo: ContentRepository::new(db_pool.clone()),
            course_repo: CourseRepository::new(db_pool.clone()),
            page_repo: PageRepository::new(db_pool.clone()),
            settings_repo,
            security_repo,
            activity_repo,
            auth_service,
            session_service,
            news_service,
            user_service,
            dashboard_service,
            i18n_store: I18nStore::shared(),
            config,
            db_pool,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    const BASE: &[(&str, &str)] = &[
        ("DATABASE_URL", "postgres://localhost/college"),
        ("JWT_SECRET", "secret"),
        ("SUPER_ADMIN_EMAIL", " Principal@College.edu "),
    ];

    #[test]
    fn defaults_apply_when_optional_vars_are_missing() {
        let config = AppConfig::from_lookup(lookup(BASE)).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.login_max_failures, 5);
        assert_eq!(config.lockout_minutes, 60);
        assert_eq!(config.session_heartbeat_seconds, 300);
        assert_eq!(config.db_max_connections, 5);
        assert!(config.trusted_proxies.is_empty());
    }

    #[test]
    fn trusted_proxies_are_parsed_from_a_list() {
        let mut pairs = BASE.to_vec();
        pairs.push(("TRUSTED_PROXIES", "10.0.0.1, ::1,"));
        let config = AppConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(
            config.trusted_proxies,
            vec!["10.0.0.1".parse::<IpAddr>().unwrap(), "::1".parse::<IpAddr>().unwrap()]
        );

        pairs.push(("TRUSTED_PROXIES", "load-balancer"));
        let err = AppConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(err.to_string().contains("TRUSTED_PROXIES"));
    }

    #[test]
    fn super_admin_email_is_normalized_and_matched_case_insensitively() {
        let config = AppConfig::from_lookup(lookup(BASE)).unwrap();
        assert_eq!(config.super_admin_email, "principal@college.edu");
        assert!(config.is_super_admin_email("PRINCIPAL@college.edu"));
        assert!(!config.is_super_admin_email("clerk@college.edu"));
    }

    #[test]
    fn missing_secret_is_reported_by_name() {
        let err = AppConfig::from_lookup(lookup(&BASE[..1])).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn bad_numbers_are_reported_with_context() {
        let mut pairs = BASE.to_vec();
        pairs.push(("LOCKOUT_MINUTES", "an hour"));
        let err = AppConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(err.to_string().contains("LOCKOUT_MINUTES"));
    }
}
