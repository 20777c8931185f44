// src/services/auth.rs

use std::sync::Arc;

use bcrypt::verify;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppConfig,
    db::{
        session_repo::NewSession, ActivityRepository, SecurityRepository, SessionRepository, UserRepository,
    },
    models::{
        activity::{NewActivity, AUTH_EVENT, SESSION_EVENT},
        auth::{Account, AdminProfile, AuthResponse, Claims, CurrentAdmin, LoginUserPayload},
        rbac::AccessProfile,
        security::{LockoutDecision, LockoutStatus},
        session::{AdminSession, ClientInfo, DeviceDescriptor, SessionStatus, SessionStatusResponse},
    },
};

/// Username that stands for the configured super-admin e-mail.
pub const ADMIN_ALIAS: &str = "admin";
const TOKEN_TTL_DAYS: i64 = 7;

/// Outcome of looking up the profile behind an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileResolution {
    Found(AccessProfile),
    /// The designated account without a readable profile.
    Migration,
    /// Any other account without a profile.
    Missing,
}

impl ProfileResolution {
    /// Lookup errors are only forgiven for the designated account.
    pub fn from_lookup(
        lookup: Result<Option<AdminProfile>, AppError>,
        is_designated: bool,
    ) -> Result<Self, AppError> {
        match lookup {
            Ok(Some(profile)) => Ok(ProfileResolution::Found(profile.access())),
            Ok(None) if is_designated => Ok(ProfileResolution::Migration),
            Ok(None) => Ok(ProfileResolution::Missing),
            Err(e) if is_designated => {
                tracing::warn!("Profile lookup failed for the super admin, entering migration mode: {}", e);
                Ok(ProfileResolution::Migration)
            }
            Err(e) => Err(e),
        }
    }

    /// The access to grant, or `None` when the profile is gone and the session must end.
    pub fn into_access(self) -> Option<AccessProfile> {
        match self {
            ProfileResolution::Found(access) => Some(access),
            ProfileResolution::Migration => Some(AccessProfile::migration()),
            ProfileResolution::Missing => None,
        }
    }
}

/// `admin` (any case) maps to the super-admin e-mail; anything else is used as typed.
pub fn resolve_username(username: &str, super_admin_email: &str) -> String {
    let username = username.trim();
    if username.eq_ignore_ascii_case(ADMIN_ALIAS) {
        super_admin_email.to_string()
    } else {
        username.to_lowercase()
    }
}

/// True when the stored heartbeat is at least `interval` old.
pub fn heartbeat_due(last_active: DateTime<Utc>, now: DateTime<Utc>, interval: Duration) -> bool {
    now - last_active >= interval
}

/// Gate for the session named in a token. It must exist, belong to the token
/// holder and still be active. `Ok(true)` means the heartbeat should be refreshed.
pub fn check_session(
    session: Option<&AdminSession>,
    claims: &Claims,
    now: DateTime<Utc>,
    heartbeat_interval: Duration,
) -> Result<bool, AppError> {
    let session = session.filter(|s| s.user_id == claims.sub).ok_or(AppError::InvalidToken)?;

    if session.status == SessionStatus::Revoked {
        return Err(AppError::SessionRevoked);
    }

    Ok(heartbeat_due(session.last_active, now, heartbeat_interval))
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    session_repo: SessionRepository,
    security_repo: SecurityRepository,
    activity_repo: ActivityRepository,
    config: Arc<AppConfig>,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        session_repo: SessionRepository,
        security_repo: SecurityRepository,
        activity_repo: ActivityRepository,
        config: Arc<AppConfig>,
        pool: PgPool,
    ) -> Self {
        Self { user_repo, session_repo, security_repo, activity_repo, config, pool }
    }

    pub async fn login(&self, payload: LoginUserPayload, client: &ClientInfo) -> Result<AuthResponse, AppError> {
        let now = Utc::now();
        let policy = self.config.lockout_policy();

        // 1. Blocked clients don't get to try
        let block = self.security_repo.find_block(client.key()).await?;
        if let Some((until, reason)) = block.as_ref().and_then(|b| b.active_block(now)) {
            return Err(AppError::ClientBlocked { reason: reason.to_string(), until });
        }

        // 2. Honeypot
        if payload.security_check.as_deref().is_some_and(|v| !v.is_empty()) {
            return Err(self.trip_honeypot(client).await);
        }

        // 3. Credentials
        let email = resolve_username(&payload.username, &self.config.super_admin_email);
        let account = match self.check_credentials(&email, payload.password).await? {
            Some(account) => account,
            None => {
                let failures = self.security_repo.increment_failures(client.key()).await?;
                return Err(self.apply_lockout(client, policy.after_failures(failures, now)).await);
            }
        };

        // 4. Unverified accounts get no session
        if !account.email_verified {
            return Err(AppError::EmailNotVerified(account.email));
        }

        // 5. Profile
        let is_designated = self.config.is_super_admin_email(&account.email);
        let access = ProfileResolution::from_lookup(self.user_repo.find_profile(account.id).await, is_designated)?
            .into_access()
            .ok_or(AppError::ProfileNotFound)?;

        if block.is_some() {
            self.security_repo.clear(client.key()).await?;
        }

        // 6. Session + audit entry, together
        let descriptor = DeviceDescriptor::from_user_agent(client.user_agent.as_deref());
        let mut tx = self.pool.begin().await?;

        let session = self
            .session_repo
            .create(
                &mut *tx,
                NewSession {
                    user_id: account.id,
                    email: &account.email,
                    descriptor: descriptor.clone(),
                    ip: &client.ip,
                    location: &client.location,
                    user_agent: client.user_agent.as_deref(),
                },
            )
            .await?;

        let entry = NewActivity::new(
            AUTH_EVENT,
            None,
            format!("Login from {} on {} ({})", descriptor.browser, descriptor.os, client.ip),
        );
        self.activity_repo.record(&mut *tx, &account.email, &entry).await?;

        tx.commit().await?;

        tracing::info!(user_id = %account.id, session_id = %session.id, client = %client.ip, "Admin logged in");

        let token = self.create_token(account.id, session.id, &account.email)?;
        let landing_path = access.landing_path();

        Ok(AuthResponse {
            token,
            session_id: session.id,
            user: CurrentAdmin { uid: account.id, email: account.email, session_id: session.id, access },
            landing_path,
        })
    }

    /// The account when the password matches; `None` for unknown e-mail or wrong password.
    async fn check_credentials(
        &self,
        email: &str,
        password: String,
    ) -> Result<Option<Account>, AppError> {
        let Some(account) = self.user_repo.find_account_by_email(email).await? else {
            return Ok(None);
        };

        let password_hash = account.password_hash.clone();

        // bcrypt is CPU bound; keep it off the async workers
        let is_password_valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
            .await
            .map_err(|e| anyhow::anyhow!("Password verification task failed: {}", e))??;

        Ok(is_password_valid.then_some(account))
    }

    /// Blocks a client that filled in a hidden form field. Shared by every public form.
    pub async fn trip_honeypot(&self, client: &ClientInfo) -> AppError {
        if let Err(e) = self.security_repo.increment_failures(client.key()).await {
            return e;
        }
        let decision = self.config.lockout_policy().honeypot_tripped(Utc::now());
        self.apply_lockout(client, decision).await
    }

    /// Persists a block (the failure is already counted) and returns the error the caller should see.
    async fn apply_lockout(&self, client: &ClientInfo, decision: LockoutDecision) -> AppError {
        let result = match &decision {
            LockoutDecision::Counted { failures } => {
                tracing::debug!(client = %client.ip, failures, "Failed login counted");
                Ok(())
            }
            LockoutDecision::Blocked { until, reason } => {
                tracing::warn!(client = %client.ip, reason = %reason, "Client blocked until {}", until);
                match self.security_repo.block(client.key(), *until, reason).await {
                    Ok(()) => {
                        let message = format!("Blocked {} until {}: {}", client.ip, until.to_rfc3339(), reason);
                        if let Err(e) = self.security_repo.log("warn", "security", &message).await {
                            tracing::warn!("Failed to write system log: {}", e);
                        }
                        Ok(())
                    }
                    Err(e) => Err(e),
                }
            }
        };

        if let Err(e) = result {
            return e;
        }

        match decision {
            LockoutDecision::Counted { .. } => AppError::InvalidCredentials,
            LockoutDecision::Blocked { until, reason } => AppError::ClientBlocked { reason: reason.to_string(), until },
        }
    }

    pub async fn lockout_status(&self, client: &ClientInfo) -> Result<LockoutStatus, AppError> {
        let now = Utc::now();
        let status = match self.security_repo.find_block(client.key()).await? {
            Some(block) => {
                let active = block.active_block(now).map(|(until, reason)| (until, reason.to_string()));
                LockoutStatus {
                    blocked: active.is_some(),
                    failures: block.failures,
                    blocked_until: active.as_ref().map(|(until, _)| *until),
                    reason: active.map(|(_, reason)| reason),
                }
            }
            None => LockoutStatus { blocked: false, failures: 0, blocked_until: None, reason: None },
        };
        Ok(status)
    }

    /// Runs on every authenticated request: token, session state, heartbeat, live profile.
    pub async fn authenticate(&self, token: &str) -> Result<CurrentAdmin, AppError> {
        let claims = self.decode_token(token)?;

        let session = self.session_repo.find_by_id(claims.sid).await?;

        // Capped at a day
        let interval = Duration::seconds(self.config.session_heartbeat_seconds.min(86_400) as i64);
        let now = Utc::now();
        let touch = check_session(session.as_ref(), &claims, now, interval)?;
        let session_id = claims.sid;

        if touch {
            if let Err(e) = self.session_repo.touch(session_id, now - interval).await {
                tracing::warn!(session_id = %session_id, "Heartbeat update failed: {}", e);
            }
        }

        // Profile is re-read every time so permission changes apply immediately
        let is_designated = self.config.is_super_admin_email(&claims.email);
        let resolution = ProfileResolution::from_lookup(self.user_repo.find_profile(claims.sub).await, is_designated)?;
        let Some(access) = resolution.into_access() else {
            tracing::info!(user_id = %claims.sub, session_id = %session_id, "Profile removed, revoking session");
            self.session_repo.revoke(session_id, "system").await?;
            self.activity_repo
                .record_quietly(
                    &claims.email,
                    NewActivity::new(SESSION_EVENT, Some(session_id.to_string()), "Revoked: profile removed"),
                )
                .await;
            return Err(AppError::ProfileRemoved);
        };

        Ok(CurrentAdmin { uid: claims.sub, email: claims.email, session_id, access })
    }

    pub async fn logout(&self, admin: &CurrentAdmin) -> Result<(), AppError> {
        self.session_repo.revoke(admin.session_id, &admin.email).await?;
        self.activity_repo
            .record_quietly(&admin.email, NewActivity::new(AUTH_EVENT, None, "Logout"))
            .await;
        tracing::info!(user_id = %admin.uid, session_id = %admin.session_id, "Admin logged out");
        Ok(())
    }

    pub async fn session_status(&self, admin: &CurrentAdmin) -> Result<SessionStatusResponse, AppError> {
        let session = self
            .session_repo
            .find_by_id(admin.session_id)
            .await?
            .ok_or(AppError::ResourceNotFound("session"))?;

        Ok(SessionStatusResponse {
            session_id: session.id,
            status: session.status,
            last_active: session.last_active,
        })
    }

    // --- JWT ---

    fn create_token(&self, user_id: Uuid, session_id: Uuid, email: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + Duration::days(TOKEN_TTL_DAYS);

        let claims = Claims {
            sub: user_id,
            sid: session_id,
            email: email.to_string(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_ref()),
        )?)
    }

    fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| AppError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rbac::{Permission, Role};

    fn profile(permissions: &[&str]) -> AdminProfile {
        AdminProfile {
            user_id: Uuid::new_v4(),
            email: "clerk@college.edu".into(),
            role: None,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn admin_alias_maps_to_super_admin() {
        assert_eq!(resolve_username("ADMIN", "principal@college.edu"), "principal@college.edu");
        assert_eq!(resolve_username(" Clerk@College.edu ", "principal@college.edu"), "clerk@college.edu");
    }

    #[test]
    fn found_profile_carries_its_permissions() {
        let resolution = ProfileResolution::from_lookup(Ok(Some(profile(&["news"]))), false).unwrap();
        assert_eq!(
            resolution,
            ProfileResolution::Found(AccessProfile { role: Role::ChildAdmin, permissions: vec![Permission::News] })
        );
    }

    #[test]
    fn missing_profile_is_migration_only_for_the_designated_account() {
        assert_eq!(ProfileResolution::from_lookup(Ok(None), true).unwrap(), ProfileResolution::Migration);
        assert_eq!(ProfileResolution::from_lookup(Ok(None), false).unwrap(), ProfileResolution::Missing);
    }

    #[test]
    fn lookup_errors_are_forgiven_only_for_the_designated_account() {
        let failing = || Err(AppError::InternalServerError(anyhow::anyhow!("timeout")));
        assert_eq!(ProfileResolution::from_lookup(failing(), true).unwrap(), ProfileResolution::Migration);
        assert!(ProfileResolution::from_lookup(failing(), false).is_err());
    }

    fn session(user_id: Uuid, status: SessionStatus, last_active: DateTime<Utc>) -> AdminSession {
        AdminSession {
            id: Uuid::new_v4(),
            user_id,
            email: "clerk@college.edu".into(),
            device: "Desktop".into(),
            browser: "Chrome".into(),
            os: "Windows".into(),
            ip: "203.0.113.7".into(),
            location: "Unknown".into(),
            user_agent: None,
            status,
            created_at: last_active,
            last_active,
            revoked_at: None,
            revoked_by: None,
        }
    }

    fn claims_for(session: &AdminSession) -> Claims {
        Claims { sub: session.user_id, sid: session.id, email: session.email.clone(), exp: 0, iat: 0 }
    }

    #[test]
    fn revoked_session_is_refused() {
        let now = Utc::now();
        let mut revoked = session(Uuid::new_v4(), SessionStatus::Revoked, now);
        revoked.revoked_by = Some("principal@college.edu".into());
        let result = check_session(Some(&revoked), &claims_for(&revoked), now, Duration::seconds(300));
        assert!(matches!(result, Err(AppError::SessionRevoked)));
    }

    #[test]
    fn unknown_or_foreign_session_is_an_invalid_token() {
        let now = Utc::now();
        let active = session(Uuid::new_v4(), SessionStatus::Active, now);
        let claims = claims_for(&active);
        assert!(matches!(check_session(None, &claims, now, Duration::seconds(300)), Err(AppError::InvalidToken)));

        let someone_else = Claims { sub: Uuid::new_v4(), ..claims };
        assert!(matches!(
            check_session(Some(&active), &someone_else, now, Duration::seconds(300)),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn active_session_refreshes_a_stale_heartbeat_only() {
        let now = Utc::now();
        let interval = Duration::seconds(300);
        let fresh = session(Uuid::new_v4(), SessionStatus::Active, now - Duration::seconds(10));
        let stale = session(Uuid::new_v4(), SessionStatus::Active, now - Duration::minutes(10));
        assert!(!check_session(Some(&fresh), &claims_for(&fresh), now, interval).unwrap());
        assert!(check_session(Some(&stale), &claims_for(&stale), now, interval).unwrap());
    }

    #[test]
    fn removed_profile_ends_the_session() {
        assert_eq!(ProfileResolution::Missing.into_access(), None);
        assert_eq!(ProfileResolution::Migration.into_access(), Some(AccessProfile::migration()));

        let resolution = ProfileResolution::from_lookup(Ok(Some(profile(&["pages"]))), false).unwrap();
        assert_eq!(resolution.into_access().map(|a| a.permissions), Some(vec![Permission::Pages]));
    }

    #[test]
    fn heartbeat_is_throttled() {
        let now = Utc::now();
        let five_minutes = Duration::seconds(300);
        assert!(!heartbeat_due(now - Duration::seconds(299), now, five_minutes));
        assert!(heartbeat_due(now - Duration::seconds(300), now, five_minutes));
    }
}
