// src/services/user_service.rs

use std::sync::Arc;

use bcrypt::hash;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppConfig,
    db::{ActivityRepository, UserRepository},
    models::{
        activity::{NewActivity, USER_EVENT},
        auth::{AdminProfile, CreateAdminPayload, CurrentAdmin, UpdateAdminPayload},
        rbac::{AccessProfile, Permission, Role},
    },
};

/// Super-admin power (the role, or the `all` wildcard) can only be handed out by someone who has it.
pub fn check_grant(actor: &AccessProfile, role: Option<Role>, permissions: &[Permission]) -> Result<(), AppError> {
    if role == Some(Role::Migration) {
        return Err(AppError::invalid_field("role", "assignable_role", "Migration is not an assignable role."));
    }

    let grants_everything = role == Some(Role::SuperAdmin) || permissions.contains(&Permission::All);
    if grants_everything && !actor.is_unrestricted() {
        return Err(AppError::SuperAdminGrantDenied);
    }
    Ok(())
}

/// Admins with super-admin power can only be changed or removed by someone who has it.
pub fn check_target(actor: &AccessProfile, target: &AccessProfile) -> Result<(), AppError> {
    if target.is_unrestricted() && !actor.is_unrestricted() {
        return Err(AppError::SuperAdminGrantDenied);
    }
    Ok(())
}

/// Unknown names are rejected, duplicates dropped, order kept.
pub fn parse_permissions(raw: &[String]) -> Result<Vec<Permission>, AppError> {
    let mut permissions = Vec::with_capacity(raw.len());
    for name in raw {
        let permission: Permission = name.trim().parse()?;
        if !permissions.contains(&permission) {
            permissions.push(permission);
        }
    }
    Ok(permissions)
}

fn to_stored(permissions: &[Permission]) -> Vec<String> {
    permissions.iter().map(|p| p.slug().to_string()).collect()
}

#[derive(Clone)]
pub struct UserService {
    repo: UserRepository,
    activity_repo: ActivityRepository,
    config: Arc<AppConfig>,
    pool: PgPool,
}

impl UserService {
    pub fn new(repo: UserRepository, activity_repo: ActivityRepository, config: Arc<AppConfig>, pool: PgPool) -> Self {
        Self { repo, activity_repo, config, pool }
    }

    pub async fn list(&self) -> Result<Vec<AdminProfile>, AppError> {
        self.repo.list_profiles().await
    }

    pub async fn create(&self, actor: &CurrentAdmin, payload: CreateAdminPayload) -> Result<AdminProfile, AppError> {
        check_grant(&actor.access, Some(payload.role), &payload.permissions)?;

        let email = payload.email.trim().to_lowercase();

        // 1. Hashing (no database involved)
        let password = payload.password;
        let password_hash = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("Password hashing task failed: {}", e))??;

        // 2. Account + profile in one transaction
        let mut tx = self.pool.begin().await?;

        let account = self
            .repo
            .create_account(&mut *tx, &email, &password_hash, payload.email_verified)
            .await?;

        let profile = self
            .repo
            .upsert_profile(&mut *tx, account.id, &account.email, payload.role.as_str(), &to_stored(&payload.permissions))
            .await?;

        self.activity_repo
            .record(
                &mut *tx,
                &actor.email,
                &NewActivity::new(USER_EVENT, Some(account.email.clone()), format!("Created as {}", payload.role.as_str())),
            )
            .await?;

        tx.commit().await?;

        tracing::info!(user_id = %account.id, created_by = %actor.email, "Admin account created");
        Ok(profile)
    }

    /// Takes effect on the holder's next request.
    pub async fn update(&self, actor: &CurrentAdmin, user_id: Uuid, payload: UpdateAdminPayload) -> Result<AdminProfile, AppError> {
        let permissions = payload.permissions.as_deref().map(parse_permissions).transpose()?;
        check_grant(&actor.access, payload.role, permissions.as_deref().unwrap_or_default())?;
        self.check_existing_target(actor, user_id).await?;

        let stored = permissions.as_deref().map(to_stored);
        let profile = self
            .repo
            .update_profile(user_id, payload.role.map(Role::as_str), stored.as_deref())
            .await?
            .ok_or(AppError::ResourceNotFound("user"))?;

        self.activity_repo
            .record_quietly(&actor.email, NewActivity::new(USER_EVENT, Some(profile.email.clone()), "Access updated"))
            .await;
        Ok(profile)
    }

    /// Removes the profile; its holder is logged out on their next request.
    pub async fn delete(&self, actor: &CurrentAdmin, user_id: Uuid) -> Result<(), AppError> {
        if user_id == actor.uid {
            return Err(AppError::CannotDeleteSelf);
        }
        self.check_existing_target(actor, user_id).await?;

        if !self.repo.delete_profile(user_id).await? {
            return Err(AppError::ResourceNotFound("user"));
        }

        tracing::info!(user_id = %user_id, deleted_by = %actor.email, "Admin profile deleted");
        self.activity_repo
            .record_quietly(&actor.email, NewActivity::new(USER_EVENT, Some(user_id.to_string()), "Profile deleted"))
            .await;
        Ok(())
    }

    async fn check_existing_target(&self, actor: &CurrentAdmin, user_id: Uuid) -> Result<(), AppError> {
        let target = self.repo.find_profile(user_id).await?.ok_or(AppError::ResourceNotFound("user"))?;
        check_target(&actor.access, &target.access())
    }

    /// Migration-mode recovery: recreates the caller's own profile with full access.
    pub async fn restore_own_profile(&self, actor: &CurrentAdmin) -> Result<AdminProfile, AppError> {
        if !actor.is_migration() || !self.config.is_super_admin_email(&actor.email) {
            return Err(AppError::MigrationModeRequired);
        }

        let profile = self
            .repo
            .upsert_profile(
                &self.pool,
                actor.uid,
                &actor.email,
                Role::SuperAdmin.as_str(),
                &to_stored(&[Permission::All]),
            )
            .await?;

        tracing::warn!(user_id = %actor.uid, "Super admin profile restored from migration mode");
        self.activity_repo
            .record_quietly(&actor.email, NewActivity::new(USER_EVENT, Some(actor.email.clone()), "Profile restored"))
            .await;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child(permissions: &[Permission]) -> AccessProfile {
        AccessProfile { role: Role::ChildAdmin, permissions: permissions.to_vec() }
    }

    #[test]
    fn only_unrestricted_admins_grant_super_admin() {
        let manager = child(&[Permission::UserManagement]);
        assert!(matches!(
            check_grant(&manager, Some(Role::SuperAdmin), &[]),
            Err(AppError::SuperAdminGrantDenied)
        ));
        assert!(matches!(
            check_grant(&manager, Some(Role::ChildAdmin), &[Permission::All]),
            Err(AppError::SuperAdminGrantDenied)
        ));
        assert!(check_grant(&manager, Some(Role::ChildAdmin), &[Permission::News]).is_ok());

        let root = AccessProfile { role: Role::SuperAdmin, permissions: vec![] };
        assert!(check_grant(&root, Some(Role::SuperAdmin), &[Permission::All]).is_ok());
    }

    #[test]
    fn child_admins_cannot_touch_a_super_admin() {
        let manager = child(&[Permission::UserManagement]);
        let root = AccessProfile { role: Role::SuperAdmin, permissions: vec![] };
        let wildcard = child(&[Permission::All]);

        // Demoting to child_admin is a plain grant, so the target is what stops it
        assert!(check_grant(&manager, Some(Role::ChildAdmin), &[]).is_ok());
        assert!(matches!(check_target(&manager, &root), Err(AppError::SuperAdminGrantDenied)));
        assert!(matches!(check_target(&manager, &wildcard), Err(AppError::SuperAdminGrantDenied)));

        assert!(check_target(&manager, &child(&[Permission::News])).is_ok());
        assert!(check_target(&root, &wildcard).is_ok());
    }

    #[test]
    fn migration_role_cannot_be_assigned() {
        let root = AccessProfile { role: Role::SuperAdmin, permissions: vec![] };
        assert!(matches!(
            check_grant(&root, Some(Role::Migration), &[]),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn unknown_permission_names_are_rejected() {
        let raw = vec!["news".to_string(), "payroll".to_string()];
        assert!(matches!(parse_permissions(&raw), Err(AppError::UnknownPermission(p)) if p == "payroll"));
    }

    #[test]
    fn duplicate_permissions_collapse() {
        let raw = vec!["news".to_string(), " news ".to_string(), "seo".to_string()];
        assert_eq!(parse_permissions(&raw).unwrap(), vec![Permission::News, Permission::Seo]);
    }
}
