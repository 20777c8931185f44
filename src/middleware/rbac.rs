// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    common::error::AppError,
    models::{auth::CurrentAdmin, rbac::Permission},
};

/// A section permission, named at the type level so handlers can require it in their signature.
pub trait PermissionDef: Send + Sync + 'static {
    fn permission() -> Permission;
}

/// Rejects with 403 unless the current admin is allowed into `T`'s section.
pub struct RequirePermission<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = parts.extensions.get::<CurrentAdmin>().ok_or(AppError::InvalidToken)?;
        ensure_any(admin, &[T::permission()])?;
        Ok(RequirePermission(PhantomData))
    }
}

/// Runtime form of the check, for routes whose section depends on a path parameter.
pub fn ensure_any(admin: &CurrentAdmin, permissions: &[Permission]) -> Result<(), AppError> {
    if admin.access.allows_any(permissions) {
        return Ok(());
    }

    let required = permissions
        .iter()
        .map(|p| p.slug())
        .collect::<Vec<_>>()
        .join(" | ");
    tracing::debug!(user_id = %admin.uid, required = %required, "Permission denied");
    Err(AppError::PermissionDenied(required))
}

macro_rules! permission_types {
    ($($name:ident => $permission:expr),* $(,)?) => {
        $(
            pub struct $name;
            impl PermissionDef for $name {
                fn permission() -> Permission { $permission }
            }
        )*
    };
}

permission_types! {
    PermDashboard => Permission::Dashboard,
    PermNews => Permission::News,
    PermCourses => Permission::Courses,
    PermPages => Permission::Pages,
    PermSettings => Permission::Settings,
    PermVisibility => Permission::Visibility,
    PermUserManagement => Permission::UserManagement,
    PermSystemHealth => Permission::SystemHealth,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rbac::{AccessProfile, Role};
    use uuid::Uuid;

    fn admin(role: Role, permissions: &[Permission]) -> CurrentAdmin {
        CurrentAdmin {
            uid: Uuid::new_v4(),
            email: "editor@college.edu".into(),
            session_id: Uuid::new_v4(),
            access: AccessProfile { role, permissions: permissions.to_vec() },
        }
    }

    #[test]
    fn any_listed_permission_is_enough() {
        let sports_editor = admin(Role::ChildAdmin, &[Permission::Sports]);
        let events = [Permission::Events, Permission::Sports, Permission::Workshops];
        assert!(ensure_any(&sports_editor, &events).is_ok());
        assert!(matches!(
            ensure_any(&sports_editor, &[Permission::Faculty]),
            Err(AppError::PermissionDenied(p)) if p == "faculty"
        ));
    }

    #[test]
    fn super_admin_passes_every_check() {
        let root = admin(Role::SuperAdmin, &[]);
        assert!(ensure_any(&root, &[PermSystemHealth::permission()]).is_ok());
    }

    #[tokio::test]
    async fn extractor_reads_the_current_admin() {
        let (mut parts, _) = axum::http::Request::new(()).into_parts();
        parts.extensions.insert(admin(Role::ChildAdmin, &[Permission::News]));

        assert!(RequirePermission::<PermNews>::from_request_parts(&mut parts, &()).await.is_ok());
        assert!(matches!(
            RequirePermission::<PermCourses>::from_request_parts(&mut parts, &()).await,
            Err(AppError::PermissionDenied(_))
        ));
    }

    #[tokio::test]
    async fn extractor_without_admin_is_unauthorized() {
        let (mut parts, _) = axum::http::Request::new(()).into_parts();
        assert!(matches!(
            RequirePermission::<PermNews>::from_request_parts(&mut parts, &()).await,
            Err(AppError::InvalidToken)
        ));
    }
}
