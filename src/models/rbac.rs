// src/models/rbac.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::common::error::AppError;

/// A site section an admin may be granted, plus the `all` wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    All,
    Dashboard,
    Events,
    Students,
    Admissions,
    Sports,
    Workshops,
    News,
    Inquiries,
    Subscribers,
    Faculty,
    Achievements,
    Placements,
    Courses,
    Visibility,
    UserManagement,
    Pages,
    Settings,
    Seo,
    SystemHealth,
}

impl Permission {
    pub fn slug(self) -> &'static str {
        match self {
            Permission::All => "all",
            Permission::Dashboard => "dashboard",
            Permission::Events => "events",
            Permission::Students => "students",
            Permission::Admissions => "admissions",
            Permission::Sports => "sports",
            Permission::Workshops => "workshops",
            Permission::News => "news",
            Permission::Inquiries => "inquiries",
            Permission::Subscribers => "subscribers",
            Permission::Faculty => "faculty",
            Permission::Achievements => "achievements",
            Permission::Placements => "placements",
            Permission::Courses => "courses",
            Permission::Visibility => "visibility",
            Permission::UserManagement => "user_management",
            Permission::Pages => "pages",
            Permission::Settings => "settings",
            Permission::Seo => "seo",
            Permission::SystemHealth => "system_health",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Permission {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let permission = match s {
            "all" => Permission::All,
            "dashboard" => Permission::Dashboard,
            "events" => Permission::Events,
            "students" => Permission::Students,
            "admissions" => Permission::Admissions,
            "sports" => Permission::Sports,
            "workshops" => Permission::Workshops,
            "news" => Permission::News,
            "inquiries" => Permission::Inquiries,
            "subscribers" => Permission::Subscribers,
            "faculty" => Permission::Faculty,
            "achievements" => Permission::Achievements,
            "placements" => Permission::Placements,
            "courses" => Permission::Courses,
            "visibility" => Permission::Visibility,
            "user_management" => Permission::UserManagement,
            "pages" => Permission::Pages,
            "settings" => Permission::Settings,
            "seo" => Permission::Seo,
            "system_health" => Permission::SystemHealth,
            other => return Err(AppError::UnknownPermission(other.to_string())),
        };
        Ok(permission)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    ChildAdmin,
    Migration,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::ChildAdmin => "child_admin",
            Role::Migration => "migration",
        }
    }

    /// Stored profiles may lack a role or carry one we don't know.
    pub fn from_stored(role: Option<&str>) -> Self {
        match role {
            Some("super_admin") => Role::SuperAdmin,
            Some("migration") => Role::Migration,
            _ => Role::ChildAdmin,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    #[schema(example = "News")]
    pub label: &'static str,
    #[schema(example = "/admin/news")]
    pub path: &'static str,
    pub permission: Permission,
}

const fn item(label: &'static str, path: &'static str, permission: Permission) -> MenuItem {
    MenuItem { label, path, permission }
}

pub static MENU: &[MenuItem] = &[
    item("Dashboard", "/admin", Permission::Dashboard),
    item("Events", "/admin/events", Permission::Events),
    item("Top Students", "/admin/students", Permission::Students),
    item("Admissions", "/admin/admissions", Permission::Admissions),
    item("Sports", "/admin/sports", Permission::Sports),
    item("Workshops", "/admin/workshops", Permission::Workshops),
    item("News", "/admin/news", Permission::News),
    item("Inquiries", "/admin/inquiries", Permission::Inquiries),
    item("Subscribers", "/admin/subscribers", Permission::Subscribers),
    item("Faculty", "/admin/faculty", Permission::Faculty),
    item("Achievements", "/admin/achievements", Permission::Achievements),
    item("Placements", "/admin/placements", Permission::Placements),
    item("Courses", "/admin/courses", Permission::Courses),
    item("Section Visibility", "/admin/visibility", Permission::Visibility),
    item("User Management", "/admin/users", Permission::UserManagement),
    item("Page Content", "/admin/pages", Permission::Pages),
    item("Settings", "/admin/settings", Permission::Settings),
    item("SEO Manager", "/admin/seo", Permission::Seo),
    item("System Health", "/admin/system", Permission::SystemHealth),
];

// Every admin screen and the permission guarding it. `/admin` covers any
// sub-path not listed more specifically.
static ROUTE_PERMISSIONS: &[(&str, Permission)] = &[
    ("/admin", Permission::Dashboard),
    ("/admin/events", Permission::Events),
    ("/admin/students", Permission::Students),
    ("/admin/admissions", Permission::Admissions),
    ("/admin/subscribers", Permission::Subscribers),
    ("/admin/sports", Permission::Sports),
    ("/admin/workshops", Permission::Workshops),
    ("/admin/news", Permission::News),
    ("/admin/inquiries", Permission::Inquiries),
    ("/admin/faculty", Permission::Faculty),
    ("/admin/achievements", Permission::Achievements),
    ("/admin/placements", Permission::Placements),
    ("/admin/courses", Permission::Courses),
    ("/admin/pages", Permission::Pages),
    ("/admin/visibility", Permission::Visibility),
    ("/admin/users", Permission::UserManagement),
    ("/admin/settings", Permission::Settings),
    ("/admin/seo", Permission::Seo),
    ("/admin/system", Permission::SystemHealth),
];

pub const DASHBOARD_PATH: &str = "/admin/dashboard";
pub const LOGIN_PATH: &str = "/admin/login";

/// The permission guarding `path`, using the most specific (longest) matching route.
pub fn required_permission(path: &str) -> Option<Permission> {
    ROUTE_PERMISSIONS
        .iter()
        .filter(|(route, _)| {
            path == *route
                || path
                    .strip_prefix(route)
                    .is_some_and(|rest| rest.starts_with('/'))
        })
        .max_by_key(|(route, _)| route.len())
        .map(|(_, permission)| *permission)
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteAccess {
    pub path: String,
    pub allowed: bool,
    pub required_permission: Option<Permission>,
    #[schema(example = "/admin/news")]
    pub fallback_path: &'static str,
    #[schema(example = "News")]
    pub fallback_label: &'static str,
}

/// Role plus permission list: everything the back-office needs to decide
/// what an admin can see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessProfile {
    pub role: Role,
    pub permissions: Vec<Permission>,
}

impl AccessProfile {
    /// Builds a profile from stored strings; unknown permissions are dropped.
    pub fn from_stored(role: Option<&str>, permissions: &[String]) -> Self {
        let permissions = permissions
            .iter()
            .filter_map(|p| match p.parse::<Permission>() {
                Ok(permission) => Some(permission),
                Err(_) => {
                    tracing::debug!("Ignoring unknown stored permission '{}'", p);
                    None
                }
            })
            .collect();

        Self {
            role: Role::from_stored(role),
            permissions,
        }
    }

    /// Fallback for the designated account when its profile is gone:
    /// only the user management (recovery) screen.
    pub fn migration() -> Self {
        Self {
            role: Role::Migration,
            permissions: vec![Permission::UserManagement],
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.role == Role::SuperAdmin || self.permissions.contains(&Permission::All)
    }

    pub fn allows(&self, permission: Permission) -> bool {
        self.is_unrestricted() || self.permissions.contains(&permission)
    }

    pub fn allows_any(&self, permissions: &[Permission]) -> bool {
        permissions.iter().any(|p| self.allows(*p))
    }

    /// Menu entries this profile can see, in menu order.
    pub fn menu(&self) -> Vec<&'static MenuItem> {
        MENU.iter().filter(|item| self.allows(item.permission)).collect()
    }

    pub fn check_route(&self, path: &str) -> RouteAccess {
        let required = required_permission(path);
        let allowed = required.is_none_or(|p| self.allows(p));
        let first = self.menu().into_iter().next();

        RouteAccess {
            path: path.to_string(),
            allowed,
            required_permission: required,
            fallback_path: first.map_or(LOGIN_PATH, |item| item.path),
            fallback_label: first.map_or("Login", |item| item.label),
        }
    }

    /// Where to send the admin right after login.
    pub fn landing_path(&self) -> &'static str {
        if self.is_unrestricted() || self.permissions.contains(&Permission::Dashboard) {
            return DASHBOARD_PATH;
        }

        self.permissions
            .iter()
            .find_map(|p| MENU.iter().find(|item| item.permission == *p))
            .map_or(DASHBOARD_PATH, |item| item.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child(permissions: &[Permission]) -> AccessProfile {
        AccessProfile {
            role: Role::ChildAdmin,
            permissions: permissions.to_vec(),
        }
    }

    #[test]
    fn menu_contains_exactly_the_granted_sections() {
        let granted = [Permission::News, Permission::Courses, Permission::Events];
        let menu = child(&granted).menu();

        let expected: Vec<&str> = MENU
            .iter()
            .filter(|item| granted.contains(&item.permission))
            .map(|item| item.path)
            .collect();
        let actual: Vec<&str> = menu.iter().map(|item| item.path).collect();

        assert_eq!(actual, expected);
        assert_eq!(actual, vec!["/admin/events", "/admin/news", "/admin/courses"]);
    }

    #[test]
    fn super_admin_and_wildcard_see_everything() {
        let super_admin = AccessProfile { role: Role::SuperAdmin, permissions: vec![] };
        assert_eq!(super_admin.menu().len(), MENU.len());
        assert_eq!(child(&[Permission::All]).menu().len(), MENU.len());
    }

    #[test]
    fn empty_permissions_see_nothing() {
        let profile = child(&[]);
        assert!(profile.menu().is_empty());
        let access = profile.check_route("/admin/news");
        assert!(!access.allowed);
        assert_eq!(access.fallback_path, LOGIN_PATH);
    }

    #[test]
    fn longest_route_wins() {
        assert_eq!(required_permission("/admin"), Some(Permission::Dashboard));
        assert_eq!(required_permission("/admin/news"), Some(Permission::News));
        assert_eq!(required_permission("/admin/news/42/edit"), Some(Permission::News));
        assert_eq!(required_permission("/admin/users"), Some(Permission::UserManagement));
        assert_eq!(required_permission("/admin/system"), Some(Permission::SystemHealth));
    }

    #[test]
    fn prefix_must_end_on_a_segment_boundary() {
        // "/admin/newsletter" is not under "/admin/news"
        assert_eq!(required_permission("/admin/newsletter"), Some(Permission::Dashboard));
        assert_eq!(required_permission("/administrator"), None);
        assert_eq!(required_permission("/news"), None);
    }

    #[test]
    fn denied_route_points_to_first_visible_menu_item() {
        let access = child(&[Permission::Placements, Permission::News]).check_route("/admin/users");
        assert!(!access.allowed);
        assert_eq!(access.required_permission, Some(Permission::UserManagement));
        assert_eq!(access.fallback_path, "/admin/news");
        assert_eq!(access.fallback_label, "News");
    }

    #[test]
    fn unguarded_paths_are_allowed() {
        assert!(child(&[]).check_route("/about").allowed);
    }

    #[test]
    fn landing_prefers_dashboard_then_first_granted_section() {
        assert_eq!(child(&[Permission::Dashboard, Permission::News]).landing_path(), DASHBOARD_PATH);
        assert_eq!(child(&[Permission::All]).landing_path(), DASHBOARD_PATH);
        assert_eq!(child(&[Permission::Settings, Permission::News]).landing_path(), "/admin/settings");
        assert_eq!(child(&[]).landing_path(), DASHBOARD_PATH);
    }

    #[test]
    fn stored_profiles_tolerate_unknown_values() {
        let profile = AccessProfile::from_stored(None, &["news".into(), "bogus".into(), "seo".into()]);
        assert_eq!(profile.role, Role::ChildAdmin);
        assert_eq!(profile.permissions, vec![Permission::News, Permission::Seo]);
        assert_eq!(Role::from_stored(Some("super_admin")), Role::SuperAdmin);
    }

    #[test]
    fn migration_profile_is_limited_to_recovery() {
        let profile = AccessProfile::migration();
        assert_eq!(profile.menu().len(), 1);
        assert_eq!(profile.landing_path(), "/admin/users");
        assert!(!profile.allows(Permission::Dashboard));
    }

    #[test]
    fn permission_slugs_round_trip() {
        for item in MENU {
            assert_eq!(item.permission.slug().parse::<Permission>().unwrap(), item.permission);
        }
        assert!("nope".parse::<Permission>().is_err());
    }
}
