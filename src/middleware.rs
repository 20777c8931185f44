pub mod auth;
pub mod client;
pub mod i18n;
pub mod rbac;
