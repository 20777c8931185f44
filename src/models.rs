pub mod activity;
pub mod auth;
pub mod content;
pub mod course;
pub mod dashboard;
pub mod news;
pub mod page;
pub mod rbac;
pub mod security;
pub mod session;
pub mod settings;
