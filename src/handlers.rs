pub mod access;
pub mod activity;
pub mod auth;
pub mod content;
pub mod courses;
pub mod dashboard;
pub mod news;
pub mod pages;
pub mod public;
pub mod sessions;
pub mod settings;
pub mod system;
pub mod users;
