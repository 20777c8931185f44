pub mod auth;
pub mod dashboard_service;
pub mod news_service;
pub mod session_service;
pub mod user_service;
