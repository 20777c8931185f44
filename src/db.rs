pub mod activity_repo;
pub use activity_repo::ActivityRepository;
pub mod content_repo;
pub use content_repo::ContentRepository;
pub mod course_repo;
pub use course_repo::CourseRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
pub mod news_repo;
pub use news_repo::NewsRepository;
pub mod page_repo;
pub use page_repo::PageRepository;
pub mod security_repo;
pub use security_repo::SecurityRepository;
pub mod session_repo;
pub use session_repo::SessionRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;
pub mod user_repo;
pub use user_repo::UserRepository;
