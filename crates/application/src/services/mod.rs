pub mod user_app_service;

pub use user_app_service::UserAppService;
