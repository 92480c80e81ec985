//! Configuration domain module

mod app_config;

pub use app_config::{AppConfig, SilenceConfig, DEFAULT_API_BASE_URL, DEFAULT_MODEL};
