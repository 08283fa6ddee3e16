mod config;
pub use config::{AppConfig, DEFAULT_API_URL, DEFAULT_REQUEST_TIMEOUT_SECS};
