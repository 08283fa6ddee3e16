use std::env;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Base address of the booking assistant backend
    pub api_base_url: String,
    pub request_timeout: Duration,
}

impl AppConfig {
    /// Replace the configured backend address, e.g. from a CLI flag.
    pub fn with_api_url(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url {
            self.api_base_url = url;
        }
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let api_base_url =
            env::var("CONCIERGE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let timeout_secs = env::var("CONCIERGE_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|secs| secs.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        Self {
            api_base_url,
            request_timeout: Duration::from_secs(timeout_secs),
        }
    }
}
