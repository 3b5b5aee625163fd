//! Configuration for the chat client

use std::time::Duration;

const DEFAULT_WEBHOOK_URL: &str =
    "https://gorgeous-egret-smart.ngrok-free.app/webhook/3a31f0b7-ba10-4d4d-b72b-9d5c55399889";
const DEFAULT_API_URL: &str = "http://localhost:3001";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Endpoints and timings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Workflow webhook answers are posted to
    pub webhook_url: String,
    /// Base URL of the messages backend
    pub api_base_url: String,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            webhook_url: DEFAULT_WEBHOOK_URL.to_string(),
            api_base_url: DEFAULT_API_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ChatConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset, empty, unparseable, or zero values
    /// keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let positive = |key: &str| {
            non_empty(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|n| *n > 0)
        };

        Self {
            webhook_url: non_empty("WAYFARER_WEBHOOK_URL").unwrap_or(defaults.webhook_url),
            api_base_url: non_empty("WAYFARER_API_URL").unwrap_or(defaults.api_base_url),
            poll_interval: positive("WAYFARER_POLL_INTERVAL_MS")
                .map_or(defaults.poll_interval, Duration::from_millis),
            request_timeout: positive("WAYFARER_REQUEST_TIMEOUT_SECS")
                .map_or(defaults.request_timeout, Duration::from_secs),
        }
    }
}
