use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Backend the client talks to when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "https://learn-stack-backend.vercel.app";

/// Pause between two streamed reply characters.
pub const DEFAULT_TYPING_DELAY_MS: u64 = 15;

/// Client configuration as stored in `config.toml`.
///
/// Every field is optional in the file; missing fields fall back to the
/// defaults above.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub typing_delay_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            typing_delay_ms: DEFAULT_TYPING_DELAY_MS,
            request_timeout_secs: None,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_typing_delay_ms(mut self, typing_delay_ms: u64) -> Self {
        self.typing_delay_ms = typing_delay_ms;
        self
    }

    pub fn typing_delay(&self) -> Duration {
        Duration::from_millis(self.typing_delay_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Joins `path` onto the base URL, tolerating a trailing slash on the base.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}
