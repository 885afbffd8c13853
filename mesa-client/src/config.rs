//! Client configuration

use std::path::PathBuf;
use std::time::Duration;

/// Client configuration for connecting to mesa-server
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:8080")
    pub base_url: String,

    /// JWT token for authentication
    pub token: Option<String>,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: 30,
        }
    }

    /// Set the JWT token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Create an HTTP client from this configuration
    pub fn build_http_client(&self) -> crate::ClientResult<super::HttpClient> {
        super::HttpClient::new(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}

/// Driver dashboard refresh bounds
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Driver new-order watcher settings
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    poll_interval: Duration,
    /// redb file holding the seen order ids (None = in memory only)
    pub seen_store_path: Option<PathBuf>,
}

impl WatcherConfig {
    pub fn new() -> Self {
        Self {
            poll_interval: MAX_POLL_INTERVAL,
            seen_store_path: None,
        }
    }

    /// Clamped to 5..=10 seconds
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.clamp(MIN_POLL_INTERVAL, MAX_POLL_INTERVAL);
        self
    }

    pub fn with_seen_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.seen_store_path = Some(path.into());
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self::new()
    }
}
