use std::path::PathBuf;
use std::time::Duration;

use crate::task::PollConfig;

pub const DEFAULT_BASE_URL: &str = "https://api.comfy.org";

/// Shortest delay the builder accepts between status requests.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Configuration for talking to the Meshy API proxy.
///
/// Use [`MeshyConfig::builder()`] for ergonomic construction,
/// [`MeshyConfig::from_env()`] to pick up credentials from the environment,
/// or [`MeshyConfig::default()`] for the public endpoint with no credentials.
#[derive(Debug, Clone)]
pub struct MeshyConfig {
    /// Root URL of the API proxy. Endpoint paths are appended to it.
    pub base_url: String,

    /// Sent as `X-API-KEY` when present.
    pub api_key: Option<String>,

    /// Sent as `Authorization: Bearer ...` when present.
    pub auth_token: Option<String>,

    /// Timeout for each API request (submit, poll, upload).
    pub request_timeout: Duration,

    /// Timeout for a whole model download, body included. `None` = no limit.
    pub download_timeout: Option<Duration>,

    /// Cadence and overall timeout of the status polling loop.
    pub poll: PollConfig,

    /// Directory downloaded models are written to.
    pub output_dir: PathBuf,
}

impl Default for MeshyConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            auth_token: None,
            request_timeout: Duration::from_secs(60),
            download_timeout: None,
            poll: PollConfig::default(),
            output_dir: PathBuf::from("output"),
        }
    }
}

impl MeshyConfig {
    /// Start building a config with the builder pattern.
    pub fn builder() -> MeshyConfigBuilder {
        MeshyConfigBuilder::default()
    }

    /// Defaults overridden by environment variables:
    ///
    /// | variable | field |
    /// |---|---|
    /// | `COMFY_API_BASE` | `base_url` |
    /// | `COMFY_API_KEY` | `api_key` |
    /// | `COMFY_AUTH_TOKEN` | `auth_token` |
    /// | `MESHY_OUTPUT_DIR` | `output_dir` |
    /// | `MESHY_POLL_INTERVAL_SECS` | `poll.interval` |
    /// | `MESHY_POLL_TIMEOUT_SECS` | `poll.timeout` |
    /// | `MESHY_DOWNLOAD_TIMEOUT_SECS` | `download_timeout` |
    ///
    /// Empty or unparseable values are ignored, as is a zero poll interval.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let secs = |key: &str| {
            get(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
        };

        let mut builder = Self::builder();
        if let Some(url) = get("COMFY_API_BASE") {
            builder = builder.with_base_url(url);
        }
        if let Some(key) = get("COMFY_API_KEY") {
            builder = builder.with_api_key(key);
        }
        if let Some(token) = get("COMFY_AUTH_TOKEN") {
            builder = builder.with_auth_token(token);
        }
        if let Some(dir) = get("MESHY_OUTPUT_DIR") {
            builder = builder.with_output_dir(PathBuf::from(dir));
        }
        if let Some(interval) = secs("MESHY_POLL_INTERVAL_SECS").filter(|d| !d.is_zero()) {
            builder = builder.with_poll_interval(interval);
        }
        if let Some(timeout) = secs("MESHY_POLL_TIMEOUT_SECS") {
            builder = builder.with_poll_timeout(timeout);
        }
        if let Some(timeout) = secs("MESHY_DOWNLOAD_TIMEOUT_SECS") {
            builder = builder.with_download_timeout(timeout);
        }
        builder.build()
    }
}

/// Builder for [`MeshyConfig`].
#[derive(Default)]
pub struct MeshyConfigBuilder {
    config: MeshyConfig,
}

impl MeshyConfigBuilder {
    /// Point at a different API proxy (trailing slashes are trimmed).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.config.auth_token = Some(token.into());
        self
    }

    /// Set the timeout for each individual HTTP request.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Set the delay between status requests, at least [`MIN_POLL_INTERVAL`].
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll.interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    /// Give up polling after `timeout`.
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.config.poll.timeout = Some(timeout);
        self
    }

    /// Bound the total time of a model download.
    pub fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.config.download_timeout = Some(timeout);
        self
    }

    /// Set the directory downloaded models are written to.
    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.config.output_dir = dir;
        self
    }

    /// Build the final [`MeshyConfig`].
    pub fn build(self) -> MeshyConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = MeshyConfig::default();
        assert_eq!(config.base_url, "https://api.comfy.org");
        assert!(config.api_key.is_none());
        assert!(config.auth_token.is_none());
        assert_eq!(config.poll.interval, Duration::from_secs(5));
        assert!(config.poll.timeout.is_none());
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert!(config.download_timeout.is_none());
    }

    #[test]
    fn test_download_timeout_independent_of_request_timeout() {
        let config = MeshyConfig::builder()
            .with_request_timeout(Duration::from_secs(5))
            .build();
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert!(config.download_timeout.is_none());

        let config = MeshyConfig::builder()
            .with_download_timeout(Duration::from_secs(900))
            .build();
        assert_eq!(config.download_timeout, Some(Duration::from_secs(900)));
        assert_eq!(config.request_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let vars: HashMap<&str, &str> = [
            ("MESHY_POLL_INTERVAL_SECS", "0"),
            ("MESHY_DOWNLOAD_TIMEOUT_SECS", "1200"),
        ]
        .into_iter()
        .collect();
        let config = MeshyConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.poll.interval, Duration::from_secs(5));
        assert_eq!(config.download_timeout, Some(Duration::from_secs(1200)));

        let config = MeshyConfig::builder()
            .with_poll_interval(Duration::ZERO)
            .build();
        assert_eq!(config.poll.interval, MIN_POLL_INTERVAL);
    }

    #[test]
    fn test_builder() {
        let config = MeshyConfig::builder()
            .with_base_url("http://localhost:8080///")
            .with_api_key("key-1")
            .with_poll_interval(Duration::from_millis(250))
            .with_poll_timeout(Duration::from_secs(600))
            .with_output_dir(PathBuf::from("/tmp/models"))
            .build();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.api_key.as_deref(), Some("key-1"));
        assert_eq!(config.poll.interval, Duration::from_millis(250));
        assert_eq!(config.poll.timeout, Some(Duration::from_secs(600)));
        assert_eq!(config.output_dir, PathBuf::from("/tmp/models"));
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("COMFY_API_BASE", "http://proxy.local/"),
            ("COMFY_API_KEY", "secret"),
            ("COMFY_AUTH_TOKEN", ""),
            ("MESHY_POLL_INTERVAL_SECS", "2"),
            ("MESHY_POLL_TIMEOUT_SECS", "soon"),
        ]
        .into_iter()
        .collect();
        let config = MeshyConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.base_url, "http://proxy.local");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert!(config.auth_token.is_none());
        assert_eq!(config.poll.interval, Duration::from_secs(2));
        assert!(config.poll.timeout.is_none());
    }
}
