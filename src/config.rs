//! Configuration management for the WeChat Open Platform SDK.
//!
//! Configuration is applied once at client construction time. Per-call
//! adjustments go through [`RequestOptions`], which is merged over the
//! construction-time defaults with per-call values winning and header maps
//! merging key-wise rather than replacing.
//!
//! ## Usage
//!
//! ```rust
//! use wechat_open_rs::config::{Config, HttpConfig};
//!
//! let config = Config::builder()
//!     .http(HttpConfig::builder().request_timeout_secs(60).build())
//!     .build();
//! assert!(config.validate().is_ok());
//! ```

use crate::error::{Result, WeChatError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Main configuration structure for the SDK.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP client configuration
    pub http: HttpConfig,
}

/// HTTP client configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds (default: 30)
    pub request_timeout_secs: u64,
    /// Connection timeout in seconds (default: 10)
    pub connect_timeout_secs: u64,
    /// Base URL for the WeChat API (default: "https://api.weixin.qq.com/cgi-bin/")
    pub base_url: String,
    /// User agent string for requests
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            base_url: "https://api.weixin.qq.com/cgi-bin/".to_string(),
            user_agent: format!("wechat-open-rs/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Config {
    /// Creates a new configuration builder.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("WECHAT_OPEN_REQUEST_TIMEOUT") {
            config.http.request_timeout_secs = val.parse().map_err(|_| {
                WeChatError::config_error("Invalid WECHAT_OPEN_REQUEST_TIMEOUT value")
            })?;
        }

        if let Ok(val) = std::env::var("WECHAT_OPEN_CONNECT_TIMEOUT") {
            config.http.connect_timeout_secs = val.parse().map_err(|_| {
                WeChatError::config_error("Invalid WECHAT_OPEN_CONNECT_TIMEOUT value")
            })?;
        }

        if let Ok(val) = std::env::var("WECHAT_OPEN_BASE_URL") {
            config.http.base_url = val;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for consistency and constraints.
    pub fn validate(&self) -> Result<()> {
        if self.http.request_timeout_secs == 0 {
            return Err(WeChatError::config_error(
                "request_timeout_secs must be greater than 0",
            ));
        }

        if self.http.connect_timeout_secs == 0 {
            return Err(WeChatError::config_error(
                "connect_timeout_secs must be greater than 0",
            ));
        }

        if self.http.base_url.is_empty() {
            return Err(WeChatError::config_error("base_url cannot be empty"));
        }

        Ok(())
    }

    /// Request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.http.request_timeout_secs)
    }

    /// Connection timeout as a [`Duration`].
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.http.connect_timeout_secs)
    }
}

/// Builder for creating [`Config`] instances.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    http: Option<HttpConfig>,
}

impl ConfigBuilder {
    /// Sets the HTTP configuration.
    pub fn http(mut self, http: HttpConfig) -> Self {
        self.http = Some(http);
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> Config {
        Config {
            http: self.http.unwrap_or_default(),
        }
    }
}

impl HttpConfig {
    /// Creates a new HTTP config builder.
    pub fn builder() -> HttpConfigBuilder {
        HttpConfigBuilder::default()
    }
}

/// Builder for [`HttpConfig`].
#[derive(Debug, Default)]
pub struct HttpConfigBuilder {
    request_timeout_secs: Option<u64>,
    connect_timeout_secs: Option<u64>,
    base_url: Option<String>,
    user_agent: Option<String>,
}

impl HttpConfigBuilder {
    pub fn request_timeout_secs(mut self, timeout: u64) -> Self {
        self.request_timeout_secs = Some(timeout);
        self
    }

    pub fn connect_timeout_secs(mut self, timeout: u64) -> Self {
        self.connect_timeout_secs = Some(timeout);
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn build(self) -> HttpConfig {
        let default = HttpConfig::default();
        HttpConfig {
            request_timeout_secs: self
                .request_timeout_secs
                .unwrap_or(default.request_timeout_secs),
            connect_timeout_secs: self
                .connect_timeout_secs
                .unwrap_or(default.connect_timeout_secs),
            base_url: self.base_url.unwrap_or(default.base_url),
            user_agent: self.user_agent.unwrap_or(default.user_agent),
        }
    }
}

/// Per-call request overrides.
///
/// Defaults come from the construction-time [`Config`]; values set here win.
/// Headers merge key-wise: a per-call header replaces the default for the same
/// key and leaves the rest untouched.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Overrides the request timeout for this call.
    pub timeout: Option<Duration>,
    /// Extra or replacement headers for this call.
    pub headers: HashMap<String, String>,
}

impl RequestOptions {
    /// Creates empty options (pure defaults).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-call timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Adds a header for this call.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Merges these options over `defaults`, per-call values winning.
    pub fn merged_over(&self, defaults: &RequestOptions) -> RequestOptions {
        let mut headers = defaults.headers.clone();
        for (name, value) in &self.headers {
            headers.insert(name.clone(), value.clone());
        }
        RequestOptions {
            timeout: self.timeout.or(defaults.timeout),
            headers,
        }
    }
}
