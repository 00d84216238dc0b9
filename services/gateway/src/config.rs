use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Listen host address
    pub host: String,

    /// Listen port
    pub port: u16,

    /// Base URL of the spider backend (accounts/douyin/xiaohongshu/bilibili/zhihu)
    pub spider_api_base_url: String,

    /// Service credential injected as X-Api-Key on spider-family calls
    pub spider_api_key: Option<String>,

    /// Base URL of the wechat backend (already includes its API root)
    pub wechat_api_base_url: String,

    /// Total timeout for buffered JSON proxying, in seconds
    pub request_timeout_secs: u64,

    /// Connect timeout for upstream connections, in seconds
    pub connect_timeout_secs: u64,

    /// Total attempts for idempotent GET forwards (1 disables retries)
    pub retry_max_attempts: u32,

    /// Base backoff delay between retries, in milliseconds (doubled per attempt)
    pub retry_base_delay_ms: u64,

    /// Maximum inbound body size in bytes
    pub max_body_size_bytes: usize,

    /// Log level used when RUST_LOG is not set
    pub log_level: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            spider_api_base_url: "http://127.0.0.1:8010".to_string(),
            spider_api_key: None,
            wechat_api_base_url: "http://127.0.0.1:8011".to_string(),
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            retry_max_attempts: 2,
            retry_base_delay_ms: 100,
            max_body_size_bytes: 10 * 1024 * 1024,
            log_level: "info".to_string(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("GATEWAY_HOST") {
            config.host = host;
        }

        if let Ok(port) = std::env::var("GATEWAY_PORT") {
            config.port = port.parse().context("Invalid GATEWAY_PORT")?;
        }

        if let Ok(url) = std::env::var("SCITIGER_SPIDER_API_BASE_URL") {
            config.spider_api_base_url = url;
        }

        config.spider_api_key = std::env::var("SCITIGER_SPIDER_API_KEY")
            .ok()
            .filter(|key| !key.is_empty());

        if let Ok(url) = std::env::var("SCITIGER_WECHAT_API_BASE_URL") {
            config.wechat_api_base_url = url;
        }

        if let Ok(secs) = std::env::var("REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs =
                secs.parse().context("Invalid REQUEST_TIMEOUT_SECS")?;
        }

        if let Ok(secs) = std::env::var("CONNECT_TIMEOUT_SECS") {
            config.connect_timeout_secs =
                secs.parse().context("Invalid CONNECT_TIMEOUT_SECS")?;
        }

        if let Ok(attempts) = std::env::var("RETRY_MAX_ATTEMPTS") {
            config.retry_max_attempts =
                attempts.parse().context("Invalid RETRY_MAX_ATTEMPTS")?;
        }

        if let Ok(delay) = std::env::var("RETRY_BASE_DELAY_MS") {
            config.retry_base_delay_ms =
                delay.parse().context("Invalid RETRY_BASE_DELAY_MS")?;
        }

        if let Ok(size) = std::env::var("MAX_BODY_SIZE_BYTES") {
            config.max_body_size_bytes =
                size.parse().context("Invalid MAX_BODY_SIZE_BYTES")?;
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.log_level = level;
        }

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.spider_api_base_url.is_empty() {
            anyhow::bail!("SCITIGER_SPIDER_API_BASE_URL cannot be empty");
        }

        if self.wechat_api_base_url.is_empty() {
            anyhow::bail!("SCITIGER_WECHAT_API_BASE_URL cannot be empty");
        }

        for (name, url) in [
            ("SCITIGER_SPIDER_API_BASE_URL", &self.spider_api_base_url),
            ("SCITIGER_WECHAT_API_BASE_URL", &self.wechat_api_base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("{} must start with http:// or https://", name);
            }
        }

        if self.request_timeout_secs == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECS must be greater than 0");
        }

        if self.connect_timeout_secs == 0 {
            anyhow::bail!("CONNECT_TIMEOUT_SECS must be greater than 0");
        }

        if self.retry_max_attempts == 0 {
            anyhow::bail!("RETRY_MAX_ATTEMPTS must be at least 1");
        }

        if self.max_body_size_bytes == 0 {
            anyhow::bail!("MAX_BODY_SIZE_BYTES must be greater than 0");
        }

        Ok(())
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Get connect timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Get base retry delay as Duration
    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    /// Get the listen address
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
