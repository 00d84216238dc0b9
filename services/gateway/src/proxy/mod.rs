mod error;
pub(crate) mod handler;
mod stream;
mod upstream;

pub use error::GatewayError;
pub use handler::proxy_entry;
pub use upstream::API_KEY_HEADER;

use std::sync::Arc;
use std::time::Duration;

use crate::config::GatewayConfig;

/// Shared proxy state: the immutable configuration plus two pre-built
/// upstream clients. The buffered client enforces the total request timeout;
/// the streaming client only bounds connection establishment, since media
/// transfers may legitimately outlive any fixed deadline.
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<GatewayConfig>,
    pub json_client: reqwest::Client,
    pub stream_client: reqwest::Client,
}

impl GatewayState {
    pub fn new(config: GatewayConfig) -> anyhow::Result<Self> {
        let json_client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .pool_max_idle_per_host(16)
            .build()?;

        let stream_client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            config: Arc::new(config),
            json_client,
            stream_client,
        })
    }
}
