use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use scitiger_gateway::config::GatewayConfig;
use scitiger_gateway::server::GatewayServer;
use tokio::task::JoinHandle;

// Re-export the e2e harness module so benches can spawn the real binary
// through the same machinery the e2e suite uses.
#[path = "../tests/e2e/harness.rs"]
pub mod e2e_harness;

pub use e2e_harness::{
    find_free_port, wait_for_service_health, PortConfig, ServiceConfig, ServiceProcess,
    TestHarness,
};

/// A gateway served from the current process on an ephemeral port.
///
/// Benchmarks that want to isolate proxy overhead from process-spawn noise
/// use this instead of [`TestHarness`], which runs the binary via `cargo run`.
pub struct InProcessGateway {
    base_url: String,
    server_task: JoinHandle<Result<()>>,
}

impl InProcessGateway {
    /// Spawn a gateway inside the current runtime, pointed at the given
    /// upstream base URLs, and wait until its health endpoint answers.
    pub async fn start(spider_base_url: &str, wechat_base_url: &str) -> Result<Self> {
        let config = GatewayConfig {
            host: "127.0.0.1".to_string(),
            port: find_free_port()?,
            spider_api_base_url: spider_base_url.to_string(),
            wechat_api_base_url: wechat_base_url.to_string(),
            log_level: "warn".to_string(),
            ..GatewayConfig::default()
        };
        config.validate().context("bench gateway config invalid")?;

        let base_url = format!("http://{}", config.listen_addr());
        let health_url = format!("{base_url}/health");
        let server = GatewayServer::new(config).context("constructing bench gateway")?;
        let server_task = tokio::spawn(server.run());

        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .context("building health check client")?;
        wait_for_service_health(&client, &health_url, Duration::from_secs(10)).await?;

        Ok(Self {
            base_url,
            server_task,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn shutdown(self) {
        self.server_task.abort();
        let _ = self.server_task.await;
    }
}
