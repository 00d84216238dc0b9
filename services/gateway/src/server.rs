use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::HeaderName,
    middleware::{self, Next},
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use uuid::Uuid;

use crate::config::GatewayConfig;
use crate::platform::{self, PlatformRoute};
use crate::proxy::{proxy_entry, GatewayState};

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

pub struct GatewayServer {
    config: Arc<GatewayConfig>,
    state: GatewayState,
}

impl GatewayServer {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let state =
            GatewayState::new(config).context("Failed to build upstream clients")?;
        Ok(Self {
            config: state.config.clone(),
            state,
        })
    }

    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(self.config.listen_addr())
            .await
            .context("Failed to bind TCP listener")?;
        let local_addr = listener
            .local_addr()
            .context("Failed to read bound address")?;
        info!(%local_addr, "scitiger-gateway listening");

        let router = create_router(self.state);
        axum::serve(listener, router.into_make_service())
            .await
            .context("Server error")?;
        Ok(())
    }
}

/// Assemble the full inbound surface: one wildcard route per platform family,
/// each carrying its row of the route table as state, plus the health probe.
pub fn create_router(state: GatewayState) -> Router {
    let max_body_size_bytes = state.config.max_body_size_bytes;

    let mut router = Router::new().route("/health", get(health_check));
    for route in platform::PLATFORMS {
        router = router.merge(platform_router(state.clone(), route));
    }

    router
        .layer(middleware::from_fn(set_request_id))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(max_body_size_bytes))
}

fn platform_router(state: GatewayState, route: &'static PlatformRoute) -> Router {
    let path = format!("/api/{}/*path", route.prefix);
    Router::new()
        .route(
            &path,
            get(proxy_entry)
                .post(proxy_entry)
                .put(proxy_entry)
                .delete(proxy_entry)
                .patch(proxy_entry),
        )
        .with_state((state, route))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "scitiger-gateway"
    }))
}

async fn set_request_id(
    mut request: axum::http::Request<Body>,
    next: Next,
) -> axum::response::Response {
    let request_id = Uuid::new_v4().to_string();
    request.extensions_mut().insert(request_id.clone());

    if let Ok(header_value) = axum::http::HeaderValue::from_str(&request_id) {
        request
            .headers_mut()
            .insert(REQUEST_ID_HEADER.clone(), header_value);
    }

    let mut response = next.run(request).await;

    if !response.headers().contains_key(&REQUEST_ID_HEADER) {
        if let Ok(header_value) = axum::http::HeaderValue::from_str(&request_id) {
            response
                .headers_mut()
                .insert(REQUEST_ID_HEADER.clone(), header_value);
        }
    }

    response
}
