use axum::body::Body;
use axum::http::{header, HeaderMap, Method};
use axum::response::Response;
use bytes::Bytes;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::auth::AUTHORIZATION_HEADER;
use crate::config::GatewayConfig;
use crate::platform::PlatformRoute;

use super::{GatewayError, GatewayState};

pub const API_KEY_HEADER: &str = "X-Api-Key";

/// Buffered JSON forward: build the upstream target, attach credentials,
/// send, and relay the upstream response verbatim. Idempotent GETs are
/// retried on transport failures up to the configured attempt budget;
/// upstream HTTP statuses are never retried and never treated as errors.
pub async fn forward_json(
    state: &GatewayState,
    route: &PlatformRoute,
    method: Method,
    rest: &str,
    query: Option<&str>,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<Response, GatewayError> {
    let target = build_target_url(&state.config, route, rest, query);
    let body_json = parse_json_body(&method, &body);

    let max_attempts = if method == Method::GET {
        state.config.retry_max_attempts.max(1)
    } else {
        1
    };
    let mut delay = state.config.retry_base_delay();
    let mut attempt = 0;

    loop {
        attempt += 1;

        let mut request = state.json_client.request(method.clone(), &target);
        if route.inject_api_key {
            if let Some(key) = state.config.spider_api_key.as_deref() {
                request = request.header(API_KEY_HEADER, key);
            }
        }
        if let Some(auth) = headers.get(AUTHORIZATION_HEADER) {
            request = request.header(AUTHORIZATION_HEADER, auth.clone());
        }
        if let Some(json) = &body_json {
            request = request.json(json);
        }

        debug!(upstream_url = %target, attempt, "forwarding request to upstream");
        let start = std::time::Instant::now();

        match request.send().await {
            Ok(response) => {
                info!(
                    status = response.status().as_u16(),
                    latency_ms = start.elapsed().as_millis() as u64,
                    "upstream response received"
                );
                return relay_response(response).await;
            }
            Err(err) if attempt < max_attempts => {
                warn!(
                    attempt,
                    error = %err,
                    retry_in_ms = delay.as_millis() as u64,
                    "transport failure, retrying"
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            Err(err) => return Err(GatewayError::Transport(err)),
        }
    }
}

/// Upstream target: rewritten path on the family's base URL, with the raw
/// query string carried over verbatim.
pub(crate) fn build_target_url(
    config: &GatewayConfig,
    route: &PlatformRoute,
    rest: &str,
    query: Option<&str>,
) -> String {
    let base = route.base_url(config).trim_end_matches('/');
    let path = route.rewrite_path(rest);
    match query {
        Some(q) if !q.is_empty() => format!("{base}{path}?{q}"),
        _ => format!("{base}{path}"),
    }
}

/// Bodies are forwarded only for methods that carry one, and only when they
/// parse as JSON. Anything else is treated as no body at all, so bodiless
/// PUT/PATCH calls and junk payloads degrade silently instead of failing.
pub(crate) fn parse_json_body(method: &Method, body: &Bytes) -> Option<Value> {
    if matches!(*method, Method::GET | Method::DELETE) {
        return None;
    }
    if body.is_empty() {
        return None;
    }
    serde_json::from_slice(body).ok()
}

/// Relay the upstream response unchanged: status, Content-Type, and the
/// original body bytes. A body that the upstream declares as JSON but that
/// does not parse is a transport-class failure.
async fn relay_response(response: reqwest::Response) -> Result<Response, GatewayError> {
    let status = response.status();
    let content_type = response.headers().get(header::CONTENT_TYPE).cloned();
    let body = response.bytes().await?;

    let declares_json = content_type
        .as_ref()
        .and_then(|value| value.to_str().ok())
        .map(|value| value.contains("application/json"))
        .unwrap_or(false);
    if declares_json && !body.is_empty() {
        serde_json::from_slice::<Value>(&body)?;
    }

    let mut builder = Response::builder().status(status);
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    Ok(builder.body(Body::from(body))?)
}
