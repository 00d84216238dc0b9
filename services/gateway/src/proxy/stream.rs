use axum::body::Body;
use axum::http::header::{self, HeaderName};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::{debug, error, info};

use crate::platform::PlatformRoute;

use super::upstream::build_target_url;
use super::GatewayState;

/// Request headers carried through to the media upstream. Range makes
/// player seeking work; Authorization lets the upstream apply its own
/// access control. Nothing else crosses.
const FORWARDED_REQUEST_HEADERS: [HeaderName; 2] = [header::RANGE, header::AUTHORIZATION];

/// Response headers the browser is allowed to see. Everything outside this
/// list is dropped so internal upstream headers never leak.
const RESPONSE_HEADER_ALLOWLIST: [HeaderName; 6] = [
    header::CONTENT_TYPE,
    header::CONTENT_LENGTH,
    header::CONTENT_RANGE,
    header::ACCEPT_RANGES,
    header::LAST_MODIFIED,
    header::ETAG,
];

/// Byte-stream passthrough for media. The upstream status (200 or 206) is
/// relayed as-is and the body is streamed without buffering. Failures are
/// reported as plain-text 502 rather than the JSON envelope, because a
/// stream can also fail after the headers have already been sent and no
/// envelope is possible at that point.
pub async fn stream_media(
    state: &GatewayState,
    route: &PlatformRoute,
    rest: &str,
    query: Option<&str>,
    headers: &HeaderMap,
) -> Response {
    let target = build_target_url(&state.config, route, rest, query);

    let mut request = state.stream_client.get(&target);
    for name in FORWARDED_REQUEST_HEADERS {
        if let Some(value) = headers.get(&name) {
            request = request.header(name, value.clone());
        }
    }

    debug!(upstream_url = %target, "forwarding media request to upstream");

    let upstream = match request.send().await {
        Ok(response) => response,
        Err(err) => {
            error!(upstream_url = %target, error = %err, "media upstream unreachable");
            return (
                StatusCode::BAD_GATEWAY,
                format!("upstream media fetch failed: {err}"),
            )
                .into_response();
        }
    };

    let status = upstream.status();
    info!(status = status.as_u16(), "streaming upstream response");

    let mut builder = Response::builder().status(status);
    for (name, value) in forwarded_response_headers(upstream.headers()) {
        builder = builder.header(name, value);
    }

    builder
        .body(Body::from_stream(upstream.bytes_stream()))
        .unwrap_or_else(|err| {
            error!(error = %err, "failed to assemble streaming response");
            (
                StatusCode::BAD_GATEWAY,
                format!("upstream media fetch failed: {err}"),
            )
                .into_response()
        })
}

fn forwarded_response_headers(headers: &HeaderMap) -> Vec<(HeaderName, HeaderValue)> {
    RESPONSE_HEADER_ALLOWLIST
        .iter()
        .filter_map(|name| {
            headers
                .get(name)
                .map(|value| (name.clone(), value.clone()))
        })
        .collect()
}
