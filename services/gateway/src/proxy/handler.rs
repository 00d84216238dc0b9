use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderMap, Method};
use axum::response::Response;
use bytes::Bytes;
use tracing::{debug, error, instrument};

use crate::auth;
use crate::platform::{AuthStrategy, PlatformRoute};

use super::{stream, upstream, GatewayError, GatewayState};

/// Single entry point for every platform family. The route table row decides
/// the local auth gate, the upstream target, and whether the request takes
/// the buffered JSON pipeline or the byte-stream passthrough.
#[instrument(
    skip_all,
    fields(platform = route.prefix, method = %method, path = %rest)
)]
pub async fn proxy_entry(
    State((state, route)): State<(GatewayState, &'static PlatformRoute)>,
    Path(rest): Path<String>,
    RawQuery(query): RawQuery,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if route.auth == AuthStrategy::BearerRequired {
        if let Err(err) = auth::require_bearer(&headers) {
            debug!(error = %err, "rejected unauthenticated request");
            return GatewayError::from(err).to_response();
        }
    }

    if route.is_streaming(&method, &rest) {
        return stream::stream_media(&state, route, &rest, query.as_deref(), &headers).await;
    }

    match upstream::forward_json(
        &state,
        route,
        method,
        &rest,
        query.as_deref(),
        &headers,
        body,
    )
    .await
    {
        Ok(response) => response,
        Err(err) => {
            error!(error = %err, "proxy request failed");
            err.to_response()
        }
    }
}
