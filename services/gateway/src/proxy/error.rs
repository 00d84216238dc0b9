use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::{json, Value};
use thiserror::Error;

use crate::auth::AuthError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    Auth(#[from] AuthError),

    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned invalid JSON: {0}")]
    InvalidUpstreamJson(#[from] serde_json::Error),

    #[error("failed to assemble response: {0}")]
    Internal(#[from] axum::http::Error),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Auth(_) => StatusCode::UNAUTHORIZED,
            GatewayError::Transport(_)
            | GatewayError::InvalidUpstreamJson(_)
            | GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The JSON body paired with `status_code()`. Auth failures use the fixed
    /// login-required envelope; everything else uses the generic proxy-failure
    /// envelope with the underlying message attached for diagnostics.
    pub fn envelope(&self) -> Value {
        match self {
            GatewayError::Auth(_) => json!({
                "error": "未授权访问",
                "message": "请先登录",
            }),
            _ => json!({
                "success": false,
                "message": "代理请求失败",
                "error": self.to_string(),
            }),
        }
    }

    pub fn to_response(&self) -> Response {
        (self.status_code(), Json(self.envelope())).into_response()
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        self.to_response()
    }
}
