use axum::http::HeaderMap;

mod error;

pub use error::AuthError;

pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const BEARER_PREFIX: &str = "Bearer ";

/// Check that the request carries a syntactically valid bearer token.
///
/// This is a presence gate only: the token is never decoded or verified
/// locally. Verification is the upstream's responsibility.
pub fn require_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION_HEADER)
        .ok_or(AuthError::MissingAuthHeader)?;

    let value = value
        .to_str()
        .map_err(|_| AuthError::MalformedAuthHeader)?;

    let token = value
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthError::MalformedAuthHeader)?;

    if token.trim().is_empty() {
        return Err(AuthError::EmptyBearerToken);
    }

    Ok(token)
}
