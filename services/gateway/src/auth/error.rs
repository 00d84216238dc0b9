use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingAuthHeader,

    #[error("Malformed Authorization header")]
    MalformedAuthHeader,

    #[error("Empty bearer token")]
    EmptyBearerToken,
}
