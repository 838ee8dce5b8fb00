use thiserror::Error;

/// Reasons a `/users` response body could not be decoded.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("response body is not valid JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),
    #[error("expected a JSON array of users, got {found}")]
    UnexpectedShape { found: &'static str },
    #[error("user record at index {index} does not match the user schema: {source}")]
    Schema {
        index: usize,
        source: serde_json::Error,
    },
}
