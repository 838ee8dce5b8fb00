use shared::error::PayloadError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// The endpoint could not be reached or the body could not be read.
    Network,
    /// A body arrived but could not be decoded.
    Decode,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },
    #[error("failed to read response body from {url}: {reason}")]
    Body { url: String, reason: String },
    #[error(transparent)]
    Payload(#[from] PayloadError),
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::Transport { .. } | Self::Body { .. } => FetchErrorKind::Network,
            Self::Payload(_) => FetchErrorKind::Decode,
        }
    }
}
