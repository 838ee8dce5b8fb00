use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use shared::protocol::parse_users_body;
use tracing::debug;
use url::Url;

use crate::error::FetchError;

pub const DEFAULT_USERS_URL: &str = "http://localhost:8000/users";

/// Where the controller gets its user listing from.
#[async_trait]
pub trait UsersSource: Send + Sync {
    /// Returns the parsed JSON body of one listing request.
    async fn fetch_users(&self) -> Result<Value, FetchError>;
}

/// Plain `GET` against a fixed URL: no headers, no body, no query parameters.
///
/// The response status is not inspected; any body that parses as JSON is
/// handed back, error statuses included. No timeout is configured.
pub struct HttpUsersSource {
    http: Client,
    url: Url,
}

impl HttpUsersSource {
    pub fn new(url: Url) -> Self {
        Self::with_client(Client::new(), url)
    }

    pub fn with_client(http: Client, url: Url) -> Self {
        Self { http, url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl UsersSource for HttpUsersSource {
    async fn fetch_users(&self) -> Result<Value, FetchError> {
        let response = self
            .http
            .get(self.url.clone())
            .send()
            .await
            .map_err(|err| FetchError::Transport {
                url: self.url.to_string(),
                reason: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            debug!(url = %self.url, %status, "users endpoint returned non-success status");
        }

        let body = response.bytes().await.map_err(|err| FetchError::Body {
            url: self.url.to_string(),
            reason: err.to_string(),
        })?;

        Ok(parse_users_body(&body)?)
    }
}

#[cfg(test)]
#[path = "tests/source_tests.rs"]
mod tests;
