//! Outbound HTTP for all sources.

use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::redirect::Policy;
use serde::de::DeserializeOwned;

use crate::config::SourceConfig;
use crate::errors::SourceError;

/// Shared HTTP client with the per-call timeout and redirect policy applied.
///
/// Cloning is cheap; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Builds the client from source configuration.
    ///
    /// # Errors
    /// - `reqwest::Error` - TLS backend or client initialisation failed
    pub fn new(config: &SourceConfig) -> reqwest::Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .redirect(Policy::limited(10))
            .user_agent(config.user_agent.clone());
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }

        let client = builder.build()?;

        Ok(Self { client })
    }

    /// GETs `url` and returns the body as text.
    ///
    /// # Errors
    /// - `SourceError::Transport` - Connection, DNS or timeout failure
    /// - `SourceError::Status` - Upstream answered with a non-2xx status
    pub async fn get_text(&self, url: &str) -> Result<String, SourceError> {
        let response = self.send(url, None).await?;
        response.text().await.map_err(|e| {
            tracing::error!(target_url = %url, error = %e, "Failed to read response body");
            SourceError::Transport {
                target: url.to_string(),
                reason: e.to_string(),
            }
        })
    }

    /// GETs `url` asking for JSON and decodes the body into `T`.
    ///
    /// # Errors
    /// - `SourceError::Transport` - Connection, DNS or timeout failure
    /// - `SourceError::Status` - Upstream answered with a non-2xx status
    /// - `SourceError::Parse` - Body is not valid JSON for `T`
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        let response = self
            .send(url, Some(HeaderValue::from_static("application/json")))
            .await?;
        let body = response.bytes().await.map_err(|e| {
            tracing::error!(target_url = %url, error = %e, "Failed to read response body");
            SourceError::Transport {
                target: url.to_string(),
                reason: e.to_string(),
            }
        })?;

        serde_json::from_slice(&body).map_err(|e| {
            tracing::error!(target_url = %url, error = %e, "Upstream returned malformed JSON");
            SourceError::Parse {
                target: url.to_string(),
                reason: e.to_string(),
            }
        })
    }

    async fn send(
        &self,
        url: &str,
        accept: Option<HeaderValue>,
    ) -> Result<reqwest::Response, SourceError> {
        let mut request = self.client.get(url);
        if let Some(accept) = accept {
            request = request.header(ACCEPT, accept);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!(target_url = %url, error = %e, "Failed to retrieve upstream");
            SourceError::Transport {
                target: url.to_string(),
                reason: e.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(target_url = %url, status = status.as_u16(), "Upstream request failed");
            return Err(SourceError::Status {
                target: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}
