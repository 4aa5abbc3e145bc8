//! HTTP client the widget uses to reach the companion server.
//!
//! One request type matters: `POST /api/chat`. Every call is bounded by a
//! deadline (10 seconds unless configured otherwise) and can be cancelled
//! early through a [`CancellationToken`].
//!
//! ```rust,no_run
//! use mindbridge::client::MindBridgeClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = MindBridgeClient::new("http://127.0.0.1:5000")?;
//! let reply = client.chat("I feel anxious today").await?;
//! println!("{reply}");
//! # Ok(())
//! # }
//! ```

mod error;

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use url::Url;

use crate::types::{ChatReply, ChatRequest, HealthStatus};

pub use error::{ClientError, Result};

/// Default deadline for a single chat request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the companion API.
#[derive(Debug, Clone)]
pub struct MindBridgeClient {
    base_url: Url,
    http: reqwest::Client,
    timeout: Duration,
}

impl MindBridgeClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the server (e.g., "http://localhost:5000")
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create a new client with a custom reqwest client.
    pub fn with_client(base_url: impl AsRef<str>, http: reqwest::Client) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        Ok(Self {
            base_url,
            http,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// Replace the request deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send a chat message and return the companion's reply.
    pub async fn chat(&self, message: &str) -> Result<String> {
        self.chat_with_cancel(message, &CancellationToken::new())
            .await
    }

    /// Send a chat message, giving up when `cancel` fires or the deadline passes.
    pub async fn chat_with_cancel(
        &self,
        message: &str,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let request = async {
            let response = self
                .http
                .post(self.url("/api/chat"))
                .json(&ChatRequest::new(message))
                .send()
                .await?;
            let reply: ChatReply = Self::handle_response(response).await?;
            Ok(reply.response)
        };

        let started = std::time::Instant::now();
        let result = self.bounded(request, cancel).await;
        match &result {
            Ok(reply) => tracing::debug!(
                elapsed_ms = started.elapsed().as_millis(),
                reply_length = reply.len(),
                "Chat reply received"
            ),
            Err(e) => tracing::warn!(
                elapsed_ms = started.elapsed().as_millis(),
                error = %e,
                "Chat request failed"
            ),
        }
        result
    }

    /// Probe `GET /api/health`.
    pub async fn health(&self) -> Result<HealthStatus> {
        let request = async {
            let response = self.http.get(self.url("/api/health")).send().await?;
            Self::handle_response(response).await
        };
        self.bounded(request, &CancellationToken::new()).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal helpers
    // ─────────────────────────────────────────────────────────────────────────

    async fn bounded<T>(
        &self,
        request: impl Future<Output = Result<T>>,
        cancel: &CancellationToken,
    ) -> Result<T> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(ClientError::Cancelled),
            () = tokio::time::sleep(self.timeout) => Err(ClientError::Timeout(self.timeout)),
            result = request => result,
        }
    }

    fn url(&self, path: &str) -> Url {
        self.base_url
            .join(path)
            .unwrap_or_else(|_| self.base_url.clone())
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            let body = response.bytes().await?;
            Ok(serde_json::from_slice(&body)?)
        } else {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".into());
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_join_replaces_path() {
        let client = MindBridgeClient::new("http://127.0.0.1:5000/ignored").unwrap();
        assert_eq!(
            client.url("/api/chat").as_str(),
            "http://127.0.0.1:5000/api/chat"
        );
    }

    #[test]
    fn test_default_timeout_is_ten_seconds() {
        let client = MindBridgeClient::new("http://localhost:5000").unwrap();
        assert_eq!(client.timeout(), Duration::from_secs(10));

        let client = client.with_timeout(Duration::from_millis(250));
        assert_eq!(client.timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            MindBridgeClient::new("not a url"),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_cancelled_before_send() {
        let client = MindBridgeClient::new("http://127.0.0.1:9").unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = client.chat_with_cancel("hi", &cancel).await.unwrap_err();
        assert!(matches!(err, ClientError::Cancelled));
    }
}
