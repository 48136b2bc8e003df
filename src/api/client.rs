//! HTTP client for the shop assistant backend.
//!
//! Two endpoints:
//! - `POST {base}/api/chat` with `{"message": ...}` returns a reply and
//!   optional product recommendations.
//! - `GET {base}/api/products?q=...` returns matching products.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};

use super::types::{ChatReply, ChatRequest, ChatResponseBody, ErrorBody, ProductsResponse};
use crate::core::product::Product;

/// Shown when the failure carries nothing more specific.
pub const GENERIC_ERROR: &str = "Sorry, I couldn't process your request. Please try again.";

/// Errors from a single backend request. None of them end the session.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatError {
    /// Transport failure (DNS, connection refused, timeout).
    Network(String),
    /// The backend answered with a non-2xx status.
    Api { status: u16, message: Option<String> },
    /// A 2xx body that could not be decoded.
    Parse(String),
}

impl ChatError {
    /// The text shown to the user in the transcript and the error banner.
    pub fn user_message(&self) -> String {
        match self {
            ChatError::Api {
                message: Some(message),
                ..
            } => message.clone(),
            ChatError::Api {
                status,
                message: None,
            } => format!("Error: Request failed with status code {status}"),
            ChatError::Network(msg) => format!("Error: {msg}"),
            ChatError::Parse(_) => GENERIC_ERROR.to_string(),
        }
    }
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatError::Network(msg) => write!(f, "network error: {msg}"),
            ChatError::Api {
                status,
                message: Some(message),
            } => write!(f, "API error (HTTP {status}): {message}"),
            ChatError::Api {
                status,
                message: None,
            } => write!(f, "API error (HTTP {status})"),
            ChatError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for ChatError {}

#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Sends one user message and waits for the complete reply.
    async fn send_message(&self, message: &str) -> Result<ChatReply, ChatError>;

    /// Direct product search, bypassing the conversational endpoint.
    async fn search_products(&self, query: &str) -> Result<Vec<Product>, ChatError>;
}

pub struct HttpChatBackend {
    base_url: String,
    timeout: Option<Duration>,
    client: reqwest::Client,
}

impl HttpChatBackend {
    /// Creates a backend client.
    ///
    /// # Arguments
    /// * `base_url` - Server root, e.g. `http://127.0.0.1:5000`
    /// * `timeout` - Per-request timeout; `None` waits indefinitely
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn with_timeout(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        }
    }

    /// Sends the request and turns non-2xx statuses into `ChatError::Api`.
    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, ChatError> {
        let response = self
            .with_timeout(builder)
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        debug!("Backend response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let err_body = response.text().await.unwrap_or_default();
            warn!("Backend error: {} - {}", status, err_body);
            let message = serde_json::from_str::<ErrorBody>(&err_body)
                .unwrap_or_default()
                .response
                .filter(|m| !m.is_empty());
            return Err(ChatError::Api { status, message });
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn send_message(&self, message: &str) -> Result<ChatReply, ChatError> {
        let url = format!("{}/api/chat", self.base_url);
        info!("POST {} ({} chars)", url, message.chars().count());

        let request = self.client.post(&url).json(&ChatRequest { message });
        let response = self.send(request).await?;

        let body: ChatResponseBody = response
            .json()
            .await
            .map_err(|e| ChatError::Parse(e.to_string()))?;
        let reply = ChatReply::from(body);
        info!("Reply received with {} product(s)", reply.products.len());
        Ok(reply)
    }

    async fn search_products(&self, query: &str) -> Result<Vec<Product>, ChatError> {
        let url = format!("{}/api/products", self.base_url);
        info!("GET {} q={:?}", url, query);

        let request = self.client.get(&url).query(&[("q", query)]);
        let response = self.send(request).await?;

        let body: ProductsResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Parse(e.to_string()))?;
        Ok(body.products.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_shown_verbatim() {
        let err = ChatError::Api {
            status: 500,
            message: Some("Model unavailable".to_string()),
        };
        assert_eq!(err.user_message(), "Model unavailable");
    }

    #[test]
    fn test_status_message_when_server_sent_none() {
        let err = ChatError::Api {
            status: 502,
            message: None,
        };
        assert_eq!(
            err.user_message(),
            "Error: Request failed with status code 502"
        );
    }

    #[test]
    fn test_network_error_prefixed() {
        let err = ChatError::Network("connection refused".to_string());
        assert_eq!(err.user_message(), "Error: connection refused");
    }

    #[test]
    fn test_parse_error_is_generic() {
        assert_eq!(ChatError::Parse("eof".into()).user_message(), GENERIC_ERROR);
    }

    #[test]
    fn test_display_includes_status() {
        let err = ChatError::Api {
            status: 404,
            message: None,
        };
        assert_eq!(err.to_string(), "API error (HTTP 404)");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let backend = HttpChatBackend::new("http://localhost:5000/", None);
        assert_eq!(backend.base_url(), "http://localhost:5000");
    }
}
