//! Checks whether a product image URL actually serves an image.
//!
//! A terminal can't render the picture, but the card still shows which
//! source resolved, so each candidate is fetched once and judged by its
//! status and content type.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::header::CONTENT_TYPE;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq)]
pub enum ProbeError {
    Network(String),
    Status(u16),
    NotAnImage(String),
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::Network(msg) => write!(f, "network error: {msg}"),
            ProbeError::Status(status) => write!(f, "HTTP {status}"),
            ProbeError::NotAnImage(content_type) => write!(f, "not an image: {content_type}"),
        }
    }
}

impl std::error::Error for ProbeError {}

#[async_trait]
pub trait ImageProbe: Send + Sync {
    async fn probe(&self, url: &str) -> Result<(), ProbeError>;
}

pub struct HttpImageProbe {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpImageProbe {
    pub fn new() -> Self {
        Self::with_timeout(PROBE_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

impl Default for HttpImageProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageProbe for HttpImageProbe {
    async fn probe(&self, url: &str) -> Result<(), ProbeError> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ProbeError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            debug!("Image probe {} -> HTTP {}", url, status);
            return Err(ProbeError::Status(status.as_u16()));
        }

        // Missing content type is accepted; plenty of CDNs omit it.
        if let Some(content_type) = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            && !content_type.trim_start().to_ascii_lowercase().starts_with("image/")
        {
            debug!("Image probe {} -> {}", url, content_type);
            return Err(ProbeError::NotAnImage(content_type.to_string()));
        }

        debug!("Image probe {} -> ok", url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_error_display() {
        assert_eq!(ProbeError::Status(404).to_string(), "HTTP 404");
        assert_eq!(
            ProbeError::NotAnImage("text/html".into()).to_string(),
            "not an image: text/html"
        );
    }
}
