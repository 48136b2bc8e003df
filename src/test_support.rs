//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Arc;

use async_trait::async_trait;

use crate::api::{ChatBackend, ChatError, ChatReply};
use crate::core::config::ResolvedConfig;
use crate::core::product::Product;
use crate::core::state::App;

/// A backend that never gets called. Reducer tests feed responses in as actions.
pub struct StubBackend;

#[async_trait]
impl ChatBackend for StubBackend {
    async fn send_message(&self, _message: &str) -> Result<ChatReply, ChatError> {
        Ok(ChatReply::default())
    }

    async fn search_products(&self, _query: &str) -> Result<Vec<Product>, ChatError> {
        Ok(Vec::new())
    }
}

pub fn test_config() -> ResolvedConfig {
    ResolvedConfig {
        api_url: "http://127.0.0.1:5000".to_string(),
        request_timeout: None,
        log_file: "shopchat-test.log".to_string(),
        animate: false,
        reveal_interval: std::time::Duration::from_millis(15),
        probe_images: false,
    }
}

/// Creates a test App with animation and image probing off.
pub fn test_app() -> App {
    App::new(Arc::new(StubBackend), &test_config())
}

pub fn test_app_with(configure: impl FnOnce(&mut ResolvedConfig)) -> App {
    let mut config = test_config();
    configure(&mut config);
    App::new(Arc::new(StubBackend), &config)
}

pub fn product(name: &str, price: &str) -> Product {
    Product {
        name: name.to_string(),
        price: Some(price.to_string()),
        ..Default::default()
    }
}
