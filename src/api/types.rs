use serde::{Deserialize, Serialize};

use crate::core::product::Product;

/// Body of `POST /api/chat`.
#[derive(Serialize, Debug, PartialEq)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
}

/// Successful `/api/chat` response body.
#[derive(Deserialize, Debug)]
pub struct ChatResponseBody {
    pub response: String,
    /// Absent and `null` both mean "no products".
    #[serde(default)]
    pub products: Option<Vec<Product>>,
}

/// Body of a non-2xx response. The backend puts a user-facing message in
/// `response` when it has one.
#[derive(Deserialize, Debug, Default)]
pub struct ErrorBody {
    #[serde(default)]
    pub response: Option<String>,
}

/// `GET /api/products?q=` response body.
#[derive(Deserialize, Debug)]
pub struct ProductsResponse {
    #[serde(default)]
    pub products: Option<Vec<Product>>,
}

/// A bot reply as the rest of the client sees it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChatReply {
    pub response: String,
    pub products: Vec<Product>,
}

impl From<ChatResponseBody> for ChatReply {
    fn from(body: ChatResponseBody) -> Self {
        Self {
            response: body.response,
            products: body.products.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Contract test: the backend reads exactly one field.
    #[test]
    fn test_chat_request_serialization() {
        let req = ChatRequest {
            message: "Show me headphones",
        };
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"message":"Show me headphones"}"#
        );
    }

    #[test]
    fn test_missing_products_defaults_to_empty() {
        let body: ChatResponseBody = serde_json::from_str(r#"{"response":"hi"}"#).unwrap();
        let reply = ChatReply::from(body);
        assert_eq!(reply.response, "hi");
        assert!(reply.products.is_empty());
    }

    #[test]
    fn test_null_products_defaults_to_empty() {
        let body: ChatResponseBody =
            serde_json::from_str(r#"{"response":"hi","products":null}"#).unwrap();
        assert!(ChatReply::from(body).products.is_empty());
    }

    #[test]
    fn test_products_are_carried_over() {
        let body: ChatResponseBody = serde_json::from_str(
            r#"{"response":"Here","products":[{"name":"A","price":"$10"}]}"#,
        )
        .unwrap();
        let reply = ChatReply::from(body);
        assert_eq!(reply.products.len(), 1);
        assert_eq!(reply.products[0].name, "A");
        assert_eq!(reply.products[0].price_label(), "$10");
    }

    #[test]
    fn test_error_body_without_response_field() {
        let body: ErrorBody = serde_json::from_str(r#"{"error":"boom"}"#).unwrap();
        assert!(body.response.is_none());
    }
}
