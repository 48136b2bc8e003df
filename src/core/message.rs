use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::core::product::Product;

/// Identity of a message within one transcript. Assigned in append order.
pub type MessageId = u64;

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// A single entry in the transcript. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Local>,
    /// Recommendations attached to a bot reply (empty for user messages).
    pub products: Vec<Product>,
}

impl Message {
    pub fn has_products(&self) -> bool {
        !self.products.is_empty()
    }

    /// Local wall-clock time shown under each message.
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_time_label_formats_local_time() {
        let msg = Message {
            id: 1,
            text: "hi".into(),
            sender: Sender::User,
            timestamp: Local.with_ymd_and_hms(2024, 5, 1, 9, 5, 7).unwrap(),
            products: vec![],
        };
        assert_eq!(msg.time_label(), "09:05:07");
        assert!(!msg.has_products());
    }

    #[test]
    fn test_sender_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Sender::Bot).unwrap(), "\"bot\"");
        assert_eq!(serde_json::to_string(&Sender::User).unwrap(), "\"user\"");
    }
}
