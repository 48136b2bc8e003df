//! # Transcript
//!
//! The ordered, append-only list of exchanged messages. It lives for one
//! process run and is never written to disk. Messages cannot be edited or
//! removed once pushed.

use chrono::Local;

use crate::core::message::{Message, MessageId, Sender};
use crate::core::product::Product;

/// First bot message of every new conversation.
pub const GREETING: &str = "👋 Hello! I'm your e-commerce customer service assistant. \
    I can help you find products, answer questions about orders, and assist with any \
    shopping needs. How can I help you today?";

#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    next_id: MessageId,
}

impl Transcript {
    /// An empty transcript (no greeting).
    pub fn new() -> Self {
        Self::default()
    }

    /// A transcript opened with the assistant's greeting.
    pub fn with_greeting() -> Self {
        let mut transcript = Self::new();
        transcript.push(Sender::Bot, GREETING.to_string(), Vec::new());
        transcript
    }

    /// Appends a message stamped with the current local time and returns its id.
    pub fn push(&mut self, sender: Sender, text: String, products: Vec<Product>) -> MessageId {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(Message {
            id,
            text,
            sender,
            timestamp: Local::now(),
            products,
        });
        id
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        // Ids are assigned in push order, so the index usually matches.
        match self.messages.get(id as usize) {
            Some(msg) if msg.id == id => Some(msg),
            _ => self.messages.iter().find(|m| m.id == id),
        }
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }
}
