//! # Application State
//!
//! Core business state for the shop assistant. Domain logic only, no
//! TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── backend: Arc<dyn ChatBackend>   // HTTP backend
//! ├── transcript: Transcript           // conversation so far
//! ├── status_message: String           // status bar text
//! ├── api_url: String                  // shown in the title bar
//! ├── is_loading: bool                 // waiting for the backend
//! ├── error: Option<String>            // error banner
//! ├── animate / probe_images: bool     // display switches from config
//! ├── reveal: Option<Reveal>           // typewriter for the newest bot message
//! ├── images: HashMap<ProductKey, ImageResolution>
//! ├── request_seq: u64                 // last sequence number handed out
//! └── pending_request: Option<u64>     // the one response we will accept
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::collections::HashMap;
use std::sync::Arc;

use crate::api::ChatBackend;
use crate::core::config::ResolvedConfig;
use crate::core::image::{ImageResolution, ProductKey};
use crate::core::message::{Message, MessageId};
use crate::core::reveal::Reveal;
use crate::core::transcript::Transcript;

pub const STATUS_ONLINE: &str = "Online";
pub const STATUS_SENDING: &str = "Sending...";

pub struct App {
    pub backend: Arc<dyn ChatBackend>,
    pub transcript: Transcript,
    pub status_message: String,
    pub api_url: String,
    pub is_loading: bool,
    pub error: Option<String>,
    pub animate: bool,
    pub probe_images: bool,
    pub reveal: Option<Reveal>,
    pub images: HashMap<ProductKey, ImageResolution>,
    pub request_seq: u64,
    pub pending_request: Option<u64>,
}

impl App {
    /// A fresh session opened with the greeting. The greeting animates like
    /// any other bot reply when animation is on.
    pub fn new(backend: Arc<dyn ChatBackend>, config: &ResolvedConfig) -> Self {
        let transcript = Transcript::with_greeting();
        let reveal = transcript
            .last()
            .map(|greeting| Reveal::new(greeting.id, &greeting.text, config.animate))
            .filter(|r| !r.is_complete());
        Self {
            backend,
            transcript,
            status_message: STATUS_ONLINE.to_string(),
            api_url: config.api_url.clone(),
            is_loading: false,
            error: None,
            animate: config.animate,
            probe_images: config.probe_images,
            reveal,
            images: HashMap::new(),
            request_seq: 0,
            pending_request: None,
        }
    }

    /// The message being revealed, if its reveal is still in progress.
    pub fn animating_message(&self) -> Option<MessageId> {
        self.reveal
            .as_ref()
            .filter(|r| !r.is_complete())
            .map(|r| r.message_id)
    }

    /// Text to draw for `message`: the revealed prefix while it animates,
    /// the full text otherwise.
    pub fn display_text<'a>(&'a self, message: &'a Message) -> &'a str {
        match &self.reveal {
            Some(reveal) if reveal.message_id == message.id => reveal.typewriter.visible(),
            _ => &message.text,
        }
    }

    pub fn image(&self, message_id: MessageId, index: usize) -> Option<&ImageResolution> {
        self.images.get(&ProductKey { message_id, index })
    }
}
