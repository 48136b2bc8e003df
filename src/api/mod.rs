pub mod client;
pub mod image_probe;
pub mod types;

pub use client::{ChatBackend, ChatError, GENERIC_ERROR, HttpChatBackend};
pub use image_probe::{HttpImageProbe, ImageProbe, ProbeError};
pub use types::ChatReply;
