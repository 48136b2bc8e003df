//! # TUI Components
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! - `TitleBar`: assistant name, backend URL and status
//! - `Message`: one chat bubble
//! - `ProductCard`: one recommended product with purchase buttons
//!
//! ### Stateful Components (Event-Driven)
//!
//! - `InputBox`: multi-line editor that emits `InputEvent::Submit`
//! - `MessageList`: scrollable conversation view with layout caching
//!
//! Components receive external data as props rather than reading the `App`
//! directly, which keeps each one renderable in isolation under `TestBackend`.

mod title_bar;
pub use title_bar::TitleBar;

pub mod input_box;
pub mod message;
pub use input_box::{InputBox, InputEvent};
pub mod message_list;
pub use message_list::{MessageList, MessageListState, Row};
pub mod product_card;
pub use product_card::ProductCard;
