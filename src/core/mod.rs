//! # Core Application Logic
//!
//! This module contains the chat client's business logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │
//!                   ┌────────────┴────────────┐
//!                   ▼                         ▼
//!            ┌────────────┐            ┌────────────┐
//!            │    TUI     │            │    API     │
//!            │  Adapter   │            │  (reqwest) │
//!            │ (ratatui)  │            │            │
//!            └────────────┘            └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all application state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`transcript`]: The append-only message list
//! - [`reveal`]: Typewriter animation and its cancellable timer
//! - [`image`]: Product image candidate chain and fallback state machine

pub mod action;
pub mod config;
pub mod format;
pub mod image;
pub mod message;
pub mod product;
pub mod reveal;
pub mod state;
pub mod transcript;
