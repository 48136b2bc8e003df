//! # Actions
//!
//! Everything that can happen in the chat becomes an `Action`.
//! User presses Enter? That's `Action::Submit(text)`.
//! Backend responds? That's `Action::ResponseReceived { seq, reply }`.
//!
//! `update()` takes the current state and an action, mutates the state,
//! and returns the effects the run loop must perform. No I/O here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Vec<Effect>
//! ```

use std::collections::HashMap;

use log::{debug, info, warn};

use crate::api::{ChatError, ChatReply};
use crate::core::format::format_response;
use crate::core::image::{ImageResolution, ImageStatus, ProductKey};
use crate::core::message::{MessageId, Sender};
use crate::core::product::Product;
use crate::core::reveal::Reveal;
use crate::core::state::{App, STATUS_ONLINE, STATUS_SENDING};

/// Prefix of the direct product search command.
pub const PRODUCTS_COMMAND: &str = "/products";

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Submit(String),
    ResponseReceived { seq: u64, reply: ChatReply },
    ProductsReceived { seq: u64, query: String, products: Vec<Product> },
    RequestFailed { seq: u64, error: ChatError },
    RevealTick(MessageId),
    SkipReveal,
    ImageLoaded { key: ProductKey, index: usize },
    ImageFailed { key: ProductKey, index: usize },
    DismissError,
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    SpawnChat { seq: u64, message: String },
    SpawnProductSearch { seq: u64, query: String },
    StartReveal(MessageId),
    StopReveal,
    ProbeImage { key: ProductKey, index: usize, url: String },
    Quit,
}

/// Returns the query of a `/products <query>` command, if `text` is one.
pub fn parse_products_command(text: &str) -> Option<&str> {
    let rest = text.trim().strip_prefix(PRODUCTS_COMMAND)?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim()).filter(|q| !q.is_empty())
}

pub fn update(app: &mut App, action: Action) -> Vec<Effect> {
    match action {
        Action::Submit(text) => submit(app, text),
        Action::ResponseReceived { seq, reply } => {
            if !accept_response(app, seq) {
                return Vec::new();
            }
            let text = format_response(&reply.response);
            app.error = None;
            append_bot_message(app, text, reply.products)
        }
        Action::ProductsReceived {
            seq,
            query,
            products,
        } => {
            if !accept_response(app, seq) {
                return Vec::new();
            }
            let text = if products.is_empty() {
                format!("I couldn't find any products for '{query}'.")
            } else {
                format!("Here are the products I found for '{query}':")
            };
            app.error = None;
            append_bot_message(app, text, products)
        }
        Action::RequestFailed { seq, error } => {
            if !accept_response(app, seq) {
                return Vec::new();
            }
            warn!("Request {} failed: {}", seq, error);
            let text = error.user_message();
            app.error = Some(text.clone());
            append_bot_message(app, text, Vec::new())
        }
        Action::RevealTick(id) => match app.reveal.as_mut() {
            Some(reveal) if reveal.message_id == id => {
                reveal.typewriter.tick();
                if reveal.is_complete() {
                    debug!("Reveal of message {} complete", id);
                    vec![Effect::StopReveal]
                } else {
                    Vec::new()
                }
            }
            _ => Vec::new(),
        },
        Action::SkipReveal => match app.reveal.as_mut() {
            Some(reveal) if !reveal.is_complete() => {
                reveal.typewriter.finish();
                vec![Effect::StopReveal]
            }
            _ => Vec::new(),
        },
        Action::ImageLoaded { key, index } => {
            if let Some(resolution) = app.images.get_mut(&key) {
                resolution.on_load(index);
            }
            Vec::new()
        }
        Action::ImageFailed { key, index } => {
            let Some(resolution) = app.images.get_mut(&key) else {
                return Vec::new();
            };
            match resolution.on_error(index) {
                Some((next, url)) => vec![Effect::ProbeImage {
                    key,
                    index: next,
                    url: url.to_string(),
                }],
                None => {
                    if resolution.is_terminal() {
                        debug!("Image for {:?} fell back to placeholder", key);
                    }
                    Vec::new()
                }
            }
        }
        Action::DismissError => {
            app.error = None;
            Vec::new()
        }
        Action::Quit => vec![Effect::Quit],
    }
}

fn submit(app: &mut App, text: String) -> Vec<Effect> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    if app.is_loading {
        debug!("Submit ignored while a request is in flight");
        return Vec::new();
    }

    let mut effects = Vec::new();
    // The previous bot message stops being the newest one.
    if app.reveal.take().is_some() {
        effects.push(Effect::StopReveal);
    }

    let query = parse_products_command(&text).map(str::to_string);
    app.transcript.push(Sender::User, text.clone(), Vec::new());
    app.is_loading = true;
    app.status_message = STATUS_SENDING.to_string();
    app.request_seq += 1;
    let seq = app.request_seq;
    app.pending_request = Some(seq);

    match query {
        Some(query) => {
            info!("Request {}: product search {:?}", seq, query);
            effects.push(Effect::SpawnProductSearch { seq, query });
        }
        None => {
            info!("Request {}: chat message", seq);
            effects.push(Effect::SpawnChat { seq, message: text });
        }
    }
    effects
}

/// Clears the pending request if `seq` is it. Anything else is stale.
fn accept_response(app: &mut App, seq: u64) -> bool {
    if app.pending_request != Some(seq) {
        warn!(
            "Discarding stale response {} (pending: {:?})",
            seq, app.pending_request
        );
        return false;
    }
    app.pending_request = None;
    app.is_loading = false;
    app.status_message = STATUS_ONLINE.to_string();
    true
}

fn append_bot_message(app: &mut App, text: String, products: Vec<Product>) -> Vec<Effect> {
    let id = app.transcript.push(Sender::Bot, text, products);
    let Some(message) = app.transcript.get(id) else {
        return Vec::new();
    };

    let mut effects = Vec::new();
    let reveal = Reveal::new(id, &message.text, app.animate);
    if reveal.is_complete() {
        app.reveal = None;
    } else {
        app.reveal = Some(reveal);
        effects.push(Effect::StartReveal(id));
    }

    effects.extend(register_images(
        &mut app.images,
        app.probe_images,
        id,
        &message.products,
    ));
    effects
}

fn register_images(
    images: &mut HashMap<ProductKey, ImageResolution>,
    probe: bool,
    message_id: MessageId,
    products: &[Product],
) -> Vec<Effect> {
    let mut effects = Vec::new();
    for (index, product) in products.iter().enumerate() {
        let key = ProductKey { message_id, index };
        let resolution = images
            .entry(key)
            .and_modify(|r| {
                r.sync(product);
            })
            .or_insert_with(|| ImageResolution::new(product));
        if let (true, ImageStatus::Pending(index)) = (probe, resolution.status()) {
            effects.push(Effect::ProbeImage {
                key,
                index,
                url: resolution.current_url().to_string(),
            });
        }
    }
    effects
}
