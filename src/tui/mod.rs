//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! translates terminal events into `core::Action` values and performs the
//! `Effect`s the reducer asks for.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! - **Revealing** (typewriter running): polls every ~30ms so characters
//!   appear at a steady pace.
//! - **Loading** (waiting for the backend): polls every ~80ms for the spinner.
//! - **Idle**: sleeps up to 500ms and only redraws on events or resize.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor because
//! ratatui's `set_cursor_position` resets the terminal's blink timer on every
//! `draw()` call, making blinking cursors appear erratic during continuous redraws.
//!
//! ## Background work
//!
//! Requests, image probes and the reveal timer run as tokio tasks. They
//! report back through a std `mpsc` channel of `Action`s that the loop
//! drains between frames.

mod component;
mod components;
mod event;
pub mod links;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use ratatui::layout::Rect;

use crate::api::{ChatBackend, HttpChatBackend, HttpImageProbe, ImageProbe};
use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::image::ProductKey;
use crate::core::message::MessageId;
use crate::core::product::{Marketplace, Product};
use crate::core::reveal::RevealTimer;
use crate::core::state::App;
use crate::tui::component::EventHandler;
use crate::tui::components::{InputBox, InputEvent, MessageListState, ProductCard, Row};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};
use crate::tui::links::{LinkOpener, SystemBrowser, open_purchase_link};

const REVEAL_POLL: Duration = Duration::from_millis(30);
const LOADING_POLL: Duration = Duration::from_millis(80);
const IDLE_POLL: Duration = Duration::from_millis(500);

/// Modal input mode: determines how keyboard events are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Navigate rows with arrow keys, `f`/`a` open links. Typing auto-switches to Input.
    Cursor,
    /// Text editing in the input box. Esc switches to Cursor.
    Input,
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub message_list: MessageListState,
    pub input_box: InputBox,
    pub input_mode: InputMode,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            message_list: MessageListState::new(),
            input_box: InputBox::new(),
            input_mode: InputMode::Input, // User expects to type immediately
        }
    }

    fn selected_row(&self) -> Option<Row> {
        let idx = self.message_list.selected_index?;
        self.message_list.layout.rows.get(idx).copied()
    }

    fn select_last_row(&mut self) {
        let rows = &self.message_list.layout.rows;
        self.message_list.selected_index = rows.iter().rposition(|r| r.is_selectable());
        self.message_list.scroll_to_selected();
    }

    /// Moves the selection to the next selectable row in the given direction.
    fn move_selection(&mut self, down: bool) {
        let rows = &self.message_list.layout.rows;
        let next = match self.message_list.selected_index {
            None => rows.iter().rposition(|r| r.is_selectable()),
            Some(idx) if down => (idx + 1..rows.len()).find(|&i| rows[i].is_selectable()),
            Some(idx) => (0..idx).rev().find(|&i| rows[i].is_selectable()),
        };
        if next.is_some() {
            self.message_list.selected_index = next;
            self.message_list.scroll_to_selected();
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Kitty keyboard protocol is needed for Shift+Enter; terminals without
        // it ignore the escape sequence.
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!(
            "Terminal modes enabled (mouse, bracketed paste, steady block cursor, keyboard enhancement)"
        );
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

/// Performs effects. Owns the one reveal timer that may be running.
struct EffectRunner {
    tx: mpsc::Sender<Action>,
    backend: Arc<dyn ChatBackend>,
    probe: Arc<dyn ImageProbe>,
    reveal_interval: Duration,
    reveal_timer: Option<RevealTimer>,
}

impl EffectRunner {
    /// Returns `true` when the app should quit.
    fn apply(&mut self, effects: Vec<Effect>) -> bool {
        let mut quit = false;
        for effect in effects {
            match effect {
                Effect::SpawnChat { seq, message } => {
                    spawn_chat_request(self.backend.clone(), seq, message, self.tx.clone())
                }
                Effect::SpawnProductSearch { seq, query } => {
                    spawn_product_search(self.backend.clone(), seq, query, self.tx.clone())
                }
                Effect::StartReveal(id) => self.start_reveal(id),
                Effect::StopReveal => {
                    if let Some(timer) = self.reveal_timer.take() {
                        debug!("Stopping reveal timer");
                        timer.cancel();
                    }
                }
                Effect::ProbeImage { key, index, url } => {
                    spawn_image_probe(self.probe.clone(), key, index, url, self.tx.clone())
                }
                Effect::Quit => quit = true,
            }
        }
        quit
    }

    /// Replacing the timer drops, and so aborts, any previous one.
    fn start_reveal(&mut self, id: MessageId) {
        debug!("Starting reveal timer for message {}", id);
        let tx = self.tx.clone();
        self.reveal_timer = Some(RevealTimer::start(self.reveal_interval, move || {
            tx.send(Action::RevealTick(id)).is_ok()
        }));
    }
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let backend: Arc<dyn ChatBackend> = Arc::new(HttpChatBackend::new(
        config.api_url.clone(),
        config.request_timeout,
    ));
    let mut app = App::new(backend.clone(), &config);
    let mut tui = TuiState::new();

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();
    let mut runner = EffectRunner {
        tx,
        backend,
        probe: Arc::new(HttpImageProbe::new()),
        reveal_interval: config.reveal_interval,
        reveal_timer: None,
    };
    if let Some(greeting) = app.animating_message() {
        runner.apply(vec![Effect::StartReveal(greeting)]);
    }

    let opener = SystemBrowser;
    let start_time = Instant::now();
    let mut needs_redraw = true; // Force first frame
    let mut transcript_len = app.transcript.len();

    loop {
        // Sync InputBox props with App/TUI state
        tui.input_box.disabled = app.is_loading;
        tui.input_box.focused = tui.input_mode == InputMode::Input;

        let revealing = app.animating_message().is_some();
        if revealing || app.is_loading {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        let timeout = if revealing {
            REVEAL_POLL
        } else if app.is_loading {
            LOADING_POLL
        } else {
            IDLE_POLL
        };
        let first_event = poll_event_timeout(timeout);

        // Process first event + drain ALL pending events before next draw
        let mut should_quit = false;
        if first_event.is_some() {
            needs_redraw = true;
        }
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            let frame_area = terminal.get_frame().area();
            let effects = dispatch_event(event, &mut app, &mut tui, frame_area, &opener);
            should_quit |= runner.apply(effects);
        }

        // Handle background task actions
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            if !matches!(action, Action::RevealTick(_)) {
                debug!("Event loop received: {:?}", action);
            }
            let effects = update(&mut app, action);
            should_quit |= runner.apply(effects);
        }

        if app.transcript.len() != transcript_len {
            transcript_len = app.transcript.len();
            tui.message_list.pin_to_bottom();
        }

        if should_quit {
            break;
        }
    }

    info!("Shutting down");
    drop(runner);
    ratatui::restore();
    Ok(())
}

/// Routes one terminal event. Returns the effects of any reducer calls.
fn dispatch_event(
    event: TuiEvent,
    app: &mut App,
    tui: &mut TuiState,
    frame_area: Rect,
    opener: &dyn LinkOpener,
) -> Vec<Effect> {
    match event {
        // Resize just needs a redraw
        TuiEvent::Resize => return Vec::new(),
        // Ctrl+C always quits regardless of mode
        TuiEvent::ForceQuit => return update(app, Action::Quit),
        TuiEvent::MouseMove(x, y) => {
            tui.message_list.selected_index = hit_row(tui, app, frame_area, x, y)
                .filter(|hit| tui.message_list.layout.rows[hit.row].is_selectable())
                .map(|hit| hit.row);
            return Vec::new();
        }
        TuiEvent::MouseClick(x, y) => {
            click(app, tui, frame_area, x, y, opener);
            return Vec::new();
        }
        TuiEvent::ScrollUp
        | TuiEvent::ScrollDown
        | TuiEvent::ScrollPageUp
        | TuiEvent::ScrollPageDown
        | TuiEvent::ScrollToBottom => {
            tui.message_list.handle_event(&event);
            return Vec::new();
        }
        _ => {}
    }

    match tui.input_mode {
        InputMode::Input => {
            if event == TuiEvent::Escape {
                if app.error.is_some() {
                    return update(app, Action::DismissError);
                }
                tui.input_mode = InputMode::Cursor;
                tui.select_last_row();
                return Vec::new();
            }

            let mut effects = Vec::new();
            // The first keystroke finishes the typewriter.
            if matches!(event, TuiEvent::InputChar(_) | TuiEvent::Paste(_))
                && tui.input_box.buffer.is_empty()
                && app.animating_message().is_some()
            {
                effects.extend(update(app, Action::SkipReveal));
            }
            if let Some(InputEvent::Submit(text)) = tui.input_box.handle_event(&event) {
                effects.extend(update(app, Action::Submit(text)));
                tui.message_list.pin_to_bottom();
            }
            effects
        }
        InputMode::Cursor => match event {
            TuiEvent::Escape if app.error.is_some() => update(app, Action::DismissError),
            TuiEvent::Escape => Vec::new(),
            TuiEvent::InputChar(c @ ('f' | 'a')) if selected_product(app, tui).is_some() => {
                let marketplace = if c == 'f' {
                    Marketplace::Flipkart
                } else {
                    Marketplace::Amazon
                };
                if let Some(product) = selected_product(app, tui)
                    && let Some(status) = open_purchase_link(opener, product, marketplace)
                {
                    app.status_message = status;
                }
                Vec::new()
            }
            // Typing auto-switches to Input mode and forwards the event
            TuiEvent::InputChar(_) | TuiEvent::Paste(_) => {
                tui.input_mode = InputMode::Input;
                tui.message_list.selected_index = None;
                dispatch_event(event, app, tui, frame_area, opener)
            }
            TuiEvent::Submit => {
                tui.input_mode = InputMode::Input;
                tui.message_list.selected_index = None;
                Vec::new()
            }
            TuiEvent::CursorUp => {
                tui.move_selection(false);
                Vec::new()
            }
            TuiEvent::CursorDown => {
                tui.move_selection(true);
                Vec::new()
            }
            _ => Vec::new(),
        },
    }
}

fn hit_row(tui: &TuiState, app: &App, frame_area: Rect, x: u16, y: u16) -> Option<ui::RowHit> {
    let list_area = ui::main_area(frame_area, app, tui);
    let scroll_offset = tui.message_list.scroll_state.offset().y;
    ui::hit_test_row(x, y, list_area, scroll_offset, &tui.message_list.layout)
}

/// A click on a purchase button opens its link; anywhere else on a row selects it.
fn click(app: &mut App, tui: &mut TuiState, frame_area: Rect, x: u16, y: u16, opener: &dyn LinkOpener) {
    let Some(hit) = hit_row(tui, app, frame_area, x, y) else {
        return;
    };
    let row = tui.message_list.layout.rows[hit.row];
    if row.is_selectable() {
        tui.message_list.selected_index = Some(hit.row);
    }
    let Row::Product { message, index } = row else {
        return;
    };
    let Some(product) = product_at(app, message, index) else {
        return;
    };
    let list_area = ui::main_area(frame_area, app, tui);
    let card_width = list_area
        .width
        .saturating_sub(1)
        .saturating_sub(components::message_list::CARD_INDENT);
    if let Some(marketplace) = ProductCard::button_at(product, card_width, hit.card_x, hit.local_y)
        && let Some(status) = open_purchase_link(opener, product, marketplace)
    {
        app.status_message = status;
    }
}

fn product_at(app: &App, message: usize, index: usize) -> Option<&Product> {
    app.transcript.as_slice().get(message)?.products.get(index)
}

fn selected_product<'a>(app: &'a App, tui: &TuiState) -> Option<&'a Product> {
    match tui.selected_row()? {
        Row::Product { message, index } => product_at(app, message, index),
        _ => None,
    }
}

fn spawn_chat_request(
    backend: Arc<dyn ChatBackend>,
    seq: u64,
    message: String,
    tx: mpsc::Sender<Action>,
) {
    info!("Spawning chat request {}", seq);
    tokio::spawn(async move {
        let action = match backend.send_message(&message).await {
            Ok(reply) => Action::ResponseReceived { seq, reply },
            Err(error) => Action::RequestFailed { seq, error },
        };
        if tx.send(action).is_err() {
            warn!("Failed to deliver response {}: receiver dropped", seq);
        }
    });
}

fn spawn_product_search(
    backend: Arc<dyn ChatBackend>,
    seq: u64,
    query: String,
    tx: mpsc::Sender<Action>,
) {
    info!("Spawning product search {} for {:?}", seq, query);
    tokio::spawn(async move {
        let action = match backend.search_products(&query).await {
            Ok(products) => Action::ProductsReceived {
                seq,
                query,
                products,
            },
            Err(error) => Action::RequestFailed { seq, error },
        };
        if tx.send(action).is_err() {
            warn!("Failed to deliver search results {}: receiver dropped", seq);
        }
    });
}

fn spawn_image_probe(
    probe: Arc<dyn ImageProbe>,
    key: ProductKey,
    index: usize,
    url: String,
    tx: mpsc::Sender<Action>,
) {
    tokio::spawn(async move {
        let action = match probe.probe(&url).await {
            Ok(()) => {
                debug!("Image candidate {} loaded: {}", index, url);
                Action::ImageLoaded { key, index }
            }
            Err(e) => {
                debug!("Image candidate {} failed ({}): {}", index, e, url);
                Action::ImageFailed { key, index }
            }
        };
        if tx.send(action).is_err() {
            warn!("Failed to deliver image probe result: receiver dropped");
        }
    });
}
