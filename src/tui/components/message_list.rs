//! # MessageList Component
//!
//! Scrollable view of the conversation.
//!
//! ## Rows
//!
//! The transcript is flattened into rows before layout: every message gets
//! a row, a bot message with products adds a "📦 Recommended Products:"
//! header and one row per product card, and a typing indicator row trails
//! the list while a request is in flight.
//!
//! ## Architecture
//!
//! `MessageList` is a transient component (created each frame) that wraps
//! `&'a mut MessageListState` (persistent state) and the `App` (props).
//! Rendering updates the layout cache and scroll state in place.

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::message::Message as ChatMessage;
use crate::core::state::App;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::Message;
use crate::tui::components::product_card::ProductCard;
use crate::tui::event::TuiEvent;

pub const PRODUCTS_HEADER: &str = "📦 Recommended Products:";
/// Product rows are indented under the bot message they belong to.
pub const CARD_INDENT: u16 = 2;
const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// One laid-out row of the message list. Indices refer to the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Row {
    Message(usize),
    ProductsHeader(usize),
    Product { message: usize, index: usize },
    Typing,
}

impl Row {
    /// Rows that cursor mode can land on.
    pub fn is_selectable(self) -> bool {
        matches!(self, Row::Message(_) | Row::Product { .. })
    }
}

/// Flattens the transcript into display rows.
pub fn build_rows(messages: &[ChatMessage], is_loading: bool) -> Vec<Row> {
    let mut rows = Vec::with_capacity(messages.len());
    for (i, message) in messages.iter().enumerate() {
        rows.push(Row::Message(i));
        if message.has_products() {
            rows.push(Row::ProductsHeader(i));
            rows.extend((0..message.products.len()).map(|index| Row::Product { message: i, index }));
        }
    }
    if is_loading {
        rows.push(Row::Typing);
    }
    rows
}

/// Layout and scroll state for the message list.
/// Must be persisted in the parent TuiState.
pub struct MessageListState {
    pub scroll_state: ScrollViewState,
    pub layout: LayoutCache,
    /// When true, auto-scroll to bottom on new content
    pub stick_to_bottom: bool,
    /// Currently selected row (hover or keyboard navigation)
    pub selected_index: Option<usize>,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
    /// Whether content exists below the viewport
    pub has_unseen_content: bool,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::new(),
            stick_to_bottom: true,
            selected_index: None,
            viewport_height: 0,
            has_unseen_content: false,
        }
    }

    fn max_scroll(&self) -> u16 {
        self.layout.total_height().saturating_sub(self.viewport_height)
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_scroll();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Re-attach to the bottom; the next render scrolls there.
    pub fn pin_to_bottom(&mut self) {
        self.stick_to_bottom = true;
    }

    /// Scroll the viewport so the selected row is fully visible.
    /// If the row is taller than the viewport, align its top edge.
    pub fn scroll_to_selected(&mut self) {
        let Some(idx) = self.selected_index else {
            return;
        };
        let Some(&item_bottom) = self.layout.prefix_heights.get(idx) else {
            return;
        };
        let item_top = self.layout.row_top(idx);
        let offset_y = self.scroll_state.offset().y;

        if item_top < offset_y {
            self.scroll_state.set_offset(Position { x: 0, y: item_top });
            self.stick_to_bottom = false;
        } else if item_bottom > offset_y + self.viewport_height {
            let new_y = item_bottom
                .saturating_sub(self.viewport_height)
                .min(item_top);
            self.scroll_state.set_offset(Position { x: 0, y: new_y });
            self.stick_to_bottom = new_y >= self.max_scroll();
        }
    }

    /// Clamp scroll and re-engage auto-scroll if the user has reached the bottom.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_scroll();
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }
}

/// Scrollable conversation view component.
/// Created fresh each frame with references to state and data.
pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub app: &'a App,
    pub spinner_frame: usize,
}

impl<'a> MessageList<'a> {
    pub fn new(state: &'a mut MessageListState, app: &'a App, spinner_frame: usize) -> Self {
        Self {
            state,
            app,
            spinner_frame,
        }
    }

    fn row_height(&self, row: Row, content_width: u16) -> u16 {
        let messages = self.app.transcript.as_slice();
        match row {
            Row::Message(i) => Message::calculate_height(self.app.display_text(&messages[i]), content_width),
            Row::ProductsHeader(_) | Row::Typing => 1,
            Row::Product { message, index } => ProductCard::calculate_height(
                &messages[message].products[index],
                content_width.saturating_sub(CARD_INDENT),
            ),
        }
    }

    /// Row of the message owning the reveal, complete or not. Its text can
    /// change between frames by more than one tick, or jump to full length.
    fn volatile_row(&self, rows: &[Row]) -> Option<usize> {
        let revealing = self.app.reveal.as_ref()?.message_id;
        let messages = self.app.transcript.as_slice();
        rows.iter()
            .position(|row| matches!(row, Row::Message(i) if messages[*i].id == revealing))
    }
}

impl<'a> Component for MessageList<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // -1 for scrollbar safe area
        let messages = self.app.transcript.as_slice();
        let rows = build_rows(messages, self.app.is_loading);

        // 1. Update layout cache
        let volatile = self.volatile_row(&rows);
        let reusable = self.state.layout.reusable_count(&rows, content_width, volatile);
        self.state.layout.heights.truncate(reusable);
        for &row in rows.iter().skip(reusable) {
            let height = self.row_height(row, content_width);
            self.state.layout.heights.push(height);
        }
        self.state.layout.rows = rows.clone();
        self.state.layout.content_width = content_width;
        self.state.layout.volatile = volatile;
        self.state.layout.rebuild_prefix_heights();

        let total_height = self.state.layout.total_height();

        // 2. Clamp scroll offset to prevent overscrolling past content
        self.state.viewport_height = area.height;
        if self.state.stick_to_bottom {
            self.state.scroll_state.set_offset(Position {
                x: 0,
                y: self.state.max_scroll(),
            });
        } else {
            self.state.clamp_scroll();
        }

        let scroll_offset = self.state.scroll_state.offset().y;
        let visible_range = self.state.layout.visible_range(scroll_offset, area.height);

        // 3. Render visible rows into a ScrollView
        let mut scroll_view = ScrollView::new(Size::new(content_width, total_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Always)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        for i in visible_range {
            let row = rows[i];
            let height = self.state.layout.heights[i];
            let y = self.state.layout.row_top(i);
            let is_selected = self.state.selected_index == Some(i);

            match row {
                Row::Message(m) => {
                    let message = &messages[m];
                    let widget = Message::new(message, self.app.display_text(message), is_selected);
                    scroll_view.render_widget(widget, Rect::new(0, y, content_width, height));
                }
                Row::ProductsHeader(_) => {
                    let header = Line::from(Span::styled(
                        PRODUCTS_HEADER,
                        Style::default().add_modifier(Modifier::BOLD),
                    ));
                    scroll_view.render_widget(
                        header,
                        Rect::new(CARD_INDENT, y, content_width.saturating_sub(CARD_INDENT), 1),
                    );
                }
                Row::Product { message, index } => {
                    let msg = &messages[message];
                    let card = ProductCard {
                        product: &msg.products[index],
                        image: self.app.image(msg.id, index),
                        probe_images: self.app.probe_images,
                        is_selected,
                    };
                    scroll_view.render_widget(
                        card,
                        Rect::new(
                            CARD_INDENT,
                            y,
                            content_width.saturating_sub(CARD_INDENT),
                            height,
                        ),
                    );
                }
                Row::Typing => {
                    let frame_symbol = SPINNER[self.spinner_frame % SPINNER.len()];
                    let typing = Line::from(Span::styled(
                        format!("{frame_symbol} Assistant is typing..."),
                        Style::default()
                            .fg(Color::DarkGray)
                            .add_modifier(Modifier::ITALIC),
                    ));
                    scroll_view.render_widget(typing, Rect::new(1, y, content_width.saturating_sub(1), 1));
                }
            }
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);

        let current_offset = self.state.scroll_state.offset().y;
        self.state.has_unseen_content = current_offset < self.state.max_scroll();
    }
}

/// EventHandler lives on `MessageListState` because scrolling mutates
/// persistent state, while `MessageList` is rebuilt every frame.
impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollToBottom => self.pin_to_bottom(),
            _ => {}
        }
        None
    }
}

/// Cached layout measurements, one entry per row.
pub struct LayoutCache {
    pub heights: Vec<u16>,
    pub prefix_heights: Vec<u16>,
    /// The rows the cached heights were measured for.
    pub rows: Vec<Row>,
    content_width: u16,
    /// Volatile row at the last measurement; a reveal dropped on submit
    /// leaves that row measured from a partial prefix.
    volatile: Option<usize>,
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutCache {
    pub fn new() -> Self {
        Self {
            heights: Vec::new(),
            prefix_heights: Vec::new(),
            rows: Vec::new(),
            content_width: 0,
            volatile: None,
        }
    }

    /// Number of leading cached heights still valid for `rows`.
    ///
    /// A row is reusable when it is the same row as last frame, at the
    /// same width, and comes before both the `volatile` row (if any) and
    /// the row that was volatile when the cache was last filled.
    pub fn reusable_count(&self, rows: &[Row], content_width: u16, volatile: Option<usize>) -> usize {
        if self.content_width != content_width {
            return 0;
        }
        let same_prefix = self
            .rows
            .iter()
            .zip(rows)
            .take(self.heights.len())
            .take_while(|(cached, current)| cached == current)
            .count();
        [volatile, self.volatile]
            .into_iter()
            .flatten()
            .fold(same_prefix, usize::min)
    }

    pub fn rebuild_prefix_heights(&mut self) {
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc = acc.saturating_add(h);
                Some(*acc)
            })
            .collect();
    }

    pub fn total_height(&self) -> u16 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    pub fn row_top(&self, idx: usize) -> u16 {
        if idx == 0 {
            0
        } else {
            self.prefix_heights.get(idx - 1).copied().unwrap_or(0)
        }
    }

    pub fn visible_range(&self, scroll_offset: u16, viewport_height: u16) -> std::ops::Range<usize> {
        let buffer = viewport_height / 2;
        let buffered_start = scroll_offset.saturating_sub(buffer);
        let buffered_end = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(buffer);

        let start = self
            .prefix_heights
            .partition_point(|&end| end <= buffered_start);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < buffered_end)
            .saturating_add(1)
            .min(self.prefix_heights.len());

        start..end
    }

    /// The row at content-space `y`, with `y` relative to that row's top.
    pub fn row_at(&self, content_y: u16) -> Option<(usize, u16)> {
        let idx = self.prefix_heights.partition_point(|&end| end <= content_y);
        (idx < self.prefix_heights.len()).then(|| (idx, content_y - self.row_top(idx)))
    }
}
