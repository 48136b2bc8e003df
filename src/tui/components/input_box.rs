//! # InputBox Component
//!
//! Multi-line message editor at the bottom of the screen.
//!
//! The buffer and cursor are internal state; `disabled` and `focused` are
//! props refreshed by the parent every frame. While disabled (a request is
//! in flight) editing still works but Enter does nothing, so the typed text
//! survives until it can be sent.
//!
//! Text is hard-wrapped by display width. Content taller than
//! [`MAX_VISIBLE_LINES`] scrolls internally to keep the cursor in view.

use std::ops::Range;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{
    Block, BorderType, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
};
use unicode_width::UnicodeWidthChar;

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

pub const PLACEHOLDER: &str = "Ask about products, orders or returns...";
/// Maximum visible content lines before internal scrolling kicks in
pub const MAX_VISIBLE_LINES: u16 = 5;
/// Borders (2) plus a column reserved for the scrollbar
const HORIZONTAL_OVERHEAD: u16 = 3;
const VERTICAL_OVERHEAD: u16 = 2;
const DEFAULT_WIDTH: u16 = 80;

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Enter on a non-blank buffer. Carries the raw, untrimmed text.
    Submit(String),
    ContentChanged,
}

/// Byte ranges of the visual lines of `text` wrapped at `width` columns.
/// Always returns at least one range.
fn visual_lines(text: &str, width: u16) -> Vec<Range<usize>> {
    let width = width as usize;
    if width == 0 {
        return vec![0..text.len()];
    }
    let mut lines = Vec::new();
    let mut offset = 0;
    for logical in text.split('\n') {
        let mut start = offset;
        let mut col = 0;
        for (i, c) in logical.char_indices() {
            let w = c.width().unwrap_or(0);
            if col + w > width && col > 0 {
                lines.push(start..offset + i);
                start = offset + i;
                col = 0;
            }
            col += w;
        }
        lines.push(start..offset + logical.len());
        offset += logical.len() + 1;
    }
    lines
}

fn display_width(text: &str) -> u16 {
    text.chars().map(|c| c.width().unwrap_or(0) as u16).sum()
}

fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos].char_indices().next_back().map_or(0, |(i, _)| i)
}

fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .chars()
        .next()
        .map_or(text.len(), |c| pos + c.len_utf8())
}

pub struct InputBox {
    pub buffer: String,
    /// Cursor position as a byte offset into `buffer`
    cursor: usize,
    /// First visible line when content exceeds the viewport
    scroll_offset: u16,
    /// Inner width from the last render, used for vertical movement
    last_inner_width: u16,
    /// Prop: submit is blocked while a request is in flight
    pub disabled: bool,
    /// Prop: false while the message list has keyboard focus
    pub focused: bool,
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            scroll_offset: 0,
            last_inner_width: DEFAULT_WIDTH - HORIZONTAL_OVERHEAD,
            disabled: false,
            focused: true,
        }
    }

    /// Required height for the current buffer, between one and
    /// [`MAX_VISIBLE_LINES`] content rows plus borders.
    pub fn calculate_height(&self, width: u16) -> u16 {
        let inner = width.saturating_sub(HORIZONTAL_OVERHEAD);
        let lines = visual_lines(&self.buffer, inner).len() as u16;
        lines.clamp(1, MAX_VISIBLE_LINES) + VERTICAL_OVERHEAD
    }

    fn cursor_line(lines: &[Range<usize>], pos: usize) -> usize {
        lines.partition_point(|r| r.start <= pos).saturating_sub(1)
    }

    /// Returns `true` if the cursor moved.
    fn move_vertically(&mut self, down: bool) -> bool {
        let lines = visual_lines(&self.buffer, self.last_inner_width);
        let current = Self::cursor_line(&lines, self.cursor);
        let target = match (down, current) {
            (false, 0) => return false,
            (false, n) => n - 1,
            (true, n) if n + 1 >= lines.len() => return false,
            (true, n) => n + 1,
        };
        let column = display_width(&self.buffer[lines[current].start..self.cursor]);

        let range = lines[target].clone();
        let mut pos = range.start;
        let mut col = 0;
        for (i, c) in self.buffer[range.clone()].char_indices() {
            let w = c.width().unwrap_or(0) as u16;
            if col + w > column {
                break;
            }
            col += w;
            pos = range.start + i + c.len_utf8();
        }
        self.cursor = pos;
        true
    }

    fn keep_cursor_visible(&mut self, lines: &[Range<usize>]) {
        let total = lines.len() as u16;
        if total <= MAX_VISIBLE_LINES {
            self.scroll_offset = 0;
            return;
        }
        let line = Self::cursor_line(lines, self.cursor) as u16;
        if line < self.scroll_offset {
            self.scroll_offset = line;
        } else if line >= self.scroll_offset + MAX_VISIBLE_LINES {
            self.scroll_offset = line + 1 - MAX_VISIBLE_LINES;
        }
        self.scroll_offset = self.scroll_offset.min(total - MAX_VISIBLE_LINES);
    }

    fn insert(&mut self, text: &str) -> Option<InputEvent> {
        self.buffer.insert_str(self.cursor, text);
        self.cursor += text.len();
        Some(InputEvent::ContentChanged)
    }

    fn move_to(&mut self, pos: usize) -> Option<InputEvent> {
        (pos != self.cursor).then(|| {
            self.cursor = pos;
            InputEvent::ContentChanged
        })
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let inner = area.width.saturating_sub(HORIZONTAL_OVERHEAD);
        self.last_inner_width = inner;
        let lines = visual_lines(&self.buffer, inner);
        self.keep_cursor_visible(&lines);

        let (title, border_color) = if self.disabled {
            ("Message (waiting for reply...)", Color::Yellow)
        } else {
            ("Message (Enter to send, Shift+Enter for newline)", Color::Green)
        };
        let mut border_style = Style::default().fg(border_color);
        if !self.focused {
            border_style = border_style.add_modifier(Modifier::DIM);
        }
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(title);

        let body: Vec<Line> = if self.buffer.is_empty() {
            vec![Line::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray))]
        } else {
            lines
                .iter()
                .skip(self.scroll_offset as usize)
                .take(MAX_VISIBLE_LINES as usize)
                .map(|r| Line::raw(&self.buffer[r.clone()]))
                .collect()
        };
        frame.render_widget(Paragraph::new(body).block(block), area);

        let total = lines.len() as u16;
        if total > MAX_VISIBLE_LINES {
            let mut scrollbar_state = ScrollbarState::default()
                .content_length((total - MAX_VISIBLE_LINES) as usize)
                .position(self.scroll_offset as usize);
            let scrollbar_area = Rect {
                x: area.x + area.width.saturating_sub(1),
                y: area.y + 1,
                width: 1,
                height: area.height.saturating_sub(2),
            };
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight),
                scrollbar_area,
                &mut scrollbar_state,
            );
        }

        if self.focused {
            let line_idx = Self::cursor_line(&lines, self.cursor);
            let column = display_width(&self.buffer[lines[line_idx].start..self.cursor]).min(inner);
            let row = (line_idx as u16).saturating_sub(self.scroll_offset);
            frame.set_cursor_position((area.x + 1 + column, area.y + 1 + row));
        }
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) => self.insert(c.encode_utf8(&mut [0; 4])),
            TuiEvent::Paste(text) => self.insert(&text.replace("\r\n", "\n")),
            TuiEvent::Backspace => {
                if self.cursor == 0 {
                    return None;
                }
                let prev = prev_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Delete => {
                if self.cursor >= self.buffer.len() {
                    return None;
                }
                let next = next_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(self.cursor..next);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorLeft if self.cursor > 0 => {
                self.move_to(prev_char_boundary(&self.buffer, self.cursor))
            }
            TuiEvent::CursorRight if self.cursor < self.buffer.len() => {
                self.move_to(next_char_boundary(&self.buffer, self.cursor))
            }
            TuiEvent::CursorHome => {
                let line_start = self.buffer[..self.cursor].rfind('\n').map_or(0, |i| i + 1);
                self.move_to(line_start)
            }
            TuiEvent::CursorEnd => {
                let line_end = self.buffer[self.cursor..]
                    .find('\n')
                    .map_or(self.buffer.len(), |i| self.cursor + i);
                self.move_to(line_end)
            }
            TuiEvent::CursorUp => self.move_vertically(false).then_some(InputEvent::ContentChanged),
            TuiEvent::CursorDown => self.move_vertically(true).then_some(InputEvent::ContentChanged),
            TuiEvent::Submit => {
                if self.disabled || self.buffer.trim().is_empty() {
                    return None;
                }
                self.cursor = 0;
                self.scroll_offset = 0;
                Some(InputEvent::Submit(std::mem::take(&mut self.buffer)))
            }
            _ => None,
        }
    }
}
