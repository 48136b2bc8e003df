use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};

use crate::core::message::{Message as ChatMessage, Sender};
use crate::tui::component::Component;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;

/// A stateless component that renders one chat message.
///
/// `text` is what to show right now: the full message, or the revealed
/// prefix while the typewriter runs. The timestamp sits in the bottom border.
///
/// [`calculate_height`](Self::calculate_height) predicts the rendered height
/// with `textwrap` options matching Ratatui's `Paragraph` wrapping, so the
/// parent list can lay out scroll positions without rendering.
#[derive(Clone, Copy)]
pub struct Message<'a> {
    pub message: &'a ChatMessage,
    pub text: &'a str,
    /// Whether this message is selected in Cursor mode or hovered
    pub is_selected: bool,
}

impl<'a> Message<'a> {
    pub fn new(message: &'a ChatMessage, text: &'a str, is_selected: bool) -> Self {
        Self {
            message,
            text,
            is_selected,
        }
    }

    pub fn calculate_height(text: &str, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            // Terminal too narrow for borders + padding
            return 1;
        }

        let content = text.trim();
        if content.is_empty() {
            // Keep one blank content row so an empty reveal doesn't collapse the bubble
            return 1 + VERTICAL_OVERHEAD;
        }

        let options = textwrap::Options::new(content_width as usize)
            .break_words(true)
            .word_separator(textwrap::WordSeparator::AsciiSpace);

        let lines = textwrap::wrap(content, options);
        (lines.len() as u16).max(1) + VERTICAL_OVERHEAD
    }
}

pub fn sender_label(sender: Sender) -> &'static str {
    match sender {
        Sender::User => "You",
        Sender::Bot => "Assistant",
    }
}

pub fn sender_style(sender: Sender) -> Style {
    match sender {
        Sender::User => Style::default().fg(Color::Cyan),
        Sender::Bot => Style::default().fg(Color::Green),
    }
}

impl<'a> Widget for Message<'a> {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        let style = sender_style(self.message.sender);
        let border_style = if self.is_selected {
            Style::default().fg(Color::Magenta)
        } else {
            style.add_modifier(Modifier::DIM)
        };

        let block = Block::bordered()
            .title(sender_label(self.message.sender))
            .title_bottom(Line::from(self.message.time_label()).right_aligned())
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title_style(border_style)
            .padding(Padding::horizontal(CONTENT_PAD_H));

        let inner_area = block.inner(area);
        block.render(area, buf);

        Paragraph::new(self.text.trim())
            .style(style)
            .wrap(Wrap { trim: true })
            .render(inner_area, buf);
    }
}

impl<'a> Component for Message<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(*self, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transcript::Transcript;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn calculate_height_empty_text_keeps_one_row() {
        assert_eq!(Message::calculate_height("", 80), 1 + VERTICAL_OVERHEAD);
        assert_eq!(Message::calculate_height("  \n ", 80), 1 + VERTICAL_OVERHEAD);
    }

    #[test]
    fn calculate_height_zero_width_returns_minimum() {
        assert_eq!(Message::calculate_height("Hello world", 0), 1);
        assert_eq!(Message::calculate_height("Hello world", HORIZONTAL_OVERHEAD), 1);
    }

    #[test]
    fn calculate_height_single_line_fits() {
        assert_eq!(Message::calculate_height("Hello", 80), 1 + VERTICAL_OVERHEAD);
    }

    #[test]
    fn calculate_height_wraps_at_width_boundary() {
        // content_width = 9 - 4 = 5 → "Hello" | "world"
        assert_eq!(Message::calculate_height("Hello world", 9), 2 + VERTICAL_OVERHEAD);
    }

    #[test]
    fn calculate_height_counts_explicit_lines() {
        let text = "Here are some options:\n1. A\n2. B";
        assert_eq!(Message::calculate_height(text, 80), 3 + VERTICAL_OVERHEAD);
    }

    #[test]
    fn sender_styles_differ() {
        assert_eq!(sender_style(Sender::User).fg, Some(Color::Cyan));
        assert_eq!(sender_style(Sender::Bot).fg, Some(Color::Green));
    }

    #[test]
    fn render_shows_label_text_and_timestamp() {
        let mut transcript = Transcript::new();
        let id = transcript.push(Sender::User, "Where is my order?".into(), vec![]);
        let msg = transcript.get(id).unwrap();

        let backend = TestBackend::new(40, 3);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                f.render_widget(Message::new(msg, &msg.text, false), f.area());
            })
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("You"));
        assert!(text.contains("Where is my order?"));
        assert!(text.contains(&msg.time_label()));
    }
}
