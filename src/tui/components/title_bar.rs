//! # TitleBar Component
//!
//! Single-line header: assistant name, backend URL, connection status and
//! a "↓ New" hint when content below the viewport hasn't been seen.
//!
//! Stateless. All data arrives as props, so it renders whatever it's given.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::tui::component::Component;

pub const ASSISTANT_NAME: &str = "🛍️ Shop Assistant";

pub struct TitleBar {
    pub api_url: String,
    /// "Online" or "Sending..."
    pub status_message: String,
    pub is_loading: bool,
    pub has_unseen_content: bool,
}

impl TitleBar {
    pub fn new(
        api_url: String,
        status_message: String,
        is_loading: bool,
        has_unseen_content: bool,
    ) -> Self {
        Self {
            api_url,
            status_message,
            is_loading,
            has_unseen_content,
        }
    }

    fn line(&self) -> Line<'_> {
        let status_color = if self.is_loading {
            Color::Yellow
        } else {
            Color::Green
        };
        let mut spans = vec![
            Span::styled(ASSISTANT_NAME, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" | "),
            Span::styled(self.api_url.as_str(), Style::default().fg(Color::DarkGray)),
        ];
        if !self.status_message.is_empty() {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled("● ", Style::default().fg(status_color)));
            spans.push(Span::raw(self.status_message.as_str()));
        }
        if self.has_unseen_content {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled("↓ New", Style::default().fg(Color::Cyan)));
        }
        Line::from(spans)
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(self.line(), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render_to_text(title_bar: &mut TitleBar) -> String {
        let backend = TestBackend::new(100, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                title_bar.render(f, f.area());
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_title_bar_online() {
        let mut title_bar = TitleBar::new(
            "http://127.0.0.1:5000".to_string(),
            "Online".to_string(),
            false,
            false,
        );
        let text = render_to_text(&mut title_bar);
        assert!(text.contains("Shop Assistant"));
        assert!(text.contains("http://127.0.0.1:5000"));
        assert!(text.contains("Online"));
        assert!(!text.contains("↓ New"));
    }

    #[test]
    fn test_title_bar_sending_with_unseen_content() {
        let mut title_bar = TitleBar::new(
            "http://shop:5000".to_string(),
            "Sending...".to_string(),
            true,
            true,
        );
        let text = render_to_text(&mut title_bar);
        assert!(text.contains("Sending..."));
        assert!(text.contains("↓ New"));
    }

    #[test]
    fn test_title_bar_without_status() {
        let mut title_bar = TitleBar::new("http://shop:5000".to_string(), String::new(), false, false);
        let text = render_to_text(&mut title_bar);
        assert!(text.contains("http://shop:5000"));
        assert!(!text.contains('●'));
    }
}
