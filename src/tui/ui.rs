use crate::core::state::App;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::message_list::{CARD_INDENT, LayoutCache};
use crate::tui::components::{MessageList, TitleBar};

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, BorderType, Paragraph, Wrap};

const ERROR_BANNER_HEIGHT: u16 = 3;

/// Title, message list, error banner (zero height when absent), input.
fn screen_layout(frame_area: Rect, input_height: u16, has_error: bool) -> [Rect; 4] {
    use Constraint::{Length, Min};
    let banner = if has_error { ERROR_BANNER_HEIGHT } else { 0 };
    Layout::vertical([Length(1), Min(0), Length(banner), Length(input_height)]).areas(frame_area)
}

/// The area the message list occupies for the current app and input state.
pub fn main_area(frame_area: Rect, app: &App, tui: &TuiState) -> Rect {
    let input_height = tui.input_box.calculate_height(frame_area.width);
    screen_layout(frame_area, input_height, app.error.is_some())[1]
}

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    let input_height = tui.input_box.calculate_height(frame.area().width);
    let [title_area, list_area, error_area, input_area] =
        screen_layout(frame.area(), input_height, app.error.is_some());

    MessageList::new(&mut tui.message_list, app, spinner_frame).render(frame, list_area);

    // After the list so the "↓ New" hint reflects this frame's scroll position
    TitleBar::new(
        app.api_url.clone(),
        app.status_message.clone(),
        app.is_loading,
        tui.message_list.has_unseen_content,
    )
    .render(frame, title_area);

    if let Some(error) = &app.error {
        draw_error_banner(frame, error_area, error);
    }

    tui.input_box.render(frame, input_area);
}

fn draw_error_banner(frame: &mut Frame, area: Rect, error: &str) {
    let red = Style::default().fg(Color::Red);
    let banner = Paragraph::new(error)
        .style(red)
        .wrap(Wrap { trim: true })
        .block(
            Block::bordered()
                .border_type(BorderType::Rounded)
                .border_style(red)
                .title("Error (Esc to dismiss)"),
        );
    frame.render_widget(banner, area);
}

/// A point inside the message list, resolved to a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowHit {
    pub row: usize,
    /// Column relative to the product card's left edge
    pub card_x: u16,
    /// Line relative to the row's top
    pub local_y: u16,
}

/// Hit test: map a screen position to the message-list row under it.
pub fn hit_test_row(
    screen_x: u16,
    screen_y: u16,
    list_area: Rect,
    scroll_offset_y: u16,
    layout: &LayoutCache,
) -> Option<RowHit> {
    if !list_area.contains((screen_x, screen_y).into()) {
        return None;
    }
    let content_y = (screen_y - list_area.y) + scroll_offset_y;
    let (row, local_y) = layout.row_at(content_y)?;
    Some(RowHit {
        row,
        card_x: (screen_x - list_area.x).saturating_sub(CARD_INDENT),
        local_y,
    })
}
