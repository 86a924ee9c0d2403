//! UI module for rendering the TUI

mod components;
mod forms;

use crate::app::App;
use crate::platform::{CREATE_ANOTHER_SHORTCUT, CREATE_SHORTCUT};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());

    forms::draw_create(frame, chunks[0], app);
    draw_status_bar(frame, chunks[1], app);
}

fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let mut hints = format!(" Tab: next field | {CREATE_SHORTCUT}: create");
    if app.can_create_another() {
        hints.push_str(&format!(" | {CREATE_ANOTHER_SHORTCUT}: create another"));
    }
    hints.push_str(" | Esc: quit");
    let mut spans = vec![Span::styled(hints, Style::default().fg(Color::DarkGray))];

    if let Some(msg) = &app.error_message {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(msg, Style::default().fg(Color::Red)));
    } else if let Some(msg) = &app.status_message {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(msg, Style::default().fg(Color::Green)));
        if let Some(title) = app.notification() {
            spans.push(Span::styled(
                format!(" [{title}]"),
                Style::default().fg(Color::DarkGray),
            ));
        }
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
