//! Button component for TUI

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Button height in rows (top border + content + bottom border)
pub const BUTTON_HEIGHT: u16 = 3;

/// Render a submit button with its shortcut hint
pub fn render_button(frame: &mut Frame, area: Rect, label: &str, shortcut: &str, accent: Color) {
    let text_style = Style::default().fg(accent).add_modifier(Modifier::BOLD);

    let paragraph = Paragraph::new(format!(" {label} ({shortcut}) ")).style(text_style);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    frame.render_widget(paragraph.block(block), area);
}
