//! Field rendering utilities for forms

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use record_create::state::FormField;

/// Height a field needs in the form layout
pub fn field_height(field: &FormField) -> u16 {
    if field.is_multiline {
        6
    } else {
        3
    }
}

/// Draw a form field using FormField from the domain layer
pub fn draw_field(frame: &mut Frame, area: Rect, field: &FormField, is_active: bool) {
    let color = if is_active { Color::Cyan } else { Color::DarkGray };
    let style = Style::default().fg(color);

    let display_value = field.display_value();
    let display_str = if display_value.is_empty() && !is_active {
        "(empty)".to_string()
    } else {
        display_value
    };

    let cursor = if is_active { "▌" } else { "" };
    let cursor_style = Style::default().fg(Color::Cyan);

    let content = if field.is_multiline {
        let mut lines: Vec<Line> = display_str
            .lines()
            .map(|l| Line::from(l.to_string()))
            .collect();
        if is_active {
            if let Some(last) = lines.last_mut() {
                last.spans.push(Span::styled(cursor, cursor_style));
            } else {
                lines.push(Line::from(Span::styled(cursor, cursor_style)));
            }
        }
        Paragraph::new(lines)
    } else {
        Paragraph::new(Line::from(vec![
            Span::styled(&display_str, style),
            Span::styled(cursor, cursor_style),
        ]))
    };

    let title = if field.required {
        format!(" {} * ", field.label)
    } else {
        format!(" {} ", field.label)
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(style);

    frame.render_widget(content.wrap(Wrap { trim: false }).block(block), area);
}
