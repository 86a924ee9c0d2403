//! Create form rendering

use super::field_renderer::{draw_field, field_height};
use crate::app::App;
use crate::platform::{CREATE_ANOTHER_SHORTCUT, CREATE_SHORTCUT};
use crate::ui::components::{render_button, BUTTON_HEIGHT};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, List, ListItem},
    Frame,
};
use serde_json::Value;

/// Draw the create form with its action panel
pub fn draw_create(frame: &mut Frame, area: Rect, app: &App) {
    // Split into form (left) and action panel (right)
    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(40),    // Form area
            Constraint::Length(28), // Action panel
        ])
        .split(area);

    draw_form(frame, main_chunks[0], app);
    draw_action_panel(frame, main_chunks[1], app);
}

fn draw_form(frame: &mut Frame, area: Rect, app: &App) {
    let team = app
        .team()
        .attribute("name")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let block = Block::default()
        .title(format!(" Create Task for {team} "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let fields = &app.form.fields;
    let mut constraints: Vec<Constraint> = fields
        .iter()
        .map(|f| Constraint::Length(field_height(f)))
        .collect();
    constraints.push(Constraint::Min(0));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (i, field) in fields.iter().enumerate() {
        draw_field(frame, chunks[i], field, i == app.form.active_field_index);
    }
}

fn draw_action_panel(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Actions ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let actions = app.submit_actions();
    let mut constraints: Vec<Constraint> = actions
        .iter()
        .map(|_| Constraint::Length(BUTTON_HEIGHT))
        .collect();
    constraints.push(Constraint::Min(0)); // created records

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    // Primary action first
    for (i, action) in actions.iter().enumerate() {
        let (label, shortcut, accent) = if action.arguments.another {
            ("Create another", CREATE_ANOTHER_SHORTCUT, Color::Blue)
        } else {
            ("Create", CREATE_SHORTCUT, Color::Green)
        };
        render_button(frame, chunks[i], label, shortcut, accent);
    }

    let items: Vec<ListItem> = app
        .created()
        .iter()
        .rev()
        .map(|record| {
            let title = record
                .attribute("title")
                .and_then(Value::as_str)
                .unwrap_or("untitled");
            ListItem::new(Line::from(format!("✓ {title}")))
        })
        .collect();
    let list = List::new(items)
        .style(Style::default().fg(Color::Green))
        .block(
            Block::default()
                .title(format!(" Created ({} stored) ", app.stored_tasks()))
                .borders(Borders::TOP),
        );
    if let Some(area) = chunks.last() {
        frame.render_widget(list, *area);
    }
}
