//! UI rendering for the TUI application

mod containers;
mod header_footer;
mod logs;
pub mod spinner;

use crate::app::{App, View};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use containers::*;
use header_footer::*;
use logs::*;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with stats
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    draw_header(frame, app, chunks[0]);
    match app.view {
        View::Main => draw_containers(frame, app, chunks[1]),
        View::Help => draw_help(frame, chunks[1]),
    }
    draw_footer(frame, app, chunks[2]);

    if app.log_viewer.is_open() {
        let popup = centered_rect(
            area.width.saturating_mul(9) / 10,
            area.height.saturating_mul(8) / 10,
            area,
        );
        frame.render_widget(Clear, popup);
        draw_logs_modal(frame, app, popup);
    }
}

/// A rect of the given size centered in `area`, clipped to fit
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Bordered, centered message used for the loading and empty states
fn draw_message(frame: &mut Frame, area: Rect, title: &str, lines: Vec<Line<'static>>) {
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(title.to_string())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
    frame.render_widget(paragraph, area);
}
