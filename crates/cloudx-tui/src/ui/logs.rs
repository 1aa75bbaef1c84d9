use super::spinner;
use crate::app::App;
use ansi_to_tui::IntoText;
use cloudx_core::LogViewState;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

pub(super) fn draw_logs_modal(frame: &mut Frame, app: &App, area: Rect) {
    let name = app
        .log_viewer
        .session()
        .map(|s| s.container_name.as_str())
        .unwrap_or("container");

    let (title, body) = match app.log_viewer.state() {
        LogViewState::Closed => return,
        LogViewState::Loading(_) => (
            format!(" Logs: {} ", name),
            Text::from(format!("{} Loading logs...", spinner::frame(app.spinner_frame))),
        ),
        LogViewState::Loaded { text, .. } => {
            let total = text.lines().count();
            // Raw text when the escape sequences are malformed
            let body = text.into_text().unwrap_or_else(|_| Text::raw(text.clone()));
            (
                format!(" Logs: {} [{}/{}] ", name, app.logs_scroll + 1, total.max(1)),
                body,
            )
        }
        LogViewState::Failed { message, .. } => (
            format!(" Logs: {} ", name),
            Text::from(vec![
                Line::from(Span::styled(
                    "Failed to fetch logs",
                    Style::default().fg(Color::Red).bold(),
                )),
                Line::from(""),
                Line::from(message.clone()),
                Line::from(""),
                Line::from(Span::styled(
                    "Press r to retry",
                    Style::default().fg(Color::DarkGray),
                )),
            ]),
        ),
    };

    let scroll = u16::try_from(app.logs_scroll).unwrap_or(u16::MAX);
    let logs = Paragraph::new(body)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
    frame.render_widget(logs, area);
}
