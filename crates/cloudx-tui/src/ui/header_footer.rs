use crate::app::{App, View};
use cloudx_core::ToastLevel;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

pub(super) fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let stats = app.inventory.stats;
    let line = Line::from(vec![
        Span::styled("● ", Style::default().fg(Color::Green)),
        Span::raw(format!("{} running", stats.running)),
        Span::raw("   "),
        Span::styled("■ ", Style::default().fg(Color::Red)),
        Span::raw(format!("{} stopped", stats.stopped)),
        Span::raw("   "),
        Span::styled(app.endpoint.clone(), Style::default().fg(Color::DarkGray)),
    ]);

    let header = Paragraph::new(line).block(
        Block::default()
            .title(" cloudx - Container Control ")
            .title_style(Style::default().fg(Color::Cyan).bold())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(header, area);
}

/// Context-sensitive key help
pub(super) fn footer_help(app: &App) -> &'static str {
    if app.log_viewer.is_open() {
        return "j/k: Scroll  g/G: Top/Bottom  c: Copy  e: Export  r: Reload  Esc/q: Close";
    }
    match app.view {
        View::Help => "Esc/q: Back",
        View::Main if app.inventory.rows().is_empty() => "R: Refresh  ?: Help  q: Quit",
        View::Main => {
            "j/k: Navigate  ←/→: Button  Enter: Press  l: Logs  s: Stop/Start  r: Restart  d: Delete  R: Refresh  ?: Help  q: Quit"
        }
    }
}

pub(super) fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let line = match app.toasts.current() {
        Some(toast) => {
            let color = match toast.level {
                ToastLevel::Success => Color::Green,
                ToastLevel::Error => Color::Red,
                ToastLevel::Info => Color::Cyan,
            };
            Line::from(Span::styled(toast.message.clone(), Style::default().fg(color)))
        }
        None => Line::from(Span::styled(
            footer_help(app),
            Style::default().fg(Color::DarkGray),
        )),
    };

    let footer = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(footer, area);
}

pub(super) fn draw_help(frame: &mut Frame, area: Rect) {
    let help = vec![
        Line::from(""),
        Line::from(Span::styled("Containers", Style::default().bold().underlined())),
        Line::from(""),
        Line::from("  j/Down      Move selection down"),
        Line::from("  k/Up        Move selection up"),
        Line::from("  g/G         First / last container"),
        Line::from("  Left/Right  Focus a button in the row"),
        Line::from("  Enter       Press the focused button"),
        Line::from("  l           Show logs"),
        Line::from("  s           Stop or Start container"),
        Line::from("  r           Restart container"),
        Line::from("  d/Delete    Delete container"),
        Line::from("  R/F5        Refresh list"),
        Line::from(""),
        Line::from(Span::styled("Logs", Style::default().bold().underlined())),
        Line::from(""),
        Line::from("  j/k         Scroll"),
        Line::from("  c           Copy to clipboard"),
        Line::from("  e           Export to file"),
        Line::from("  r           Reload"),
        Line::from("  Esc/q       Close"),
        Line::from(""),
        Line::from("  ?/F1        Show this help"),
        Line::from("  q           Quit"),
    ];

    let paragraph = Paragraph::new(help).block(
        Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(paragraph, area);
}
