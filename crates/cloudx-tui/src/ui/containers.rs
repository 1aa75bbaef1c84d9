use super::{draw_message, spinner};
use crate::app::App;
use cloudx_core::{ButtonKind, ButtonVariant, InventoryPanel, RowView, StatusIcon};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Row, Table},
};

pub(super) fn draw_containers(frame: &mut Frame, app: &mut App, area: Rect) {
    match &app.inventory.panel {
        InventoryPanel::Loading => {
            let line = Line::from(format!(
                "{} Loading containers...",
                spinner::frame(app.spinner_frame)
            ));
            draw_message(frame, area, " Containers ", vec![Line::from(""), line]);
        }
        InventoryPanel::Empty => draw_message(
            frame,
            area,
            " Containers ",
            vec![
                Line::from(""),
                Line::from(Span::styled("No containers found", Style::default().bold())),
                Line::from(""),
                Line::from(Span::styled(
                    "Press R to refresh",
                    Style::default().fg(Color::DarkGray),
                )),
            ],
        ),
        InventoryPanel::Failed(message) => draw_message(
            frame,
            area,
            " Containers ",
            vec![
                Line::from(""),
                Line::from(Span::styled(
                    "Failed to load containers",
                    Style::default().fg(Color::Red).bold(),
                )),
                Line::from(""),
                Line::from(message.clone()),
                Line::from(""),
                Line::from(Span::styled(
                    "Press R to retry",
                    Style::default().fg(Color::DarkGray),
                )),
            ],
        ),
        InventoryPanel::Table(rows) => {
            let table_rows: Vec<Row> = rows
                .iter()
                .enumerate()
                .map(|(i, row)| container_row(app, row, i == app.selected))
                .collect();
            let title = format!(" Containers ({}) ", table_rows.len());

            let table = Table::new(
                table_rows,
                [
                    Constraint::Length(2),
                    Constraint::Min(16),
                    Constraint::Length(12),
                    Constraint::Min(20),
                    Constraint::Length(12),
                    Constraint::Min(30),
                ],
            )
            .header(
                Row::new(["", "NAME", "STATUS", "IMAGE", "CREATED", "ACTIONS"])
                    .style(Style::default().fg(Color::Yellow).bold()),
            )
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .highlight_style(Style::default().bg(Color::DarkGray));

            frame.render_stateful_widget(table, area, &mut app.containers_table_state);
        }
    }
}

fn status_color(icon: StatusIcon) -> Color {
    match icon {
        StatusIcon::Running => Color::Green,
        StatusIcon::Exited | StatusIcon::Dead => Color::Red,
        StatusIcon::Paused | StatusIcon::Restarting | StatusIcon::Removing => Color::Yellow,
        StatusIcon::Created => Color::Blue,
        StatusIcon::Unknown => Color::Gray,
    }
}

fn button_span(app: &App, row: &RowView, kind: ButtonKind, focused: bool) -> Span<'static> {
    let trigger = app.trigger(&row.id, kind);
    let busy = trigger.map(|t| t.is_busy()).unwrap_or(false);
    let enabled = trigger.map(|t| t.is_enabled()).unwrap_or(true);

    let label = if busy {
        format!("[{}]", spinner::frame(app.spinner_frame))
    } else {
        format!("[{}]", kind.label())
    };

    let mut style = match kind.variant() {
        ButtonVariant::Default => Style::default().fg(Color::White),
        ButtonVariant::Success => Style::default().fg(Color::Green),
        ButtonVariant::Danger => Style::default().fg(Color::Red),
    };
    if !enabled {
        style = style.fg(Color::DarkGray);
    }
    if focused {
        style = style.reversed();
    }
    Span::styled(label, style)
}

fn container_row(app: &App, row: &RowView, selected: bool) -> Row<'static> {
    let color = status_color(row.status_icon);

    let mut buttons = Vec::new();
    for (i, kind) in row.buttons.iter().enumerate() {
        if i > 0 {
            buttons.push(Span::raw(" "));
        }
        buttons.push(button_span(
            app,
            row,
            *kind,
            selected && i == app.selected_button,
        ));
    }

    Row::new(vec![
        Cell::from(Span::styled(row.status_icon.glyph(), Style::default().fg(color))),
        Cell::from(row.name.clone()),
        Cell::from(Span::styled(row.status.clone(), Style::default().fg(color))),
        Cell::from(row.image.clone()),
        Cell::from(row.created_label.clone()),
        Cell::from(Line::from(buttons)),
    ])
}
