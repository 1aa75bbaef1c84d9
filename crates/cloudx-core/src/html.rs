//! HTML rendering of row views
//!
//! Every backend-supplied string goes through [`escape_html`] before it is
//! written into markup.

use crate::inventory::{FetchError, InventorySurface};
use crate::row::{ButtonKind, ButtonVariant, InventoryStats, RowView};
use std::fmt::Write;

/// Escape text for use in element content and quoted attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn button_class(kind: ButtonKind) -> &'static str {
    match kind.variant() {
        ButtonVariant::Default => "action-btn-modern",
        ButtonVariant::Success => "action-btn-modern success",
        ButtonVariant::Danger => "action-btn-modern danger",
    }
}

fn render_button(out: &mut String, row: &RowView, kind: ButtonKind) {
    let action = kind
        .action()
        .map(|a| a.as_str())
        .unwrap_or("logs");
    let _ = write!(
        out,
        r#"<button class="{}" data-container-id="{}" data-container-name="{}" data-action="{}" title="{}"><i class="fas {}"></i><span>{}</span></button>"#,
        button_class(kind),
        escape_html(&row.id),
        escape_html(&row.name),
        action,
        kind.title(),
        kind.icon(),
        kind.label(),
    );
}

/// Render one row as a `<tr>`
pub fn render_row_html(row: &RowView) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        concat!(
            r#"<tr><td data-label="Container"><div class="container-name">{name}</div>"#,
            r#"<div class="container-id">{id}</div></td>"#,
            r#"<td data-label="Status"><span class="status-badge-modern {class}">"#,
            r#"<i class="fas {icon}"></i><span>{status}</span></span></td>"#,
            r#"<td data-label="Image"><span class="image-name">{image}</span></td>"#,
            r#"<td data-label="Created"><span class="created-time">{created}</span></td>"#,
            r#"<td data-label="Actions"><div class="action-buttons-modern">"#,
        ),
        name = escape_html(&row.name),
        id = escape_html(&row.id),
        class = escape_html(&row.status_class),
        icon = row.status_icon.css_class(),
        status = escape_html(&row.status),
        image = escape_html(&row.image),
        created = escape_html(&row.created_label),
    );
    for kind in &row.buttons {
        render_button(&mut out, row, *kind);
    }
    out.push_str("</div></td></tr>");
    out
}

/// Surface that builds a standalone HTML page of the inventory
#[derive(Debug, Default)]
pub struct HtmlSurface {
    stats: InventoryStats,
    body: String,
}

impl HtmlSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// The full document
    pub fn into_document(self) -> String {
        format!(
            concat!(
                "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Containers</title></head>\n",
                "<body>\n<header><span id=\"runningCount\">{}</span> running, ",
                "<span id=\"stoppedCount\">{}</span> stopped</header>\n{}\n</body>\n</html>\n"
            ),
            self.stats.running, self.stats.stopped, self.body
        )
    }
}

impl InventorySurface for HtmlSurface {
    fn show_loading(&mut self) {
        self.body = r#"<div id="loadingState">Loading containers...</div>"#.to_string();
    }

    fn update_stats(&mut self, stats: InventoryStats) {
        self.stats = stats;
    }

    fn show_empty(&mut self, error: Option<&FetchError>) {
        self.body = match error {
            Some(e) => format!(
                r#"<div id="emptyState"><h3 class="empty-state-title">Failed to load containers</h3><p class="empty-state-description">{}</p></div>"#,
                escape_html(&e.to_string())
            ),
            None => r#"<div id="emptyState"><h3 class="empty-state-title">No containers found</h3></div>"#
                .to_string(),
        };
    }

    fn show_table(&mut self, rows: Vec<RowView>) {
        let mut body = String::from(
            r#"<table id="containerTable"><thead><tr><th>Container</th><th>Status</th><th>Image</th><th>Created</th><th>Actions</th></tr></thead><tbody id="containerTableBody">"#,
        );
        for row in &rows {
            body.push_str(&render_row_html(row));
        }
        body.push_str("</tbody></table>");
        self.body = body;
    }
}
