//! Row rendering: a pure mapping from one inventory record to a view description
//!
//! Nothing here touches the network or a display. Front ends apply a
//! [`RowView`] to their own surface (terminal table, HTML, ...).

use chrono::{DateTime, Utc};
use cloudx_api::{ContainerRecord, ContainerStatus, LifecycleAction};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;
const MONTH: i64 = 30 * DAY;

/// Icon shown next to a status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIcon {
    Running,
    Exited,
    Paused,
    Restarting,
    Created,
    Removing,
    Dead,
    Unknown,
}

impl StatusIcon {
    pub fn for_status(status: ContainerStatus) -> Self {
        match status {
            ContainerStatus::Running => Self::Running,
            ContainerStatus::Exited => Self::Exited,
            ContainerStatus::Paused => Self::Paused,
            ContainerStatus::Restarting => Self::Restarting,
            ContainerStatus::Created => Self::Created,
            ContainerStatus::Removing => Self::Removing,
            ContainerStatus::Dead => Self::Dead,
            ContainerStatus::Unknown => Self::Unknown,
        }
    }

    /// Font Awesome class used by the HTML renderer
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Running => "fa-circle",
            Self::Exited => "fa-stop-circle",
            Self::Paused => "fa-pause-circle",
            Self::Restarting => "fa-sync-alt",
            Self::Created => "fa-plus-circle",
            Self::Removing => "fa-minus-circle",
            Self::Dead => "fa-times-circle",
            Self::Unknown => "fa-question-circle",
        }
    }

    /// Terminal glyph
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Running => "●",
            Self::Exited => "■",
            Self::Paused => "‖",
            Self::Restarting => "↻",
            Self::Created => "+",
            Self::Removing => "−",
            Self::Dead => "✗",
            Self::Unknown => "?",
        }
    }
}

/// Visual weight of a button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonVariant {
    Default,
    Success,
    Danger,
}

/// An action button on a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonKind {
    Logs,
    Stop,
    Restart,
    /// Shown on stopped containers; the backend has no separate start action
    Start,
    Delete,
}

impl ButtonKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Logs => "Logs",
            Self::Stop => "Stop",
            Self::Restart => "Restart",
            Self::Start => "Start",
            Self::Delete => "Delete",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Logs => "View Logs",
            Self::Stop => "Stop Container",
            Self::Restart => "Restart Container",
            Self::Start => "Start Container",
            Self::Delete => "Delete Container",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Logs => "fa-file-alt",
            Self::Stop => "fa-stop",
            Self::Restart => "fa-sync-alt",
            Self::Start => "fa-play",
            Self::Delete => "fa-trash",
        }
    }

    pub fn variant(&self) -> ButtonVariant {
        match self {
            Self::Start => ButtonVariant::Success,
            Self::Delete => ButtonVariant::Danger,
            _ => ButtonVariant::Default,
        }
    }

    /// Lifecycle action sent when pressed; `None` for buttons that open a view
    pub fn action(&self) -> Option<LifecycleAction> {
        match self {
            Self::Logs => None,
            Self::Stop => Some(LifecycleAction::Stop),
            Self::Restart | Self::Start => Some(LifecycleAction::Restart),
            Self::Delete => Some(LifecycleAction::Delete),
        }
    }
}

/// Buttons offered for a status
pub fn buttons_for(status: ContainerStatus) -> Vec<ButtonKind> {
    match status {
        ContainerStatus::Running => vec![ButtonKind::Logs, ButtonKind::Stop, ButtonKind::Restart],
        ContainerStatus::Exited | ContainerStatus::Paused => {
            vec![ButtonKind::Logs, ButtonKind::Start, ButtonKind::Delete]
        }
        _ => vec![ButtonKind::Logs],
    }
}

/// Render-ready description of one container row.
///
/// Text fields hold raw backend values; surfaces that emit markup must escape them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub id: String,
    pub name: String,
    pub image: String,
    /// Status as the backend spelled it
    pub status: String,
    /// Lowercased status, used as a style class
    pub status_class: String,
    pub status_icon: StatusIcon,
    pub created_label: String,
    pub buttons: Vec<ButtonKind>,
}

impl RowView {
    pub fn has_button(&self, kind: ButtonKind) -> bool {
        self.buttons.contains(&kind)
    }
}

/// Map a record to its row view
pub fn render_row(record: &ContainerRecord, now: DateTime<Utc>) -> RowView {
    let status = record.status();
    RowView {
        id: record.id.clone(),
        name: record.name.clone(),
        image: record.image.clone(),
        status: record.status.clone(),
        status_class: record.status.trim().to_lowercase(),
        status_icon: StatusIcon::for_status(status),
        created_label: time_ago(record.created_at(), now),
        buttons: buttons_for(status),
    }
}

/// Elapsed-time label for a creation timestamp
pub fn time_ago(created: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(created) = created else {
        return "Unknown".to_string();
    };

    let seconds = (now - created).num_seconds();
    if seconds < MINUTE {
        "Just now".to_string()
    } else if seconds < HOUR {
        format!("{}m ago", seconds / MINUTE)
    } else if seconds < DAY {
        format!("{}h ago", seconds / HOUR)
    } else if seconds < WEEK {
        format!("{}d ago", seconds / DAY)
    } else if seconds < MONTH {
        format!("{}w ago", seconds / WEEK)
    } else {
        created.format("%Y-%m-%d").to_string()
    }
}

/// Header counters for an inventory snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InventoryStats {
    pub running: usize,
    /// Containers in `exited` state; paused ones are not counted as stopped
    pub stopped: usize,
}

impl InventoryStats {
    pub fn from_records(records: &[ContainerRecord]) -> Self {
        records
            .iter()
            .fold(Self::default(), |mut stats, record| {
                match record.status() {
                    ContainerStatus::Running => stats.running += 1,
                    ContainerStatus::Exited => stats.stopped += 1,
                    _ => {}
                }
                stats
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use cloudx_api::Timestamp;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn ago(secs: i64) -> String {
        time_ago(Some(now() - Duration::seconds(secs)), now())
    }

    fn record(status: &str) -> ContainerRecord {
        ContainerRecord {
            id: "c0ffee".to_string(),
            name: "api".to_string(),
            status: status.to_string(),
            image: "python:3.12".to_string(),
            created: Some(Timestamp::Text("2024-06-15T11:00:00Z".to_string())),
        }
    }

    #[test]
    fn test_time_ago_boundaries() {
        assert_eq!(ago(0), "Just now");
        assert_eq!(ago(59), "Just now");
        assert_eq!(ago(60), "1m ago");
        assert_eq!(ago(3599), "59m ago");
        assert_eq!(ago(3600), "1h ago");
        assert_eq!(ago(86_399), "23h ago");
        assert_eq!(ago(86_400), "1d ago");
        assert_eq!(ago(604_799), "6d ago");
        assert_eq!(ago(604_800), "1w ago");
        assert_eq!(ago(2_591_999), "4w ago");
        assert_eq!(ago(2_592_000), "2024-05-16");
    }

    #[test]
    fn test_time_ago_future_and_missing() {
        assert_eq!(ago(-300), "Just now");
        assert_eq!(time_ago(None, now()), "Unknown");
    }

    #[test]
    fn test_buttons_follow_status_case_insensitively() {
        let running = vec![ButtonKind::Logs, ButtonKind::Stop, ButtonKind::Restart];
        let stopped = vec![ButtonKind::Logs, ButtonKind::Start, ButtonKind::Delete];

        for status in ["running", "RUNNING", "Running"] {
            assert_eq!(render_row(&record(status), now()).buttons, running);
        }
        for status in ["exited", "Exited", "paused", "PAUSED"] {
            assert_eq!(render_row(&record(status), now()).buttons, stopped);
        }
        for status in ["restarting", "created", "removing", "dead", "weird", ""] {
            assert_eq!(
                render_row(&record(status), now()).buttons,
                vec![ButtonKind::Logs]
            );
        }
    }

    #[test]
    fn test_start_button_sends_restart() {
        assert_eq!(ButtonKind::Start.action(), Some(LifecycleAction::Restart));
        assert_eq!(ButtonKind::Logs.action(), None);
        assert_eq!(ButtonKind::Delete.variant(), ButtonVariant::Danger);
    }

    #[test]
    fn test_render_row_fields() {
        let row = render_row(&record("Running"), now());
        assert_eq!(row.status, "Running");
        assert_eq!(row.status_class, "running");
        assert_eq!(row.status_icon, StatusIcon::Running);
        assert_eq!(row.created_label, "1h ago");
        assert!(row.has_button(ButtonKind::Stop));
    }

    #[test]
    fn test_unknown_status_gets_default_icon() {
        let row = render_row(&record("hibernating"), now());
        assert_eq!(row.status_icon, StatusIcon::Unknown);
        assert_eq!(row.status_icon.css_class(), "fa-question-circle");
    }

    #[test]
    fn test_stats_count_running_and_exited() {
        let records = vec![
            record("running"),
            record("Exited"),
            record("paused"),
            record("RUNNING"),
        ];
        assert_eq!(
            InventoryStats::from_records(&records),
            InventoryStats {
                running: 2,
                stopped: 1
            }
        );
    }
}
