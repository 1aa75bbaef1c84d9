//! Log viewer
//!
//! State machine: `Closed -> Loading -> {Loaded | Failed} -> Closed`.
//! The open session is an explicit value; a fetch result is only applied if
//! the session it was started for is still the active one.

use crate::clipboard::Clipboard;
use crate::notify::{Notifier, ToastLevel};
use crate::{CoreError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use cloudx_api::{ApiError, ContainerBackend};
use std::path::{Path, PathBuf};

/// Shown instead of an empty pane when the backend returns no log text
pub const NO_LOGS_PLACEHOLDER: &str = "No logs available";

/// Identity of the container whose logs are on screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSession {
    pub container_id: String,
    pub container_name: String,
    token: u64,
}

impl LogSession {
    /// True when both refer to the same open of the viewer
    pub fn same_open(&self, other: &LogSession) -> bool {
        self.token == other.token
    }
}

/// Current state of the viewer
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogViewState {
    #[default]
    Closed,
    Loading(LogSession),
    Loaded { session: LogSession, text: String },
    Failed { session: LogSession, message: String },
}

/// Single-modal log viewer
#[derive(Debug, Default)]
pub struct LogViewer {
    state: LogViewState,
    opens: u64,
}

impl LogViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &LogViewState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, LogViewState::Closed)
    }

    /// The active session, if the viewer is open
    pub fn session(&self) -> Option<&LogSession> {
        match &self.state {
            LogViewState::Closed => None,
            LogViewState::Loading(session)
            | LogViewState::Loaded { session, .. }
            | LogViewState::Failed { session, .. } => Some(session),
        }
    }

    /// Text available to copy/export; only set in `Loaded`
    pub fn loaded_text(&self) -> Option<&str> {
        match &self.state {
            LogViewState::Loaded { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Open the viewer and fetch the logs
    pub async fn open(
        &mut self,
        backend: &dyn ContainerBackend,
        container_id: &str,
        container_name: &str,
    ) -> &LogViewState {
        let session = self.begin_open(container_id, container_name);
        let result = backend.logs(&session.container_id).await;
        self.complete(&session, result);
        &self.state
    }

    /// Record the session and enter `Loading`. Any previous session is replaced.
    pub fn begin_open(&mut self, container_id: &str, container_name: &str) -> LogSession {
        self.opens += 1;
        let session = LogSession {
            container_id: container_id.to_string(),
            container_name: container_name.to_string(),
            token: self.opens,
        };
        tracing::debug!("Opening logs for {} ({})", container_name, container_id);
        self.state = LogViewState::Loading(session.clone());
        session
    }

    /// Apply a fetch result for `session`.
    ///
    /// Returns false, leaving the viewer untouched, when the session is no
    /// longer active (closed or replaced while the request was in flight).
    pub fn complete(
        &mut self,
        session: &LogSession,
        result: std::result::Result<Option<String>, ApiError>,
    ) -> bool {
        let active = matches!(&self.state, LogViewState::Loading(s) if s.same_open(session));
        if !active {
            tracing::debug!(
                "Discarding late log response for {}",
                session.container_id
            );
            return false;
        }

        self.state = match result {
            Ok(text) => LogViewState::Loaded {
                session: session.clone(),
                text: match text {
                    Some(t) if !t.is_empty() => t,
                    _ => NO_LOGS_PLACEHOLDER.to_string(),
                },
            },
            Err(e) => {
                tracing::warn!("Error fetching logs for {}: {}", session.container_id, e);
                LogViewState::Failed {
                    session: session.clone(),
                    message: e.to_string(),
                }
            }
        };
        true
    }

    /// Close from any state and drop the session
    pub fn close(&mut self) {
        self.state = LogViewState::Closed;
    }

    /// Copy the loaded text. Never touches the network.
    pub fn copy_to_clipboard(&self, clipboard: &dyn Clipboard, notifier: &dyn Notifier) -> Result<()> {
        let text = self.require_loaded()?;
        match clipboard.copy(text) {
            Ok(()) => {
                notifier.notify("Logs copied to clipboard", ToastLevel::Success);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to copy logs: {}", e);
                notifier.notify("Failed to copy logs", ToastLevel::Error);
                Err(e)
            }
        }
    }

    /// Write the loaded text to `{dir}/{name}_logs_{timestamp}.txt`
    pub fn export(&self, dir: &Path, now: DateTime<Utc>, notifier: &dyn Notifier) -> Result<PathBuf> {
        let text = self.require_loaded()?;
        let name = self.session().map(|s| s.container_name.as_str());
        let path = dir.join(export_file_name(name, now));

        if let Err(e) = std::fs::write(&path, text) {
            tracing::warn!("Failed to export logs to {:?}: {}", path, e);
            notifier.notify(&format!("Failed to download logs: {}", e), ToastLevel::Error);
            return Err(e.into());
        }

        tracing::info!("Exported logs to {:?}", path);
        notifier.notify("Logs downloaded successfully", ToastLevel::Success);
        Ok(path)
    }

    fn require_loaded(&self) -> Result<&str> {
        self.loaded_text()
            .ok_or_else(|| CoreError::InvalidState("No logs loaded".to_string()))
    }
}

/// File name for exported logs: `{containerName}_logs_{timestamp}.txt`.
///
/// The timestamp is the ISO-8601 instant with `:` and `.` turned into `-` and
/// the millisecond/zone suffix dropped, e.g. `2024-05-01T12-30-45`.
pub fn export_file_name(container_name: Option<&str>, now: DateTime<Utc>) -> String {
    let iso = now.to_rfc3339_opts(SecondsFormat::Millis, true);
    let normalized = iso.replace([':', '.'], "-");
    // "-mmmZ"
    let timestamp = &normalized[..normalized.len() - 5];

    let name = match container_name.map(str::trim) {
        Some(n) if !n.is_empty() => n.replace(['/', '\\'], "_"),
        _ => "container".to_string(),
    };
    format!("{}_logs_{}.txt", name, timestamp)
}
