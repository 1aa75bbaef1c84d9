//! User-facing notifications
//!
//! Components report outcomes through an injected [`Notifier`]. Front ends
//! that have nowhere to show them use [`NoopNotifier`].

use tokio::sync::mpsc;

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
    Info,
}

impl std::fmt::Display for ToastLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
}

impl Toast {
    pub fn new(message: impl Into<String>, level: ToastLevel) -> Self {
        Self {
            message: message.into(),
            level,
        }
    }
}

/// Sink for user-facing notifications. Must never fail.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, level: ToastLevel);
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _message: &str, _level: ToastLevel) {}
}

/// Forwards notifications to an event loop
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Toast>,
}

impl ChannelNotifier {
    pub fn new(tx: mpsc::UnboundedSender<Toast>) -> Self {
        Self { tx }
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, message: &str, level: ToastLevel) {
        // Receiver gone means the UI is shutting down
        let _ = self.tx.send(Toast::new(message, level));
    }
}
