//! Terminal and background events

use cloudx_api::{ApiError, ContainerRecord, LifecycleRequest};
use cloudx_core::{ButtonKind, FetchError, InventoryTicket, LogSession};
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};
use std::time::Duration;
use tokio::sync::mpsc;

/// Terminal events
#[derive(Debug, Clone)]
pub enum Event {
    /// Terminal tick (for animations/updates)
    Tick,
    /// Key press
    Key(KeyEvent),
    /// Terminal resize
    Resize(u16, u16),
}

/// Results of work spawned off the UI loop
#[derive(Debug)]
pub enum AppEvent {
    InventoryLoaded {
        ticket: InventoryTicket,
        result: Result<Vec<ContainerRecord>, FetchError>,
    },
    ActionFinished {
        request: LifecycleRequest,
        button: ButtonKind,
        result: Result<(), ApiError>,
    },
    LogsLoaded {
        session: LogSession,
        result: Result<Option<String>, ApiError>,
    },
}

/// Event handler that runs in a separate task
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    _tx: mpsc::UnboundedSender<Event>,
}

impl EventHandler {
    /// Create a new event handler with the given tick rate
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let tx_clone = tx.clone();

        tokio::spawn(async move {
            loop {
                let event = if event::poll(tick_rate).unwrap_or(false) {
                    match event::read() {
                        Ok(CrosstermEvent::Key(key)) => Event::Key(key),
                        Ok(CrosstermEvent::Resize(w, h)) => Event::Resize(w, h),
                        _ => continue,
                    }
                } else {
                    Event::Tick
                };
                if tx_clone.send(event).is_err() {
                    break;
                }
            }
        });

        Self { rx, _tx: tx }
    }

    /// Receive the next event
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}
