//! Application state and event handling

use crate::event::{AppEvent, Event, EventHandler};
use crate::ui;
use chrono::Utc;
use cloudx_api::{ContainerBackend, LifecycleRequest};
use cloudx_config::GlobalConfig;
use cloudx_core::{
    ButtonKind, ChannelNotifier, Clipboard, CoreError, InventoryFetcher, InventoryState,
    LifecycleDispatcher, LogViewState, LogViewer, Notifier, RefreshRequest, RefreshScheduler,
    RowView, SystemClipboard, Toast, TriggerButton,
};
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{prelude::*, widgets::TableState};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::mpsc;

/// Application errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

pub type AppResult<T> = Result<T, AppError>;

/// What fills the content area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Main,
    Help,
}

/// How long a toast stays in the footer
const TOAST_TTL: Duration = Duration::from_secs(4);
const TOAST_HISTORY: usize = 16;

/// Recent notifications; the newest unexpired one is shown
#[derive(Debug, Default)]
pub struct ToastBar {
    entries: VecDeque<(Toast, Instant)>,
    visible: bool,
}

impl ToastBar {
    pub fn push(&mut self, toast: Toast) {
        if self.entries.len() == TOAST_HISTORY {
            self.entries.pop_front();
        }
        self.entries.push_back((toast, Instant::now()));
        self.visible = true;
    }

    /// The toast on screen, if any
    pub fn current(&self) -> Option<&Toast> {
        if !self.visible {
            return None;
        }
        self.entries.back().map(|(t, _)| t)
    }

    /// Everything pushed so far, oldest first
    pub fn history(&self) -> impl Iterator<Item = &Toast> {
        self.entries.iter().map(|(t, _)| t)
    }

    fn expire(&mut self, now: Instant) {
        if let Some((_, shown)) = self.entries.back() {
            if now.duration_since(*shown) >= TOAST_TTL {
                self.visible = false;
            }
        }
    }
}

/// Main application state
pub struct App {
    pub config: GlobalConfig,
    pub endpoint: String,
    pub view: View,
    pub should_quit: bool,

    pub inventory: InventoryState,
    /// Selected row
    pub selected: usize,
    /// Focused button within the selected row
    pub selected_button: usize,
    pub containers_table_state: TableState,

    /// Buttons that have been pressed since the rows were last rendered
    pub triggers: HashMap<(String, ButtonKind), TriggerButton>,

    pub log_viewer: LogViewer,
    pub logs_scroll: usize,

    pub toasts: ToastBar,
    pub spinner_frame: usize,
    last_refresh: Instant,

    backend: Arc<dyn ContainerBackend>,
    fetcher: InventoryFetcher,
    dispatcher: LifecycleDispatcher,
    notifier: Arc<dyn Notifier>,
    clipboard: Arc<dyn Clipboard>,

    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
    refresh_rx: mpsc::UnboundedReceiver<RefreshRequest>,
    toast_rx: mpsc::UnboundedReceiver<Toast>,
}

impl App {
    /// Create the app. Nothing is fetched until [`run`](Self::run) or
    /// [`refresh_inventory`](Self::refresh_inventory).
    pub fn new(config: GlobalConfig, backend: Arc<dyn ContainerBackend>) -> Self {
        let (toast_tx, toast_rx) = mpsc::unbounded_channel();
        let notifier: Arc<dyn Notifier> = Arc::new(ChannelNotifier::new(toast_tx));
        let (scheduler, refresh_rx) = RefreshScheduler::new(config.refresh_delay());
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Self {
            endpoint: backend.endpoint(),
            view: View::Main,
            should_quit: false,
            inventory: InventoryState::default(),
            selected: 0,
            selected_button: 0,
            containers_table_state: TableState::default(),
            triggers: HashMap::new(),
            log_viewer: LogViewer::new(),
            logs_scroll: 0,
            toasts: ToastBar::default(),
            spinner_frame: 0,
            last_refresh: Instant::now(),
            fetcher: InventoryFetcher::new(backend.clone(), notifier.clone()),
            dispatcher: LifecycleDispatcher::new(backend.clone(), notifier.clone(), scheduler),
            backend,
            notifier,
            clipboard: Arc::new(SystemClipboard),
            events_tx,
            events_rx,
            refresh_rx,
            toast_rx,
            config,
        }
    }

    /// App with a short refresh delay for tests
    pub fn new_for_testing(backend: Arc<dyn ContainerBackend>) -> Self {
        let mut config = GlobalConfig::default();
        config.refresh.delay_ms = 10;
        Self::new(config, backend)
    }

    /// Replace the clipboard used by the log viewer
    pub fn with_clipboard(mut self, clipboard: Arc<dyn Clipboard>) -> Self {
        self.clipboard = clipboard;
        self
    }

    /// Run the application main loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> AppResult<()> {
        let mut events = EventHandler::new(Duration::from_millis(250));
        self.refresh_inventory();

        while !self.should_quit {
            terminal.draw(|frame| ui::draw(frame, self))?;

            tokio::select! {
                event = events.next() => {
                    if let Some(e) = event {
                        self.handle_event(e);
                    }
                }
                _ = self.process_next_background() => {}
            }
        }

        Ok(())
    }

    /// Wait for one background result (inventory, action, logs, refresh) and apply it
    pub async fn process_next_background(&mut self) {
        tokio::select! {
            Some(event) = self.events_rx.recv() => self.handle_app_event(event),
            Some(request) = self.refresh_rx.recv() => {
                tracing::debug!(
                    "Refreshing after {} on {}",
                    request.after.action,
                    request.after.container_id
                );
                self.refresh_inventory();
            }
            // Both senders live as long as the app
            else => std::future::pending::<()>().await,
        }
        self.drain_toasts();
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key.code, key.modifiers),
            Event::Tick => self.tick(Instant::now()),
            Event::Resize(_, _) => {}
        }
    }

    fn tick(&mut self, now: Instant) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
        self.toasts.expire(now);

        if let Some(interval) = self.config.auto_refresh_interval() {
            if now.duration_since(self.last_refresh) >= interval && !self.inventory.is_loading() {
                self.refresh_inventory();
            }
        }
    }

    /// Start an inventory load; the result arrives as an [`AppEvent`]
    pub fn refresh_inventory(&mut self) {
        let ticket = self.fetcher.begin(&mut self.inventory);
        self.last_refresh = Instant::now();
        let fetcher = self.fetcher.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = fetcher.fetch().await;
            let _ = tx.send(AppEvent::InventoryLoaded { ticket, result });
        });
    }

    /// Apply a background result
    pub fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::InventoryLoaded { ticket, result } => {
                if self
                    .fetcher
                    .apply(ticket, &result, &mut self.inventory, Utc::now())
                {
                    // Fresh rows come with fresh buttons
                    self.triggers.clear();
                    self.clamp_selection();
                }
            }
            AppEvent::ActionFinished {
                request,
                button,
                result,
            } => {
                let key = (request.container_id.clone(), button);
                let mut detached = TriggerButton::new(button);
                let trigger = self.triggers.get_mut(&key).unwrap_or(&mut detached);
                self.dispatcher.settle(&request, result, trigger);
                if trigger.is_enabled() {
                    self.triggers.remove(&key);
                }
            }
            AppEvent::LogsLoaded { session, result } => {
                self.log_viewer.complete(&session, result);
            }
        }
        self.drain_toasts();
    }

    fn drain_toasts(&mut self) {
        while let Ok(toast) = self.toast_rx.try_recv() {
            self.toasts.push(toast);
        }
    }

    /// Handle a key press (exposed for tests)
    pub fn send_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        self.handle_key(code, modifiers);
    }

    /// Advance the clock to `now` (exposed for tests)
    pub fn send_tick(&mut self, now: Instant) {
        self.tick(now);
    }

    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if self.log_viewer.is_open() {
            self.handle_logs_key(code);
        } else {
            match self.view {
                View::Help => {
                    if matches!(code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?')) {
                        self.view = View::Main;
                    }
                }
                View::Main => self.handle_main_key(code),
            }
        }
        self.drain_toasts();
    }

    fn handle_main_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') | KeyCode::F(1) => self.view = View::Help,
            KeyCode::Char('j') | KeyCode::Down => self.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.select_prev(),
            KeyCode::Char('g') | KeyCode::Home => self.select_row(0),
            KeyCode::Char('G') | KeyCode::End => {
                let last = self.inventory.rows().len().saturating_sub(1);
                self.select_row(last);
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.selected_button = self.selected_button.saturating_sub(1);
            }
            KeyCode::Right | KeyCode::Tab => {
                let count = self.selected_row().map(|r| r.buttons.len()).unwrap_or(0);
                if self.selected_button + 1 < count {
                    self.selected_button += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                let focused = self
                    .selected_row()
                    .and_then(|r| r.buttons.get(self.selected_button).copied());
                if let Some(kind) = focused {
                    self.press(kind);
                }
            }
            KeyCode::Char('l') => self.press(ButtonKind::Logs),
            KeyCode::Char('s') => {
                let toggle = self.selected_row().and_then(|r| {
                    [ButtonKind::Stop, ButtonKind::Start]
                        .into_iter()
                        .find(|k| r.has_button(*k))
                });
                if let Some(kind) = toggle {
                    self.press(kind);
                }
            }
            KeyCode::Char('r') => self.press(ButtonKind::Restart),
            KeyCode::Char('d') | KeyCode::Delete => self.press(ButtonKind::Delete),
            KeyCode::Char('R') | KeyCode::F(5) => self.refresh_inventory(),
            _ => {}
        }
    }

    fn handle_logs_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.log_viewer.close();
                self.logs_scroll = 0;
            }
            KeyCode::Char('c') => {
                if let Err(e) = self
                    .log_viewer
                    .copy_to_clipboard(self.clipboard.as_ref(), self.notifier.as_ref())
                {
                    tracing::debug!("Copy skipped: {}", e);
                }
            }
            KeyCode::Char('e') => {
                let dir = self.config.export_dir();
                if let Err(e) = self
                    .log_viewer
                    .export(&dir, Utc::now(), self.notifier.as_ref())
                {
                    tracing::debug!("Export skipped: {}", e);
                }
            }
            KeyCode::Char('r') => {
                if let Some(session) = self.log_viewer.session().cloned() {
                    self.open_logs(&session.container_id, &session.container_name);
                }
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.logs_scroll = (self.logs_scroll + 1).min(self.max_logs_scroll());
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.logs_scroll = self.logs_scroll.saturating_sub(1);
            }
            KeyCode::PageDown => {
                self.logs_scroll = (self.logs_scroll + 20).min(self.max_logs_scroll());
            }
            KeyCode::PageUp => self.logs_scroll = self.logs_scroll.saturating_sub(20),
            KeyCode::Char('g') | KeyCode::Home => self.logs_scroll = 0,
            KeyCode::Char('G') | KeyCode::End => self.logs_scroll = self.max_logs_scroll(),
            _ => {}
        }
    }

    fn max_logs_scroll(&self) -> usize {
        self.log_viewer
            .loaded_text()
            .map(|t| t.lines().count().saturating_sub(1))
            .unwrap_or(0)
    }

    /// Press a button on the selected row. Buttons the row does not offer are ignored.
    fn press(&mut self, kind: ButtonKind) {
        let Some(row) = self.selected_row() else {
            return;
        };
        if !row.has_button(kind) {
            return;
        }
        let (id, name) = (row.id.clone(), row.name.clone());

        let Some(action) = kind.action() else {
            self.open_logs(&id, &name);
            return;
        };

        let trigger = self
            .triggers
            .entry((id.clone(), kind))
            .or_insert_with(|| TriggerButton::new(kind));
        if !LifecycleDispatcher::arm(trigger) {
            tracing::debug!("{} on {} already in flight", kind.label(), id);
            return;
        }

        let request = LifecycleRequest::new(id, action);
        let dispatcher = self.dispatcher.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = dispatcher.send(&request).await;
            let _ = tx.send(AppEvent::ActionFinished {
                request,
                button: kind,
                result,
            });
        });
    }

    fn open_logs(&mut self, id: &str, name: &str) {
        let session = self.log_viewer.begin_open(id, name);
        self.logs_scroll = 0;
        let backend = self.backend.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = backend.logs(&session.container_id).await;
            let _ = tx.send(AppEvent::LogsLoaded { session, result });
        });
    }

    pub fn selected_row(&self) -> Option<&RowView> {
        self.inventory.rows().get(self.selected)
    }

    /// Trigger state for a button, if it has been pressed since the last refresh
    pub fn trigger(&self, id: &str, kind: ButtonKind) -> Option<&TriggerButton> {
        self.triggers.get(&(id.to_string(), kind))
    }

    /// True while the log modal is waiting on the backend
    pub fn logs_loading(&self) -> bool {
        matches!(self.log_viewer.state(), LogViewState::Loading(_))
    }

    fn select_row(&mut self, index: usize) {
        if index != self.selected {
            self.selected_button = 0;
        }
        self.selected = index;
        self.containers_table_state.select(Some(index));
    }

    fn select_next(&mut self) {
        let len = self.inventory.rows().len();
        if len > 0 {
            self.select_row((self.selected + 1) % len);
        }
    }

    fn select_prev(&mut self) {
        let len = self.inventory.rows().len();
        if len > 0 {
            self.select_row(if self.selected == 0 { len - 1 } else { self.selected - 1 });
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.inventory.rows().len();
        if len == 0 {
            self.selected = 0;
            self.containers_table_state.select(None);
        } else {
            self.selected = self.selected.min(len - 1);
            self.containers_table_state.select(Some(self.selected));
        }
        let buttons = self.selected_row().map(|r| r.buttons.len()).unwrap_or(0);
        self.selected_button = self.selected_button.min(buttons.saturating_sub(1));
    }
}
