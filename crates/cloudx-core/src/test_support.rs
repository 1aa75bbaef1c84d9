//! Test support utilities for cloudx-core
//!
//! Provides a scriptable backend, a notifier that records toasts, a surface
//! that records the order of display updates, and a fake clipboard, so the
//! container controls can be tested without a server or a terminal.

use crate::clipboard::Clipboard;
use crate::inventory::{FetchError, InventorySurface};
use crate::notify::{Notifier, Toast, ToastLevel};
use crate::row::{InventoryStats, RowView};
use crate::{CoreError, Result as CoreResult};
use async_trait::async_trait;
use cloudx_api::{ContainerBackend, ContainerRecord, LifecycleRequest, Result, Timestamp};
use std::sync::{Arc, Mutex};

/// Records which methods were called on the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    List,
    Action(LifecycleRequest),
    Logs(String),
}

/// Configurable mock backend
pub struct MockBackend {
    pub calls: Arc<Mutex<Vec<MockCall>>>,
    pub list_result: Arc<Mutex<Result<Vec<ContainerRecord>>>>,
    pub action_result: Arc<Mutex<Result<()>>>,
    pub logs_result: Arc<Mutex<Result<Option<String>>>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Empty inventory, every call succeeds
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            list_result: Arc::new(Mutex::new(Ok(Vec::new()))),
            action_result: Arc::new(Mutex::new(Ok(()))),
            logs_result: Arc::new(Mutex::new(Ok(None))),
        }
    }

    pub fn with_containers(containers: Vec<ContainerRecord>) -> Self {
        let backend = Self::new();
        backend.set_list_result(Ok(containers));
        backend
    }

    pub fn set_list_result(&self, result: Result<Vec<ContainerRecord>>) {
        *self.list_result.lock().unwrap() = result;
    }

    pub fn set_action_result(&self, result: Result<()>) {
        *self.action_result.lock().unwrap() = result;
    }

    pub fn set_logs_result(&self, result: Result<Option<String>>) {
        *self.logs_result.lock().unwrap() = result;
    }

    fn record(&self, call: MockCall) {
        self.calls.lock().unwrap().push(call);
    }

    /// Get all recorded calls
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of inventory requests made so far
    pub fn list_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, MockCall::List))
            .count()
    }
}

#[async_trait]
impl ContainerBackend for MockBackend {
    async fn list(&self) -> Result<Vec<ContainerRecord>> {
        self.record(MockCall::List);
        self.list_result.lock().unwrap().clone()
    }

    async fn action(&self, request: &LifecycleRequest) -> Result<()> {
        self.record(MockCall::Action(request.clone()));
        self.action_result.lock().unwrap().clone()
    }

    async fn logs(&self, container_id: &str) -> Result<Option<String>> {
        self.record(MockCall::Logs(container_id.to_string()));
        self.logs_result.lock().unwrap().clone()
    }

    fn endpoint(&self) -> String {
        "mock://backend".to_string()
    }
}

/// Build a record created one hour before now
pub fn record(id: &str, name: &str, status: &str) -> ContainerRecord {
    let created = chrono::Utc::now() - chrono::Duration::hours(1);
    ContainerRecord {
        id: id.to_string(),
        name: name.to_string(),
        status: status.to_string(),
        image: format!("{}:latest", name),
        created: Some(Timestamp::Text(created.to_rfc3339())),
    }
}

/// Notifier that keeps every toast
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingNotifier {
    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.toasts().into_iter().map(|t| t.message).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, level: ToastLevel) {
        self.toasts.lock().unwrap().push(Toast::new(message, level));
    }
}

/// One display update seen by [`RecordingSurface`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    Loading,
    Stats(InventoryStats),
    Empty(Option<String>),
    /// Row ids, in order
    Table(Vec<String>),
}

/// Surface that records the order of display updates
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub calls: Vec<SurfaceCall>,
    pub rows: Vec<RowView>,
}

impl InventorySurface for RecordingSurface {
    fn show_loading(&mut self) {
        self.calls.push(SurfaceCall::Loading);
    }

    fn update_stats(&mut self, stats: InventoryStats) {
        self.calls.push(SurfaceCall::Stats(stats));
    }

    fn show_empty(&mut self, error: Option<&FetchError>) {
        self.calls
            .push(SurfaceCall::Empty(error.map(|e| e.to_string())));
    }

    fn show_table(&mut self, rows: Vec<RowView>) {
        self.calls
            .push(SurfaceCall::Table(rows.iter().map(|r| r.id.clone()).collect()));
        self.rows = rows;
    }
}

/// Clipboard that stores the copied text, or fails on demand
#[derive(Debug, Default)]
pub struct MockClipboard {
    pub contents: Mutex<Option<String>>,
    pub fail: bool,
}

impl MockClipboard {
    pub fn failing() -> Self {
        Self {
            contents: Mutex::new(None),
            fail: true,
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().unwrap().clone()
    }
}

impl Clipboard for MockClipboard {
    fn copy(&self, text: &str) -> CoreResult<()> {
        if self.fail {
            return Err(CoreError::Clipboard("no clipboard available".to_string()));
        }
        *self.contents.lock().unwrap() = Some(text.to_string());
        Ok(())
    }
}
