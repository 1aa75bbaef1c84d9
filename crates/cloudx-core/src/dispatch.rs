//! Lifecycle command dispatch
//!
//! A dispatch disables its trigger before the request goes out, reports the
//! outcome, and on success schedules an inventory refresh. Inventory is never
//! patched locally; the refresh is the only source of post-action truth.

use crate::notify::{Notifier, ToastLevel};
use crate::row::ButtonKind;
use cloudx_api::{ApiError, ContainerBackend, LifecycleRequest};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Icon shown while a trigger's request is in flight
pub const BUSY_ICON: &str = "fa-spinner fa-spin";

/// What a button displays
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonContent {
    pub label: String,
    pub icon: String,
}

impl ButtonContent {
    fn busy() -> Self {
        Self {
            label: String::new(),
            icon: BUSY_ICON.to_string(),
        }
    }
}

/// The button that triggered a dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerButton {
    kind: ButtonKind,
    content: ButtonContent,
    enabled: bool,
    saved: Option<ButtonContent>,
}

impl TriggerButton {
    pub fn new(kind: ButtonKind) -> Self {
        Self {
            kind,
            content: ButtonContent {
                label: kind.label().to_string(),
                icon: kind.icon().to_string(),
            },
            enabled: true,
            saved: None,
        }
    }

    pub fn kind(&self) -> ButtonKind {
        self.kind
    }

    pub fn content(&self) -> &ButtonContent {
        &self.content
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_busy(&self) -> bool {
        self.saved.is_some()
    }

    /// Disable and swap in the busy indicator. False if already disabled.
    fn begin_busy(&mut self) -> bool {
        if !self.enabled {
            return false;
        }
        self.enabled = false;
        self.saved = Some(std::mem::replace(&mut self.content, ButtonContent::busy()));
        true
    }

    /// Back to the enabled state with the original content
    fn restore(&mut self) {
        if let Some(original) = self.saved.take() {
            self.content = original;
        }
        self.enabled = true;
    }
}

/// Emitted once per successful dispatch, after the settle delay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshRequest {
    pub after: LifecycleRequest,
}

/// Delivers delayed refresh requests to whoever owns the inventory view
#[derive(Debug, Clone)]
pub struct RefreshScheduler {
    tx: mpsc::UnboundedSender<RefreshRequest>,
    delay: Duration,
}

impl RefreshScheduler {
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<RefreshRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, delay }, rx)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Send a refresh request after the delay. Must be called inside a tokio runtime.
    pub fn schedule(&self, after: LifecycleRequest) {
        let tx = self.tx.clone();
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(RefreshRequest { after });
        });
    }
}

/// Result of one dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Succeeded,
    Failed(ApiError),
    /// The trigger was already disabled; nothing was sent
    Ignored,
}

/// Sends lifecycle actions to the backend
#[derive(Clone)]
pub struct LifecycleDispatcher {
    backend: Arc<dyn ContainerBackend>,
    notifier: Arc<dyn Notifier>,
    refresh: RefreshScheduler,
}

impl LifecycleDispatcher {
    pub fn new(
        backend: Arc<dyn ContainerBackend>,
        notifier: Arc<dyn Notifier>,
        refresh: RefreshScheduler,
    ) -> Self {
        Self {
            backend,
            notifier,
            refresh,
        }
    }

    /// Run a whole dispatch: arm the trigger, send, settle
    pub async fn dispatch(
        &self,
        request: LifecycleRequest,
        trigger: &mut TriggerButton,
    ) -> DispatchOutcome {
        if !Self::arm(trigger) {
            tracing::debug!(
                "Ignoring {} on {}: trigger busy",
                request.action,
                request.container_id
            );
            return DispatchOutcome::Ignored;
        }
        let result = self.send(&request).await;
        self.settle(&request, result, trigger)
    }

    /// Disable the trigger and show the busy indicator. Must happen before [`send`].
    ///
    /// [`send`]: Self::send
    pub fn arm(trigger: &mut TriggerButton) -> bool {
        trigger.begin_busy()
    }

    /// The network half of a dispatch
    pub async fn send(&self, request: &LifecycleRequest) -> Result<(), ApiError> {
        tracing::info!(
            "Sending {} to container {}",
            request.action,
            request.container_id
        );
        self.backend.action(request).await
    }

    /// Report the outcome. Success schedules a refresh and leaves the trigger
    /// disabled until the refreshed rows replace it; failure restores it.
    pub fn settle(
        &self,
        request: &LifecycleRequest,
        result: Result<(), ApiError>,
        trigger: &mut TriggerButton,
    ) -> DispatchOutcome {
        match result {
            Ok(()) => {
                self.notifier.notify(
                    &format!("Container {} successfully", request.action.past_tense()),
                    ToastLevel::Success,
                );
                self.refresh.schedule(request.clone());
                DispatchOutcome::Succeeded
            }
            Err(e) => {
                tracing::warn!(
                    "Error performing {} on {}: {}",
                    request.action,
                    request.container_id,
                    e
                );
                self.notifier.notify(
                    &format!("Failed to {} container: {}", request.action, e),
                    ToastLevel::Error,
                );
                trigger.restore();
                DispatchOutcome::Failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockBackend, MockCall, RecordingNotifier};
    use cloudx_api::LifecycleAction;

    fn setup(
        backend: &Arc<MockBackend>,
    ) -> (
        LifecycleDispatcher,
        Arc<RecordingNotifier>,
        mpsc::UnboundedReceiver<RefreshRequest>,
    ) {
        let notifier = Arc::new(RecordingNotifier::default());
        let (scheduler, rx) = RefreshScheduler::new(Duration::from_millis(10));
        let dispatcher = LifecycleDispatcher::new(backend.clone(), notifier.clone(), scheduler);
        (dispatcher, notifier, rx)
    }

    #[test]
    fn test_arm_disables_before_send() {
        let mut trigger = TriggerButton::new(ButtonKind::Stop);
        assert!(LifecycleDispatcher::arm(&mut trigger));
        assert!(!trigger.is_enabled());
        assert!(trigger.is_busy());
        assert_eq!(trigger.content().icon, BUSY_ICON);

        // Second press while busy is refused
        assert!(!LifecycleDispatcher::arm(&mut trigger));
    }

    #[tokio::test]
    async fn test_success_notifies_and_schedules_refresh() {
        let backend = Arc::new(MockBackend::new());
        let (dispatcher, notifier, mut rx) = setup(&backend);
        let mut trigger = TriggerButton::new(ButtonKind::Stop);
        let request = LifecycleRequest::new("abc", LifecycleAction::Stop);

        let outcome = dispatcher.dispatch(request.clone(), &mut trigger).await;

        assert_eq!(outcome, DispatchOutcome::Succeeded);
        assert_eq!(
            notifier.toasts()[0].message,
            "Container stopped successfully"
        );
        assert_eq!(notifier.toasts()[0].level, ToastLevel::Success);
        assert!(!trigger.is_enabled(), "trigger stays busy until the rows refresh");
        assert_eq!(backend.get_calls(), vec![MockCall::Action(request.clone())]);

        let refresh = rx.recv().await.unwrap();
        assert_eq!(refresh.after, request);
    }

    #[tokio::test]
    async fn test_failure_restores_trigger() {
        let backend = Arc::new(MockBackend::new());
        backend.set_action_result(Err(ApiError::Backend("X".to_string())));
        let (dispatcher, notifier, mut rx) = setup(&backend);
        let mut trigger = TriggerButton::new(ButtonKind::Restart);
        let original = trigger.clone();

        let outcome = dispatcher
            .dispatch(
                LifecycleRequest::new("abc", LifecycleAction::Restart),
                &mut trigger,
            )
            .await;

        assert_eq!(outcome, DispatchOutcome::Failed(ApiError::Backend("X".to_string())));
        assert_eq!(trigger, original);
        assert!(trigger.is_enabled());

        let toasts = notifier.toasts();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].level, ToastLevel::Error);
        assert_eq!(toasts[0].message, "Failed to restart container: X");

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err(), "no refresh after a failure");
    }

    #[tokio::test]
    async fn test_transport_failure_restores_trigger() {
        let backend = Arc::new(MockBackend::new());
        backend.set_action_result(Err(ApiError::Transport("connection refused".to_string())));
        let (dispatcher, notifier, _rx) = setup(&backend);
        let mut trigger = TriggerButton::new(ButtonKind::Delete);

        dispatcher
            .dispatch(
                LifecycleRequest::new("abc", LifecycleAction::Delete),
                &mut trigger,
            )
            .await;

        assert!(trigger.is_enabled());
        assert_eq!(trigger.content().label, "Delete");
        assert!(notifier.messages()[0].contains("connection refused"));
    }

    #[tokio::test]
    async fn test_busy_trigger_is_ignored() {
        let backend = Arc::new(MockBackend::new());
        let (dispatcher, notifier, _rx) = setup(&backend);
        let mut trigger = TriggerButton::new(ButtonKind::Stop);
        LifecycleDispatcher::arm(&mut trigger);

        let outcome = dispatcher
            .dispatch(LifecycleRequest::new("abc", LifecycleAction::Stop), &mut trigger)
            .await;

        assert_eq!(outcome, DispatchOutcome::Ignored);
        assert!(backend.get_calls().is_empty());
        assert!(notifier.toasts().is_empty());
    }
}
