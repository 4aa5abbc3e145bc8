//! The chat controller: input validation, the single in-flight guard,
//! rendering of turns and history persistence.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Local;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::format::display_time;
use super::view::{ChatView, Sender, ToastKind};
use crate::client::{ClientError, MindBridgeClient};
use crate::history::{ChatHistory, ChatTurn, HISTORY_KEY, HistoryStore};

/// Shown in place of a reply whenever the request fails for any reason.
pub const FALLBACK_MESSAGE: &str = "Sorry, I'm having trouble connecting. Please try again. 😊";

/// First message of every fresh conversation.
pub const WELCOME_MESSAGE: &str =
    "Hey there! 👋 I'm MindBridge, your mental health friend. How are you feeling today?";

pub const CONNECTION_RESTORED: &str = "Connection restored! 🌐";
pub const CONNECTION_LOST: &str = "Connection lost. Working offline.";

/// Predefined messages offered as one-click prompts.
pub const QUICK_PROMPTS: &[&str] = &[
    "I'm feeling anxious",
    "I'm feeling sad today",
    "I'm so stressed out",
    "I feel lonely",
    "I'm really tired",
    "I need help",
];

/// Where chat replies come from.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Produce a reply for `message`, giving up when `cancel` fires.
    async fn get_ai_response(
        &self,
        message: &str,
        cancel: &CancellationToken,
    ) -> Result<String, ClientError>;
}

#[async_trait]
impl ChatBackend for MindBridgeClient {
    async fn get_ai_response(
        &self,
        message: &str,
        cancel: &CancellationToken,
    ) -> Result<String, ClientError> {
        self.chat_with_cancel(message, cancel).await
    }
}

#[async_trait]
impl<T: ChatBackend + ?Sized> ChatBackend for Arc<T> {
    async fn get_ai_response(
        &self,
        message: &str,
        cancel: &CancellationToken,
    ) -> Result<String, ClientError> {
        (**self).get_ai_response(message, cancel).await
    }
}

/// What happened to a call to [`ChatController::send_message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Input was empty or whitespace; nothing was sent.
    Empty,
    /// Another request was still outstanding; nothing was sent.
    Busy,
    /// The companion answered and the turn was recorded.
    Replied(ChatTurn),
    /// The request failed and the fallback message was shown.
    Failed(String),
}

/// Drives a [`ChatView`] from user input and backend replies.
///
/// All methods take `&self`; at most one request is in flight at a time.
pub struct ChatController<B, V> {
    backend: B,
    view: Mutex<V>,
    history: Mutex<ChatHistory>,
    store: Arc<dyn HistoryStore>,
    processing: AtomicBool,
    online: AtomicBool,
    pending: Mutex<Option<CancellationToken>>,
}

impl<B, V> fmt::Debug for ChatController<B, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatController")
            .field("processing", &self.processing.load(Ordering::Relaxed))
            .field("online", &self.online.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// Holds the processing flag for one request. Dropping it re-enables input.
struct InFlight<'a, B, V: ChatView> {
    controller: &'a ChatController<B, V>,
}

impl<'a, B, V: ChatView> InFlight<'a, B, V> {
    fn acquire(controller: &'a ChatController<B, V>) -> Option<Self> {
        controller
            .processing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { controller })
    }
}

impl<B, V: ChatView> Drop for InFlight<'_, B, V> {
    fn drop(&mut self) {
        self.controller.processing.store(false, Ordering::Release);
        self.controller.view().set_input_enabled(true);
    }
}

/// Publishes the cancellation token of the request being awaited.
/// Dropping it withdraws the token, even if the request future is dropped.
struct Pending<'a, B, V> {
    controller: &'a ChatController<B, V>,
}

impl<'a, B, V> Pending<'a, B, V> {
    fn publish(controller: &'a ChatController<B, V>, token: CancellationToken) -> Self {
        *controller.pending() = Some(token);
        Self { controller }
    }
}

impl<B, V> Drop for Pending<'_, B, V> {
    fn drop(&mut self) {
        self.controller.pending().take();
    }
}

impl<B: ChatBackend, V: ChatView> ChatController<B, V> {
    /// Create a controller persisting under [`HISTORY_KEY`].
    pub fn new(backend: B, view: V, store: Arc<dyn HistoryStore>) -> Self {
        Self {
            backend,
            view: Mutex::new(view),
            history: Mutex::new(ChatHistory::new()),
            store,
            processing: AtomicBool::new(false),
            online: AtomicBool::new(true),
            pending: Mutex::new(None),
        }
    }

    /// Keep at most `capacity` turns.
    #[must_use]
    pub fn with_history_capacity(self, capacity: usize) -> Self {
        *self.history() = ChatHistory::with_capacity(capacity);
        self
    }

    /// Send what the user typed.
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        if self.is_processing() {
            debug!("Send ignored, a request is already in flight");
            return SendOutcome::Busy;
        }

        let message = text.trim();
        if message.is_empty() {
            return SendOutcome::Empty;
        }

        let Some(_in_flight) = InFlight::acquire(self) else {
            return SendOutcome::Busy;
        };

        {
            let mut view = self.view();
            view.set_input_enabled(false);
            view.add_message(Sender::User, message, &now());
            view.clear_input();
            view.show_typing_indicator();
        }

        match self.get_ai_response(message).await {
            Ok(response) => {
                {
                    let mut view = self.view();
                    view.hide_typing_indicator();
                    view.add_message(Sender::Bot, &response, &now());
                }
                SendOutcome::Replied(self.save_to_history(message, &response))
            }
            Err(e) => {
                {
                    let mut view = self.view();
                    view.hide_typing_indicator();
                    view.show_error(FALLBACK_MESSAGE);
                }
                error!(error = %e, timeout = e.is_timeout(), "Chat error");
                SendOutcome::Failed(e.to_string())
            }
        }
    }

    /// Ask the backend for a reply. The request can be aborted with [`Self::cancel_pending`].
    pub async fn get_ai_response(&self, message: &str) -> Result<String, ClientError> {
        let cancel = CancellationToken::new();
        let _pending = Pending::publish(self, cancel.clone());
        self.backend.get_ai_response(message, &cancel).await
    }

    /// Send the quick prompt at `index`. `None` when there is no such prompt.
    pub async fn quick_message(&self, index: usize) -> Option<SendOutcome> {
        let prompt = QUICK_PROMPTS.get(index)?;
        Some(self.send_message(prompt).await)
    }

    /// Abort the outstanding request, if any.
    pub fn cancel_pending(&self) -> bool {
        match self.pending().as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    /// Read persisted turns. A missing or unreadable value leaves the history empty.
    pub fn load_history(&self) -> usize {
        match self.store.load(HISTORY_KEY) {
            Ok(Some(turns)) => {
                let mut history = self.history();
                *history = ChatHistory::from_turns(turns, history.capacity());
                info!(turns = history.len(), "Chat history loaded");
                history.len()
            }
            Ok(None) => 0,
            Err(e) => {
                warn!(error = %e, "Could not load chat history");
                0
            }
        }
    }

    /// Record a completed exchange and mirror the history to the store.
    pub fn save_to_history(&self, user: &str, bot: &str) -> ChatTurn {
        let (turn, snapshot) = {
            let mut history = self.history();
            let turn = history.push(user, bot).clone();
            (turn, history.turns().to_vec())
        };

        if let Err(e) = self.store.save(HISTORY_KEY, &snapshot) {
            warn!(error = %e, "Could not persist chat history");
        }
        turn
    }

    /// Snapshot of the recorded turns.
    pub fn history_turns(&self) -> Vec<ChatTurn> {
        self.history().turns().to_vec()
    }

    /// Drop every recorded turn, in memory and in the store.
    pub fn forget_history(&self) {
        self.history().clear();
        match self.store.remove(HISTORY_KEY) {
            Ok(()) => info!("Chat history forgotten"),
            Err(e) => warn!(error = %e, "Could not remove stored chat history"),
        }
    }

    /// Reset the view to the welcome message. History is kept.
    pub fn clear_chat(&self) {
        self.view().reset(WELCOME_MESSAGE);
    }

    /// Report connectivity. Only transitions produce a toast.
    pub fn set_online(&self, online: bool) {
        let was_online = self.online.swap(online, Ordering::AcqRel);
        if was_online == online {
            return;
        }
        let mut view = self.view();
        if online {
            info!("Connectivity restored");
            view.show_toast(CONNECTION_RESTORED, ToastKind::Success);
        } else {
            warn!("Connectivity lost");
            view.show_toast(CONNECTION_LOST, ToastKind::Warning);
        }
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }

    /// Run `f` against the view.
    pub fn with_view<R>(&self, f: impl FnOnce(&mut V) -> R) -> R {
        f(&mut self.view())
    }
}

impl<B, V> ChatController<B, V> {
    fn view(&self) -> MutexGuard<'_, V> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn history(&self) -> MutexGuard<'_, ChatHistory> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn pending(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn now() -> String {
    display_time(&Local::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryHistoryStore;
    use crate::widget::view::{RecordingView, ViewEvent};
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Answers every message with a fixed reply, counting calls.
    #[derive(Default)]
    struct EchoBackend {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ChatBackend for EchoBackend {
        async fn get_ai_response(
            &self,
            message: &str,
            _cancel: &CancellationToken,
        ) -> Result<String, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("echo: {message}"))
        }
    }

    struct FailingBackend(fn() -> ClientError);

    #[async_trait]
    impl ChatBackend for FailingBackend {
        async fn get_ai_response(
            &self,
            _message: &str,
            _cancel: &CancellationToken,
        ) -> Result<String, ClientError> {
            Err((self.0)())
        }
    }

    /// Blocks until released or cancelled.
    #[derive(Default)]
    struct GatedBackend {
        release: Notify,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ChatBackend for GatedBackend {
        async fn get_ai_response(
            &self,
            _message: &str,
            cancel: &CancellationToken,
        ) -> Result<String, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::select! {
                () = self.release.notified() => Ok("done".to_string()),
                () = cancel.cancelled() => Err(ClientError::Cancelled),
            }
        }
    }

    fn controller<B: ChatBackend>(
        backend: B,
    ) -> (ChatController<B, RecordingView>, Arc<MemoryHistoryStore>) {
        let store = Arc::new(MemoryHistoryStore::new());
        let controller = ChatController::new(backend, RecordingView::new(), store.clone());
        (controller, store)
    }

    #[tokio::test]
    async fn test_whitespace_never_sends() {
        let (controller, store) = controller(EchoBackend::default());

        assert_eq!(controller.send_message("").await, SendOutcome::Empty);
        assert_eq!(controller.send_message("   \n\t").await, SendOutcome::Empty);

        assert_eq!(controller.backend.calls.load(Ordering::SeqCst), 0);
        assert!(controller.with_view(|v| v.events().is_empty()));
        assert!(store.raw(HISTORY_KEY).is_none());
    }

    #[tokio::test]
    async fn test_successful_send_renders_and_persists() {
        let (controller, store) = controller(EchoBackend::default());

        let outcome = controller.send_message("  hello  ").await;
        let SendOutcome::Replied(turn) = outcome else {
            panic!("expected reply, got {outcome:?}");
        };
        assert_eq!(turn.user, "hello");
        assert_eq!(turn.bot, "echo: hello");

        let events = controller.with_view(|v| v.events().to_vec());
        assert_eq!(
            events,
            vec![
                ViewEvent::InputEnabled(false),
                ViewEvent::Message {
                    sender: Sender::User,
                    content: "hello".into()
                },
                ViewEvent::InputCleared,
                ViewEvent::TypingShown,
                ViewEvent::TypingHidden,
                ViewEvent::Message {
                    sender: Sender::Bot,
                    content: "echo: hello".into()
                },
                ViewEvent::InputEnabled(true),
            ]
        );

        let persisted = store.load(HISTORY_KEY).unwrap().unwrap();
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].user, "hello");
    }

    #[tokio::test]
    async fn test_failure_shows_fallback_and_reenables_input() {
        let (controller, store) = controller(FailingBackend(|| ClientError::Api {
            status: 500,
            message: "boom".into(),
        }));

        let outcome = controller.send_message("hi").await;
        assert!(matches!(outcome, SendOutcome::Failed(_)));

        controller.with_view(|v| {
            assert_eq!(v.errors(), vec![FALLBACK_MESSAGE.to_string()]);
            assert!(!v.is_typing());
            assert!(v.input_enabled());
        });
        assert!(!controller.is_processing());
        assert!(store.raw(HISTORY_KEY).is_none());
        assert!(controller.history_turns().is_empty());
    }

    #[tokio::test]
    async fn test_timeout_takes_fallback_path() {
        let (controller, _store) =
            controller(FailingBackend(|| ClientError::Timeout(Duration::from_secs(10))));

        let outcome = controller.send_message("hi").await;
        assert_eq!(
            outcome,
            SendOutcome::Failed("Request timeout after 10s".to_string())
        );
        controller.with_view(|v| assert_eq!(v.errors().len(), 1));
    }

    #[tokio::test]
    async fn test_second_send_while_in_flight_is_ignored() {
        let (controller, _store) = controller(GatedBackend::default());

        let first = controller.send_message("first");
        let second = async {
            while !controller.is_processing() {
                tokio::task::yield_now().await;
            }
            let outcome = controller.send_message("second").await;
            controller.backend.release.notify_one();
            outcome
        };

        let (first, second) = tokio::join!(first, second);

        assert!(matches!(first, SendOutcome::Replied(_)));
        assert_eq!(second, SendOutcome::Busy);
        assert_eq!(controller.backend.calls.load(Ordering::SeqCst), 1);
        assert!(!controller.is_processing());
    }

    #[tokio::test]
    async fn test_cancel_pending_aborts_request() {
        let (controller, _store) = controller(GatedBackend::default());

        let send = controller.send_message("hello");
        let cancel = async {
            while !controller.cancel_pending() {
                tokio::task::yield_now().await;
            }
        };

        let (outcome, ()) = tokio::join!(send, cancel);
        assert_eq!(outcome, SendOutcome::Failed("Request cancelled".into()));
        assert!(!controller.cancel_pending());
        controller.with_view(|v| assert!(v.input_enabled()));
    }

    #[tokio::test]
    async fn test_abandoned_send_withdraws_cancel_token() {
        let (controller, _store) = controller(GatedBackend::default());

        let abandoned =
            tokio::time::timeout(Duration::from_millis(20), controller.send_message("hello")).await;
        assert!(abandoned.is_err());
        assert_eq!(controller.backend.calls.load(Ordering::SeqCst), 1);

        assert!(!controller.cancel_pending());
        assert!(!controller.is_processing());
        controller.with_view(|v| assert!(v.input_enabled()));
    }

    #[tokio::test]
    async fn test_history_capped_at_capacity() {
        let (controller, store) = controller(EchoBackend::default());
        let controller = controller.with_history_capacity(3);

        for i in 0..5 {
            controller.send_message(&format!("m{i}")).await;
        }

        let users: Vec<_> = controller
            .history_turns()
            .into_iter()
            .map(|t| t.user)
            .collect();
        assert_eq!(users, vec!["m2", "m3", "m4"]);
        assert_eq!(store.load(HISTORY_KEY).unwrap().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_forget_history_clears_memory_and_store() {
        let (controller, store) = controller(EchoBackend::default());
        controller.send_message("remember me").await;
        assert!(store.raw(HISTORY_KEY).is_some());

        controller.forget_history();
        assert!(controller.history_turns().is_empty());
        assert!(store.raw(HISTORY_KEY).is_none());
        assert_eq!(controller.load_history(), 0);

        // Forgetting twice is harmless.
        controller.forget_history();
    }

    #[test]
    fn test_load_history_tolerates_corrupt_value() {
        let (controller, store) = controller(EchoBackend::default());
        store.set_raw(HISTORY_KEY, "{{{");

        assert_eq!(controller.load_history(), 0);
        assert!(controller.history_turns().is_empty());
    }

    #[test]
    fn test_load_history_restores_turns() {
        let (controller, store) = controller(EchoBackend::default());
        let turns: Vec<_> = (0..120).map(|i| ChatTurn::new(format!("u{i}"), "b")).collect();
        store.save(HISTORY_KEY, &turns).unwrap();

        assert_eq!(controller.load_history(), 100);
        assert_eq!(controller.history_turns()[0].user, "u20");
    }

    #[test]
    fn test_connectivity_toasts_on_transitions_only() {
        let (controller, _store) = controller(EchoBackend::default());

        controller.set_online(true);
        controller.set_online(false);
        controller.set_online(false);
        controller.set_online(true);

        let toasts = controller.with_view(|v| v.toasts());
        assert_eq!(
            toasts,
            vec![
                (CONNECTION_LOST.to_string(), ToastKind::Warning),
                (CONNECTION_RESTORED.to_string(), ToastKind::Success),
            ]
        );
    }

    #[tokio::test]
    async fn test_quick_message() {
        let (controller, _store) = controller(EchoBackend::default());

        assert!(controller.quick_message(QUICK_PROMPTS.len()).await.is_none());
        let outcome = controller.quick_message(0).await.unwrap();
        assert!(matches!(outcome, SendOutcome::Replied(t) if t.user == QUICK_PROMPTS[0]));
    }

    #[test]
    fn test_clear_chat_resets_to_welcome() {
        let (controller, _store) = controller(EchoBackend::default());
        controller.clear_chat();
        controller.with_view(|v| {
            assert_eq!(v.events(), &[ViewEvent::Reset(WELCOME_MESSAGE.into())]);
        });
    }
}
