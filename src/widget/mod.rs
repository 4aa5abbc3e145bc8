//! The chat widget core.
//!
//! The widget is front-end agnostic: [`ChatController`] owns the behaviour
//! (validation, the in-flight guard, fallback on failure, history) and talks
//! to a [`ChatView`] for everything visible. The terminal front-end and the
//! tests provide views.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mindbridge::client::MindBridgeClient;
//! use mindbridge::history::MemoryHistoryStore;
//! use mindbridge::widget::{ChatController, RecordingView};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = MindBridgeClient::new("http://127.0.0.1:5000")?;
//! let controller = ChatController::new(
//!     client,
//!     RecordingView::new(),
//!     Arc::new(MemoryHistoryStore::new()),
//! );
//!
//! controller.load_history();
//! controller.send_message("I'm feeling stressed").await;
//! # Ok(())
//! # }
//! ```

mod controller;
pub mod format;
mod view;

pub use controller::{
    CONNECTION_LOST, CONNECTION_RESTORED, ChatBackend, ChatController, FALLBACK_MESSAGE,
    QUICK_PROMPTS, SendOutcome, WELCOME_MESSAGE,
};
pub use view::{ChatView, RecordingView, Sender, ToastKind, ViewEvent};
