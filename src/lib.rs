//! MindBridge: a mental health companion chat.
//!
//! A supportive, keyword-driven companion reachable three ways: a JSON API,
//! a server-rendered web page, and an interactive terminal chat.
//!
//! # Architecture
//!
//! - **Server**: Axum HTTP server exposing `/api/chat`, `/api/health` and the chat page
//! - **Companion**: Crisis-first keyword classification and canned replies
//! - **Widget**: Front-end agnostic chat controller with bounded local history
//! - **Terminal**: Console front-end driving the controller against a remote API
//!
//! # Modules
//!
//! - [`client`]: HTTP client for the companion API
//! - [`companion`]: Reply selection
//! - [`history`]: Chat turns, bounded history and persistence
//! - [`session`]: Per-visitor conversations for the web page
//! - [`widget`]: Chat controller, view trait and message formatting

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod client;
pub mod companion;
pub mod config;
pub mod error;
pub mod history;
pub mod server;
pub mod session;
pub mod telemetry;
pub mod terminal;
pub mod types;
pub mod ui;
pub mod widget;

use std::sync::Arc;

use crate::companion::Companion;
use crate::config::AppConfig;
use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::session::SessionStore;

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Reply selection shared by the API and the page.
    pub companion: Arc<Companion>,
    /// Session store for page conversations.
    pub sessions: SessionStore,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, companion: Companion) -> Self {
        Self {
            companion: Arc::new(companion),
            sessions: SessionStore::with_limits(
                DEFAULT_HISTORY_CAPACITY,
                config.server.max_sessions,
            ),
            config,
        }
    }
}
