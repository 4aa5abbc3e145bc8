//! Session management for the server-rendered chat page.
//!
//! The page carries its session ID in a hidden form field; the server keeps
//! each session's capped history in memory so the transcript can be
//! re-rendered on every post. A session is only stored once its first
//! message arrives.
//!
//! # Architecture
//!
//! - [`Session`]: One browser conversation
//! - [`SessionStore`]: Thread-safe store for all active sessions
//!
//! # Example
//!
//! ```rust
//! use mindbridge::session::SessionStore;
//!
//! let store = SessionStore::new();
//! let session = store.create();
//! session.add_turn("Hello!", "Hi, I'm listening.");
//!
//! assert_eq!(session.turn_count(), 1);
//! ```

mod thread;

pub use thread::{DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_TIMEOUT, Session, SessionStore};
