//! Page sessions and their store.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::history::{ChatHistory, ChatTurn, DEFAULT_HISTORY_CAPACITY};

/// Default session timeout (30 minutes).
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Default cap on live sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// One browser conversation on the server-rendered page.
///
/// Cloning is cheap; clones share the same history.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    id: String,
    history: RwLock<ChatHistory>,
    last_activity: RwLock<DateTime<Utc>>,
}

impl Session {
    fn new(id: String, capacity: usize) -> Self {
        let now = Utc::now();
        Self {
            inner: Arc::new(SessionInner {
                id,
                history: RwLock::new(ChatHistory::with_capacity(capacity)),
                last_activity: RwLock::new(now),
            }),
        }
    }

    /// Get the session ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Record a completed exchange.
    pub fn add_turn(&self, user: impl Into<String>, bot: impl Into<String>) -> ChatTurn {
        let turn = self.inner.history.write().unwrap().push(user, bot).clone();
        self.touch();
        turn
    }

    /// Turns in chronological order.
    #[must_use]
    pub fn turns(&self) -> Vec<ChatTurn> {
        self.inner.history.read().unwrap().turns().to_vec()
    }

    #[must_use]
    pub fn turn_count(&self) -> usize {
        self.inner.history.read().unwrap().len()
    }

    fn touch(&self) {
        let mut guard = self.inner.last_activity.write().unwrap();
        *guard = Utc::now();
    }

    /// Check if the session has been idle longer than `timeout`.
    #[must_use]
    pub fn is_expired_with_timeout(&self, timeout: Duration) -> bool {
        let last = self.last_activity();
        // A negative difference means clock skew; treat it as fresh.
        (Utc::now() - last)
            .to_std()
            .is_ok_and(|idle| idle > timeout)
    }

    fn last_activity(&self) -> DateTime<Utc> {
        *self.inner.last_activity.read().unwrap()
    }
}

/// Thread-safe store for sessions.
///
/// Holds at most `max_sessions` sessions; creating one more evicts the
/// session that has been idle the longest.
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<SessionStoreInner>,
}

#[derive(Debug)]
struct SessionStoreInner {
    sessions: RwLock<HashMap<String, Session>>,
    capacity: usize,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Create a new session store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_HISTORY_CAPACITY, DEFAULT_MAX_SESSIONS)
    }

    /// Store whose sessions keep at most `capacity` turns each.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_limits(capacity, DEFAULT_MAX_SESSIONS)
    }

    /// Store keeping `capacity` turns per session and at most `max_sessions` sessions.
    #[must_use]
    pub fn with_limits(capacity: usize, max_sessions: usize) -> Self {
        Self {
            inner: Arc::new(SessionStoreInner {
                sessions: RwLock::new(HashMap::new()),
                capacity,
                max_sessions: max_sessions.max(1),
            }),
        }
    }

    /// A fresh session ID. Nothing is stored until a session is created with it.
    #[must_use]
    pub fn new_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Whether `id` has the shape of an ID from [`Self::new_id`].
    #[must_use]
    pub fn is_valid_id(id: &str) -> bool {
        Uuid::parse_str(id).is_ok()
    }

    /// Create a new session and return it.
    #[must_use]
    pub fn create(&self) -> Session {
        self.insert(Self::new_id())
    }

    /// Get a session by ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Session> {
        self.inner.sessions.read().unwrap().get(id).cloned()
    }

    /// Existing session for `id`, or a new one.
    ///
    /// An unknown but well-formed `id` (one handed out with a rendered page)
    /// becomes the new session's ID; anything else gets a generated ID.
    #[must_use]
    pub fn get_or_create(&self, id: Option<&str>) -> Session {
        match id {
            Some(id) if Self::is_valid_id(id) => {
                self.get(id).unwrap_or_else(|| self.insert(id.to_string()))
            }
            _ => self.create(),
        }
    }

    /// Get the number of active sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.sessions.read().unwrap().len()
    }

    /// Check if there are no sessions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all expired sessions.
    ///
    /// Returns the number of sessions removed.
    pub fn cleanup_expired(&self) -> usize {
        self.cleanup_expired_with_timeout(DEFAULT_SESSION_TIMEOUT)
    }

    /// Remove sessions that have been inactive longer than the timeout.
    pub fn cleanup_expired_with_timeout(&self, timeout: Duration) -> usize {
        let mut guard = self.inner.sessions.write().unwrap();
        let before = guard.len();
        guard.retain(|_, session| !session.is_expired_with_timeout(timeout));
        before - guard.len()
    }

    fn insert(&self, id: String) -> Session {
        let mut guard = self.inner.sessions.write().unwrap();
        if let Some(existing) = guard.get(&id) {
            return existing.clone();
        }

        while guard.len() >= self.inner.max_sessions {
            let Some(oldest) = guard
                .iter()
                .min_by_key(|(_, session)| session.last_activity())
                .map(|(id, _)| id.clone())
            else {
                break;
            };
            guard.remove(&oldest);
            tracing::debug!(session_id = %oldest, "Evicted idle session");
        }

        let session = Session::new(id.clone(), self.inner.capacity);
        guard.insert(id, session.clone());
        session
    }
}
