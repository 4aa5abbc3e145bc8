//! Chat turn history.
//!
//! The widget keeps an ordered, capped list of completed chat turns and
//! mirrors it to a persistent key-value store after every successful reply.
//!
//! # Architecture
//!
//! - [`ChatTurn`]: one user message paired with the bot reply
//! - [`ChatHistory`]: ordered turns, oldest evicted first past the capacity
//! - [`HistoryStore`]: persistence seam (file-backed or in-memory)
//!
//! # Example
//!
//! ```rust
//! use mindbridge::history::ChatHistory;
//!
//! let mut history = ChatHistory::with_capacity(2);
//! history.push("one", "a");
//! history.push("two", "b");
//! history.push("three", "c");
//!
//! assert_eq!(history.len(), 2);
//! assert_eq!(history.turns()[0].user, "two");
//! ```

mod store;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub use store::{FileHistoryStore, HistoryError, HistoryStore, MemoryHistoryStore};

/// Storage key the widget persists its history under.
pub const HISTORY_KEY: &str = "mindbridge_chat_history";

/// Number of turns kept by default.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// A single completed exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// What the user sent.
    pub user: String,
    /// What the companion answered.
    pub bot: String,
    /// RFC 3339 UTC time the turn completed.
    pub timestamp: String,
}

impl ChatTurn {
    /// Create a turn stamped with the current time.
    pub fn new(user: impl Into<String>, bot: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            bot: bot.into(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Ordered chat turns with a hard length cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatHistory {
    turns: Vec<ChatTurn>,
    capacity: usize,
}

impl Default for ChatHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatHistory {
    /// Empty history with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// Empty history holding at most `capacity` turns (minimum 1).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            turns: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Rebuild a history from persisted turns, keeping only the newest ones.
    #[must_use]
    pub fn from_turns(turns: Vec<ChatTurn>, capacity: usize) -> Self {
        let mut history = Self::with_capacity(capacity);
        history.turns = turns;
        history.evict();
        history
    }

    /// Record a completed exchange.
    pub fn push(&mut self, user: impl Into<String>, bot: impl Into<String>) -> &ChatTurn {
        self.push_turn(ChatTurn::new(user, bot))
    }

    /// Record an already stamped turn.
    pub fn push_turn(&mut self, turn: ChatTurn) -> &ChatTurn {
        self.turns.push(turn);
        self.evict();
        &self.turns[self.turns.len() - 1]
    }

    fn evict(&mut self) {
        if self.turns.len() > self.capacity {
            let excess = self.turns.len() - self.capacity;
            self.turns.drain(..excess);
        }
    }

    /// Turns in chronological order.
    #[must_use]
    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent turn, if any.
    #[must_use]
    pub fn last(&self) -> Option<&ChatTurn> {
        self.turns.last()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}
