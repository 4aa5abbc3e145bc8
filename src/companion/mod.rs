//! The companion that answers chat messages on the server side.
//!
//! Replies are chosen from canned pools by keyword. Crisis phrases are
//! checked before anything else so they can never be shadowed by an
//! emotion keyword in the same message.
//!
//! ```rust
//! use mindbridge::companion::{Companion, ResponseKind};
//!
//! let companion = Companion::new();
//! assert_eq!(companion.classify("I am so tired"), ResponseKind::Category("tired"));
//! assert_eq!(companion.classify("I want to die, I'm sad"), ResponseKind::Crisis);
//! ```

pub mod responses;

use std::fmt;

use rand::Rng;

use responses::{CATEGORIES, CRISIS_PHRASES, CRISIS_RESPONSES, DEFAULT_RESPONSES};

/// Which pool a message is answered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Crisis,
    Category(&'static str),
    Default,
}

/// Chooses one reply out of a pool.
pub trait ResponsePicker: Send + Sync {
    /// Index in `0..len`. `len` is never zero.
    fn pick(&self, len: usize) -> usize;
}

/// Uniformly random choice.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPicker;

impl ResponsePicker for RandomPicker {
    fn pick(&self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

/// Always the same index (clamped to the pool), for reproducible replies.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedPicker(pub usize);

impl ResponsePicker for FixedPicker {
    fn pick(&self, len: usize) -> usize {
        self.0.min(len - 1)
    }
}

/// Keyword-matched empathetic responder.
pub struct Companion {
    picker: Box<dyn ResponsePicker>,
}

impl fmt::Debug for Companion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Companion").finish_non_exhaustive()
    }
}

impl Default for Companion {
    fn default() -> Self {
        Self::new()
    }
}

impl Companion {
    #[must_use]
    pub fn new() -> Self {
        Self::with_picker(RandomPicker)
    }

    pub fn with_picker(picker: impl ResponsePicker + 'static) -> Self {
        Self {
            picker: Box::new(picker),
        }
    }

    /// Decide which pool answers `message`. Matching is case-insensitive substring search.
    #[must_use]
    pub fn classify(&self, message: &str) -> ResponseKind {
        Self::select(message).0
    }

    /// Produce a reply for `message`.
    #[must_use]
    pub fn respond(&self, message: &str) -> String {
        let (kind, pool) = Self::select(message);
        let reply = pool[self.picker.pick(pool.len())];
        tracing::debug!(kind = ?kind, "Companion reply chosen");
        reply.to_string()
    }

    /// Crisis phrases first, then categories in declaration order, then the default pool.
    fn select(message: &str) -> (ResponseKind, &'static [&'static str]) {
        let lowered = message.to_lowercase();

        if CRISIS_PHRASES.iter().any(|p| lowered.contains(p)) {
            return (ResponseKind::Crisis, CRISIS_RESPONSES);
        }

        match CATEGORIES
            .iter()
            .find(|c| c.keywords.iter().any(|k| lowered.contains(k)))
        {
            Some(c) if c.crisis => (ResponseKind::Crisis, c.responses),
            Some(c) => (ResponseKind::Category(c.name), c.responses),
            None => (ResponseKind::Default, DEFAULT_RESPONSES),
        }
    }
}
