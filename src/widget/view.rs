//! Rendering seam between the chat controller and a concrete front-end.

use std::fmt;

/// Who a rendered message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    /// Label shown in front of the message.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "You",
            Self::Bot => "MindBridge",
        }
    }

    /// CSS class suffix used by the HTML page (`user-message` / `bot-message`).
    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Self::User => "user-message",
            Self::Bot => "bot-message",
        }
    }
}

/// Severity of a transient notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Warning,
    Info,
    Error,
}

impl fmt::Display for ToastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// Everything the controller asks a front-end to do.
///
/// Implementations keep the newest message in view: adding a message or
/// the typing indicator scrolls to the bottom.
pub trait ChatView: Send {
    /// Append a message with its display time.
    fn add_message(&mut self, sender: Sender, content: &str, time: &str);

    fn show_typing_indicator(&mut self);

    /// Remove the typing indicator if present.
    fn hide_typing_indicator(&mut self);

    /// Append a bot-styled failure message.
    fn show_error(&mut self, message: &str);

    fn set_input_enabled(&mut self, enabled: bool);

    fn clear_input(&mut self);

    fn show_toast(&mut self, message: &str, kind: ToastKind);

    /// Drop every rendered message and show `welcome` alone.
    fn reset(&mut self, welcome: &str);
}

/// One call recorded by [`RecordingView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Message { sender: Sender, content: String },
    TypingShown,
    TypingHidden,
    Error(String),
    InputEnabled(bool),
    InputCleared,
    Toast { message: String, kind: ToastKind },
    Reset(String),
}

/// A view that only records what it was asked to render.
#[derive(Debug, Default)]
pub struct RecordingView {
    events: Vec<ViewEvent>,
    typing: bool,
    input_enabled: bool,
}

impl RecordingView {
    #[must_use]
    pub fn new() -> Self {
        Self {
            input_enabled: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn events(&self) -> &[ViewEvent] {
        &self.events
    }

    /// Rendered messages as `(sender, content)` pairs.
    #[must_use]
    pub fn messages(&self) -> Vec<(Sender, String)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ViewEvent::Message { sender, content } => Some((*sender, content.clone())),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ViewEvent::Error(msg) => Some(msg.clone()),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn toasts(&self) -> Vec<(String, ToastKind)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ViewEvent::Toast { message, kind } => Some((message.clone(), *kind)),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn is_typing(&self) -> bool {
        self.typing
    }

    #[must_use]
    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }
}

impl ChatView for RecordingView {
    fn add_message(&mut self, sender: Sender, content: &str, _time: &str) {
        self.events.push(ViewEvent::Message {
            sender,
            content: content.to_string(),
        });
    }

    fn show_typing_indicator(&mut self) {
        self.typing = true;
        self.events.push(ViewEvent::TypingShown);
    }

    fn hide_typing_indicator(&mut self) {
        self.typing = false;
        self.events.push(ViewEvent::TypingHidden);
    }

    fn show_error(&mut self, message: &str) {
        self.events.push(ViewEvent::Error(message.to_string()));
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
        self.events.push(ViewEvent::InputEnabled(enabled));
    }

    fn clear_input(&mut self) {
        self.events.push(ViewEvent::InputCleared);
    }

    fn show_toast(&mut self, message: &str, kind: ToastKind) {
        self.events.push(ViewEvent::Toast {
            message: message.to_string(),
            kind,
        });
    }

    fn reset(&mut self, welcome: &str) {
        self.typing = false;
        self.events.push(ViewEvent::Reset(welcome.to_string()));
    }
}
