//! Server-rendered HTML for the browser chat page.
//!
//! The page works without client-side scripting: the form posts back to
//! `/` and the server re-renders the transcript. A short inline script adds
//! Enter-to-send, keyboard shortcuts and service worker registration.

pub mod page;

pub use page::{SERVICE_WORKER_JS, chat_page, html_shell, message_html};
