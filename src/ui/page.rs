//! HTML for the chat page and its service worker.

use std::fmt::Write as _;

use chrono::{DateTime, Local};

use crate::history::ChatTurn;
use crate::widget::format::{display_time, escape_html, linkify_html};
use crate::widget::{QUICK_PROMPTS, Sender, WELCOME_MESSAGE};

/// Generate the HTML shell for the application.
pub fn html_shell(title: &str, content: &str) -> String {
    let title = escape_html(title);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="description" content="MindBridge - Mental Health Companion">
    <title>{title} - MindBridge</title>
    <link rel="stylesheet" href="/static/app.css">
    <style>{PAGE_CSS}</style>
</head>
<body>
    <header><h1>🌉 MindBridge</h1><p>Your mental health friend</p></header>
    <main id="app">
        {content}
    </main>
    <script>{PAGE_SCRIPT}</script>
</body>
</html>"#
    )
}

/// The chat page: welcome message, transcript, quick prompts and the input form.
pub fn chat_page(session_id: &str, turns: &[ChatTurn]) -> String {
    let mut messages = message_html(Sender::Bot, WELCOME_MESSAGE, None);
    for turn in turns {
        let at = DateTime::parse_from_rfc3339(&turn.timestamp)
            .ok()
            .map(|t| display_time(&t.with_timezone(&Local)));
        messages.push_str(&message_html(Sender::User, &turn.user, at.as_deref()));
        messages.push_str(&message_html(Sender::Bot, &turn.bot, at.as_deref()));
    }

    let session_id = escape_html(session_id);
    let quick = QUICK_PROMPTS.iter().fold(String::new(), |mut out, prompt| {
        let prompt = escape_html(prompt);
        let _ = write!(
            out,
            r#"<button type="submit" class="quick-btn" name="message" value="{prompt}">{prompt}</button>"#
        );
        out
    });

    let content = format!(
        r#"<section class="chat-container">
            <div id="chat-messages" class="chat-messages">{messages}</div>
            <form id="chat-form" method="post" action="/">
                <input type="hidden" name="session_id" value="{session_id}">
                <div class="quick-buttons">{quick}</div>
                <div class="input-group">
                    <textarea id="user-input" name="message" rows="1" placeholder="Type your message here..." autofocus></textarea>
                    <button id="send-btn" type="submit">Send</button>
                </div>
            </form>
            <p class="hint">Press Enter to send, Shift+Enter for new line, Ctrl+/ to focus, Esc to clear</p>
        </section>"#
    );

    html_shell("Chat", &content)
}

/// One message bubble. Bot content is linkified; user content is escaped only.
pub fn message_html(sender: Sender, content: &str, time: Option<&str>) -> String {
    let body = match sender {
        Sender::Bot => linkify_html(content),
        Sender::User => escape_html(content),
    };
    let time = time
        .map(|t| format!(r#" <span class="message-time">{}</span>"#, escape_html(t)))
        .unwrap_or_default();
    format!(
        r#"<div class="message {class}"><div class="message-content"><strong>{label}:</strong> {body}{time}</div></div>"#,
        class = sender.css_class(),
        label = sender.label(),
    )
}

/// Cache-first service worker so the page shell opens offline.
pub const SERVICE_WORKER_JS: &str = r"const CACHE = 'mindbridge-v1';
const SHELL = ['/', '/static/app.css'];

self.addEventListener('install', (event) => {
    event.waitUntil(caches.open(CACHE).then((cache) => cache.addAll(SHELL)).catch(() => {}));
});

self.addEventListener('fetch', (event) => {
    if (event.request.method !== 'GET' || new URL(event.request.url).pathname.startsWith('/api/')) {
        return;
    }
    event.respondWith(
        caches.match(event.request).then((hit) => hit || fetch(event.request))
    );
});
";

const PAGE_SCRIPT: &str = r"
(function () {
    const chat = document.getElementById('chat-messages');
    const input = document.getElementById('user-input');
    const form = document.getElementById('chat-form');
    if (chat) { chat.scrollTop = chat.scrollHeight; }
    if (input && form) {
        input.addEventListener('keydown', (e) => {
            if (e.key === 'Enter' && !e.shiftKey) {
                e.preventDefault();
                if (input.value.trim()) { form.requestSubmit(); }
            }
        });
    }
    document.addEventListener('keydown', (e) => {
        if (!input) { return; }
        if (e.ctrlKey && e.key === '/') { e.preventDefault(); input.focus(); }
        if (e.key === 'Escape') { input.value = ''; }
    });
    if ('serviceWorker' in navigator) {
        navigator.serviceWorker.register('/sw.js').catch((err) => console.log('SW registration failed:', err));
    }
    fetch('/api/health')
        .then((res) => res.json())
        .then((data) => console.log('Server health:', data))
        .catch((err) => console.log('Health check failed:', err));
    function toast(message, kind) {
        const el = document.createElement('div');
        el.className = 'toast toast-' + kind;
        el.textContent = message;
        document.body.appendChild(el);
        setTimeout(() => el.remove(), 3000);
    }
    window.addEventListener('online', () => toast('Connection restored! 🌐', 'success'));
    window.addEventListener('offline', () => toast('Connection lost. Working offline.', 'warning'));
})();
";

const PAGE_CSS: &str = r"
body { font-family: system-ui, sans-serif; max-width: 720px; margin: 0 auto; padding: 16px; background: #f0f8ff; }
header { text-align: center; }
.chat-container { background: #fff; border-radius: 12px; padding: 16px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
.chat-messages { max-height: 60vh; overflow-y: auto; }
.message { margin: 10px 0; }
.message-content { padding: 10px 14px; border-radius: 10px; }
.user-message .message-content { background: #007bff; color: #fff; text-align: right; }
.bot-message .message-content { background: #e9ecef; }
.message-time { display: block; font-size: 0.75em; opacity: 0.7; }
.quick-buttons { display: flex; flex-wrap: wrap; gap: 6px; margin: 12px 0; }
.quick-btn { border: 1px solid #007bff; background: #fff; color: #007bff; border-radius: 16px; padding: 4px 10px; cursor: pointer; }
.input-group { display: flex; gap: 8px; }
#user-input { flex: 1; resize: none; max-height: 120px; padding: 10px; border-radius: 8px; border: 1px solid #ddd; }
#send-btn { padding: 10px 20px; background: #007bff; color: #fff; border: none; border-radius: 8px; cursor: pointer; }
.hint { font-size: 0.75em; color: #777; text-align: center; }
.toast { position: fixed; top: 16px; right: 16px; padding: 10px 16px; border-radius: 8px; color: #fff; box-shadow: 0 2px 10px rgba(0,0,0,0.2); }
.toast-success { background: #28a745; }
.toast-warning { background: #ffc107; color: #333; }
";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::{CONNECTION_LOST, CONNECTION_RESTORED};

    #[test]
    fn test_page_script_checks_health_and_connectivity() {
        let html = chat_page("abc-123", &[]);
        assert!(html.contains("fetch('/api/health')"));
        assert!(html.contains("addEventListener('online'"));
        assert!(html.contains("addEventListener('offline'"));
        assert!(html.contains(CONNECTION_RESTORED));
        assert!(html.contains(CONNECTION_LOST));
    }

    #[test]
    fn test_chat_page_contains_welcome_and_session() {
        let html = chat_page("abc-123", &[]);
        assert!(html.contains(&escape_html(WELCOME_MESSAGE)));
        assert!(html.contains(r#"name="session_id" value="abc-123""#));
        assert!(html.contains("/sw.js"));
        for prompt in QUICK_PROMPTS {
            assert!(html.contains(&escape_html(prompt)));
        }
    }

    #[test]
    fn test_transcript_escapes_user_and_links_bot() {
        let turn = ChatTurn {
            user: "<script>alert(1)</script>".into(),
            bot: "Call 988 or visit https://988lifeline.org".into(),
            timestamp: "2025-01-01T12:00:00.000Z".into(),
        };
        let html = chat_page("s", &[turn]);

        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains(r#"<a href="https://988lifeline.org" target="_blank" rel="noopener">"#));
        assert!(html.contains(r#"class="message-time""#));
    }

    #[test]
    fn test_message_html_without_time() {
        let html = message_html(Sender::User, "hi", None);
        assert_eq!(
            html,
            r#"<div class="message user-message"><div class="message-content"><strong>You:</strong> hi</div></div>"#
        );
    }
}
