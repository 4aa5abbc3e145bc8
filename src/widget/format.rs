//! Message text formatting for the HTML page and the terminal.

use std::sync::LazyLock;

use chrono::{DateTime, TimeZone};
use console::style;
use regex::Regex;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"]+"#).expect("valid URL regex"));

/// Escape text for inclusion in HTML element content or attribute values.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape `content` and turn every http(s) URL into a link opening in a new tab.
#[must_use]
pub fn linkify_html(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut last = 0;
    for m in URL_RE.find_iter(content) {
        out.push_str(&escape_html(&content[last..m.start()]));
        let url = escape_html(m.as_str());
        out.push_str(&format!(
            r#"<a href="{url}" target="_blank" rel="noopener">{url}</a>"#
        ));
        last = m.end();
    }
    out.push_str(&escape_html(&content[last..]));
    out
}

/// Underline URLs for terminal output.
#[must_use]
pub fn highlight_links(content: &str) -> String {
    URL_RE
        .replace_all(content, |caps: &regex::Captures<'_>| {
            style(&caps[0]).cyan().underlined().to_string()
        })
        .into_owned()
}

/// Wall-clock `HH:MM:SS` shown next to each message.
#[must_use]
pub fn display_time<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%H:%M:%S").to_string()
}
