//! Console rendering of the chat.

use std::fmt;
use std::io::Write;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::history::ChatTurn;
use crate::widget::format::highlight_links;
use crate::widget::{ChatView, Sender, ToastKind};

/// [`ChatView`] writing styled lines to `W` (stdout by default).
///
/// The typing indicator is an `indicatif` spinner on stderr.
pub struct TerminalView<W: Write + Send = std::io::Stdout> {
    out: W,
    spinner: Option<ProgressBar>,
    spinner_target: fn() -> ProgressDrawTarget,
    echo_user: bool,
    input_enabled: bool,
}

impl<W: Write + Send> fmt::Debug for TerminalView<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerminalView")
            .field("typing", &self.spinner.is_some())
            .field("echo_user", &self.echo_user)
            .field("input_enabled", &self.input_enabled)
            .finish_non_exhaustive()
    }
}

impl TerminalView<std::io::Stdout> {
    /// View for an interactive terminal. The user's own line is already on
    /// screen, so it is not echoed back.
    #[must_use]
    pub fn stdout() -> Self {
        Self {
            out: std::io::stdout(),
            spinner: None,
            spinner_target: ProgressDrawTarget::stderr,
            echo_user: false,
            input_enabled: true,
        }
    }
}

impl<W: Write + Send> TerminalView<W> {
    /// View writing into `out` with a hidden spinner. User messages are echoed.
    pub fn with_writer(out: W) -> Self {
        Self {
            out,
            spinner: None,
            spinner_target: ProgressDrawTarget::hidden,
            echo_user: true,
            input_enabled: true,
        }
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    /// Print stored turns, oldest first.
    pub fn replay(&mut self, turns: &[ChatTurn]) {
        if turns.is_empty() {
            return;
        }
        self.line(&format!(
            "  {}",
            style(format!("Previous conversation ({} messages)", turns.len())).dim()
        ));
        for turn in turns {
            let (you, bot) = (Sender::User.label(), Sender::Bot.label());
            self.line(&format!("  {} {}", style(format!("{you}:")).green().bold(), turn.user));
            self.line(&format!(
                "  {} {}",
                style(format!("{bot}:")).cyan().bold(),
                highlight_links(&turn.bot)
            ));
        }
        self.line("");
    }

    fn line(&mut self, text: &str) {
        // A closed stdout leaves nothing useful to do with the error.
        let _ = writeln!(self.out, "{text}");
        let _ = self.out.flush();
    }
}

impl<W: Write + Send> ChatView for TerminalView<W> {
    fn add_message(&mut self, sender: Sender, content: &str, time: &str) {
        let stamp = style(format!("[{time}]")).dim();
        match sender {
            Sender::User if !self.echo_user => {}
            Sender::User => {
                let label = style(format!("{}:", sender.label())).green().bold();
                self.line(&format!("  {stamp} {label} {content}"));
            }
            Sender::Bot => {
                let label = style(format!("{}:", sender.label())).cyan().bold();
                self.line(&format!("  {stamp} {label} {}", highlight_links(content)));
                self.line("");
            }
        }
    }

    fn show_typing_indicator(&mut self) {
        if self.spinner.is_some() {
            return;
        }
        let spinner = ProgressBar::with_draw_target(None, (self.spinner_target)());
        if let Ok(template) = ProgressStyle::default_spinner().template("  {spinner:.cyan} {msg}") {
            spinner.set_style(template);
        }
        spinner.set_message("MindBridge is typing...");
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    fn hide_typing_indicator(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn show_error(&mut self, message: &str) {
        let label = style(format!("{}:", Sender::Bot.label())).cyan().bold();
        self.line(&format!("  {} {label} {message}", style("!").yellow().bold()));
        self.line("");
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
    }

    fn clear_input(&mut self) {}

    fn show_toast(&mut self, message: &str, kind: ToastKind) {
        let marker = match kind {
            ToastKind::Success => style("✓").green().bold(),
            ToastKind::Warning => style("!").yellow().bold(),
            ToastKind::Info => style("i").cyan().bold(),
            ToastKind::Error => style("✗").red().bold(),
        };
        self.line(&format!("  {marker} {}", style(message).dim()));
    }

    fn reset(&mut self, welcome: &str) {
        self.hide_typing_indicator();
        if self.echo_user {
            self.line(&style("-- cleared --").dim().to_string());
        } else {
            let _ = console::Term::stdout().clear_screen();
        }
        let label = style(format!("{}:", Sender::Bot.label())).cyan().bold();
        self.line(&format!("  {label} {welcome}"));
        self.line("");
    }
}
