//! Slash commands available in the terminal chat.

use console::style;

use crate::widget::QUICK_PROMPTS;

#[derive(Debug, PartialEq, Eq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Clear the screen back to the welcome message.
    Clear,
    /// Show the stored conversation.
    History,
    /// Delete the stored conversation.
    Forget,
    /// Send quick prompt `n` (1-based as typed, stored 0-based).
    Quick(usize),
    /// List quick prompts.
    QuickList,
    Exit,
    /// Unknown command or bad argument, with a message for the user.
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let mut parts = trimmed.splitn(2, ' ');
    let cmd = parts.next().unwrap_or_default().to_lowercase();
    let arg = parts.next().map(str::trim).filter(|s| !s.is_empty());

    let command = match cmd.as_str() {
        "/help" | "/h" | "/?" => ChatCommand::Help,
        "/clear" | "/cls" => ChatCommand::Clear,
        "/history" => ChatCommand::History,
        "/forget" => ChatCommand::Forget,
        "/exit" | "/quit" | "/q" => ChatCommand::Exit,
        "/quick" => match arg {
            None => ChatCommand::QuickList,
            Some(n) => match n.parse::<usize>() {
                Ok(n) if (1..=QUICK_PROMPTS.len()).contains(&n) => ChatCommand::Quick(n - 1),
                _ => ChatCommand::Unknown(format!(
                    "/quick expects a number from 1 to {}",
                    QUICK_PROMPTS.len()
                )),
            },
        },
        other => ChatCommand::Unknown(other.to_string()),
    };
    Some(command)
}

/// Print the help text listing all available commands.
pub fn print_help() {
    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    println!("  {}      Show this help message", style("/help").cyan());
    println!("  {}     Start over from the welcome message", style("/clear").cyan());
    println!("  {}   Show the saved conversation", style("/history").cyan());
    println!("  {}    Delete the saved conversation", style("/forget").cyan());
    println!("  {}   Send a quick prompt (/quick alone lists them)", style("/quick N").cyan());
    println!("  {}      End the chat", style("/exit").cyan());
    println!();
    println!("  {}", style("Ctrl+C cancels a pending reply, Ctrl+D exits").dim());
    println!();
}

pub fn print_quick_prompts() {
    println!();
    for (i, prompt) in QUICK_PROMPTS.iter().enumerate() {
        println!("  {} {prompt}", style(format!("{}.", i + 1)).cyan());
    }
    println!();
}
