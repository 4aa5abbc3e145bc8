//! Interactive terminal front-end for the chat widget.
//!
//! Reads lines from stdin, routes slash commands, and hands everything else
//! to a [`ChatController`] rendering through a [`TerminalView`]. A
//! background task probes the server's health endpoint and reports
//! connectivity changes to the controller.

pub mod commands;
mod view;

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use console::style;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::client::MindBridgeClient;
use crate::config::AppConfig;
use crate::history::FileHistoryStore;
use crate::widget::format::display_time;
use crate::widget::{
    ChatBackend, ChatController, ChatView, QUICK_PROMPTS, Sender, WELCOME_MESSAGE,
};

use self::commands::ChatCommand;
pub use self::view::TerminalView;

type TerminalController = ChatController<MindBridgeClient, TerminalView>;

/// Run the terminal chat until `/exit` or end of input.
pub async fn run(config: &AppConfig) -> anyhow::Result<()> {
    let widget = &config.widget;
    let client =
        MindBridgeClient::new(&widget.api_url)?.with_timeout(widget.request_timeout());
    let store = Arc::new(FileHistoryStore::new(&widget.history_dir));

    let controller: Arc<TerminalController> = Arc::new(
        ChatController::new(client.clone(), TerminalView::stdout(), store)
            .with_history_capacity(widget.history_capacity),
    );

    print_banner(client.base_url().as_str());
    let now = display_time(&Local::now());
    controller.with_view(|view| view.add_message(Sender::Bot, WELCOME_MESSAGE, &now));

    let loaded = controller.load_history();
    if loaded > 0 {
        println!(
            "  {}",
            style(format!("{loaded} saved messages. Type /history to see them.")).dim()
        );
        println!();
    }

    let online = check_health(&client).await;
    if !online {
        controller.set_online(false);
    }
    info!(online, api_url = %client.base_url(), "Initial health check");

    let shutdown = CancellationToken::new();
    let watcher = tokio::spawn(watch_connectivity(
        Arc::clone(&controller),
        client,
        widget.health_interval(),
        shutdown.clone(),
    ));

    let result = input_loop(&controller).await;

    shutdown.cancel();
    let _ = watcher.await;
    result
}

async fn input_loop(controller: &TerminalController) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print_prompt();
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                println!();
                println!("  {}", style("Press Ctrl+D or type /exit to leave.").dim());
                continue;
            }
        };
        let Some(line) = line else {
            println!();
            break;
        };

        match commands::parse(&line) {
            Some(ChatCommand::Exit) => break,
            Some(command) => run_command(controller, command).await,
            None => send(controller, &line).await,
        }
    }

    println!("  {}", style("Take care of yourself. 💙").dim());
    Ok(())
}

async fn run_command(controller: &TerminalController, command: ChatCommand) {
    match command {
        ChatCommand::Help => commands::print_help(),
        ChatCommand::Clear => controller.clear_chat(),
        ChatCommand::History => {
            let turns = controller.history_turns();
            if turns.is_empty() {
                println!("  {}", style("No saved messages yet.").dim());
            } else {
                controller.with_view(|view| view.replay(&turns));
            }
        }
        ChatCommand::Forget => {
            controller.forget_history();
            println!("  {}", style("Saved conversation deleted.").dim());
        }
        ChatCommand::QuickList => commands::print_quick_prompts(),
        ChatCommand::Quick(index) => {
            let sent = async {
                if let Some(prompt) = QUICK_PROMPTS.get(index) {
                    println!("  {} {prompt}", style("You >").green().bold());
                }
                controller.quick_message(index).await
            };
            with_interrupt(controller, sent).await;
        }
        ChatCommand::Unknown(what) => println!(
            "  {} Unknown command: {}. Type /help for available commands.",
            style("?").yellow().bold(),
            style(what).dim()
        ),
        ChatCommand::Exit => {}
    }
}

async fn send(controller: &TerminalController, line: &str) {
    with_interrupt(controller, controller.send_message(line)).await;
}

/// Drive `fut` to completion; Ctrl+C cancels the request it is waiting on.
async fn with_interrupt<T>(controller: &TerminalController, fut: impl Future<Output = T>) -> T {
    tokio::pin!(fut);
    loop {
        tokio::select! {
            out = &mut fut => return out,
            _ = tokio::signal::ctrl_c() => {
                if controller.cancel_pending() {
                    debug!("Pending reply cancelled by user");
                }
            }
        }
    }
}

/// `true` when the health endpoint answers and reports healthy.
pub async fn check_health(client: &MindBridgeClient) -> bool {
    match client.health().await {
        Ok(status) => status.is_healthy(),
        Err(e) => {
            debug!(error = %e, "Health check failed");
            false
        }
    }
}

/// Probe the server every `interval` and report the result through
/// [`ChatController::set_online`] until `shutdown` fires.
pub async fn watch_connectivity<B, V>(
    controller: Arc<ChatController<B, V>>,
    client: MindBridgeClient,
    interval: Duration,
    shutdown: CancellationToken,
) where
    B: ChatBackend,
    V: ChatView,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick fires immediately; the initial probe already ran.
    ticker.tick().await;

    loop {
        tokio::select! {
            () = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                let online = check_health(&client).await;
                controller.set_online(online);
            }
        }
    }
}

fn print_banner(api_url: &str) {
    println!();
    println!("  {}", style("🌉 MindBridge").cyan().bold());
    println!("  {}", style("Your mental health friend").dim());
    println!("  {}", style(format!("Connected to {api_url}")).dim());
    println!("  {}", style("Type /help for commands.").dim());
    println!();
}

fn print_prompt() {
    print!("  {} ", style("You >").green().bold());
    let _ = std::io::stdout().flush();
}
