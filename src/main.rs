//! MindBridge server and terminal chat.
//!
//! `mindbridge serve` (the default) runs the companion API and web page;
//! `mindbridge chat` opens the terminal chat against a running server.

use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use mimalloc::MiMalloc;
use tracing::info;

use mindbridge::config::{AppConfig, Cli, Command};
use mindbridge::{server, telemetry, terminal};

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    let cli = Cli::parse();
    let config = Arc::new(AppConfig::load_from_cli(&cli)?);

    match cli.command {
        Some(Command::Chat { .. }) => {
            telemetry::init_quiet();
            terminal::run(&config).await
        }
        Some(Command::Serve { .. }) | None => {
            telemetry::init(cli.log_json);
            info!(
                name: "config.loaded",
                address = %config.server.address(),
                static_dir = %config.server.static_dir.display(),
                request_timeout_secs = config.server.request_timeout_secs,
                "Configuration loaded"
            );
            server::start_server(config).await
        }
    }
}
