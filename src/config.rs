use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::history::{DEFAULT_HISTORY_CAPACITY, FileHistoryStore};
use crate::session::DEFAULT_MAX_SESSIONS;

/// Prefix for environment overrides, e.g. `MINDBRIDGE_SERVER__PORT=8000`.
pub const ENV_PREFIX: &str = "MINDBRIDGE";

/// Config file picked up from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE", global = true)]
    pub config: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the companion server (default)
    Serve {
        /// Port to listen on
        #[arg(long, env = "PORT")]
        port: Option<u16>,

        /// Address to bind
        #[arg(long)]
        host: Option<String>,
    },
    /// Chat with the companion from the terminal
    Chat {
        /// Base URL of the companion server
        #[arg(long)]
        api_url: Option<String>,

        /// Directory holding the persisted chat history
        #[arg(long)]
        history_dir: Option<PathBuf>,
    },
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub widget: WidgetConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// Directory served under `/static`.
    pub static_dir: PathBuf,
    pub request_timeout_secs: u64,
    /// Most page sessions kept in memory at once.
    pub max_sessions: usize,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct WidgetConfig {
    pub api_url: String,
    pub request_timeout_secs: u64,
    pub history_dir: PathBuf,
    pub history_capacity: usize,
    pub health_interval_secs: u64,
}

impl WidgetConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub fn health_interval(&self) -> Duration {
        Duration::from_secs(self.health_interval_secs.max(1))
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli = Cli::try_parse_from(args).map_err(|e| ConfigError::Message(e.to_string()))?;
        Self::load_from_cli(&cli)
    }

    /// Layer defaults, the config file, `MINDBRIDGE_` variables and CLI flags.
    ///
    /// Priority: CLI flag > environment > config file > defaults.
    pub fn load_from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let history_dir = FileHistoryStore::default_dir();

        let mut builder = Config::builder()
            .set_default("server.port", 5000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.static_dir", "static")?
            .set_default("server.request_timeout_secs", 30)?
            .set_default(
                "server.max_sessions",
                i64::try_from(DEFAULT_MAX_SESSIONS).unwrap_or(10_000),
            )?
            .set_default("widget.api_url", "http://127.0.0.1:5000")?
            .set_default("widget.request_timeout_secs", 10)?
            .set_default("widget.history_dir", history_dir.to_string_lossy().into_owned())?
            .set_default(
                "widget.history_capacity",
                i64::try_from(DEFAULT_HISTORY_CAPACITY).unwrap_or(100),
            )?
            .set_default("widget.health_interval_secs", 15)?;

        if let Some(path) = &cli.config {
            builder = builder.add_source(File::with_name(path).required(true));
        } else if Path::new(DEFAULT_CONFIG_FILE).exists() {
            builder = builder.add_source(File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        match &cli.command {
            Some(Command::Serve { port, host }) => {
                if let Some(port) = port {
                    builder = builder.set_override("server.port", i64::from(*port))?;
                }
                if let Some(host) = host {
                    builder = builder.set_override("server.host", host.as_str())?;
                }
            }
            Some(Command::Chat {
                api_url,
                history_dir,
            }) => {
                if let Some(url) = api_url {
                    builder = builder.set_override("widget.api_url", url.as_str())?;
                }
                if let Some(dir) = history_dir {
                    builder = builder
                        .set_override("widget.history_dir", dir.to_string_lossy().into_owned())?;
                }
            }
            None => {
                // Plain `mindbridge` runs the server, so it honours PORT too.
                if let Some(port) = std::env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse::<u16>().ok())
                {
                    builder = builder.set_override("server.port", i64::from(port))?;
                }
            }
        }

        builder.build()?.try_deserialize()
    }
}
