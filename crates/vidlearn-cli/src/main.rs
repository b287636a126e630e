//! vidlearn - command line client for the video-learning platform.
//!
//! Signs in, lists the dashboard, resolves streams and watches the stored
//! session the way the mobile front-end's router does.

mod app;

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::App;
use vidlearn_core::Config;

#[derive(Debug, Parser)]
#[command(name = "vidlearn", version, about = "Client for the vidlearn video-learning platform")]
struct Cli {
    /// Backend base URL (overrides config and VIDLEARN_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create an account
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Log in and store the session
    Login {
        #[arg(long)]
        email: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Log out and clear the stored session
    Logout,
    /// Show the signed-in user
    Whoami {
        /// Ask the backend instead of showing the cached profile
        #[arg(long)]
        remote: bool,
    },
    /// List dashboard videos
    Videos {
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Resolve the stream for a video
    Play { id: String },
    /// Poll the stored session and print state changes until interrupted
    Watch,
    /// Show the effective configuration
    Config {
        /// Persist the effective configuration to the config file
        #[arg(long)]
        save: bool,
    },
}

/// Initialize the tracing subscriber for logging
fn init_tracing(log_file: Option<&PathBuf>) -> Result<Option<WorkerGuard>> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            Ok(None)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _log_guard = init_tracing(cli.log_file.as_ref())?;
    info!("vidlearn starting");

    let mut config = Config::load()?;
    if let Some(url) = cli.base_url {
        config.base_url = url;
    }

    let app = App::new(config)?;
    match cli.command {
        Command::Signup {
            name,
            email,
            password,
        } => app.signup(&name, &email, password).await,
        Command::Login { email, password } => app.login(&email, password).await,
        Command::Logout => app.logout().await,
        Command::Whoami { remote } => app.whoami(remote).await,
        Command::Videos { json } => app.videos(json).await,
        Command::Play { id } => app.play(&id).await,
        Command::Watch => app.watch().await,
        Command::Config { save } => app.show_config(save),
    }
}
