use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod chat;
pub mod health;
pub mod info;

use crate::core::AppConfig;

#[derive(Subcommand)]
enum Command {
    /// Start an interactive chat with the booking assistant
    Chat {},
    /// Check whether the backend is up
    Health {},
    /// Print the backend's service description
    Info {},
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Base address of the backend, overrides CONCIERGE_API_URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::default().with_api_url(args.api_url);

    // Handle each sub command
    match args.command {
        Some(Command::Chat {}) => {
            chat::run(&config).await?;
        }
        Some(Command::Health {}) => {
            health::run(&config).await?;
        }
        Some(Command::Info {}) => {
            info::run(&config).await?;
        }
        None => {}
    }

    Ok(())
}
