use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod chat;
pub mod serve;

use crate::core::logging;

const DEFAULT_RELAY_URL: &str = "http://127.0.0.1:2222/api/chat";

#[derive(Subcommand)]
enum Command {
    /// Run the relay server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "2222")]
        port: String,
    },
    /// Chat through a running relay server
    Chat {
        /// Chat endpoint of the relay
        #[arg(long, default_value = DEFAULT_RELAY_URL)]
        url: String,

        /// Seconds without data before giving up on a reply
        #[arg(long, default_value = "30", value_parser = clap::value_parser!(u64).range(1..))]
        idle_timeout: u64,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    // Handle each sub command
    match args.command {
        Some(Command::Serve { host, port }) => {
            // axum logs rejections from built-in extractors with the
            // `axum::rejection` target, at `TRACE` level
            logging::init(&format!(
                "{}=debug,tower_http=debug,axum::rejection=trace",
                env!("CARGO_CRATE_NAME")
            ));
            serve::run(host, port).await?;
        }
        Some(Command::Chat { url, idle_timeout }) => {
            // Keep the terminal for the conversation
            logging::init(&format!("{}=warn", env!("CARGO_CRATE_NAME")));
            chat::run(&url, idle_timeout).await?;
        }
        None => {}
    }

    Ok(())
}
