//! entryctl - build and inspect serialized cache entries
//!
//! Reads configuration from the environment, sets up tracing on stderr and
//! prints command results on stdout.

use std::io::{self, Read};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cache_entry::commands::{build_entry, inspect_entry};
use cache_entry::{Config, SystemClock, Ttl};

#[derive(Parser)]
#[command(name = "entryctl")]
#[command(about = "Build and inspect serialized cache entries", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an entry and print its serialized form
    New {
        /// Value to store, as JSON (plain text is stored as a string)
        value: String,

        /// Offset in milliseconds or a date string (default: ENTRY_DEFAULT_TTL)
        #[arg(long, allow_hyphen_values = true)]
        ttl: Option<String>,
    },
    /// Parse a serialized entry and report its state
    Inspect {
        /// Serialized entry; read from stdin when omitted
        text: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env();

    // RUST_LOG wins over ENTRY_LOG_FILTER
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match cli.command {
        Commands::New { value, ttl } => {
            let ttl = ttl.map(Ttl::Raw).unwrap_or_else(|| config.default_ttl());
            let text = build_entry(&value, ttl, &SystemClock).context("Failed to build entry")?;
            println!("{}", text);
        }
        Commands::Inspect { text } => {
            let text = match text {
                Some(text) => text,
                None => {
                    info!("Reading entry from stdin");
                    let mut buffer = String::new();
                    io::stdin()
                        .read_to_string(&mut buffer)
                        .context("Failed to read entry from stdin")?;
                    buffer
                }
            };
            let report = inspect_entry(&text, &SystemClock).context("Failed to inspect entry")?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
