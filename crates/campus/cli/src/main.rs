//! campusid - Campus identity operator CLI
//!
//! Resolves user references (email, legacy demo id, opaque id) against the
//! configured account store, provisioning seeded identities on first use.

use campus_storage::QueryWindow;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod bootstrap;
mod commands;
mod config;
mod error;

use crate::config::CampusConfig;
use crate::error::{CliError, CliResult};

/// Campus identity CLI
#[derive(Parser)]
#[command(name = "campusid")]
#[command(about = "Resolve Campus user references to canonical account ids", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "CAMPUS_CONFIG")]
    config: Option<String>,

    /// Log level, overrides the configured one
    #[arg(long, env = "CAMPUS_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "CAMPUS_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve references to canonical account ids
    Resolve {
        /// Emails, legacy ids or opaque ids
        #[arg(required = true)]
        references: Vec<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List configured seed accounts
    Seeds {
        #[arg(long)]
        json: bool,
    },

    /// List stored accounts, newest first
    Accounts {
        #[arg(long, default_value_t = 20)]
        limit: usize,

        #[arg(long, default_value_t = 0)]
        offset: usize,

        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();

    let mut config = CampusConfig::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.logging.json |= cli.log_json;

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.clone().into());

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let services = bootstrap::build(&config).await?;

    match cli.command {
        Command::Resolve { references, json } => {
            let resolved = commands::resolve::run(&services.resolver, &references).await;
            println!("{}", commands::resolve::render(&resolved, json)?);
            match commands::resolve::unresolved(&resolved) {
                0 => Ok(()),
                missing => Err(CliError::Unresolved(missing)),
            }
        }
        Command::Seeds { json } => {
            println!("{}", commands::seeds::render(&services.seeds, json)?);
            Ok(())
        }
        Command::Accounts {
            limit,
            offset,
            json,
        } => {
            let window = QueryWindow { limit, offset };
            println!(
                "{}",
                commands::accounts::render(services.store.as_ref(), window, json).await?
            );
            Ok(())
        }
    }
}
