// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Oasis - storefront inbox service.
//!
//! Binary entry point: `serve`, business administration, `doctor` and
//! `config check`.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod business;
mod doctor;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use oasis_config::OasisConfig;
use oasis_core::types::Platform;
use oasis_core::StorageAdapter;

/// Oasis - storefront inbox service.
#[derive(Parser, Debug)]
#[command(name = "oasis", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the webhook and inbox API server.
    Serve,
    /// Manage businesses and their platform integrations.
    Business {
        #[command(subcommand)]
        action: BusinessCommands,
    },
    /// Run diagnostic checks against the environment.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Inspect configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum BusinessCommands {
    /// Create a business.
    Add {
        /// Display name, interpolated into replies.
        name: String,
        /// Free-text category (e.g. "cafe", "gym"). Omitted means retail.
        #[arg(long)]
        category: Option<String>,
        /// URL slug. Derived from the name when omitted.
        #[arg(long)]
        slug: Option<String>,
        /// Owner account id.
        #[arg(long)]
        owner: Option<String>,
    },
    /// List businesses, oldest first.
    List {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Set or replace a platform integration on a business.
    Connect {
        /// Business id.
        business_id: String,
        /// facebook, instagram or sms.
        platform: Platform,
        /// Account the platform delivers to (page id, Instagram id, phone number).
        #[arg(long)]
        account_id: String,
        /// Send API token (Graph page token or Twilio auth token).
        #[arg(long)]
        token: Option<String>,
        /// Twilio account SID.
        #[arg(long)]
        account_sid: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Load and validate the configuration, then print it with secrets redacted.
    Check,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Business { action }) => run_business(&config, action).await,
        Some(Commands::Doctor { plain }) => doctor::run_doctor(&config, plain).await,
        Some(Commands::Config {
            action: ConfigCommands::Check,
        }) => match oasis_config::render_effective(&config) {
            Ok(rendered) => {
                println!("# oasis: configuration is valid\n");
                print!("{rendered}");
                Ok(())
            }
            Err(e) => Err(oasis_core::OasisError::Config(e.to_string())),
        },
        None => {
            println!("oasis: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("oasis: {e}");
        std::process::exit(1);
    }
}

fn load_config(path: Option<&std::path::Path>) -> OasisConfig {
    let loaded = match path {
        Some(path) => oasis_config::load_and_validate_path(path),
        None => oasis_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            oasis_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

async fn run_business(
    config: &OasisConfig,
    action: BusinessCommands,
) -> Result<(), oasis_core::OasisError> {
    let storage = business::open_storage(config).await?;
    let result = match action {
        BusinessCommands::Add {
            name,
            category,
            slug,
            owner,
        } => business::add(&storage, &name, category, slug, owner)
            .await
            .map(|b| println!("created business {} ({})", b.id, b.slug)),
        BusinessCommands::List { json } => business::list(&storage, json).await,
        BusinessCommands::Connect {
            business_id,
            platform,
            account_id,
            token,
            account_sid,
        } => business::connect(&storage, &business_id, platform, account_id, token, account_sid)
            .await
            .map(|()| println!("connected {platform} to business {business_id}")),
    };
    storage.close().await?;
    result
}
