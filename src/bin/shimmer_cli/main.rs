// ABOUTME: Shimmer CLI - command-line driver for the provider shims
// ABOUTME: Lists shims, runs the authorization flow, shows token state, and fetches data as JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # List registered shims and their data types
//! shimmer-cli shims
//!
//! # Authorize a user (prints the consent URL, then reads the callback URL from stdin)
//! shimmer-cli authorize googlefit --user alice
//!
//! # Show the token state of a user
//! shimmer-cli status runkeeper --user alice
//!
//! # Fetch normalized step counts for a window
//! shimmer-cli fetch googlefit --user alice --data-type STEP_COUNT --start 2024-05-01 --end 2024-05-07
//!
//! # Fetch the raw provider payload, continuing from a cursor
//! shimmer-cli fetch runkeeper --user alice --data-type PHYSICAL_ACTIVITY --raw --cursor '/fitnessActivities?page=1'
//!
//! # Forget a stored credential
//! shimmer-cli disconnect runkeeper --user alice
//! ```

mod commands;
mod helpers;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, FixedOffset};
use clap::{Parser, Subcommand};
use tracing::info;

use shimmer::bootstrap::{build_registry, initialize_http};
use shimmer::config::ShimmerConfig;
use shimmer::logging::{LogFormat, LoggingConfig};
use shimmer::providers::token::TokenStore;
use shimmer::token_store::FileTokenStore;

use commands::fetch::FetchArgs;
use helpers::args::parse_date_time;

#[derive(Parser)]
#[command(
    name = "shimmer-cli",
    about = "Shimmer provider shim CLI",
    long_about = "Command-line driver for the Shimmer provider shims: authorize users, inspect token state, and fetch normalized health data."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Token file override (defaults to the platform data directory)
    #[arg(long, global = true, env = "SHIMMER_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// List registered shims and their data types
    Shims,

    /// Authorize a user with a shim
    Authorize {
        /// Shim key (e.g. googlefit, runkeeper)
        shim: String,

        /// User key the credential is stored under
        #[arg(long)]
        user: String,
    },

    /// Show the token state of a user
    Status {
        /// Shim key
        shim: String,

        /// User key
        #[arg(long)]
        user: String,
    },

    /// Fetch data for a user and print the response as JSON
    Fetch {
        /// Shim key
        shim: String,

        /// User key
        #[arg(long)]
        user: String,

        /// Data type key (e.g. `STEP_COUNT`)
        #[arg(long)]
        data_type: String,

        /// Window start (RFC 3339 or YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_time)]
        start: Option<DateTime<FixedOffset>>,

        /// Window end date (RFC 3339 or YYYY-MM-DD); the whole day is included
        #[arg(long, value_parser = parse_date_time)]
        end: Option<DateTime<FixedOffset>>,

        /// Return the provider payload without normalization
        #[arg(long)]
        raw: bool,

        /// Continue from a pagination cursor of a previous response
        #[arg(long)]
        cursor: Option<String>,
    },

    /// Remove the stored credential of a user
    Disconnect {
        /// Shim key
        shim: String,

        /// User key
        #[arg(long)]
        user: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let logging = LoggingConfig::from_env().with_format(LogFormat::Compact);
    let logging = if cli.verbose {
        logging.with_level("debug")
    } else {
        logging
    };
    logging.init()?;

    info!("Shimmer CLI");

    // Load configuration
    let config = ShimmerConfig::from_env()?;
    config.validate_and_log();

    let store: Arc<dyn TokenStore> = Arc::new(match cli.token_file {
        Some(path) => FileTokenStore::new(path),
        None => FileTokenStore::in_data_dir()?,
    });
    let http = initialize_http(&config.http);
    let registry = build_registry(&config, &store, &http)?;

    // Execute command
    match cli.command {
        Command::Shims => commands::shims::list(&registry),
        Command::Authorize { shim, user } => {
            commands::authorize::authorize(&registry, &shim, &user).await?;
        }
        Command::Status { shim, user } => {
            commands::authorize::status(&registry, store.as_ref(), &shim, &user).await?;
        }
        Command::Fetch {
            shim,
            user,
            data_type,
            start,
            end,
            raw,
            cursor,
        } => {
            let args = FetchArgs {
                shim,
                user,
                data_type,
                start,
                end,
                raw,
                cursor,
            };
            commands::fetch::fetch(&registry, args).await?;
        }
        Command::Disconnect { shim, user } => {
            commands::authorize::disconnect(&registry, &shim, &user).await?;
        }
    }

    Ok(())
}
