// ABOUTME: Main library entry point for the Shimmer shim layer
// ABOUTME: Re-exports the shim crates and adds configuration, logging, bootstrap, and a file token store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Shimmer
//!
//! Provider adapter ("shim") layer for health and fitness APIs. Each shim turns a
//! request for one data type over a time window into the provider's native query,
//! keeps the user's `OAuth2` credential usable, and maps the provider payload to
//! normalized data points.
//!
//! ## Architecture
//!
//! - **`shimmer-core`**: errors, data models, constants
//! - **`shimmer-providers`**: token lifecycle, request building, mappers, shims, registry
//! - **this crate**: environment configuration, logging, registry bootstrap, CLI
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use shimmer::bootstrap::{build_registry, initialize_http};
//! use shimmer::config::ShimmerConfig;
//! use shimmer::models::{FetchOutcome, ShimDataRequest};
//! use shimmer::providers::token::{InMemoryTokenStore, TokenStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ShimmerConfig::from_env()?;
//!     let store: Arc<dyn TokenStore> = Arc::new(InMemoryTokenStore::new());
//!     let http = initialize_http(&config.http);
//!     let registry = build_registry(&config, &store, &http)?;
//!
//!     let request = ShimDataRequest::new("googlefit", "alice", "STEP_COUNT");
//!     match registry.fetch(&request).await? {
//!         FetchOutcome::Data(response) => println!("{}", serde_json::to_string(&response)?),
//!         FetchOutcome::AuthorizationRequired(redirect) => {
//!             println!("visit {}", redirect.authorization_url);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub use shimmer_core::{constants, errors, models};
pub use shimmer_providers as providers;

/// Registry construction from configuration
pub mod bootstrap;

/// Environment-driven configuration
pub mod config;

/// Structured logging setup
pub mod logging;

/// JSON file token store
pub mod token_store;
