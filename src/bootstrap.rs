// ABOUTME: Startup wiring from configuration to a ready shim registry
// ABOUTME: Initializes the shared HTTP client and builds one shim per enabled provider
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use tracing::{info, warn};

use shimmer_core::errors::ShimResult;
use shimmer_providers::http_client::{initialize_shared_client, HttpClient, ReqwestHttpClient};
use shimmer_providers::registry::{ShimRegistry, ShimRegistryBuilder};
use shimmer_providers::token::TokenStore;

use crate::config::{HttpConfig, ShimClientConfig, ShimmerConfig};

#[cfg(any(not(feature = "shim-googlefit"), not(feature = "shim-runkeeper")))]
use shimmer_core::errors::ShimError;
#[cfg(feature = "shim-googlefit")]
use shimmer_providers::googlefit::{self, GoogleFitAdapter};
#[cfg(feature = "shim-runkeeper")]
use shimmer_providers::runkeeper::{self, RunKeeperAdapter, DEFAULT_PAGE_SIZE};

/// Configure the process-wide HTTP client and return a transport over it
///
/// Must run before the first outbound request; later calls keep the first timeouts.
#[must_use]
pub fn initialize_http(config: &HttpConfig) -> Arc<dyn HttpClient> {
    initialize_shared_client(config.timeout_secs, config.connect_timeout_secs);
    Arc::new(ReqwestHttpClient::new())
}

/// Build the registry containing every enabled shim
///
/// # Errors
///
/// Returns `Configuration` if an enabled shim lacks client credentials or was
/// compiled out of this build
pub fn build_registry(
    config: &ShimmerConfig,
    store: &Arc<dyn TokenStore>,
    http: &Arc<dyn HttpClient>,
) -> ShimResult<ShimRegistry> {
    let mut builder = ShimRegistry::builder();
    if config.googlefit.enabled {
        builder = register_googlefit(builder, &config.googlefit, store, http)?;
    }
    if config.runkeeper.enabled {
        builder = register_runkeeper(builder, &config.runkeeper, store, http)?;
    }

    let registry = builder.build();
    if registry.is_empty() {
        warn!("no shims enabled; set SHIMMER_<SHIM>_CLIENT_ID and _CLIENT_SECRET");
    }
    Ok(registry)
}

#[cfg(feature = "shim-googlefit")]
fn register_googlefit(
    builder: ShimRegistryBuilder,
    config: &ShimClientConfig,
    store: &Arc<dyn TokenStore>,
    http: &Arc<dyn HttpClient>,
) -> ShimResult<ShimRegistryBuilder> {
    let adapter = config
        .api_base_url
        .as_ref()
        .map_or_else(GoogleFitAdapter::new, |url| {
            GoogleFitAdapter::with_data_url(url.as_str())
        });
    let shim = googlefit::build_shim(
        adapter,
        config.client_settings()?,
        config.endpoints(googlefit::endpoints()),
        Arc::clone(store),
        Arc::clone(http),
    );
    info!(shim = %config.shim_key, "registering shim");
    Ok(builder.register(Arc::new(shim)))
}

#[cfg(not(feature = "shim-googlefit"))]
fn register_googlefit(
    _builder: ShimRegistryBuilder,
    config: &ShimClientConfig,
    _store: &Arc<dyn TokenStore>,
    _http: &Arc<dyn HttpClient>,
) -> ShimResult<ShimRegistryBuilder> {
    Err(compiled_out(config))
}

#[cfg(feature = "shim-runkeeper")]
fn register_runkeeper(
    builder: ShimRegistryBuilder,
    config: &ShimClientConfig,
    store: &Arc<dyn TokenStore>,
    http: &Arc<dyn HttpClient>,
) -> ShimResult<ShimRegistryBuilder> {
    let page_size = config.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    let adapter = RunKeeperAdapter::with_api_url(
        config
            .api_base_url
            .as_deref()
            .unwrap_or(runkeeper::API_URL),
        page_size,
    );
    let shim = runkeeper::build_shim(
        adapter,
        config.client_settings()?,
        config.endpoints(runkeeper::endpoints()),
        Arc::clone(store),
        Arc::clone(http),
    );
    info!(shim = %config.shim_key, page_size, "registering shim");
    Ok(builder.register(Arc::new(shim)))
}

#[cfg(not(feature = "shim-runkeeper"))]
fn register_runkeeper(
    _builder: ShimRegistryBuilder,
    config: &ShimClientConfig,
    _store: &Arc<dyn TokenStore>,
    _http: &Arc<dyn HttpClient>,
) -> ShimResult<ShimRegistryBuilder> {
    Err(compiled_out(config))
}

#[cfg(any(not(feature = "shim-googlefit"), not(feature = "shim-runkeeper")))]
fn compiled_out(config: &ShimClientConfig) -> ShimError {
    ShimError::config(format!(
        "shim '{}' is enabled but this build was compiled without it",
        config.shim_key
    ))
}
