// ABOUTME: Process-wide registry resolving shim keys to provider shims
// ABOUTME: Built once at startup, immutable afterwards, with lock-free lookups
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::{info, instrument};

use shimmer_core::errors::{ShimError, ShimResult};
use shimmer_core::models::{FetchOutcome, ShimDataRequest};

use crate::shim::ProviderShim;

/// Global registry instance
static GLOBAL_REGISTRY: OnceLock<ShimRegistry> = OnceLock::new();

/// Summary of one registered shim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShimInfo {
    /// Registry key
    pub key: &'static str,
    /// Human-readable name
    pub label: &'static str,
    /// Supported data type keys
    pub data_types: Vec<&'static str>,
}

/// Immutable map from shim key to shim
#[derive(Clone, Default)]
pub struct ShimRegistry {
    shims: HashMap<&'static str, Arc<dyn ProviderShim>>,
}

impl ShimRegistry {
    /// Start building a registry
    #[must_use]
    pub fn builder() -> ShimRegistryBuilder {
        ShimRegistryBuilder::default()
    }

    /// Look up the shim registered under `key`
    ///
    /// # Errors
    ///
    /// Returns `UnknownProvider` if nothing is registered under `key`
    pub fn resolve(&self, key: &str) -> ShimResult<Arc<dyn ProviderShim>> {
        self.shims
            .get(key)
            .cloned()
            .ok_or_else(|| ShimError::unknown_provider(key))
    }

    /// Route `request` to its shim and fetch
    ///
    /// # Errors
    ///
    /// Returns `UnknownProvider` for an unregistered shim key, or any error of
    /// [`ProviderShim::fetch`]
    #[instrument(skip(self, request), fields(provider = %request.provider_key))]
    pub async fn fetch(&self, request: &ShimDataRequest) -> ShimResult<FetchOutcome> {
        self.resolve(&request.provider_key)?.fetch(request).await
    }

    /// Whether `key` is registered
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.shims.contains_key(key)
    }

    /// Registered shim keys, sorted
    #[must_use]
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<_> = self.shims.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Summaries of every registered shim, sorted by key
    #[must_use]
    pub fn describe(&self) -> Vec<ShimInfo> {
        self.keys()
            .into_iter()
            .filter_map(|key| self.shims.get(key))
            .map(|shim| ShimInfo {
                key: shim.shim_key(),
                label: shim.label(),
                data_types: shim.data_types(),
            })
            .collect()
    }

    /// Number of registered shims
    #[must_use]
    pub fn len(&self) -> usize {
        self.shims.len()
    }

    /// Whether no shim is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shims.is_empty()
    }
}

/// Collects shims before the registry is frozen
#[derive(Default)]
pub struct ShimRegistryBuilder {
    shims: HashMap<&'static str, Arc<dyn ProviderShim>>,
}

impl ShimRegistryBuilder {
    /// Register `shim` under its own key; a later registration replaces an earlier one
    #[must_use]
    pub fn register(mut self, shim: Arc<dyn ProviderShim>) -> Self {
        let key = shim.shim_key();
        if self.shims.insert(key, shim).is_some() {
            info!(shim = key, "replacing previously registered shim");
        }
        self
    }

    /// Freeze the registry
    #[must_use]
    pub fn build(self) -> ShimRegistry {
        info!(shims = self.shims.len(), "shim registry built");
        ShimRegistry { shims: self.shims }
    }
}

/// Install the process-wide registry
///
/// # Errors
///
/// Returns `Configuration` if a registry was already installed
pub fn init_global_registry(registry: ShimRegistry) -> ShimResult<()> {
    GLOBAL_REGISTRY
        .set(registry)
        .map_err(|_| ShimError::config("global shim registry already initialized"))
}

/// The process-wide registry
///
/// # Errors
///
/// Returns `Configuration` if `init_global_registry` has not been called
pub fn global_registry() -> ShimResult<&'static ShimRegistry> {
    GLOBAL_REGISTRY
        .get()
        .ok_or_else(|| ShimError::config("global shim registry not initialized"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_unknown_key() {
        let registry = ShimRegistry::builder().build();
        let err = registry.resolve("nonexistent").err().unwrap();
        assert_eq!(
            err,
            ShimError::UnknownProvider {
                key: "nonexistent".to_owned()
            }
        );
        assert!(registry.is_empty());
    }
}
