// ABOUTME: Credential persistence contract consumed by the token lifecycle
// ABOUTME: Async TokenStore trait plus a DashMap-backed in-memory implementation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use dashmap::DashMap;
use shimmer_core::errors::ShimResult;
use shimmer_core::models::{AccessCredential, CredentialKey};

/// Credential persistence keyed by `(provider_key, user_key)`
///
/// Durability is the implementor's concern. The lifecycle saves after every
/// successful refresh or code exchange and never caches credentials itself.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Load the credential for `key`, if one exists
    ///
    /// # Errors
    ///
    /// Returns `TokenStore` if the backing storage cannot be read
    async fn load(&self, key: &CredentialKey) -> ShimResult<Option<AccessCredential>>;

    /// Persist `credential` under `key`, replacing any previous value
    ///
    /// # Errors
    ///
    /// Returns `TokenStore` if the backing storage cannot be written
    async fn save(&self, key: &CredentialKey, credential: &AccessCredential) -> ShimResult<()>;

    /// Delete the credential for `key`; deleting a missing key is not an error
    ///
    /// # Errors
    ///
    /// Returns `TokenStore` if the backing storage cannot be written
    async fn remove(&self, key: &CredentialKey) -> ShimResult<()>;
}

/// Process-local token store for tests and single-process deployments
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    credentials: DashMap<CredentialKey, AccessCredential>,
}

impl InMemoryTokenStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with one credential
    #[must_use]
    pub fn with_credential(key: CredentialKey, credential: AccessCredential) -> Self {
        let store = Self::new();
        store.credentials.insert(key, credential);
        store
    }

    /// Number of stored credentials
    #[must_use]
    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    /// Whether the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn load(&self, key: &CredentialKey) -> ShimResult<Option<AccessCredential>> {
        Ok(self.credentials.get(key).map(|entry| entry.value().clone()))
    }

    async fn save(&self, key: &CredentialKey, credential: &AccessCredential) -> ShimResult<()> {
        self.credentials.insert(key.clone(), credential.clone());
        Ok(())
    }

    async fn remove(&self, key: &CredentialKey) -> ShimResult<()> {
        self.credentials.remove(key);
        Ok(())
    }
}
