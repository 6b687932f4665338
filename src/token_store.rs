// ABOUTME: JSON file token store used by the CLI to keep credentials between runs
// ABOUTME: Whole-file read-modify-write under an async mutex with atomic temp-file replacement
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::BTreeMap;
use std::io::{Error as IoError, ErrorKind};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use shimmer_core::errors::{ShimError, ShimResult};
use shimmer_core::models::{AccessCredential, CredentialKey};
use shimmer_providers::token::TokenStore;

/// File name used under the data directory
pub const DEFAULT_FILE_NAME: &str = "tokens.json";

type Credentials = BTreeMap<String, AccessCredential>;

/// Token store persisting every credential in one JSON object keyed `shim/user`
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileTokenStore {
    /// Store backed by `path`; the file is created on first save
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store under the platform data directory (`<data_dir>/shimmer/tokens.json`)
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the platform has no data directory
    pub fn in_data_dir() -> ShimResult<Self> {
        let dir = dirs::data_dir()
            .ok_or_else(|| ShimError::config("no platform data directory for the token store"))?;
        Ok(Self::new(dir.join("shimmer").join(DEFAULT_FILE_NAME)))
    }

    /// Backing file path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> ShimResult<Credentials> {
        match fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(Credentials::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                ShimError::token_store(format!("corrupt token file {}: {e}", self.path.display()))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Credentials::new()),
            Err(e) => Err(io_error("read", &self.path, &e)),
        }
    }

    async fn write_all(&self, credentials: &Credentials) -> ShimResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error("create directory", parent, &e))?;
        }

        let data = serde_json::to_vec_pretty(credentials)
            .map_err(|e| ShimError::token_store(format!("failed to encode tokens: {e}")))?;

        // Write to a temporary file, then rename over the store
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, &data)
            .await
            .map_err(|e| io_error("write", &temp_path, &e))?;
        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| io_error("replace", &self.path, &e))?;

        debug!(entries = credentials.len(), path = %self.path.display(), "token file written");
        Ok(())
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self, key: &CredentialKey) -> ShimResult<Option<AccessCredential>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.remove(&key.to_string()))
    }

    #[instrument(skip(self, credential), fields(key = %key))]
    async fn save(&self, key: &CredentialKey, credential: &AccessCredential) -> ShimResult<()> {
        let _guard = self.lock.lock().await;
        let mut all = self.read_all().await?;
        all.insert(key.to_string(), credential.clone());
        self.write_all(&all).await
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn remove(&self, key: &CredentialKey) -> ShimResult<()> {
        let _guard = self.lock.lock().await;
        let mut all = self.read_all().await?;
        if all.remove(&key.to_string()).is_some() {
            self.write_all(&all).await?;
        }
        Ok(())
    }
}

fn io_error(action: &str, path: &Path, error: &IoError) -> ShimError {
    ShimError::token_store(format!("failed to {action} {}: {error}", path.display()))
}
