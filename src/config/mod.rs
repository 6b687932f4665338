// ABOUTME: Environment-only configuration for the shim layer
// ABOUTME: HTTP transport timeouts, the enabled shim set, and per-shim OAuth client settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration is read from the process environment only. Every loader also has
//! a `from_lookup` form so tests can supply variables without touching the
//! process environment.

/// Per-shim OAuth client settings
pub mod shims;

pub use shims::{parse_scopes, ShimClientConfig, DEFAULT_BASE_URL};

use serde::{Deserialize, Serialize};
use std::env;
use tracing::info;

use shimmer_core::constants::oauth_providers::{
    ALL_SHIMS, GOOGLE_FIT, GOOGLE_FIT_DEFAULT_SCOPES, RUNKEEPER, RUNKEEPER_DEFAULT_SCOPES,
};
use shimmer_core::errors::{ShimError, ShimResult};
use shimmer_providers::http_client::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS};

/// Outbound HTTP settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpConfig {
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

/// Complete shim layer configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShimmerConfig {
    /// Outbound HTTP settings
    pub http: HttpConfig,
    /// Google Fit client settings
    pub googlefit: ShimClientConfig,
    /// RunKeeper client settings
    pub runkeeper: ShimClientConfig,
}

impl ShimmerConfig {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns `Configuration` for unparsable numbers or unknown shim keys
    pub fn from_env() -> ShimResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source
    ///
    /// # Errors
    ///
    /// Returns `Configuration` for unparsable numbers or unknown shim keys
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ShimResult<Self> {
        let http = HttpConfig {
            timeout_secs: parse_secs(&lookup, "SHIMMER_HTTP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            connect_timeout_secs: parse_secs(
                &lookup,
                "SHIMMER_HTTP_CONNECT_TIMEOUT_SECS",
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )?,
        };

        let enabled = lookup("SHIMMER_ENABLED_SHIMS")
            .map(|raw| parse_enabled_shims(&raw))
            .transpose()?;
        let explicitly_enabled =
            |key: &str| enabled.as_ref().map(|keys| keys.iter().any(|k| k == key));

        Ok(Self {
            http,
            googlefit: ShimClientConfig::load(
                GOOGLE_FIT,
                GOOGLE_FIT_DEFAULT_SCOPES,
                explicitly_enabled(GOOGLE_FIT),
                &lookup,
            )?,
            runkeeper: ShimClientConfig::load(
                RUNKEEPER,
                RUNKEEPER_DEFAULT_SCOPES,
                explicitly_enabled(RUNKEEPER),
                &lookup,
            )?,
        })
    }

    /// All per-shim configurations
    #[must_use]
    pub fn shims(&self) -> [&ShimClientConfig; 2] {
        [&self.googlefit, &self.runkeeper]
    }

    /// Keys of the shims that will be registered
    #[must_use]
    pub fn enabled_shims(&self) -> Vec<&str> {
        self.shims()
            .into_iter()
            .filter(|shim| shim.enabled)
            .map(|shim| shim.shim_key.as_str())
            .collect()
    }

    /// Log a configuration summary; returns false if any enabled shim is unusable
    pub fn validate_and_log(&self) -> bool {
        info!(
            timeout_secs = self.http.timeout_secs,
            connect_timeout_secs = self.http.connect_timeout_secs,
            enabled = ?self.enabled_shims(),
            "shim configuration loaded"
        );
        self.shims()
            .into_iter()
            .fold(true, |ok, shim| shim.validate_and_log() && ok)
    }
}

fn parse_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: u64,
) -> ShimResult<u64> {
    lookup(name).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or_else(|| {
                ShimError::config(format!("{name} must be a positive integer, got '{raw}'"))
            })
    })
}

fn parse_enabled_shims(raw: &str) -> ShimResult<Vec<String>> {
    raw.split(',')
        .map(|key| key.trim().to_ascii_lowercase())
        .filter(|key| !key.is_empty())
        .map(|key| {
            if ALL_SHIMS.contains(&key.as_str()) {
                Ok(key)
            } else {
                Err(ShimError::config(format!(
                    "SHIMMER_ENABLED_SHIMS names unknown shim '{key}' (known: {})",
                    ALL_SHIMS.join(", ")
                )))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ShimmerConfig::from_lookup(env(&[])).unwrap();
        assert_eq!(config.http, HttpConfig::default());
        assert!(config.enabled_shims().is_empty());
        assert_eq!(config.googlefit.scopes.len(), GOOGLE_FIT_DEFAULT_SCOPES.len());
    }

    #[test]
    fn test_enabled_list_overrides_credential_detection() {
        let config = ShimmerConfig::from_lookup(env(&[
            ("SHIMMER_ENABLED_SHIMS", "RunKeeper"),
            ("SHIMMER_GOOGLEFIT_CLIENT_ID", "g"),
            ("SHIMMER_GOOGLEFIT_CLIENT_SECRET", "s"),
        ]))
        .unwrap();
        assert_eq!(config.enabled_shims(), vec![RUNKEEPER]);
        assert!(!config.validate_and_log());
    }

    #[test]
    fn test_unknown_enabled_shim_is_rejected() {
        let err = ShimmerConfig::from_lookup(env(&[("SHIMMER_ENABLED_SHIMS", "fitbit")]))
            .unwrap_err();
        assert!(matches!(err, ShimError::Configuration { .. }));
    }

    #[test]
    fn test_timeouts_must_be_positive() {
        assert!(
            ShimmerConfig::from_lookup(env(&[("SHIMMER_HTTP_TIMEOUT_SECS", "0")])).is_err()
        );
        let config =
            ShimmerConfig::from_lookup(env(&[("SHIMMER_HTTP_CONNECT_TIMEOUT_SECS", " 3 ")]))
                .unwrap();
        assert_eq!(config.http.connect_timeout_secs, 3);
    }
}
