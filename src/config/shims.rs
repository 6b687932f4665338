// ABOUTME: Per-shim OAuth client configuration loaded from SHIMMER_<SHIM>_* environment variables
// ABOUTME: Credentials, redirect URI, scopes, page size, endpoint overrides, and credential diagnostics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use shimmer_core::errors::{ShimError, ShimResult};
use shimmer_providers::token::{OAuth2ClientSettings, OAuthEndpoints};

/// Base URL used to derive default redirect URIs
pub const DEFAULT_BASE_URL: &str = "http://localhost:8083";

/// Minimum secret length below which credentials are reported as suspicious
const MIN_SECRET_LENGTH: usize = 16;

/// OAuth client configuration for one shim
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ShimClientConfig {
    /// Shim key this configuration belongs to
    pub shim_key: String,
    /// OAuth client ID
    pub client_id: Option<String>,
    /// OAuth client secret
    #[serde(skip_serializing)]
    pub client_secret: Option<String>,
    /// OAuth redirect URI
    pub redirect_uri: String,
    /// OAuth scopes
    pub scopes: Vec<String>,
    /// Feed page size override for shims that page
    pub page_size: Option<u32>,
    /// Consent page override
    pub authorization_url: Option<String>,
    /// Token endpoint override
    pub token_url: Option<String>,
    /// Data API base URL override
    pub api_base_url: Option<String>,
    /// Register this shim at bootstrap
    pub enabled: bool,
}

impl ShimClientConfig {
    /// Load `SHIMMER_<SHIM>_*` variables for `shim_key`
    ///
    /// `explicitly_enabled` is `Some` when `SHIMMER_ENABLED_SHIMS` is set; otherwise
    /// a shim is enabled exactly when both its client id and secret are present.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if `_PAGE_SIZE` is not a positive integer
    pub fn load(
        shim_key: &str,
        default_scopes: &[&str],
        explicitly_enabled: Option<bool>,
        lookup: &impl Fn(&str) -> Option<String>,
    ) -> ShimResult<Self> {
        let prefix = format!("SHIMMER_{}", shim_key.to_ascii_uppercase());
        let var = |suffix: &str| {
            lookup(&format!("{prefix}_{suffix}")).filter(|value| !value.trim().is_empty())
        };

        let base_url = lookup("SHIMMER_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let client_id = var("CLIENT_ID");
        let client_secret = var("CLIENT_SECRET");
        let has_credentials = client_id.is_some() && client_secret.is_some();

        let scopes = var("SCOPES").map_or_else(
            || default_scopes.iter().map(|s| (*s).to_owned()).collect(),
            |raw| parse_scopes(&raw),
        );

        let page_size = var("PAGE_SIZE")
            .map(|raw| {
                raw.trim()
                    .parse::<u32>()
                    .ok()
                    .filter(|size| *size > 0)
                    .ok_or_else(|| {
                        ShimError::config(format!(
                            "{prefix}_PAGE_SIZE must be a positive integer, got '{raw}'"
                        ))
                    })
            })
            .transpose()?;

        Ok(Self {
            shim_key: shim_key.to_owned(),
            redirect_uri: var("REDIRECT_URI").unwrap_or_else(|| {
                format!(
                    "{}/authorize/{shim_key}/callback",
                    base_url.trim_end_matches('/')
                )
            }),
            client_id,
            client_secret,
            scopes,
            page_size,
            authorization_url: var("AUTH_URL"),
            token_url: var("TOKEN_URL"),
            api_base_url: var("API_BASE_URL"),
            enabled: explicitly_enabled.unwrap_or(has_credentials),
        })
    }

    /// Compute SHA256 fingerprint of client secret for debugging (first 8 hex chars)
    #[must_use]
    pub fn secret_fingerprint(&self) -> Option<String> {
        self.client_secret.as_ref().map(|secret| {
            let mut hasher = Sha256::new();
            hasher.update(secret.as_bytes());
            let result = hasher.finalize();
            format!("{result:x}").chars().take(8).collect()
        })
    }

    /// Validate credentials and log diagnostics
    /// Returns true if the configuration is usable, false otherwise
    pub fn validate_and_log(&self) -> bool {
        if !self.enabled {
            info!("Shim {} is disabled", self.shim_key);
            return true;
        }

        let (Some(client_id), Some(client_secret)) = (&self.client_id, &self.client_secret) else {
            warn!(
                "Shim {} is enabled but SHIMMER_{}_CLIENT_ID or _CLIENT_SECRET is missing",
                self.shim_key,
                self.shim_key.to_ascii_uppercase()
            );
            return false;
        };

        info!(
            "Shim {}: client_id={}, secret_len={}, fingerprint={}, redirect_uri={}",
            self.shim_key,
            client_id,
            client_secret.len(),
            self.secret_fingerprint().unwrap_or_default(),
            self.redirect_uri
        );
        debug!("Shim {} scopes: {:?}", self.shim_key, self.scopes);

        if client_secret.len() < MIN_SECRET_LENGTH {
            warn!(
                "Shim {} client secret is only {} characters; token calls will likely fail",
                self.shim_key,
                client_secret.len()
            );
        }
        true
    }

    /// Client settings for the token lifecycle
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the client id or secret is missing
    pub fn client_settings(&self) -> ShimResult<OAuth2ClientSettings> {
        let missing = |what: &str| {
            ShimError::config(format!(
                "shim '{}' is enabled but has no {what} (set SHIMMER_{}_{})",
                self.shim_key,
                self.shim_key.to_ascii_uppercase(),
                what.to_ascii_uppercase().replace(' ', "_")
            ))
        };
        let client_id = self.client_id.clone().ok_or_else(|| missing("client id"))?;
        let client_secret = self
            .client_secret
            .clone()
            .ok_or_else(|| missing("client secret"))?;

        Ok(OAuth2ClientSettings::new(
            client_id,
            client_secret,
            self.redirect_uri.clone(),
            self.scopes.clone(),
        ))
    }

    /// Apply the endpoint overrides to the shim's default endpoints
    #[must_use]
    pub fn endpoints(&self, defaults: OAuthEndpoints) -> OAuthEndpoints {
        OAuthEndpoints {
            authorization_url: self
                .authorization_url
                .clone()
                .unwrap_or(defaults.authorization_url),
            token_url: self.token_url.clone().unwrap_or(defaults.token_url),
            authorization_extras: defaults.authorization_extras,
        }
    }
}

/// Parse space- or comma-separated scopes
#[must_use]
pub fn parse_scopes(raw: &str) -> Vec<String> {
    raw.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|scope| !scope.is_empty())
        .map(str::to_owned)
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
    fn test_enabled_when_credentials_present() {
        let config = ShimClientConfig::load(
            "runkeeper",
            &["feed"],
            None,
            &env(&[
                ("SHIMMER_RUNKEEPER_CLIENT_ID", "rk-client"),
                ("SHIMMER_RUNKEEPER_CLIENT_SECRET", "rk-secret-0123456789"),
            ]),
        )
        .unwrap();
        assert!(config.enabled);
        assert_eq!(config.scopes, vec!["feed".to_owned()]);
        assert_eq!(
            config.redirect_uri,
            "http://localhost:8083/authorize/runkeeper/callback"
        );
        assert!(config.validate_and_log());
    }

    #[test]
    fn test_disabled_without_credentials() {
        let config = ShimClientConfig::load("googlefit", &[], None, &env(&[])).unwrap();
        assert!(!config.enabled);
        assert!(config.client_settings().is_err());
    }

    #[test]
    fn test_overrides_and_base_url() {
        let config = ShimClientConfig::load(
            "googlefit",
            &[],
            Some(true),
            &env(&[
                ("SHIMMER_BASE_URL", "https://shim.example.com/"),
                ("SHIMMER_GOOGLEFIT_SCOPES", "a b,c"),
                ("SHIMMER_GOOGLEFIT_TOKEN_URL", "http://127.0.0.1:9/token"),
            ]),
        )
        .unwrap();
        assert_eq!(
            config.redirect_uri,
            "https://shim.example.com/authorize/googlefit/callback"
        );
        assert_eq!(config.scopes, vec!["a", "b", "c"]);

        let endpoints = config.endpoints(OAuthEndpoints::new("https://auth", "https://token"));
        assert_eq!(endpoints.authorization_url, "https://auth");
        assert_eq!(endpoints.token_url, "http://127.0.0.1:9/token");
        assert!(!config.validate_and_log());
    }

    #[test]
    fn test_invalid_page_size_is_rejected() {
        let err = ShimClientConfig::load(
            "runkeeper",
            &[],
            None,
            &env(&[("SHIMMER_RUNKEEPER_PAGE_SIZE", "0")]),
        )
        .unwrap_err();
        assert!(matches!(err, ShimError::Configuration { .. }));
    }

    #[test]
    fn test_fingerprint_hides_secret() {
        let config = ShimClientConfig {
            client_secret: Some("super-secret".to_owned()),
            ..ShimClientConfig::default()
        };
        let fingerprint = config.secret_fingerprint().unwrap();
        assert_eq!(fingerprint.len(), 8);
        assert!(!fingerprint.contains("secret"));
    }
}
