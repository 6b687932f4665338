// ABOUTME: OAuth2 client registration and endpoint settings for one shim
// ABOUTME: Client id/secret, redirect URI, scopes, and provider-specific authorization extras
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use shimmer_core::errors::{ShimError, ShimResult};
use std::fmt;
use url::Url;

/// Application credentials registered with the provider
#[derive(Clone, PartialEq, Eq)]
pub struct OAuth2ClientSettings {
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Callback URL registered with the provider
    pub redirect_uri: String,
    /// Scopes requested during authorization
    pub scopes: Vec<String>,
}

impl OAuth2ClientSettings {
    /// Create settings with the given scopes
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            scopes,
        }
    }

    /// Scopes joined with spaces, as sent in the `scope` parameter
    #[must_use]
    pub fn scope_param(&self) -> String {
        self.scopes.join(" ")
    }
}

impl fmt::Debug for OAuth2ClientSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth2ClientSettings")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .finish()
    }
}

/// Provider OAuth endpoints plus extra authorization query parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthEndpoints {
    /// User consent page
    pub authorization_url: String,
    /// Token endpoint for code exchange and refresh
    pub token_url: String,
    /// Extra query parameters appended to the consent URL (e.g. `access_type=offline`)
    pub authorization_extras: Vec<(String, String)>,
}

impl OAuthEndpoints {
    /// Endpoints with no authorization extras
    #[must_use]
    pub fn new(authorization_url: impl Into<String>, token_url: impl Into<String>) -> Self {
        Self {
            authorization_url: authorization_url.into(),
            token_url: token_url.into(),
            authorization_extras: Vec::new(),
        }
    }

    /// Append an extra authorization query parameter
    #[must_use]
    pub fn with_authorization_extra(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.authorization_extras.push((name.into(), value.into()));
        self
    }

    /// Build the consent URL for `state`
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the authorization endpoint is not a valid URL
    pub fn authorization_url_for(
        &self,
        client: &OAuth2ClientSettings,
        state: &str,
    ) -> ShimResult<String> {
        let mut url = Url::parse(&self.authorization_url).map_err(|e| {
            ShimError::config(format!(
                "invalid authorization URL '{}': {e}",
                self.authorization_url
            ))
        })?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("state", state)
                .append_pair("client_id", &client.client_id)
                .append_pair("response_type", "code");
            for (name, value) in &self.authorization_extras {
                query.append_pair(name, value);
            }
            query
                .append_pair("scope", &client.scope_param())
                .append_pair("redirect_uri", &client.redirect_uri);
        }

        Ok(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OAuth2ClientSettings {
        OAuth2ClientSettings::new(
            "client-123",
            "secret-456",
            "http://localhost:8083/authorize/googlefit/callback",
            vec!["scope.a".to_owned(), "scope.b".to_owned()],
        )
    }

    #[test]
    fn test_authorization_url_contains_required_parameters() {
        let endpoints = OAuthEndpoints::new(
            "https://accounts.google.com/o/oauth2/auth",
            "https://accounts.google.com/o/oauth2/token",
        )
        .with_authorization_extra("access_type", "offline")
        .with_authorization_extra("approval_prompt", "force");

        let url = Url::parse(&endpoints.authorization_url_for(&client(), "st-1").unwrap()).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let get = |name: &str| {
            pairs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        };

        assert_eq!(get("state"), Some("st-1"));
        assert_eq!(get("client_id"), Some("client-123"));
        assert_eq!(get("response_type"), Some("code"));
        assert_eq!(get("access_type"), Some("offline"));
        assert_eq!(get("approval_prompt"), Some("force"));
        assert_eq!(get("scope"), Some("scope.a scope.b"));
        assert_eq!(
            get("redirect_uri"),
            Some("http://localhost:8083/authorize/googlefit/callback")
        );
    }

    #[test]
    fn test_invalid_authorization_url_is_config_error() {
        let endpoints = OAuthEndpoints::new("not a url", "https://example.com/token");
        let err = endpoints.authorization_url_for(&client(), "s").unwrap_err();
        assert!(matches!(err, ShimError::Configuration { .. }));
    }

    #[test]
    fn test_debug_redacts_client_secret() {
        assert!(!format!("{:?}", client()).contains("secret-456"));
    }
}
