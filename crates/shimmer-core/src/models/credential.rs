// ABOUTME: OAuth2 access credential held per (shim, user) pair
// ABOUTME: Tracks access/refresh tokens and expiry; Debug output redacts secrets
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::time::TOKEN_EXPIRY_SKEW_SECONDS;

/// Key identifying one stored credential
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CredentialKey {
    /// Shim the credential was issued for
    pub provider_key: String,
    /// User the credential belongs to
    pub user_key: String,
}

impl CredentialKey {
    /// Create a key for `(provider_key, user_key)`
    #[must_use]
    pub fn new(provider_key: impl Into<String>, user_key: impl Into<String>) -> Self {
        Self {
            provider_key: provider_key.into(),
            user_key: user_key.into(),
        }
    }
}

impl fmt::Display for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider_key, self.user_key)
    }
}

/// OAuth2 credential for one provider account
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessCredential {
    /// Bearer token sent to the provider data endpoint
    pub access_token: String,
    /// Token type reported by the provider (usually "Bearer")
    pub token_type: String,
    /// Long-lived token used to obtain new access tokens
    pub refresh_token: Option<String>,
    /// When the access token stops being accepted; `None` means no known expiry
    pub expires_at: Option<DateTime<Utc>>,
    /// Space-separated scopes granted by the provider
    pub scope: Option<String>,
}

impl AccessCredential {
    /// Create a bearer credential with no refresh token and no expiry
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: "Bearer".to_owned(),
            refresh_token: None,
            expires_at: None,
            scope: None,
        }
    }

    /// Attach a refresh token
    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Attach an absolute expiry
    #[must_use]
    pub const fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Whether the access token is expired (or about to be) at `now`
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| {
            expires_at <= now + Duration::seconds(TOKEN_EXPIRY_SKEW_SECONDS)
        })
    }

    /// Whether the access token is expired (or about to be) right now
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Whether a refresh grant can be attempted
    #[must_use]
    pub fn can_refresh(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Keep `prior` as the refresh token when the provider did not issue a new one
    ///
    /// Several providers (Google among them) never rotate refresh tokens and omit
    /// the field from refresh responses.
    #[must_use]
    pub fn preserving_refresh_token(mut self, prior: Option<&str>) -> Self {
        if self.refresh_token.as_deref().is_none_or(str::is_empty) {
            self.refresh_token = prior.map(str::to_owned);
        }
        self
    }

    /// Value for the `Authorization` header of data requests
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl fmt::Debug for AccessCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessCredential")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("refresh_token_set", &self.refresh_token.is_some())
            .field("expires_at", &self.expires_at)
            .field("scope", &self.scope)
            .finish()
    }
}
