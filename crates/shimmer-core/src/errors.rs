// ABOUTME: Unified error taxonomy for shim operations with standard error codes
// ABOUTME: Maps every failure mode of a fetch to an ErrorCode and HTTP status
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Shim Error Handling
//!
//! Every operation in the shim subsystem returns [`ShimResult`]. The variants are
//! grouped the same way callers react to them:
//!
//! - **Validation** (`InvalidDataTypeKey`, `UnknownProvider`, `InvalidTimeWindow`,
//!   `InvalidCursor`):
//!   detected before any token or network operation
//! - **Authorization** (`ReauthorizationRequired`, `AuthorizationStateMismatch`,
//!   `TokenRefreshFailed`, `TokenExchangeFailed`): halt the fetch before the data call
//! - **Upstream** (`UpstreamRequestFailed`, `Transport`, `MalformedPayload`): the
//!   provider's own status and body are preserved verbatim
//! - **Infrastructure** (`TokenStore`, `Configuration`)
//!
//! Nothing in this crate retries. Retry policy belongs to the caller.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard error codes used by outer layers (HTTP, CLI) to classify shim failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Data type key absent or not in the shim's catalog
    InvalidDataTypeKey,
    /// No shim registered under the requested key
    UnknownProvider,
    /// Start/end cannot form a valid UTC window
    InvalidTimeWindow,
    /// Pagination cursor cannot be used with this shim
    InvalidCursor,
    /// User must (re-)authorize through the provider's consent page
    ReauthorizationRequired,
    /// Authorization callback did not match the pending state
    AuthorizationStateMismatch,
    /// Refresh grant failed for a reason other than denial
    TokenRefreshFailed,
    /// Authorization code exchange failed
    TokenExchangeFailed,
    /// Provider data endpoint returned 4xx/5xx
    UpstreamRequestFailed,
    /// Network-level failure talking to the provider
    TransportError,
    /// Provider body could not be parsed at all
    MalformedPayload,
    /// Token store read or write failed
    TokenStoreError,
    /// Shim configuration is missing or invalid
    ConfigError,
}

impl ErrorCode {
    /// HTTP status an outer API layer should use for this error
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::InvalidDataTypeKey
            | Self::InvalidTimeWindow
            | Self::InvalidCursor
            | Self::AuthorizationStateMismatch => 400,
            Self::ReauthorizationRequired => 401,
            Self::UnknownProvider => 404,
            Self::TokenRefreshFailed
            | Self::TokenExchangeFailed
            | Self::UpstreamRequestFailed
            | Self::TransportError
            | Self::MalformedPayload => 502,
            Self::TokenStoreError | Self::ConfigError => 500,
        }
    }

    /// Short user-facing description of this error class
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::InvalidDataTypeKey => "The requested data type is not supported by this shim",
            Self::UnknownProvider => "No shim is registered under the requested key",
            Self::InvalidTimeWindow => "The requested time window is invalid",
            Self::InvalidCursor => "The pagination cursor is not valid for this shim",
            Self::ReauthorizationRequired => "The user must authorize access with the provider",
            Self::AuthorizationStateMismatch => "The authorization response did not match the request",
            Self::TokenRefreshFailed => "Refreshing the provider access token failed",
            Self::TokenExchangeFailed => "Exchanging the authorization code failed",
            Self::UpstreamRequestFailed => "The provider rejected the data request",
            Self::TransportError => "The provider could not be reached",
            Self::MalformedPayload => "The provider returned an unreadable payload",
            Self::TokenStoreError => "Credential storage failed",
            Self::ConfigError => "Shim configuration is invalid",
        }
    }
}

/// Errors surfaced by shims, the token lifecycle, and the registry
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShimError {
    /// Data type key absent or unknown for this shim; no network call was made
    #[error("invalid data type key {key:?} for shim '{provider}'")]
    InvalidDataTypeKey {
        /// Shim the request was routed to
        provider: String,
        /// Offending key as supplied by the caller
        key: Option<String>,
    },

    /// Registry miss
    #[error("no shim registered under key '{key}'")]
    UnknownProvider {
        /// Requested shim key
        key: String,
    },

    /// Start/end do not form a window `start < end` representable in provider units
    #[error("invalid time window: {reason}")]
    InvalidTimeWindow {
        /// Why the window was rejected
        reason: String,
    },

    /// Pagination cursor unparsable or pointing outside the provider API
    #[error("invalid pagination cursor for shim '{provider}': {reason}")]
    InvalidCursor {
        /// Shim the cursor was supplied to
        provider: String,
        /// Why the cursor was rejected
        reason: String,
    },

    /// No credential, an unrefreshable one, or a denied refresh
    #[error("shim '{provider}' requires user authorization")]
    ReauthorizationRequired {
        /// Shim needing authorization
        provider: String,
        /// Consent URL the caller should redirect the user to
        authorization_url: String,
    },

    /// Authorization callback carried a state value that was never issued
    #[error("authorization state mismatch for shim '{provider}'")]
    AuthorizationStateMismatch {
        /// Shim receiving the callback
        provider: String,
    },

    /// Transport or protocol failure while refreshing (distinct from denial)
    #[error("token refresh failed for shim '{provider}': {reason}")]
    TokenRefreshFailed {
        /// Shim whose token endpoint failed
        provider: String,
        /// Failure details
        reason: String,
    },

    /// Authorization code could not be exchanged for a credential
    #[error("authorization code exchange failed for shim '{provider}': {reason}")]
    TokenExchangeFailed {
        /// Shim whose token endpoint failed
        provider: String,
        /// Failure details
        reason: String,
    },

    /// Provider data endpoint answered 4xx/5xx; status and body preserved
    #[error("shim '{provider}' data request failed with status {status}: {body}")]
    UpstreamRequestFailed {
        /// Shim that issued the request
        provider: String,
        /// HTTP status returned by the provider
        status: u16,
        /// Raw response body returned by the provider
        body: String,
    },

    /// Network-level failure before any HTTP status was received
    #[error("transport error talking to shim '{provider}': {reason}")]
    Transport {
        /// Shim that issued the request
        provider: String,
        /// Transport failure details
        reason: String,
    },

    /// Body is structurally invalid for the mapper
    #[error("malformed payload from shim '{provider}': {reason}")]
    MalformedPayload {
        /// Shim that produced the payload
        provider: String,
        /// What was wrong with the payload
        reason: String,
    },

    /// Token store could not load or persist a credential
    #[error("token store error: {reason}")]
    TokenStore {
        /// Store failure details
        reason: String,
    },

    /// Shim configuration missing or invalid
    #[error("configuration error: {reason}")]
    Configuration {
        /// What is misconfigured
        reason: String,
    },
}

impl ShimError {
    /// Create an invalid data type key error
    #[must_use]
    pub fn invalid_data_type(provider: impl Into<String>, key: Option<&str>) -> Self {
        Self::InvalidDataTypeKey {
            provider: provider.into(),
            key: key.map(str::to_owned),
        }
    }

    /// Create an unknown provider error
    #[must_use]
    pub fn unknown_provider(key: impl Into<String>) -> Self {
        Self::UnknownProvider { key: key.into() }
    }

    /// Create an invalid time window error
    #[must_use]
    pub fn invalid_window(reason: impl Into<String>) -> Self {
        Self::InvalidTimeWindow {
            reason: reason.into(),
        }
    }

    /// Create an invalid pagination cursor error
    #[must_use]
    pub fn invalid_cursor(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCursor {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    /// Create a malformed payload error
    #[must_use]
    pub fn malformed(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedPayload {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    /// Create a token store error
    #[must_use]
    pub fn token_store(reason: impl Into<String>) -> Self {
        Self::TokenStore {
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Error code classifying this failure
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidDataTypeKey { .. } => ErrorCode::InvalidDataTypeKey,
            Self::UnknownProvider { .. } => ErrorCode::UnknownProvider,
            Self::InvalidTimeWindow { .. } => ErrorCode::InvalidTimeWindow,
            Self::InvalidCursor { .. } => ErrorCode::InvalidCursor,
            Self::ReauthorizationRequired { .. } => ErrorCode::ReauthorizationRequired,
            Self::AuthorizationStateMismatch { .. } => ErrorCode::AuthorizationStateMismatch,
            Self::TokenRefreshFailed { .. } => ErrorCode::TokenRefreshFailed,
            Self::TokenExchangeFailed { .. } => ErrorCode::TokenExchangeFailed,
            Self::UpstreamRequestFailed { .. } => ErrorCode::UpstreamRequestFailed,
            Self::Transport { .. } => ErrorCode::TransportError,
            Self::MalformedPayload { .. } => ErrorCode::MalformedPayload,
            Self::TokenStore { .. } => ErrorCode::TokenStoreError,
            Self::Configuration { .. } => ErrorCode::ConfigError,
        }
    }

    /// HTTP status for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code().http_status()
    }

    /// Whether the failure was detected before any network I/O
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidDataTypeKey { .. }
                | Self::UnknownProvider { .. }
                | Self::InvalidTimeWindow { .. }
                | Self::InvalidCursor { .. }
        )
    }
}

/// Result alias used across the shim subsystem
pub type ShimResult<T> = Result<T, ShimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_http_status() {
        assert_eq!(ErrorCode::InvalidDataTypeKey.http_status(), 400);
        assert_eq!(ErrorCode::ReauthorizationRequired.http_status(), 401);
        assert_eq!(ErrorCode::UnknownProvider.http_status(), 404);
        assert_eq!(ErrorCode::UpstreamRequestFailed.http_status(), 502);
        assert_eq!(ErrorCode::TokenStoreError.http_status(), 500);
    }

    #[test]
    fn test_validation_errors_are_flagged() {
        assert!(ShimError::invalid_data_type("googlefit", Some("bogus")).is_validation());
        assert!(ShimError::unknown_provider("nope").is_validation());
        assert!(ShimError::invalid_cursor("runkeeper", "off host").is_validation());
        assert!(!ShimError::malformed("googlefit", "not json").is_validation());
    }

    #[test]
    fn test_upstream_error_preserves_status_and_body() {
        let err = ShimError::UpstreamRequestFailed {
            provider: "googlefit".to_owned(),
            status: 403,
            body: r#"{"error":"forbidden"}"#.to_owned(),
        };
        assert_eq!(err.code(), ErrorCode::UpstreamRequestFailed);
        assert!(err.to_string().contains("403"));
        assert!(err.to_string().contains("forbidden"));
    }

    #[test]
    fn test_invalid_cursor_is_a_bad_request() {
        let err = ShimError::invalid_cursor("runkeeper", "points outside the API");
        assert_eq!(err.code(), ErrorCode::InvalidCursor);
        assert_eq!(err.http_status(), 400);
        assert!(err.to_string().contains("runkeeper"));
    }

    #[test]
    fn test_error_code_serialization() {
        let json = serde_json::to_string(&ErrorCode::ReauthorizationRequired).unwrap();
        assert_eq!(json, "\"REAUTHORIZATION_REQUIRED\"");
    }
}
