// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Shim identifiers, OAuth scopes, and time conversion constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module

/// Shim keys and default OAuth scopes
pub mod oauth;

/// Time conversion and token expiry constants
pub mod time;

/// Service naming for logs
pub mod service_names {
    /// Service name reported in structured logs
    pub const SHIMMER: &str = "shimmer";
}

/// Shim provider constants
pub mod oauth_providers {
    /// Re-export all OAuth constants
    pub use super::oauth::*;
}
